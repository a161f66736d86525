//! WebSocket Session
//!
//! One connected client. The session owns the sending half of the
//! connection's outbound queue; a writer task drains the other half into
//! the socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::sync::Notify;
use uuid::Uuid;

use super::messages::OutboundEvent;
use crate::domain::LanguageCode;

/// Why a delivery to one session failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection is closed")]
    Closed,

    #[error("Outbound queue stayed full")]
    Backpressure,
}

impl DeliveryError {
    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            DeliveryError::Serialization(_) => "serialization",
            DeliveryError::Closed => "closed",
            DeliveryError::Backpressure => "backpressure",
        }
    }
}

/// A connected client in one room.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    username: String,
    room: String,
    preferred_language: RwLock<LanguageCode>,
    outbound: mpsc::Sender<String>,
    send_timeout: Duration,
    terminated: AtomicBool,
    terminate: Notify,
}

impl Session {
    /// Create a session and the receiving end of its outbound queue.
    pub fn channel(
        username: impl Into<String>,
        room: impl Into<String>,
        language: LanguageCode,
        buffer: usize,
        send_timeout: Duration,
    ) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(buffer.max(1));
        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            username: username.into(),
            room: room.into(),
            preferred_language: RwLock::new(language),
            outbound,
            send_timeout,
            terminated: AtomicBool::new(false),
            terminate: Notify::new(),
        });
        (session, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn preferred_language(&self) -> LanguageCode {
        self.preferred_language.read().clone()
    }

    /// Applies to broadcasts computed after this call; frames already
    /// queued are left as they are.
    pub fn set_preferred_language(&self, language: LanguageCode) {
        *self.preferred_language.write() = language;
    }

    /// Serialize and enqueue an event for this client.
    pub async fn deliver(&self, event: &OutboundEvent) -> Result<(), DeliveryError> {
        let frame = serde_json::to_string(event)?;
        self.send_frame(frame).await
    }

    /// Enqueue an already serialized frame.
    ///
    /// Waits up to the send timeout for room in the queue.
    pub async fn send_frame(&self, frame: String) -> Result<(), DeliveryError> {
        match self.outbound.send_timeout(frame, self.send_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(_)) => Err(DeliveryError::Closed),
            Err(SendTimeoutError::Timeout(_)) => Err(DeliveryError::Backpressure),
        }
    }

    /// Ask the connection task to close this session.
    pub fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            // notify_one keeps a permit if the connection task is not waiting yet
            self.terminate.notify_one();
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Resolves once [`terminate`](Self::terminate) has been called.
    pub async fn terminated(&self) {
        if self.is_terminated() {
            return;
        }
        self.terminate.notified().await;
    }
}
