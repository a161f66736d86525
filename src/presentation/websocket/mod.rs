//! WebSocket Relay
//!
//! Room membership, per-recipient fan-out and the per-connection protocol.

pub mod broadcast;
pub mod handler;
pub mod messages;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod voice;

pub use broadcast::{BroadcastEngine, BroadcastReport};
pub use handler::{run_connection, ws_handler, ConnectionContext, JoinPath};
pub use messages::{ChatPayload, FileKind, FileNotice, OutboundEvent};
pub use pipeline::{CloseReason, Flow, IngestPipeline};
pub use registry::RoomRegistry;
pub use session::{DeliveryError, Session};
pub use voice::VoiceRelay;
