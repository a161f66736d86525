//! Application Startup
//!
//! Wires settings, backends and services into the shared state and binds
//! the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    ChatService, FileService, RoomService, TranslationGateway, VoiceService,
};
use crate::config::Settings;
use crate::domain::{MessageRepository, SpeechService, TranslationService};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryMessageRepository, PgMessageRepository};
use crate::infrastructure::speech::HttpSpeechClient;
use crate::infrastructure::storage::DiskFileStore;
use crate::infrastructure::translation::HttpTranslationClient;
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::websocket::{
    BroadcastEngine, ConnectionContext, IngestPipeline, RoomRegistry, VoiceRelay,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Present when history is kept in PostgreSQL
    pub db: Option<PgPool>,
    pub registry: Arc<RoomRegistry>,
    pub translator: TranslationGateway,
    pub engine: Arc<BroadcastEngine>,
    pub pipeline: Arc<IngestPipeline>,
    pub rooms: Arc<RoomService>,
    pub files: Arc<FileService>,
    pub voice: Arc<VoiceService>,
    pub voice_relay: Arc<VoiceRelay>,
}

impl AppState {
    /// Assemble the state around the given backends.
    pub fn new(
        settings: Settings,
        store: Arc<dyn MessageRepository>,
        translation: Arc<dyn TranslationService>,
        speech: Arc<dyn SpeechService>,
    ) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let translator = TranslationGateway::from_settings(translation, &settings.translation);

        let engine = Arc::new(BroadcastEngine::new(registry.clone(), translator.clone()));
        let chat = Arc::new(ChatService::new(store.clone(), translator.clone()));
        let pipeline = Arc::new(IngestPipeline::new(chat, engine.clone()));

        let files = Arc::new(FileService::new(Arc::new(DiskFileStore::new(
            settings.storage.upload_dir.clone(),
        ))));
        let voice = Arc::new(VoiceService::from_settings(
            speech,
            translator.clone(),
            &settings.speech,
        ));
        let voice_relay = Arc::new(VoiceRelay::new(engine.clone(), voice.clone()));

        Self {
            settings: Arc::new(settings),
            db: None,
            registry,
            translator,
            engine,
            pipeline,
            rooms: Arc::new(RoomService::new(store)),
            files,
            voice,
            voice_relay,
        }
    }

    pub fn with_db(mut self, db: PgPool) -> Self {
        self.db = Some(db);
        self
    }

    /// Per-connection settings handed to each WebSocket task.
    pub fn connection_context(&self) -> ConnectionContext {
        let ws = &self.settings.websocket;
        ConnectionContext {
            registry: self.registry.clone(),
            pipeline: self.pipeline.clone(),
            outbound_buffer: ws.outbound_buffer,
            send_timeout: ws.send_timeout(),
            close_grace: ws.close_grace(),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let (store, db): (Arc<dyn MessageRepository>, Option<PgPool>) = match &settings.database.url {
            Some(url) => {
                let pool = database::create_pool(&settings.database, url)
                    .await
                    .context("Failed to connect to the database")?;
                database::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database connection pool created");
                (Arc::new(PgMessageRepository::new(pool.clone())), Some(pool))
            }
            None => {
                tracing::warn!("No database configured, room history is kept in memory only");
                (Arc::new(InMemoryMessageRepository::new()), None)
            }
        };

        let translation = Arc::new(HttpTranslationClient::new(&settings.translation)?);
        let speech = Arc::new(HttpSpeechClient::new(&settings.speech)?);
        tracing::info!(
            translation = %settings.translation.base_url,
            speech = %settings.speech.base_url,
            "Remote services configured"
        );

        tokio::fs::create_dir_all(&settings.storage.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create upload directory {}",
                    settings.storage.upload_dir.display()
                )
            })?;

        let addr = settings.server_addr();
        let cors = create_cors_layer(&settings.cors);

        let mut state = AppState::new(settings, store, translation, speech);
        if let Some(pool) = db {
            state = state.with_db(pool);
        }

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(cors);

        // Bind to address
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
