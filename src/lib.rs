//! visionary - visual DNA prompt studio
//!
//! Composes prompts from a library of reusable reference fragments and
//! enhancer controls, and generates images through the Gemini API.

pub mod api;
pub mod composer;
pub mod config;
pub mod controls;
pub mod gemini;
pub mod image_data;
pub mod library;
pub mod studio;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

pub use config::Config;
use gemini::{GeminiClient, ImageGenerator};
use library::Library;
use studio::{Settings, StudioState};

/// The visionary server instance
pub struct Server {
    config: Config,
    generator: Arc<dyn ImageGenerator>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a server backed by the Gemini client
    pub fn new(config: Config) -> Result<Self> {
        let client = GeminiClient::new(&config.gemini)?;
        if !client.is_configured() {
            warn!("No Gemini API key configured; generation requests will fail");
        }
        Ok(Self::with_generator(config, Arc::new(client)))
    }

    /// Create a server with a custom image generator
    pub fn with_generator(config: Config, generator: Arc<dyn ImageGenerator>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            generator,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Build the router over a fresh studio
    fn router(&self) -> Router {
        let studio = StudioState::new(
            Library::with_defaults(),
            Settings::with_model(&self.config.default_model),
        );
        api::router(studio, self.generator.clone())
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("visionary listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("visionary shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
