//! API module for the Investigator backend
//!
//! Exposes the transcript endpoint, a health check and a service banner.

use anyhow::Result;
use tracing::info;

use crate::state::AppState;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::build_router;

/// API server wrapping the application state
#[derive(Clone)]
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on {}", self.state.config.bind_address());
        server::start_http_server(self.state).await
    }
}
