//! GameForge Portal Library
//!
//! Registration, login and the file dashboards of the demo portal, exported
//! for the HTTP server and for tests.

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod events;
pub mod files;
pub mod ledger;
pub mod models;
pub mod portal;
pub mod routes;
pub mod security;
pub mod session;
pub mod store;
pub mod transfer;
pub mod users;

pub use config::Config;
pub use error::{AppError, Result};
pub use portal::Portal;

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<Portal>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given portal and configuration
    pub fn new(portal: Arc<Portal>, config: Config) -> Self {
        Self { portal, config }
    }
}
