//! Lendpool Equipment Lending Server
//!
//! Tracks a shared pool of equipment that staff borrow and return, with
//! administrators managing the inventory. Exposes a REST JSON API and an
//! in-process gateway with a persistent client session.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use gateway::Gateway;

use repository::Repository;
use services::Services;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    /// Open the database, seed the bootstrap admin and wire up services
    pub async fn build(config: &AppConfig) -> AppResult<Self> {
        let repository = Repository::connect(&config.database).await?;
        let services = Services::new(repository, config.auth.clone());

        if let Some((username, password, display_name)) = config.bootstrap.admin() {
            services
                .auth
                .ensure_admin(username, password, display_name)
                .await?;
        }

        Ok(Self {
            gateway: Gateway::new(services),
        })
    }
}
