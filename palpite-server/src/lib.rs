//! Palpiteiro HTTP service
//!
//! JSON endpoints over [`palpite_core::IssuanceService`], with per-client
//! state kept in a cookie-keyed [`SessionRegistry`].

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod ui;

pub use config::ServerConfig;
pub use error::ApiError;
pub use session::{SessionRegistry, SESSION_COOKIE};

use actix_web::{web, App, HttpServer};
use palpite_core::{IssuanceService, Result, ServiceConfig, Storage, TrustingVerifier};
use std::path::Path;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct AppState {
    pub issuance: IssuanceService,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(issuance: IssuanceService) -> Self {
        Self {
            issuance,
            sessions: SessionRegistry::new(),
        }
    }

    /// SQLite storage at `db_path`, confirmations trusted
    pub async fn open(db_path: &Path, service_config: ServiceConfig) -> Result<Self> {
        let storage = Arc::new(Storage::new(db_path).await?);
        let issuance = IssuanceService::new(storage, Arc::new(TrustingVerifier), service_config)?;
        Ok(Self::new(issuance))
    }
}

pub async fn serve(server_config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    tracing::info!(
        "Listening on {}:{} (data in {})",
        server_config.bind,
        server_config.port,
        server_config.data_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind((server_config.bind.as_str(), server_config.port))?
    .run()
    .await
}
