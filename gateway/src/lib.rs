pub mod auth;
pub mod coerce;
pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod router;
pub mod service;

pub use config::Config;
pub use errors::{GatewayError, StartupError};
pub use handler::{
    Context, Envelope, EventHandler, FnHandler, HandlerError, HandlerExport, HandlerModule,
    HandlerResponse,
};

use router::Router;
use service::GatewayService;
use std::sync::Arc;

/// The resolved handlers behind the gateway's two authenticated routes.
pub struct Handlers {
    pub check: Arc<dyn EventHandler>,
    pub identify_duplicates: Arc<dyn EventHandler>,
}

/// Binds the configured listener and serves the gateway until the process
/// terminates.
pub async fn run(config: Config, handlers: Handlers) -> Result<(), GatewayError> {
    let listener = shared::http::bind(&config.listener.host, config.listener.port).await?;
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "Gateway listening"
    );

    let router = Router::new(&config, handlers.check, handlers.identify_duplicates);
    shared::http::serve(listener, GatewayService::new(router)).await
}
