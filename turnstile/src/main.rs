mod handlers;

use clap::Parser;
use gateway::config::StatsdConfig;
use gateway::{Config, HandlerExport, Handlers, StartupError};
use metrics_exporter_statsd::StatsdBuilder;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "turnstile",
    about = "Authenticated HTTP gateway for the check and identify-duplicates computations"
)]
struct Args {
    /// Listen port; overrides the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Sentry wants to come up before the async runtime; the guard flushes
    // on drop when main returns.
    let _sentry_guard = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), StartupError> {
    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    if config.auth_token.is_none() {
        tracing::error!(
            "INTERNAL_AUTH_TOKEN is not set; authenticated routes will return 500 until it is configured"
        );
    }

    if let Some(statsd) = &config.statsd {
        init_metrics(statsd)?;
    }

    // Resolve both handlers before binding. An unresolvable handler must
    // never reach the accept loop.
    let handlers = Handlers {
        check: HandlerExport::Callable(Arc::new(handlers::CheckHandler)).resolve("check")?,
        identify_duplicates: HandlerExport::Callable(Arc::new(handlers::IdentifyDuplicatesHandler))
            .resolve("identify-duplicates")?,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(gateway::run(config, handlers))?;
    Ok(())
}

fn init_metrics(statsd: &StatsdConfig) -> Result<(), StartupError> {
    let recorder = StatsdBuilder::from(&statsd.host, statsd.port)
        .build(Some("turnstile"))
        .map_err(|e| StartupError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| StartupError::Metrics(e.to_string()))?;

    tracing::info!(host = %statsd.host, port = statsd.port, "StatsD metrics enabled");
    Ok(())
}
