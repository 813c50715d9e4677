use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use recall::config::{self, CliArgs, Config};
use recall::{create_app, db, run_migrations, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer};

/// Builds a formatting layer, JSON or human-readable
fn format_layer<S, W>(json: bool, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer().with_ansi(ansi).with_writer(writer).boxed()
    }
}

/// Initializes logging to stdout and, if configured, a daily log file
///
/// The returned guard must be held for the life of the process so buffered
/// file logs are flushed.
fn init_tracing(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "recall=debug,tower_http=debug" } else { "recall=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "recall.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(format_layer(config.log_json, writer, false)), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(format_layer(config.log_json, std::io::stdout, true))
        .with(file_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = config::get_config(args);

    let _guard = init_tracing(&config, debug);

    let pool = db::init_pool(&config.database_url)
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    {
        let mut conn = pool.get().context("Failed to get a connection for migrations")?;
        run_migrations(&mut conn)?;
    }

    let state = AppState::from_config(Arc::new(pool), &config);
    let app = create_app(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
