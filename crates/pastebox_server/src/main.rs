//! Headless API server entrypoint.

use pastebox_core::DEFAULT_PORT;
use pastebox_server::{config::Config, db::Database, serve_router, AppState, BlobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    check: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--check" => flags.check = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

/// Open both stores; any failure here aborts startup.
fn open_storage(config: &Config) -> anyhow::Result<(Database, BlobStore)> {
    let database = Database::new(&config.db_path)?;
    let blobs = BlobStore::open(&config.attachments_path)
        .map_err(|err| anyhow::anyhow!("Cannot open attachment store: {}", err))?;
    Ok((database, blobs))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pastebox=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let (database, blobs) = open_storage(&config)?;

    if cli_flags.check {
        println!("Database: {}", config.db_path);
        println!("Attachments: {}", blobs.root().display());
        println!("Storage OK");
        return Ok(());
    }

    let state = AppState::new(config.clone(), database, blobs);

    let allow_public = pastebox_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = pastebox_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!(
        attachments = %config.attachments_path,
        "Pastebox running at http://{}",
        actual_addr
    );

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

fn print_help() {
    println!("Pastebox Server\n");
    println!("Usage: pastebox [OPTIONS]\n");
    println!("Options:");
    println!("  --check           Open the database and attachment store, then exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/pastebox/db)");
    println!(
        "  ATTACHMENTS_PATH  Absolute attachment directory (default: ~/.cache/pastebox/attachments)"
    );
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_PASTE_SIZE    Maximum paste text size in bytes (default: 10MB)");
    println!("  AUTH_HEADER       Header naming the authenticated user (default: x-remote-user)");
    println!("  ADMIN_USERS       Comma-separated users allowed to manage any paste");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
