//! cryptic-daemon Entry Point

use anyhow::Context;
use clap::Parser;
use cryptic_daemon::cli::{Cli, Commands};
use cryptic_daemon::shutdown::ShutdownController;
use cryptic_daemon::{api, bootstrap, config, docs, endpoints, logging, server};
use cryptic_daemon_common::config::DaemonConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = config::from_env();

    let sentry_guard = match logging::init(&config.log_level, config.sentry_dsn.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Docs(args)) => generate_docs(&args.output),
        Some(Commands::Serve(args)) => serve(args.apply(config)).await,
        // No subcommand - default to serve
        None => serve(config).await,
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        if let Some(guard) = &sentry_guard {
            guard.flush(Some(std::time::Duration::from_secs(2)));
        }
        std::process::exit(1);
    }
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    bootstrap::check_api_token(&config)?;

    let sessions = bootstrap::prepare_database(&config)
        .await
        .context("failed to prepare database")?;
    let collections = endpoints::collections()?;
    let app = api::create_app(&config, sessions, collections)
        .context("failed to register endpoint collections")?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;

    server::run(app, listener, ShutdownController::default()).await?;
    Ok(())
}

fn generate_docs(output: &std::path::Path) -> anyhow::Result<()> {
    let collections = endpoints::collections()?;
    let written = docs::write_docs(&collections, output)?;
    tracing::info!("wrote {} documentation files to {}", written.len(), output.display());
    Ok(())
}
