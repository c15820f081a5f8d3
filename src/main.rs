use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use srv_redirector::{telemetry, Config, RedirectHandler, RedirectServer, UdpExchanger};
use tracing::{error, info};

/// Redirects HTTP requests to endpoints published in DNS SRV records.
#[derive(Parser, Debug)]
#[command(name = "srv-redirector")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Missing files fall back to defaults.
    #[arg(short, long, default_value = "srv-redirector.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        listen_addr = %config.server.listen_addr,
        nameserver = %config.resolver.nameserver,
        base_path = %config.redirect.base_path,
        status_code = config.redirect.status_code,
        strategy = ?config.redirect.strategy.kind,
        seed = config.redirect.strategy.seed,
        "Starting srv-redirector"
    );

    let exchanger = Arc::new(UdpExchanger::from_config(&config.resolver));
    let handler = Arc::new(RedirectHandler::from_config(&config.redirect, exchanger)?);
    let server = RedirectServer::bind(config.server.listen_addr, handler)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    };

    if let Err(e) = server.serve(shutdown).await {
        error!("HTTP server error: {}", e);
        return Err(e.into());
    }

    info!("srv-redirector shutdown complete");
    Ok(())
}
