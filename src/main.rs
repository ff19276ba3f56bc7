//! Signet attestation gateway.
//!
//! Main entry point. Loads configuration, registers the built-in webhook
//! handlers and signer providers, assembles the router, and serves until
//! a shutdown signal arrives.

use anyhow::{Context, Result};
use tracing::{debug, info};

use signet_gateway::{build_router, serve, Config};
use signet_gateway::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use signet_signer::{register_builtin_providers, SignerRegistry};
use signet_webhook::{register_builtin_handlers, HandlerRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting Signet attestation gateway");

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;
    info!(
        config = %config_path,
        listen_addr = %config.listen_addr,
        webhooks = config.webhooks.len(),
        "Configuration loaded"
    );

    let mut handlers = HandlerRegistry::new();
    register_builtin_handlers(&mut handlers).context("failed to register webhook handlers")?;
    let mut signers = SignerRegistry::new();
    register_builtin_providers(&mut signers).context("failed to register signer providers")?;
    for entry in handlers.entries() {
        debug!(handler = entry.type_name, options = entry.options.len(), "handler available");
    }
    for entry in signers.entries() {
        debug!(signer = entry.type_name, options = entry.options.len(), "signer available");
    }

    let router = build_router(&config, &handlers, &signers)
        .await
        .context("failed to assemble webhook routes")?;

    let addr = config.socket_addr()?;
    info!(addr = %addr, "Signet is ready to receive webhooks");

    serve(addr, router).await.context("server failed")?;

    info!("Signet shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,signet=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
