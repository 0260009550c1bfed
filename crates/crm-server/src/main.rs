//! crm-server binary.
//!
//! Resolves configuration for the selected profile, opens the SQLite store
//! and serves the contacts JSON API over HTTP.
//!
//! ```text
//! cargo run -p crm-server -- --profile production --config /etc/crm.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use crm_core::service::ContactService;
use crm_server::{Profile, load_config, prepare_store_path};
use crm_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Contacts JSON API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Configuration profile to run under.
  #[arg(
    short,
    long,
    env = "CRM_PROFILE",
    value_enum,
    default_value_t = Profile::Development
  )]
  profile: Profile,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = load_config(cli.profile, &cli.config)
    .with_context(|| format!("failed to load {} configuration", cli.profile))?;

  let store_path =
    prepare_store_path(&server_cfg.store_path).with_context(|| {
      format!("failed to prepare store directory {:?}", server_cfg.store_path)
    })?;

  let store = SqliteStore::open(&store_path, server_cfg.isolation_level)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  tracing::info!(
    profile = %cli.profile,
    store = %store_path.display(),
    isolation = %server_cfg.isolation_level,
    "store opened"
  );

  let app = crm_api::api_router(Arc::new(ContactService::new(store)));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

/// Resolve on Ctrl-C. If the handler cannot be installed, never resolve.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
}
