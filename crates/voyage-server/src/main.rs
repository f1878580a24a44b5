//! voyage-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `VOYAGE_*` environment variables, opens the SQLite store, starts the
//! recommendation worker and serves the JSON API under `/api`.
//!
//! # Creating an owner
//!
//! ```
//! cargo run -p voyage-server -- --add-owner alice@example.com
//! ```

mod config;
mod recommender;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, http::HeaderName};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use voyage_api::{AppState, RecommendationQueue, run_worker};
use voyage_core::store::PlannerStore;
use voyage_store_sqlite::SqliteStore;

use crate::{config::ServerConfig, recommender::Idle};

#[derive(Parser)]
#[command(author, version, about = "Voyage travel-plan server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create an owner with this email, print its id and exit.
  #[arg(long, value_name = "EMAIL")]
  add_owner: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = ::config::Config::builder()
    .add_source(::config::File::from(cli.config).required(false))
    .add_source(::config::Environment::with_prefix("VOYAGE").try_parsing(true))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let identity_header = HeaderName::try_from(server_cfg.identity_header.as_str())
    .with_context(|| format!("invalid identity_header {:?}", server_cfg.identity_header))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: create an owner and exit.
  if let Some(email) = cli.add_owner {
    let owner = store
      .add_owner(email)
      .await
      .context("failed to create owner")?;
    println!("{}", owner.owner_id);
    return Ok(());
  }

  let store = Arc::new(store);
  let (queue, tasks) = RecommendationQueue::new(server_cfg.recommendation_queue_capacity);
  tokio::spawn(run_worker(store.clone(), Idle, tasks));

  let state = AppState { store, queue, identity_header };
  let app = Router::new()
    .nest("/api", voyage_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!(store = ?store_path, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  match (s.strip_prefix("~/"), std::env::var("HOME")) {
    (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
