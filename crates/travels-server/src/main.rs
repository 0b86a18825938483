//! travels server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), unpacks the
//! dataset archive, loads it into an in-memory store, and serves the JSON API
//! over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use travels_server::{ServerConfig, load};
use travels_store_memory::MemoryStore;

#[derive(Parser)]
#[command(author, version, about = "Travels data server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TRAVELS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let loader_cfg = server_cfg.clone();
  let (reference, dataset) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
    load::unpack_archive(&loader_cfg.archive_path, &loader_cfg.data_dir)?;
    let reference = load::reference_instant(&loader_cfg.data_dir, &loader_cfg.archive_path);
    let dataset = load::load_dir(&loader_cfg.data_dir)
      .with_context(|| format!("failed to load data from {:?}", loader_cfg.data_dir))?;
    Ok((reference, dataset))
  })
  .await
  .context("loader task panicked")??;

  let store = MemoryStore::seed(reference, dataset.users, dataset.locations, dataset.visits);
  let counts = store.counts();
  tracing::info!(
    users = counts.users,
    locations = counts.locations,
    visits = counts.visits,
    reference,
    "store seeded"
  );

  let app = travels_server::app(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
