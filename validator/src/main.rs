use {
  crate::{
    replay::{replay, BlockTemplate},
    settings::SystemSettings,
  },
  anyhow::Context,
  clap::Parser,
  metrics_exporter_prometheus::PrometheusBuilder,
  serde::de::DeserializeOwned,
  std::path::Path,
  tracing::{info, subscriber::set_global_default, warn},
  tracing_subscriber::{EnvFilter, FmtSubscriber},
  veil_primitives::{Block, CORE_ASSET},
  veil_vm::Genesis,
};

mod replay;
mod settings;

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let bytes = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_slice(&bytes)
    .with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // gather CLI parameters
  let settings = SystemSettings::parse();

  // configure logging
  set_global_default(
    FmtSubscriber::builder()
      .with_env_filter(EnvFilter::try_new(settings.log_filter())?)
      .finish(),
  )?;
  info!("startup settings: {settings:#?}");

  if settings.metrics() {
    PrometheusBuilder::new().install()?;
  }

  let genesis: Genesis = match settings.genesis() {
    Some(path) => read_json(path).await?,
    None => Genesis::default(),
  };
  let mut db = genesis.build()?;
  let head = Block::zero(genesis.initial_timestamp);

  let templates: Vec<BlockTemplate> = match settings.blocks() {
    Some(path) => read_json(path).await?,
    None => vec![],
  };
  info!("replaying {} blocks", templates.len());
  let head = replay(&mut db, head, templates)?;

  let properties = db.dynamic_properties();
  info!(
    "head block {} at {}, confidential supply {}",
    head.height,
    properties.time,
    db.confidential_supply(CORE_ASSET)?
  );

  for name in settings.accounts() {
    match db.get_account_by_name(name) {
      Some(account) => {
        info!("{name} ({}): {}", account.id, db.get_balance(account.id, CORE_ASSET))
      }
      None => warn!("no account named {name}"),
    }
  }

  if settings.metrics() {
    info!("serving metrics, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
  }

  Ok(())
}
