use {clap::Parser, std::path::PathBuf};

/// Veil Ledger Validator
///
/// Builds the initial ledger state from a genesis file and applies a
/// sequence of blocks on top of it, one after another.
#[derive(Debug, Parser)]
pub struct SystemSettings {
  /// Genesis state as JSON. Without it the chain starts with only the
  /// well-known accounts and the core asset.
  #[clap(long, short, value_name = "FILE")]
  genesis: Option<PathBuf>,

  /// Blocks to apply, as a JSON array of `{timestamp, transactions}`
  #[clap(long, short, value_name = "FILE")]
  blocks: Option<PathBuf>,

  /// Names of accounts whose balances are printed after replay
  #[clap(long, short, value_name = "NAME")]
  account: Vec<String>,

  /// Serve prometheus metrics and keep running until interrupted
  #[clap(long, short)]
  metrics: bool,

  /// Log filter directives
  #[clap(long, short, default_value = "info", value_name = "FILTER")]
  log: String,
}

impl SystemSettings {
  pub fn genesis(&self) -> Option<&PathBuf> {
    self.genesis.as_ref()
  }

  pub fn blocks(&self) -> Option<&PathBuf> {
    self.blocks.as_ref()
  }

  pub fn accounts(&self) -> &[String] {
    &self.account
  }

  pub fn metrics(&self) -> bool {
    self.metrics
  }

  pub fn log_filter(&self) -> &str {
    &self.log
  }
}
