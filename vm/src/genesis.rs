use {
  crate::{
    database::Database,
    error::LedgerError,
    objects::{Asset, AssetDynamicData},
  },
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
  thiserror::Error,
  tracing::info,
  veil_primitives::{
    AccountId,
    AccountOptions,
    AssetAmount,
    AssetId,
    Authority,
    ChainParameters,
    Price,
    PublicKey,
    ShareType,
    Timestamp,
    ValidationError,
    CORE_ASSET,
    MINER_ACCOUNT,
    NULL_ACCOUNT,
    PROXY_TO_SELF_ACCOUNT,
    TEMP_ACCOUNT,
  },
};

#[derive(Debug, Error)]
pub enum GenesisError {
  #[error("invalid chain parameters: {0}")]
  Parameters(#[from] ValidationError),

  #[error("asset symbol {0} is defined twice")]
  DuplicateAsset(String),

  #[error("unknown asset symbol {0}")]
  UnknownAsset(String),

  #[error("well-known account {0} ended up with a different id")]
  MisplacedAccount(AccountId),

  #[error(transparent)]
  Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAsset {
  pub symbol: String,
  pub precision: u8,

  /// `core_units` of the core asset buy `asset_units` of this one.
  /// Ignored for the core asset.
  #[serde(default = "one")]
  pub core_units: ShareType,
  #[serde(default = "one")]
  pub asset_units: ShareType,
}

fn one() -> ShareType {
  1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
  /// Single owner key. The account is named after it.
  pub key: PublicKey,

  /// Initial open balances by asset symbol.
  #[serde(default)]
  pub balances: BTreeMap<String, ShareType>,
}

/// Initial state of a chain.
///
/// The first asset becomes the core asset with id `1.3.0`. Without any
/// assets a core asset named `VEIL` is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genesis {
  pub initial_timestamp: Timestamp,
  pub parameters: ChainParameters,

  /// Controls the miner account, and with it everything that needs a
  /// miner approved proposal. Nobody controls it when unset.
  pub miner_authority: Option<Authority>,
  pub assets: Vec<GenesisAsset>,
  pub accounts: Vec<GenesisAccount>,
}

impl Default for Genesis {
  fn default() -> Self {
    Self {
      initial_timestamp: Timestamp(1_600_000_000),
      parameters: ChainParameters::default(),
      miner_authority: None,
      assets: vec![],
      accounts: vec![],
    }
  }
}

/// An authority that no set of signatures satisfies.
fn nobody() -> Authority {
  Authority::new(1, [], [])
}

impl Genesis {
  pub fn build(&self) -> Result<Database, GenesisError> {
    self.parameters.validate()?;
    let mut db =
      Database::new(self.parameters.clone(), self.initial_timestamp);

    let well_known = [
      (
        MINER_ACCOUNT,
        "miner-account",
        self.miner_authority.clone().unwrap_or_else(nobody),
      ),
      (NULL_ACCOUNT, "null-account", nobody()),
      (TEMP_ACCOUNT, "temp-account", Authority::default()),
      (PROXY_TO_SELF_ACCOUNT, "proxy-to-self", nobody()),
    ];
    for (expected, name, owner) in well_known {
      let id = db.create_account(
        name.into(),
        owner,
        AccountOptions::default(),
        MINER_ACCOUNT,
      )?;
      if id != expected {
        return Err(GenesisError::MisplacedAccount(expected));
      }
    }

    let core = GenesisAsset {
      symbol: "VEIL".into(),
      precision: 5,
      core_units: 1,
      asset_units: 1,
    };
    let assets = match self.assets.is_empty() {
      true => std::slice::from_ref(&core),
      false => &self.assets[..],
    };

    let mut symbols = BTreeMap::new();
    for asset in assets {
      if symbols.contains_key(&asset.symbol) {
        return Err(GenesisError::DuplicateAsset(asset.symbol.clone()));
      }
      let id = create_asset(&mut db, asset)?;
      symbols.insert(asset.symbol.clone(), id);
    }

    for account in &self.accounts {
      let name = account.key.to_string();
      let id = match db.account_by_name(&name) {
        Some(existing) => existing.id,
        None => db.create_account(
          name,
          Authority::single_key(account.key),
          AccountOptions::default(),
          MINER_ACCOUNT,
        )?,
      };

      for (symbol, amount) in &account.balances {
        let asset = *symbols
          .get(symbol)
          .ok_or_else(|| GenesisError::UnknownAsset(symbol.clone()))?;
        db.adjust_balance(id, AssetAmount::new(*amount, asset))?;
        let data = db.asset(asset)?.dynamic_data;
        db.asset_data
          .modify(data, |d| d.current_supply += *amount)
          .map_err(LedgerError::from)?;
      }
    }

    info!(
      "genesis with {} accounts and {} assets at {}",
      db.accounts.len(),
      db.assets.len(),
      self.initial_timestamp
    );
    Ok(db)
  }
}

fn create_asset(
  db: &mut Database,
  asset: &GenesisAsset,
) -> Result<AssetId, GenesisError> {
  let dynamic_data = db
    .asset_data
    .create(|id| AssetDynamicData {
      id,
      ..Default::default()
    })
    .map_err(LedgerError::from)?
    .id;

  let id = db.assets.next_id();
  let core_exchange_rate = match id == CORE_ASSET {
    true => Price::unit(CORE_ASSET),
    false => Price::core_exchange(asset.core_units, asset.asset_units, id),
  };

  db.assets
    .create(|id| Asset {
      id,
      symbol: asset.symbol.clone(),
      precision: asset.precision,
      issuer: NULL_ACCOUNT,
      core_exchange_rate,
      dynamic_data,
    })
    .map_err(LedgerError::from)?;
  Ok(id)
}
