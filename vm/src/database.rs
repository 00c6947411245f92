use {
  crate::{
    authority::AuthoritySource,
    context::ChainContext,
    error::LedgerError,
    objects::*,
    store::{Singleton, Table, Undoable},
  },
  tracing::trace,
  veil_primitives::{
    AccountId,
    AccountOptions,
    AssetAmount,
    AssetError,
    AssetId,
    Authority,
    Block,
    ChainParameters,
    ShareType,
    Timestamp,
  },
};

/// Ledger state: every table of the object store plus the chain wide
/// singletons.
///
/// All mutations go through the tables, so a whole group of them can be
/// reverted by [`Database::with_undo_session`].
#[derive(Debug, Clone)]
pub struct Database {
  pub(crate) accounts: Table<Account>,
  pub(crate) statistics: Table<AccountStatistics>,
  pub(crate) balances: Table<AccountBalance>,
  pub(crate) assets: Table<Asset>,
  pub(crate) asset_data: Table<AssetDynamicData>,
  pub(crate) miners: Table<Miner>,
  pub(crate) proposals: Table<Proposal>,
  pub(crate) vesting: Table<VestingBalance>,
  pub(crate) transactions: Table<TransactionRecord>,
  pub(crate) blinded: Table<BlindedBalance>,
  pub(crate) confidential: Table<ConfidentialTx>,
  pub(crate) details: Table<TransactionDetail>,
  pub(crate) global: Singleton<GlobalProperties>,
  pub(crate) dynamic: Singleton<DynamicGlobalProperties>,
}

impl Database {
  /// An empty ledger at block zero. Use [`crate::Genesis`] to get one
  /// with the well-known accounts and the core asset in place.
  pub fn new(parameters: ChainParameters, time: Timestamp) -> Self {
    Self {
      accounts: Table::default(),
      statistics: Table::default(),
      balances: Table::default(),
      assets: Table::default(),
      asset_data: Table::default(),
      miners: Table::default(),
      proposals: Table::default(),
      vesting: Table::default(),
      transactions: Table::default(),
      blinded: Table::default(),
      confidential: Table::default(),
      details: Table::default(),
      global: Singleton::new(GlobalProperties {
        parameters,
        pending_parameters: None,
        next_available_vote_id: 0,
      }),
      dynamic: Singleton::new(DynamicGlobalProperties {
        head_block_number: 0,
        head_block_id: Block::zero(time).hash().to_bytes(),
        time,
        accounts_registered_this_interval: 0,
      }),
    }
  }

  pub fn global_properties(&self) -> &GlobalProperties {
    self.global.get()
  }

  pub fn dynamic_properties(&self) -> &DynamicGlobalProperties {
    self.dynamic.get()
  }

  pub fn parameters(&self) -> &ChainParameters {
    &self.global.get().parameters
  }

  pub fn head_block_num(&self) -> u32 {
    self.dynamic.get().head_block_number
  }

  pub fn head_block_time(&self) -> Timestamp {
    self.dynamic.get().time
  }

  /// Snapshot of what operations of the next transactions get to see.
  pub fn chain_context(&self) -> ChainContext {
    ChainContext {
      parameters: self.parameters().clone(),
      head_block_num: self.head_block_num(),
      head_block_time: self.head_block_time(),
    }
  }

  pub fn find_account(&self, id: AccountId) -> Option<&Account> {
    self.accounts.find(id)
  }

  pub fn get_account(&self, id: AccountId) -> Result<&Account, LedgerError> {
    self.accounts.find(id).ok_or(LedgerError::UnknownAccount(id))
  }

  pub fn account_by_name(&self, name: &str) -> Option<&Account> {
    self.accounts.find_by_key(&name.to_owned())
  }

  pub fn account_statistics(
    &self,
    id: AccountId,
  ) -> Result<&AccountStatistics, LedgerError> {
    self
      .statistics
      .find_by_key(&id)
      .ok_or(LedgerError::UnknownAccount(id))
  }

  pub fn asset(&self, id: AssetId) -> Result<&Asset, LedgerError> {
    self.assets.find(id).ok_or(LedgerError::UnknownAsset(id))
  }

  pub fn asset_by_symbol(&self, symbol: &str) -> Option<&Asset> {
    self.assets.find_by_key(&symbol.to_owned())
  }

  pub fn asset_dynamic_data(
    &self,
    id: AssetId,
  ) -> Result<&AssetDynamicData, LedgerError> {
    let data = self.asset(id)?.dynamic_data;
    Ok(self.asset_data.get(data)?)
  }

  pub fn miner_by_account(&self, account: AccountId) -> Option<&Miner> {
    self.miners.find_by_key(&account)
  }

  pub fn proposal(&self, id: veil_primitives::ProposalId) -> Option<&Proposal> {
    self.proposals.find(id)
  }

  pub fn vesting_balance(
    &self,
    id: veil_primitives::VestingBalanceId,
  ) -> Option<&VestingBalance> {
    self.vesting.find(id)
  }

  /// Open balance of an account, zero when it never held the asset.
  pub fn balance(&self, account: AccountId, asset: AssetId) -> ShareType {
    self
      .balances
      .find_by_key(&(account, asset))
      .map(|b| b.balance)
      .unwrap_or(0)
  }

  /// Adds `delta` (possibly negative) to an open balance.
  ///
  /// Fails without changing anything when the balance would go below
  /// zero.
  pub fn adjust_balance(
    &mut self,
    account: AccountId,
    delta: AssetAmount,
  ) -> Result<(), LedgerError> {
    if delta.amount == 0 {
      return Ok(());
    }

    let existing = self
      .balances
      .find_by_key(&(account, delta.asset_id))
      .map(|b| (b.id, b.balance));

    let available = existing.map(|(_, b)| b).unwrap_or(0);
    let updated = available
      .checked_add(delta.amount)
      .ok_or(AssetError::Overflow(delta))?;
    if updated < 0 {
      return Err(LedgerError::InsufficientBalance {
        account,
        asset: delta.asset_id,
        needed: -delta.amount,
        available,
      });
    }

    match existing {
      Some((id, _)) => self.balances.modify(id, |b| b.balance = updated)?,
      None => {
        self.balances.create(|id| AccountBalance {
          id,
          owner: account,
          asset_id: delta.asset_id,
          balance: updated,
        })?;
      }
    }

    trace!("balance of {account} adjusted by {delta} to {updated}");
    Ok(())
  }

  /// Adds `delta` to the confidential supply of an asset, refusing to
  /// take it below zero.
  pub fn adjust_confidential_supply(
    &mut self,
    asset: AssetId,
    delta: ShareType,
  ) -> Result<(), LedgerError> {
    let data_id = self.asset(asset)?.dynamic_data;
    let current = self.asset_data.get(data_id)?.confidential_supply;
    let updated = current
      .checked_add(delta)
      .ok_or(AssetError::Overflow(AssetAmount::new(delta, asset)))?;
    if updated < 0 {
      return Err(LedgerError::NegativeConfidentialSupply(asset));
    }
    self
      .asset_data
      .modify(data_id, |d| d.confidential_supply = updated)?;
    Ok(())
  }

  /// Charges `fee` to `payer` and books it on the payer's statistics
  /// and the fee asset's collected fees.
  pub fn pay_fee(
    &mut self,
    payer: AccountId,
    fee: &AssetAmount,
  ) -> Result<(), LedgerError> {
    let asset = self.asset(fee.asset_id)?;
    let core = fee.convert(&asset.core_exchange_rate)?;
    let data_id = asset.dynamic_data;
    let statistics = self.get_account(payer)?.statistics;

    self.adjust_balance(payer, -*fee)?;
    self.statistics.modify(statistics, |s| {
      s.total_ops += 1;
      s.pending_fees += core.amount;
    })?;
    self
      .asset_data
      .modify(data_id, |d| d.accumulated_fees += fee.amount)?;
    Ok(())
  }

  /// Creates an account together with its statistics record.
  pub fn create_account(
    &mut self,
    name: String,
    owner: Authority,
    options: AccountOptions,
    registrar: AccountId,
  ) -> Result<AccountId, LedgerError> {
    if self.account_by_name(&name).is_some() {
      return Err(LedgerError::AccountNameTaken(name));
    }

    let statistics = self.statistics.next_id();
    let account = self
      .accounts
      .create(|id| Account {
        id,
        name,
        owner,
        options,
        registrar,
        statistics,
      })?
      .id;
    self.statistics.create(|id| AccountStatistics {
      id,
      owner: account,
      total_ops: 0,
      pending_fees: 0,
    })?;
    Ok(account)
  }

  /// Runs `f` inside an undo session: its changes are kept when it
  /// returns `Ok` and reverted when it returns `Err`.
  ///
  /// Sessions nest, committing an inner session folds its changes into
  /// the enclosing one.
  pub fn with_undo_session<R>(
    &mut self,
    f: impl FnOnce(&mut Self) -> Result<R, LedgerError>,
  ) -> Result<R, LedgerError> {
    self.for_each_store(|s| s.start_undo());
    match f(self) {
      Ok(output) => {
        self.for_each_store(|s| s.commit());
        Ok(output)
      }
      Err(e) => {
        self.for_each_store(|s| s.undo());
        Err(e)
      }
    }
  }

  fn for_each_store(&mut self, mut op: impl FnMut(&mut dyn Undoable)) {
    let stores: [&mut dyn Undoable; 14] = [
      &mut self.accounts,
      &mut self.statistics,
      &mut self.balances,
      &mut self.assets,
      &mut self.asset_data,
      &mut self.miners,
      &mut self.proposals,
      &mut self.vesting,
      &mut self.transactions,
      &mut self.blinded,
      &mut self.confidential,
      &mut self.details,
      &mut self.global,
      &mut self.dynamic,
    ];
    for store in stores {
      op(store);
    }
  }
}

impl AuthoritySource for Database {
  fn authority(&self, account: AccountId) -> Option<&Authority> {
    self.accounts.find(account).map(|a| &a.owner)
  }
}
