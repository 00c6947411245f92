//! Read-only views over the ledger for wallets and tooling.

use {
  crate::{
    authority::{self, Approvals},
    database::Database,
    error::LedgerError,
    fees::{self, FeeResult},
    objects::{Account, BlindedBalance, ConfidentialTx, TransactionDetail},
  },
  std::collections::BTreeSet,
  veil_primitives::{
    is_stealth_owner,
    AccountId,
    AssetAmount,
    AssetId,
    Commitment,
    Operation,
    PublicKey,
    Scalar,
    ShareType,
    TransferOperation,
  },
};

impl Database {
  /// Blinded balances behind the given commitments. Unknown commitments
  /// are skipped.
  pub fn get_blinded_balances(
    &self,
    commitments: &[Commitment],
  ) -> Vec<&BlindedBalance> {
    commitments
      .iter()
      .filter_map(|c| self.blinded.find_by_key(c))
      .collect()
  }

  /// Confidential outputs addressed to the holder of `scan_secret` and
  /// `spend_key`, in creation order. With `unspent_only` set, outputs
  /// that were already spent are left out.
  pub fn get_confidential_transactions(
    &self,
    scan_secret: &Scalar,
    spend_key: &PublicKey,
    unspent_only: bool,
  ) -> Vec<&ConfidentialTx> {
    self
      .confidential
      .iter()
      .filter(|tx| !unspent_only || tx.unspent)
      .filter(|tx| is_stealth_owner(scan_secret, spend_key, &tx.tx_key, &tx.owner))
      .collect()
  }

  pub fn get_account_by_name(&self, name: &str) -> Option<&Account> {
    self.account_by_name(name)
  }

  pub fn get_balance(&self, account: AccountId, asset: AssetId) -> AssetAmount {
    AssetAmount::new(self.balance(account, asset), asset)
  }

  /// Audit entries in which `account` sent or received value.
  pub fn get_transaction_details(
    &self,
    account: AccountId,
  ) -> Vec<&TransactionDetail> {
    self
      .details
      .iter()
      .filter(|d| d.from_account == account || d.to_account == account)
      .collect()
  }

  pub fn confidential_supply(&self, asset: AssetId) -> Result<ShareType, LedgerError> {
    Ok(self.asset_dynamic_data(asset)?.confidential_supply)
  }

  pub fn get_required_signatures(
    &self,
    ops: &[Operation],
    available: &BTreeSet<PublicKey>,
  ) -> Result<BTreeSet<PublicKey>, LedgerError> {
    Ok(authority::get_required_signatures(
      ops,
      available,
      self,
      self.parameters().max_authority_depth,
    )?)
  }

  pub fn get_potential_signatures(
    &self,
    ops: &[Operation],
  ) -> BTreeSet<PublicKey> {
    authority::get_potential_signatures(
      ops,
      self,
      self.parameters().max_authority_depth,
    )
  }

  /// Fails with the reason when `signers` do not exactly authorize
  /// `ops`.
  pub fn verify_authority(
    &self,
    ops: &[Operation],
    signers: &BTreeSet<PublicKey>,
  ) -> Result<(), LedgerError> {
    Ok(authority::verify_authority(
      ops,
      signers,
      self,
      self.parameters().max_authority_depth,
      Approvals::none(),
    )?)
  }

  /// Whether `signers` satisfy the authority of the account given by
  /// name or by id (`1.2.x`).
  ///
  /// An unknown account is an error, an unsatisfied authority is just
  /// `false`.
  pub fn verify_account_authority(
    &self,
    name_or_id: &str,
    signers: &BTreeSet<PublicKey>,
  ) -> Result<bool, LedgerError> {
    let account = match name_or_id.parse::<AccountId>() {
      Ok(id) => self.get_account(id)?,
      Err(_) => self
        .account_by_name(name_or_id)
        .ok_or_else(|| LedgerError::UnknownAccountName(name_or_id.into()))?,
    };

    // a transfer out of the account needs exactly its authority
    let sample: Operation = TransferOperation {
      fee: AssetAmount::default(),
      from: account.id,
      to: PublicKey::from_bytes([0; 32]),
      amount: AssetAmount::core(1),
      memo: None,
    }
    .into();
    Ok(self.verify_authority(&[sample], signers).is_ok())
  }

  pub fn get_required_fees(
    &self,
    ops: &[Operation],
    fee_asset: AssetId,
  ) -> Result<Vec<FeeResult>, LedgerError> {
    fees::get_required_fees(self, ops, fee_asset)
  }
}
