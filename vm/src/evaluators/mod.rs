//! One evaluator per operation kind, plus the bits they share.

pub mod account;
pub mod confidential;
pub mod miner;
pub mod proposal;
pub mod reserved;
pub mod transfer;
pub mod vesting;

use {
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    objects::{DetailKind, TransactionDetail},
  },
  std::collections::BTreeMap,
  veil_primitives::{
    AccountId,
    AccountOptions,
    AssetAmount,
    AssetId,
    Authority,
    Memo,
    PublicKey,
    ShareType,
  },
};

/// Fails unless `account` holds all of `amounts` at once. Amounts of
/// the same asset add up.
pub(crate) fn require_funds(
  db: &Database,
  account: AccountId,
  amounts: &[AssetAmount],
) -> Result<(), LedgerError> {
  let mut needed: BTreeMap<AssetId, ShareType> = BTreeMap::new();
  for amount in amounts {
    let entry = needed.entry(amount.asset_id).or_default();
    *entry = entry
      .checked_add(amount.amount)
      .ok_or(veil_primitives::AssetError::Overflow(*amount))?;
  }

  for (asset, needed) in needed {
    db.asset(asset)?;
    let available = db.balance(account, asset);
    if available < needed {
      return Err(LedgerError::InsufficientBalance {
        account,
        asset,
        needed,
        available,
      });
    }
  }
  Ok(())
}

/// The account named after `key`, created with `key` as its single
/// owner key if it does not exist yet.
pub(crate) fn account_for_key(
  db: &mut Database,
  key: &PublicKey,
  registrar: AccountId,
) -> Result<AccountId, LedgerError> {
  let name = key.to_string();
  if let Some(account) = db.account_by_name(&name) {
    return Ok(account.id);
  }
  let id = db.create_account(
    name,
    Authority::single_key(*key),
    AccountOptions::default(),
    registrar,
  )?;
  db.dynamic
    .modify(|d| d.accounts_registered_this_interval += 1);
  tracing::debug!("implicitly created account {id} for {key}");
  Ok(id)
}

/// Content of an audit entry, the store fills in the names and the
/// position in the chain.
pub(crate) struct Detail {
  pub kind: DetailKind,
  pub from: AccountId,
  pub to: AccountId,
  pub amount: AssetAmount,
  pub fee: AssetAmount,
  pub description: &'static str,
  pub memo: Option<Memo>,
}

pub(crate) fn record_detail(
  db: &mut Database,
  ctx: &EvalContext,
  detail: Detail,
) -> Result<(), LedgerError> {
  let name = |id| db.find_account(id).map(|a| a.name.clone());
  let from_name = name(detail.from);
  let to_name = name(detail.to);

  db.details.create(|id| TransactionDetail {
    id,
    kind: detail.kind,
    from_account: detail.from,
    to_account: detail.to,
    from_name,
    to_name,
    amount: detail.amount,
    fee: detail.fee,
    description: detail.description.to_owned(),
    memo: detail.memo,
    timestamp: ctx.now(),
    block_number: ctx.head_block_num(),
  })?;
  Ok(())
}
