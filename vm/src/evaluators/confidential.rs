//! Moves value between open balances, blinded balances and confidential
//! outputs.
//!
//! Amounts behind commitments are never seen here. Stateless validation
//! already checked that the commitments of each operation balance, so
//! what is left is bookkeeping: existence and ownership of spent
//! commitments, uniqueness of new ones and the per asset confidential
//! supply, which moves by exactly the value that enters or leaves
//! hidden form.

use {
  super::{record_detail, require_funds, Detail},
  crate::{
    authority::verify_authority_accounts,
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
    objects::{BlindedBalance, ConfidentialTx, DetailKind},
  },
  tracing::trace,
  veil_primitives::{
    AccountId,
    AssetAmount,
    AssetId,
    BlindInput,
    BlindOutput,
    BlindTransferOperation,
    ConfidentialOutput,
    Memo,
    Operation,
    PlaintextPayout,
    PublicKey,
    TransferFromBlindOperation,
    TransferFromConfidentialOperation,
    TransferToBlindOperation,
    TransferToConfidentialOperation,
    NULL_ACCOUNT,
    TEMP_ACCOUNT,
  },
};

/// Payouts only reach accounts that already carry the name of their
/// key.
fn payout_account(db: &Database, key: &PublicKey) -> Result<AccountId, LedgerError> {
  let name = key.to_string();
  db.account_by_name(&name)
    .map(|account| account.id)
    .ok_or(LedgerError::UnknownAccountName(name))
}

/// Outputs may only name existing accounts in their authorities and may
/// not collide with a live blinded balance.
fn check_blind_outputs(
  db: &Database,
  ctx: &EvalContext,
  outputs: &[BlindOutput],
) -> Result<(), LedgerError> {
  let max_membership = ctx.parameters().maximum_authority_membership;
  for out in outputs {
    verify_authority_accounts(db, &out.owner, max_membership)
      .map_err(LedgerError::TransferAuthority)?;
    if db.blinded.find_by_key(&out.commitment).is_some() {
      return Err(LedgerError::CommitmentExists(out.commitment));
    }
  }
  Ok(())
}

/// Every input has to be a live blinded balance of `asset` owned by
/// exactly the authority the input claims.
fn check_blind_inputs(
  db: &Database,
  asset: AssetId,
  inputs: &[BlindInput],
) -> Result<(), LedgerError> {
  for input in inputs {
    let balance = db
      .blinded
      .find_by_key(&input.commitment)
      .ok_or(LedgerError::UnknownCommitment(input.commitment))?;
    if balance.asset_id != asset {
      return Err(LedgerError::CommitmentAssetMismatch {
        commitment: input.commitment,
        expected: asset,
        found: balance.asset_id,
      });
    }
    if balance.owner != input.owner {
      return Err(LedgerError::CommitmentOwnerMismatch(input.commitment));
    }
  }
  Ok(())
}

fn create_blind_outputs(
  db: &mut Database,
  asset: AssetId,
  outputs: &[BlindOutput],
) -> Result<(), LedgerError> {
  for out in outputs {
    db.blinded.create(|id| BlindedBalance {
      id,
      commitment: out.commitment,
      asset_id: asset,
      owner: out.owner.clone(),
    })?;
  }
  Ok(())
}

/// Inputs are consumed whole.
fn remove_blind_inputs(
  db: &mut Database,
  inputs: &[BlindInput],
) -> Result<(), LedgerError> {
  for input in inputs {
    let id = db
      .blinded
      .find_by_key(&input.commitment)
      .ok_or(LedgerError::UnknownCommitment(input.commitment))?
      .id;
    db.blinded.remove(id)?;
  }
  Ok(())
}

fn check_confidential_outputs(
  db: &Database,
  outputs: &[ConfidentialOutput],
) -> Result<(), LedgerError> {
  for out in outputs {
    if db.confidential.find_by_key(&out.commitment).is_some() {
      return Err(LedgerError::CommitmentExists(out.commitment));
    }
  }
  Ok(())
}

fn create_confidential_output(
  db: &mut Database,
  ctx: &EvalContext,
  asset: AssetId,
  out: &ConfidentialOutput,
) -> Result<(), LedgerError> {
  db.confidential.create(|id| ConfidentialTx {
    id,
    commitment: out.commitment,
    asset_id: asset,
    tx_key: out.tx_key,
    owner: out.owner,
    data: out.data.clone(),
    range_proof: out.extension.range_proof().cloned().unwrap_or_default(),
    message: out.extension.message().map(<[u8]>::to_vec).unwrap_or_default(),
    unspent: true,
    timestamp: ctx.now(),
    block_number: ctx.head_block_num(),
  })?;
  Ok(())
}

#[derive(Default)]
pub struct TransferToBlindEvaluator;

impl Evaluator for TransferToBlindEvaluator {
  type Op = TransferToBlindOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::TransferToBlind(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.from)?;
    require_funds(db, op.from, &[op.amount, op.fee])?;
    check_blind_outputs(db, ctx, &op.outputs)
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.adjust_balance(op.from, -op.amount)?;
    db.adjust_confidential_supply(op.amount.asset_id, op.amount.amount)?;
    create_blind_outputs(db, op.amount.asset_id, &op.outputs)?;
    trace!("{} blinded into {} outputs", op.amount, op.outputs.len());
    Ok(OperationResult::None)
  }
}

/// Spends blinded balances into an open balance. The fee is paid out of
/// the spent value through the temporary account.
#[derive(Default)]
pub struct TransferFromBlindEvaluator;

impl Evaluator for TransferFromBlindEvaluator {
  type Op = TransferFromBlindOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::TransferFromBlind(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.to)?;
    db.asset(op.amount.asset_id)?;
    check_blind_inputs(db, op.amount.asset_id, &op.inputs)
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let released = op.amount.checked_add(&op.fee)?;

    db.adjust_balance(TEMP_ACCOUNT, op.fee)?;
    db.adjust_balance(op.to, op.amount)?;
    remove_blind_inputs(db, &op.inputs)?;
    db.adjust_confidential_supply(released.asset_id, -released.amount)?;

    record_detail(db, ctx, Detail {
      kind: DetailKind::ConfidentialTransfer,
      from: TEMP_ACCOUNT,
      to: op.to,
      amount: op.amount,
      fee: op.fee,
      description: "transfer from blind",
      memo: None,
    })?;
    Ok(OperationResult::None)
  }
}

/// Replaces blinded balances by new ones. Only the fee leaves hidden
/// form.
#[derive(Default)]
pub struct BlindTransferEvaluator;

impl Evaluator for BlindTransferEvaluator {
  type Op = BlindTransferOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::BlindTransfer(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    check_blind_outputs(db, ctx, &op.outputs)?;
    check_blind_inputs(db, op.fee.asset_id, &op.inputs)
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let asset = op.fee.asset_id;
    db.adjust_balance(TEMP_ACCOUNT, op.fee)?;
    remove_blind_inputs(db, &op.inputs)?;
    create_blind_outputs(db, asset, &op.outputs)?;
    db.adjust_confidential_supply(asset, -op.fee.amount)?;
    Ok(OperationResult::None)
  }
}

#[derive(Default)]
pub struct TransferToConfidentialEvaluator;

impl Evaluator for TransferToConfidentialEvaluator {
  type Op = TransferToConfidentialOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::TransferToConfidential(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.from)?;
    require_funds(db, op.from, &[op.amount, op.fee])?;
    check_confidential_outputs(db, &op.outputs)
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.adjust_balance(op.from, -op.amount)?;
    db.adjust_confidential_supply(op.amount.asset_id, op.amount.amount)?;
    for out in &op.outputs {
      create_confidential_output(db, ctx, op.amount.asset_id, out)?;
    }

    record_detail(db, ctx, Detail {
      kind: DetailKind::ConfidentialTransfer,
      from: op.from,
      to: NULL_ACCOUNT,
      amount: op.amount,
      fee: op.fee,
      description: "confidential transfer",
      memo: None,
    })?;
    Ok(OperationResult::None)
  }
}

/// Spends confidential outputs into new confidential outputs and
/// plaintext payouts.
///
/// Spent inputs are flagged rather than removed, so the history of an
/// output stays visible to its owner. Payouts travel as pseudo outputs
/// with the identity commitment and credit the existing account named
/// after their key.
#[derive(Default)]
pub struct TransferFromConfidentialEvaluator;

impl Evaluator for TransferFromConfidentialEvaluator {
  type Op = TransferFromConfidentialOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::TransferFromConfidential(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let asset = op.fee.asset_id;
    db.asset(asset)?;

    for input in &op.inputs {
      let output = db
        .confidential
        .find_by_key(&input.commitment)
        .ok_or(LedgerError::UnknownCommitment(input.commitment))?;
      if !output.unspent {
        return Err(LedgerError::AlreadySpent(input.commitment));
      }
      if output.owner != input.owner {
        return Err(LedgerError::CommitmentOwnerMismatch(input.commitment));
      }
      if output.asset_id != asset {
        return Err(LedgerError::CommitmentAssetMismatch {
          commitment: input.commitment,
          expected: asset,
          found: output.asset_id,
        });
      }
    }
    for payout in &op.payouts {
      payout_account(db, &payout.to)?;
    }
    check_confidential_outputs(db, &op.outputs)
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let asset = op.fee.asset_id;
    db.adjust_balance(TEMP_ACCOUNT, op.fee)?;

    let mut released = op.fee;
    for payout in &op.payouts {
      released = released.checked_add(&payout.amount)?;
    }
    db.adjust_confidential_supply(asset, -released.amount)?;

    for input in &op.inputs {
      let id = db
        .confidential
        .find_by_key(&input.commitment)
        .ok_or(LedgerError::UnknownCommitment(input.commitment))?
        .id;
      let was_unspent = db.confidential.modify(id, |output| {
        let was_unspent = output.unspent;
        output.unspent = false;
        output.range_proof.clear();
        was_unspent
      })?;
      if !was_unspent {
        return Err(LedgerError::AlreadySpent(input.commitment));
      }
    }

    for out in op.expanded_outputs() {
      if !out.commitment.is_identity() {
        create_confidential_output(db, ctx, asset, &out)?;
        continue;
      }

      let amount = PlaintextPayout::decode_data(&out.data)
        .filter(|amount: &AssetAmount| amount.asset_id == asset)
        .ok_or(LedgerError::MalformedPayout(out.owner))?;
      let to = payout_account(db, &out.owner)?;
      db.adjust_balance(to, amount)?;

      record_detail(db, ctx, Detail {
        kind: DetailKind::ConfidentialTransfer,
        from: TEMP_ACCOUNT,
        to,
        amount,
        fee: AssetAmount::new(0, op.fee.asset_id),
        description: "transfer from confidential",
        memo: out.extension.message().map(Memo::plain),
      })?;
    }
    Ok(OperationResult::None)
  }
}
