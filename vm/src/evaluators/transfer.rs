use {
  super::{account_for_key, record_detail, require_funds, Detail},
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
    objects::DetailKind,
  },
  veil_primitives::{Operation, SetTransferFreezeBlockOperation, TransferOperation},
};

/// Moves an open balance to the account named after the recipient key,
/// creating that account when it does not exist yet.
#[derive(Default)]
pub struct TransferEvaluator;

impl Evaluator for TransferEvaluator {
  type Op = TransferOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::Transfer(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let frozen_at = ctx.parameters().freeze_transfers_after_block;
    if ctx.head_block_num() >= frozen_at {
      return Err(LedgerError::TransfersFrozen(frozen_at));
    }
    db.get_account(op.from)?;
    require_funds(db, op.from, &[op.amount, op.fee])
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let to = account_for_key(db, &op.to, op.from)?;
    db.adjust_balance(op.from, -op.amount)?;
    db.adjust_balance(to, op.amount)?;

    record_detail(db, ctx, Detail {
      kind: DetailKind::Transfer,
      from: op.from,
      to,
      amount: op.amount,
      fee: op.fee,
      description: "transfer",
      memo: op.memo.clone(),
    })?;
    Ok(OperationResult::Account(to))
  }
}

/// Lets the holder of the configured freeze key stop transfers from a
/// given block on.
#[derive(Default)]
pub struct SetTransferFreezeBlockEvaluator;

impl Evaluator for SetTransferFreezeBlockEvaluator {
  type Op = SetTransferFreezeBlockOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::SetTransferFreezeBlock(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let announcer = db.get_account(op.announcer)?;
    let authorized = ctx
      .parameters()
      .transfer_freeze_authority
      .map(|key| announcer.owner.key_auths.contains_key(&key))
      .unwrap_or(false);
    if !authorized {
      return Err(LedgerError::NotFreezeAuthority(op.announcer));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.global
      .modify(|g| g.parameters.freeze_transfers_after_block = op.block_num);
    Ok(OperationResult::None)
  }
}
