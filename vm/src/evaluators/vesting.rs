use {
  super::{record_detail, require_funds, Detail},
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
    objects::{DetailKind, VestingBalance},
  },
  veil_primitives::{
    AssetError,
    Operation,
    VestingBalanceCreateOperation,
    VestingBalanceWithdrawOperation,
  },
};

#[derive(Default)]
pub struct VestingBalanceCreateEvaluator;

impl Evaluator for VestingBalanceCreateEvaluator {
  type Op = VestingBalanceCreateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::VestingBalanceCreate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.creator)?;
    db.get_account(op.owner)?;
    require_funds(db, op.creator, &[op.amount, op.fee])
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.adjust_balance(op.creator, -op.amount)?;
    let balance = db.vesting.create(|id| VestingBalance {
      id,
      owner: op.owner,
      balance: op.amount,
      begin_balance: op.amount.amount,
      withdrawn: 0,
      policy: op.policy,
    })?;
    Ok(OperationResult::VestingBalance(balance.id))
  }
}

#[derive(Default)]
pub struct VestingBalanceWithdrawEvaluator;

impl Evaluator for VestingBalanceWithdrawEvaluator {
  type Op = VestingBalanceWithdrawOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::VestingBalanceWithdraw(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let vesting = db
      .vesting_balance(op.vesting_balance)
      .ok_or(LedgerError::UnknownVestingBalance(op.vesting_balance))?;
    if vesting.owner != op.owner {
      return Err(LedgerError::NotVestingOwner {
        balance: vesting.id,
        owner: vesting.owner,
      });
    }
    if vesting.balance.asset_id != op.amount.asset_id {
      return Err(
        AssetError::Mismatch(vesting.balance.asset_id, op.amount.asset_id)
          .into(),
      );
    }

    let available = vesting.policy.allowed_withdraw(
      vesting.begin_balance,
      vesting.withdrawn,
      ctx.now(),
    );
    if op.amount.amount > available {
      return Err(LedgerError::InsufficientVested {
        requested: op.amount,
        available,
      });
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.vesting.modify(op.vesting_balance, |vesting| {
      vesting.balance.amount -= op.amount.amount;
      vesting.withdrawn += op.amount.amount;
    })?;
    db.adjust_balance(op.owner, op.amount)?;

    record_detail(db, ctx, Detail {
      kind: DetailKind::VestingWithdraw,
      from: op.owner,
      to: op.owner,
      amount: op.amount,
      fee: op.fee,
      description: "vesting withdraw",
      memo: None,
    })?;
    Ok(OperationResult::None)
  }
}
