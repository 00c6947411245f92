use {
  super::{record_detail, Detail},
  crate::{
    authority::verify_authority_accounts,
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
    objects::DetailKind,
  },
  veil_primitives::{
    AccountCreateOperation,
    AccountOptions,
    AccountUpdateOperation,
    AssetAmount,
    Operation,
    ValidationError,
  },
};

/// Vote and voting account checks shared by account create and update.
fn check_options(
  db: &Database,
  ctx: &EvalContext,
  options: &AccountOptions,
) -> Result<(), LedgerError> {
  db.get_account(options.voting_account)?;

  let max = ctx.parameters().maximum_miner_count;
  if options.num_miner > max {
    return Err(LedgerError::TooManyMiners {
      wanted: options.num_miner,
      max,
    });
  }

  let next_vote = db.global_properties().next_available_vote_id;
  if let Some(vote) = options.votes.iter().find(|v| v.0 >= next_vote) {
    return Err(LedgerError::UnknownVote(*vote));
  }
  Ok(())
}

/// Registers a new account named after the first key of its owner.
#[derive(Default)]
pub struct AccountCreateEvaluator {
  name: String,
}

impl Evaluator for AccountCreateEvaluator {
  type Op = AccountCreateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::AccountCreate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.registrar)?;
    check_options(db, ctx, &op.options)?;

    let max_membership = ctx.parameters().maximum_authority_membership;
    verify_authority_accounts(db, &op.owner, max_membership)
      .map_err(LedgerError::AccountCreateAuthority)?;

    self.name = op
      .owner
      .first_key()
      .ok_or(ValidationError::OwnerWithoutKeys)?
      .to_string();
    if db.account_by_name(&self.name).is_some() {
      return Err(LedgerError::AccountNameTaken(self.name.clone()));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let account = db.create_account(
      std::mem::take(&mut self.name),
      op.owner.clone(),
      op.options.clone(),
      op.registrar,
    )?;
    db.dynamic
      .modify(|d| d.accounts_registered_this_interval += 1);

    record_detail(db, ctx, Detail {
      kind: DetailKind::AccountCreate,
      from: op.registrar,
      to: account,
      amount: AssetAmount::new(0, op.fee.asset_id),
      fee: op.fee,
      description: "account create",
      memo: None,
    })?;
    Ok(OperationResult::Account(account))
  }
}

#[derive(Default)]
pub struct AccountUpdateEvaluator;

impl Evaluator for AccountUpdateEvaluator {
  type Op = AccountUpdateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::AccountUpdate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.account)?;
    if let Some(owner) = &op.owner {
      let max_membership = ctx.parameters().maximum_authority_membership;
      verify_authority_accounts(db, owner, max_membership)
        .map_err(LedgerError::AccountUpdateAuthority)?;
    }
    if let Some(options) = &op.new_options {
      check_options(db, ctx, options)?;
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.accounts.modify(op.account, |account| {
      if let Some(owner) = &op.owner {
        account.owner = owner.clone();
      }
      if let Some(options) = &op.new_options {
        account.options = options.clone();
      }
    })?;
    Ok(OperationResult::None)
  }
}
