use {
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
    objects::Miner,
  },
  tracing::info,
  veil_primitives::{
    MinerCreateOperation,
    MinerUpdateGlobalParametersOperation,
    MinerUpdateOperation,
    Operation,
    VoteId,
  },
};

/// Turns an account into a miner candidate with its own vote id.
#[derive(Default)]
pub struct MinerCreateEvaluator;

impl Evaluator for MinerCreateEvaluator {
  type Op = MinerCreateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::MinerCreate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.miner_account)?;
    if db.miner_by_account(op.miner_account).is_some() {
      return Err(LedgerError::AlreadyMiner(op.miner_account));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let vote_id = db.global.modify(|g| {
      let vote = VoteId(g.next_available_vote_id);
      g.next_available_vote_id += 1;
      vote
    });

    let miner = db.miners.create(|id| Miner {
      id,
      miner_account: op.miner_account,
      url: op.url.clone(),
      signing_key: op.block_signing_key,
      vote_id,
    })?;
    Ok(OperationResult::Miner(miner.id))
  }
}

#[derive(Default)]
pub struct MinerUpdateEvaluator;

impl Evaluator for MinerUpdateEvaluator {
  type Op = MinerUpdateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::MinerUpdate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let miner = db
      .miners
      .find(op.miner)
      .ok_or(LedgerError::UnknownMiner(op.miner))?;
    if miner.miner_account != op.miner_account {
      return Err(LedgerError::NotMinerOwner {
        miner: op.miner,
        account: op.miner_account,
      });
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.miners.modify(op.miner, |miner| {
      if let Some(url) = &op.new_url {
        miner.url = url.clone();
      }
      if let Some(key) = op.new_signing_key {
        miner.signing_key = key;
      }
    })?;
    Ok(OperationResult::None)
  }
}

/// Schedules new chain parameters for the next block. Only reachable
/// through an approved proposal.
#[derive(Default)]
pub struct MinerUpdateGlobalParametersEvaluator;

impl Evaluator for MinerUpdateGlobalParametersEvaluator {
  type Op = MinerUpdateGlobalParametersOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::MinerUpdateGlobalParameters(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    _: &Database,
    ctx: &EvalContext,
    _: &Self::Op,
  ) -> Result<(), LedgerError> {
    if !ctx.is_proposed {
      return Err(LedgerError::ProposalOnly(
        veil_primitives::OperationKind::MinerUpdateGlobalParameters,
      ));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    info!("new chain parameters take effect with the next block");
    db.global
      .modify(|g| g.pending_parameters = Some(op.new_parameters.clone()));
    Ok(OperationResult::None)
  }
}
