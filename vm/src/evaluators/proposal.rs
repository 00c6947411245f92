use {
  crate::{
    authority::{required_authorities, verify_authority, Approvals},
    context::{ChainContext, EvalContext},
    database::Database,
    error::LedgerError,
    evaluator::{apply_operation, Evaluator, OperationResult},
    objects::Proposal,
  },
  std::{collections::BTreeSet, fmt::Display},
  tracing::{debug, warn},
  veil_primitives::{
    Operation,
    ProposalCreateOperation,
    ProposalDeleteOperation,
    ProposalId,
    ProposalUpdateOperation,
    Timestamp,
    MINER_ACCOUNT,
  },
};

/// True when the approvals collected so far satisfy every authority the
/// proposed operations need.
pub(crate) fn is_authorized(
  db: &Database,
  max_depth: u8,
  proposal: &Proposal,
) -> bool {
  let approvals = Approvals {
    active: &proposal.available_active_approvals,
    owner: &proposal.available_owner_approvals,
  };
  verify_authority(
    &proposal.proposed_ops,
    &proposal.available_key_approvals,
    db,
    max_depth,
    approvals,
  )
  .is_ok()
}

/// Applies the proposed operations in a nested undo session.
///
/// An executed proposal is removed. When one of its operations fails,
/// all of them are rolled back and the proposal stays around with the
/// reason recorded.
pub(crate) fn execute_proposal(
  db: &mut Database,
  chain: &ChainContext,
  id: ProposalId,
) -> Result<(), LedgerError> {
  let ops = db.proposals.get(id)?.proposed_ops.clone();
  let ctx = EvalContext::proposed(chain);

  let outcome = db.with_undo_session(|db| {
    for op in &ops {
      apply_operation(db, &ctx, op)?;
    }
    Ok(())
  });

  match outcome {
    Ok(()) => {
      debug!("executed proposal {id}");
      db.proposals.remove(id)?;
    }
    Err(e) => {
      warn!("proposal {id} failed: {e}");
      db.proposals
        .modify(id, |p| p.fail_reason = Some(e.to_string()))?;
    }
  }
  Ok(())
}

#[derive(Default)]
pub struct ProposalCreateEvaluator {
  review_period_time: Option<Timestamp>,
}

impl Evaluator for ProposalCreateEvaluator {
  type Op = ProposalCreateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::ProposalCreate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    db.get_account(op.fee_paying_account)?;

    let params = ctx.parameters();
    let now = ctx.now();
    if op.expiration_time <= now
      || op.expiration_time > now + params.maximum_proposal_lifetime
    {
      return Err(LedgerError::InvalidProposalExpiration(op.expiration_time));
    }

    let required = required_authorities(&op.proposed_ops);
    if !required.other.is_empty() {
      return Err(LedgerError::NonAccountAuthority);
    }

    let touches_miner = required.active.contains(&MINER_ACCOUNT)
      || required.owner.contains(&MINER_ACCOUNT);
    let review = op.review_period_seconds.unwrap_or(0);
    if touches_miner && review < params.miner_proposal_review_period {
      return Err(LedgerError::ReviewPeriodRequired(
        params.miner_proposal_review_period,
      ));
    }

    if let Some(review) = op.review_period_seconds {
      if review >= op.expiration_time - now {
        return Err(LedgerError::InvalidProposalExpiration(
          op.expiration_time,
        ));
      }
      self.review_period_time =
        Some(Timestamp(op.expiration_time.seconds() - review));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    let required = required_authorities(&op.proposed_ops);
    let required_active: BTreeSet<_> =
      required.active.difference(&required.owner).copied().collect();

    let proposal = db.proposals.create(|id| Proposal {
      id,
      proposer: op.fee_paying_account,
      expiration_time: op.expiration_time,
      review_period_time: self.review_period_time,
      proposed_ops: op.proposed_ops.clone(),
      required_active_approvals: required_active,
      available_active_approvals: BTreeSet::new(),
      required_owner_approvals: required.owner,
      available_owner_approvals: BTreeSet::new(),
      available_key_approvals: BTreeSet::new(),
      fail_reason: None,
    })?;
    Ok(OperationResult::Proposal(proposal.id))
  }
}

fn check_add<T: Ord + Display>(
  present: &BTreeSet<T>,
  added: &BTreeSet<T>,
) -> Result<(), LedgerError> {
  match added.iter().find(|a| present.contains(a)) {
    Some(found) => Err(LedgerError::ApprovalAlreadyPresent(found.to_string())),
    None => Ok(()),
  }
}

fn check_remove<T: Ord + Display>(
  present: &BTreeSet<T>,
  removed: &BTreeSet<T>,
) -> Result<(), LedgerError> {
  match removed.iter().find(|r| !present.contains(r)) {
    Some(missing) => Err(LedgerError::ApprovalNotPresent(missing.to_string())),
    None => Ok(()),
  }
}

fn update<T: Ord + Clone>(
  set: &mut BTreeSet<T>,
  added: &BTreeSet<T>,
  removed: &BTreeSet<T>,
) {
  set.extend(added.iter().cloned());
  set.retain(|item| !removed.contains(item));
}

/// Adds and removes approvals and executes the proposal right away
/// when it has no review period and is now fully approved.
#[derive(Default)]
pub struct ProposalUpdateEvaluator;

impl Evaluator for ProposalUpdateEvaluator {
  type Op = ProposalUpdateOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::ProposalUpdate(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let proposal = db
      .proposal(op.proposal)
      .ok_or(LedgerError::UnknownProposal(op.proposal))?;

    let adding = !op.active_approvals_to_add.is_empty()
      || !op.owner_approvals_to_add.is_empty()
      || !op.key_approvals_to_add.is_empty();
    if let Some(start) = proposal.review_period_time {
      if adding && ctx.now() >= start {
        return Err(LedgerError::ReviewPeriodStarted(start));
      }
    }

    check_add(
      &proposal.available_active_approvals,
      &op.active_approvals_to_add,
    )?;
    check_add(
      &proposal.available_owner_approvals,
      &op.owner_approvals_to_add,
    )?;
    check_add(&proposal.available_key_approvals, &op.key_approvals_to_add)?;
    check_remove(
      &proposal.available_active_approvals,
      &op.active_approvals_to_remove,
    )?;
    check_remove(
      &proposal.available_owner_approvals,
      &op.owner_approvals_to_remove,
    )?;
    check_remove(
      &proposal.available_key_approvals,
      &op.key_approvals_to_remove,
    )
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.proposals.modify(op.proposal, |p| {
      update(
        &mut p.available_active_approvals,
        &op.active_approvals_to_add,
        &op.active_approvals_to_remove,
      );
      update(
        &mut p.available_owner_approvals,
        &op.owner_approvals_to_add,
        &op.owner_approvals_to_remove,
      );
      update(
        &mut p.available_key_approvals,
        &op.key_approvals_to_add,
        &op.key_approvals_to_remove,
      );
    })?;

    let proposal = db.proposals.get(op.proposal)?;
    let ready = proposal.review_period_time.is_none()
      && is_authorized(db, ctx.parameters().max_authority_depth, proposal);
    if ready {
      execute_proposal(db, ctx.chain, op.proposal)?;
    }
    Ok(OperationResult::None)
  }
}

#[derive(Default)]
pub struct ProposalDeleteEvaluator;

impl Evaluator for ProposalDeleteEvaluator {
  type Op = ProposalDeleteOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::ProposalDelete(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    db: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    let proposal = db
      .proposal(op.proposal)
      .ok_or(LedgerError::UnknownProposal(op.proposal))?;
    let approvers = if op.using_owner_authority {
      &proposal.required_owner_approvals
    } else {
      &proposal.required_active_approvals
    };
    if !approvers.contains(&op.fee_paying_account) {
      return Err(LedgerError::NotRequiredApprover(op.fee_paying_account));
    }
    Ok(())
  }

  fn do_apply(
    &mut self,
    db: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    db.proposals.remove(op.proposal)?;
    Ok(OperationResult::None)
  }
}
