//! Two phase dispatch of operations to their evaluators.
//!
//! Every operation kind has one [`Evaluator`]. It first checks the
//! operation against the current state without touching it, then
//! applies it. The fee is charged last so that operations paying from
//! the temporary account can first fund it.

use {
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluators::{
      account::{AccountCreateEvaluator, AccountUpdateEvaluator},
      confidential::{
        BlindTransferEvaluator,
        TransferFromBlindEvaluator,
        TransferFromConfidentialEvaluator,
        TransferToBlindEvaluator,
        TransferToConfidentialEvaluator,
      },
      miner::{
        MinerCreateEvaluator,
        MinerUpdateEvaluator,
        MinerUpdateGlobalParametersEvaluator,
      },
      proposal::{
        ProposalCreateEvaluator,
        ProposalDeleteEvaluator,
        ProposalUpdateEvaluator,
      },
      reserved::ReservedEvaluator,
      transfer::{SetTransferFreezeBlockEvaluator, TransferEvaluator},
      vesting::{VestingBalanceCreateEvaluator, VestingBalanceWithdrawEvaluator},
    },
  },
  once_cell::sync::Lazy,
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
  tracing::debug,
  veil_primitives::{
    AccountId,
    AssetAmount,
    MinerId,
    Operation,
    OperationKind,
    ProposalId,
    VestingBalanceId,
    RESERVED_SLOTS,
  },
};

/// What applying an operation produced, typically the id of a newly
/// created object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationResult {
  None,
  Account(AccountId),
  Miner(MinerId),
  Proposal(ProposalId),
  VestingBalance(VestingBalanceId),
}

/// Handles one operation kind.
///
/// A fresh evaluator is created for every operation, so state captured
/// in `do_evaluate` is visible to the `do_apply` of the same operation
/// and nothing else.
pub trait Evaluator: Default {
  type Op;

  fn operation(op: &Operation) -> Option<&Self::Op>;

  /// Read-only feasibility check against the current state.
  fn do_evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError>;

  /// Performs the mutation. Only called after `do_evaluate` passed.
  fn do_apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError>;

  fn pay_fee(
    &mut self,
    db: &mut Database,
    payer: AccountId,
    fee: &AssetAmount,
  ) -> Result<(), LedgerError> {
    db.pay_fee(payer, fee)
  }
}

/// Object safe face of an [`Evaluator`] as stored in the registry.
pub trait GenericEvaluator {
  fn evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Operation,
  ) -> Result<(), LedgerError>;

  fn apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Operation,
  ) -> Result<OperationResult, LedgerError>;
}

#[derive(Default)]
struct Dispatch<E>(E);

impl<E: Evaluator> Dispatch<E> {
  fn unpack(op: &Operation) -> Result<&E::Op, LedgerError> {
    E::operation(op).ok_or_else(|| LedgerError::NoEvaluator(op.kind()))
  }
}

impl<E: Evaluator> GenericEvaluator for Dispatch<E> {
  fn evaluate(
    &mut self,
    db: &Database,
    ctx: &EvalContext,
    op: &Operation,
  ) -> Result<(), LedgerError> {
    let inner = Self::unpack(op)?;
    check_fee(db, ctx, op)?;
    self.0.do_evaluate(db, ctx, inner)
  }

  fn apply(
    &mut self,
    db: &mut Database,
    ctx: &EvalContext,
    op: &Operation,
  ) -> Result<OperationResult, LedgerError> {
    let inner = Self::unpack(op)?;
    let result = self.0.do_apply(db, ctx, inner)?;
    self.0.pay_fee(db, op.fee_payer(), op.fee())?;
    Ok(result)
  }
}

/// The fee must be denominated in an existing asset and cover what the
/// current schedule asks for.
fn check_fee(
  db: &Database,
  ctx: &EvalContext,
  op: &Operation,
) -> Result<(), LedgerError> {
  let provided = *op.fee();
  let asset = db.asset(provided.asset_id)?;
  let required = ctx
    .parameters()
    .current_fees
    .calculate_fee(op, &asset.core_exchange_rate)?;
  if provided.amount < required.amount {
    return Err(LedgerError::InsufficientFee { required, provided });
  }
  Ok(())
}

type Constructor = fn() -> Box<dyn GenericEvaluator>;

fn constructor<E: Evaluator + 'static>() -> Box<dyn GenericEvaluator> {
  Box::new(Dispatch::<E>::default())
}

static REGISTRY: Lazy<BTreeMap<OperationKind, Constructor>> = Lazy::new(|| {
  let mut registry: BTreeMap<OperationKind, Constructor> = [
    (OperationKind::Transfer, constructor::<TransferEvaluator> as Constructor),
    (OperationKind::AccountCreate, constructor::<AccountCreateEvaluator>),
    (OperationKind::AccountUpdate, constructor::<AccountUpdateEvaluator>),
    (OperationKind::MinerCreate, constructor::<MinerCreateEvaluator>),
    (OperationKind::MinerUpdate, constructor::<MinerUpdateEvaluator>),
    (
      OperationKind::MinerUpdateGlobalParameters,
      constructor::<MinerUpdateGlobalParametersEvaluator>,
    ),
    (OperationKind::ProposalCreate, constructor::<ProposalCreateEvaluator>),
    (OperationKind::ProposalUpdate, constructor::<ProposalUpdateEvaluator>),
    (OperationKind::ProposalDelete, constructor::<ProposalDeleteEvaluator>),
    (
      OperationKind::SetTransferFreezeBlock,
      constructor::<SetTransferFreezeBlockEvaluator>,
    ),
    (
      OperationKind::VestingBalanceCreate,
      constructor::<VestingBalanceCreateEvaluator>,
    ),
    (
      OperationKind::VestingBalanceWithdraw,
      constructor::<VestingBalanceWithdrawEvaluator>,
    ),
    (OperationKind::TransferToBlind, constructor::<TransferToBlindEvaluator>),
    (
      OperationKind::TransferFromBlind,
      constructor::<TransferFromBlindEvaluator>,
    ),
    (OperationKind::BlindTransfer, constructor::<BlindTransferEvaluator>),
    (
      OperationKind::TransferToConfidential,
      constructor::<TransferToConfidentialEvaluator>,
    ),
    (
      OperationKind::TransferFromConfidential,
      constructor::<TransferFromConfidentialEvaluator>,
    ),
  ]
  .into_iter()
  .collect();

  for slot in RESERVED_SLOTS {
    registry.insert(
      OperationKind::Reserved(slot),
      constructor::<ReservedEvaluator>,
    );
  }
  registry
});

/// Validates, evaluates and applies a single operation.
///
/// Changes are not rolled back on failure, callers run this inside an
/// undo session.
pub fn apply_operation(
  db: &mut Database,
  ctx: &EvalContext,
  op: &Operation,
) -> Result<OperationResult, LedgerError> {
  op.validate()?;

  let kind = op.kind();
  let mut evaluator = REGISTRY
    .get(&kind)
    .map(|ctor| ctor())
    .ok_or(LedgerError::NoEvaluator(kind))?;

  evaluator.evaluate(db, ctx, op)?;
  let result = evaluator.apply(db, ctx, op)?;
  debug!("applied {kind}: {result:?}");
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_kind_has_an_evaluator() {
    for kind in OperationKind::ACTIVE {
      assert!(REGISTRY.contains_key(&kind), "{kind} is not registered");
    }
    for slot in RESERVED_SLOTS {
      assert!(REGISTRY.contains_key(&OperationKind::Reserved(slot)));
    }
    assert_eq!(
      REGISTRY.len(),
      OperationKind::ACTIVE.len() + RESERVED_SLOTS.count()
    );
  }
}
