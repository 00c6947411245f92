use {
  crate::{
    context::EvalContext,
    database::Database,
    error::LedgerError,
    evaluator::{Evaluator, OperationResult},
  },
  veil_primitives::{Operation, ReservedOperation, ValidationError},
};

/// Occupies a reserved tag. Never succeeds.
#[derive(Default)]
pub struct ReservedEvaluator;

impl Evaluator for ReservedEvaluator {
  type Op = ReservedOperation;

  fn operation(op: &Operation) -> Option<&Self::Op> {
    match op {
      Operation::Reserved(op) => Some(op),
      _ => None,
    }
  }

  fn do_evaluate(
    &mut self,
    _: &Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<(), LedgerError> {
    Err(ValidationError::Reserved(op.slot).into())
  }

  fn do_apply(
    &mut self,
    _: &mut Database,
    _: &EvalContext,
    op: &Self::Op,
  ) -> Result<OperationResult, LedgerError> {
    Err(ValidationError::Reserved(op.slot).into())
  }
}
