//! State transition core of the Veil ledger.
//!
//! [`Database`] holds the ledger state in an in-memory object store
//! with nested undo sessions. Transactions and blocks are applied
//! through the evaluator framework, one evaluator per operation kind,
//! after their signatures were checked against the required
//! authorities. Blinded balances and confidential outputs move value
//! behind Pedersen commitments while the per asset confidential supply
//! keeps the total auditable.

mod apply;
mod authority;
mod context;
mod database;
mod error;
mod evaluator;
mod evaluators;
mod fees;
mod genesis;
mod objects;
mod query;
mod store;

pub use {
  apply::ProcessedTransaction,
  authority::{
    get_potential_signatures,
    get_required_signatures,
    required_authorities,
    verify_authority,
    verify_authority_accounts,
    Approvals,
    AuthoritySource,
  },
  context::{ChainContext, EvalContext},
  database::Database,
  error::{AuthorityError, LedgerError},
  evaluator::{apply_operation, Evaluator, GenericEvaluator, OperationResult},
  fees::{get_required_fees, FeeResult, MAX_FEE_RECURSION},
  genesis::{Genesis, GenesisAccount, GenesisAsset, GenesisError},
  objects::*,
  store::{Record, Singleton, StoreError, Table, Undoable},
};
