//! Application of signed transactions and blocks on top of the
//! evaluator framework.

use {
  crate::{
    authority::{verify_authority, Approvals},
    context::{ChainContext, EvalContext},
    database::Database,
    error::LedgerError,
    evaluator::{apply_operation, OperationResult},
    evaluators::proposal::{execute_proposal, is_authorized},
    objects::TransactionRecord,
  },
  metrics::increment_counter,
  multihash::Multihash,
  rayon::prelude::*,
  std::collections::BTreeSet,
  tracing::{debug, info, warn},
  veil_primitives::{
    Block,
    PublicKey,
    SignedTransaction,
    ToBase58String,
  },
};

/// Outcome of an applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedTransaction {
  pub id: Multihash,
  pub operation_results: Vec<OperationResult>,
}

impl Database {
  /// Applies a single transaction on top of the current head, outside
  /// of any block. Nothing is changed when it fails.
  pub fn push_transaction(
    &mut self,
    tx: &SignedTransaction,
  ) -> Result<ProcessedTransaction, LedgerError> {
    let signers = tx.signature_keys()?;
    let chain = self.chain_context();
    self
      .with_undo_session(|db| db.apply_transaction(&chain, tx, &signers))
      .map_err(|e| {
        increment_counter!("veil_transactions_rejected");
        warn!("rejected transaction {}: {e}", tx.id().to_b58());
        e
      })
  }

  fn apply_transaction(
    &mut self,
    chain: &ChainContext,
    tx: &SignedTransaction,
    signers: &BTreeSet<PublicKey>,
  ) -> Result<ProcessedTransaction, LedgerError> {
    let now = chain.head_block_time;
    let expiration = tx.transaction.expiration;
    if expiration <= now {
      return Err(LedgerError::Expired { expiration, now });
    }
    if expiration > now + chain.parameters.maximum_time_until_expiration {
      return Err(LedgerError::ExpirationTooFar { expiration, now });
    }

    let id = *tx.id();
    let trx_id = id.to_bytes();
    if self.transactions.find_by_key(&trx_id).is_some() {
      return Err(LedgerError::DuplicateTransaction(id.to_b58()));
    }

    let ops = &tx.transaction.operations;
    verify_authority(
      ops,
      signers,
      self,
      chain.parameters.max_authority_depth,
      Approvals::none(),
    )?;

    self.transactions.create(|id| TransactionRecord {
      id,
      trx_id,
      expiration,
    })?;

    let ctx = EvalContext::new(chain);
    let mut operation_results = Vec::with_capacity(ops.len());
    for (index, op) in ops.iter().enumerate() {
      let result =
        apply_operation(self, &ctx, op).map_err(|e| LedgerError::Operation {
          index,
          kind: op.kind(),
          op: Box::new(op.clone()),
          source: Box::new(e),
        })?;
      increment_counter!("veil_operations_applied");
      operation_results.push(result);
    }

    debug!("applied transaction {}", id.to_b58());
    Ok(ProcessedTransaction {
      id,
      operation_results,
    })
  }

  /// Applies a block that extends the current head.
  ///
  /// Signatures of all transactions are verified up front and in
  /// parallel. Everything else is sequential, and a failing transaction
  /// undoes the entire block.
  pub fn apply_block(
    &mut self,
    block: &Block,
  ) -> Result<Vec<ProcessedTransaction>, LedgerError> {
    let expected = self.head_block_num() as u64 + 1;
    if block.height != expected {
      return Err(LedgerError::UnexpectedBlockHeight {
        expected,
        found: block.height,
      });
    }
    if block.parent.to_bytes() != self.dynamic_properties().head_block_id {
      return Err(LedgerError::UnknownParent);
    }
    let head = self.head_block_time();
    if block.timestamp <= head {
      return Err(LedgerError::BlockTimeNotIncreasing {
        head,
        found: block.timestamp,
      });
    }

    let signers = block
      .transactions
      .par_iter()
      .map(|tx| tx.signature_keys())
      .collect::<Result<Vec<_>, _>>()?;

    let processed = self.with_undo_session(|db| {
      db.advance_head(block);
      db.prune_expired_transactions()?;
      db.process_expired_proposals()?;

      let chain = db.chain_context();
      block
        .transactions
        .iter()
        .zip(signers.iter())
        .map(|(tx, signers)| {
          db.with_undo_session(|db| db.apply_transaction(&chain, tx, signers))
        })
        .collect::<Result<Vec<_>, _>>()
    });

    match &processed {
      Ok(txs) => {
        increment_counter!("veil_blocks_applied");
        info!(
          "applied block {} with {} transactions",
          block.height,
          txs.len()
        );
      }
      Err(e) => warn!("rejected block {}: {e}", block.height),
    }
    processed
  }

  /// Moves the head to `block` and activates parameters scheduled
  /// during the previous block.
  fn advance_head(&mut self, block: &Block) {
    if let Some(pending) = self.global.get().pending_parameters.clone() {
      info!("activating new chain parameters at block {}", block.height);
      self.global.modify(|g| {
        g.parameters = pending;
        g.pending_parameters = None;
      });
    }

    let id = block.hash().to_bytes();
    self.dynamic.modify(|d| {
      d.head_block_number = block.height as u32;
      d.time = block.timestamp;
      d.head_block_id = id;
    });
  }

  fn prune_expired_transactions(&mut self) -> Result<(), LedgerError> {
    let now = self.head_block_time();
    let expired: Vec<_> = self
      .transactions
      .iter()
      .filter(|record| record.expiration <= now)
      .map(|record| record.id)
      .collect();
    for id in expired {
      self.transactions.remove(id)?;
    }
    Ok(())
  }

  /// Expired proposals get a last chance to execute, then go away.
  fn process_expired_proposals(&mut self) -> Result<(), LedgerError> {
    let now = self.head_block_time();
    let expired: Vec<_> = self
      .proposals
      .iter()
      .filter(|proposal| proposal.expiration_time <= now)
      .map(|proposal| proposal.id)
      .collect();
    if expired.is_empty() {
      return Ok(());
    }

    let chain = self.chain_context();
    for id in expired {
      let authorized = self
        .proposals
        .find(id)
        .map(|p| is_authorized(self, chain.parameters.max_authority_depth, p))
        .unwrap_or(false);
      if authorized {
        execute_proposal(self, &chain, id)?;
      }
      if self.proposals.find(id).is_some() {
        debug!("dropping expired proposal {id}");
        self.proposals.remove(id)?;
      }
    }
    Ok(())
  }
}
