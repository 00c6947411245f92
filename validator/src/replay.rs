use {
  serde::{Deserialize, Serialize},
  tracing::info,
  veil_primitives::{Block, SignedTransaction, Timestamp, ToBase58String},
  veil_vm::{Database, LedgerError},
};

/// Contents of a block without its position in the chain. The position
/// is filled in when the block is applied on top of the current head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTemplate {
  pub timestamp: Timestamp,
  #[serde(default)]
  pub transactions: Vec<SignedTransaction>,
}

/// Applies `templates` in order on top of `head`, returning the new
/// head. Stops at the first block that fails to apply, leaving the
/// ledger at the last good block.
pub fn replay(
  db: &mut Database,
  head: Block,
  templates: Vec<BlockTemplate>,
) -> Result<Block, LedgerError> {
  let mut head = head;
  for template in templates {
    let block = Block::new(&head, template.timestamp, template.transactions);
    let processed = db.apply_block(&block)?;
    info!(
      "block {} ({}) at {}: {} transactions",
      block.height,
      block.hash().to_b58(),
      block.timestamp,
      processed.len()
    );
    head = block;
  }
  Ok(head)
}
