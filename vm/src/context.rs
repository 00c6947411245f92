use veil_primitives::{ChainParameters, Timestamp};

/// Read-only view of the chain taken when a block starts applying.
///
/// Parameter changes made by operations in the block are written to
/// the store and only become visible in the next block's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
  pub parameters: ChainParameters,
  pub head_block_num: u32,
  pub head_block_time: Timestamp,
}

/// Per operation context handed to evaluators.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
  pub chain: &'a ChainContext,

  /// True while the operations of an approved proposal execute.
  pub is_proposed: bool,
}

impl<'a> EvalContext<'a> {
  pub fn new(chain: &'a ChainContext) -> Self {
    Self {
      chain,
      is_proposed: false,
    }
  }

  pub fn proposed(chain: &'a ChainContext) -> Self {
    Self {
      chain,
      is_proposed: true,
    }
  }

  pub fn parameters(&self) -> &'a ChainParameters {
    &self.chain.parameters
  }

  pub fn now(&self) -> Timestamp {
    self.chain.head_block_time
  }

  pub fn head_block_num(&self) -> u32 {
    self.chain.head_block_num
  }
}
