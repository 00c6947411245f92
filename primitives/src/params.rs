use {
  crate::{FeeSchedule, PublicKey, ValidationError},
  serde::{Deserialize, Serialize},
};

const DAY: u32 = 24 * 60 * 60;

/// Chain wide parameters. Changes only take effect at a block boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParameters {
  /// Fees charged for every operation kind.
  pub current_fees: FeeSchedule,

  /// How far into the future a transaction may set its expiration, in
  /// seconds.
  pub maximum_time_until_expiration: u32,

  /// Longest lifetime of a proposal, in seconds.
  pub maximum_proposal_lifetime: u32,

  /// Minimal review period of proposals touching the miner account, in
  /// seconds.
  pub miner_proposal_review_period: u32,

  /// Most entries (keys plus accounts) a single authority may have.
  pub maximum_authority_membership: u16,

  /// How many levels of nested account authorities are followed while
  /// checking signatures. Deeper nesting is an error.
  pub max_authority_depth: u8,

  /// Largest number of miners an account may vote for.
  pub maximum_miner_count: u16,

  /// Transfers are refused from this block number on.
  pub freeze_transfers_after_block: u32,

  /// Key that must be part of the owner authority of whoever sets
  /// `freeze_transfers_after_block`.
  pub transfer_freeze_authority: Option<PublicKey>,
}

impl Default for ChainParameters {
  fn default() -> Self {
    Self {
      current_fees: FeeSchedule::default(),
      maximum_time_until_expiration: DAY,
      maximum_proposal_lifetime: 4 * 7 * DAY,
      miner_proposal_review_period: DAY,
      maximum_authority_membership: 10,
      max_authority_depth: 2,
      maximum_miner_count: 1001,
      freeze_transfers_after_block: u32::MAX,
      transfer_freeze_authority: None,
    }
  }
}

impl ChainParameters {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.miner_proposal_review_period > self.maximum_proposal_lifetime {
      return Err(ValidationError::InvalidParameters(
        "review period exceeds proposal lifetime",
      ));
    }
    if self.maximum_authority_membership == 0 {
      return Err(ValidationError::InvalidParameters(
        "authorities need at least one member",
      ));
    }
    if self.current_fees.scale == 0 {
      return Err(ValidationError::InvalidParameters("fee scale is zero"));
    }
    Ok(())
  }
}
