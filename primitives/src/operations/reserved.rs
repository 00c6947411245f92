use {
  super::{RequiredAuthorities, ValidationError},
  crate::{AccountId, AssetAmount, MINER_ACCOUNT},
  serde::{Deserialize, Serialize},
};

/// Reserved slots of the operation union.
pub const RESERVED_SLOTS: std::ops::RangeInclusive<u8> = 6..=64;

/// Placeholder keeping a tag of the operation union free for future
/// operations. It never validates and is priced out of reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedOperation {
  pub slot: u8,
  pub fee: AssetAmount,
}

impl ReservedOperation {
  pub fn fee_payer(&self) -> AccountId {
    MINER_ACCOUNT
  }

  pub fn required_authorities(&self, _: &mut RequiredAuthorities) {}

  pub fn validate(&self) -> Result<(), ValidationError> {
    Err(ValidationError::Reserved(self.slot))
  }
}
