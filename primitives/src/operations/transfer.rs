use {
  super::{RequiredAuthorities, ValidationError},
  crate::{AccountId, AssetAmount, PublicKey},
  serde::{Deserialize, Serialize},
};

/// Encrypted messages longer than this are refused. A plain text of
/// at most 1000 bytes encrypts to at most 1008 bytes.
pub const MAX_MEMO_CIPHERTEXT: usize = 1008;

/// Ciphertext attached to a transfer, readable by sender and recipient.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Memo {
  pub from: Option<PublicKey>,
  pub to: Option<PublicKey>,
  pub nonce: u64,
  pub message: Vec<u8>,
}

impl Memo {
  /// Memo carrying a message in the clear.
  pub fn plain(message: impl Into<Vec<u8>>) -> Self {
    Self {
      message: message.into(),
      ..Default::default()
    }
  }
}

/// Moves an open balance from an account to the account named after
/// the destination key, creating that account if it does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOperation {
  pub fee: AssetAmount,
  pub from: AccountId,
  pub to: PublicKey,
  pub amount: AssetAmount,
  pub memo: Option<Memo>,
}

impl TransferOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.from
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.from);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.amount.amount <= 0 {
      return Err(ValidationError::NonPositiveAmount("amount"));
    }
    if let Some(memo) = &self.memo {
      if memo.message.len() > MAX_MEMO_CIPHERTEXT {
        return Err(ValidationError::MemoTooLong(memo.message.len()));
      }
    }
    Ok(())
  }
}

/// Stops all transfers from the given block on.
///
/// Only accepted from an announcer whose owner authority holds the
/// configured transfer freeze key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTransferFreezeBlockOperation {
  pub fee: AssetAmount,
  pub announcer: AccountId,
  pub block_num: u32,
}

impl SetTransferFreezeBlockOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.announcer
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.announcer);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)
  }
}
