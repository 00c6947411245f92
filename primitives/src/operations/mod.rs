//! The closed set of ledger mutating operations.

mod account;
mod confidential;
mod miner;
mod proposal;
mod reserved;
mod transfer;
mod vesting;

pub use {
  account::{AccountCreateOperation, AccountOptions, AccountUpdateOperation},
  confidential::{
    BlindInput,
    BlindOutput,
    BlindTransferOperation,
    ConfidentialInput,
    ConfidentialOutput,
    OutputExtension,
    PlaintextPayout,
    TransferFromBlindOperation,
    TransferFromConfidentialOperation,
    TransferToBlindOperation,
    TransferToConfidentialOperation,
  },
  miner::{
    MinerCreateOperation,
    MinerUpdateGlobalParametersOperation,
    MinerUpdateOperation,
    MAX_URL_LENGTH,
  },
  proposal::{
    ProposalCreateOperation,
    ProposalDeleteOperation,
    ProposalUpdateOperation,
  },
  reserved::{ReservedOperation, RESERVED_SLOTS},
  transfer::{
    Memo,
    SetTransferFreezeBlockOperation,
    TransferOperation,
    MAX_MEMO_CIPHERTEXT,
  },
  vesting::{
    LinearVestingPolicy,
    VestingBalanceCreateOperation,
    VestingBalanceWithdrawOperation,
  },
};
use {
  crate::{AccountId, AssetAmount, AssetId, Authority, Commitment},
  serde::{Deserialize, Serialize},
  std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
  },
  thiserror::Error,
};

/// Stateless reasons for rejecting an operation, detected before any
/// state is consulted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("fee must not be negative")]
  NegativeFee,

  #[error("{0} must be positive")]
  NonPositiveAmount(&'static str),

  #[error("memo of {0} bytes is too long")]
  MemoTooLong(usize),

  #[error("url of {0} bytes is too long")]
  UrlTooLong(usize),

  #[error("owner authority has no keys")]
  OwnerWithoutKeys,

  #[error("authority threshold cannot be reached")]
  ImpossibleAuthority,

  #[error("operation changes nothing")]
  NothingToUpdate,

  #[error("voted for {votes} miners but wants {num_miner}")]
  TooFewVotes { num_miner: u16, votes: usize },

  #[error("no inputs")]
  NoInputs,

  #[error("no outputs")]
  NoOutputs,

  #[error("commitment {0} appears more than once")]
  DuplicateCommitment(Commitment),

  #[error("commitments do not balance")]
  CommitmentMismatch,

  #[error("range proof required when there is more than one output")]
  MissingRangeProof,

  #[error("commitment cannot be 0")]
  IdentityCommitment,

  #[error("expected asset {expected}, found {found}")]
  AssetMismatch { expected: AssetId, found: AssetId },

  #[error("proposal has no operations")]
  EmptyProposal,

  #[error("approval is both added and removed")]
  ConflictingApprovals,

  #[error("vesting cliff is after the end of vesting")]
  InvalidVestingPolicy,

  #[error("invalid chain parameters: {0}")]
  InvalidParameters(&'static str),

  #[error("reserved operation slot {0} is not active")]
  Reserved(u8),

  #[error("arithmetic overflow")]
  Overflow,
}

impl ValidationError {
  pub(crate) fn check_fee(fee: &AssetAmount) -> Result<(), Self> {
    if fee.amount < 0 {
      return Err(Self::NegativeFee);
    }
    Ok(())
  }
}

/// Authorities an operation needs: accounts whose active or owner
/// authority must approve, plus inline authorities that do not belong
/// to any account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredAuthorities {
  pub active: BTreeSet<AccountId>,
  pub owner: BTreeSet<AccountId>,
  pub other: Vec<Authority>,
}

impl RequiredAuthorities {
  pub fn is_empty(&self) -> bool {
    self.active.is_empty() && self.owner.is_empty() && self.other.is_empty()
  }
}

/// Discriminant of [`Operation`], the key of the evaluator registry and
/// of the fee schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
  Transfer,
  AccountCreate,
  AccountUpdate,
  MinerCreate,
  MinerUpdate,
  MinerUpdateGlobalParameters,
  ProposalCreate,
  ProposalUpdate,
  ProposalDelete,
  SetTransferFreezeBlock,
  VestingBalanceCreate,
  VestingBalanceWithdraw,
  TransferToBlind,
  TransferFromBlind,
  BlindTransfer,
  TransferToConfidential,
  TransferFromConfidential,
  Reserved(u8),
}

impl OperationKind {
  /// Every active (non reserved) kind.
  pub const ACTIVE: [OperationKind; 17] = [
    Self::Transfer,
    Self::AccountCreate,
    Self::AccountUpdate,
    Self::MinerCreate,
    Self::MinerUpdate,
    Self::MinerUpdateGlobalParameters,
    Self::ProposalCreate,
    Self::ProposalUpdate,
    Self::ProposalDelete,
    Self::SetTransferFreezeBlock,
    Self::VestingBalanceCreate,
    Self::VestingBalanceWithdraw,
    Self::TransferToBlind,
    Self::TransferFromBlind,
    Self::BlindTransfer,
    Self::TransferToConfidential,
    Self::TransferFromConfidential,
  ];

  /// Position of this kind in the operation union. Reserved slots
  /// follow the active kinds.
  pub fn tag(&self) -> u8 {
    match self {
      Self::Transfer => 0,
      Self::AccountCreate => 1,
      Self::AccountUpdate => 2,
      Self::MinerCreate => 3,
      Self::MinerUpdate => 4,
      Self::MinerUpdateGlobalParameters => 5,
      Self::ProposalCreate => 6,
      Self::ProposalUpdate => 7,
      Self::ProposalDelete => 8,
      Self::SetTransferFreezeBlock => 9,
      Self::VestingBalanceCreate => 10,
      Self::VestingBalanceWithdraw => 11,
      Self::TransferToBlind => 12,
      Self::TransferFromBlind => 13,
      Self::BlindTransfer => 14,
      Self::TransferToConfidential => 15,
      Self::TransferFromConfidential => 16,
      Self::Reserved(slot) => 11 + slot,
    }
  }
}

impl Display for OperationKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Reserved(slot) => write!(f, "reserved_{slot}"),
      other => Debug::fmt(other, f),
    }
  }
}

/// A ledger mutating action. Every variant carries its own fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
  Transfer(TransferOperation),
  AccountCreate(AccountCreateOperation),
  AccountUpdate(AccountUpdateOperation),
  MinerCreate(MinerCreateOperation),
  MinerUpdate(MinerUpdateOperation),
  MinerUpdateGlobalParameters(MinerUpdateGlobalParametersOperation),
  ProposalCreate(ProposalCreateOperation),
  ProposalUpdate(ProposalUpdateOperation),
  ProposalDelete(ProposalDeleteOperation),
  SetTransferFreezeBlock(SetTransferFreezeBlockOperation),
  VestingBalanceCreate(VestingBalanceCreateOperation),
  VestingBalanceWithdraw(VestingBalanceWithdrawOperation),
  TransferToBlind(TransferToBlindOperation),
  TransferFromBlind(TransferFromBlindOperation),
  BlindTransfer(BlindTransferOperation),
  TransferToConfidential(TransferToConfidentialOperation),
  TransferFromConfidential(TransferFromConfidentialOperation),
  Reserved(ReservedOperation),
}

macro_rules! each_operation {
  ($value:expr, $op:ident => $body:expr) => {
    match $value {
      Operation::Transfer($op) => $body,
      Operation::AccountCreate($op) => $body,
      Operation::AccountUpdate($op) => $body,
      Operation::MinerCreate($op) => $body,
      Operation::MinerUpdate($op) => $body,
      Operation::MinerUpdateGlobalParameters($op) => $body,
      Operation::ProposalCreate($op) => $body,
      Operation::ProposalUpdate($op) => $body,
      Operation::ProposalDelete($op) => $body,
      Operation::SetTransferFreezeBlock($op) => $body,
      Operation::VestingBalanceCreate($op) => $body,
      Operation::VestingBalanceWithdraw($op) => $body,
      Operation::TransferToBlind($op) => $body,
      Operation::TransferFromBlind($op) => $body,
      Operation::BlindTransfer($op) => $body,
      Operation::TransferToConfidential($op) => $body,
      Operation::TransferFromConfidential($op) => $body,
      Operation::Reserved($op) => $body,
    }
  };
}

impl Operation {
  pub fn kind(&self) -> OperationKind {
    match self {
      Self::Transfer(_) => OperationKind::Transfer,
      Self::AccountCreate(_) => OperationKind::AccountCreate,
      Self::AccountUpdate(_) => OperationKind::AccountUpdate,
      Self::MinerCreate(_) => OperationKind::MinerCreate,
      Self::MinerUpdate(_) => OperationKind::MinerUpdate,
      Self::MinerUpdateGlobalParameters(_) => {
        OperationKind::MinerUpdateGlobalParameters
      }
      Self::ProposalCreate(_) => OperationKind::ProposalCreate,
      Self::ProposalUpdate(_) => OperationKind::ProposalUpdate,
      Self::ProposalDelete(_) => OperationKind::ProposalDelete,
      Self::SetTransferFreezeBlock(_) => OperationKind::SetTransferFreezeBlock,
      Self::VestingBalanceCreate(_) => OperationKind::VestingBalanceCreate,
      Self::VestingBalanceWithdraw(_) => OperationKind::VestingBalanceWithdraw,
      Self::TransferToBlind(_) => OperationKind::TransferToBlind,
      Self::TransferFromBlind(_) => OperationKind::TransferFromBlind,
      Self::BlindTransfer(_) => OperationKind::BlindTransfer,
      Self::TransferToConfidential(_) => OperationKind::TransferToConfidential,
      Self::TransferFromConfidential(_) => {
        OperationKind::TransferFromConfidential
      }
      Self::Reserved(op) => OperationKind::Reserved(op.slot),
    }
  }

  pub fn fee(&self) -> &AssetAmount {
    each_operation!(self, op => &op.fee)
  }

  pub fn fee_mut(&mut self) -> &mut AssetAmount {
    each_operation!(self, op => &mut op.fee)
  }

  /// The account charged for this operation's fee.
  pub fn fee_payer(&self) -> AccountId {
    each_operation!(self, op => op.fee_payer())
  }

  /// Adds the authorities this operation needs to `auths`. The fee
  /// payer's active authority is always among them.
  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.fee_payer());
    each_operation!(self, op => op.required_authorities(auths))
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    each_operation!(self, op => op.validate())
  }
}

macro_rules! impl_from_operation {
  ($($variant:ident($ty:ty)),* $(,)?) => {
    $(impl From<$ty> for Operation {
      fn from(op: $ty) -> Self {
        Operation::$variant(op)
      }
    })*
  };
}

impl_from_operation!(
  Transfer(TransferOperation),
  AccountCreate(AccountCreateOperation),
  AccountUpdate(AccountUpdateOperation),
  MinerCreate(MinerCreateOperation),
  MinerUpdate(MinerUpdateOperation),
  MinerUpdateGlobalParameters(MinerUpdateGlobalParametersOperation),
  ProposalCreate(ProposalCreateOperation),
  ProposalUpdate(ProposalUpdateOperation),
  ProposalDelete(ProposalDeleteOperation),
  SetTransferFreezeBlock(SetTransferFreezeBlockOperation),
  VestingBalanceCreate(VestingBalanceCreateOperation),
  VestingBalanceWithdraw(VestingBalanceWithdrawOperation),
  TransferToBlind(TransferToBlindOperation),
  TransferFromBlind(TransferFromBlindOperation),
  BlindTransfer(BlindTransferOperation),
  TransferToConfidential(TransferToConfidentialOperation),
  TransferFromConfidential(TransferFromConfidentialOperation),
  Reserved(ReservedOperation),
);

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::{PublicKey, MINER_ACCOUNT, TEMP_ACCOUNT},
  };

  fn transfer(amount: i64) -> Operation {
    TransferOperation {
      fee: AssetAmount::core(1),
      from: AccountId(10),
      to: PublicKey::from_bytes([9; 32]),
      amount: AssetAmount::core(amount),
      memo: None,
    }
    .into()
  }

  #[test]
  fn tags_are_dense_and_reserved_follow() {
    for (index, kind) in OperationKind::ACTIVE.iter().enumerate() {
      assert_eq!(kind.tag() as usize, index);
    }
    assert_eq!(OperationKind::Reserved(6).tag(), 17);
    assert_eq!(OperationKind::Reserved(64).tag(), 75);
  }

  #[test]
  fn fee_payer_is_always_required() {
    let mut auths = RequiredAuthorities::default();
    transfer(5).required_authorities(&mut auths);
    assert!(auths.active.contains(&AccountId(10)));

    let op: Operation = BlindTransferOperation {
      fee: AssetAmount::core(1),
      inputs: vec![],
      outputs: vec![],
    }
    .into();
    assert_eq!(op.fee_payer(), TEMP_ACCOUNT);
  }

  #[test]
  fn stateless_rules() {
    assert_eq!(transfer(5).validate(), Ok(()));
    assert_eq!(
      transfer(0).validate(),
      Err(ValidationError::NonPositiveAmount("amount"))
    );

    let reserved: Operation = ReservedOperation {
      slot: 7,
      fee: AssetAmount::core(0),
    }
    .into();
    assert_eq!(reserved.validate(), Err(ValidationError::Reserved(7)));
    assert_eq!(reserved.fee_payer(), MINER_ACCOUNT);

    let nested: Operation = ProposalCreateOperation {
      fee: AssetAmount::core(1),
      fee_paying_account: AccountId(10),
      expiration_time: Default::default(),
      proposed_ops: vec![transfer(0)],
      review_period_seconds: None,
    }
    .into();
    assert_eq!(
      nested.validate(),
      Err(ValidationError::NonPositiveAmount("amount"))
    );
  }
}
