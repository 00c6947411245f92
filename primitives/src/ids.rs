use {
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

/// Ids of records that live in the object store.
///
/// Every id is rendered as `<space>.<type>.<instance>`, so an account
/// with instance number 17 is written as `1.2.17`. The space and type
/// pair is fixed per record kind, only the instance varies.
pub trait ObjectId: Copy + Ord + Debug {
  const SPACE: u8;
  const TYPE: u8;

  fn from_instance(instance: u64) -> Self;
  fn instance(&self) -> u64;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
  #[error("malformed object id '{0}', expected <space>.<type>.<instance>")]
  Malformed(String),

  #[error("object id '{found}' is not of kind {space}.{ty}.x")]
  WrongKind { found: String, space: u8, ty: u8 },
}

fn parse_id(s: &str, space: u8, ty: u8) -> Result<u64, IdError> {
  let parts: Vec<&str> = s.split('.').collect();
  if parts.len() != 3 {
    return Err(IdError::Malformed(s.into()));
  }
  let parsed: Vec<u64> = parts
    .iter()
    .map(|p| p.parse::<u64>())
    .collect::<Result<_, _>>()
    .map_err(|_| IdError::Malformed(s.into()))?;

  if parsed[0] != space as u64 || parsed[1] != ty as u64 {
    return Err(IdError::WrongKind {
      found: s.into(),
      space,
      ty,
    });
  }
  Ok(parsed[2])
}

macro_rules! object_id {
  ($(#[$meta:meta])* $name:ident, $space:expr, $ty:expr) => {
    $(#[$meta])*
    #[derive(
      Copy,
      Clone,
      Default,
      PartialEq,
      Eq,
      Hash,
      PartialOrd,
      Ord,
      Serialize,
      Deserialize,
    )]
    pub struct $name(pub u64);

    impl ObjectId for $name {
      const SPACE: u8 = $space;
      const TYPE: u8 = $ty;

      fn from_instance(instance: u64) -> Self {
        Self(instance)
      }

      fn instance(&self) -> u64 {
        self.0
      }
    }

    impl Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", $space, $ty, self.0)
      }
    }

    impl Debug for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", stringify!($name), self)
      }
    }

    impl FromStr for $name {
      type Err = IdError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s, $space, $ty).map(Self)
      }
    }
  };
}

const PROTOCOL_SPACE: u8 = 1;
const IMPLEMENTATION_SPACE: u8 = 2;

object_id!(AccountId, PROTOCOL_SPACE, 2);
object_id!(AssetId, PROTOCOL_SPACE, 3);
object_id!(MinerId, PROTOCOL_SPACE, 6);
object_id!(ProposalId, PROTOCOL_SPACE, 10);
object_id!(VestingBalanceId, PROTOCOL_SPACE, 13);

object_id!(AssetDynamicDataId, IMPLEMENTATION_SPACE, 3);
object_id!(AccountBalanceId, IMPLEMENTATION_SPACE, 5);
object_id!(AccountStatisticsId, IMPLEMENTATION_SPACE, 6);
object_id!(TransactionRecordId, IMPLEMENTATION_SPACE, 7);
object_id!(BlindedBalanceId, IMPLEMENTATION_SPACE, 14);
object_id!(ConfidentialTxId, IMPLEMENTATION_SPACE, 15);
object_id!(TransactionDetailId, IMPLEMENTATION_SPACE, 16);

/// Collects fees of every operation until they are distributed.
pub const MINER_ACCOUNT: AccountId = AccountId(0);

/// Sink for values that must leave circulation.
pub const NULL_ACCOUNT: AccountId = AccountId(1);

/// Transient fee payer for operations that have no open-balance payer,
/// like spending blinded or confidential commitments. Its balance is
/// always zero outside of an operation.
pub const TEMP_ACCOUNT: AccountId = AccountId(2);

/// Default voting account, meaning "I vote for myself".
pub const PROXY_TO_SELF_ACCOUNT: AccountId = AccountId(3);

/// The asset in which fee schedules are denominated.
pub const CORE_ASSET: AssetId = AssetId(0);

/// Miner vote slot allocated by miner creation.
#[derive(
  Debug,
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
pub struct VoteId(pub u32);
