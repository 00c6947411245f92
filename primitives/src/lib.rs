//! Data model of the Veil ledger.
//!
//! Everything in this crate is plain data plus the stateless rules that
//! can be checked on it in isolation: ids, keys, asset amounts,
//! authorities, value commitments, operations, transactions, blocks,
//! chain parameters and the fee schedule.

mod asset;
mod authority;
mod b58;
mod block;
mod commitment;
mod fees;
mod ids;
mod keys;
mod operations;
mod params;
mod timestamp;
mod transaction;

pub use {
  asset::{AssetAmount, AssetError, Price, ShareType, MAX_SHARE_SUPPLY},
  authority::{Authority, Weight},
  b58::ToBase58String,
  block::Block,
  commitment::{
    is_stealth_owner,
    stealth_owner_secret,
    verify_sum,
    BlindingFactor,
    Commitment,
    RangeProof,
    StealthAddress,
  },
  fees::{FeeError, FeeParameters, FeeSchedule, FULL_SCALE},
  ids::*,
  keys::{sign_with_scalar, KeyError, PublicKey, KEY_PREFIX},
  operations::*,
  params::ChainParameters,
  timestamp::Timestamp,
  transaction::{SignedTransaction, Transaction, TransactionError},
};

// re-exported so that dependents sign and build keys with the same
// versions of the curve crates
pub use {curve25519_dalek::scalar::Scalar, ed25519_dalek};
