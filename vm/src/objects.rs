//! Record kinds persisted in the object store.

use {
  crate::store::Record,
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
  veil_primitives::{
    AccountBalanceId,
    AccountId,
    AccountOptions,
    AccountStatisticsId,
    AssetAmount,
    AssetDynamicDataId,
    AssetId,
    Authority,
    BlindedBalanceId,
    ChainParameters,
    Commitment,
    ConfidentialTxId,
    LinearVestingPolicy,
    Memo,
    MinerId,
    Operation,
    Price,
    ProposalId,
    PublicKey,
    RangeProof,
    ShareType,
    Timestamp,
    TransactionDetailId,
    TransactionRecordId,
    VestingBalanceId,
    VoteId,
  },
};

macro_rules! record {
  ($ty:ty, $id:ty) => {
    impl Record for $ty {
      type Id = $id;
      type Key = ();

      fn id(&self) -> $id {
        self.id
      }
    }
  };
  ($ty:ty, $id:ty, $key:ty, |$r:ident| $key_expr:expr) => {
    impl Record for $ty {
      type Id = $id;
      type Key = $key;

      fn id(&self) -> $id {
        self.id
      }

      fn key(&self) -> Option<$key> {
        let $r = self;
        Some($key_expr)
      }
    }
  };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub id: AccountId,

  /// Unique. Implicitly created accounts are named after their key.
  pub name: String,
  pub owner: Authority,
  pub options: AccountOptions,
  pub registrar: AccountId,
  pub statistics: AccountStatisticsId,
}

record!(Account, AccountId, String, |r| r.name.clone());

/// Hot counters of an account, kept apart from [`Account`] so that fee
/// payments do not rewrite the account itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatistics {
  pub id: AccountStatisticsId,
  pub owner: AccountId,
  pub total_ops: u64,

  /// Fees paid so far, in core asset units.
  pub pending_fees: ShareType,
}

record!(AccountStatistics, AccountStatisticsId, AccountId, |r| r.owner);

/// Open balance of one account in one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
  pub id: AccountBalanceId,
  pub owner: AccountId,
  pub asset_id: AssetId,
  pub balance: ShareType,
}

record!(AccountBalance, AccountBalanceId, (AccountId, AssetId), |r| (
  r.owner, r.asset_id
));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
  pub id: AssetId,
  pub symbol: String,
  pub precision: u8,
  pub issuer: AccountId,

  /// Rate at which fees paid in this asset convert to the core asset.
  pub core_exchange_rate: Price,
  pub dynamic_data: AssetDynamicDataId,
}

record!(Asset, AssetId, String, |r| r.symbol.clone());

/// Mutable aggregates of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDynamicData {
  pub id: AssetDynamicDataId,
  pub current_supply: ShareType,

  /// Part of the supply held in blinded or confidential form. Never
  /// negative.
  pub confidential_supply: ShareType,

  /// Fees collected in this asset.
  pub accumulated_fees: ShareType,
}

record!(AssetDynamicData, AssetDynamicDataId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miner {
  pub id: MinerId,
  pub miner_account: AccountId,
  pub url: String,
  pub signing_key: PublicKey,
  pub vote_id: VoteId,
}

record!(Miner, MinerId, AccountId, |r| r.miner_account);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
  pub id: ProposalId,
  pub proposer: AccountId,
  pub expiration_time: Timestamp,

  /// Approvals may not be added from this time on.
  pub review_period_time: Option<Timestamp>,
  pub proposed_ops: Vec<Operation>,
  pub required_active_approvals: BTreeSet<AccountId>,
  pub available_active_approvals: BTreeSet<AccountId>,
  pub required_owner_approvals: BTreeSet<AccountId>,
  pub available_owner_approvals: BTreeSet<AccountId>,
  pub available_key_approvals: BTreeSet<PublicKey>,

  /// Why the last execution attempt failed.
  pub fail_reason: Option<String>,
}

record!(Proposal, ProposalId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingBalance {
  pub id: VestingBalanceId,
  pub owner: AccountId,
  pub balance: AssetAmount,
  pub begin_balance: ShareType,
  pub withdrawn: ShareType,
  pub policy: LinearVestingPolicy,
}

record!(VestingBalance, VestingBalanceId);

/// Id of an applied transaction, remembered until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
  pub id: TransactionRecordId,
  pub trx_id: Vec<u8>,
  pub expiration: Timestamp,
}

record!(TransactionRecord, TransactionRecordId, Vec<u8>, |r| r.trx_id.clone());

/// A commitment spendable by whoever satisfies `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedBalance {
  pub id: BlindedBalanceId,
  pub commitment: Commitment,
  pub asset_id: AssetId,
  pub owner: Authority,
}

record!(BlindedBalance, BlindedBalanceId, Commitment, |r| r.commitment);

/// A confidential output. Spent outputs stay around with `unspent`
/// cleared and their range proof dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialTx {
  pub id: ConfidentialTxId,
  pub commitment: Commitment,

  /// Asset the output was created in. Public anyway, since value only
  /// enters and leaves confidential form in the clear.
  pub asset_id: AssetId,
  pub tx_key: PublicKey,
  pub owner: PublicKey,
  pub data: Vec<u8>,
  pub range_proof: RangeProof,
  pub message: Vec<u8>,
  pub unspent: bool,
  pub timestamp: Timestamp,
  pub block_number: u32,
}

record!(ConfidentialTx, ConfidentialTxId, Commitment, |r| r.commitment);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
  Transfer,
  AccountCreate,
  ConfidentialTransfer,
  VestingWithdraw,
}

/// Audit entry of a balance moving operation, for account history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
  pub id: TransactionDetailId,
  pub kind: DetailKind,
  pub from_account: AccountId,
  pub to_account: AccountId,
  pub from_name: Option<String>,
  pub to_name: Option<String>,
  pub amount: AssetAmount,
  pub fee: AssetAmount,
  pub description: String,
  pub memo: Option<Memo>,
  pub timestamp: Timestamp,
  pub block_number: u32,
}

record!(TransactionDetail, TransactionDetailId);

/// Chain wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalProperties {
  pub parameters: ChainParameters,

  /// Replaces `parameters` when the next block is applied.
  pub pending_parameters: Option<ChainParameters>,
  pub next_available_vote_id: u32,
}

/// Chain wide state that changes with every block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
  pub head_block_number: u32,
  pub head_block_id: Vec<u8>,
  pub time: Timestamp,
  pub accounts_registered_this_interval: u32,
}
