use {
  crate::store::StoreError,
  thiserror::Error,
  veil_primitives::{
    AccountId,
    AssetAmount,
    AssetError,
    AssetId,
    Authority,
    Commitment,
    FeeError,
    MinerId,
    Operation,
    OperationKind,
    ProposalId,
    PublicKey,
    ShareType,
    Timestamp,
    TransactionError,
    ValidationError,
    VestingBalanceId,
    VoteId,
  },
};

/// Reasons an authority check fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorityError {
  #[error("missing required active authority of {0}")]
  MissingActive(AccountId),

  #[error("missing required owner authority of {0}")]
  MissingOwner(AccountId),

  #[error("missing required authority {0:?}")]
  MissingOther(Authority),

  #[error("signatures of {0:?} are not needed by the transaction")]
  IrrelevantSignatures(Vec<PublicKey>),

  #[error("authority of {account} nests deeper than {max_depth} levels")]
  DepthExceeded { account: AccountId, max_depth: u8 },

  #[error("authority references unknown account {0}")]
  UnknownAccount(AccountId),

  #[error("authority has {found} members, at most {max} are allowed")]
  TooManyMembers { found: usize, max: u16 },
}

/// Everything that can go wrong while applying operations,
/// transactions and blocks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Authority(#[from] AuthorityError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Fee(#[from] FeeError),

  #[error(transparent)]
  Asset(#[from] AssetError),

  #[error(transparent)]
  Signature(#[from] TransactionError),

  #[error("operation #{index} ({kind}) failed: {source}")]
  Operation {
    index: usize,
    kind: OperationKind,
    op: Box<Operation>,
    #[source]
    source: Box<LedgerError>,
  },

  #[error("account create authority check failed: {0}")]
  AccountCreateAuthority(#[source] AuthorityError),

  #[error("account update authority check failed: {0}")]
  AccountUpdateAuthority(#[source] AuthorityError),

  #[error("output authority check failed: {0}")]
  TransferAuthority(#[source] AuthorityError),

  #[error("no evaluator registered for {0}")]
  NoEvaluator(OperationKind),

  #[error("unknown account {0}")]
  UnknownAccount(AccountId),

  #[error("no account named {0}")]
  UnknownAccountName(String),

  #[error("account name {0} is already taken")]
  AccountNameTaken(String),

  #[error("unknown asset {0}")]
  UnknownAsset(AssetId),

  #[error(
    "insufficient balance of {account}: needs {needed} of {asset}, has \
     {available}"
  )]
  InsufficientBalance {
    account: AccountId,
    asset: AssetId,
    needed: ShareType,
    available: ShareType,
  },

  #[error("insufficient fee: {provided} provided, {required} required")]
  InsufficientFee {
    required: AssetAmount,
    provided: AssetAmount,
  },

  #[error("unknown commitment {0}")]
  UnknownCommitment(Commitment),

  #[error("commitment {0} already exists")]
  CommitmentExists(Commitment),

  #[error("commitment {0} is owned by someone else")]
  CommitmentOwnerMismatch(Commitment),

  #[error("commitment {commitment} holds {found}, expected {expected}")]
  CommitmentAssetMismatch {
    commitment: Commitment,
    expected: AssetId,
    found: AssetId,
  },

  #[error("already spent commitment {0}")]
  AlreadySpent(Commitment),

  #[error("malformed plaintext payout data for {0}")]
  MalformedPayout(PublicKey),

  #[error("confidential supply of {0} would become negative")]
  NegativeConfidentialSupply(AssetId),

  #[error("transfers are frozen since block {0}")]
  TransfersFrozen(u32),

  #[error("{0} may not set the transfer freeze block")]
  NotFreezeAuthority(AccountId),

  #[error("{wanted} miners wanted, at most {max} allowed")]
  TooManyMiners { wanted: u16, max: u16 },

  #[error("vote {0:?} does not exist")]
  UnknownVote(VoteId),

  #[error("{0} is already a miner")]
  AlreadyMiner(AccountId),

  #[error("unknown miner {0}")]
  UnknownMiner(MinerId),

  #[error("miner {miner} does not belong to {account}")]
  NotMinerOwner { miner: MinerId, account: AccountId },

  #[error("{0} may only be executed as part of a proposal")]
  ProposalOnly(OperationKind),

  #[error("unknown proposal {0}")]
  UnknownProposal(ProposalId),

  #[error("proposal expiration {0} is out of range")]
  InvalidProposalExpiration(Timestamp),

  #[error("proposals touching the miner account need a review period of at least {0} seconds")]
  ReviewPeriodRequired(u32),

  #[error("proposals may only require account authorities")]
  NonAccountAuthority,

  #[error("approvals can no longer be added, review period started at {0}")]
  ReviewPeriodStarted(Timestamp),

  #[error("approval of {0} is already present")]
  ApprovalAlreadyPresent(String),

  #[error("approval of {0} is not present")]
  ApprovalNotPresent(String),

  #[error("{0} is not among the required approvers")]
  NotRequiredApprover(AccountId),

  #[error("unknown vesting balance {0}")]
  UnknownVestingBalance(VestingBalanceId),

  #[error("vesting balance {balance} belongs to {owner}")]
  NotVestingOwner {
    balance: VestingBalanceId,
    owner: AccountId,
  },

  #[error("only {available} has vested, {requested} requested")]
  InsufficientVested {
    requested: AssetAmount,
    available: ShareType,
  },

  #[error("transaction expired at {expiration}, head time is {now}")]
  Expired { expiration: Timestamp, now: Timestamp },

  #[error("transaction expiration {expiration} is too far past {now}")]
  ExpirationTooFar { expiration: Timestamp, now: Timestamp },

  #[error("duplicate transaction {0}")]
  DuplicateTransaction(String),

  #[error("expected block {expected}, got {found}")]
  UnexpectedBlockHeight { expected: u64, found: u64 },

  #[error("block does not extend the current head block")]
  UnknownParent,

  #[error("block time {found} is not after head time {head}")]
  BlockTimeNotIncreasing { head: Timestamp, found: Timestamp },

  #[error("fees nest deeper than {0} proposals")]
  FeeRecursionExceeded(u32),
}

impl LedgerError {
  /// The innermost error, skipping the operation wrappers.
  pub fn root(&self) -> &LedgerError {
    match self {
      LedgerError::Operation { source, .. } => source.root(),
      other => other,
    }
  }
}
