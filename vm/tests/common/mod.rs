#![allow(dead_code)]

use {
  rand::thread_rng,
  veil_primitives::{
    ed25519_dalek::Keypair,
    AccountId,
    Authority,
    Block,
    BlindingFactor,
    ChainParameters,
    FeeSchedule,
    Operation,
    PublicKey,
    Scalar,
    SignedTransaction,
    Timestamp,
    Transaction,
  },
  veil_vm::{
    Database,
    Genesis,
    GenesisAccount,
    LedgerError,
    ProcessedTransaction,
  },
};

pub const GENESIS_TIME: Timestamp = Timestamp(1_600_000_000);

pub fn keypair() -> Keypair {
  Keypair::generate(&mut thread_rng())
}

pub fn public(keypair: &Keypair) -> PublicKey {
  PublicKey::from(keypair.public)
}

pub fn scalar() -> Scalar {
  Scalar::random(&mut thread_rng())
}

pub fn blinding() -> BlindingFactor {
  BlindingFactor::from_scalar(&scalar())
}

/// Chain parameters with every operation free of charge.
pub fn free_parameters() -> ChainParameters {
  ChainParameters {
    current_fees: FeeSchedule::zero(),
    ..Default::default()
  }
}

/// A ledger plus the block it currently builds on.
pub struct Chain {
  pub db: Database,
  pub head: Block,
  nonce: u32,
}

impl Chain {
  /// Genesis where every key in `funded` owns an account holding
  /// `balance` of the core asset.
  pub fn new(
    parameters: ChainParameters,
    funded: &[&Keypair],
    balance: i64,
  ) -> anyhow::Result<Self> {
    Self::with_genesis(Genesis {
      initial_timestamp: GENESIS_TIME,
      parameters,
      accounts: funded
        .iter()
        .map(|k| GenesisAccount {
          key: public(k),
          balances: [("VEIL".to_owned(), balance)].into(),
        })
        .collect(),
      ..Default::default()
    })
  }

  pub fn with_genesis(genesis: Genesis) -> anyhow::Result<Self> {
    Ok(Self {
      db: genesis.build()?,
      head: Block::zero(genesis.initial_timestamp),
      nonce: 0,
    })
  }

  /// Id of the account named after the key of `keypair`.
  pub fn account(&self, keypair: &Keypair) -> AccountId {
    self.account_of(&public(keypair))
  }

  pub fn account_of(&self, key: &PublicKey) -> AccountId {
    self
      .db
      .get_account_by_name(&key.to_string())
      .map(|a| a.id)
      .expect("account exists")
  }

  /// An unsigned transaction expiring shortly after the head. Every
  /// call yields a distinct transaction id.
  pub fn transaction(&mut self, ops: Vec<Operation>) -> SignedTransaction {
    self.nonce += 1;
    let expiration = self.db.head_block_time() + 60 + self.nonce;
    SignedTransaction::new(Transaction::new(expiration, ops))
  }

  pub fn signed(
    &mut self,
    ops: Vec<Operation>,
    signers: &[&Keypair],
  ) -> SignedTransaction {
    let mut tx = self.transaction(ops);
    for keypair in signers {
      tx.sign(keypair);
    }
    tx
  }

  pub fn push(
    &mut self,
    ops: Vec<Operation>,
    signers: &[&Keypair],
  ) -> Result<ProcessedTransaction, LedgerError> {
    let tx = self.signed(ops, signers);
    self.db.push_transaction(&tx)
  }

  /// Applies a block `seconds` after the head carrying `transactions`.
  pub fn produce_block(
    &mut self,
    seconds: u32,
    transactions: Vec<SignedTransaction>,
  ) -> Result<Vec<ProcessedTransaction>, LedgerError> {
    let block = Block::new(&self.head, self.head.timestamp + seconds, transactions);
    let processed = self.db.apply_block(&block)?;
    self.head = block;
    Ok(processed)
  }

  pub fn advance(&mut self, seconds: u32) -> Result<(), LedgerError> {
    self.produce_block(seconds, vec![]).map(|_| ())
  }
}

pub fn single_key(keypair: &Keypair) -> Authority {
  Authority::single_key(public(keypair))
}
