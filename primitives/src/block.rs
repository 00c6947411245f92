use {
  crate::{b58::ToBase58String, SignedTransaction, Timestamp},
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
};

#[derive(Clone, Serialize, Deserialize)]
pub struct Block {
  pub height: u64,
  pub parent: Multihash,
  pub timestamp: Timestamp,
  pub transactions: Vec<SignedTransaction>,

  #[serde(skip)]
  hash_cache: OnceCell<Multihash>,
}

impl Block {
  pub fn new(
    parent: &Block,
    timestamp: Timestamp,
    transactions: Vec<SignedTransaction>,
  ) -> Self {
    Self {
      height: parent.height + 1,
      parent: *parent.hash(),
      timestamp,
      transactions,
      hash_cache: Default::default(),
    }
  }

  /// The block every chain starts from.
  pub fn zero(timestamp: Timestamp) -> Self {
    Self {
      height: 0,
      parent: Multihash::default(),
      timestamp,
      transactions: vec![],
      hash_cache: OnceCell::new(),
    }
  }

  pub fn hash(&self) -> &Multihash {
    self.hash_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(&rmp_serde::to_vec(self).unwrap());
      multihash::Code::Sha3_256.wrap(hasher.finalize()).unwrap()
    })
  }
}

impl std::fmt::Debug for Block {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Block")
      .field("height", &self.height)
      .field("parent", &self.parent.to_b58())
      .field("hash", &self.hash().to_b58())
      .field("timestamp", &self.timestamp)
      .field("transactions", &self.transactions)
      .finish()
  }
}
