use {
  crate::{
    b58::ToBase58String,
    keys::{sign_with_scalar, KeyError},
    Operation,
    PublicKey,
    Timestamp,
  },
  curve25519_dalek::scalar::Scalar,
  ed25519_dalek::{Keypair, Signature, Signer},
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
  std::{collections::BTreeSet, fmt::Debug},
  thiserror::Error,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
  #[error("signature of {0} does not match the transaction")]
  InvalidSignature(PublicKey),

  #[error("{0} signed more than once")]
  DuplicateSignature(PublicKey),
}

/// An ordered list of operations applied atomically.
#[derive(Clone, Serialize, Deserialize)]
pub struct Transaction {
  /// The transaction is rejected once the head block time reaches this
  /// value. Also bounds how long its id is remembered for duplicate
  /// detection.
  pub expiration: Timestamp,
  pub operations: Vec<Operation>,

  #[serde(skip)]
  hash_cache: OnceCell<Multihash>,
}

impl Transaction {
  pub fn new(expiration: Timestamp, operations: Vec<Operation>) -> Self {
    Self {
      expiration,
      operations,
      hash_cache: OnceCell::new(),
    }
  }

  /// Digest of the transaction, also the message that signers sign.
  pub fn id(&self) -> &Multihash {
    self.hash_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(&rmp_serde::to_vec(&self.expiration).unwrap());
      hasher.update(&rmp_serde::to_vec(&self.operations).unwrap());
      multihash::Code::Sha3_256.wrap(hasher.finalize()).unwrap()
    })
  }
}

impl PartialEq for Transaction {
  fn eq(&self, other: &Self) -> bool {
    self.expiration == other.expiration && self.operations == other.operations
  }
}

impl Eq for Transaction {}

impl Debug for Transaction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transaction")
      .field("id", &self.id().to_b58())
      .field("expiration", &self.expiration)
      .field("operations", &self.operations)
      .finish()
  }
}

/// A transaction together with the signatures authorizing it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
  pub transaction: Transaction,
  pub signatures: Vec<(PublicKey, Signature)>,
}

impl SignedTransaction {
  pub fn new(transaction: Transaction) -> Self {
    Self {
      transaction,
      signatures: vec![],
    }
  }

  pub fn id(&self) -> &Multihash {
    self.transaction.id()
  }

  /// Adds a signature by an ed25519 keypair.
  pub fn sign(&mut self, keypair: &Keypair) {
    let signature = keypair.sign(&self.id().to_bytes());
    self
      .signatures
      .push((PublicKey::from(keypair.public), signature));
  }

  /// Adds a signature by a raw secret scalar, as held for stealth owner
  /// keys of confidential outputs.
  pub fn sign_with_scalar(&mut self, secret: &Scalar) -> Result<(), KeyError> {
    let message = self.id().to_bytes();
    self.signatures.push(sign_with_scalar(secret, &message)?);
    Ok(())
  }

  pub fn with_signature(mut self, keypair: &Keypair) -> Self {
    self.sign(keypair);
    self
  }

  /// The set of keys that signed this transaction.
  ///
  /// Fails on the first signature that does not verify, and on keys
  /// that signed twice.
  pub fn signature_keys(&self) -> Result<BTreeSet<PublicKey>, TransactionError> {
    let message = self.id().to_bytes();
    let mut keys = BTreeSet::new();
    for (key, signature) in &self.signatures {
      if !key.verify(&message, signature) {
        return Err(TransactionError::InvalidSignature(*key));
      }
      if !keys.insert(*key) {
        return Err(TransactionError::DuplicateSignature(*key));
      }
    }
    Ok(keys)
  }
}

impl Debug for SignedTransaction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SignedTransaction")
      .field("transaction", &self.transaction)
      .field(
        "signatures",
        &self
          .signatures
          .iter()
          .map(|(key, sig)| (key, sig.to_b58()))
          .collect::<Vec<_>>(),
      )
      .finish()
  }
}
