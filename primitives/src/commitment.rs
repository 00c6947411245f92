use {
  crate::{b58::ToBase58String, PublicKey},
  curve25519_dalek::{
    constants::{ED25519_BASEPOINT_POINT, RISTRETTO_BASEPOINT_POINT},
    edwards::EdwardsPoint,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
  },
  multihash::{Hasher, Sha3_256, Sha3_512},
  once_cell::sync::Lazy,
  serde::{Deserialize, Serialize},
  std::fmt::{Debug, Display},
};

/// Opaque range proof bytes attached to an output. They are stored and
/// carried along, but not re-verified by the ledger.
pub type RangeProof = Vec<u8>;

/// Generator for committed values. Derived by hashing the compressed
/// basepoint, so nobody knows its discrete log relative to `G`.
static VALUE_GENERATOR: Lazy<RistrettoPoint> = Lazy::new(|| {
  let mut hasher = Sha3_512::default();
  hasher.update(RISTRETTO_BASEPOINT_POINT.compress().as_bytes());
  let mut wide = [0u8; 64];
  wide.copy_from_slice(hasher.finalize());
  RistrettoPoint::from_uniform_bytes(&wide)
});

/// A Pedersen commitment `v·H + r·G` to a hidden amount `v`,
/// stored in compressed Ristretto form.
///
/// Commitments are additively homomorphic, which lets the ledger check
/// that inputs and outputs of a blinded transfer balance without ever
/// seeing the amounts. The all-zero encoding is the group identity and
/// is reserved as the "no commitment" marker.
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
pub struct Commitment([u8; 32]);

impl Commitment {
  pub const fn from_bytes(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn identity() -> Self {
    Self([0u8; 32])
  }

  pub fn is_identity(&self) -> bool {
    self.0 == [0u8; 32]
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }

  /// Commits to `value` under `blinding`.
  pub fn new(blinding: &BlindingFactor, value: u64) -> Self {
    let point = Scalar::from(value) * *VALUE_GENERATOR
      + blinding.scalar() * RISTRETTO_BASEPOINT_POINT;
    Self(point.compress().to_bytes())
  }

  fn point(&self) -> Option<RistrettoPoint> {
    CompressedRistretto(self.0).decompress()
  }
}

impl Display for Commitment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0.to_b58())
  }
}

impl Debug for Commitment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "commitment({self})")
  }
}

/// Checks `Σ inputs == Σ outputs + excess·H`.
///
/// `excess` is the publicly known value leaving the committed set, for
/// example a fee paid in the clear. The blinding factors on both sides
/// must cancel out exactly, which only someone who knows all of them
/// can arrange. Returns false if any commitment is not a valid point.
pub fn verify_sum(
  inputs: &[Commitment],
  outputs: &[Commitment],
  excess: u64,
) -> bool {
  let sum = |commits: &[Commitment]| -> Option<RistrettoPoint> {
    commits.iter().try_fold(RistrettoPoint::identity(), |acc, c| {
      c.point().map(|p| acc + p)
    })
  };

  match (sum(inputs), sum(outputs)) {
    (Some(lhs), Some(rhs)) => lhs == rhs + Scalar::from(excess) * *VALUE_GENERATOR,
    _ => false,
  }
}

/// Secret scalar `r` of a commitment.
#[derive(
  Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct BlindingFactor([u8; 32]);

impl BlindingFactor {
  pub const fn from_bytes(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn zero() -> Self {
    Self([0u8; 32])
  }

  pub fn from_scalar(scalar: &Scalar) -> Self {
    Self(scalar.to_bytes())
  }

  pub fn scalar(&self) -> Scalar {
    Scalar::from_bytes_mod_order(self.0)
  }

  /// `Σ positive - Σ negative`, used by wallets to pick the last
  /// blinding factor so that a transfer balances.
  pub fn sum(positive: &[BlindingFactor], negative: &[BlindingFactor]) -> Self {
    let pos: Scalar = positive.iter().map(|b| b.scalar()).sum();
    let neg: Scalar = negative.iter().map(|b| b.scalar()).sum();
    Self::from_scalar(&(pos - neg))
  }
}

impl Debug for BlindingFactor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("BlindingFactor(..)")
  }
}

/// Hashes a Diffie-Hellman point into a scalar.
fn shared_secret(point: &EdwardsPoint) -> Scalar {
  let mut hasher = Sha3_256::default();
  hasher.update(point.compress().as_bytes());
  let mut bytes = [0u8; 32];
  bytes.copy_from_slice(hasher.finalize());
  Scalar::from_bytes_mod_order(bytes)
}

/// Public half of a recipient of confidential outputs.
///
/// `scan_key = a·G` lets the recipient find outputs addressed to it,
/// `spend_key = B` is the base of every one-time owner key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthAddress {
  pub scan_key: PublicKey,
  pub spend_key: PublicKey,
}

impl StealthAddress {
  pub fn from_secrets(scan_secret: &Scalar, spend_secret: &Scalar) -> Self {
    Self {
      scan_key: PublicKey::from_secret(scan_secret),
      spend_key: PublicKey::from_secret(spend_secret),
    }
  }

  /// Sender side: derives `(tx_key, owner)` for an output from a fresh
  /// one-time `nonce`. Returns `None` if the address keys are not valid
  /// points.
  pub fn one_time_keys(&self, nonce: &Scalar) -> Option<(PublicKey, PublicKey)> {
    let scan = self.scan_key.to_point()?;
    let spend = self.spend_key.to_point()?;
    let owner = spend + shared_secret(&(nonce * scan)) * ED25519_BASEPOINT_POINT;
    Some((PublicKey::from_secret(nonce), PublicKey::from_point(&owner)))
  }
}

/// Recipient side: the secret scalar behind the owner key of an output
/// carrying `tx_key`, used to sign the spend of that output.
pub fn stealth_owner_secret(
  scan_secret: &Scalar,
  spend_secret: &Scalar,
  tx_key: &PublicKey,
) -> Option<Scalar> {
  let tx_point = tx_key.to_point()?;
  Some(spend_secret + shared_secret(&(scan_secret * tx_point)))
}

/// Recipient side: true if an output with `tx_key` and `owner` was
/// addressed to the holder of `scan_secret` and `spend_key`.
pub fn is_stealth_owner(
  scan_secret: &Scalar,
  spend_key: &PublicKey,
  tx_key: &PublicKey,
  owner: &PublicKey,
) -> bool {
  match (tx_key.to_point(), spend_key.to_point()) {
    (Some(tx_point), Some(spend)) => {
      let expected =
        spend + shared_secret(&(scan_secret * tx_point)) * ED25519_BASEPOINT_POINT;
      PublicKey::from_point(&expected) == *owner
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use {super::*, crate::keys::sign_with_scalar, rand::thread_rng};

  fn blinding() -> BlindingFactor {
    BlindingFactor::from_scalar(&Scalar::random(&mut thread_rng()))
  }

  #[test]
  fn commitments_balance_when_blindings_cancel() {
    let r_in = blinding();
    let r_out1 = blinding();
    let r_out2 = BlindingFactor::sum(&[r_in], &[r_out1]);

    let input = Commitment::new(&r_in, 100);
    let out1 = Commitment::new(&r_out1, 60);
    let out2 = Commitment::new(&r_out2, 30);

    // 10 leaves in the clear as a fee
    assert!(verify_sum(&[input], &[out1, out2], 10));
    assert!(!verify_sum(&[input], &[out1, out2], 11));
    assert!(!verify_sum(&[input], &[out1], 10));
  }

  #[test]
  fn value_is_hidden_by_blinding() {
    let a = Commitment::new(&blinding(), 5);
    let b = Commitment::new(&blinding(), 5);
    assert_ne!(a, b);
    assert!(!a.is_identity());
    assert!(Commitment::new(&BlindingFactor::zero(), 0).is_identity());
  }

  #[test]
  fn recipient_recognises_its_outputs() {
    let scan_secret = Scalar::random(&mut thread_rng());
    let spend_secret = Scalar::random(&mut thread_rng());
    let address = StealthAddress::from_secrets(&scan_secret, &spend_secret);

    let nonce = Scalar::random(&mut thread_rng());
    let (tx_key, owner) = address.one_time_keys(&nonce).unwrap();

    assert!(is_stealth_owner(
      &scan_secret,
      &address.spend_key,
      &tx_key,
      &owner
    ));

    let secret =
      stealth_owner_secret(&scan_secret, &spend_secret, &tx_key).unwrap();
    assert_eq!(PublicKey::from_secret(&secret), owner);

    let (signer, signature) = sign_with_scalar(&secret, b"spend").unwrap();
    assert_eq!(signer, owner);
    assert!(owner.verify(b"spend", &signature));

    let stranger = Scalar::random(&mut thread_rng());
    assert!(!is_stealth_owner(
      &stranger,
      &address.spend_key,
      &tx_key,
      &owner
    ));
  }
}
