use {
  crate::b58::ToBase58String,
  curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
  },
  ed25519_dalek::{ExpandedSecretKey, Signature, Verifier},
  multihash::{Hasher, Sha3_256},
  serde::{de, Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

/// Prefix of the textual form of every public key.
pub const KEY_PREFIX: &str = "VEIL";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
  #[error("public key must start with '{}'", KEY_PREFIX)]
  MissingPrefix,

  #[error("invalid base58 encoding: {0}")]
  Encoding(String),

  #[error("public key must be 32 bytes long")]
  Length,

  #[error("key is not a valid curve point")]
  InvalidPoint,
}

/// A 32 byte public key.
///
/// Keys are compressed Edwards points, so the same type serves as an
/// ed25519 verification key for authorities and signatures, and as the
/// one-time transaction and stealth owner keys of confidential outputs.
///
/// The textual form (`VEIL` followed by base58) doubles as the name of
/// accounts that are created implicitly by a transfer to a key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
  pub const fn from_bytes(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }

  /// Checks an ed25519 signature made by this key over `message`.
  ///
  /// Returns false for keys that are not valid ed25519 points.
  pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
    match ed25519_dalek::PublicKey::from_bytes(&self.0) {
      Ok(key) => key.verify(message, signature).is_ok(),
      Err(_) => false,
    }
  }

  pub fn to_point(&self) -> Option<EdwardsPoint> {
    CompressedEdwardsY(self.0).decompress()
  }

  pub fn from_point(point: &EdwardsPoint) -> Self {
    Self(point.compress().to_bytes())
  }

  /// Public key of a raw secret scalar, `secret·G`.
  pub fn from_secret(secret: &Scalar) -> Self {
    Self::from_point(&(secret * ED25519_BASEPOINT_POINT))
  }
}

/// Produces an ed25519 signature with a raw secret scalar.
///
/// Stealth owner keys have no seed, only the scalar `b + Hs(a·R)`, so
/// they cannot go through the usual `Keypair` path. The per-signature
/// nonce prefix is derived from the scalar itself.
pub fn sign_with_scalar(
  secret: &Scalar,
  message: &[u8],
) -> Result<(PublicKey, Signature), KeyError> {
  let public = PublicKey::from_secret(secret);

  let mut hasher = Sha3_256::default();
  hasher.update(b"veil-nonce");
  hasher.update(secret.as_bytes());

  let mut expanded = [0u8; 64];
  expanded[..32].copy_from_slice(secret.as_bytes());
  expanded[32..].copy_from_slice(hasher.finalize());

  let expanded = ExpandedSecretKey::from_bytes(&expanded)
    .map_err(|_| KeyError::InvalidPoint)?;
  let verifier = ed25519_dalek::PublicKey::from_bytes(public.as_bytes())
    .map_err(|_| KeyError::InvalidPoint)?;
  Ok((public, expanded.sign(message, &verifier)))
}

impl AsRef<[u8]> for PublicKey {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for PublicKey {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for PublicKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{KEY_PREFIX}{}", self.0.to_b58())
  }
}

impl Debug for PublicKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "key({self})")
  }
}

impl From<PublicKey> for String {
  fn from(pk: PublicKey) -> Self {
    pk.to_string()
  }
}

impl FromStr for PublicKey {
  type Err = KeyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let encoded = s.strip_prefix(KEY_PREFIX).ok_or(KeyError::MissingPrefix)?;
    let decoded = bs58::decode(encoded)
      .into_vec()
      .map_err(|e| KeyError::Encoding(e.to_string()))?;
    let bytes: [u8; 32] =
      decoded.try_into().map_err(|_| KeyError::Length)?;
    Ok(Self(bytes))
  }
}

impl TryFrom<&str> for PublicKey {
  type Error = KeyError;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    FromStr::from_str(value)
  }
}

/// Human readable formats (genesis and block files) carry the textual
/// form, binary formats carry the raw 32 bytes.
impl Serialize for PublicKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
      serializer.serialize_str(&self.to_string())
    } else {
      self.0.serialize(serializer)
    }
  }
}

impl<'de> Deserialize<'de> for PublicKey {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    if deserializer.is_human_readable() {
      let text = String::deserialize(deserializer)?;
      text.parse().map_err(de::Error::custom)
    } else {
      <[u8; 32]>::deserialize(deserializer).map(Self)
    }
  }
}

impl From<ed25519_dalek::PublicKey> for PublicKey {
  fn from(p: ed25519_dalek::PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}
