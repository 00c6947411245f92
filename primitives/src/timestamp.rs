use {
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    ops::{Add, Sub},
  },
  time::{format_description::well_known::Rfc3339, OffsetDateTime},
};

/// Seconds since the unix epoch, the resolution of block timestamps.
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
pub struct Timestamp(pub u32);

impl Timestamp {
  pub const MAX: Timestamp = Timestamp(u32::MAX);

  pub fn seconds(&self) -> u32 {
    self.0
  }
}

impl Add<u32> for Timestamp {
  type Output = Timestamp;

  fn add(self, rhs: u32) -> Self::Output {
    Timestamp(self.0.saturating_add(rhs))
  }
}

impl Sub<Timestamp> for Timestamp {
  type Output = u32;

  /// Elapsed seconds, zero if `rhs` is later.
  fn sub(self, rhs: Timestamp) -> Self::Output {
    self.0.saturating_sub(rhs.0)
  }
}

impl Display for Timestamp {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match OffsetDateTime::from_unix_timestamp(self.0 as i64)
      .ok()
      .and_then(|t| t.format(&Rfc3339).ok())
    {
      Some(text) => write!(f, "{text}"),
      None => write!(f, "{}s", self.0),
    }
  }
}

impl Debug for Timestamp {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Timestamp({self})")
  }
}
