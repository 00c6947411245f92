use {
  crate::{AssetId, CORE_ASSET},
  serde::{Deserialize, Serialize},
  std::{
    fmt::Display,
    ops::{Add, Neg, Sub},
  },
  thiserror::Error,
};

/// Signed amount of an asset in its smallest unit.
///
/// Signed so that balance deltas and the confidential supply invariant
/// can be expressed and checked without wrap-around.
pub type ShareType = i64;

/// Upper bound of any asset supply.
pub const MAX_SHARE_SUPPLY: ShareType = 1_000_000_000_000_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
  #[error("asset mismatch: {0} vs {1}")]
  Mismatch(AssetId, AssetId),

  #[error("arithmetic overflow while converting {0}")]
  Overflow(AssetAmount),

  #[error("price {0} is not convertible")]
  InvalidPrice(Price),
}

#[derive(
  Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct AssetAmount {
  pub amount: ShareType,
  pub asset_id: AssetId,
}

impl AssetAmount {
  pub const fn new(amount: ShareType, asset_id: AssetId) -> Self {
    Self { amount, asset_id }
  }

  pub const fn core(amount: ShareType) -> Self {
    Self::new(amount, CORE_ASSET)
  }

  pub fn checked_add(&self, other: &Self) -> Result<Self, AssetError> {
    if self.asset_id != other.asset_id {
      return Err(AssetError::Mismatch(self.asset_id, other.asset_id));
    }
    self
      .amount
      .checked_add(other.amount)
      .map(|amount| Self::new(amount, self.asset_id))
      .ok_or(AssetError::Overflow(*self))
  }

  /// Converts this amount through an exchange rate.
  ///
  /// The price must have this amount's asset on one side, the result
  /// is denominated in the other side and rounded down.
  pub fn convert(&self, price: &Price) -> Result<AssetAmount, AssetError> {
    let (from, to) = if price.base.asset_id == self.asset_id {
      (price.base, price.quote)
    } else if price.quote.asset_id == self.asset_id {
      (price.quote, price.base)
    } else {
      return Err(AssetError::Mismatch(self.asset_id, price.base.asset_id));
    };

    if from.amount <= 0 || to.amount <= 0 {
      return Err(AssetError::InvalidPrice(*price));
    }

    let converted =
      self.amount as i128 * to.amount as i128 / from.amount as i128;
    if converted > MAX_SHARE_SUPPLY as i128 {
      return Err(AssetError::Overflow(*self));
    }
    Ok(AssetAmount::new(converted as ShareType, to.asset_id))
  }
}

impl Add for AssetAmount {
  type Output = AssetAmount;

  /// Panics when the assets differ, use `checked_add` on untrusted input.
  fn add(self, rhs: Self) -> Self::Output {
    assert_eq!(self.asset_id, rhs.asset_id, "adding different assets");
    AssetAmount::new(self.amount + rhs.amount, self.asset_id)
  }
}

impl Sub for AssetAmount {
  type Output = AssetAmount;

  fn sub(self, rhs: Self) -> Self::Output {
    assert_eq!(self.asset_id, rhs.asset_id, "subtracting different assets");
    AssetAmount::new(self.amount - rhs.amount, self.asset_id)
  }
}

impl Neg for AssetAmount {
  type Output = AssetAmount;

  fn neg(self) -> Self::Output {
    AssetAmount::new(-self.amount, self.asset_id)
  }
}

impl Display for AssetAmount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} of {}", self.amount, self.asset_id)
  }
}

/// Exchange rate between two assets, `base` units buy `quote` units.
#[derive(
  Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Price {
  pub base: AssetAmount,
  pub quote: AssetAmount,
}

impl Price {
  /// The 1:1 rate of an asset to itself.
  pub const fn unit(asset_id: AssetId) -> Self {
    Self {
      base: AssetAmount::new(1, asset_id),
      quote: AssetAmount::new(1, asset_id),
    }
  }

  /// Rate at which `core` units of the core asset buy `amount` units of
  /// `asset_id`.
  pub const fn core_exchange(
    core: ShareType,
    amount: ShareType,
    asset_id: AssetId,
  ) -> Self {
    Self {
      base: AssetAmount::core(core),
      quote: AssetAmount::new(amount, asset_id),
    }
  }
}

impl Display for Price {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} / {}", self.base, self.quote)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_through_core_exchange_rate() {
    let usd = AssetId(1);
    let rate = Price::core_exchange(10, 3, usd);

    let fee = AssetAmount::core(100).convert(&rate).unwrap();
    assert_eq!(fee, AssetAmount::new(30, usd));

    let back = AssetAmount::new(30, usd).convert(&rate).unwrap();
    assert_eq!(back, AssetAmount::core(100));

    assert!(AssetAmount::new(5, AssetId(9)).convert(&rate).is_err());
  }

  #[test]
  fn unit_price_is_identity() {
    let amount = AssetAmount::core(12345);
    assert_eq!(amount.convert(&Price::unit(CORE_ASSET)).unwrap(), amount);
  }
}
