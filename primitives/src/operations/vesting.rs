use {
  super::{RequiredAuthorities, ValidationError},
  crate::{
    AccountId,
    AssetAmount,
    ShareType,
    Timestamp,
    VestingBalanceId,
  },
  serde::{Deserialize, Serialize},
};

/// Releases a balance linearly over `vesting_duration_seconds` starting
/// at `begin_timestamp`. Nothing is released before the cliff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearVestingPolicy {
  pub begin_timestamp: Timestamp,
  pub vesting_cliff_seconds: u32,
  pub vesting_duration_seconds: u32,
}

impl LinearVestingPolicy {
  /// Total amount out of `begin_balance` that has vested at `now`.
  pub fn vested(&self, begin_balance: ShareType, now: Timestamp) -> ShareType {
    if now < self.begin_timestamp {
      return 0;
    }
    let elapsed = now - self.begin_timestamp;
    if elapsed < self.vesting_cliff_seconds {
      return 0;
    }
    if elapsed >= self.vesting_duration_seconds {
      return begin_balance;
    }
    let vested = (begin_balance as i128 * elapsed as i128)
      / self.vesting_duration_seconds as i128;
    vested as ShareType
  }

  /// What is left to withdraw when `withdrawn` has already been taken
  /// out of `begin_balance`.
  pub fn allowed_withdraw(
    &self,
    begin_balance: ShareType,
    withdrawn: ShareType,
    now: Timestamp,
  ) -> ShareType {
    (self.vested(begin_balance, now) - withdrawn).max(0)
  }
}

/// Locks part of the creator's balance into a vesting balance owned by
/// `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingBalanceCreateOperation {
  pub fee: AssetAmount,
  pub creator: AccountId,
  pub owner: AccountId,
  pub amount: AssetAmount,
  pub policy: LinearVestingPolicy,
}

impl VestingBalanceCreateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.creator
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.creator);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.amount.amount <= 0 {
      return Err(ValidationError::NonPositiveAmount("amount"));
    }
    if self.policy.vesting_cliff_seconds > self.policy.vesting_duration_seconds
    {
      return Err(ValidationError::InvalidVestingPolicy);
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingBalanceWithdrawOperation {
  pub fee: AssetAmount,
  pub vesting_balance: VestingBalanceId,
  pub owner: AccountId,
  pub amount: AssetAmount,
}

impl VestingBalanceWithdrawOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.owner
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.owner);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.amount.amount <= 0 {
      return Err(ValidationError::NonPositiveAmount("amount"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn linear_release_after_cliff() {
    let policy = LinearVestingPolicy {
      begin_timestamp: Timestamp(1000),
      vesting_cliff_seconds: 100,
      vesting_duration_seconds: 400,
    };

    assert_eq!(policy.vested(800, Timestamp(900)), 0);
    assert_eq!(policy.vested(800, Timestamp(1099)), 0);
    assert_eq!(policy.vested(800, Timestamp(1100)), 200);
    assert_eq!(policy.vested(800, Timestamp(1200)), 400);
    assert_eq!(policy.vested(800, Timestamp(1400)), 800);
    assert_eq!(policy.vested(800, Timestamp(5000)), 800);

    assert_eq!(policy.allowed_withdraw(800, 150, Timestamp(1200)), 250);
    assert_eq!(policy.allowed_withdraw(800, 500, Timestamp(1200)), 0);
  }
}
