use {
  super::{RequiredAuthorities, ValidationError},
  crate::{AccountId, AssetAmount, Authority, VoteId, PROXY_TO_SELF_ACCOUNT},
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
};

/// Voting preferences of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOptions {
  /// Account whose votes are used in place of this account's own.
  pub voting_account: AccountId,

  /// Number of miners this account wishes to see elected.
  pub num_miner: u16,

  pub votes: BTreeSet<VoteId>,
}

impl Default for AccountOptions {
  fn default() -> Self {
    Self {
      voting_account: PROXY_TO_SELF_ACCOUNT,
      num_miner: 0,
      votes: BTreeSet::new(),
    }
  }
}

impl AccountOptions {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if (self.num_miner as usize) > self.votes.len() {
      return Err(ValidationError::TooFewVotes {
        num_miner: self.num_miner,
        votes: self.votes.len(),
      });
    }
    Ok(())
  }
}

/// Registers a new account named after the first key of its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateOperation {
  pub fee: AssetAmount,
  pub registrar: AccountId,
  pub owner: Authority,
  pub options: AccountOptions,
}

impl AccountCreateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.registrar
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.registrar);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.owner.first_key().is_none() {
      return Err(ValidationError::OwnerWithoutKeys);
    }
    if self.owner.is_impossible() {
      return Err(ValidationError::ImpossibleAuthority);
    }
    self.options.validate()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateOperation {
  pub fee: AssetAmount,
  pub account: AccountId,
  pub owner: Option<Authority>,
  pub new_options: Option<AccountOptions>,
}

impl AccountUpdateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.account
  }

  /// Replacing the owner needs the owner's consent, anything else only
  /// the active approval.
  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    if self.owner.is_some() {
      auths.owner.insert(self.account);
    } else {
      auths.active.insert(self.account);
    }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.owner.is_none() && self.new_options.is_none() {
      return Err(ValidationError::NothingToUpdate);
    }
    if let Some(owner) = &self.owner {
      if owner.is_impossible() {
        return Err(ValidationError::ImpossibleAuthority);
      }
    }
    if let Some(options) = &self.new_options {
      options.validate()?;
    }
    Ok(())
  }
}
