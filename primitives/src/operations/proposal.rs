use {
  super::{Operation, RequiredAuthorities, ValidationError},
  crate::{AccountId, AssetAmount, Authority, ProposalId, PublicKey, Timestamp},
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
};

/// Proposes a list of operations for deferred execution once every
/// authority they need has approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreateOperation {
  pub fee: AssetAmount,
  pub fee_paying_account: AccountId,
  pub expiration_time: Timestamp,
  pub proposed_ops: Vec<Operation>,

  /// When set, approvals may only be added before
  /// `expiration_time - review_period_seconds`, and the proposal only
  /// executes on expiry.
  pub review_period_seconds: Option<u32>,
}

impl ProposalCreateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.fee_paying_account
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.fee_paying_account);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.proposed_ops.is_empty() {
      return Err(ValidationError::EmptyProposal);
    }
    for op in &self.proposed_ops {
      op.validate()?;
    }
    Ok(())
  }
}

/// Adds or removes approvals of a pending proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalUpdateOperation {
  pub fee: AssetAmount,
  pub fee_paying_account: AccountId,
  pub proposal: ProposalId,
  pub active_approvals_to_add: BTreeSet<AccountId>,
  pub active_approvals_to_remove: BTreeSet<AccountId>,
  pub owner_approvals_to_add: BTreeSet<AccountId>,
  pub owner_approvals_to_remove: BTreeSet<AccountId>,
  pub key_approvals_to_add: BTreeSet<PublicKey>,
  pub key_approvals_to_remove: BTreeSet<PublicKey>,
}

impl ProposalUpdateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.fee_paying_account
  }

  /// Every approval change must be signed by whoever it speaks for.
  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.fee_paying_account);
    auths.active.extend(&self.active_approvals_to_add);
    auths.active.extend(&self.active_approvals_to_remove);
    auths.owner.extend(&self.owner_approvals_to_add);
    auths.owner.extend(&self.owner_approvals_to_remove);
    auths.other.extend(
      self
        .key_approvals_to_add
        .iter()
        .chain(&self.key_approvals_to_remove)
        .map(|key| Authority::single_key(*key)),
    );
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;

    let changes = self.active_approvals_to_add.len()
      + self.active_approvals_to_remove.len()
      + self.owner_approvals_to_add.len()
      + self.owner_approvals_to_remove.len()
      + self.key_approvals_to_add.len()
      + self.key_approvals_to_remove.len();
    if changes == 0 {
      return Err(ValidationError::NothingToUpdate);
    }

    let overlaps = self
      .active_approvals_to_add
      .intersection(&self.active_approvals_to_remove)
      .next()
      .is_some()
      || self
        .owner_approvals_to_add
        .intersection(&self.owner_approvals_to_remove)
        .next()
        .is_some()
      || self
        .key_approvals_to_add
        .intersection(&self.key_approvals_to_remove)
        .next()
        .is_some();
    if overlaps {
      return Err(ValidationError::ConflictingApprovals);
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDeleteOperation {
  pub fee: AssetAmount,
  pub fee_paying_account: AccountId,
  pub using_owner_authority: bool,
  pub proposal: ProposalId,
}

impl ProposalDeleteOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.fee_paying_account
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    if self.using_owner_authority {
      auths.owner.insert(self.fee_paying_account);
    } else {
      auths.active.insert(self.fee_paying_account);
    }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)
  }
}
