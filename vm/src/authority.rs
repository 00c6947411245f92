//! Recursive, depth bounded evaluation of weighted authorities.
//!
//! An authority is satisfied when the weights of its provable entries
//! reach its threshold. Keys are provable by a signature, accounts by
//! recursively satisfying their own authority. Recursion is bounded by
//! the `max_authority_depth` chain parameter and reaching past it is an
//! error rather than a silent cutoff.

use {
  crate::error::AuthorityError,
  std::collections::{BTreeMap, BTreeSet},
  veil_primitives::{
    AccountId,
    Authority,
    Operation,
    PublicKey,
    RequiredAuthorities,
  },
};

/// Maps accounts to the authority that controls them.
pub trait AuthoritySource {
  fn authority(&self, account: AccountId) -> Option<&Authority>;
}

impl AuthoritySource for BTreeMap<AccountId, Authority> {
  fn authority(&self, account: AccountId) -> Option<&Authority> {
    self.get(&account)
  }
}

/// Union of the authorities required by all operations of a batch.
pub fn required_authorities(ops: &[Operation]) -> RequiredAuthorities {
  let mut required = RequiredAuthorities::default();
  for op in ops {
    op.required_authorities(&mut required);
  }
  required
}

/// Bookkeeping of one authority check: which keys were offered, which
/// of them ended up being needed and which accounts are known to have
/// approved.
struct SignState<'a, S: ?Sized> {
  source: &'a S,
  max_depth: u8,

  /// Keys we are allowed to count as signed, with a flag telling
  /// whether any satisfied authority used them.
  provided: BTreeMap<PublicKey, bool>,

  /// Keys that may be added to `provided` on demand, used when
  /// figuring out which of a wallet's keys should sign.
  available: BTreeSet<PublicKey>,
  approved: BTreeSet<AccountId>,
}

impl<'a, S: AuthoritySource + ?Sized> SignState<'a, S> {
  fn new(
    source: &'a S,
    max_depth: u8,
    provided: impl IntoIterator<Item = PublicKey>,
    available: BTreeSet<PublicKey>,
  ) -> Self {
    Self {
      source,
      max_depth,
      provided: provided.into_iter().map(|k| (k, false)).collect(),
      available,
      approved: BTreeSet::new(),
    }
  }

  fn signed_by(&mut self, key: &PublicKey) -> bool {
    if let Some(used) = self.provided.get_mut(key) {
      *used = true;
      return true;
    }
    if self.available.contains(key) {
      self.provided.insert(*key, true);
      return true;
    }
    false
  }

  fn lookup(&self, account: AccountId) -> Result<&'a Authority, AuthorityError> {
    let source: &'a S = self.source;
    source
      .authority(account)
      .ok_or(AuthorityError::UnknownAccount(account))
  }

  /// Checks whether `authority` is satisfied. `depth` is the number of
  /// account expansions that led here, the authority of a required
  /// account is checked at depth zero.
  fn check_authority(
    &mut self,
    authority: &Authority,
    depth: u8,
  ) -> Result<bool, AuthorityError> {
    let threshold = authority.weight_threshold as u64;
    let mut total = 0u64;
    if total >= threshold {
      return Ok(true);
    }

    for (key, weight) in &authority.key_auths {
      if self.signed_by(key) {
        total += *weight as u64;
        if total >= threshold {
          return Ok(true);
        }
      }
    }

    // a member past the depth limit only fails the check when the
    // remaining members cannot reach the threshold on their own
    let mut too_deep = None;
    for (account, weight) in &authority.account_auths {
      if !self.approved.contains(account) {
        if depth >= self.max_depth {
          too_deep.get_or_insert(AuthorityError::DepthExceeded {
            account: *account,
            max_depth: self.max_depth,
          });
          continue;
        }
        let nested = self.lookup(*account)?;
        match self.check_authority(nested, depth + 1) {
          Ok(true) => {
            self.approved.insert(*account);
          }
          Ok(false) => continue,
          Err(e @ AuthorityError::DepthExceeded { .. }) => {
            too_deep.get_or_insert(e);
            continue;
          }
          Err(e) => return Err(e),
        }
      }

      total += *weight as u64;
      if total >= threshold {
        return Ok(true);
      }
    }

    match too_deep {
      Some(e) => Err(e),
      None => Ok(false),
    }
  }

  fn check_account(&mut self, account: AccountId) -> Result<bool, AuthorityError> {
    if self.approved.contains(&account) {
      return Ok(true);
    }
    let authority = self.lookup(account)?;
    let satisfied = self.check_authority(authority, 0)?;
    if satisfied {
      self.approved.insert(account);
    }
    Ok(satisfied)
  }

  fn unused(&self) -> Vec<PublicKey> {
    self
      .provided
      .iter()
      .filter(|(_, used)| !**used)
      .map(|(key, _)| *key)
      .collect()
  }
}

/// Accounts that already approved through other means than signatures
/// on the checked operations, e.g. approvals collected by a proposal.
#[derive(Debug, Clone, Copy)]
pub struct Approvals<'a> {
  pub active: &'a BTreeSet<AccountId>,
  pub owner: &'a BTreeSet<AccountId>,
}

impl Approvals<'static> {
  pub fn none() -> Self {
    static EMPTY: BTreeSet<AccountId> = BTreeSet::new();
    Self {
      active: &EMPTY,
      owner: &EMPTY,
    }
  }
}

/// Checks that `signers` together with the pre-existing `approvals`
/// satisfy every authority required by `ops`.
///
/// Fails with the first unsatisfied authority, or with
/// [`AuthorityError::IrrelevantSignatures`] when some signer was not
/// needed by any of them.
pub fn verify_authority<S: AuthoritySource + ?Sized>(
  ops: &[Operation],
  signers: &BTreeSet<PublicKey>,
  source: &S,
  max_depth: u8,
  approvals: Approvals<'_>,
) -> Result<(), AuthorityError> {
  let required = required_authorities(ops);
  let mut state =
    SignState::new(source, max_depth, signers.iter().copied(), BTreeSet::new());
  state.approved.extend(approvals.active.iter().copied());
  state.approved.extend(approvals.owner.iter().copied());

  for authority in &required.other {
    if !state.check_authority(authority, 0)? {
      return Err(AuthorityError::MissingOther(authority.clone()));
    }
  }

  for account in &required.active {
    if !state.check_account(*account)? {
      return Err(AuthorityError::MissingActive(*account));
    }
  }

  // active approvals do not stand in for owner approvals
  for account in &required.owner {
    if approvals.owner.contains(account) {
      continue;
    }
    let authority = state.lookup(*account)?;
    if !state.check_authority(authority, 0)? {
      return Err(AuthorityError::MissingOwner(*account));
    }
  }

  let unused = state.unused();
  if !unused.is_empty() {
    return Err(AuthorityError::IrrelevantSignatures(unused));
  }
  Ok(())
}

/// The subset of `available` keys that has to sign `ops`.
///
/// Keys are picked greedily in key order and an authority stops taking
/// keys once its threshold is met. Authorities that cannot be satisfied
/// from `available` contribute the keys that were found anyway.
pub fn get_required_signatures<S: AuthoritySource + ?Sized>(
  ops: &[Operation],
  available: &BTreeSet<PublicKey>,
  source: &S,
  max_depth: u8,
) -> Result<BTreeSet<PublicKey>, AuthorityError> {
  let required = required_authorities(ops);
  let mut state = SignState::new(source, max_depth, [], available.clone());

  for authority in &required.other {
    state.check_authority(authority, 0)?;
  }
  for account in required.active.iter().chain(required.owner.iter()) {
    state.check_account(*account)?;
  }

  Ok(
    state
      .provided
      .into_iter()
      .filter(|(_, used)| *used)
      .map(|(key, _)| key)
      .collect(),
  )
}

/// Every key that could possibly contribute to authorizing `ops`.
///
/// Expansion stops quietly at `max_depth`, keys of accounts nested
/// deeper could never be counted anyway.
pub fn get_potential_signatures<S: AuthoritySource + ?Sized>(
  ops: &[Operation],
  source: &S,
  max_depth: u8,
) -> BTreeSet<PublicKey> {
  fn collect<S: AuthoritySource + ?Sized>(
    authority: &Authority,
    source: &S,
    depth: u8,
    max_depth: u8,
    keys: &mut BTreeSet<PublicKey>,
  ) {
    keys.extend(authority.keys().copied());
    if depth >= max_depth {
      return;
    }
    for account in authority.accounts() {
      if let Some(nested) = source.authority(*account) {
        collect(nested, source, depth + 1, max_depth, keys);
      }
    }
  }

  let required = required_authorities(ops);
  let mut keys = BTreeSet::new();
  for authority in &required.other {
    collect(authority, source, 0, max_depth, &mut keys);
  }
  for account in required.active.iter().chain(required.owner.iter()) {
    if let Some(authority) = source.authority(*account) {
      collect(authority, source, 0, max_depth, &mut keys);
    }
  }
  keys
}

/// Pre-flight check of an authority about to be stored: it may not
/// reference unknown accounts nor have more than `max_membership`
/// entries.
pub fn verify_authority_accounts<S: AuthoritySource + ?Sized>(
  source: &S,
  authority: &Authority,
  max_membership: u16,
) -> Result<(), AuthorityError> {
  if authority.num_auths() > max_membership as usize {
    return Err(AuthorityError::TooManyMembers {
      found: authority.num_auths(),
      max: max_membership,
    });
  }
  for account in authority.accounts() {
    if source.authority(*account).is_none() {
      return Err(AuthorityError::UnknownAccount(*account));
    }
  }
  Ok(())
}
