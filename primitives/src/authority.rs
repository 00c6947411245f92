use {
  crate::{AccountId, PublicKey},
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
};

pub type Weight = u16;

/// Weighted threshold over signing keys and other accounts.
///
/// An authority is satisfied when the summed weight of its entries that
/// can be proven (keys by signature, accounts recursively by their own
/// authority) reaches `weight_threshold`. Account entries make the
/// authority graph recursive; traversal depth is bounded by the chain
/// parameter `max_authority_depth`.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Authority {
  pub weight_threshold: u32,
  pub account_auths: BTreeMap<AccountId, Weight>,
  pub key_auths: BTreeMap<PublicKey, Weight>,
}

impl Authority {
  pub fn new(
    weight_threshold: u32,
    keys: impl IntoIterator<Item = (PublicKey, Weight)>,
    accounts: impl IntoIterator<Item = (AccountId, Weight)>,
  ) -> Self {
    Self {
      weight_threshold,
      key_auths: keys.into_iter().collect(),
      account_auths: accounts.into_iter().collect(),
    }
  }

  /// Threshold 1 authority satisfied by a single key.
  pub fn single_key(key: PublicKey) -> Self {
    Self::new(1, [(key, 1)], [])
  }

  /// Threshold 1 authority satisfied by a single account.
  pub fn single_account(account: AccountId) -> Self {
    Self::new(1, [], [(account, 1)])
  }

  /// Number of distinct entries, bounded by
  /// `maximum_authority_membership`.
  pub fn num_auths(&self) -> usize {
    self.account_auths.len() + self.key_auths.len()
  }

  pub fn keys(&self) -> impl Iterator<Item = &PublicKey> {
    self.key_auths.keys()
  }

  pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
    self.account_auths.keys()
  }

  /// The key whose textual form names an account owned by this
  /// authority.
  pub fn first_key(&self) -> Option<&PublicKey> {
    self.key_auths.keys().next()
  }

  /// True when even all entries together cannot reach the threshold.
  pub fn is_impossible(&self) -> bool {
    let total: u64 = self
      .key_auths
      .values()
      .chain(self.account_auths.values())
      .map(|w| *w as u64)
      .sum();
    total < self.weight_threshold as u64
  }
}
