//! In-memory object store with nested undo sessions.
//!
//! Records live in typed [`Table`]s. Every mutation made while a
//! session is open is journaled in the innermost frame so that it can
//! be reverted with [`Undoable::undo`] or folded into the enclosing
//! frame with [`Undoable::commit`]. Outside of any session nothing is
//! journaled and changes are permanent.

use {
  std::{collections::BTreeMap, fmt::Debug},
  thiserror::Error,
  veil_primitives::ObjectId,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
  #[error("object {0} does not exist")]
  NotFound(String),

  #[error("unique key {0} is already taken")]
  DuplicateKey(String),
}

/// A record kind stored in a [`Table`].
pub trait Record: Clone + Debug {
  type Id: ObjectId + Debug;

  /// Unique secondary key, `()` for records without one.
  type Key: Ord + Clone + Debug;

  fn id(&self) -> Self::Id;

  /// Value of the unique secondary key, if this kind has one.
  fn key(&self) -> Option<Self::Key> {
    None
  }
}

/// Something that takes part in undo sessions.
pub trait Undoable {
  fn start_undo(&mut self);
  fn undo(&mut self);
  fn commit(&mut self);
}

#[derive(Debug, Clone)]
enum Change<T: Record> {
  Created(T::Id),
  Modified(T),
  Removed(T),
}

#[derive(Debug, Clone)]
struct Frame<T: Record> {
  next_instance: u64,
  changes: Vec<Change<T>>,
}

#[derive(Debug, Clone)]
pub struct Table<T: Record> {
  records: BTreeMap<T::Id, T>,
  by_key: BTreeMap<T::Key, T::Id>,
  next_instance: u64,
  frames: Vec<Frame<T>>,
}

impl<T: Record> Default for Table<T> {
  fn default() -> Self {
    Self {
      records: BTreeMap::new(),
      by_key: BTreeMap::new(),
      next_instance: 0,
      frames: vec![],
    }
  }
}

impl<T: Record> Table<T> {
  pub fn find(&self, id: T::Id) -> Option<&T> {
    self.records.get(&id)
  }

  pub fn get(&self, id: T::Id) -> Result<&T, StoreError> {
    self
      .records
      .get(&id)
      .ok_or_else(|| StoreError::NotFound(format!("{id:?}")))
  }

  pub fn find_by_key(&self, key: &T::Key) -> Option<&T> {
    self.by_key.get(key).and_then(|id| self.records.get(id))
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.records.values()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Id the next created record will get.
  pub fn next_id(&self) -> T::Id {
    T::Id::from_instance(self.next_instance)
  }

  /// Creates a record from an initializer that receives the new id.
  pub fn create(
    &mut self,
    init: impl FnOnce(T::Id) -> T,
  ) -> Result<&T, StoreError> {
    let id = self.next_id();
    let record = init(id);
    if let Some(key) = record.key() {
      if self.by_key.contains_key(&key) {
        return Err(StoreError::DuplicateKey(format!("{key:?}")));
      }
      self.by_key.insert(key, id);
    }

    self.next_instance += 1;
    self.journal(Change::Created(id));
    Ok(self.records.entry(id).or_insert(record))
  }

  /// Runs `mutate` on the record with the given id.
  ///
  /// If the mutation changes the unique key to one that is taken, the
  /// record is left untouched and an error is returned.
  pub fn modify<R>(
    &mut self,
    id: T::Id,
    mutate: impl FnOnce(&mut T) -> R,
  ) -> Result<R, StoreError> {
    let record = self
      .records
      .get_mut(&id)
      .ok_or_else(|| StoreError::NotFound(format!("{id:?}")))?;

    let old = record.clone();
    let output = mutate(record);
    let (old_key, new_key) = (old.key(), record.key());

    if old_key != new_key {
      if let Some(key) = &new_key {
        if self.by_key.contains_key(key) {
          *record = old;
          return Err(StoreError::DuplicateKey(format!("{key:?}")));
        }
      }
      if let Some(key) = &old_key {
        self.by_key.remove(key);
      }
      if let Some(key) = new_key {
        self.by_key.insert(key, id);
      }
    }

    self.journal(Change::Modified(old));
    Ok(output)
  }

  pub fn remove(&mut self, id: T::Id) -> Result<T, StoreError> {
    let record = self
      .records
      .remove(&id)
      .ok_or_else(|| StoreError::NotFound(format!("{id:?}")))?;
    if let Some(key) = record.key() {
      self.by_key.remove(&key);
    }
    self.journal(Change::Removed(record.clone()));
    Ok(record)
  }

  fn journal(&mut self, change: Change<T>) {
    if let Some(frame) = self.frames.last_mut() {
      frame.changes.push(change);
    }
  }

  fn unindex(&mut self, id: T::Id) -> Option<T> {
    let record = self.records.remove(&id)?;
    if let Some(key) = record.key() {
      self.by_key.remove(&key);
    }
    Some(record)
  }

  fn reindex(&mut self, record: T) {
    if let Some(key) = record.key() {
      self.by_key.insert(key, record.id());
    }
    self.records.insert(record.id(), record);
  }
}

impl<T: Record> Undoable for Table<T> {
  fn start_undo(&mut self) {
    self.frames.push(Frame {
      next_instance: self.next_instance,
      changes: vec![],
    });
  }

  fn undo(&mut self) {
    let frame = match self.frames.pop() {
      Some(frame) => frame,
      None => return,
    };

    for change in frame.changes.into_iter().rev() {
      match change {
        Change::Created(id) => {
          self.unindex(id);
        }
        Change::Modified(old) => {
          self.unindex(old.id());
          self.reindex(old);
        }
        Change::Removed(old) => self.reindex(old),
      }
    }
    self.next_instance = frame.next_instance;
  }

  fn commit(&mut self) {
    if let Some(frame) = self.frames.pop() {
      if let Some(parent) = self.frames.last_mut() {
        parent.changes.extend(frame.changes);
      }
    }
  }
}

/// A single always-present value taking part in undo sessions.
#[derive(Debug, Clone, Default)]
pub struct Singleton<T: Clone> {
  value: T,

  /// Per frame, the value as it was when the frame first modified it.
  frames: Vec<Option<T>>,
}

impl<T: Clone> Singleton<T> {
  pub fn new(value: T) -> Self {
    Self {
      value,
      frames: vec![],
    }
  }

  pub fn get(&self) -> &T {
    &self.value
  }

  pub fn modify<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> R {
    if let Some(saved @ None) = self.frames.last_mut() {
      *saved = Some(self.value.clone());
    }
    mutate(&mut self.value)
  }
}

impl<T: Clone> Undoable for Singleton<T> {
  fn start_undo(&mut self) {
    self.frames.push(None);
  }

  fn undo(&mut self) {
    if let Some(Some(saved)) = self.frames.pop() {
      self.value = saved;
    }
  }

  fn commit(&mut self) {
    if let Some(Some(saved)) = self.frames.pop() {
      if let Some(parent @ None) = self.frames.last_mut() {
        *parent = Some(saved);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, veil_primitives::AccountId};

  #[derive(Debug, Clone, PartialEq)]
  struct Named {
    id: AccountId,
    name: String,
  }

  impl Record for Named {
    type Id = AccountId;
    type Key = String;

    fn id(&self) -> AccountId {
      self.id
    }

    fn key(&self) -> Option<String> {
      Some(self.name.clone())
    }
  }

  fn named(name: &str) -> impl FnOnce(AccountId) -> Named + '_ {
    move |id| Named {
      id,
      name: name.into(),
    }
  }

  #[test]
  fn unique_keys_are_enforced() -> anyhow::Result<()> {
    let mut table = Table::<Named>::default();
    let alice = table.create(named("alice"))?.id;
    table.create(named("bob"))?;

    assert!(matches!(
      table.create(named("alice")),
      Err(StoreError::DuplicateKey(_))
    ));
    assert!(table
      .modify(alice, |r| r.name = "bob".into())
      .is_err());
    assert_eq!(table.get(alice)?.name, "alice");
    assert_eq!(table.find_by_key(&"bob".into()).map(|r| r.id), Some(AccountId(1)));
    Ok(())
  }

  #[test]
  fn undo_reverts_everything_in_the_frame() -> anyhow::Result<()> {
    let mut table = Table::<Named>::default();
    let alice = table.create(named("alice"))?.id;

    table.start_undo();
    table.modify(alice, |r| r.name = "carol".into())?;
    table.create(named("dave"))?;
    table.remove(alice)?;
    table.undo();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get(alice)?.name, "alice");
    assert!(table.find_by_key(&"carol".into()).is_none());
    assert!(table.find_by_key(&"dave".into()).is_none());
    assert_eq!(table.next_id(), AccountId(1));
    Ok(())
  }

  #[test]
  fn nested_commit_folds_into_parent() -> anyhow::Result<()> {
    let mut table = Table::<Named>::default();

    table.start_undo();
    table.create(named("alice"))?;
    table.start_undo();
    table.create(named("bob"))?;
    table.commit();
    assert_eq!(table.len(), 2);

    // undoing the outer frame also drops what the inner one committed
    table.undo();
    assert!(table.is_empty());
    Ok(())
  }

  #[test]
  fn singleton_restores_first_snapshot() {
    let mut value = Singleton::new(1);
    value.start_undo();
    value.modify(|v| *v = 2);
    value.start_undo();
    value.modify(|v| *v = 3);
    value.commit();
    assert_eq!(*value.get(), 3);
    value.undo();
    assert_eq!(*value.get(), 1);
  }
}
