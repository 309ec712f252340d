use std::{
    collections::HashSet,
    fmt::{self, Display},
    hash::Hash,
};

use smartstring::alias::String;

use crate::{
    codec::{Codec, DecodeError},
    store::{self, KvStore},
};

/// An in-memory set mirrored to one key of a [`KvStore`].
///
/// The set loads its contents from the store once, at construction, and
/// writes the complete encoded collection back after every mutation that
/// changes its size. While the instance is live, `members` is the single
/// source of truth; the store is a serialized mirror and is only read again
/// through [`to_set_reloaded`](Self::to_set_reloaded).
///
/// Each instance is expected to be the sole modifier of its key. Two live
/// instances mutating the same key silently diverge and the last completed
/// write wins; no merge or conflict detection is attempted.
#[derive(Debug)]
pub struct PersistentSet<T, C, S> {
    key: String,
    members: HashSet<T>,
    codec: C,
    store: S,
}

impl<T, C, S> PersistentSet<T, C, S>
where
    T: Eq + Hash,
    C: Codec<Value = T>,
    S: KvStore,
{
    /// Loads the set stored at `key`, or starts empty if the key was never
    /// written. An empty stored list loads as an empty (but present) set.
    ///
    /// Fails if the store cannot be read or if any stored entry does not
    /// decode; a corrupt entry is never skipped.
    pub fn load(store: S, key: impl Into<String>, codec: C) -> Result<Self> {
        let key = key.into();
        let members = match store.get_list(&key)? {
            Some(raw) => Self::decode_all(&codec, &raw)?,
            None => HashSet::new(),
        };
        log::debug!("loaded {} members from key {:?}", members.len(), key);
        Ok(Self {
            key,
            members,
            codec,
            store,
        })
    }

    /// Like [`load`](Self::load), but if the key was never written the set
    /// starts from `seed` and the seeded contents are written to the store
    /// before this returns. A present key (even holding an empty list) wins
    /// over the seed.
    pub fn load_or_seed(
        store: S,
        key: impl Into<String>,
        codec: C,
        seed: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        let key = key.into();
        match store.get_list(&key)? {
            Some(raw) => {
                let members = Self::decode_all(&codec, &raw)?;
                log::debug!(
                    "key {:?} already written, ignoring seed ({} members)",
                    key,
                    members.len()
                );
                Ok(Self {
                    key,
                    members,
                    codec,
                    store,
                })
            }
            None => {
                let set = Self {
                    key,
                    members: seed.into_iter().collect(),
                    codec,
                    store,
                };
                // Seeding must be durable before the constructor returns.
                set.persist()?;
                log::debug!("seeded key {:?} with {} members", set.key, set.members.len());
                Ok(set)
            }
        }
    }

    /// Inserts `value` if no equal member is present, returning whether it
    /// was newly inserted. A real insert re-persists the entire set before
    /// returning; an idempotent re-insert never touches the store.
    pub fn add(&mut self, value: T) -> Result<bool> {
        let inserted = self.members.insert(value);
        if inserted {
            self.persist()?;
        }
        Ok(inserted)
    }

    /// Inserts every value, persisting at most once: the store is written
    /// exactly once if the batch grew the set, and not at all otherwise.
    pub fn add_all(&mut self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let before = self.members.len();
        self.members.extend(values);
        if self.members.len() != before {
            self.persist()?;
        }
        Ok(())
    }

    /// Removes the member equal to `value`, returning whether anything was
    /// removed. Removing an absent value is a no-op, not an error, and
    /// never touches the store.
    pub fn remove(&mut self, value: &T) -> Result<bool> {
        let removed = self.members.remove(value);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Removes every member satisfying `predicate`, persisting once if the
    /// set shrank. The predicate is called once per member and must not
    /// itself touch this set.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Result<()> {
        let before = self.members.len();
        self.members.retain(|value| !predicate(value));
        if self.members.len() < before {
            self.persist()?;
        }
        Ok(())
    }

    /// Empties the set and deletes its key from the store entirely, so a
    /// later load finds the key absent rather than present-but-empty.
    pub fn clear(&mut self) -> Result<()> {
        self.members.clear();
        self.store.remove_key(&self.key)?;
        log::debug!("cleared key {:?}", self.key);
        Ok(())
    }

    /// Whether a member equal to `value` is present. Purely in-memory.
    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    /// The stored member equal to `value`, if any.
    ///
    /// This returns the originally inserted instance, not `value` itself,
    /// which matters whenever `T`'s equality is narrower than its contents
    /// (say, equal by an id field only): the caller gets the canonical
    /// stored object back.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.members.get(value)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Borrowing iterator over the members, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.members.iter()
    }

    /// The store key this set mirrors itself into.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A defensive copy of the members; mutating it affects neither this
    /// set nor the store.
    pub fn to_set(&self) -> HashSet<T>
    where
        T: Clone,
    {
        self.members.clone()
    }

    /// A one-shot read straight from the store, bypassing the in-memory
    /// members and leaving them untouched. Useful when another instance may
    /// have written the same key and the caller wants a fresher (not
    /// merged) view. An absent key yields an empty set.
    pub fn to_set_reloaded(&self) -> Result<HashSet<T>> {
        match self.store.get_list(&self.key)? {
            Some(raw) => Self::decode_all(&self.codec, &raw),
            None => Ok(HashSet::new()),
        }
    }

    fn decode_all(codec: &C, raw: &[String]) -> Result<HashSet<T>> {
        raw.iter()
            .map(|entry| codec.decode(entry).map_err(Error::from))
            .collect()
    }

    /// Writes the complete encoded member set to the store. Always a full
    /// overwrite, never a diff. On failure the in-memory members have
    /// already been updated; the caller sees the error and may retry the
    /// mutation, which is idempotent.
    fn persist(&self) -> Result<()> {
        let encoded: Vec<String> = self.members.iter().map(|v| self.codec.encode(v)).collect();
        self.store.set_list(&self.key, &encoded)?;
        log::trace!("persisted {} members to key {:?}", encoded.len(), self.key);
        Ok(())
    }
}

#[derive(Debug)]
pub enum Error {
    /// A stored entry could not be decoded during load or reload.
    Decode(DecodeError),
    /// The underlying store failed to read or write.
    Store(store::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "{e}"),
            Error::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            Error::Store(e) => Some(e),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<store::Error> for Error {
    fn from(value: store::Error) -> Self {
        Self::Store(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
