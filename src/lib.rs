//! In-memory sets mirrored to a persistent key-value store, for
//! "favorites" / "tags" / "visited ids" collections that must survive
//! process restarts without hand-rolled serialization.

use smartstring::alias::String;

pub mod codec;
pub mod set;
pub mod store;

pub use codec::{Codec, DecodeError, StringCodec, YamlCodec};
pub use set::PersistentSet;
pub use store::{FileStore, KvStore, MemoryStore};

/// A [`PersistentSet`] of plain strings, stored as-is.
pub type StringSet<S> = PersistentSet<String, StringCodec, S>;

/// Opens the string set stored at `key`.
///
/// Purely a pre-configured [`PersistentSet::load`] with the identity codec;
/// no behavior of its own.
pub fn string_set<S: KvStore>(store: S, key: impl Into<String>) -> set::Result<StringSet<S>> {
    PersistentSet::load(store, key, StringCodec)
}

/// Opens the string set stored at `key`, seeding it from `seed` if the key
/// has never been written.
pub fn string_set_with_seed<S, I, V>(
    store: S,
    key: impl Into<String>,
    seed: I,
) -> set::Result<StringSet<S>>
where
    S: KvStore,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    PersistentSet::load_or_seed(store, key, StringCodec, seed.into_iter().map(Into::into))
}
