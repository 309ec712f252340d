use std::{
    fmt::{self, Display},
    io,
};

use smartstring::alias::String;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Interface to the key-value store a set mirrors itself into.
///
/// Each key holds one list of strings, replaced wholesale on every write.
/// Methods take `&self`: implementations are cheaply cloneable handles to a
/// shared resource, so several sets (and several copies of one store) can
/// coexist in a process.
pub trait KvStore {
    /// The raw encoded list at `key`, or `None` if the key was never
    /// written (distinct from an empty list).
    fn get_list(&self, key: &str) -> Result<Option<Vec<String>>>;

    /// Atomically replace the full list at `key`.
    fn set_list(&self, key: &str, values: &[String]) -> Result<()>;

    /// Delete `key` entirely, so a later `get_list` returns `None`.
    /// Removing an absent key is not an error.
    fn remove_key(&self, key: &str) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        (**self).get_list(key)
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        (**self).set_list(key, values)
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        (**self).remove_key(key)
    }
}

#[derive(Debug)]
pub enum Error {
    /// Error reading or writing the backing medium.
    Io(io::Error),
    /// The backing file does not hold a valid key-to-list map.
    Format(serde_yaml::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "store IO error: {e}"),
            Error::Format(e) => write!(f, "malformed store file: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Format(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Format(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
