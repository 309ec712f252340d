use std::{
    collections::HashMap,
    fs::{self, File},
    io::ErrorKind,
    path::PathBuf,
};

use smartstring::alias::String;

use super::{KvStore, Result};

/// Store keeping every list in one YAML file: a map from key to string
/// list.
///
/// Each write re-reads the file, applies the change, and replaces the file
/// through a rename of a freshly written sibling, so readers never observe
/// a half-written map. A missing file reads as "no keys written yet".
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<HashMap<String, Vec<String>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_yaml::from_reader(file)?)
    }

    fn write_entries(&self, entries: &HashMap<String, Vec<String>>) -> Result<()> {
        // Appended, not swapped in for the extension: sibling stores like
        // `sets.yaml` and `sets.json` must not share one temp path.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let file = File::create(&tmp)?;
        serde_yaml::to_writer(file, entries)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.into(), values.to_vec());
        self.write_entries(&entries)
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().copied().map(String::from).collect()
    }

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("sets.yaml"))
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get_list("anything").unwrap(), None);
    }

    #[test]
    fn lists_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_in(&dir);
            store.set_list("tags", &list(&["rust", "sets"])).unwrap();
            store.set_list("seen", &list(&["42"])).unwrap();
        }

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.get_list("tags").unwrap(),
            Some(list(&["rust", "sets"]))
        );
        assert_eq!(reopened.get_list("seen").unwrap(), Some(list(&["42"])));
    }

    #[test]
    fn set_list_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set_list("tags", &list(&["a", "b"])).unwrap();
        store.set_list("tags", &list(&["c"])).unwrap();
        assert_eq!(store.get_list("tags").unwrap(), Some(list(&["c"])));
    }

    #[test]
    fn remove_key_leaves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set_list("keep", &list(&["x"])).unwrap();
        store.set_list("drop", &list(&["y"])).unwrap();

        store.remove_key("drop").unwrap();
        assert_eq!(store.get_list("drop").unwrap(), None);
        assert_eq!(store.get_list("keep").unwrap(), Some(list(&["x"])));

        // Removing an absent key must not rewrite the file or error.
        store.remove_key("drop").unwrap();
    }

    #[test]
    fn write_leaves_sibling_tmp_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A neighbor named like the store path with its extension swapped
        // for `tmp` must survive a write.
        let neighbor = dir.path().join("sets.tmp");
        std::fs::write(&neighbor, "precious").unwrap();

        let store = store_in(&dir);
        store.set_list("tags", &list(&["a"])).unwrap();

        assert_eq!(std::fs::read_to_string(&neighbor).unwrap(), "precious");
        assert_eq!(store.get_list("tags").unwrap(), Some(list(&["a"])));
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sets.yaml");
        std::fs::write(&path, "- this is a list, not a map\n").unwrap();

        let store = FileStore::new(path);
        assert!(store.get_list("tags").is_err());
    }
}
