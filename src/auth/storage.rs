//! Key/value storage backends for session tokens

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Named string slots, the only persistence the session needs.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Set several slots as one update.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// In-process storage, lost on exit.
#[allow(dead_code)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

#[allow(dead_code)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// TOML-backed storage in the user's data directory.
///
/// Each update writes a temporary file and renames it over the old one,
/// so readers see either the previous table or the new one.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).context("Failed to read session file")?;
            toml::from_str(&content).context("Failed to parse session file")?
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Session storage at {}", path.display());
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create session directory")?;
        }

        let content =
            toml::to_string_pretty(&self.entries).context("Failed to serialize session")?;

        let tmp = self.path.with_extension("toml.tmp");
        let _ = fs::remove_file(&tmp);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        // Session file holds tokens, never make it readable by others
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&tmp)
            .context("Failed to create session file")?;
        file.write_all(content.as_bytes())
            .context("Failed to write session file")?;
        file.sync_all().context("Failed to flush session file")?;
        fs::rename(&tmp, &self.path).context("Failed to replace session file")?;

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("commandes-cli-test-{}-{}", std::process::id(), name))
            .join("session.toml")
    }

    #[test]
    fn test_memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("accessToken"), None);

        storage.set("accessToken", "abc").unwrap();
        assert_eq!(storage.get("accessToken").as_deref(), Some("abc"));

        storage.set("accessToken", "def").unwrap();
        assert_eq!(storage.get("accessToken").as_deref(), Some("def"));

        storage.remove("accessToken").unwrap();
        assert_eq!(storage.get("accessToken"), None);
    }

    #[test]
    fn test_file_storage_persists_across_reopen() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        {
            let mut storage = FileStorage::open(path.clone()).unwrap();
            storage.set("accessToken", "a.b.c").unwrap();
            storage.set("refreshToken", "r").unwrap();
        }

        let mut reopened = FileStorage::open(path.clone()).unwrap();
        assert_eq!(reopened.get("accessToken").as_deref(), Some("a.b.c"));
        assert_eq!(reopened.get("refreshToken").as_deref(), Some("r"));

        reopened.remove("accessToken").unwrap();
        let again = FileStorage::open(path.clone()).unwrap();
        assert_eq!(again.get("accessToken"), None);
        assert_eq!(again.get("refreshToken").as_deref(), Some("r"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_storage_set_all_in_one_write() {
        let path = temp_path("batch");
        let _ = fs::remove_file(&path);

        let mut storage = FileStorage::open(path.clone()).unwrap();
        storage
            .set_all(&[("accessToken", "a.b.c"), ("refreshToken", "r")])
            .unwrap();

        let reopened = FileStorage::open(path.clone()).unwrap();
        assert_eq!(reopened.get("accessToken").as_deref(), Some("a.b.c"));
        assert_eq!(reopened.get("refreshToken").as_deref(), Some("r"));
        assert!(!path.with_extension("toml.tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("perms");
        let mut storage = FileStorage::open(path.clone()).unwrap();
        storage.set("accessToken", "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
