//! Persistence of the note store as a single JSON file.

use crate::store::NoteStore;
use anyhow::{Context, Result};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-backed storage for the notes collection.
///
/// Encrypted notes are stored exactly as they sit in memory: their
/// title and content fields hold envelope strings.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the note store, or an empty one if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<NoteStore> {
        if !self.exists() {
            tracing::debug!(path = %self.path.display(), "no notes file, starting empty");
            return Ok(NoteStore::new());
        }

        let data = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let store: NoteStore = serde_json::from_slice(&data)
            .with_context(|| format!("notes file {} is corrupted", self.path.display()))?;

        tracing::debug!(notes = store.len(), "notes loaded");
        Ok(store)
    }

    /// Serializes and writes the note store.
    pub fn save(&self, store: &NoteStore) -> Result<()> {
        let data = serde_json::to_vec_pretty(store).context("failed to serialize notes")?;
        self.write_atomic(&data)?;
        tracing::debug!(notes = store.len(), "notes saved");
        Ok(())
    }

    /// Replaces the file contents so that a crash leaves either the old
    /// or the new file, never a partial one.
    ///
    /// Writes a uniquely named sibling temp file, fsyncs it, renames it over
    /// the target, then fsyncs the directory. Parent directories are created.
    fn write_atomic(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .context("failed to create temporary file")?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Some(parent) = self.path.parent() {
            File::open(parent)?.sync_all()?;
        }

        Ok(())
    }

    /// `<file>.tmp.<16 hex chars>` next to the target.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf).map_err(|_| anyhow::anyhow!("OS random generator unavailable"))?;

        let suffix: String = buf.iter().map(|b| format!("{b:02x}")).collect();
        let file_name = self
            .path
            .file_name()
            .context("notes path has no file name")?
            .to_string_lossy();

        Ok(self.path.with_file_name(format!("{file_name}.tmp.{suffix}")))
    }

    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY: both buffers are NUL-terminated UTF-16 and outlive the call.
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            return Err(std::io::Error::last_os_error()).context("atomic replace failed");
        }

        Ok(())
    }

    // rename() is atomic within one filesystem
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty_store() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));

        assert!(!storage.exists());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_notes() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));

        let mut store = NoteStore::new();
        let id = store.create("Shopping List", "<p>milk</p>", vec!["home".into()]).id();
        storage.save(&store).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.get(id), store.get(id));
    }

    #[test]
    fn encrypted_notes_persist_as_envelopes() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));

        let mut store = NoteStore::new();
        let id = store.create("Diary", "<p>dear diary</p>", vec![]).id();
        store.encrypt(id, "pw").unwrap();
        storage.save(&store).unwrap();

        let raw = fs::read_to_string(storage.path()).unwrap();
        assert!(!raw.contains("dear diary"));
        assert!(raw.contains("\"isEncrypted\": true"));

        let mut loaded = storage.load().unwrap();
        loaded.decrypt(id, "pw").unwrap();
        assert_eq!(loaded.get(id).unwrap().content(), "<p>dear diary</p>");
    }

    #[test]
    fn corrupted_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(Storage::new(path).load().is_err());
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));

        let mut store = NoteStore::new();
        storage.save(&store).unwrap();
        store.create("later", "", vec![]);
        storage.save(&store).unwrap();

        assert_eq!(storage.load().unwrap().len(), 1);
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));
        storage.save(&NoteStore::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "notes.json");
    }

    #[test]
    fn tmp_names_are_unique_siblings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let storage = Storage::new(path.clone());

        let a = storage.random_tmp_path().unwrap();
        let b = storage.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_ne!(a, path);
        assert_eq!(a.parent(), path.parent());
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("notes.json");

        Storage::new(nested.clone()).save(&NoteStore::new()).unwrap();

        assert!(nested.exists());
    }
}
