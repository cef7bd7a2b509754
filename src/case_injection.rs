//! # Case injection
//!
//! A [`CaseInjectionStore`] keeps the best permutation of every finished run
//! so later runs on instances of the same size can start from them. The
//! store is an explicit handle: it is opened once, passed to each run that
//! should use it, and closed when the process is done with it.
//!
//! Records are stored back to back, each one permutation of
//! `permutation_len` indices written as little-endian `u64`s. Reading starts
//! from the beginning of the file every time; running out of data (including
//! a truncated trailing record) simply ends the read.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::case_injection::CaseInjectionStore;
//!
//! let mut store = CaseInjectionStore::temporary(4).unwrap();
//! assert!(store.load(10).unwrap().is_empty());
//!
//! store.append(&[3, 1, 0, 2]).unwrap();
//! store.append(&[0, 1, 2, 3]).unwrap();
//! assert_eq!(store.load(10).unwrap(), vec![vec![3, 1, 0, 2], vec![0, 1, 2, 3]]);
//! assert_eq!(store.load(1).unwrap().len(), 1);
//!
//! store.close().unwrap();
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::error::{GeneticError, Result, ResultExt};

const INDEX_BYTES: usize = std::mem::size_of::<u64>();

static TEMPORARY_STORES: AtomicUsize = AtomicUsize::new(0);

/// File-backed store of warm-start permutations of one fixed length.
#[derive(Debug)]
pub struct CaseInjectionStore {
    file: File,
    path: PathBuf,
    permutation_len: usize,
    temporary: bool,
}

impl CaseInjectionStore {
    /// Creates (or truncates) the store at `path`.
    pub fn create<P: AsRef<Path>>(path: P, permutation_len: usize) -> Result<Self> {
        Self::open_with(path.as_ref(), permutation_len, true, false)
    }

    /// Opens the store at `path`, creating it if missing and keeping any
    /// records already there.
    pub fn open<P: AsRef<Path>>(path: P, permutation_len: usize) -> Result<Self> {
        Self::open_with(path.as_ref(), permutation_len, false, false)
    }

    /// Creates a store in the system temp directory that is deleted when the
    /// store is closed or dropped.
    pub fn temporary(permutation_len: usize) -> Result<Self> {
        let sequence = TEMPORARY_STORES.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "binpack-ga-{}-{}.cases",
            std::process::id(),
            sequence
        ));
        Self::open_with(&path, permutation_len, true, true)
    }

    fn open_with(path: &Path, permutation_len: usize, truncate: bool, temporary: bool) -> Result<Self> {
        if permutation_len == 0 {
            return Err(GeneticError::Configuration(
                "Case injection needs a non-empty permutation length".to_string(),
            ));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(truncate)
            .open(path)
            .context(format!("Failed to open case injection store {}", path.display()))?;
        debug!(path = %path.display(), permutation_len, "opened case injection store");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            permutation_len,
            temporary,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn permutation_len(&self) -> usize {
        self.permutation_len
    }

    /// Reads up to `max` stored permutations, oldest first.
    ///
    /// # Errors
    ///
    /// Any I/O error other than reaching the end of the data.
    pub fn load(&mut self, max: usize) -> Result<Vec<Vec<usize>>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut buffer = vec![0u8; self.permutation_len * INDEX_BYTES];
        let mut loaded = Vec::new();
        while loaded.len() < max {
            match self.file.read_exact(&mut buffer) {
                Ok(()) => loaded.push(decode(&buffer)?),
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => return Err(err.into()),
            }
        }
        debug!(loaded = loaded.len(), "loaded warm-start permutations");
        Ok(loaded)
    }

    /// Appends one permutation at the end of the store.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the permutation length does not match the store.
    /// - Any I/O error while writing.
    pub fn append(&mut self, permutation: &[usize]) -> Result<()> {
        if permutation.len() != self.permutation_len {
            return Err(GeneticError::Configuration(format!(
                "Case injection store holds permutations of length {}, got {}",
                self.permutation_len,
                permutation.len()
            )));
        }
        let mut buffer = Vec::with_capacity(permutation.len() * INDEX_BYTES);
        for &index in permutation {
            buffer.extend_from_slice(&(index as u64).to_le_bytes());
        }
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&buffer)?;
        self.file.flush()?;
        Ok(())
    }

    /// Flushes the store and, for a temporary store, deletes its file.
    pub fn close(mut self) -> Result<()> {
        self.file.sync_all()?;
        if self.temporary {
            self.temporary = false;
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for CaseInjectionStore {
    fn drop(&mut self) {
        if self.temporary {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), %err, "could not remove temporary case injection store");
            }
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<usize>> {
    bytes
        .chunks_exact(INDEX_BYTES)
        .map(|chunk| {
            let mut raw = [0u8; INDEX_BYTES];
            raw.copy_from_slice(chunk);
            usize::try_from(u64::from_le_bytes(raw)).map_err(|_| {
                GeneticError::InvalidNumericValue("stored index does not fit in usize".to_string())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_is_rejected() {
        assert!(matches!(
            CaseInjectionStore::temporary(0),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_open_failure_names_the_path() {
        let path = std::env::temp_dir()
            .join(format!("binpack-ga-missing-{}", std::process::id()))
            .join("store.cases");
        match CaseInjectionStore::open(&path, 3) {
            Err(GeneticError::Other(message)) => {
                assert!(message.starts_with("Failed to open case injection store"));
                assert!(message.contains("store.cases"));
            }
            other => panic!("expected an open failure, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_length_append_is_rejected() {
        let mut store = CaseInjectionStore::temporary(3).unwrap();
        assert!(matches!(
            store.append(&[0, 1]),
            Err(GeneticError::Configuration(_))
        ));
        assert!(store.load(5).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_record_ends_load() {
        let mut store = CaseInjectionStore::temporary(2).unwrap();
        store.append(&[1, 0]).unwrap();
        store.file.seek(SeekFrom::End(0)).unwrap();
        store.file.write_all(&[7u8; 5]).unwrap();
        assert_eq!(store.load(10).unwrap(), vec![vec![1, 0]]);
    }

    #[test]
    fn test_temporary_file_is_removed_on_drop() {
        let store = CaseInjectionStore::temporary(2).unwrap();
        let path = store.path().to_path_buf();
        assert!(path.exists());
        drop(store);
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes_temporary_file() {
        let store = CaseInjectionStore::temporary(2).unwrap();
        let path = store.path().to_path_buf();
        store.close().unwrap();
        assert!(!path.exists());
    }
}
