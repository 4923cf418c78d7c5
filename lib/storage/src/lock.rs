use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use trimsight_core::{Error, Result};

/// Exclusive advisory lock on a sibling `.lock` file.
/// Serializes cache writers across processes; released on drop.
pub struct CacheLock {
    _guard: Flock<File>,
    path: PathBuf,
}

impl CacheLock {
    /// Block until the lock is held
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        let guard = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            Error::Persistence(format!("failed to lock {}: {}", path.display(), errno))
        })?;

        tracing::trace!(path = %path.display(), "cache lock acquired");
        Ok(Self { _guard: guard, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.lock");

        let first = CacheLock::acquire(&path).unwrap();
        assert_eq!(first.path(), path.as_path());
        drop(first);

        // A second exclusive lock only succeeds once the first is gone.
        let second = CacheLock::acquire(&path).unwrap();
        assert!(second.path().exists());
    }
}
