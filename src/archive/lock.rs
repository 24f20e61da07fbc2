use crate::error::{ArchiveError, ArchiveResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held by the single process allowed to write the
/// archive. Released on drop.
#[derive(Debug)]
pub struct ArchiveLock {
    file: File,
    path: PathBuf,
}

impl ArchiveLock {
    pub fn acquire(lock_path: &Path) -> ArchiveResult<Self> {
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| ArchiveError::io(parent, err))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock_path)
            .map_err(|err| ArchiveError::io(lock_path, err))?;

        if FileExt::try_lock_exclusive(&file).is_err() {
            return Err(ArchiveError::Locked(lock_path.to_path_buf()));
        }

        file.set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .map_err(|err| ArchiveError::io(lock_path, err))?;

        tracing::debug!(path = %lock_path.display(), "archive write lock acquired");
        Ok(Self {
            file,
            path: lock_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
