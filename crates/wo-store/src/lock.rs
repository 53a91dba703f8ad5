//! Exclusive advisory lock over a snapshot file.
//!
//! Every `wo` invocation that reads a snapshot and may write it back holds
//! this lock from load to save, so overlapping invocations run one after
//! the other instead of both issuing from the same counters. The lock sits
//! on a sibling `<data_file>.lock` file, which survives the atomic rename
//! of the snapshot itself. The kernel drops it when the holder exits, so a
//! crashed invocation never leaves a stale lock behind.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::StoreError;

/// Delay between attempts while another holder has the lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Held lock. Released on drop.
#[derive(Debug)]
pub struct SnapshotLock {
    path: PathBuf,
    _file: File,
}

impl SnapshotLock {
    /// Lock the snapshot at `data_file`, waiting up to `wait` for another
    /// holder to finish.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Locked`] when the lock is still held after `wait`.
    /// - [`StoreError::Snapshot`] when the lock file cannot be opened.
    pub fn acquire(data_file: &Path, wait: Duration) -> Result<Self, StoreError> {
        let path = lock_path(data_file);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| lock_error(&path, e))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| lock_error(&path, e))?;

        let deadline = Instant::now() + wait;
        loop {
            if try_flock_exclusive(&file).map_err(|e| lock_error(&path, e))? {
                tracing::trace!(lock = %path.display(), "snapshot lock acquired");
                return Ok(Self { path, _file: file });
            }
            if Instant::now() >= deadline {
                return Err(StoreError::Locked {
                    path: data_file.display().to_string(),
                });
            }
            thread::sleep(RETRY_INTERVAL);
        }
    }

    /// The lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_path(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn lock_error(path: &Path, e: io::Error) -> StoreError {
    StoreError::Snapshot {
        path: path.display().to_string(),
        reason: format!("lock: {e}"),
    }
}

/// Try to take an exclusive flock without blocking.
///
/// `Ok(false)` when another open file description holds it.
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        // SAFETY: fd is a valid descriptor owned by `file` for the duration
        // of the call; flock does not retain it.
        #[allow(unsafe_code)]
        let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK)
        {
            return Ok(false);
        }
        Err(err)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(true)
    }
}
