use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock on the data directory.
///
/// Held across load, mutate and save so that two `gd` processes writing
/// at once cannot lose each other's changes. Uses flock on Unix.
pub struct DataLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another gd process may be writing")]
    Timeout { path: PathBuf },
}

impl DataLock {
    /// Acquire the lock, waiting up to `timeout`.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = data_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    tracing::trace!(path = %lock_path.display(), "acquired data lock");
                    return Ok(DataLock {
                        _file: file,
                        path: lock_path,
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    /// Acquire with the default timeout (5 seconds)
    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, Duration::from_secs(5))
    }
}

impl Drop for DataLock {
    fn drop(&mut self) {
        // flock is released when the file closes. The file itself stays:
        // unlinking it would let a waiter lock an orphaned inode.
        tracing::trace!(path = %self.path.display(), "released data lock");
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
