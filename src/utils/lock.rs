// ABOUTME: Working-directory lock so two workflows never edit the same files at once.
// ABOUTME: Atomic create of <workdir>/.hedera-local.lock holding JSON LockInfo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LOCK_FILENAME: &str = ".hedera-local.lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error(
        "working directory is in use by {holder} (pid {pid}) since {started_at}; \
         wait for it to finish or run `hedera-local stop`"
    )]
    Held {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("failed to acquire working directory lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Who holds the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub holder: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub workflow: String,
}

impl LockInfo {
    pub fn new(workflow: &str) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            workflow: workflow.to_string(),
        }
    }

    /// Older than one hour.
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }
}

/// A held lock; the file is removed on drop.
#[derive(Debug)]
pub struct WorkDirLock {
    path: PathBuf,
}

impl WorkDirLock {
    /// Acquire the lock for `work_dir`, breaking it if stale or unreadable.
    pub fn acquire(work_dir: &Path, workflow: &str) -> Result<Self, LockError> {
        let path = work_dir.join(LOCK_FILENAME);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(work_dir).map_err(io_err)?;

        let info = LockInfo::new(workflow);
        if Self::try_create(&path, &info).map_err(io_err)? {
            return Ok(Self { path });
        }

        match fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str::<LockInfo>(&s).ok())
        {
            Some(existing) if !existing.is_stale() => {
                return Err(LockError::Held {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            Some(existing) => tracing::warn!(
                "Auto-breaking stale lock held by {} (pid {}) since {}",
                existing.holder,
                existing.pid,
                existing.started_at
            ),
            None => tracing::warn!("Lock info unreadable, breaking lock"),
        }

        fs::remove_file(&path).map_err(io_err)?;
        if Self::try_create(&path, &info).map_err(io_err)? {
            Ok(Self { path })
        } else {
            Err(io_err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "lock acquired by another process during break",
            )))
        }
    }

    /// `Ok(false)` if the file already exists.
    fn try_create(path: &Path, info: &LockInfo) -> io::Result<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e),
        };
        let json = serde_json::to_string(info).map_err(io::Error::other)?;
        file.write_all(json.as_bytes())?;
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDirLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}
