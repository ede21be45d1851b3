//! Session store
//!
//! The cookie only carries a random session key; the session record lives
//! behind the [`SessionStore`] trait so the backing store can be swapped.
//! [`FileSessionStore`] keeps records on disk so identities outlive a
//! restart; [`MemorySessionStore`] keeps them in process memory.

use crate::session::identity::SessionData;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);
const MAX_KEY_LEN: usize = 64;

/// Key-value store for session records with per-entry expiry
pub trait SessionStore: Send + Sync {
    /// Returns the live record for `key`, if any.
    fn get(&self, key: &str) -> Option<SessionData>;

    /// Stores `data` under `key`, expiring `ttl` from now.
    fn set(&self, key: &str, data: SessionData, ttl: Duration);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StoredSession {
    data: SessionData,
    expires_at: Instant,
}

/// Process-local session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock(&self.sessions).len()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<SessionData> {
        let mut sessions = lock(&self.sessions);
        match sessions.get(key) {
            Some(stored) if stored.expires_at > Instant::now() => Some(stored.data.clone()),
            Some(_) => {
                sessions.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, data: SessionData, ttl: Duration) {
        let now = Instant::now();
        let mut sessions = lock(&self.sessions);
        sessions.retain(|_, stored| stored.expires_at > now);
        sessions.insert(
            key.to_string(),
            StoredSession {
                data,
                expires_at: now + ttl,
            },
        );
    }
}

/// On-disk form of one session
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    /// Unix seconds after which the record is dead
    expires_at: u64,
    #[serde(flatten)]
    data: SessionData,
}

/// Session store keeping one JSON file per session key in a directory
pub struct FileSessionStore {
    dir: PathBuf,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl FileSessionStore {
    /// Opens (creating if needed) the session directory and drops expired records.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let store = Self {
            dir,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            last_sweep: Mutex::new(Instant::now()),
        };
        store.sweep();
        Ok(store)
    }

    #[cfg(test)]
    fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// File backing `key`; keys are generated hex, anything else is refused.
    fn record_path(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key.len() <= MAX_KEY_LEN
            && key.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| self.dir.join(format!("{}.json", key)))
    }

    fn read_record(path: &Path) -> Option<SessionRecord> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding unreadable session {}: {}", path.display(), e);
                None
            }
        }
    }

    fn remove_file(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove session {}: {}", path.display(), e);
            }
        }
    }

    /// Deletes every expired or unreadable record, returning how many went.
    fn sweep(&self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to scan session directory {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        let now = unix_now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let alive = Self::read_record(&path).is_some_and(|r| r.expires_at > now);
            if !alive {
                Self::remove_file(&path);
                removed += 1;
            }
        }

        debug!("Session sweep removed {} records", removed);
        removed
    }

    fn maybe_sweep(&self) {
        let mut last_sweep = lock(&self.last_sweep);
        if last_sweep.elapsed() >= self.sweep_interval {
            *last_sweep = Instant::now();
            drop(last_sweep);
            self.sweep();
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<SessionData> {
        let path = self.record_path(key)?;
        let record = Self::read_record(&path)?;
        if record.expires_at > unix_now() {
            Some(record.data)
        } else {
            Self::remove_file(&path);
            None
        }
    }

    fn set(&self, key: &str, data: SessionData, ttl: Duration) {
        let Some(path) = self.record_path(key) else {
            warn!("Refusing to store session under malformed key");
            return;
        };
        self.maybe_sweep();

        let record = SessionRecord {
            expires_at: unix_now().saturating_add(ttl.as_secs()),
            data,
        };
        let result = serde_json::to_vec(&record)
            .map_err(io::Error::from)
            .and_then(|bytes| fs::write(&path, bytes));
        if let Err(e) = result {
            warn!("Failed to write session {}: {}", path.display(), e);
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
