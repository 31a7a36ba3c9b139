// src/extract/cache.rs
//
// Raw-data cache for API responses. The listings API is paid, so fetched
// tables are kept on disk and reused until they go stale. Freshness is
// judged against an injected clock so tests never have to fake file mtimes.

use crate::errors::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub trait Clock {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::with_clock(dir, ttl, Box::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, ttl: Duration, clock: Box<dyn Clock>) -> Self {
        FileCache {
            dir: dir.into(),
            ttl,
            clock,
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Returns the cached contents only while the entry is fresh. A
    /// missing or stale entry is a miss; an unreadable one too.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        if !self.is_fresh(&path) {
            return None;
        }
        fs::read_to_string(&path).ok()
    }

    pub fn put(&self, key: &str, contents: &str) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Ok(meta) = fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        match self.clock.now().duration_since(modified) {
            Ok(age) => age < self.ttl,
            // Modified in the future relative to our clock; count as fresh.
            Err(_) => true,
        }
    }
}
