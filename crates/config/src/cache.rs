//! Time-bounded read-through cache for the loaded configuration.
//!
//! Readers always receive a complete `Arc<EnhancerConfig>` snapshot. A reload
//! builds the new snapshot outside the lock and swaps it in under the write
//! lock, so a concurrent reader sees either the old or the new config, never
//! a partially written one.

use crate::EnhancerConfig;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Where the cache reloads from.
#[derive(Debug, Clone)]
enum ConfigSource {
    File(PathBuf),
    /// A fixed config that never changes (tests).
    Fixed(Arc<EnhancerConfig>),
}

#[derive(Debug, Clone)]
struct Snapshot {
    config: Arc<EnhancerConfig>,
    loaded_at: Instant,
}

#[derive(Debug)]
pub struct ConfigCache {
    source: ConfigSource,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    loads: AtomicUsize,
}

impl ConfigCache {
    /// Staleness window used unless overridden.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// Cache backed by a config file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ConfigSource::File(path.into()), Self::DEFAULT_TTL)
    }

    /// Cache backed by the default config path.
    pub fn from_default_path() -> Self {
        Self::new(EnhancerConfig::default_path())
    }

    /// Cache that always serves the given config.
    pub fn fixed(config: EnhancerConfig) -> Self {
        Self::with_source(ConfigSource::Fixed(Arc::new(config)), Self::DEFAULT_TTL)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn with_source(source: ConfigSource, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ConfigSource::File(path) => Some(path),
            ConfigSource::Fixed(_) => None,
        }
    }

    /// Current configuration, reloading if the snapshot is older than the TTL.
    pub fn get(&self) -> Arc<EnhancerConfig> {
        self.get_at(Instant::now())
    }

    pub(crate) fn get_at(&self, now: Instant) -> Arc<EnhancerConfig> {
        {
            let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
            if let Some(snapshot) = guard.as_ref() {
                if now.saturating_duration_since(snapshot.loaded_at) < self.ttl {
                    return Arc::clone(&snapshot.config);
                }
            }
        }

        let config = self.load();
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Snapshot {
            config: Arc::clone(&config),
            loaded_at: now,
        });
        config
    }

    /// Drop the cached snapshot so the next `get` reloads.
    pub fn invalidate(&self) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// How many times the source has been (re)loaded.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn load(&self) -> Arc<EnhancerConfig> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        match &self.source {
            ConfigSource::File(path) => {
                tracing::debug!(path = %path.display(), "Reloading configuration");
                Arc::new(EnhancerConfig::load_or_default(path))
            }
            ConfigSource::Fixed(config) => Arc::clone(config),
        }
    }
}
