//! Versioned configuration snapshots

use super::Config;
use super::loader::{ConfigIssue, env_lookup};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Key lookup used to (re)build configuration
pub type ConfigLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Immutable configuration handed to one request
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    /// Incremented every time the effective configuration changes
    pub version: u64,
    pub config: Config,
}

/// Single source of configuration for the whole process.
///
/// [`ConfigProvider::snapshot`] re-reads the backing lookup and publishes a
/// new version only when the resulting configuration differs from the
/// current one. Readers never block each other. An ignored value is logged
/// when it first appears, not on every re-read.
pub struct ConfigProvider {
    lookup: Option<ConfigLookup>,
    current: ArcSwap<ConfigSnapshot>,
    publish: Mutex<()>,
    /// Issues seen on the last re-read
    reported: Mutex<HashSet<ConfigIssue>>,
}

impl ConfigProvider {
    /// Provider backed by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(Arc::new(env_lookup))
    }

    /// Provider backed by an arbitrary lookup
    pub fn from_lookup(lookup: ConfigLookup) -> Self {
        let mut provider = Self::fixed(Config::default());
        let config = provider.read(&lookup);
        provider.current = ArcSwap::from_pointee(ConfigSnapshot { version: 1, config });
        provider.lookup = Some(lookup);
        provider
    }

    /// Provider that only changes through [`ConfigProvider::update`]
    pub fn fixed(config: Config) -> Self {
        Self {
            lookup: None,
            current: ArcSwap::from_pointee(ConfigSnapshot { version: 1, config }),
            publish: Mutex::new(()),
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Re-read the source and return the latest snapshot
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        if let Some(lookup) = &self.lookup {
            let fresh = self.read(lookup);
            if fresh != self.current.load().config {
                return self.publish(fresh);
            }
        }
        self.current.load_full()
    }

    /// Latest published snapshot without consulting the source
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Replace the configuration explicitly
    pub fn update(&self, config: Config) -> Arc<ConfigSnapshot> {
        self.publish(config)
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Load from `lookup`, logging only issues absent from the previous read
    fn read(&self, lookup: &ConfigLookup) -> Config {
        let (config, issues) = Config::load(|key| lookup(key));
        let issues: HashSet<ConfigIssue> = issues.into_iter().collect();

        let mut reported = self.reported.lock();
        if *reported != issues {
            issues
                .iter()
                .filter(|issue| !reported.contains(*issue))
                .for_each(ConfigIssue::report);
            *reported = issues;
        }
        config
    }

    /// Values currently replaced by their defaults
    pub fn issues(&self) -> Vec<ConfigIssue> {
        self.reported.lock().iter().cloned().collect()
    }

    fn publish(&self, config: Config) -> Arc<ConfigSnapshot> {
        let _guard = self.publish.lock();
        let current = self.current.load_full();
        if current.config == config {
            return current;
        }

        let next = Arc::new(ConfigSnapshot {
            version: current.version + 1,
            config,
        });
        info!(version = next.version, "Configuration changed");
        self.current.store(next.clone());
        next
    }
}

impl std::fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("live", &self.lookup.is_some())
            .field("current", &*self.current.load_full())
            .finish()
    }
}
