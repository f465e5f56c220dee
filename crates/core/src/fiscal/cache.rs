//! Per-organization fiscal year cache using Moka.
//!
//! Keyed by organization (`None` for the unscoped list). Values are the
//! active years in resolution order, shared behind an `Arc`.

use moka::sync::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bursar_shared::types::OrganizationName;

use super::year::FiscalYear;

/// Default cache capacity (number of organizations).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (1 hour).
const DEFAULT_TTL_SECS: u64 = 3600;

type CacheKey = Option<OrganizationName>;

/// Cache of active fiscal years per organization.
///
/// Thread-safe and cheap to clone; clones share the same storage.
///
/// Every `invalidate_all` bumps a generation counter. A load started under
/// an older generation is returned to its caller but not cached, so a read
/// racing a fiscal year change cannot re-cache the stale list.
#[derive(Clone)]
pub struct FiscalYearCache {
    cache: Cache<CacheKey, Arc<Vec<FiscalYear>>>,
    generation: Arc<AtomicU64>,
}

impl FiscalYearCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 256 organizations, 1 hour TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the cached years for `organization`, if present.
    #[must_use]
    pub fn get(&self, organization: Option<&OrganizationName>) -> Option<Arc<Vec<FiscalYear>>> {
        self.cache.get(&organization.cloned())
    }

    /// Stores the active years for `organization`.
    pub fn insert(
        &self,
        organization: Option<&OrganizationName>,
        years: Vec<FiscalYear>,
    ) -> Arc<Vec<FiscalYear>> {
        let years = Arc::new(years);
        self.cache.insert(organization.cloned(), Arc::clone(&years));
        years
    }

    /// Current invalidation generation. Read it before loading from storage.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Stores years loaded under `generation`, unless the cache was
    /// invalidated since. The years are returned either way.
    pub fn insert_if_current(
        &self,
        organization: Option<&OrganizationName>,
        years: Vec<FiscalYear>,
        generation: u64,
    ) -> Arc<Vec<FiscalYear>> {
        if self.generation() != generation {
            return Arc::new(years);
        }
        self.insert(organization, years)
    }

    /// Returns cached years or loads, caches and returns them.
    ///
    /// Load failures are returned and nothing is cached.
    pub fn get_or_try_load<E>(
        &self,
        organization: Option<&OrganizationName>,
        load: impl FnOnce() -> Result<Vec<FiscalYear>, E>,
    ) -> Result<Arc<Vec<FiscalYear>>, E> {
        if let Some(years) = self.get(organization) {
            return Ok(years);
        }
        let generation = self.generation();
        let years = load()?;
        Ok(self.insert_if_current(organization, years, generation))
    }

    /// Drops the entry for one organization.
    pub fn invalidate(&self, organization: Option<&OrganizationName>) {
        self.cache.invalidate(&organization.cloned());
    }

    /// Drops every entry. Called whenever a fiscal year changes.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks (expiry, eviction bookkeeping).
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for FiscalYearCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FiscalYearCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiscalYearCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
