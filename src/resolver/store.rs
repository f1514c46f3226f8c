//! Resolver counters and fallback cache.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{EdgeCaseType, ResolverStatistics};
use crate::preference::PreferenceSignal;

/// Default number of cached fallbacks.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;
/// Default age after which cached fallbacks expire.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
/// Longest accepted TTL.
const MAX_CACHE_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// A cached fallback signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFallback {
    /// Entry id.
    pub id: Uuid,
    /// Case that produced it.
    pub case_type: EdgeCaseType,
    /// Fallback signal.
    pub signal: PreferenceSignal,
    /// Insertion time.
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    total_edge_cases: u64,
    successful_recoveries: u64,
    fallback_usage: BTreeMap<String, u64>,
    cache: VecDeque<CachedFallback>,
}

/// Shared mutable state of a resolver.
///
/// All state sits behind one mutex. A poisoned lock is recovered, since
/// every update leaves the state consistent.
#[derive(Debug)]
pub struct ResolverStore {
    state: Mutex<StoreState>,
    capacity: usize,
    ttl: Duration,
}

impl ResolverStore {
    /// Create a store with the given cache bounds.
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        // bounded above, so the cast cannot wrap
        let ttl_secs = ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        Self {
            state: Mutex::new(StoreState::default()),
            capacity,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one resolved edge case.
    pub fn record_outcome(&self, strategy: &str, recovered: bool) {
        let mut state = self.lock();
        state.total_edge_cases += 1;
        if recovered {
            state.successful_recoveries += 1;
        }
        *state.fallback_usage.entry(strategy.to_string()).or_insert(0) += 1;
    }

    /// Cache a fallback signal now.
    pub fn cache_fallback(&self, case_type: EdgeCaseType, signal: &PreferenceSignal) -> Uuid {
        self.cache_fallback_at(case_type, signal, Utc::now())
    }

    /// Cache a fallback signal with an explicit timestamp.
    ///
    /// Expired entries are evicted first, then the oldest entries until the
    /// cache fits its capacity.
    pub fn cache_fallback_at(
        &self,
        case_type: EdgeCaseType,
        signal: &PreferenceSignal,
        now: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.lock();
        evict_before(&mut state.cache, self.cutoff(now));

        state.cache.push_back(CachedFallback {
            id,
            case_type,
            signal: signal.clone(),
            cached_at: now,
        });
        while state.cache.len() > self.capacity {
            state.cache.pop_front();
        }
        id
    }

    /// Drop entries older than the TTL. Returns the number removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let cutoff = self.cutoff(now);
        evict_before(&mut self.lock().cache, cutoff)
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Drop all entries for a case type. Returns the number removed.
    pub fn purge_case(&self, case_type: EdgeCaseType) -> usize {
        let mut state = self.lock();
        let before = state.cache.len();
        state.cache.retain(|entry| entry.case_type != case_type);
        before - state.cache.len()
    }

    /// Most recent cached fallback for a case type.
    pub fn latest_cached(&self, case_type: EdgeCaseType) -> Option<CachedFallback> {
        self.lock()
            .cache
            .iter()
            .rev()
            .find(|entry| entry.case_type == case_type)
            .cloned()
    }

    /// Number of cached entries.
    pub fn cache_len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Snapshot of the counters.
    pub fn snapshot(&self, rules_configured: usize) -> ResolverStatistics {
        let state = self.lock();
        ResolverStatistics {
            total_edge_cases: state.total_edge_cases,
            successful_recoveries: state.successful_recoveries,
            fallback_usage: state.fallback_usage.clone(),
            fallback_cache_size: state.cache.len(),
            rules_configured,
        }
    }
}

impl Default for ResolverStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS)
    }
}

fn evict_before(cache: &mut VecDeque<CachedFallback>, cutoff: DateTime<Utc>) -> usize {
    let before = cache.len();
    cache.retain(|entry| entry.cached_at > cutoff);
    before - cache.len()
}
