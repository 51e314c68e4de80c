//! Bounded, TTL-limited store of computed results keyed by scenario fingerprint.
//!
//! Eviction at capacity is FIFO by insertion age. `last_accessed` is kept for
//! inspection only and never influences which entry goes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use contracts::{CacheStats, SimulationResult, SCHEMA_VERSION_V1};
use tracing::debug;

use crate::clock::{Clock, SystemClock};

pub const DEFAULT_MAX_SIZE: usize = 100;
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Arc<SimulationResult>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    sequence: u64,
}

#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    max_size: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    next_sequence: u64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_TTL)
    }
}

impl ResultCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self::with_clock(max_size, ttl, Arc::new(SystemClock))
    }

    /// A `max_size` of zero is raised to one.
    pub fn with_clock(max_size: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            max_size: max_size.max(1),
            ttl,
            clock,
            next_sequence: 0,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<Arc<SimulationResult>> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            None => {
                debug!(fingerprint = key, "cache miss");
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            self.entries.remove(key);
            debug!(fingerprint = key, "cache entry expired");
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = now;
        debug!(fingerprint = key, "cache hit");
        Some(Arc::clone(&entry.payload))
    }

    pub fn set(&mut self, key: impl Into<String>, payload: Arc<SimulationResult>) {
        let key = key.into();
        let now = self.clock.now();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                created_at: now,
                last_accessed: now,
                sequence,
            },
        );
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Fingerprints are listed oldest first.
    pub fn stats(&self) -> CacheStats {
        let mut ordered: Vec<(&String, &CacheEntry)> = self.entries.iter().collect();
        ordered.sort_by_key(|(_, entry)| entry.sequence);

        CacheStats {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            size: self.entries.len(),
            max_size: self.max_size,
            ttl_seconds: self.ttl.as_secs(),
            fingerprints: ordered.into_iter().map(|(key, _)| key.clone()).collect(),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match (now - entry.created_at).to_std() {
            Ok(age) => age > self.ttl,
            // negative age: the clock went backwards
            Err(_) => false,
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.sequence))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            debug!(fingerprint = %key, max_size = self.max_size, "cache entry evicted");
        }
    }
}
