//! CRL cache, keyed by issuer DN (§4.5, §5).
//!
//! `Arc<RwLock<HashMap<..>>>` around the index, the same shape as the
//! teacher's `in_memory::InMemoryStorage`/`gpg_mock`'s key maps: one lock
//! guarding the whole table, cheap enough at this call volume and simple
//! to reason about under concurrent validations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::crl::model::Crl;
use crate::name::DistinguishedName;

const DEFAULT_MAX_CACHE_SIZE: usize = 100;

struct Entry {
    crl: Crl,
    /// Insertion/refresh order for LRU eviction.
    last_touched: DateTime<Utc>,
}

/// Shared CRL cache. Cloning shares the underlying table (`Arc`), matching
/// how the teacher's adapters hand out cheap clones of themselves.
#[derive(Clone)]
pub struct CrlCache {
    entries: Arc<RwLock<HashMap<DistinguishedName, Entry>>>,
    max_size: usize,
}

impl CrlCache {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_CACHE_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_size,
        }
    }

    pub fn get(&self, issuer: &DistinguishedName) -> Option<Crl> {
        self.entries
            .read()
            .expect("CRL cache lock poisoned")
            .get(issuer)
            .map(|e| e.crl.clone())
    }

    /// Insert or replace the CRL for `issuer`. A CRL whose `crl_number` is
    /// strictly less than the one already cached is rejected (monotonicity,
    /// P2) — callers wanting to force a downgrade must `remove` first.
    pub fn put(&self, issuer: DistinguishedName, crl: Crl) {
        let mut entries = self.entries.write().expect("CRL cache lock poisoned");

        if let Some(existing) = entries.get(&issuer) {
            if crl.crl_number < existing.crl.crl_number {
                debug!(
                    target: "x509_validate::crl",
                    issuer = %issuer,
                    existing = existing.crl.crl_number,
                    rejected = crl.crl_number,
                    "rejected CRL regression"
                );
                return;
            }
        }

        if entries.len() >= self.max_size && !entries.contains_key(&issuer) {
            if let Some(lru_issuer) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_touched)
                .map(|(issuer, _)| issuer.clone())
            {
                entries.remove(&lru_issuer);
            }
        }

        entries.insert(
            issuer,
            Entry {
                crl,
                last_touched: Utc::now(),
            },
        );
    }

    pub fn remove(&self, issuer: &DistinguishedName) {
        self.entries
            .write()
            .expect("CRL cache lock poisoned")
            .remove(issuer);
    }

    /// True when there is no cached CRL, the cached CRL has no
    /// `next_update`, or `next_update` is within `threshold` of `now`.
    pub fn is_expiring_soon(
        &self,
        issuer: &DistinguishedName,
        threshold_secs: i64,
        now: DateTime<Utc>,
    ) -> bool {
        match self.get(issuer) {
            None => true,
            Some(crl) => match crl.next_update {
                None => true,
                Some(next_update) => next_update <= now + chrono::Duration::seconds(threshold_secs),
            },
        }
    }

    /// Drop entries whose `next_update` has passed (or is absent). Returns
    /// the number of entries removed.
    pub fn remove_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().expect("CRL cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| match entry.crl.next_update {
            Some(next_update) => next_update > now,
            None => false,
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("CRL cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CrlCache {
    fn default() -> Self {
        Self::new()
    }
}
