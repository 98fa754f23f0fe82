// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded exponential backoff for failed reconciliations.

use crate::constants::backoff::{INITIAL_INTERVAL_SECS, MAX_INTERVAL_SECS};
use crate::types::ResourceKey;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Entries untouched for this long belong to objects that were removed mid-retry
const STALE_AFTER: Duration = Duration::from_secs(2 * MAX_INTERVAL_SECS);

/// Tracks consecutive failures per ingress and decides when to retry.
///
/// Delays double from `INITIAL_INTERVAL_SECS` up to `MAX_INTERVAL_SECS`. After
/// `max_retries` consecutive failures `next_retry` returns `None` and the
/// object waits for the next resync instead.
///
/// An ingress deleted while it is backing off is never reconciled again, so
/// entries that stay untouched for longer than any retry delay are pruned.
#[derive(Debug)]
pub struct RetryTracker {
    max_retries: u32,
    failures: Mutex<HashMap<ResourceKey, (u32, Instant)>>,
}

impl RetryTracker {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure and return the delay before the next attempt, if any remain
    pub fn next_retry(&self, key: &ResourceKey) -> Option<Duration> {
        self.next_retry_at(key, Instant::now())
    }

    fn next_retry_at(&self, key: &ResourceKey, now: Instant) -> Option<Duration> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.retain(|k, (_, last)| {
            k == key || now.saturating_duration_since(*last) < STALE_AFTER
        });

        let (attempt, last) = failures.entry(key.clone()).or_insert((0, now));
        *attempt += 1;
        *last = now;

        if *attempt > self.max_retries {
            // Start over after the resync so a later failure gets a fresh budget
            failures.remove(key);
            return None;
        }

        Some(delay_for(*attempt))
    }

    /// Forget failures after a successful reconciliation
    pub fn reset(&self, key: &ResourceKey) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    pub fn failures(&self, key: &ResourceKey) -> u32 {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|(attempt, _)| *attempt)
            .unwrap_or(0)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn delay_for(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let secs = INITIAL_INTERVAL_SECS
        .saturating_mul(1u64 << exponent)
        .min(MAX_INTERVAL_SECS);
    Duration::from_secs(secs)
}
