//! Selection of the next item to review.
//!
//! Items with the lowest interval are reviewed first, never-reviewed items (interval -1) before
//! anything else, ties are broken at random. The last reviewed item is never picked again
//! directly. Two small recency trackers shape the synthesized quality scores so that a drill
//! session sees realistic forgetting and relearning.

use crate::traits::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

/// Capacity of the recent and boring trackers.
pub const RECENCY_CAPACITY: usize = 2;

/// Bounded FIFO of keys, pushing beyond capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RecencyTracker<K> {
    entries: VecDeque<K>,
    capacity: usize,
}

impl<K: PartialEq> RecencyTracker<K> {
    pub fn new(capacity: usize) -> Self {
        RecencyTracker {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append as newest, returns the entry evicted to stay within capacity.
    pub fn push(&mut self, key: K) -> Option<K> {
        if self.capacity == 0 {
            return Some(key);
        }
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(key);
        evicted
    }

    /// Remove the first occurrence of key, true if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.entries.iter().position(|z| z == key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn pop_oldest(&mut self) -> Option<K> {
        self.entries.pop_front()
    }

    pub fn newest(&self) -> Option<&K> {
        self.entries.back()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.entries.iter()
    }
}

/// Orders intervals ascending, NaN after every number.
fn interval_order(a: Interval, b: Interval) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Outcome of a single review.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Review<K> {
    pub key: K,
    pub quality: Quality,
    pub result: NextInterval,
}

/// A pool of items keyed by identity.
#[derive(Debug)]
pub struct ReviewPool<K, I> {
    items: BTreeMap<K, I>,
    /// Items that were just answered well.
    recent: RecencyTracker<K>,
    /// Items that just dropped out of recent.
    boring: RecencyTracker<K>,
    last_reviewed: Option<K>,
    check_quality: bool,
}

impl<K: Ord + Clone + std::fmt::Debug, I: Reviewable> Default for ReviewPool<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + std::fmt::Debug, I: Reviewable> ReviewPool<K, I> {
    pub fn new() -> Self {
        ReviewPool {
            items: BTreeMap::new(),
            recent: RecencyTracker::new(RECENCY_CAPACITY),
            boring: RecencyTracker::new(RECENCY_CAPACITY),
            last_reviewed: None,
            check_quality: false,
        }
    }

    /// Reject qualities outside of 0..=5 in [`ReviewPool::review`] instead of forwarding them.
    pub fn with_quality_check(mut self, check_quality: bool) -> Self {
        self.check_quality = check_quality;
        self
    }

    /// Add an item, returns the item previously stored under this key.
    pub fn insert(&mut self, key: K, item: I) -> Option<I> {
        self.items.insert(key, item)
    }

    pub fn get(&self, key: &K) -> Option<&I> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut I> {
        self.items.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &I)> {
        self.items.iter()
    }

    pub fn last_reviewed(&self) -> Option<&K> {
        self.last_reviewed.as_ref()
    }

    pub fn recent(&self) -> &RecencyTracker<K> {
        &self.recent
    }

    pub fn boring(&self) -> &RecencyTracker<K> {
        &self.boring
    }

    /// All keys except the last reviewed one. Falls back to every key if that would leave
    /// nothing to choose from.
    pub fn candidates(&self) -> Vec<&K> {
        let candidates = self
            .items
            .keys()
            .filter(|k| Some(*k) != self.last_reviewed.as_ref())
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            self.items.keys().collect()
        } else {
            candidates
        }
    }

    /// Pick the next item to review, None if the pool is empty.
    pub fn select_next<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<K> {
        let candidates = self.candidates();
        let min_interval = candidates
            .iter()
            .filter_map(|k| self.items.get(*k))
            .map(|item| item.record().last_interval)
            .min_by(|a, b| interval_order(*a, *b))?;
        let tier = candidates
            .into_iter()
            .filter(|k| {
                self.items
                    .get(*k)
                    .map(|item| interval_order(item.record().last_interval, min_interval))
                    == Some(Ordering::Equal)
            })
            .collect::<Vec<_>>();
        tracing::trace!(min_interval, tier = tier.len(), "selecting next item");
        tier.choose(rng).map(|k| (*k).clone())
    }

    /// Quality a simulated learner would answer for this item.
    pub fn synthesize_quality<R: Rng + ?Sized>(&self, key: &K, rng: &mut R) -> Quality {
        if self.recent.contains(key) {
            return MAX_QUALITY;
        }
        let max = MAX_QUALITY as i64;
        if self.boring.contains(key) {
            let failure_quality = self
                .items
                .get(key)
                .map(|item| item.failure_quality())
                .unwrap_or(DEFAULT_FAILURE_QUALITY);
            let low = (failure_quality.floor() as i64 + 1).min(max);
            return rng.gen_range(low..=max) as Quality;
        }
        rng.gen_range(MIN_QUALITY as i64..=max) as Quality
    }

    /// Review the item under key with the given quality and update the recency trackers.
    pub fn review(&mut self, key: &K, quality: Quality) -> DrillResult<NextInterval> {
        if self.check_quality && !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(DrillError::QualityOutOfRange(quality));
        }
        let item = self
            .items
            .get_mut(key)
            .ok_or_else(|| DrillError::UnknownItem(format!("{key:?}")))?;
        let result = item.learn(quality);
        tracing::debug!(
            ?key,
            quality,
            interval = result.last_interval,
            ease = ?result.ease,
            mean_quality = result.mean_quality,
            total = item.record().total,
            "reviewed item"
        );
        self.update_trackers(key);
        Ok(result)
    }

    /// Select an item, synthesize a quality for it and review it.
    pub fn review_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DrillResult<Option<Review<K>>> {
        let key = match self.select_next(rng) {
            Some(key) => key,
            None => return Ok(None),
        };
        let quality = self.synthesize_quality(&key, rng);
        let result = self.review(&key, quality)?;
        Ok(Some(Review {
            key,
            quality,
            result,
        }))
    }

    fn update_trackers(&mut self, key: &K) {
        self.boring.remove(key);
        if !self.recent.is_empty() && !self.recent.remove(key) {
            if let Some(oldest) = self.recent.pop_oldest() {
                self.boring.push(oldest);
            }
        }
        self.recent.push(key.clone());
        self.last_reviewed = Some(key.clone());
    }
}
