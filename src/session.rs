use crate::config::DrillConfig;
use crate::item::AnyItem;
use crate::pool::{Review, ReviewPool};
use crate::recorder::{MemoryRecorder, Recorder};
use crate::traits::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/*
Implements the drill flow;
    Build a pool of items with the configured algorithm.
    Optionally fail every item once, so they all start from the same state.

    Repeat:
        Select item
        Synthesize quality
        Review item
        store review
            -> Recorder
*/

pub struct DrillSession<K> {
    pool: ReviewPool<K, AnyItem>,
    recorder: MemoryRecorder<K>,
    rng: StdRng,
    iterations: usize,
}

impl<K: Ord + Clone + std::fmt::Debug> DrillSession<K> {
    /// Create a session over the keys, every item uses the configured algorithm.
    pub fn new<T: IntoIterator<Item = K>>(keys: T, config: &DrillConfig) -> Self {
        let params = config.params();
        let mut pool = ReviewPool::new().with_quality_check(config.check_quality);
        for key in keys {
            pool.insert(key, AnyItem::new(config.algorithm, params));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tracing::info!(
            items = pool.len(),
            algorithm = %config.algorithm,
            seed = ?config.seed,
            "drill session created"
        );
        DrillSession {
            pool,
            recorder: MemoryRecorder::new(),
            rng,
            iterations: config.iterations,
        }
    }

    pub fn pool(&self) -> &ReviewPool<K, AnyItem> {
        &self.pool
    }

    pub fn recorder(&self) -> &MemoryRecorder<K> {
        &self.recorder
    }

    /// Review every item once with the given quality, bypassing selection. Does not touch the
    /// recency trackers.
    pub fn prime(&mut self, quality: Quality) -> DrillResult<()> {
        let keys = self.pool.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>();
        for key in keys {
            let item = self
                .pool
                .get_mut(&key)
                .ok_or_else(|| DrillError::UnknownItem(format!("{key:?}")))?;
            let result = item.learn(quality);
            self.recorder.store_record(&Review {
                key,
                quality,
                result,
            })?;
        }
        tracing::debug!(items = self.pool.len(), quality, "primed items");
        Ok(())
    }

    /// Perform a single selection and review, None if there is nothing to review.
    pub fn step(&mut self) -> DrillResult<Option<Review<K>>> {
        let review = self.pool.review_next(&mut self.rng)?;
        if let Some(review) = &review {
            self.recorder.store_record(review)?;
        }
        Ok(review)
    }

    /// Run the configured number of steps, calling `on_review` after each one.
    pub fn run<F: FnMut(&Review<K>)>(&mut self, mut on_review: F) -> DrillResult<usize> {
        let mut performed = 0;
        for _ in 0..self.iterations {
            match self.step()? {
                Some(review) => {
                    on_review(&review);
                    performed += 1;
                }
                None => break,
            }
        }
        tracing::info!(
            performed,
            recorded = self.recorder.len(),
            "drill session finished"
        );
        Ok(performed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Algorithm;
    use proptest::prelude::*;

    fn config(algorithm: Algorithm, seed: u64) -> DrillConfig {
        DrillConfig {
            algorithm,
            seed: Some(seed),
            iterations: 40,
            ..Default::default()
        }
    }

    #[test]
    fn test_prime_and_run() {
        let keys = ["for", "while", "loop", "match", "impl"];
        let mut session = DrillSession::new(keys, &config(Algorithm::Sm2, 11));
        session.prime(0.0).unwrap();
        for (_, item) in session.pool().iter() {
            assert_eq!(item.record().failures, 1);
            assert_eq!(item.record().total, 1);
        }
        let mut seen = vec![];
        let performed = session.run(|r| seen.push(r.key)).unwrap();
        assert_eq!(performed, 40);
        assert_eq!(seen.len(), 40);
        assert!(seen.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(session.recorder().len(), 45);

        for key in keys {
            let history = session.recorder().get_records_by_key(&key).unwrap();
            let item = session.pool().get(&key).unwrap();
            assert_eq!(history.len() as u32, item.record().total);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let run = || {
            let mut session = DrillSession::new(0..6, &config(Algorithm::Simple8, 5));
            session.prime(0.0).unwrap();
            let mut out = vec![];
            session.run(|r| out.push((r.key, r.quality))).unwrap();
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_session() {
        let mut session = DrillSession::new(Vec::<u32>::new(), &config(Algorithm::Sm5, 1));
        assert_eq!(session.run(|_| {}).unwrap(), 0);
        assert!(session.recorder().is_empty());
    }

    proptest! {
        #[test]
        fn prop_counters_consistent(
            seed in any::<u64>(),
            items in 2usize..8,
            algorithm in prop_oneof![
                Just(Algorithm::Sm2),
                Just(Algorithm::Sm5),
                Just(Algorithm::Simple8)
            ],
        ) {
            let mut session = DrillSession::new(0..items, &config(algorithm, seed));
            let mut previous = None;
            for _ in 0..30 {
                let review = session.step().unwrap().unwrap();
                prop_assert_ne!(Some(review.key), previous);
                previous = Some(review.key);
            }
            let mut total = 0;
            for (_, item) in session.pool().iter() {
                let r = item.record();
                prop_assert_eq!(r.repetitions + r.failures, r.total);
                total += r.total;
            }
            prop_assert_eq!(total, 30);
        }

        #[test]
        fn prop_total_counts_calls(
            qualities in proptest::collection::vec(0u8..=5, 0..40),
            algorithm in prop_oneof![
                Just(Algorithm::Sm2),
                Just(Algorithm::Sm5),
                Just(Algorithm::Simple8)
            ],
        ) {
            let mut item = AnyItem::new(algorithm, Default::default());
            for (i, q) in qualities.iter().enumerate() {
                item.learn(*q as f64);
                let r = item.record();
                prop_assert_eq!(r.total as usize, i + 1);
                prop_assert_eq!(r.repetitions + r.failures, r.total);
            }
            if qualities.is_empty() {
                prop_assert_eq!(item.record().last_interval, UNSCHEDULED);
            }
        }
    }
}
