//! Interval algorithms from the org-drill family: SM2, SM5 and Simple8.
//!
//! Each algorithm is a pure function from an explicit input record to the next standard fields.
//! The scheduler structs at the bottom bind these functions to [`IntervalScheduler`] so a
//! [`LearningItem`](crate::item::LearningItem) can thread its record through them.

use crate::traits::*;
use serde::{Deserialize, Serialize};

/// Ease assumed for items that have none yet.
pub const DEFAULT_EASE: f64 = 2.5;

/// Ease never drops below this before being modified.
pub const MIN_EASE: f64 = 1.3;

/// Tunables shared by the algorithms.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
pub struct AlgorithmParams {
    pub failure_quality: Quality,
    /// Weight of the newest observation when updating SM5 optimal factors and Simple8 ease.
    pub learn_fraction: f64,
    /// First interval used by SM5 for items without an optimal factor.
    pub sm5_initial_interval: Interval,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        AlgorithmParams {
            failure_quality: DEFAULT_FAILURE_QUALITY,
            learn_fraction: 0.5,
            sm5_initial_interval: 4.0,
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Sm2Input {
    pub last_interval: Interval,
    pub repetitions: u32,
    pub ease: Option<f64>,
    pub quality: Quality,
    pub failures: u32,
    pub mean_quality: Quality,
    pub total: u32,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Sm5Input<'a> {
    pub last_interval: Interval,
    pub repetitions: u32,
    pub ease: Option<f64>,
    pub quality: Quality,
    pub failures: u32,
    pub mean_quality: Quality,
    pub total: u32,
    pub of_matrix: &'a OfMatrix,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Sm5Output {
    pub next: NextInterval,
    pub of_matrix: OfMatrix,
}

/// Simple8 does not use an ease as input.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Simple8Input {
    pub last_interval: Interval,
    pub repetitions: u32,
    pub quality: Quality,
    pub failures: u32,
    pub mean_quality: Quality,
    pub total: u32,
}

/// One learned optimal factor for a (repetition, ease) pair.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
pub struct OptimalFactor {
    pub repetition: u32,
    pub ease: f64,
    pub factor: f64,
}

/// SM5's matrix of optimal factors.
#[derive(Debug, PartialEq, Clone, Default, Deserialize, Serialize)]
pub struct OfMatrix {
    entries: Vec<OptimalFactor>,
}

impl OfMatrix {
    pub fn new() -> Self {
        OfMatrix { entries: vec![] }
    }

    pub fn from(entries: &[OptimalFactor]) -> Self {
        OfMatrix {
            entries: entries.to_vec(),
        }
    }

    pub fn get(&self, repetition: u32, ease: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|z| z.repetition == repetition && z.ease == ease)
            .map(|z| z.factor)
    }

    /// Insert or overwrite the factor for this pair.
    pub fn set(&mut self, repetition: u32, ease: f64, factor: f64) {
        match self
            .entries
            .iter_mut()
            .find(|z| z.repetition == repetition && z.ease == ease)
        {
            Some(entry) => entry.factor = factor,
            None => self.entries.push(OptimalFactor {
                repetition,
                ease,
                factor,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OptimalFactor] {
        &self.entries
    }
}

fn is_failed(quality: Quality, params: &AlgorithmParams) -> bool {
    quality <= params.failure_quality
}

/// Running mean of all qualities seen so far, including this one.
pub fn next_mean_quality(mean_quality: Quality, quality: Quality, total: u32) -> Quality {
    (quality + mean_quality * total as f64) / (total as f64 + 1.0)
}

/// Classic SuperMemo ease update.
pub fn modify_e_factor(ease: f64, quality: Quality) -> f64 {
    if ease < MIN_EASE {
        return MIN_EASE;
    }
    let miss = MAX_QUALITY - quality;
    ease + (0.1 - miss * (0.08 + miss * 0.02))
}

fn modify_optimal_factor(factor: f64, quality: Quality, fraction: f64) -> f64 {
    let temp = factor * (0.72 + quality * 0.07);
    (1.0 - fraction) * factor + fraction * temp
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn determine_next_interval_sm2(input: &Sm2Input, params: &AlgorithmParams) -> NextInterval {
    let ease = input.ease.unwrap_or(DEFAULT_EASE);
    let mean_quality = next_mean_quality(input.mean_quality, input.quality, input.total);

    if is_failed(input.quality, params) {
        // Interval is reset, ease is kept.
        return NextInterval {
            last_interval: UNSCHEDULED,
            repetitions: 1,
            ease: Some(ease),
            failures: input.failures + 1,
            mean_quality,
            total: input.total + 1,
        };
    }

    let next_ease = modify_e_factor(ease, input.quality);
    let interval = match input.repetitions {
        0 | 1 => 1.0,
        2 => 6.0,
        _ => input.last_interval * next_ease,
    };
    NextInterval {
        last_interval: interval,
        repetitions: input.repetitions + 1,
        ease: Some(next_ease),
        failures: input.failures,
        mean_quality,
        total: input.total + 1,
    }
}

fn sm5_optimal_factor(
    repetition: u32,
    ease: f64,
    of_matrix: &OfMatrix,
    params: &AlgorithmParams,
) -> f64 {
    of_matrix
        .get(repetition, ease)
        .unwrap_or(if repetition == 1 {
            params.sm5_initial_interval
        } else {
            ease
        })
}

pub fn determine_next_interval_sm5(input: &Sm5Input, params: &AlgorithmParams) -> Sm5Output {
    let n = input.repetitions.max(1);
    let ease = input.ease.unwrap_or(DEFAULT_EASE);
    let mean_quality = next_mean_quality(input.mean_quality, input.quality, input.total);

    let next_ease = modify_e_factor(ease, input.quality);
    let new_factor = modify_optimal_factor(
        sm5_optimal_factor(n, ease, input.of_matrix, params),
        input.quality,
        params.learn_fraction,
    );
    let mut of_matrix = input.of_matrix.clone();
    of_matrix.set(n, next_ease, round_to(new_factor, 3));

    if is_failed(input.quality, params) {
        return Sm5Output {
            next: NextInterval {
                last_interval: UNSCHEDULED,
                repetitions: 1,
                ease: Some(ease),
                failures: input.failures + 1,
                mean_quality,
                total: input.total + 1,
            },
            of_matrix,
        };
    }

    let factor = sm5_optimal_factor(n, next_ease, &of_matrix, params);
    let interval = if n == 1 {
        factor
    } else {
        factor * input.last_interval
    };
    Sm5Output {
        next: NextInterval {
            last_interval: interval,
            repetitions: n + 1,
            ease: Some(next_ease),
            failures: input.failures,
            mean_quality,
            total: input.total + 1,
        },
        of_matrix,
    }
}

/// Optimal first interval for an item forgotten `failures` times.
pub fn simple8_first_interval(failures: u32) -> Interval {
    2.4849 * (-0.057 * failures as f64).exp()
}

/// Ease corresponding to a mean quality, fitted polynomial.
pub fn simple8_quality_to_ease(quality: Quality) -> f64 {
    0.0542 * quality.powi(4) - 0.4848 * quality.powi(3) + 1.4916 * quality.powi(2)
        - 1.2403 * quality
        + 1.4515
}

fn simple8_interval_factor(ease: f64, repetition: u32, fraction: f64) -> f64 {
    1.2 + (ease - 1.2) * fraction.powf((repetition as f64).log2())
}

pub fn determine_next_interval_simple8(
    input: &Simple8Input,
    params: &AlgorithmParams,
) -> NextInterval {
    let mean_quality = next_mean_quality(input.mean_quality, input.quality, input.total);
    let mut repetitions = input.repetitions;
    let mut failures = input.failures;

    let interval = if is_failed(input.quality, params) {
        failures += 1;
        repetitions = 0;
        UNSCHEDULED
    } else if repetitions == 0 || input.last_interval == 0.0 {
        repetitions = 1;
        simple8_first_interval(failures)
    } else {
        repetitions += 1;
        let factor = simple8_interval_factor(
            simple8_quality_to_ease(mean_quality),
            repetitions,
            params.learn_fraction,
        );
        input.last_interval * factor
    };

    NextInterval {
        last_interval: interval,
        repetitions,
        ease: None,
        failures,
        mean_quality,
        total: input.total + 1,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sm2 {
    pub params: AlgorithmParams,
}

impl IntervalScheduler for Sm2 {
    type Extra = ();

    fn failure_quality(&self) -> Quality {
        self.params.failure_quality
    }

    fn next_interval(&self, record: &ReviewRecord, _: &(), quality: Quality) -> Scheduled<()> {
        let input = Sm2Input {
            last_interval: record.last_interval,
            repetitions: record.repetitions,
            ease: record.ease,
            quality,
            failures: record.failures,
            mean_quality: record.mean_quality,
            total: record.total,
        };
        Scheduled {
            next: determine_next_interval_sm2(&input, &self.params),
            extra: (),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sm5 {
    pub params: AlgorithmParams,
}

impl IntervalScheduler for Sm5 {
    type Extra = OfMatrix;

    fn failure_quality(&self) -> Quality {
        self.params.failure_quality
    }

    fn next_interval(
        &self,
        record: &ReviewRecord,
        of_matrix: &OfMatrix,
        quality: Quality,
    ) -> Scheduled<OfMatrix> {
        let input = Sm5Input {
            last_interval: record.last_interval,
            repetitions: record.repetitions,
            ease: record.ease,
            quality,
            failures: record.failures,
            mean_quality: record.mean_quality,
            total: record.total,
            of_matrix,
        };
        let output = determine_next_interval_sm5(&input, &self.params);
        Scheduled {
            next: output.next,
            extra: output.of_matrix,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Simple8 {
    pub params: AlgorithmParams,
}

impl IntervalScheduler for Simple8 {
    type Extra = ();

    fn failure_quality(&self) -> Quality {
        self.params.failure_quality
    }

    fn next_interval(&self, record: &ReviewRecord, _: &(), quality: Quality) -> Scheduled<()> {
        let input = Simple8Input {
            last_interval: record.last_interval,
            repetitions: record.repetitions,
            quality,
            failures: record.failures,
            mean_quality: record.mean_quality,
            total: record.total,
        };
        Scheduled {
            next: determine_next_interval_simple8(&input, &self.params),
            extra: (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sm2_input(last_interval: Interval, repetitions: u32, quality: Quality) -> Sm2Input {
        Sm2Input {
            last_interval,
            repetitions,
            ease: Some(2.5),
            quality,
            failures: 0,
            mean_quality: 0.0,
            total: repetitions,
        }
    }

    #[test]
    fn test_e_factor() {
        assert!(close(modify_e_factor(2.5, 5.0), 2.6));
        assert!(close(modify_e_factor(2.5, 4.0), 2.5));
        assert!(close(modify_e_factor(2.5, 3.0), 2.36));
        assert_eq!(modify_e_factor(1.0, 5.0), MIN_EASE);
    }

    #[test]
    fn test_mean_quality() {
        assert!(close(next_mean_quality(0.0, 4.0, 0), 4.0));
        assert!(close(next_mean_quality(4.0, 2.0, 1), 3.0));
        assert!(close(next_mean_quality(3.0, 5.0, 2), 11.0 / 3.0));
    }

    #[test]
    fn test_sm2_intervals() {
        let p = AlgorithmParams::default();
        let r = determine_next_interval_sm2(&sm2_input(-1.0, 0, 5.0), &p);
        assert_eq!(r.last_interval, 1.0);
        assert_eq!(r.repetitions, 1);
        assert!(close(r.ease.unwrap(), 2.6));

        let r = determine_next_interval_sm2(&sm2_input(1.0, 2, 4.0), &p);
        assert_eq!(r.last_interval, 6.0);

        let r = determine_next_interval_sm2(&sm2_input(6.0, 3, 4.0), &p);
        assert!(close(r.last_interval, 15.0));
        assert_eq!(r.total, 4);
    }

    #[test]
    fn test_sm2_failure_keeps_ease() {
        let p = AlgorithmParams::default();
        let mut input = sm2_input(15.0, 4, 1.0);
        input.ease = Some(2.2);
        let r = determine_next_interval_sm2(&input, &p);
        assert_eq!(r.last_interval, UNSCHEDULED);
        assert_eq!(r.repetitions, 1);
        assert_eq!(r.ease, Some(2.2));
        assert_eq!(r.failures, 1);

        // Missing ease gets the default.
        input.ease = None;
        let r = determine_next_interval_sm2(&input, &p);
        assert_eq!(r.ease, Some(DEFAULT_EASE));
    }

    #[test]
    fn test_sm5_first_pass() {
        let p = AlgorithmParams::default();
        let matrix = OfMatrix::new();
        let input = Sm5Input {
            last_interval: -1.0,
            repetitions: 0,
            ease: None,
            quality: 5.0,
            failures: 0,
            mean_quality: 0.0,
            total: 0,
            of_matrix: &matrix,
        };
        let r = determine_next_interval_sm5(&input, &p);
        // Initial factor 4.0 adjusted by quality 5: 0.5 * 4 + 0.5 * 4 * 1.07 = 4.14
        assert!(close(r.next.last_interval, 4.14));
        assert_eq!(r.next.repetitions, 2);
        assert!(close(r.next.ease.unwrap(), 2.6));
        assert_eq!(r.of_matrix.len(), 1);
        assert_eq!(r.of_matrix.get(1, r.next.ease.unwrap()), Some(4.14));
        assert_eq!(r.of_matrix.entries()[0].repetition, 1);
        // Input matrix untouched.
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_sm5_uses_matrix() {
        let p = AlgorithmParams::default();
        let next_ease = modify_e_factor(2.5, 5.0);
        let matrix = OfMatrix::from(&[OptimalFactor {
            repetition: 2,
            ease: 2.5,
            factor: 3.0,
        }]);
        let input = Sm5Input {
            last_interval: 4.0,
            repetitions: 2,
            ease: Some(2.5),
            quality: 5.0,
            failures: 0,
            mean_quality: 4.0,
            total: 2,
            of_matrix: &matrix,
        };
        let r = determine_next_interval_sm5(&input, &p);
        // 0.5 * 3 + 0.5 * 3 * 1.07 = 3.105, stored under the new ease.
        let factor = r.of_matrix.get(2, next_ease).unwrap();
        assert!(close(factor, 3.105));
        assert!(close(r.next.last_interval, 12.42));
        assert_eq!(r.of_matrix.len(), 2);
    }

    #[test]
    fn test_sm5_failure() {
        let p = AlgorithmParams::default();
        let matrix = OfMatrix::new();
        let input = Sm5Input {
            last_interval: 10.0,
            repetitions: 3,
            ease: Some(2.0),
            quality: 0.0,
            failures: 2,
            mean_quality: 3.0,
            total: 5,
            of_matrix: &matrix,
        };
        let r = determine_next_interval_sm5(&input, &p);
        assert_eq!(r.next.last_interval, UNSCHEDULED);
        assert_eq!(r.next.ease, Some(2.0));
        assert_eq!(r.next.failures, 3);
        assert_eq!(r.next.total, 6);
        assert_eq!(r.of_matrix.len(), 1);
    }

    #[test]
    fn test_simple8() {
        let p = AlgorithmParams::default();
        let first = Simple8Input {
            last_interval: -1.0,
            repetitions: 0,
            quality: 5.0,
            failures: 0,
            mean_quality: 0.0,
            total: 0,
        };
        let r = determine_next_interval_simple8(&first, &p);
        assert!(close(r.last_interval, 2.4849));
        assert_eq!(r.repetitions, 1);
        assert_eq!(r.ease, None);

        let second = Simple8Input {
            last_interval: r.last_interval,
            repetitions: r.repetitions,
            quality: 5.0,
            failures: 0,
            mean_quality: r.mean_quality,
            total: r.total,
        };
        let r2 = determine_next_interval_simple8(&second, &p);
        assert_eq!(r2.repetitions, 2);
        assert!(r2.last_interval > r.last_interval);

        let failed = Simple8Input {
            quality: 1.0,
            ..second
        };
        let r3 = determine_next_interval_simple8(&failed, &p);
        assert_eq!(r3.last_interval, UNSCHEDULED);
        assert_eq!(r3.repetitions, 0);
        assert_eq!(r3.failures, 1);
        assert_eq!(r3.ease, None);
    }

    #[test]
    fn test_simple8_first_interval_shrinks_with_failures() {
        assert!(simple8_first_interval(3) < simple8_first_interval(0));
    }

    #[test]
    fn test_custom_failure_quality() {
        let p = AlgorithmParams {
            failure_quality: 3.0,
            ..Default::default()
        };
        let r = determine_next_interval_sm2(&sm2_input(1.0, 1, 3.0), &p);
        assert_eq!(r.failures, 1);
        assert_eq!(Sm2 { params: p }.failure_quality(), 3.0);
    }
}
