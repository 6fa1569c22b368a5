use serde::{Deserialize, Serialize};

/// Recall score, lower means worse recall. Design range is 0 to 5 inclusive.
pub type Quality = f64;

/// Number of days until the next review, -1 means not scheduled.
pub type Interval = f64;

/// Highest quality score.
pub const MAX_QUALITY: Quality = 5.0;

/// Lowest quality score.
pub const MIN_QUALITY: Quality = 0.0;

/// Quality at or below which a review counts as failed.
pub const DEFAULT_FAILURE_QUALITY: Quality = 2.0;

/// Interval of an item that was never scheduled.
pub const UNSCHEDULED: Interval = -1.0;

#[derive(Debug, thiserror::Error)]
pub enum DrillError {
    #[error("unknown algorithm: {0}, expected one of sm2, sm5, simple8")]
    UnknownAlgorithm(String),
    #[error("no item with key {0}")]
    UnknownItem(String),
    #[error("quality {0} outside of 0..=5")]
    QualityOutOfRange(Quality),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type DrillResult<T> = std::result::Result<T, DrillError>;

/// Review state of a single item.
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
pub struct ReviewRecord {
    pub last_interval: Interval,
    /// Successful reviews.
    pub repetitions: u32,
    pub ease: Option<f64>,
    /// Failed reviews.
    pub failures: u32,
    pub mean_quality: Quality,
    /// All reviews, always incremented.
    pub total: u32,
}

impl Default for ReviewRecord {
    fn default() -> Self {
        ReviewRecord {
            last_interval: UNSCHEDULED,
            repetitions: 0,
            ease: None,
            failures: 0,
            mean_quality: 0.0,
            total: 0,
        }
    }
}

impl ReviewRecord {
    /// True until the first review took place.
    pub fn is_unseen(&self) -> bool {
        self.total == 0
    }
}

/// The standard fields every interval algorithm produces, in the order
/// (last_interval, repetitions, ease, failures, mean_quality, total).
#[derive(Debug, PartialEq, Copy, Clone, Deserialize, Serialize)]
pub struct NextInterval {
    pub last_interval: Interval,
    pub repetitions: u32,
    pub ease: Option<f64>,
    pub failures: u32,
    pub mean_quality: Quality,
    pub total: u32,
}

/// Result of a scheduling call, the standard fields plus whatever private state the algorithm
/// carries between calls.
#[derive(Debug, PartialEq, Clone)]
pub struct Scheduled<E> {
    pub next: NextInterval,
    pub extra: E,
}

/// Capability to compute the next interval of an item from its current record.
///
/// Implementations must be pure: everything they depend on is passed in, the returned extra
/// state replaces the stored one verbatim.
pub trait IntervalScheduler: std::fmt::Debug {
    /// Algorithm private state stored next to the record, `()` if there is none.
    type Extra: std::fmt::Debug + Clone + Default;

    /// Quality at or below which a review is failed.
    fn failure_quality(&self) -> Quality {
        DEFAULT_FAILURE_QUALITY
    }

    /// Compute the next standard fields and extra state.
    fn next_interval(
        &self,
        record: &ReviewRecord,
        extra: &Self::Extra,
        quality: Quality,
    ) -> Scheduled<Self::Extra>;
}

/// Something the review pool can select and review.
pub trait Reviewable: std::fmt::Debug {
    /// Record a review and return the algorithm's result.
    fn learn(&mut self, quality: Quality) -> NextInterval;

    /// The current review state.
    fn record(&self) -> &ReviewRecord;

    /// Quality at or below which a review is failed.
    fn failure_quality(&self) -> Quality;
}
