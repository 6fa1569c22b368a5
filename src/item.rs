use crate::algorithm::{AlgorithmParams, OfMatrix, Simple8, Sm2, Sm5};
use crate::traits::*;
use serde::{Deserialize, Serialize};

/// A single item under review, its record advanced by scheduler `S`.
#[derive(Debug, Clone)]
pub struct LearningItem<S: IntervalScheduler> {
    scheduler: S,
    record: ReviewRecord,
    extra: S::Extra,
}

pub type Sm2Item = LearningItem<Sm2>;
pub type Sm5Item = LearningItem<Sm5>;
pub type Simple8Item = LearningItem<Simple8>;

impl<S: IntervalScheduler + Default> Default for LearningItem<S> {
    fn default() -> Self {
        LearningItem::new(S::default())
    }
}

impl<S: IntervalScheduler> LearningItem<S> {
    /// Create an unseen item.
    pub fn new(scheduler: S) -> Self {
        Self::with_record(scheduler, Default::default())
    }

    /// Create an item resuming from an earlier record.
    pub fn with_record(scheduler: S, record: ReviewRecord) -> Self {
        Self::with_state(scheduler, record, Default::default())
    }

    /// Create an item resuming from an earlier record and algorithm state.
    pub fn with_state(scheduler: S, record: ReviewRecord, extra: S::Extra) -> Self {
        LearningItem {
            scheduler,
            record,
            extra,
        }
    }

    pub fn record(&self) -> &ReviewRecord {
        &self.record
    }

    /// The algorithm private state, the OF matrix for SM5.
    pub fn extra(&self) -> &S::Extra {
        &self.extra
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Record a review of the given quality and advance the schedule.
    ///
    /// Only the interval, ease and mean quality are taken from the algorithm; the repetition
    /// and failure counters are kept by the item itself, the algorithm's versions are ignored.
    /// Quality is not validated.
    pub fn learn(&mut self, quality: Quality) -> NextInterval {
        let failed = quality <= self.scheduler.failure_quality();
        let Scheduled { next, extra } =
            self.scheduler.next_interval(&self.record, &self.extra, quality);
        self.extra = extra;
        self.record.last_interval = next.last_interval;
        if failed {
            self.record.failures += 1;
        } else {
            self.record.repetitions += 1;
        }
        self.record.ease = next.ease;
        self.record.mean_quality = next.mean_quality;
        self.record.total += 1;
        next
    }
}

impl<S: IntervalScheduler> Reviewable for LearningItem<S> {
    fn learn(&mut self, quality: Quality) -> NextInterval {
        LearningItem::learn(self, quality)
    }

    fn record(&self) -> &ReviewRecord {
        LearningItem::record(self)
    }

    fn failure_quality(&self) -> Quality {
        self.scheduler.failure_quality()
    }
}

/// The interval algorithms available at runtime.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Sm2,
    Sm5,
    Simple8,
}

impl std::str::FromStr for Algorithm {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sm2" => Ok(Algorithm::Sm2),
            "sm5" => Ok(Algorithm::Sm5),
            "simple8" => Ok(Algorithm::Simple8),
            _ => Err(DrillError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Algorithm::Sm2 => "sm2",
            Algorithm::Sm5 => "sm5",
            Algorithm::Simple8 => "simple8",
        };
        write!(f, "{name}")
    }
}

/// An item whose algorithm is picked at runtime.
#[derive(Debug, Clone)]
pub enum AnyItem {
    Sm2(Sm2Item),
    Sm5(Sm5Item),
    Simple8(Simple8Item),
}

impl AnyItem {
    pub fn new(algorithm: Algorithm, params: AlgorithmParams) -> Self {
        Self::with_record(algorithm, params, Default::default())
    }

    /// Resume from a record, the SM5 variant starts with an empty OF matrix.
    pub fn with_record(
        algorithm: Algorithm,
        params: AlgorithmParams,
        record: ReviewRecord,
    ) -> Self {
        match algorithm {
            Algorithm::Sm2 => AnyItem::Sm2(LearningItem::with_record(Sm2 { params }, record)),
            Algorithm::Sm5 => AnyItem::Sm5(LearningItem::with_record(Sm5 { params }, record)),
            Algorithm::Simple8 => {
                AnyItem::Simple8(LearningItem::with_record(Simple8 { params }, record))
            }
        }
    }

    /// Create an item from an algorithm name.
    pub fn from_name(name: &str, params: AlgorithmParams) -> DrillResult<Self> {
        Ok(Self::new(name.parse()?, params))
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            AnyItem::Sm2(_) => Algorithm::Sm2,
            AnyItem::Sm5(_) => Algorithm::Sm5,
            AnyItem::Simple8(_) => Algorithm::Simple8,
        }
    }

    /// The OF matrix, only present for SM5 items.
    pub fn of_matrix(&self) -> Option<&OfMatrix> {
        match self {
            AnyItem::Sm5(item) => Some(item.extra()),
            _ => None,
        }
    }
}

impl Reviewable for AnyItem {
    fn learn(&mut self, quality: Quality) -> NextInterval {
        match self {
            AnyItem::Sm2(item) => item.learn(quality),
            AnyItem::Sm5(item) => item.learn(quality),
            AnyItem::Simple8(item) => item.learn(quality),
        }
    }

    fn record(&self) -> &ReviewRecord {
        match self {
            AnyItem::Sm2(item) => item.record(),
            AnyItem::Sm5(item) => item.record(),
            AnyItem::Simple8(item) => item.record(),
        }
    }

    fn failure_quality(&self) -> Quality {
        match self {
            AnyItem::Sm2(item) => Reviewable::failure_quality(item),
            AnyItem::Sm5(item) => Reviewable::failure_quality(item),
            AnyItem::Simple8(item) => Reviewable::failure_quality(item),
        }
    }
}
