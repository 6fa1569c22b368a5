//! Review scheduling for spaced repetition drills.

// Items are advanced by one of three interval algorithms (SM2, SM5, Simple8), a pool picks the
// next item to review so that weak items surface first without repeating the last one.

/// Main traits and record types
pub mod traits;

/// Interval algorithms.
pub mod algorithm;

/// Items that carry their review record.
pub mod item;

/// Selection of the next item to review.
pub mod pool;

// / Simple implementation to keep review history
pub mod recorder;

/// Session configuration.
pub mod config;

// / Implementor for a drill loop.
pub mod session;
