//! Progress reporting for batch assessments.
//!
//! The analytics crate only emits counts and messages; the CLI draws them
//! with `indicatif`, while tests and library callers pass [`NullProgress`].

/// Sink for batch assessment progress.
pub trait ProgressCallback: Send + Sync {
    /// Number of areas the batch will visit.
    fn set_total(&self, total: u64);

    /// `delta` more areas are done.
    fn inc(&self, delta: u64);

    /// Name of the area currently being assessed.
    fn set_message(&self, msg: String);

    /// The batch is over; `msg` summarizes it.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
