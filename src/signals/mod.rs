//! Signal evaluation: growth-rate math, per-indicator reconciliation and
//! composite resolution.

pub mod composite;
pub mod engine;
pub mod math;

pub use composite::{CompositeResolution, CompositeResolver};
pub use engine::{IndicatorOutcome, IndicatorParams, OutcomeStatus, SignalEngine, SkippedPoint};
