//! Shared data models spanning the engine layers.

pub mod series;
pub mod signal;
pub mod state;

pub use series::{DataPoint, IndicatorId, IndicatorSeries, SeriesMetadata};
pub use signal::{DependencyValue, SignalDefinition, SignalKind, SignalResult, Threshold};
pub use state::{GlobalState, IndicatorState, STATE_VERSION};
