//! External collaborators: indicator data sources.

pub mod data_source;
pub mod trendforce;

pub use data_source::{DataSource, StaticDataSource};
pub use trendforce::{FetchOptions, TrendForceClient};
