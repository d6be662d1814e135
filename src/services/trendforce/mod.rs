//! TrendForce datatrack data source

pub mod client;
pub mod payload;

pub use client::{FetchOptions, TrendForceClient, DEFAULT_BASE_URL};
pub use payload::{parse_date, parse_payload};
