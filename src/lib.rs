//! TrendForce indicator monitor
//!
//! Polls remote indicator series, detects newly published datapoints,
//! computes growth-rate anomaly statistics for single indicators and
//! composite signals, and notifies when thresholds are crossed.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod services;
pub mod signals;
pub mod summary;
