//! Core application primitives (run orchestration)

pub mod runtime;

pub use runtime::*;
