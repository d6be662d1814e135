//! State persistence

pub mod state_store;

pub use state_store::{load_or_default, InMemoryStateStore, JsonFileStateStore, StateStore};
