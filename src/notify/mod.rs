//! Alert rendering and delivery

pub mod dispatcher;
pub mod format;
pub mod notifier;

pub use dispatcher::{AlertDispatcher, DispatchReport};
pub use format::{format_alert, format_signal_line, format_update_line};
pub use notifier::{Notifier, PushoverNotifier, RecordingNotifier, PUSHOVER_ENDPOINT};
