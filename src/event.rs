//! Session events and diagnostics.
//!
//! A session announces each completed transition as a [`SessionEvent`]. The
//! host sees it through the event callback as a name plus a JSON payload:
//!
//! - [`EVENT_SPLIT`] with [`SplitCounts`], e.g. `{"chars":4,"words":2,"lines":1,"masks":2}`
//! - [`EVENT_REVERT`] with `{}`
//!
//! Recoverable failures and markup recovery go to the log callback.

use serde::Serialize;
use std::sync::{Mutex, OnceLock};

/// Name of the event emitted after every completed split pass.
pub const EVENT_SPLIT: &str = "textsplit:split";

/// Name of the event emitted after every completed revert.
pub const EVENT_REVERT: &str = "textsplit:revert";

/// Log level for debug callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Output collection sizes after a split pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
    pub masks: usize,
}

/// A completed session transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Content is split and ready to animate.
    Split(SplitCounts),
    /// Targets are back to their original markup.
    Revert,
}

#[derive(Serialize)]
struct Empty {}

impl SessionEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Split(_) => EVENT_SPLIT,
            Self::Revert => EVENT_REVERT,
        }
    }

    /// JSON payload handed to the event callback.
    #[must_use]
    pub fn payload(&self) -> String {
        let json = match self {
            Self::Split(counts) => serde_json::to_string(counts),
            Self::Revert => serde_json::to_string(&Empty {}),
        };
        json.unwrap_or_else(|_| String::from("{}"))
    }

    /// Deliver this event to the registered callback.
    pub fn emit(&self) {
        emit_event(self.name(), &self.payload());
    }
}

type EventCallback = Box<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn event_callback() -> &'static Mutex<Option<EventCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<EventCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global event callback. It receives an event name and its JSON
/// payload.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    let mut guard = event_callback().lock().expect("event callback lock");
    *guard = Some(Box::new(callback));
}

pub fn clear_event_callback() {
    if let Ok(mut guard) = event_callback().lock() {
        *guard = None;
    }
}

/// Emit a raw event. Sessions go through [`SessionEvent::emit`].
pub fn emit_event(name: &str, data: &str) {
    if let Ok(guard) = event_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(name, data);
        }
    }
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    let mut guard = log_callback().lock().expect("log callback lock");
    *guard = Some(Box::new(callback));
}

pub fn emit_log(level: LogLevel, message: &str) {
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}
