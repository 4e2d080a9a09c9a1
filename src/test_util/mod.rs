//! Helpers shared by unit tests.

use crate::event::{LogEvent, Value};

/// Builds a log event from top-level key/value pairs.
pub(crate) fn log_event<const N: usize>(fields: [(&str, Value); N]) -> LogEvent {
    let mut event = LogEvent::default();
    for (key, value) in fields {
        event.insert(key, value);
    }
    event
}
