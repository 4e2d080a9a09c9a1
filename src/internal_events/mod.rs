//! Structured events emitted while the operator runs. Each event logs with
//! stable error codes and increments the matching component error counter.

mod enrich;

pub use enrich::{EnrichCoercionFailed, EnrichFieldMissing};

/// An event worth surfacing to operators, as a log line and metrics.
pub trait InternalEvent {
    /// Emit the event.
    fn emit(self);
}

/// Emit the given internal event.
pub fn emit(event: impl InternalEvent) {
    event.emit();
}
