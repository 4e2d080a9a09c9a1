#![deny(unreachable_pub)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(clippy::clone_on_ref_ptr)]
#![allow(clippy::type_complexity)]

//! The configurable core of a reference-table enrichment operator.
//!
//! A host streaming runtime hands this crate raw tabular text and a set of
//! user-supplied column choices at configuration time; the crate parses the
//! table once, resolves dependent configuration options and the output event
//! schema, and freezes everything into an [`transforms::enrich::Enrich`]
//! transform that joins each incoming event against the table and appends
//! the selected columns.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod enrichment_tables;
pub mod event;
pub mod internal_events;
pub mod schema;
#[cfg(test)]
mod test_util;
pub mod transforms;
pub mod types;

pub use event::{LogEvent, Value};

/// Generic error type for anywhere a component does not care about the
/// concrete failure.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Generic result type based on [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
