//! Unit inspection
//!
//! Turns one parsed unit into a stream of [`Observation`]s:
//! - [`location`]: Which definition sites belong to the unit itself
//! - [`token`]: Comment / string literal / other classification
//! - [`engine`]: Per-unit deduplication of definitions
//! - [`driver`]: The definition pass and the lexical pass
//! - [`report`]: Observation records and sinks

pub mod driver;
pub mod engine;
pub mod location;
pub mod report;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{inspect_unit, UnitDriver};
pub use engine::ObservationEngine;
pub use location::is_in_scope;
pub use report::{CollectingSink, Observation, ObservationKind, ReportSink, WriterSink};
pub use token::{classify, Classified, TokenClass};
