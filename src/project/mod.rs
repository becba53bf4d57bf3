//! Project-level plumbing: the build description and the per-unit loop
//!
//! - [`compdb`]: `compile_commands.json` → [`CompileUnitTask`]s
//! - [`orchestrator`]: parse and inspect each task in order
//! - [`error`]: failures that stop a run

pub mod compdb;
pub mod error;
pub mod orchestrator;

pub use compdb::{CompilationDatabase, CompileCommand, CompileUnitTask};
pub use error::{ProjectError, ProjectResult};
pub use orchestrator::{Orchestrator, RunSummary};
