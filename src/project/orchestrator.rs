//! Sequential processing of every unit in a build description

use crate::config::Config;
use crate::inspect::{inspect_unit, ReportSink};
use crate::parser::UnitParser;
use crate::project::compdb::CompileUnitTask;
use tracing::{debug, info, warn};

/// Counts from one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    /// Units that failed to parse
    pub skipped: usize,
    /// Units excluded by the configured filter
    pub filtered: usize,
    pub observations: usize,
}

/// Drives one inspection per task. Each unit gets its own engine; nothing
/// carries over from one unit to the next.
pub struct Orchestrator<'a, P: UnitParser> {
    parser: P,
    config: &'a Config,
}

impl<'a, P: UnitParser> Orchestrator<'a, P> {
    pub fn new(parser: P, config: &'a Config) -> Self {
        Orchestrator { parser, config }
    }

    pub fn run<S: ReportSink>(&self, tasks: &[CompileUnitTask], sink: &mut S) -> RunSummary {
        let mut summary = RunSummary::default();

        for task in tasks {
            if !self.config.accepts(&task.file) {
                debug!("filtered out {}", task.file.display());
                summary.filtered += 1;
                continue;
            }

            debug!("inspecting {} {:?}", task.file.display(), task.arguments);
            let unit = match self.parser.parse(task) {
                Ok(unit) => unit,
                Err(e) => {
                    warn!("Skipping {}: {}", task.file.display(), e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let engine = inspect_unit(&unit, &mut *sink);
            summary.observations += engine.reported();
            summary.processed += 1;
        }

        info!(
            "Processed {} units ({} skipped, {} filtered), {} observations",
            summary.processed, summary.skipped, summary.filtered, summary.observations
        );
        summary
    }
}
