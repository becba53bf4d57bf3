//! Per-unit observation state
//!
//! The engine is the only stateful part of inspection. Definitions are
//! deduplicated by spelling: the first observation of a name is reported and
//! later ones only bump its count. Comments and string literals pass straight
//! through to the sink.

use crate::inspect::report::{Observation, ObservationKind, ReportSink};
use crate::parser::SourcePosition;
use rustc_hash::FxHashMap;

pub struct ObservationEngine<S: ReportSink> {
    occurrences: FxHashMap<String, usize>,
    sink: S,
    reported: usize,
}

impl<S: ReportSink> ObservationEngine<S> {
    pub fn new(sink: S) -> Self {
        ObservationEngine {
            occurrences: FxHashMap::default(),
            sink,
            reported: 0,
        }
    }

    /// Record a definition; reports only the first time `text` is seen.
    pub fn observe_definition(&mut self, text: &str, position: SourcePosition) {
        if let Some(count) = self.occurrences.get_mut(text) {
            *count += 1;
            return;
        }
        self.occurrences.insert(text.to_string(), 1);
        self.emit(ObservationKind::Definition, text, position);
    }

    pub fn observe_string_literal(&mut self, text: &str, position: SourcePosition) {
        self.emit(ObservationKind::Literal, text, position);
    }

    pub fn observe_comment(&mut self, text: &str, position: SourcePosition) {
        self.emit(ObservationKind::Comment, text, position);
    }

    /// How many times a definition named `text` has been observed
    pub fn occurrences(&self, text: &str) -> usize {
        self.occurrences.get(text).copied().unwrap_or(0)
    }

    /// Number of observations handed to the sink
    pub fn reported(&self) -> usize {
        self.reported
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, kind: ObservationKind, text: &str, position: SourcePosition) {
        self.reported += 1;
        self.sink.report(Observation::new(kind, text, position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::report::CollectingSink;

    fn at(line: usize) -> SourcePosition {
        SourcePosition::new("/p/a.c", line, 1)
    }

    #[test]
    fn test_definition_reported_once() {
        let mut engine = ObservationEngine::new(CollectingSink::new());
        engine.observe_definition("foo", at(3));
        engine.observe_definition("foo", at(10));
        engine.observe_definition("foo", at(12));

        assert_eq!(engine.occurrences("foo"), 3);
        assert_eq!(engine.reported(), 1);
        assert_eq!(engine.sink().lines(), ["Found definition for foo in /p/a.c:3:1"]);
    }

    #[test]
    fn test_distinct_definitions() {
        let mut engine = ObservationEngine::new(CollectingSink::new());
        for name in ["alpha", "beta", "alpha", "gamma", "beta"] {
            engine.observe_definition(name, at(1));
        }

        let sink = engine.into_sink();
        let texts: Vec<&str> = sink.observations.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_comments_and_literals_always_pass_through() {
        let mut engine = ObservationEngine::new(CollectingSink::new());
        engine.observe_comment("// same", at(1));
        engine.observe_comment("// same", at(1));
        engine.observe_string_literal("\"same\"", at(2));
        engine.observe_string_literal("\"same\"", at(2));

        assert_eq!(engine.reported(), 4);
        assert_eq!(engine.occurrences("// same"), 0);
        assert_eq!(engine.occurrences("\"same\""), 0);
    }

    #[test]
    fn test_engines_are_independent() {
        let mut first = ObservationEngine::new(CollectingSink::new());
        let mut second = ObservationEngine::new(CollectingSink::new());
        first.observe_definition("shared", at(1));
        second.observe_definition("shared", at(5));

        assert_eq!(first.sink().len(), 1);
        assert_eq!(second.sink().len(), 1);
        assert_eq!(second.occurrences("shared"), 1);
    }

    #[test]
    fn test_empty_text_is_accepted() {
        let mut engine = ObservationEngine::new(CollectingSink::new());
        engine.observe_definition("", at(1));
        engine.observe_definition("", at(2));

        assert_eq!(engine.occurrences(""), 2);
        assert_eq!(engine.reported(), 1);
    }
}
