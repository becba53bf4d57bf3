//! Two-pass traversal of one parsed unit
//!
//! Pass A walks the syntax tree in pre-order and reports first-seen
//! definitions located in the unit's main file. Pass B re-tokenizes the main
//! file and reports comments and string literals. Pass B only filters out
//! system-header tokens; it does not apply the main-file check of Pass A.

use crate::inspect::engine::ObservationEngine;
use crate::inspect::location::is_in_scope;
use crate::inspect::report::ReportSink;
use crate::inspect::token::{classify, TokenClass};
use crate::parser::SyntaxUnit;

pub struct UnitDriver<'u, U: SyntaxUnit + ?Sized, S: ReportSink> {
    unit: &'u U,
    engine: ObservationEngine<S>,
}

impl<'u, U: SyntaxUnit + ?Sized, S: ReportSink> UnitDriver<'u, U, S> {
    pub fn new(unit: &'u U, sink: S) -> Self {
        UnitDriver {
            unit,
            engine: ObservationEngine::new(sink),
        }
    }

    /// Pass A: parent before children, children in order, no pruning.
    pub fn collect_definitions(&mut self) {
        let unit = self.unit;
        let mut work = vec![unit.root()];

        while let Some(node) = work.pop() {
            work.extend(unit.children(node).iter().rev());

            if !unit.is_definition(node) {
                continue;
            }
            let location = unit.location(node);
            if !is_in_scope(location, unit) {
                continue;
            }
            let name = unit.spelling(node);
            if name.is_empty() {
                continue;
            }
            self.engine
                .observe_definition(name, unit.presumed_location(location));
        }
    }

    /// Pass B: comments and plain string literals over the whole main file.
    pub fn scan_tokens(&mut self) {
        let unit = self.unit;

        for token in unit.tokenize(unit.extent(unit.root())) {
            if unit.is_in_system_header(token.location) {
                continue;
            }
            let classified = classify(token);
            if classified.text.is_empty() {
                continue;
            }

            let position = unit.presumed_location(token.location);
            match classified.class {
                TokenClass::Comment => self.engine.observe_comment(classified.text, position),
                TokenClass::StringLiteral => {
                    self.engine.observe_string_literal(classified.text, position)
                }
                TokenClass::DefinitionSite | TokenClass::Other => {}
            }
        }
    }

    pub fn finish(self) -> ObservationEngine<S> {
        self.engine
    }
}

/// Run both passes over `unit`, reporting into `sink`.
pub fn inspect_unit<U: SyntaxUnit + ?Sized, S: ReportSink>(unit: &U, sink: S) -> ObservationEngine<S> {
    let mut driver = UnitDriver::new(unit, sink);
    driver.collect_definitions();
    driver.scan_tokens();
    driver.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::report::{CollectingSink, ObservationKind};
    use crate::inspect::testing::FakeUnit;
    use crate::parser::options::{Language, UnitOptions};
    use crate::parser::{FrontEnd, SourceLocation, TokenKind};
    use std::path::Path;

    fn loc(file: usize, line: usize, column: usize) -> SourceLocation {
        SourceLocation::new(file, line, column)
    }

    #[test]
    fn test_same_name_twice_reports_first() {
        let mut unit = FakeUnit::new("/p/a.cpp");
        unit.add_node(0, "foo", loc(0, 3, 6), true);
        unit.add_node(0, "foo", loc(0, 10, 6), true);

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(engine.sink().lines(), ["Found definition for foo in /p/a.cpp:3:6"]);
        assert_eq!(engine.occurrences("foo"), 2);
    }

    #[test]
    fn test_preorder_decides_first_occurrence() {
        let mut unit = FakeUnit::new("/p/a.c");
        let outer = unit.add_node(0, "outer", loc(0, 5, 1), false);
        unit.add_node(outer, "x", loc(0, 6, 9), true);
        unit.add_node(0, "x", loc(0, 2, 5), true);

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(engine.sink().lines(), ["Found definition for x in /p/a.c:6:9"]);
    }

    #[test]
    fn test_system_header_definition_is_filtered() {
        let mut unit = FakeUnit::new("/p/a.c");
        let header = unit.add_file("/usr/include/lib.h", true);
        unit.add_node(0, "bar", loc(header, 4, 5), true);
        unit.add_node(0, "mine", loc(0, 1, 5), true);

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(engine.sink().lines(), ["Found definition for mine in /p/a.c:1:5"]);
        assert_eq!(engine.occurrences("bar"), 0);
    }

    #[test]
    fn test_declarations_and_empty_names_are_skipped() {
        let mut unit = FakeUnit::new("/p/a.c");
        let declared = unit.add_node(0, "proto", loc(0, 1, 5), false);
        unit.add_node(declared, "param", loc(0, 1, 15), true);
        unit.add_node(0, "", loc(0, 3, 1), true);

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(engine.sink().lines(), ["Found definition for param in /p/a.c:1:15"]);
        assert_eq!(engine.occurrences(""), 0);
    }

    #[test]
    fn test_comment_and_literal_scan() {
        let mut unit = FakeUnit::new("/p/a.c");
        unit.add_token(TokenKind::Comment, "// hello", loc(0, 1, 1));
        unit.add_token(TokenKind::Keyword, "char", loc(0, 2, 1));
        unit.add_token(TokenKind::Literal, "\"hi\"", loc(0, 2, 12));
        unit.add_token(TokenKind::Literal, "'c'", loc(0, 3, 9));
        unit.add_token(TokenKind::Literal, "L\"wide\"", loc(0, 4, 9));
        unit.add_token(TokenKind::Comment, "", loc(0, 5, 1));

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(
            engine.sink().lines(),
            [
                "Found comment: // hello at /p/a.c:1:1",
                "Found literal: \"hi\" at /p/a.c:2:12",
            ]
        );
    }

    #[test]
    fn test_lexical_scan_skips_only_system_headers() {
        // An unresolvable main file hides definitions but not comments.
        let mut unit = FakeUnit::new("");
        unit.add_node(0, "hidden", loc(0, 1, 5), true);
        unit.add_token(TokenKind::Comment, "/* kept */", loc(0, 2, 1));

        let sink = inspect_unit(&unit, CollectingSink::new()).into_sink();
        assert_eq!(sink.of_kind(ObservationKind::Definition).count(), 0);
        assert_eq!(sink.lines(), ["Found comment: /* kept */ at :2:1"]);

        let mut unit = FakeUnit::new("/p/gen.c");
        unit.mark_system(0);
        unit.add_token(TokenKind::Comment, "// system", loc(0, 1, 1));
        assert!(inspect_unit(&unit, CollectingSink::new()).sink().is_empty());
    }

    #[test]
    fn test_front_end_unit() {
        let source = "\
// greeting
static const char *greeting = \"hello\";
int foo(int count) { return count; }
# 1 \"/usr/include/vendor.h\" 1 3
int bar;
/* vendor comment */
# 6 \"/p/main.c\" 2
int foo(double count);
";
        let options = UnitOptions {
            language: Language::Cxx,
            ..UnitOptions::default()
        };
        let unit = FrontEnd::new(Vec::new()).parse_source(Path::new("/p/main.c"), source, &options);

        let engine = inspect_unit(&unit, CollectingSink::new());

        assert_eq!(
            engine.sink().lines(),
            [
                "Found definition for greeting in /p/main.c:2:20",
                "Found definition for foo in /p/main.c:3:5",
                "Found definition for count in /p/main.c:3:13",
                "Found comment: // greeting at /p/main.c:1:1",
                "Found literal: \"hello\" at /p/main.c:2:31",
                "Found literal: \"/usr/include/vendor.h\" at /p/main.c:4:5",
            ]
        );
        assert_eq!(engine.occurrences("count"), 2);
        assert_eq!(engine.occurrences("bar"), 0);
    }
}
