//! Parsed translation units and the interface the inspector consumes
//!
//! [`UnitParser`] turns a [`CompileUnitTask`] into something implementing
//! [`SyntaxUnit`]: a read-only view of one unit's syntax tree, token stream
//! and source map. [`FrontEnd`] and [`TranslationUnit`] are the concrete
//! implementations built on this crate's preprocessor and parser.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::options::UnitOptions;
use crate::parser::parse::{ParseError, ParseResult, Parser};
use crate::parser::preprocess::{HeaderSearch, Preprocessor};
use crate::parser::source_map::SourceMap;
use crate::project::CompileUnitTask;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of one parsed translation unit
pub trait SyntaxUnit {
    fn root(&self) -> NodeId;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn is_definition(&self, node: NodeId) -> bool;
    /// Spelled name of the node; empty when it has none
    fn spelling(&self, node: NodeId) -> &str;
    fn location(&self, node: NodeId) -> SourceLocation;
    fn extent(&self, node: NodeId) -> SourceRange;
    /// File, line and column after `#line` and line-marker adjustment
    fn presumed_location(&self, location: SourceLocation) -> SourcePosition;
    fn is_in_system_header(&self, location: SourceLocation) -> bool;
    fn is_from_main_file(&self, location: SourceLocation) -> bool;
    /// Main-file tokens, comments included, lying inside `range` in
    /// position order
    fn tokenize(&self, range: SourceRange) -> &[Token];
}

/// Produces a [`SyntaxUnit`] for each compile task
pub trait UnitParser {
    type Unit: SyntaxUnit;

    fn parse(&self, task: &CompileUnitTask) -> ParseResult<Self::Unit>;
}

/// The main file of every unit is registered first
const MAIN_FILE: FileId = 0;

/// A fully parsed unit owning its tree, tokens and source map
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    tree: SyntaxTree,
    source_map: SourceMap,
    tokens: Vec<Token>,
}

impl TranslationUnit {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }
}

impl SyntaxUnit for TranslationUnit {
    fn root(&self) -> NodeId {
        SyntaxTree::ROOT
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.tree.get(node).children
    }

    fn is_definition(&self, node: NodeId) -> bool {
        self.tree.get(node).is_definition
    }

    fn spelling(&self, node: NodeId) -> &str {
        &self.tree.get(node).name
    }

    fn location(&self, node: NodeId) -> SourceLocation {
        self.tree.get(node).location
    }

    fn extent(&self, node: NodeId) -> SourceRange {
        self.tree.get(node).extent
    }

    fn presumed_location(&self, location: SourceLocation) -> SourcePosition {
        self.source_map.presumed(location)
    }

    fn is_in_system_header(&self, location: SourceLocation) -> bool {
        self.source_map.is_system(location)
    }

    fn is_from_main_file(&self, location: SourceLocation) -> bool {
        location.file == MAIN_FILE
    }

    fn tokenize(&self, range: SourceRange) -> &[Token] {
        if range.start.file != MAIN_FILE || range.end.file != MAIN_FILE {
            return &[];
        }
        let start = self.tokens.partition_point(|t| t.location < range.start);
        let end = self.tokens.partition_point(|t| t.location <= range.end);
        &self.tokens[start..end.max(start)]
    }
}

/// Parses compile tasks from disk
#[derive(Debug, Clone, Default)]
pub struct FrontEnd {
    standard_dirs: Vec<PathBuf>,
}

impl FrontEnd {
    /// `standard_dirs` are the toolchain header directories searched unless
    /// a unit passes `-nostdinc`.
    pub fn new(standard_dirs: Vec<PathBuf>) -> Self {
        FrontEnd { standard_dirs }
    }

    /// Parse source text already in memory.
    pub fn parse_source(&self, path: &Path, text: &str, options: &UnitOptions) -> TranslationUnit {
        let search = HeaderSearch::new(options, &self.standard_dirs);
        let preprocessed = Preprocessor::new(&search, options.language).run(path, text);

        let start = SourceLocation::new(MAIN_FILE, 1, 1);
        let end = preprocessed.main_end.max(start);
        let root_name = path.to_string_lossy();
        let tree = Parser::new(preprocessed.syntax_tokens, options.language)
            .parse_translation_unit(&root_name, SourceRange::new(start, end));

        debug!(
            "parsed {}: {} files, {} nodes",
            path.display(),
            preprocessed.source_map.len(),
            tree.len()
        );

        TranslationUnit {
            tree,
            source_map: preprocessed.source_map,
            tokens: preprocessed.main_tokens,
        }
    }
}

impl UnitParser for FrontEnd {
    type Unit = TranslationUnit;

    fn parse(&self, task: &CompileUnitTask) -> ParseResult<TranslationUnit> {
        let bytes = fs::read(&task.file).map_err(|source| ParseError::Io {
            path: task.file.clone(),
            source,
        })?;
        // Invalid UTF-8 (Latin-1 comments and the like) decodes lossily
        let text = String::from_utf8_lossy(&bytes);

        let options = UnitOptions::from_task(task);
        Ok(self.parse_source(&task.file, &text, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> TranslationUnit {
        FrontEnd::new(Vec::new()).parse_source(Path::new("/src/main.c"), text, &UnitOptions::default())
    }

    #[test]
    fn test_root_spans_main_file() {
        let unit = parse("int a;\n/* end */\n");
        let root = unit.root();

        assert_eq!(unit.spelling(root), "/src/main.c");
        assert!(!unit.is_definition(root));
        assert_eq!(unit.extent(root).start, SourceLocation::new(0, 1, 1));

        let texts: Vec<&str> = unit.tokenize(unit.extent(root)).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["int", "a", ";", "/* end */"]);
    }

    #[test]
    fn test_tokenize_subrange() {
        let unit = parse("int a;\nint b;\nint c;\n");
        let range = SourceRange::new(SourceLocation::new(0, 2, 1), SourceLocation::new(0, 2, 6));
        let texts: Vec<&str> = unit.tokenize(range).iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts, ["int", "b", ";"]);
        let foreign = SourceRange::new(SourceLocation::new(1, 1, 1), SourceLocation::new(1, 9, 1));
        assert!(unit.tokenize(foreign).is_empty());
    }

    #[test]
    fn test_definitions_carry_main_file_locations() {
        let unit = parse("static int counter;\nint main(void) { return counter; }\n");
        let tree = unit.tree();
        let names: Vec<(&str, bool)> = tree
            .iter()
            .skip(1)
            .filter(|n| n.kind != NodeKind::Block)
            .map(|n| (n.name.as_str(), n.is_definition))
            .collect();

        assert_eq!(names, [("counter", true), ("main", true)]);
        let main = tree.get(tree.get(unit.root()).children[1]);
        assert!(unit.is_from_main_file(main.location));
        assert!(!unit.is_in_system_header(main.location));
        assert_eq!(unit.presumed_location(main.location).to_string(), "/src/main.c:2:5");
    }

    #[test]
    fn test_parse_task_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sys")).unwrap();
        std::fs::write(dir.path().join("sys/lib.h"), "int lib_value;\n").unwrap();
        let main = dir.path().join("main.c");
        std::fs::write(&main, "#include <lib.h>\nint local_value;\n").unwrap();

        let task = CompileUnitTask::new(&main, vec!["-isystem".to_string(), "sys".to_string()], dir.path());
        let unit = FrontEnd::default().parse(&task).unwrap();
        let tree = unit.tree();
        let lib = tree.iter().find(|n| n.name == "lib_value").unwrap();
        let local = tree.iter().find(|n| n.name == "local_value").unwrap();

        assert!(unit.is_in_system_header(lib.location));
        assert!(!unit.is_from_main_file(lib.location));
        assert!(unit.is_from_main_file(local.location));
        assert_eq!(unit.presumed_location(local.location).line, 2);
    }

    #[test]
    fn test_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = CompileUnitTask::new(dir.path().join("gone.c"), Vec::new(), dir.path());
        assert!(matches!(FrontEnd::default().parse(&missing), Err(ParseError::Io { .. })));
    }

    #[test]
    fn test_latin1_main_file_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("legacy.c");
        let mut file = std::fs::File::create(&legacy).unwrap();
        file.write_all(b"/* caf\xE9 */\nint counter;\nchar *s = \"hello\";\n").unwrap();

        let task = CompileUnitTask::new(&legacy, Vec::new(), dir.path());
        let unit = FrontEnd::default().parse(&task).unwrap();
        let root = unit.root();
        let texts: Vec<&str> = unit.tokenize(unit.extent(root)).iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts[0], "/* caf\u{FFFD} */");
        assert!(texts.contains(&"\"hello\""));
        let counter = unit.tree().iter().find(|n| n.name == "counter").unwrap();
        assert!(counter.is_definition);
        assert_eq!(unit.presumed_location(counter.location).line, 2);
    }
}
