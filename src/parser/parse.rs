//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the front-end error type, helper methods, and the main parse
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a tolerant recursive descent parser over the preprocessed
//! token stream. It recognizes declarations, not expressions:
//! - This module: Parser struct, token helpers, balanced skipping
//! - `declarations`: namespaces, records, enums, typedefs, declarators
//! - `statements`: function bodies, local declarations, control headers
//!
//! Anything the parser does not understand is skipped up to the next `;` or
//! balanced `}`. Every loop makes progress, so parsing always terminates and
//! never fails on token input.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::options::Language;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for producing a translation unit
pub type ParseResult<T> = Result<T, ParseError>;

/// Failure to produce a translation unit at all
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a declaration appears; decides field vs variable and what counts as
/// a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    File,
    Record,
    Block,
}

/// Recursive descent parser for C and C++ declarations
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) tree: SyntaxTree,
    pub(crate) language: Language,
    /// Template parameters waiting for the declaration they belong to
    pub(crate) pending_template: Vec<(String, SourceLocation)>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, language: Language) -> Self {
        Self {
            tokens,
            position: 0,
            tree: SyntaxTree::new(),
            language,
            pending_template: Vec::new(),
        }
    }

    /// Parse every declaration into a tree rooted at a `TranslationUnit`
    /// node named `name` spanning `extent`.
    pub fn parse_translation_unit(mut self, name: &str, extent: SourceRange) -> SyntaxTree {
        let mut root = Node::new(NodeKind::TranslationUnit, name, extent.start);
        root.extent = extent;
        self.tree.add_root(root);

        self.parse_declarations(SyntaxTree::ROOT, Scope::File, false);
        self.tree
    }

    // ===== Helper methods =====

    pub(crate) fn is_cxx(&self) -> bool {
        self.language == Language::Cxx
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn check(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(text))
    }

    pub(crate) fn check_ahead(&self, n: usize, text: &str) -> bool {
        self.peek_ahead(n).is_some_and(|t| t.is(text))
    }

    pub(crate) fn match_token(&mut self, text: &str) -> bool {
        if self.check(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Option<&Token> {
        if self.is_at_end() {
            return None;
        }
        self.position += 1;
        self.tokens.get(self.position - 1)
    }

    pub(crate) fn current_location(&self) -> Option<SourceLocation> {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.location)
    }

    /// Index just past the group opened at `start`, or `start + 1` when
    /// `start` is not an opening bracket.
    pub(crate) fn balanced_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut index = start;

        while let Some(token) = self.tokens.get(index) {
            index += 1;
            if token.kind == TokenKind::Punctuation {
                match token.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            if depth == 0 {
                break;
            }
        }

        index
    }

    /// Consume a bracketed group including its closer.
    pub(crate) fn skip_balanced(&mut self) {
        self.position = self.balanced_end(self.position);
    }

    /// Index of the closer matching the opener at the current position.
    pub(crate) fn matching_close(&self) -> usize {
        self.balanced_end(self.position).saturating_sub(1)
    }

    /// Index just past the `>` closing the template argument list opened at
    /// `start`, or `None` if this `<` does not look like one.
    pub(crate) fn angle_end(&self, start: usize) -> Option<usize> {
        let mut depth = 0i32;
        let mut index = start;

        while let Some(token) = self.tokens.get(index) {
            if token.kind == TokenKind::Punctuation {
                match token.text.as_str() {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    ">>" => depth -= 2,
                    "(" | "[" => {
                        index = self.balanced_end(index);
                        continue;
                    }
                    ";" | "{" | "}" | ")" | "]" | "&&" | "||" => return None,
                    _ => {}
                }
            }
            index += 1;
            if depth <= 0 {
                return Some(index);
            }
        }

        None
    }

    /// Skip a template argument list at the current `<`; consumes only the
    /// `<` when no matching `>` is found.
    pub(crate) fn skip_angle(&mut self) {
        match self.angle_end(self.position) {
            Some(end) => self.position = end,
            None => self.position += 1,
        }
    }

    /// Consume tokens until one of `stops` at nesting depth zero, an
    /// unmatched closing bracket, or the end of input. The stop token is not
    /// consumed.
    pub(crate) fn skip_until(&mut self, stops: &[&str]) {
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Punctuation {
                let text = token.text.as_str();
                if stops.contains(&text) {
                    return;
                }
                match text {
                    "(" | "[" | "{" => {
                        self.skip_balanced();
                        continue;
                    }
                    ")" | "]" | "}" => return,
                    _ => {}
                }
            }
            self.advance();
        }
    }

    /// Skip an expression statement through its `;`.
    pub(crate) fn skip_statement(&mut self) {
        self.skip_until(&[";"]);
        self.match_token(";");
    }

    /// Skip an unrecognized declaration: through `;`, or through a braced
    /// body and an optional trailing `;`.
    pub(crate) fn skip_declaration(&mut self) {
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Punctuation {
                match token.text.as_str() {
                    ";" => {
                        self.advance();
                        return;
                    }
                    "{" => {
                        self.skip_balanced();
                        self.match_token(";");
                        return;
                    }
                    "(" | "[" => {
                        self.skip_balanced();
                        continue;
                    }
                    ")" | "]" | "}" => return,
                    _ => {}
                }
            }
            self.advance();
        }
    }

    /// Skip GNU/MSVC/C++11 attributes and asm labels.
    pub(crate) fn skip_attributes(&mut self) {
        loop {
            if self.check("[") && self.check_ahead(1, "[") {
                self.skip_balanced();
                continue;
            }
            match self.peek() {
                Some(token) if token.kind == TokenKind::Keyword && is_attribute_keyword(&token.text) => {
                    self.advance();
                    if self.check("(") {
                        self.skip_balanced();
                    }
                }
                _ => break,
            }
        }
    }

    /// Add `node` under `parent`, attaching any pending template parameters
    /// to it.
    pub(crate) fn add_node(&mut self, parent: NodeId, node: Node) -> NodeId {
        let takes_template = matches!(
            node.kind,
            NodeKind::Function
                | NodeKind::Method
                | NodeKind::Struct
                | NodeKind::Union
                | NodeKind::Class
                | NodeKind::Variable
                | NodeKind::TypeAlias
        );
        let id = self.tree.add_child(parent, node);

        if takes_template {
            for (name, location) in std::mem::take(&mut self.pending_template) {
                let parameter = Node::new(NodeKind::TemplateParameter, name, location).definition();
                self.tree.add_child(id, parameter);
            }
        }

        id
    }

    /// Set a node's extent from the token at `start` to the last consumed
    /// token.
    pub(crate) fn finish_extent(&mut self, node: NodeId, start: usize) {
        let first = self.tokens.get(start).map(|t| t.location);
        let last = self
            .position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|t| t.location);

        if let (Some(first), Some(last)) = (first, last) {
            if first.file == last.file && first <= last {
                self.tree.get_mut(node).extent = SourceRange::new(first, last);
            }
        }
    }
}

pub(crate) fn is_attribute_keyword(text: &str) -> bool {
    matches!(
        text,
        "__attribute__"
            | "__attribute"
            | "__declspec"
            | "alignas"
            | "_Alignas"
            | "__asm__"
            | "__asm"
            | "asm"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parse(source: &str, language: Language) -> SyntaxTree {
        let tokens: Vec<Token> = Lexer::new(source, 0, language)
            .tokenize()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        let extent = SourceRange::new(SourceLocation::new(0, 1, 1), SourceLocation::new(0, 999, 1));
        Parser::new(tokens, language).parse_translation_unit("test.c", extent)
    }

    /// (kind, name, is_definition) of every node after the root, pre-order.
    fn summary(tree: &SyntaxTree) -> Vec<(NodeKind, String, bool)> {
        let mut out = Vec::new();
        let mut stack = vec![SyntaxTree::ROOT];
        while let Some(id) = stack.pop() {
            let node = tree.get(id);
            if id != SyntaxTree::ROOT && node.kind != NodeKind::Block {
                out.push((node.kind, node.name.clone(), node.is_definition));
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn definitions(source: &str, language: Language) -> Vec<String> {
        summary(&parse(source, language))
            .into_iter()
            .filter(|(_, name, def)| *def && !name.is_empty())
            .map(|(_, name, _)| name)
            .collect()
    }

    #[test]
    fn test_parse_simple_function() {
        let tree = parse("int main() { return 0; }", Language::C);

        assert_eq!(
            summary(&tree),
            vec![(NodeKind::Function, "main".to_string(), true)]
        );
        let function = tree.get(tree.get(SyntaxTree::ROOT).children[0]);
        assert_eq!(function.location, SourceLocation::new(0, 1, 5));
        assert_eq!(tree.get(function.children[0]).kind, NodeKind::Block);
    }

    #[test]
    fn test_prototype_is_not_a_definition() {
        let nodes = summary(&parse("int add(int a, int b);\nint add(int a, int b) { return a + b; }", Language::C));

        assert_eq!(nodes[0], (NodeKind::Function, "add".to_string(), false));
        assert_eq!(nodes[1], (NodeKind::Parameter, "a".to_string(), true));
        assert_eq!(nodes[3], (NodeKind::Function, "add".to_string(), true));
    }

    #[test]
    fn test_parse_struct_and_fields() {
        let nodes = summary(&parse("struct Point { int x; int y : 4; };\nstruct Later;", Language::C));

        assert_eq!(
            nodes,
            vec![
                (NodeKind::Struct, "Point".to_string(), true),
                (NodeKind::Field, "x".to_string(), true),
                (NodeKind::Field, "y".to_string(), true),
                (NodeKind::Struct, "Later".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_variables_and_storage() {
        let defs = definitions(
            "extern int declared;\nextern int defined = 1;\nstatic const char *names[4], **more;\nint (*handler)(int code);",
            Language::C,
        );

        assert_eq!(defs, ["defined", "names", "more", "handler"]);
    }

    #[test]
    fn test_typedefs_and_enums() {
        let defs = definitions(
            "typedef struct { int len; } buffer_t;\ntypedef int (*callback_fn)(void *);\nenum color { RED, GREEN = 2, BLUE };",
            Language::C,
        );

        assert_eq!(defs, ["len", "buffer_t", "callback_fn", "color", "RED", "GREEN", "BLUE"]);
    }

    #[test]
    fn test_function_body_locals_and_labels() {
        let nodes = summary(&parse(
            "void run(void) {\n  int count = 0;\n  size_t total;\n  for (int i = 0; i < 3; i++) { count += i; }\n  call(count);\nretry:\n  if (count) goto retry;\n}",
            Language::C,
        ));
        let defs: Vec<&str> = nodes
            .iter()
            .filter(|(_, _, def)| *def)
            .map(|(_, name, _)| name.as_str())
            .collect();

        assert_eq!(defs, ["run", "count", "total", "i"]);
        assert!(nodes.contains(&(NodeKind::Label, "retry".to_string(), false)));
    }

    #[test]
    fn test_cxx_declarations() {
        let defs = definitions(
            r#"
namespace app::net {
template <typename T, int N = 4>
class Buffer : public Base<T> {
public:
    Buffer() : data_{}, size_(0) {}
    ~Buffer();
    bool operator==(const Buffer &other) const { return size_ == other.size_; }
    static const int kLimit = 8;
private:
    T data_[N];
    int size_;
};
using Bytes = Buffer<char, 16>;
}
extern "C" { int c_entry(void); }
"#,
            Language::Cxx,
        );

        assert_eq!(
            defs,
            [
                "app", "net", "Buffer", "T", "N", "Buffer", "operator==", "other", "data_", "size_",
                "Bytes",
            ]
        );
    }

    #[test]
    fn test_cxx_statements() {
        let defs = definitions(
            "void f(std::vector<int> values) {\n  std::map<int, std::string> names;\n  for (auto &v : values) {}\n  if (auto *p = lookup()) {}\n  try { go(); } catch (const std::exception &e) {}\n  std::cout << values.size();\n}",
            Language::Cxx,
        );

        assert_eq!(defs, ["f", "values", "names", "v", "p", "e"]);
    }

    #[test]
    fn test_recovers_from_unknown_constructs() {
        let defs = definitions(
            "__BEGIN_DECLS\nEXPORT_API int visible(void) { return 1; }\nMACRO_CALL(x)\nint after;\n}\nint last;",
            Language::C,
        );

        assert!(defs.contains(&"visible".to_string()));
        assert!(defs.contains(&"last".to_string()));
    }
}
