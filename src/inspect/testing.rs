// Hand-built syntax unit for driving the inspector without the front end

use crate::parser::ast::FileId;
use crate::parser::{NodeId, SourceLocation, SourcePosition, SourceRange, SyntaxUnit, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub name: String,
    pub location: SourceLocation,
    pub is_definition: bool,
    pub children: Vec<NodeId>,
}

/// File 0 is the main file; node 0 is the root
#[derive(Debug, Clone)]
pub struct FakeUnit {
    files: Vec<(String, bool)>,
    nodes: Vec<FakeNode>,
    tokens: Vec<Token>,
}

impl FakeUnit {
    pub fn new(main_path: &str) -> Self {
        let root = FakeNode {
            name: main_path.to_string(),
            location: SourceLocation::new(0, 1, 1),
            is_definition: false,
            children: Vec::new(),
        };
        FakeUnit {
            files: vec![(main_path.to_string(), false)],
            nodes: vec![root],
            tokens: Vec::new(),
        }
    }

    pub fn add_file(&mut self, path: &str, is_system: bool) -> FileId {
        self.files.push((path.to_string(), is_system));
        self.files.len() - 1
    }

    pub fn mark_system(&mut self, file: FileId) {
        self.files[file].1 = true;
    }

    pub fn add_node(&mut self, parent: NodeId, name: &str, location: SourceLocation, is_definition: bool) -> NodeId {
        self.nodes.push(FakeNode {
            name: name.to_string(),
            location,
            is_definition,
            children: Vec::new(),
        });
        let id = self.nodes.len() - 1;
        self.nodes[parent].children.push(id);
        id
    }

    /// Tokens must be pushed in position order
    pub fn add_token(&mut self, kind: TokenKind, text: &str, location: SourceLocation) {
        self.tokens.push(Token::new(kind, text, location));
    }
}

impl SyntaxUnit for FakeUnit {
    fn root(&self) -> NodeId {
        0
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn is_definition(&self, node: NodeId) -> bool {
        self.nodes[node].is_definition
    }

    fn spelling(&self, node: NodeId) -> &str {
        &self.nodes[node].name
    }

    fn location(&self, node: NodeId) -> SourceLocation {
        self.nodes[node].location
    }

    fn extent(&self, node: NodeId) -> SourceRange {
        let location = self.nodes[node].location;
        if node == 0 {
            SourceRange::new(location, SourceLocation::new(0, usize::MAX, usize::MAX))
        } else {
            SourceRange::new(location, location)
        }
    }

    fn presumed_location(&self, location: SourceLocation) -> SourcePosition {
        let file = self.files.get(location.file).map_or("", |(path, _)| path.as_str());
        SourcePosition::new(file, location.line, location.column)
    }

    fn is_in_system_header(&self, location: SourceLocation) -> bool {
        self.files.get(location.file).is_some_and(|(_, system)| *system)
    }

    fn is_from_main_file(&self, location: SourceLocation) -> bool {
        location.file == 0
    }

    fn tokenize(&self, range: SourceRange) -> &[Token] {
        let start = self.tokens.partition_point(|t| t.location < range.start);
        let end = self.tokens.partition_point(|t| t.location <= range.end);
        &self.tokens[start..end.max(start)]
    }
}
