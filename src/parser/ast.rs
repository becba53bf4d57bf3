// Syntax tree and source position definitions for the C/C++ front end

use serde::Serialize;
use std::fmt;

/// Index of a node in a [`SyntaxTree`] arena
pub type NodeId = usize;

/// Index of a file in the unit's source map
pub type FileId = usize;

/// Physical source location: file, 1-based line and 1-based byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file: FileId,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: FileId, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// Inclusive range between two locations in the same file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }
}

/// A resolved (presumed) position as a reader of the original text sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Kinds of syntax nodes produced by the declaration parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    Namespace,
    LinkageSpec,
    Struct,
    Union,
    Class,
    Enum,
    EnumConstant,
    Field,
    Function,
    Method,
    Parameter,
    TemplateParameter,
    Variable,
    Typedef,
    TypeAlias,
    Label,
    Block,
}

/// One node of the syntax tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Spelled name; empty for anonymous entities and statements
    pub name: String,
    pub location: SourceLocation,
    pub extent: SourceRange,
    /// True when the node establishes the full meaning of its entity
    pub is_definition: bool,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>, location: SourceLocation) -> Self {
        Node {
            kind,
            name: name.into(),
            location,
            extent: SourceRange::new(location, location),
            is_definition: false,
            children: Vec::new(),
        }
    }

    pub fn definition(mut self) -> Self {
        self.is_definition = true;
        self
    }

    pub fn with_definition(mut self, is_definition: bool) -> Self {
        self.is_definition = is_definition;
        self
    }
}

/// Arena holding every node of one translation unit; node 0 is the root
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        SyntaxTree::default()
    }

    pub const ROOT: NodeId = 0;

    /// Add a node without a parent (only the root should use this directly)
    pub fn add_root(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}
