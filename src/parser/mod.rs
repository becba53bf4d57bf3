//! C/C++ front end
//!
//! This module turns one compile task into a parsed translation unit:
//! - [`options`]: Language and include paths from compiler arguments
//! - [`lexer`]: Tokenization (source text → tokens, comments kept)
//! - [`preprocess`]: Include expansion, `#if 0` regions, line markers
//! - [`parse`]: Parsing (tokens → syntax tree of declarations)
//! - [`source_map`]: Files of the unit and presumed locations
//! - [`unit`]: The [`SyntaxUnit`]/[`UnitParser`] interface and its implementation
//! - [`ast`]: Syntax tree and location definitions
//!
//! # Scope
//!
//! The parser recognizes declarations, not expressions:
//! - Namespaces, records, enums, typedefs and aliases, templates
//! - Functions, methods, fields, variables, parameters
//! - Function bodies: nested blocks, local declarations, labels
//! - No macro expansion; unknown constructs are skipped
//!
//! # Parser Implementation
//!
//! Hand-written tolerant recursive descent parser.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod lexer;
pub mod options;
pub mod parse;
pub mod preprocess;
pub mod source_map;
mod statements;
pub mod unit;

pub use ast::{NodeId, SourceLocation, SourcePosition, SourceRange};
pub use lexer::{Token, TokenKind};
pub use parse::{ParseError, ParseResult};
pub use unit::{FrontEnd, SyntaxUnit, TranslationUnit, UnitParser};
