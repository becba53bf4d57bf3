//! # Introduction
//!
//! srcspell walks every translation unit of a C/C++ project and reports the
//! text a spell checker should look at: the names of entities a unit defines,
//! its comments, and its string literals, each with the file, line and column
//! it appears at.
//!
//! ## Pipeline
//!
//! ```text
//! compile_commands.json → Tasks → Front end → Unit → Inspector → Sink
//! ```
//!
//! 1. [`project`]: loads the compilation database and runs one inspection
//!    per unit, skipping units that fail to parse.
//! 2. [`parser`]: the front end. Expands includes, tokenizes without losing
//!    comments, and builds a tree of declarations with definition flags.
//! 3. [`inspect`]: the definition pass over the tree and the lexical pass over
//!    the main file's tokens, feeding a per-unit [`inspect::ObservationEngine`].
//! 4. [`config`]: run settings shared by the layers above.
//!
//! ## Output
//!
//! ```text
//! Found definition for <name> in <file>:<line>:<column>
//! Found comment: <text> at <file>:<line>:<column>
//! Found literal: <text> at <file>:<line>:<column>
//! ```
//!
//! Definitions are reported once per unit, at their first occurrence in
//! pre-order; definitions outside the unit's main file are never reported.

pub mod config;
pub mod inspect;
pub mod parser;
pub mod project;
