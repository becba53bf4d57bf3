//! Directive handling: include expansion, `#if 0` regions and line markers
//!
//! The preprocessor splices included headers into the syntax token stream so
//! the declaration parser sees every declaration a unit pulls in, each token
//! still tagged with the file it came from. It deliberately stops short of a
//! full C preprocessor:
//!
//! - macros are never expanded (`#define`/`#undef` are dropped);
//! - conditionals are treated as live unless their condition is the literal
//!   `0`/`false` (or the `#else` of a literal `1`/`true`);
//! - every file is expanded at most once per unit, which stands in for
//!   include guards and `#pragma once`.

use super::ast::{FileId, SourceLocation};
use super::lexer::{Lexer, Token, TokenKind};
use super::options::{Language, UnitOptions};
use super::source_map::{LineMarker, SourceFile, SourceMap};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// System header directories searched unless `-nostdinc` is given
pub const DEFAULT_SYSTEM_DIRS: &[&str] = &["/usr/include", "/usr/local/include"];

/// Ordered include search paths for one unit
#[derive(Debug, Clone, Default)]
pub struct HeaderSearch {
    quote_dirs: Vec<PathBuf>,
    user_dirs: Vec<PathBuf>,
    system_dirs: Vec<PathBuf>,
}

impl HeaderSearch {
    /// `standard_dirs` are the toolchain directories, dropped by `-nostdinc`.
    pub fn new(options: &UnitOptions, standard_dirs: &[PathBuf]) -> Self {
        let mut system_dirs = options.system_dirs.clone();
        if options.use_default_system_dirs {
            system_dirs.extend(standard_dirs.iter().cloned());
        }

        HeaderSearch {
            quote_dirs: options.quote_dirs.clone(),
            user_dirs: options.user_dirs.clone(),
            system_dirs,
        }
    }

    /// Find a header. Returns its path and whether it counts as a system
    /// header.
    pub fn resolve(
        &self,
        name: &str,
        angled: bool,
        includer: &Path,
        includer_is_system: bool,
    ) -> Option<(PathBuf, bool)> {
        let header = Path::new(name);
        if header.is_absolute() {
            return header
                .is_file()
                .then(|| (header.to_path_buf(), includer_is_system));
        }

        if !angled {
            if let Some(candidate) = includer.parent().map(|dir| dir.join(header)) {
                if candidate.is_file() {
                    return Some((candidate, includer_is_system));
                }
            }
            if let Some(found) = find_in(&self.quote_dirs, header) {
                return Some((found, includer_is_system));
            }
        }

        if let Some(found) = find_in(&self.user_dirs, header) {
            return Some((found, includer_is_system));
        }

        find_in(&self.system_dirs, header).map(|found| (found, true))
    }
}

fn find_in(dirs: &[PathBuf], header: &Path) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(header))
        .find(|candidate| candidate.is_file())
}

/// State of one open conditional block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    /// Tokens are kept. `exclusive` when the condition was literally true,
    /// so a later `#else`/`#elif` is dead.
    Live { exclusive: bool },
    /// Tokens are dropped. `pending` when a later `#else`/`#elif` may
    /// become live.
    Dead { pending: bool },
}

impl Branch {
    fn open(condition: Option<bool>) -> Self {
        match condition {
            Some(false) => Branch::Dead { pending: true },
            Some(true) => Branch::Live { exclusive: true },
            None => Branch::Live { exclusive: false },
        }
    }

    fn alternative(self, condition: Option<bool>) -> Self {
        match self {
            Branch::Dead { pending: true } => Branch::open(condition),
            Branch::Live { exclusive: true } | Branch::Dead { pending: false } => {
                Branch::Dead { pending: false }
            }
            Branch::Live { exclusive: false } => Branch::Live { exclusive: false },
        }
    }
}

fn is_live(branches: &[Branch]) -> bool {
    branches.iter().all(|b| matches!(b, Branch::Live { .. }))
}

/// Value of a conditional whose expression is a single literal.
fn constant_condition(words: &[&Token]) -> Option<bool> {
    match words {
        [word] => match word.text.as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn unquote(text: &str) -> String {
    text.trim_start_matches('"').trim_end_matches('"').to_string()
}

/// Output of preprocessing one unit
#[derive(Debug, Clone)]
pub struct PreprocessedUnit {
    pub source_map: SourceMap,
    /// Every token of the main file, comments and directives included
    pub main_tokens: Vec<Token>,
    /// Non-comment, non-directive tokens of all live regions in inclusion
    /// order
    pub syntax_tokens: Vec<Token>,
    /// Location just past the end of the main file
    pub main_end: SourceLocation,
}

pub struct Preprocessor<'a> {
    search: &'a HeaderSearch,
    language: Language,
    source_map: SourceMap,
    expanded: FxHashSet<PathBuf>,
    syntax_tokens: Vec<Token>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(search: &'a HeaderSearch, language: Language) -> Self {
        Preprocessor {
            search,
            language,
            source_map: SourceMap::new(),
            expanded: FxHashSet::default(),
            syntax_tokens: Vec::new(),
        }
    }

    /// Preprocess the main file `path` whose contents are `text`.
    pub fn run(mut self, path: &Path, text: &str) -> PreprocessedUnit {
        let main = self.source_map.add(SourceFile::new(path, false));
        self.expanded.insert(file_identity(path));

        let mut lexer = Lexer::new(text, main, self.language);
        let main_tokens = lexer.tokenize();
        let main_end = lexer.end_location();

        self.expand(main, &main_tokens);

        PreprocessedUnit {
            source_map: self.source_map,
            main_tokens,
            syntax_tokens: self.syntax_tokens,
            main_end,
        }
    }

    fn expand(&mut self, file: FileId, tokens: &[Token]) {
        let mut branches: Vec<Branch> = Vec::new();
        let mut fresh_line = true;
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            if token.starts_line {
                fresh_line = true;
            }

            if token.kind == TokenKind::Comment {
                index += 1;
                continue;
            }

            if fresh_line && token.is("#") {
                let end = tokens[index + 1..]
                    .iter()
                    .position(|t| t.starts_line)
                    .map_or(tokens.len(), |offset| index + 1 + offset);
                let words: Vec<&Token> = tokens[index + 1..end]
                    .iter()
                    .filter(|t| t.kind != TokenKind::Comment)
                    .collect();

                self.directive(file, token, &words, &mut branches);
                index = end;
                continue;
            }

            fresh_line = false;
            if is_live(&branches) {
                self.syntax_tokens.push(token.clone());
            }
            index += 1;
        }
    }

    fn directive(&mut self, file: FileId, hash: &Token, words: &[&Token], branches: &mut Vec<Branch>) {
        let Some(name) = words.first() else {
            return;
        };
        let live = is_live(branches);
        let rest = &words[1..];

        match name.text.as_str() {
            "if" => branches.push(if live {
                Branch::open(constant_condition(rest))
            } else {
                Branch::Dead { pending: false }
            }),
            "ifdef" | "ifndef" => branches.push(if live {
                Branch::Live { exclusive: false }
            } else {
                Branch::Dead { pending: false }
            }),
            "elif" | "elifdef" | "elifndef" | "else" => {
                let condition = if name.text == "elif" {
                    constant_condition(rest)
                } else if name.text == "else" {
                    Some(true)
                } else {
                    None
                };
                if let Some(top) = branches.last_mut() {
                    *top = top.alternative(condition);
                }
            }
            "endif" => {
                branches.pop();
            }
            _ if !live => {}
            "include" | "include_next" | "import" => self.include(file, rest),
            "line" => self.line_marker(file, hash, rest, false),
            _ if name.kind == TokenKind::Literal => self.line_marker(file, hash, words, true),
            _ => {}
        }
    }

    fn include(&mut self, includer: FileId, words: &[&Token]) {
        let Some((header, angled)) = header_name(words) else {
            debug!("skipping computed #include");
            return;
        };
        let Some(includer_file) = self.source_map.file(includer) else {
            return;
        };
        let includer_path = includer_file.path.clone();

        let Some((path, is_system)) =
            self.search
                .resolve(&header, angled, &includer_path, includer_file.is_system)
        else {
            debug!(header = %header, includer = %includer_path.display(), "include not found");
            return;
        };

        if !self.expanded.insert(file_identity(&path)) {
            return;
        }

        let text = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cannot read header");
                return;
            }
        };

        let id = self.source_map.add(SourceFile::new(path, is_system));
        let tokens = Lexer::new(&text, id, self.language).tokenize();
        self.expand(id, &tokens);
    }

    /// `#line N "file"` or GNU `# N "file" flags...`
    fn line_marker(&mut self, file: FileId, hash: &Token, words: &[&Token], gnu: bool) {
        let Some(presumed_line) = words.first().and_then(|t| t.text.parse::<usize>().ok()) else {
            return;
        };
        let presumed_file = words
            .get(1)
            .filter(|t| t.kind == TokenKind::Literal && t.text.starts_with('"'))
            .map(|t| unquote(&t.text));
        let system = gnu.then(|| words.iter().skip(2).any(|t| t.text == "3"));
        let physical_line = words.last().map_or(hash.location.line, |t| t.location.line);

        if let Some(source) = self.source_map.file_mut(file) {
            source.markers.push(LineMarker {
                physical_line,
                presumed_line,
                presumed_file,
                system,
            });
        }
    }
}

/// `"name"` or `<name>` from the words following `#include`.
fn header_name(words: &[&Token]) -> Option<(String, bool)> {
    let first = words.first()?;
    if first.kind == TokenKind::Literal && first.text.starts_with('"') {
        return Some((unquote(&first.text), false));
    }
    if first.is("<") {
        let name: String = words[1..]
            .iter()
            .take_while(|t| !t.is(">"))
            .map(|t| t.text.as_str())
            .collect();
        return (!name.is_empty()).then_some((name, true));
    }
    None
}

fn file_identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
