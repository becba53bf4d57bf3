//! Lexer (tokenizer) for C and C++ source code
//!
//! Converts raw source text into a flat, lossless [`Token`] stream: every
//! comment, literal, identifier, keyword and punctuator keeps its exact source
//! spelling. Preprocessor directives are lexed like ordinary lines; the
//! preprocessor recognizes them through [`Token::starts_line`].
//!
//! The lexer never fails. Malformed input (an unterminated block comment, an
//! unterminated string) produces a token that runs to the end of the file or
//! line, the same way a raw lexer in a compiler front end recovers.

use super::ast::{FileId, SourceLocation};
use super::options::Language;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    /// Numeric, character and string literals, including prefixed forms.
    Literal,
    Identifier,
    Keyword,
    Punctuation,
}

/// A single token with its kind, exact spelling and start location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
    /// True when this is the first token on a logical source line.
    pub starts_line: bool,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
            starts_line: false,
        }
    }

    /// Returns true if this is the punctuator or keyword spelled `text`.
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuation | TokenKind::Keyword) && self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local",
    "__attribute__", "__attribute", "__asm__", "__asm", "asm", "__inline", "__inline__",
    "__restrict", "__restrict__", "__extension__", "__typeof__", "__typeof", "typeof",
    "__const", "__volatile__", "__signed__", "__int128", "__declspec",
];

const CXX_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "bool", "catch", "char8_t", "char16_t", "char32_t", "class", "concept",
    "consteval", "constexpr", "constinit", "const_cast", "co_await", "co_return", "co_yield",
    "decltype", "delete", "dynamic_cast", "explicit", "export", "false", "friend", "mutable",
    "namespace", "new", "noexcept", "nullptr", "operator", "private", "protected", "public",
    "reinterpret_cast", "requires", "static_assert", "static_cast", "template", "this",
    "thread_local", "throw", "true", "try", "typeid", "typename", "using", "virtual", "wchar_t",
];

const PUNCTUATORS_3: &[&str] = &["<<=", ">>=", "...", "->*", "<=>"];

const PUNCTUATORS_2: &[&str] = &[
    "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=", "/=", "%=", "+=", "-=",
    "&=", "|=", "^=", "##", "::", ".*",
];

const ENCODING_PREFIXES: &[&str] = &["L", "u", "U", "u8"];

fn is_keyword(word: &str, language: Language) -> bool {
    C_KEYWORDS.contains(&word) || (language == Language::Cxx && CXX_KEYWORDS.contains(&word))
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$' || (!ch.is_ascii() && ch.is_alphabetic())
}

fn is_identifier_continue(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || (!ch.is_ascii() && ch.is_alphanumeric())
}

/// Lexer for C and C++ source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    file: FileId,
    language: Language,
    at_line_start: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string belonging to `file`.
    pub fn new(input: &str, file: FileId, language: Language) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            file,
            language,
            at_line_start: true,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token());
        }

        tokens
    }

    /// Location just past the last character consumed.
    pub fn end_location(&self) -> SourceLocation {
        self.current_location()
    }

    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        let starts_line = std::mem::replace(&mut self.at_line_start, false);
        let start = self.position;

        let kind = match (self.peek(), self.peek_ahead(1)) {
            (Some('/'), Some('/')) => self.line_comment(),
            (Some('/'), Some('*')) => self.block_comment(),
            (Some('"'), _) => self.quoted('"'),
            (Some('\''), _) => self.quoted('\''),
            (Some(ch), _) if ch.is_ascii_digit() => self.number(),
            (Some('.'), Some(next)) if next.is_ascii_digit() => self.number(),
            (Some(ch), _) if is_identifier_start(ch) => self.identifier_or_literal(),
            _ => self.punctuator(),
        };

        let text: String = self.input[start..self.position].iter().collect();
        let text = match kind {
            TokenKind::Comment => text.trim_end_matches('\r').to_string(),
            _ => text,
        };

        Token {
            kind,
            text,
            location: loc,
            starts_line,
        }
    }

    /// Single-line comment, honoring backslash-newline continuation.
    fn line_comment(&mut self) -> TokenKind {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => break,
                '\\' if self.continues_line(1) => self.skip_line_continuation(),
                _ => {
                    self.advance();
                }
            }
        }
        TokenKind::Comment
    }

    fn block_comment(&mut self) -> TokenKind {
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return TokenKind::Comment;
            }
            self.advance();
        }

        // Unterminated: the comment runs to the end of the file.
        TokenKind::Comment
    }

    /// String or character literal body starting at the opening quote.
    fn quoted(&mut self, quote: char) -> TokenKind {
        self.advance(); // opening quote

        while let Some(ch) = self.peek() {
            match ch {
                '\n' => break,
                '\\' if self.continues_line(1) => self.skip_line_continuation(),
                '\\' => {
                    self.advance();
                    if self.peek().is_some_and(|next| next != '\n') {
                        self.advance();
                    }
                }
                _ if ch == quote => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }

        TokenKind::Literal
    }

    /// Raw string literal `R"delim( ... )delim"`, starting at the opening quote.
    fn raw_string(&mut self) -> TokenKind {
        self.advance(); // '"'

        let mut delimiter = String::new();
        while let Some(ch) = self.peek() {
            if ch == '(' || ch == '\n' || delimiter.len() > 16 {
                break;
            }
            delimiter.push(ch);
            self.advance();
        }

        if self.peek() != Some('(') {
            // Not a valid raw string: finish as an ordinary literal.
            return self.finish_quoted('"');
        }
        self.advance();

        let terminator: Vec<char> = format!("){}\"", delimiter).chars().collect();
        while !self.is_at_end() {
            if self.input[self.position..].starts_with(&terminator) {
                for _ in 0..terminator.len() {
                    self.advance();
                }
                return TokenKind::Literal;
            }
            self.advance();
        }

        TokenKind::Literal
    }

    fn finish_quoted(&mut self, quote: char) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == quote {
                break;
            }
        }
        TokenKind::Literal
    }

    /// Preprocessing number: digits, letters, dots, exponent signs and digit
    /// separators.
    fn number(&mut self) -> TokenKind {
        self.advance();

        while let Some(ch) = self.peek() {
            let previous = self.input[self.position - 1];
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else if (ch == '+' || ch == '-') && matches!(previous, 'e' | 'E' | 'p' | 'P') {
                self.advance();
            } else if ch == '\''
                && self.language == Language::Cxx
                && self.peek_ahead(1).is_some_and(|next| next.is_ascii_alphanumeric())
            {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Literal
    }

    /// Identifier or keyword, or a literal with an encoding prefix (`L"x"`,
    /// `u8'c'`, `R"(raw)"`).
    fn identifier_or_literal(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }

        let word: String = self.input[start..self.position].iter().collect();
        match self.peek() {
            Some('"') if self.language == Language::Cxx && is_raw_prefix(&word) => {
                return self.raw_string();
            }
            Some(quote @ ('"' | '\'')) if ENCODING_PREFIXES.contains(&word.as_str()) => {
                return self.quoted(quote);
            }
            _ => {}
        }

        if is_keyword(&word, self.language) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    /// Longest-match punctuator; unknown characters become single-character
    /// punctuation tokens.
    fn punctuator(&mut self) -> TokenKind {
        let rest = &self.input[self.position..];
        let length = [PUNCTUATORS_3, PUNCTUATORS_2]
            .iter()
            .flat_map(|set| set.iter())
            .find(|p| {
                let chars: Vec<char> = p.chars().collect();
                rest.starts_with(&chars)
            })
            .map(|p| p.chars().count())
            .unwrap_or(1);

        for _ in 0..length {
            self.advance();
        }
        TokenKind::Punctuation
    }

    /// Skip whitespace and escaped newlines, tracking logical line starts.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    self.at_line_start = true;
                    self.advance();
                }
                ' ' | '\t' | '\r' | '\x0b' | '\x0c' => {
                    self.advance();
                }
                '\\' if self.continues_line(1) => self.skip_line_continuation(),
                _ => break,
            }
        }
    }

    /// True when the character `n` ahead starts the newline of a
    /// backslash-newline sequence.
    fn continues_line(&self, n: usize) -> bool {
        match self.peek_ahead(n) {
            Some('\n') => true,
            Some('\r') => self.peek_ahead(n + 1) == Some('\n'),
            _ => false,
        }
    }

    fn skip_line_continuation(&mut self) {
        self.advance(); // '\\'
        if self.peek() == Some('\r') {
            self.advance();
        }
        self.advance(); // '\n'
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            // Columns are byte offsets, as compilers report them
            self.column += ch.len_utf8();
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.file, self.line, self.column)
    }
}

fn is_raw_prefix(word: &str) -> bool {
    matches!(word, "R" | "LR" | "uR" | "UR" | "u8R")
}
