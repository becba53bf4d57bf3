//! Lexical token classification for the comment and literal scan

use crate::parser::{Token, TokenKind};

/// What a piece of source text is, as far as reporting cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Produced from syntax nodes, never by [`classify`]
    DefinitionSite,
    Comment,
    StringLiteral,
    Other,
}

/// A token's class together with its exact source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    pub class: TokenClass,
    pub text: &'a str,
}

/// Classify a raw token. Only plain `"..."` literals count as string
/// literals; prefixed, raw, character and numeric literals are `Other`.
pub fn classify(token: &Token) -> Classified<'_> {
    let class = match token.kind {
        TokenKind::Comment => TokenClass::Comment,
        TokenKind::Literal if token.text.starts_with('"') => TokenClass::StringLiteral,
        _ => TokenClass::Other,
    };

    Classified {
        class,
        text: &token.text,
    }
}
