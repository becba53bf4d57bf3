//! Statement parsing
//!
//! Function bodies are walked statement by statement so that local
//! declarations, labels and nested blocks end up in the tree. Expressions are
//! skipped wholesale. Declarations inside control headers (`for (int i = 0;`,
//! `if (auto p = f())`, `catch (E &e)`) are recognized too.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, Scope};

impl Parser {
    /// Parse `{ ... }` into a `Block` node under `parent`.
    pub(crate) fn parse_compound_statement(&mut self, parent: NodeId) {
        let start = self.position;
        let Some(location) = self.current_location() else {
            return;
        };
        let block = self.tree.add_child(parent, Node::new(NodeKind::Block, "", location));
        self.advance(); // {

        while let Some(token) = self.peek() {
            if token.is("}") {
                break;
            }
            let before = self.position;
            self.parse_statement(block);
            if self.position == before {
                self.advance();
            }
        }

        self.match_token("}");
        self.finish_extent(block, start);
    }

    fn parse_statement(&mut self, parent: NodeId) {
        let Some(token) = self.peek() else {
            return;
        };
        let kind = token.kind;
        let text = token.text.clone();
        let location = token.location;

        match kind {
            TokenKind::Identifier if self.check_ahead(1, ":") => {
                self.advance();
                self.advance();
                self.tree.add_child(parent, Node::new(NodeKind::Label, text, location));
            }
            TokenKind::Punctuation => match text.as_str() {
                "{" => self.parse_compound_statement(parent),
                ";" => {
                    self.advance();
                }
                _ if self.looks_like_declaration() => self.parse_simple_declaration(parent, Scope::Block),
                _ => self.skip_statement(),
            },
            TokenKind::Keyword => self.parse_keyword_statement(parent, &text),
            _ if self.looks_like_declaration() => self.parse_simple_declaration(parent, Scope::Block),
            _ => self.skip_statement(),
        }
    }

    fn parse_keyword_statement(&mut self, parent: NodeId, keyword: &str) {
        match keyword {
            "if" | "while" | "switch" => {
                self.advance();
                self.match_token("constexpr");
                self.parse_control_header(parent);
                self.parse_statement(parent);
                if keyword == "if" && self.match_token("else") {
                    self.parse_statement(parent);
                }
            }
            "for" => {
                self.advance();
                self.parse_control_header(parent);
                self.parse_statement(parent);
            }
            "do" => {
                self.advance();
                self.parse_statement(parent);
                if self.match_token("while") && self.check("(") {
                    self.skip_balanced();
                }
                self.match_token(";");
            }
            "case" => {
                self.advance();
                self.skip_until(&[":"]);
                self.match_token(":");
            }
            "default" => {
                self.advance();
                self.match_token(":");
            }
            "else" => {
                self.advance();
            }
            "try" => {
                self.advance();
                if self.check("{") {
                    self.parse_compound_statement(parent);
                }
                while self.match_token("catch") {
                    self.parse_handler(parent);
                }
            }
            "typedef" | "using" | "namespace" | "template" | "static_assert" | "_Static_assert" => {
                self.parse_declaration(parent, Scope::Block)
            }
            _ if self.looks_like_declaration() => self.parse_simple_declaration(parent, Scope::Block),
            _ => self.skip_statement(),
        }
    }

    /// Parse the parenthesized header of a control statement, recording any
    /// declaration it introduces. Leaves the position after the `)`.
    fn parse_control_header(&mut self, parent: NodeId) {
        if !self.check("(") {
            return;
        }
        let close = self.matching_close();
        self.advance(); // (

        if self.looks_like_declaration() {
            self.parse_simple_declaration(parent, Scope::Block);
        }
        self.position = (close + 1).min(self.tokens.len()).max(self.position);
    }

    /// Parse a `catch (...)` handler; the `catch` keyword has been consumed.
    pub(crate) fn parse_handler(&mut self, parent: NodeId) {
        if self.check("(") {
            let close = self.matching_close();
            self.advance(); // (
            if !self.check("...") {
                self.parse_simple_declaration(parent, Scope::Block);
            }
            self.position = (close + 1).min(self.tokens.len()).max(self.position);
        }
        if self.check("{") {
            self.parse_compound_statement(parent);
        }
    }
}
