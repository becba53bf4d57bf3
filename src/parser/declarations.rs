//! Declaration parsing
//!
//! This module handles parsing of everything that can appear at namespace or
//! record scope:
//! - Namespaces (including `A::B` nesting) and `extern "C"` blocks
//! - Templates, whose parameters attach to the next declared entity
//! - `using` aliases and `typedef`s
//! - Struct, union, class and enum specifiers, with or without bodies
//! - Simple declarations: variables, fields, functions and methods
//!
//! Declarators are scanned rather than fully parsed. The declared name is the
//! last identifier seen before the first terminator, and the first parameter
//! list after it makes the declaration a function.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{is_attribute_keyword, Parser, Scope};

/// Declaration specifiers preceding the declarators
#[derive(Debug, Default)]
pub(crate) struct Specifiers {
    pub is_extern: bool,
    pub is_static: bool,
    pub is_typedef: bool,
    pub is_inline: bool,
    /// A type was named by a keyword or a tag
    pub saw_type: bool,
    /// `struct X` without a body; becomes a node only with no declarators
    pub tag_reference: Option<Node>,
}

/// Result of scanning one declarator
#[derive(Debug, Default)]
pub(crate) struct Declarator {
    pub name: String,
    pub location: Option<SourceLocation>,
    /// Parameters when this declares a function
    pub params: Option<Vec<(String, SourceLocation)>>,
    pub is_extern: bool,
    /// Identifiers that could have been the name
    pub identifiers: usize,
    /// C++ `T x(1, 2)`: parentheses held arguments, not parameters
    pub direct_init: bool,
    locked: bool,
}

impl Declarator {
    fn set_name(&mut self, name: String, location: SourceLocation, counts: bool) {
        self.name = name;
        self.location = Some(location);
        if counts {
            self.identifiers += 1;
        }
    }
}

const TYPE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "bool", "_Complex", "_Imaginary", "__int128", "__signed__", "wchar_t", "char8_t", "char16_t",
    "char32_t", "auto",
];

const QUALIFIER_KEYWORDS: &[&str] = &[
    "const", "volatile", "restrict", "__restrict", "__restrict__", "__const", "__volatile__",
    "register", "thread_local", "_Thread_local", "virtual", "explicit", "mutable", "consteval",
    "constinit", "_Noreturn", "__extension__", "typename", "export",
];

pub(crate) fn is_declaration_keyword(text: &str) -> bool {
    TYPE_KEYWORDS.contains(&text)
        || QUALIFIER_KEYWORDS.contains(&text)
        || is_attribute_keyword(text)
        || matches!(
            text,
            "extern"
                | "static"
                | "typedef"
                | "inline"
                | "__inline"
                | "__inline__"
                | "constexpr"
                | "struct"
                | "union"
                | "class"
                | "enum"
                | "decltype"
                | "typeof"
                | "__typeof__"
                | "__typeof"
                | "_Atomic"
        )
}

impl Parser {
    /// Parse declarations until end of input or, when `nested`, the `}`
    /// closing the enclosing body (left unconsumed).
    pub(crate) fn parse_declarations(&mut self, parent: NodeId, scope: Scope, nested: bool) {
        while let Some(token) = self.peek() {
            if token.is("}") {
                if nested {
                    return;
                }
                self.advance();
                continue;
            }

            let before = self.position;
            self.parse_declaration(parent, scope);
            if self.position == before {
                self.advance();
            }
        }
    }

    pub(crate) fn parse_declaration(&mut self, parent: NodeId, scope: Scope) {
        let Some(token) = self.peek() else {
            return;
        };
        let kind = token.kind;
        let text = token.text.clone();

        if kind == TokenKind::Identifier && scope == Scope::Record && self.check_ahead(1, ":") {
            // Qt-style `signals:` sections
            self.advance();
            self.advance();
            return;
        }
        if kind != TokenKind::Keyword {
            if text == ";" && kind == TokenKind::Punctuation {
                self.advance();
            } else {
                self.parse_simple_declaration(parent, scope);
            }
            return;
        }

        match text.as_str() {
            "namespace" => self.parse_namespace(parent),
            "inline" if self.check_ahead(1, "namespace") => {
                self.advance();
                self.parse_namespace(parent);
            }
            "extern" if self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Literal) => {
                self.parse_linkage_spec(parent, scope)
            }
            "template" => self.parse_template(parent, scope),
            "using" => self.parse_using(parent),
            "public" | "private" | "protected" => {
                self.advance();
                self.match_token(":");
            }
            "friend" | "static_assert" | "_Static_assert" | "asm" | "__asm__" | "__asm" => {
                self.skip_declaration()
            }
            _ => self.parse_simple_declaration(parent, scope),
        }
    }

    fn parse_namespace(&mut self, parent: NodeId) {
        let start = self.position;
        self.advance(); // namespace
        self.skip_attributes();

        let mut names = Vec::new();
        while let Some(token) = self.peek() {
            if !token.is_identifier() {
                break;
            }
            names.push((token.text.clone(), token.location));
            self.advance();
            if !self.match_token("::") {
                break;
            }
            self.match_token("inline");
        }
        self.skip_attributes();

        if !self.check("{") {
            // namespace alias or malformed
            self.skip_declaration();
            return;
        }

        let mut node = parent;
        let mut opened = Vec::new();
        if names.is_empty() {
            let location = self.tokens[start].location;
            node = self.add_node(node, Node::new(NodeKind::Namespace, "", location).definition());
            opened.push(node);
        }
        for (name, location) in names {
            node = self.add_node(node, Node::new(NodeKind::Namespace, name, location).definition());
            opened.push(node);
        }

        self.advance(); // {
        self.parse_declarations(node, Scope::File, true);
        self.match_token("}");

        for id in opened {
            self.finish_extent(id, start);
        }
    }

    fn parse_linkage_spec(&mut self, parent: NodeId, scope: Scope) {
        let start = self.position;
        let location = self.tokens[start].location;
        self.advance(); // extern
        self.advance(); // "C"

        let node = self.add_node(parent, Node::new(NodeKind::LinkageSpec, "", location).definition());
        if self.match_token("{") {
            self.parse_declarations(node, scope, true);
            self.match_token("}");
        } else {
            self.parse_declaration(node, scope);
        }
        self.finish_extent(node, start);
    }

    fn parse_template(&mut self, parent: NodeId, scope: Scope) {
        self.advance(); // template
        if self.check("<") {
            self.parse_template_parameters();
        }

        if !self.is_at_end() {
            self.parse_declaration(parent, scope);
        }
        self.pending_template.clear();
    }

    /// Collect the names declared in a template parameter list into
    /// `pending_template`.
    fn parse_template_parameters(&mut self) {
        self.advance(); // <
        let mut depth = 0usize;
        let mut last: Option<(String, SourceLocation)> = None;
        let mut in_default = false;

        while let Some(token) = self.peek() {
            let kind = token.kind;
            let text = token.text.clone();
            let location = token.location;

            if kind == TokenKind::Identifier {
                if depth == 0 && !in_default {
                    last = Some((text, location));
                }
                self.advance();
                continue;
            }
            if kind != TokenKind::Punctuation {
                self.advance();
                continue;
            }

            match text.as_str() {
                "," if depth == 0 => {
                    self.pending_template.extend(last.take());
                    in_default = false;
                }
                "=" if depth == 0 => in_default = true,
                "<" => depth += 1,
                ">" | ">>" => {
                    let closes = if text == ">>" { 2 } else { 1 };
                    if depth < closes {
                        self.advance();
                        break;
                    }
                    depth -= closes;
                }
                "(" | "[" => {
                    self.skip_balanced();
                    continue;
                }
                ";" | "{" | "}" | ")" | "]" => break,
                _ => {}
            }
            self.advance();
        }

        self.pending_template.extend(last);
    }

    fn parse_using(&mut self, parent: NodeId) {
        let start = self.position;
        self.advance(); // using

        let alias = match self.peek() {
            Some(token) if token.is_identifier() => Some((token.text.clone(), token.location)),
            _ => None,
        };
        let Some((name, location)) = alias else {
            self.skip_declaration();
            return;
        };
        self.advance();
        self.skip_attributes();

        if !self.match_token("=") {
            // using-declaration
            self.skip_declaration();
            return;
        }

        self.skip_until(&[";"]);
        self.match_token(";");
        let node = self.add_node(parent, Node::new(NodeKind::TypeAlias, name, location).definition());
        self.finish_extent(node, start);
    }

    pub(crate) fn parse_specifiers(&mut self, parent: Option<NodeId>) -> Specifiers {
        let mut specs = Specifiers::default();

        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Keyword {
                if token.is("[") && self.check_ahead(1, "[") {
                    self.skip_balanced();
                    continue;
                }
                break;
            }

            let text = token.text.clone();
            match text.as_str() {
                "extern" => specs.is_extern = true,
                "static" => specs.is_static = true,
                "typedef" => specs.is_typedef = true,
                "inline" | "__inline" | "__inline__" | "constexpr" => specs.is_inline = true,
                "struct" | "union" | "class" | "enum" => {
                    self.parse_tag_specifier(parent, &mut specs);
                    continue;
                }
                "decltype" | "typeof" | "__typeof__" | "__typeof" | "_Atomic" => {
                    self.advance();
                    if self.check("(") {
                        self.skip_balanced();
                    }
                    specs.saw_type = true;
                    continue;
                }
                _ if is_attribute_keyword(&text) => {
                    self.skip_attributes();
                    continue;
                }
                _ if TYPE_KEYWORDS.contains(&text.as_str()) => specs.saw_type = true,
                _ if QUALIFIER_KEYWORDS.contains(&text.as_str()) => {}
                _ => break,
            }
            self.advance();
        }

        specs
    }

    fn parse_tag_specifier(&mut self, parent: Option<NodeId>, specs: &mut Specifiers) {
        let start = self.position;
        let Some((kind, mut location)) = self.advance().map(|keyword| {
            let kind = match keyword.text.as_str() {
                "struct" => NodeKind::Struct,
                "union" => NodeKind::Union,
                "class" => NodeKind::Class,
                _ => NodeKind::Enum,
            };
            (kind, keyword.location)
        }) else {
            return;
        };
        if kind == NodeKind::Enum && !self.match_token("class") {
            self.match_token("struct");
        }
        self.skip_attributes();
        specs.saw_type = true;

        let mut name = String::new();
        while let Some(token) = self.peek() {
            if !token.is_identifier() {
                break;
            }
            name = token.text.clone();
            location = token.location;
            self.advance();
            if self.is_cxx() && self.check("<") {
                self.skip_angle();
            }
            if !self.match_token("::") {
                break;
            }
        }
        if self.peek().is_some_and(|t| t.is_identifier() && t.text == "final") {
            self.advance();
        }
        self.skip_attributes();

        if self.check(":") {
            // base clause or enum underlying type
            self.skip_until(&["{", ";"]);
        }

        if !self.check("{") {
            if !name.is_empty() {
                specs.tag_reference = Some(Node::new(kind, name, location));
            }
            return;
        }

        let Some(parent) = parent else {
            self.skip_balanced();
            return;
        };

        let node = self.add_node(parent, Node::new(kind, name, location).definition());
        self.advance(); // {
        if kind == NodeKind::Enum {
            self.parse_enumerators(node);
        } else {
            self.parse_declarations(node, Scope::Record, true);
        }
        self.match_token("}");
        self.finish_extent(node, start);
    }

    fn parse_enumerators(&mut self, parent: NodeId) {
        while let Some(token) = self.peek() {
            if token.is("}") {
                break;
            }
            if !token.is_identifier() {
                self.advance();
                continue;
            }

            let start = self.position;
            let node = Node::new(NodeKind::EnumConstant, token.text.clone(), token.location).definition();
            let node = self.add_node(parent, node);
            self.advance();
            self.skip_attributes();
            if self.match_token("=") {
                self.skip_until(&[",", "}"]);
            }
            self.finish_extent(node, start);
            self.match_token(",");
        }
    }

    /// Parse specifiers followed by a comma-separated list of declarators.
    pub(crate) fn parse_simple_declaration(&mut self, parent: NodeId, scope: Scope) {
        let start = self.position;
        let specs = self.parse_specifiers(Some(parent));

        if self.check(";") {
            self.advance();
            if let Some(reference) = specs.tag_reference {
                let node = self.add_node(parent, reference);
                self.finish_extent(node, start);
            }
            return;
        }

        loop {
            let declarator = self.parse_declarator();
            let is_function = declarator.params.is_some();

            if is_function && !specs.is_typedef && (self.check("{") || self.check(":") || self.check("try")) {
                let Some(node) = self.add_declarator_node(parent, scope, &specs, &declarator, true) else {
                    self.skip_declaration();
                    return;
                };
                self.match_token("try");
                if self.check(":") {
                    self.skip_member_initializers();
                }
                if self.check("{") {
                    self.parse_compound_statement(node);
                }
                while self.match_token("catch") {
                    self.parse_handler(node);
                }
                self.finish_extent(node, start);
                return;
            }

            let mut has_init = false;
            if self.match_token("=") {
                // `= default` and `= delete` define a function, `= 0` does not
                has_init = !is_function || self.check("default") || self.check("delete");
                self.skip_until(&[",", ";"]);
            } else if self.check("{") && !is_function {
                self.skip_balanced();
                has_init = true;
            } else if self.check(":") && scope == Scope::Record {
                // bit-field width
                self.advance();
                self.skip_until(&[",", ";"]);
            }
            if declarator.direct_init {
                has_init = true;
            }

            if let Some(node) = self.add_declarator_node(parent, scope, &specs, &declarator, has_init) {
                self.finish_extent(node, start);
            }

            if self.match_token(",") {
                continue;
            }
            if !self.match_token(";") {
                self.skip_declaration();
            }
            return;
        }
    }

    /// Create the node for one declarator. Unnamed declarators produce none.
    fn add_declarator_node(
        &mut self,
        parent: NodeId,
        scope: Scope,
        specs: &Specifiers,
        declarator: &Declarator,
        completes: bool,
    ) -> Option<NodeId> {
        let location = declarator.location?;
        if declarator.name.is_empty() {
            return None;
        }

        let (kind, is_definition) = if specs.is_typedef {
            (NodeKind::Typedef, true)
        } else if declarator.params.is_some() {
            let kind = if scope == Scope::Record {
                NodeKind::Method
            } else {
                NodeKind::Function
            };
            (kind, completes)
        } else if scope == Scope::Record && !specs.is_static {
            (NodeKind::Field, true)
        } else if scope == Scope::Record {
            (NodeKind::Variable, specs.is_inline)
        } else {
            let is_extern = specs.is_extern || declarator.is_extern;
            (NodeKind::Variable, !is_extern || completes)
        };

        let node = Node::new(kind, declarator.name.clone(), location).with_definition(is_definition);
        let id = self.add_node(parent, node);
        if let Some(params) = &declarator.params {
            for (name, location) in params {
                let parameter = Node::new(NodeKind::Parameter, name.clone(), *location).definition();
                self.tree.add_child(id, parameter);
            }
        }
        Some(id)
    }

    /// Scan one declarator up to its terminator (`=`, `,`, `;`, `{`, `:`, or
    /// an unmatched closer), which is left unconsumed.
    pub(crate) fn parse_declarator(&mut self) -> Declarator {
        let mut declarator = Declarator::default();

        while let Some(token) = self.peek() {
            let kind = token.kind;
            let text = token.text.clone();
            let location = token.location;

            match kind {
                TokenKind::Identifier => {
                    // `a::b` names one entity
                    let qualified = self.position > 0 && self.tokens[self.position - 1].is("::");
                    self.advance();
                    if !declarator.locked {
                        declarator.set_name(text, location, !qualified);
                        if self.is_cxx() && self.check("<") {
                            self.skip_angle();
                        }
                    }
                }
                TokenKind::Keyword => match text.as_str() {
                    "operator" if !declarator.locked => {
                        self.advance();
                        let name = self.parse_operator_name();
                        declarator.set_name(name, location, true);
                    }
                    "extern" => {
                        declarator.is_extern = true;
                        self.advance();
                    }
                    "noexcept" | "throw" | "requires" | "decltype" | "typeof" | "__typeof__" => {
                        self.advance();
                        if self.check("(") {
                            self.skip_balanced();
                        }
                    }
                    _ if is_attribute_keyword(&text) => self.skip_attributes(),
                    "try" => break,
                    _ => {
                        self.advance();
                    }
                },
                TokenKind::Punctuation => match text.as_str() {
                    "*" | "&" | "&&" | "^" | "::" | "..." => {
                        self.advance();
                    }
                    "~" if self.is_cxx() && !declarator.locked => {
                        self.advance();
                        if let Some(name) = self.peek().filter(|t| t.is_identifier()) {
                            let name = format!("~{}", name.text);
                            self.advance();
                            declarator.set_name(name, location, true);
                        }
                    }
                    "(" => self.parse_declarator_parens(&mut declarator),
                    "[" => self.skip_balanced(),
                    "->" if declarator.params.is_some() => {
                        self.advance();
                        self.skip_until(&["{", ";", "=", ","]);
                    }
                    _ => break,
                },
                _ => break,
            }
        }

        declarator
    }

    /// Handle a `(` inside a declarator: a nested declarator such as
    /// `(*fp)`, a parameter list, or C++ direct-initialization arguments.
    fn parse_declarator_parens(&mut self, declarator: &mut Declarator) {
        if declarator.locked || declarator.params.is_some() {
            self.skip_balanced();
            declarator.locked = true;
            return;
        }

        if declarator.location.is_none() {
            let close = self.matching_close();
            self.advance(); // (
            let inner = self.parse_declarator();
            self.position = self.position.max(close + 1).min(self.tokens.len());

            if let Some(location) = inner.location {
                declarator.name = inner.name;
                declarator.location = Some(location);
                declarator.identifiers += inner.identifiers;
                declarator.params = inner.params;
                declarator.locked = true;
            }
            return;
        }

        let (params, expression_like) = self.parse_parameter_list();
        if self.is_cxx() && expression_like {
            declarator.direct_init = true;
        } else {
            declarator.params = Some(params);
        }
        declarator.locked = true;
    }

    /// Parse a parenthesized parameter list, returning the named parameters
    /// and whether the contents looked like expressions instead.
    fn parse_parameter_list(&mut self) -> (Vec<(String, SourceLocation)>, bool) {
        let close = self.matching_close();
        self.advance(); // (
        let mut params = Vec::new();
        let mut expression_like = false;

        while self.position < close {
            let before = self.position;
            if self.peek().is_some_and(|t| t.kind == TokenKind::Literal) {
                expression_like = true;
            }

            let specs = self.parse_specifiers(None);
            let declarator = self.parse_declarator();
            let names_type_only = !specs.saw_type && declarator.identifiers <= 1 && declarator.params.is_none();
            if let Some(location) = declarator.location {
                if !declarator.name.is_empty() && !names_type_only {
                    params.push((declarator.name, location));
                }
            }

            if self.match_token("=") {
                self.skip_until(&[",", ")"]);
            }
            if !self.check(",") && self.position < close {
                expression_like = true;
                self.skip_until(&[",", ")"]);
            }
            self.match_token(",");
            if self.position == before {
                self.advance();
            }
        }

        self.position = (close + 1).min(self.tokens.len()).max(self.position);
        (params, expression_like)
    }

    /// Spelling of an operator function name; the `operator` keyword has
    /// been consumed.
    fn parse_operator_name(&mut self) -> String {
        let Some(token) = self.peek() else {
            return "operator".to_string();
        };

        if token.is("(") && self.check_ahead(1, ")") {
            self.advance();
            self.advance();
            return "operator()".to_string();
        }
        if token.is("[") && self.check_ahead(1, "]") {
            self.advance();
            self.advance();
            return "operator[]".to_string();
        }
        if token.is("new") || token.is("delete") {
            let mut name = format!("operator {}", token.text);
            self.advance();
            if self.check("[") && self.check_ahead(1, "]") {
                self.advance();
                self.advance();
                name.push_str("[]");
            }
            return name;
        }
        if token.kind == TokenKind::Punctuation {
            let name = format!("operator{}", token.text);
            self.advance();
            return name;
        }
        if token.kind == TokenKind::Literal {
            // user-defined literal: operator""_suffix
            let mut name = format!("operator{}", token.text);
            self.advance();
            if let Some(suffix) = self.peek().filter(|t| t.is_identifier()) {
                name.push(' ');
                name.push_str(&suffix.text);
                self.advance();
            }
            return name;
        }

        // conversion function: everything up to the parameter list
        let mut words: Vec<String> = Vec::new();
        while let Some(token) = self.peek() {
            if token.is("(") || token.is(";") || token.is("{") {
                break;
            }
            words.push(token.text.clone());
            self.advance();
        }
        format!("operator {}", words.join(" "))
    }

    /// Skip a constructor's member initializer list, leaving the body `{`.
    fn skip_member_initializers(&mut self) {
        self.advance(); // :
        loop {
            while let Some(token) = self.peek() {
                if token.is_identifier() || token.is("::") || token.is("typename") {
                    self.advance();
                    if self.is_cxx() && self.check("<") {
                        self.skip_angle();
                    }
                } else {
                    break;
                }
            }
            if self.check("(") || self.check("{") {
                self.skip_balanced();
            } else {
                break;
            }
            self.match_token("...");
            if !self.match_token(",") {
                break;
            }
        }
    }

    /// Heuristic used at block scope: does the statement at the current
    /// position declare something?
    pub(crate) fn looks_like_declaration(&self) -> bool {
        let Some(first) = self.peek() else {
            return false;
        };

        match first.kind {
            TokenKind::Keyword => is_declaration_keyword(&first.text),
            TokenKind::Punctuation => first.is("[") && self.check_ahead(1, "["),
            TokenKind::Identifier => self.identifier_starts_declaration(),
            _ => false,
        }
    }

    /// `Type [::Type]* [<args>] [* & const]* name` followed by a declarator
    /// terminator.
    fn identifier_starts_declaration(&self) -> bool {
        let token_at = |index: usize| -> Option<&Token> { self.tokens.get(index) };
        let mut index = self.position;

        loop {
            if !token_at(index).is_some_and(Token::is_identifier) {
                return false;
            }
            index += 1;
            if self.is_cxx() && token_at(index).is_some_and(|t| t.is("<")) {
                match self.angle_end(index) {
                    Some(end) => index = end,
                    None => return false,
                }
            }
            if token_at(index).is_some_and(|t| t.is("::")) {
                index += 1;
                continue;
            }
            break;
        }

        while token_at(index).is_some_and(|t| {
            t.is("*") || t.is("&") || t.is("&&") || t.is("const") || t.is("volatile") || t.is("restrict")
        }) {
            index += 1;
        }

        if !token_at(index).is_some_and(Token::is_identifier) {
            return false;
        }
        token_at(index + 1).is_some_and(|t| {
            [";", "=", ",", "[", "(", "{", ":", ")"]
                .iter()
                .any(|terminator| t.is(terminator))
        })
    }
}
