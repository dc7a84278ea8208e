// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statements that open with `[`.
//!
//! `[a, b]` may begin a tuple type, a list binding pattern or a list
//! constructor. Members are parsed with a grammar accepting all three and
//! held as [`Member`] values until one of them commits the list, or the list
//! closes and the next token decides. Already parsed members are then
//! lowered into the committed grammar. A member type followed by a binding
//! pattern, as in `[int a, string b] = t;`, is a typed binding and commits
//! the list to a pattern.
//!
//! Unresolved members never reach the tree: every lowering below matches
//! each variant explicitly, and a member that has no reading in the target
//! grammar is kept with an `Invalid*` diagnostic.
//!
//! The other statement openers that are not declarations need no list
//! resolver: `{`, `_` and `error(` are told apart from blocks and
//! expressions by bounded lookahead in the statement parser, see
//! `is_mapping_destructure_ahead` and `is_error_destructure_ahead` in
//! `statements.rs`.

use tracing::trace;

use super::context::ParserContext;
use super::expressions::ExpressionFlags;
use super::patterns::is_binding_pattern_start;
use super::parser::Parser;
use super::precedence::{OperatorPrecedence, rhs_precedence};
use super::recovery::ListItem;
use super::types::TypeOptions;
use super::validation::validate_arguments;
use crate::lexer::TokenSource;
use crate::syntax::{CompositeNode, DiagnosticCode, SyntaxKind, SyntaxNode, factory};

/// The grammar a bracketed list has committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    Type,
    Pattern,
    Expression,
}

/// A list member whose grammar may not be known yet.
#[derive(Debug, Clone)]
pub(crate) enum Member {
    Literal(SyntaxNode),
    Name(SyntaxNode),
    Qualified {
        module: SyntaxNode,
        colon: SyntaxNode,
        name: SyntaxNode,
    },
    Wildcard(SyntaxNode),
    Rest {
        ellipsis: SyntaxNode,
        name: SyntaxNode,
    },
    List(AmbiguousList),
    Mapping(AmbiguousMapping),
    Nil {
        open: SyntaxNode,
        close: SyntaxNode,
    },
    Error(AmbiguousError),
    Type(SyntaxNode),
    Pattern(SyntaxNode),
    Expression(SyntaxNode),
}

#[derive(Debug, Clone)]
pub(crate) struct AmbiguousList {
    open: SyntaxNode,
    items: Vec<Item>,
    close: SyntaxNode,
}

#[derive(Debug, Clone)]
pub(crate) enum Item {
    Member(Member),
    Separator(SyntaxNode),
}

#[derive(Debug, Clone)]
pub(crate) struct AmbiguousMapping {
    open: SyntaxNode,
    items: Vec<FieldItem>,
    close: SyntaxNode,
}

#[derive(Debug, Clone)]
pub(crate) enum FieldItem {
    /// `name` or `name: member`.
    Field {
        name: SyntaxNode,
        colon: Option<SyntaxNode>,
        value: Option<Member>,
    },
    Rest {
        ellipsis: SyntaxNode,
        name: SyntaxNode,
    },
    /// A field only a mapping constructor can hold, such as `"k": v`.
    Expression(SyntaxNode),
    Separator(SyntaxNode),
}

#[derive(Debug, Clone)]
pub(crate) struct AmbiguousError {
    keyword: SyntaxNode,
    type_reference: Option<SyntaxNode>,
    open: SyntaxNode,
    args: Vec<ArgItem>,
    close: SyntaxNode,
}

#[derive(Debug, Clone)]
pub(crate) enum ArgItem {
    Positional(Member),
    Named {
        name: SyntaxNode,
        equal: SyntaxNode,
        value: Member,
    },
    Rest {
        ellipsis: SyntaxNode,
        name: SyntaxNode,
    },
    Separator(SyntaxNode),
}

/// Outcome of parsing a bracketed list.
#[derive(Debug, Clone)]
pub(crate) enum Bracketed {
    Type(SyntaxNode),
    Pattern(SyntaxNode),
    Expression(SyntaxNode),
    Unresolved(AmbiguousList),
}

impl From<Bracketed> for Member {
    fn from(bracketed: Bracketed) -> Self {
        match bracketed {
            Bracketed::Type(node) => Member::Type(node),
            Bracketed::Pattern(node) => Member::Pattern(node),
            Bracketed::Expression(node) => Member::Expression(node),
            Bracketed::Unresolved(list) => Member::List(list),
        }
    }
}

fn is_member_end(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Comma | SyntaxKind::CloseBracket | SyntaxKind::CloseBrace | SyntaxKind::CloseParen
    )
}

/// The grammar `member` commits to, or `None` while it fits all three.
pub(crate) fn classify(member: &Member) -> Option<Grammar> {
    match member {
        Member::Literal(_) | Member::Name(_) | Member::Nil { .. } => None,
        Member::Qualified { .. } | Member::Type(_) => Some(Grammar::Type),
        Member::Wildcard(_) | Member::Rest { .. } | Member::Pattern(_) => Some(Grammar::Pattern),
        Member::Expression(_) => Some(Grammar::Expression),
        Member::List(list) => list.items.iter().find_map(|item| match item {
            Item::Member(member) => classify(member),
            Item::Separator(_) => None,
        }),
        // Mappings and error values are never types, so a nested type
        // reading does not commit them.
        Member::Mapping(mapping) => mapping
            .items
            .iter()
            .filter_map(|item| match item {
                FieldItem::Field { value, .. } => value.as_ref().and_then(classify),
                FieldItem::Expression(_) => Some(Grammar::Expression),
                FieldItem::Rest { .. } | FieldItem::Separator(_) => None,
            })
            .find(|grammar| *grammar != Grammar::Type),
        Member::Error(error) => error
            .args
            .iter()
            .filter_map(|arg| match arg {
                ArgItem::Positional(member) | ArgItem::Named { value: member, .. } => classify(member),
                ArgItem::Rest { .. } | ArgItem::Separator(_) => None,
            })
            .find(|grammar| *grammar != Grammar::Type),
    }
}

/// Reads a committed tuple type as the list binding pattern it spells, for
/// `[[int, string], a] = v;` where a nested list committed the outer one.
fn tuple_type_to_pattern(node: SyntaxNode) -> SyntaxNode {
    let SyntaxNode::Composite(composite) = &node else {
        return node;
    };
    let kind = match composite.kind() {
        SyntaxKind::TupleTypeDescriptor => SyntaxKind::ListBindingPattern,
        SyntaxKind::List => SyntaxKind::List,
        SyntaxKind::SimpleNameReference => SyntaxKind::CaptureBindingPattern,
        _ => return factory::with_diagnostic(node, DiagnosticCode::InvalidBindingPattern),
    };
    let slots = composite.slots().iter().map(|slot| slot.clone().map(tuple_type_to_pattern)).collect();
    SyntaxNode::Composite(CompositeNode::new(kind, slots, composite.diagnostics().to_vec()))
}

fn name_reference(name: SyntaxNode) -> SyntaxNode {
    factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)])
}

fn qualified_reference(module: SyntaxNode, colon: SyntaxNode, name: SyntaxNode) -> SyntaxNode {
    factory::node(SyntaxKind::QualifiedNameReference, vec![Some(module), Some(colon), Some(name)])
}

fn lower_items(items: Vec<Item>, lower: fn(Member) -> SyntaxNode) -> Vec<SyntaxNode> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Member(member) => lower(member),
            Item::Separator(separator) => separator,
        })
        .collect()
}

/// Lowers `member` into a type descriptor.
pub(crate) fn to_type(member: Member) -> SyntaxNode {
    let invalid = DiagnosticCode::InvalidTypeDescriptor;
    match member {
        Member::Literal(literal) => factory::node(
            SyntaxKind::SingletonTypeDescriptor,
            vec![Some(factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)]))],
        ),
        Member::Name(name) => name_reference(name),
        Member::Qualified { module, colon, name } => qualified_reference(module, colon, name),
        Member::Wildcard(underscore) => factory::with_diagnostic(
            factory::node(SyntaxKind::WildcardBindingPattern, vec![Some(underscore)]),
            invalid,
        ),
        Member::Rest { ellipsis, name } => factory::with_diagnostic(
            factory::node(SyntaxKind::RestBindingPattern, vec![Some(ellipsis), Some(name)]),
            invalid,
        ),
        Member::List(list) => factory::node(
            SyntaxKind::TupleTypeDescriptor,
            vec![
                Some(list.open),
                Some(factory::list(lower_items(list.items, to_type))),
                Some(list.close),
            ],
        ),
        Member::Mapping(mapping) => factory::with_diagnostic(to_expression(Member::Mapping(mapping)), invalid),
        Member::Nil { open, close } => factory::node(SyntaxKind::NilTypeDescriptor, vec![Some(open), Some(close)]),
        Member::Error(error) => factory::with_diagnostic(to_expression(Member::Error(error)), invalid),
        Member::Type(node) => node,
        Member::Pattern(node) | Member::Expression(node) => factory::with_diagnostic(node, invalid),
    }
}

/// Lowers `member` into a binding pattern.
pub(crate) fn to_pattern(member: Member) -> SyntaxNode {
    let invalid = DiagnosticCode::InvalidBindingPattern;
    match member {
        Member::Literal(literal) => {
            factory::with_diagnostic(factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)]), invalid)
        }
        Member::Name(name) => factory::node(SyntaxKind::CaptureBindingPattern, vec![Some(name)]),
        Member::Qualified { module, colon, name } => {
            factory::with_diagnostic(qualified_reference(module, colon, name), invalid)
        }
        Member::Wildcard(underscore) => factory::node(SyntaxKind::WildcardBindingPattern, vec![Some(underscore)]),
        Member::Rest { ellipsis, name } => {
            factory::node(SyntaxKind::RestBindingPattern, vec![Some(ellipsis), Some(name)])
        }
        Member::List(list) => factory::node(
            SyntaxKind::ListBindingPattern,
            vec![
                Some(list.open),
                Some(factory::list(lower_items(list.items, to_pattern))),
                Some(list.close),
            ],
        ),
        Member::Mapping(mapping) => {
            let fields = mapping
                .items
                .into_iter()
                .map(|item| match item {
                    FieldItem::Field { name, colon, value } => factory::node(
                        SyntaxKind::FieldBindingPattern,
                        vec![Some(name_reference(name)), colon, value.map(to_pattern)],
                    ),
                    FieldItem::Rest { ellipsis, name } => {
                        factory::node(SyntaxKind::RestBindingPattern, vec![Some(ellipsis), Some(name)])
                    }
                    FieldItem::Expression(node) => factory::with_diagnostic(node, invalid),
                    FieldItem::Separator(separator) => separator,
                })
                .collect();
            factory::node(
                SyntaxKind::MappingBindingPattern,
                vec![Some(mapping.open), Some(factory::list(fields)), Some(mapping.close)],
            )
        }
        Member::Nil { open, close } => {
            factory::with_diagnostic(factory::node(SyntaxKind::NilLiteral, vec![Some(open), Some(close)]), invalid)
        }
        Member::Error(error) => {
            let args = error
                .args
                .into_iter()
                .map(|arg| match arg {
                    ArgItem::Positional(member) => to_pattern(member),
                    ArgItem::Named { name, equal, value } => factory::node(
                        SyntaxKind::NamedArgBindingPattern,
                        vec![Some(name), Some(equal), Some(to_pattern(value))],
                    ),
                    ArgItem::Rest { ellipsis, name } => {
                        factory::node(SyntaxKind::RestBindingPattern, vec![Some(ellipsis), Some(name)])
                    }
                    ArgItem::Separator(separator) => separator,
                })
                .collect();
            factory::node(
                SyntaxKind::ErrorBindingPattern,
                vec![
                    Some(error.keyword),
                    error.type_reference,
                    Some(error.open),
                    Some(factory::list(args)),
                    Some(error.close),
                ],
            )
        }
        Member::Pattern(node) => node,
        Member::Type(node) | Member::Expression(node) => factory::with_diagnostic(node, invalid),
    }
}

/// Lowers `member` into an expression.
pub(crate) fn to_expression(member: Member) -> SyntaxNode {
    let invalid = DiagnosticCode::InvalidExpression;
    match member {
        Member::Literal(literal) => factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)]),
        Member::Name(name) => name_reference(name),
        Member::Qualified { module, colon, name } => qualified_reference(module, colon, name),
        Member::Wildcard(underscore) => factory::with_diagnostic(
            factory::node(SyntaxKind::WildcardBindingPattern, vec![Some(underscore)]),
            invalid,
        ),
        Member::Rest { ellipsis, name } => {
            factory::node(SyntaxKind::SpreadMember, vec![Some(ellipsis), Some(name_reference(name))])
        }
        Member::List(list) => factory::node(
            SyntaxKind::ListConstructor,
            vec![
                Some(list.open),
                Some(factory::list(lower_items(list.items, to_expression))),
                Some(list.close),
            ],
        ),
        Member::Mapping(mapping) => {
            let fields = mapping
                .items
                .into_iter()
                .map(|item| match item {
                    FieldItem::Field { name, colon, value } => factory::node(
                        SyntaxKind::SpecificField,
                        vec![None, Some(name), colon, value.map(to_expression)],
                    ),
                    FieldItem::Rest { ellipsis, name } => {
                        factory::node(SyntaxKind::SpreadField, vec![Some(ellipsis), Some(name_reference(name))])
                    }
                    FieldItem::Expression(node) | FieldItem::Separator(node) => node,
                })
                .collect();
            factory::node(
                SyntaxKind::MappingConstructor,
                vec![Some(mapping.open), Some(factory::list(fields)), Some(mapping.close)],
            )
        }
        Member::Nil { open, close } => factory::node(SyntaxKind::NilLiteral, vec![Some(open), Some(close)]),
        Member::Error(error) => {
            let args = error
                .args
                .into_iter()
                .map(|arg| match arg {
                    ArgItem::Positional(member) => {
                        factory::node(SyntaxKind::PositionalArgument, vec![Some(to_expression(member))])
                    }
                    ArgItem::Named { name, equal, value } => factory::node(
                        SyntaxKind::NamedArgument,
                        vec![Some(name_reference(name)), Some(equal), Some(to_expression(value))],
                    ),
                    ArgItem::Rest { ellipsis, name } => {
                        factory::node(SyntaxKind::RestArgument, vec![Some(ellipsis), Some(name_reference(name))])
                    }
                    ArgItem::Separator(separator) => separator,
                })
                .collect();
            factory::node(
                SyntaxKind::ErrorConstructor,
                vec![
                    Some(error.keyword),
                    error.type_reference,
                    Some(error.open),
                    Some(validate_arguments(factory::list(args))),
                    Some(error.close),
                ],
            )
        }
        Member::Expression(node) => node,
        Member::Type(node) | Member::Pattern(node) => factory::with_diagnostic(node, invalid),
    }
}

/// Members that have a type reading, and so may take type postfixes.
fn may_be_type(member: &Member) -> bool {
    match member {
        Member::Literal(_)
        | Member::Name(_)
        | Member::Qualified { .. }
        | Member::List(_)
        | Member::Nil { .. }
        | Member::Type(_) => true,
        Member::Wildcard(_)
        | Member::Rest { .. }
        | Member::Mapping(_)
        | Member::Error(_)
        | Member::Pattern(_)
        | Member::Expression(_) => false,
    }
}

impl<S: TokenSource> Parser<S> {
    /// A statement starting with `[`.
    pub(crate) fn parse_bracketed_statement(&mut self, annotations: Option<SyntaxNode>) -> SyntaxNode {
        let open = self.consume_node();
        match self.parse_bracketed(open) {
            Bracketed::Type(ty) if self.peek_kind() == SyntaxKind::Equal => {
                trace!("tuple type followed by `=` read as a list binding pattern");
                self.finish_bracketed_pattern(annotations, tuple_type_to_pattern(ty))
            }
            Bracketed::Type(ty) => self.parse_local_var_decl_from_type(annotations, ty),
            Bracketed::Pattern(pattern) => self.finish_bracketed_pattern(annotations, pattern),
            Bracketed::Expression(expression) => self.finish_bracketed_expression(annotations, expression),
            Bracketed::Unresolved(list) => {
                let grammar = self.grammar_after_list();
                trace!(?grammar, "bracketed statement resolved by the following token");
                let member = Member::List(list);
                match grammar {
                    Grammar::Type => self.parse_local_var_decl_from_type(annotations, to_type(member)),
                    Grammar::Pattern => self.finish_bracketed_pattern(annotations, to_pattern(member)),
                    Grammar::Expression => self.finish_bracketed_expression(annotations, to_expression(member)),
                }
            }
        }
    }

    /// `=` makes a destructuring pattern; a name, a brace or a type suffix
    /// makes a type; anything else continues an expression.
    fn grammar_after_list(&mut self) -> Grammar {
        match self.peek_kind() {
            SyntaxKind::Equal => Grammar::Pattern,
            SyntaxKind::Identifier
            | SyntaxKind::OpenBrace
            | SyntaxKind::Pipe
            | SyntaxKind::BitwiseAnd
            | SyntaxKind::QuestionMark => Grammar::Type,
            SyntaxKind::OpenBracket if self.peek_kind_at(2) == SyntaxKind::CloseBracket => Grammar::Type,
            _ => Grammar::Expression,
        }
    }

    fn finish_bracketed_pattern(&mut self, annotations: Option<SyntaxNode>, pattern: SyntaxNode) -> SyntaxNode {
        let next = self.peek_kind();
        self.parse_statement_rhs_with(next, annotations, pattern)
    }

    fn finish_bracketed_expression(&mut self, annotations: Option<SyntaxNode>, expression: SyntaxNode) -> SyntaxNode {
        let expression =
            self.parse_expression_rhs(OperatorPrecedence::Default, expression, ExpressionFlags::statement_start());
        let next = self.peek_kind();
        self.parse_statement_rhs_with(next, annotations, expression)
    }

    /// Parses list members after `open` until one commits the list or the
    /// list closes.
    pub(crate) fn parse_bracketed(&mut self, open: SyntaxNode) -> Bracketed {
        self.in_context(ParserContext::AmbiguousList, |p| {
            let mut items = Vec::new();
            if p.peek_kind() == SyntaxKind::CloseBracket {
                let close = p.consume_node();
                return Bracketed::Unresolved(AmbiguousList { open, items, close });
            }
            loop {
                let start = p.position();
                let member = p.parse_ambiguous_member();
                let grammar = classify(&member);
                items.push(Item::Member(member));
                if let Some(grammar) = grammar {
                    trace!(?grammar, members = items.len(), "bracketed list committed");
                    return p.finish_committed_list(grammar, open, items);
                }
                let end = p.parse_list_end(ParserContext::AmbiguousList, SyntaxKind::CloseBracket, ListItem::Ambiguous);
                if end.kind() != SyntaxKind::Comma {
                    return Bracketed::Unresolved(AmbiguousList { open, items, close: end });
                }
                items.push(Item::Separator(end));
                if p.position() == start {
                    p.invalidate_current();
                }
            }
        })
    }

    /// Lowers the parsed prefix and finishes with the committed list parser.
    fn finish_committed_list(&mut self, grammar: Grammar, open: SyntaxNode, items: Vec<Item>) -> Bracketed {
        match grammar {
            Grammar::Type => {
                let items = lower_items(items, to_type);
                Bracketed::Type(self.parse_tuple_type_rest(open, items))
            }
            Grammar::Pattern => {
                let items = lower_items(items, to_pattern);
                Bracketed::Pattern(self.parse_list_binding_pattern_rest(open, items))
            }
            Grammar::Expression => {
                let items = lower_items(items, to_expression);
                Bracketed::Expression(self.parse_list_constructor_rest(open, items))
            }
        }
    }

    fn parse_ambiguous_member(&mut self) -> Member {
        match self.peek_kind() {
            SyntaxKind::Identifier => {
                let member = if self.peek_kind_at(2) == SyntaxKind::Colon && self.peek_kind_at(3) == SyntaxKind::Identifier
                {
                    let module = self.consume_node();
                    let colon = self.consume_node();
                    let name = self.consume_node();
                    Member::Qualified { module, colon, name }
                } else {
                    Member::Name(self.consume_node())
                };
                self.continue_ambiguous_member(member)
            }
            SyntaxKind::Underscore => Member::Wildcard(self.consume_node()),
            SyntaxKind::Ellipsis => {
                let ellipsis = self.consume_node();
                if self.peek_kind() == SyntaxKind::Identifier && is_member_end(self.peek_kind_at(2)) {
                    let name = self.consume_node();
                    return Member::Rest { ellipsis, name };
                }
                let expression = self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                Member::Expression(factory::node(SyntaxKind::SpreadMember, vec![Some(ellipsis), Some(expression)]))
            }
            SyntaxKind::OpenBracket => {
                let open = self.consume_node();
                let member = Member::from(self.parse_bracketed(open));
                self.continue_ambiguous_member(member)
            }
            SyntaxKind::OpenBrace => {
                let mapping = self.parse_ambiguous_mapping();
                self.continue_ambiguous_member(Member::Mapping(mapping))
            }
            SyntaxKind::OpenParen if self.peek_kind_at(2) == SyntaxKind::CloseParen => {
                let open = self.consume_node();
                let close = self.consume_node();
                self.continue_ambiguous_member(Member::Nil { open, close })
            }
            SyntaxKind::OpenParen
                if self.peek_kind_at(2).is_type_keyword() && self.peek_kind_at(3) != SyntaxKind::Colon =>
            {
                let ty = self.parse_type_descriptor(ParserContext::TupleTypeDescriptor);
                self.continue_type_member(ty)
            }
            SyntaxKind::ErrorKeyword if self.is_error_value_ahead() => {
                let error = self.parse_ambiguous_error();
                self.continue_ambiguous_member(Member::Error(error))
            }
            k if k.is_literal() => {
                let literal = self.consume_node();
                self.continue_ambiguous_member(Member::Literal(literal))
            }
            k if k.is_type_keyword() && self.peek_kind_at(2) != SyntaxKind::Colon => {
                let ty = self.parse_type_descriptor(ParserContext::TupleTypeDescriptor);
                self.continue_type_member(ty)
            }
            _ => Member::Expression(self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs())),
        }
    }

    /// `error(` or `error T(`.
    fn is_error_value_ahead(&mut self) -> bool {
        match self.peek_kind_at(2) {
            SyntaxKind::OpenParen => true,
            SyntaxKind::Identifier => self.peek_kind_at(3) == SyntaxKind::OpenParen,
            _ => false,
        }
    }

    /// A member type, or a typed binding when a binding pattern follows.
    fn continue_type_member(&mut self, ty: SyntaxNode) -> Member {
        if is_binding_pattern_start(self.peek_kind()) {
            return Member::Pattern(self.parse_typed_binding_pattern_rest(ty));
        }
        Member::Type(self.parse_rest_type_suffix(ty))
    }

    /// Applies what follows a member: a type suffix commits it to a type,
    /// a name after a type to a typed binding, an operator to an expression.
    fn continue_ambiguous_member(&mut self, member: Member) -> Member {
        let kind = self.peek_kind();
        if is_member_end(kind) {
            return member;
        }
        let type_suffix = match kind {
            SyntaxKind::QuestionMark | SyntaxKind::Ellipsis => is_member_end(self.peek_kind_at(2)),
            SyntaxKind::OpenBracket => self.peek_kind_at(2) == SyntaxKind::CloseBracket,
            SyntaxKind::Pipe | SyntaxKind::BitwiseAnd => true,
            _ => false,
        };
        if type_suffix && may_be_type(&member) {
            let ty = self.parse_complex_type(to_type(member), TypeOptions::default());
            return self.continue_type_member(ty);
        }
        // `[` and `{` after a name are member access and mapping fields.
        if matches!(kind, SyntaxKind::Identifier | SyntaxKind::Underscore) && may_be_type(&member) {
            return Member::Pattern(self.parse_typed_binding_pattern_rest(to_type(member)));
        }
        match member {
            Member::Pattern(_) => member,
            member if rhs_precedence(kind).is_some() => {
                let lhs = to_expression(member);
                Member::Expression(self.parse_expression_rhs(OperatorPrecedence::Default, lhs, ExpressionFlags::rhs()))
            }
            member => member,
        }
    }

    fn parse_ambiguous_mapping(&mut self) -> AmbiguousMapping {
        let open = self.consume_node();
        self.in_context(ParserContext::AmbiguousMapping, |p| {
            let mut items = Vec::new();
            if p.peek_kind() == SyntaxKind::CloseBrace {
                let close = p.consume_node();
                return AmbiguousMapping { open, items, close };
            }
            loop {
                let start = p.position();
                items.push(p.parse_ambiguous_field());
                let end = p.parse_list_end(ParserContext::AmbiguousMapping, SyntaxKind::CloseBrace, ListItem::MappingField);
                if end.kind() != SyntaxKind::Comma {
                    return AmbiguousMapping { open, items, close: end };
                }
                items.push(FieldItem::Separator(end));
                if p.position() == start {
                    p.invalidate_current();
                }
            }
        })
    }

    fn parse_ambiguous_field(&mut self) -> FieldItem {
        match self.peek_kind() {
            SyntaxKind::Identifier => {
                let name = self.consume_node();
                if self.peek_kind() != SyntaxKind::Colon {
                    return FieldItem::Field {
                        name,
                        colon: None,
                        value: None,
                    };
                }
                let colon = self.consume_node();
                let value = self.parse_ambiguous_member();
                FieldItem::Field {
                    name,
                    colon: Some(colon),
                    value: Some(value),
                }
            }
            SyntaxKind::Ellipsis
                if self.peek_kind_at(2) == SyntaxKind::Identifier && is_member_end(self.peek_kind_at(3)) =>
            {
                let ellipsis = self.consume_node();
                let name = self.consume_node();
                FieldItem::Rest { ellipsis, name }
            }
            _ => FieldItem::Expression(self.parse_mapping_field(ParserContext::AmbiguousMapping)),
        }
    }

    fn parse_ambiguous_error(&mut self) -> AmbiguousError {
        let keyword = self.consume_node();
        let type_reference = (self.peek_kind() == SyntaxKind::Identifier).then(|| self.parse_type_reference());
        let open = self.expect(SyntaxKind::OpenParen, ParserContext::AmbiguousParen);
        self.in_context(ParserContext::AmbiguousParen, |p| {
            let mut args = Vec::new();
            if p.peek_kind() == SyntaxKind::CloseParen {
                let close = p.consume_node();
                return AmbiguousError {
                    keyword,
                    type_reference,
                    open,
                    args,
                    close,
                };
            }
            loop {
                let start = p.position();
                args.push(p.parse_ambiguous_arg());
                let end = p.parse_list_end(ParserContext::AmbiguousParen, SyntaxKind::CloseParen, ListItem::Argument);
                if end.kind() != SyntaxKind::Comma {
                    return AmbiguousError {
                        keyword,
                        type_reference,
                        open,
                        args,
                        close: end,
                    };
                }
                args.push(ArgItem::Separator(end));
                if p.position() == start {
                    p.invalidate_current();
                }
            }
        })
    }

    fn parse_ambiguous_arg(&mut self) -> ArgItem {
        match self.peek_kind() {
            SyntaxKind::Identifier if self.peek_kind_at(2) == SyntaxKind::Equal => {
                let name = self.consume_node();
                let equal = self.consume_node();
                let value = self.parse_ambiguous_member();
                ArgItem::Named { name, equal, value }
            }
            SyntaxKind::Ellipsis
                if self.peek_kind_at(2) == SyntaxKind::Identifier && is_member_end(self.peek_kind_at(3)) =>
            {
                let ellipsis = self.consume_node();
                let name = self.consume_node();
                ArgItem::Rest { ellipsis, name }
            }
            _ => ArgItem::Positional(self.parse_ambiguous_member()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::FragmentKind;

    fn statement(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::Statement);
        assert_eq!(node.to_source_string(), source);
        node
    }

    fn codes(node: &SyntaxNode) -> Vec<DiagnosticCode> {
        node.diagnostics().into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_destructuring_list() {
        let node = statement("[a, b] = pair;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::ListBindingPattern));
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_rest_member_commits_to_pattern() {
        let node = statement("[first, ...others] = xs;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert!(node.find(SyntaxKind::RestBindingPattern).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_nested_lists_and_mappings() {
        let node = statement("[[a, _], {b, c: d}] = v;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.find_all(SyntaxKind::ListBindingPattern).len(), 2);
        assert!(node.find(SyntaxKind::MappingBindingPattern).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_type_keyword_commits_to_tuple_type() {
        let node = statement("[int, string...] t = f();");
        assert_eq!(node.kind(), SyntaxKind::LocalVariableDeclaration);
        assert!(node.find(SyntaxKind::TupleTypeDescriptor).is_some());
        assert!(node.find(SyntaxKind::RestTypeDescriptor).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_names_resolved_by_following_identifier() {
        let node = statement("[Point, Point] segment = f();");
        assert_eq!(node.kind(), SyntaxKind::LocalVariableDeclaration);
        let tuple = node.find(SyntaxKind::TupleTypeDescriptor).expect("tuple");
        assert_eq!(tuple.find_all(SyntaxKind::SimpleNameReference).len(), 2);
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_singleton_union_member() {
        let node = statement("[1|2, string] pair = f();");
        assert_eq!(node.kind(), SyntaxKind::LocalVariableDeclaration);
        assert!(node.find(SyntaxKind::UnionTypeDescriptor).is_some());
        assert_eq!(node.find_all(SyntaxKind::SingletonTypeDescriptor).len(), 2);
    }

    #[test]
    fn test_list_constructor_statement() {
        let node = statement("[a, b].forEach(f);");
        assert_eq!(node.kind(), SyntaxKind::CallStatement);
        assert!(node.find(SyntaxKind::ListConstructor).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_operator_commits_to_expression() {
        let node = statement("[a + 1, b].forEach(f);");
        assert_eq!(node.kind(), SyntaxKind::CallStatement);
        assert!(node.find(SyntaxKind::BinaryExpression).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_every_member_lowers_into_every_grammar() {
        let members = "[1, a, (), [c], {d: e}, error(f)]";

        let pattern = statement(&format!("{members} = v;"));
        assert_eq!(pattern.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(codes(&pattern), vec![DiagnosticCode::InvalidBindingPattern; 2]);
        assert!(pattern.find(SyntaxKind::ErrorBindingPattern).is_some());

        let ty = statement(&format!("{members} x;"));
        assert_eq!(ty.kind(), SyntaxKind::LocalVariableDeclaration);
        assert_eq!(codes(&ty), vec![DiagnosticCode::InvalidTypeDescriptor; 2]);
        assert!(ty.find(SyntaxKind::NilTypeDescriptor).is_some());

        let expression = statement(&format!("{members}.forEach(g);"));
        assert_eq!(expression.kind(), SyntaxKind::CallStatement);
        assert!(!expression.has_diagnostics());
        assert!(expression.find(SyntaxKind::ErrorConstructor).is_some());
        assert!(expression.find(SyntaxKind::MappingConstructor).is_some());
    }

    #[test]
    fn test_literal_in_pattern_is_flagged() {
        let node = statement("[1, b] = v;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(codes(&node), vec![DiagnosticCode::InvalidBindingPattern]);
    }

    #[test]
    fn test_typed_members_commit_to_pattern() {
        let node = statement("[int a, string b] = t;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        let lhs = node.slot(0).expect("lhs");
        assert_eq!(lhs.kind(), SyntaxKind::ListBindingPattern);
        assert_eq!(lhs.find_all(SyntaxKind::TypedBindingPattern).len(), 2);
        assert!(node.find(SyntaxKind::TupleTypeDescriptor).is_none());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_typed_member_after_names() {
        let node = statement("[a, Point p, m:T q, int|string r] = t;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.find_all(SyntaxKind::TypedBindingPattern).len(), 3);
        assert!(node.find(SyntaxKind::UnionTypeDescriptor).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_nested_tuple_type_with_binding() {
        let node = statement("[[int, string] pair, b] = v;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        let typed = node.find(SyntaxKind::TypedBindingPattern).expect("typed member");
        assert_eq!(typed.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::TupleTypeDescriptor));
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_committed_tuple_type_before_equal() {
        let node = statement("[[int, string], a] = v;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::ListBindingPattern));
        assert_eq!(node.find_all(SyntaxKind::ListBindingPattern).len(), 2);
        assert!(node.find(SyntaxKind::CaptureBindingPattern).is_some());
        assert_eq!(codes(&node), vec![DiagnosticCode::InvalidBindingPattern; 2]);
    }

    #[test]
    fn test_annotations_keep_their_place() {
        let node = statement("@a [x, y] = v;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(codes(&node), vec![DiagnosticCode::AnnotationsNotAllowed]);

        let node = statement("@a [1, 2].foo();");
        assert_eq!(node.kind(), SyntaxKind::CallStatement);
        assert_eq!(codes(&node), vec![DiagnosticCode::AnnotationsNotAllowed]);

        let node = statement("@a [int, string] x = t;");
        assert_eq!(node.kind(), SyntaxKind::LocalVariableDeclaration);
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_empty_list_then_equal() {
        let node = statement("[] = xs;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
    }
}
