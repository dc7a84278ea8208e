// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Type descriptors.
//!
//! Union binds loosest, then intersection, then the postfix array and
//! optional forms.

use super::context::ParserContext;
use super::parser::Parser;
use super::recovery::{ListItem, RecoveryRequest, Solution};
use super::statements::reject_annotations;
use super::validation::validate_qualifiers;
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

/// Returns true if `kind` can begin a type descriptor.
pub fn is_type_start(kind: SyntaxKind) -> bool {
    kind.is_type_keyword()
        || kind.is_literal()
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::OpenParen
                | SyntaxKind::OpenBracket
                | SyntaxKind::Minus
                | SyntaxKind::IsolatedKeyword
                | SyntaxKind::ClientKeyword
        )
}

/// Context-dependent readings of postfix tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TypeOptions {
    /// A bracketed group followed by `=`, `;` or `in` is a list binding
    /// pattern, not an array dimension.
    binding: bool,
    /// `?` followed by an expression start begins a conditional.
    type_test: bool,
}

impl TypeOptions {
    pub(crate) fn for_context(context: ParserContext) -> Self {
        Self {
            binding: context == ParserContext::TypedBindingPattern,
            type_test: context == ParserContext::TypeTestExpression,
        }
    }
}

impl<S: TokenSource> Parser<S> {
    /// Parses a full type descriptor for `context`.
    pub(crate) fn parse_type_descriptor(&mut self, context: ParserContext) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_type_descriptor_with(kind, context)
    }

    pub(crate) fn parse_type_descriptor_with(&mut self, kind: SyntaxKind, context: ParserContext) -> SyntaxNode {
        let primary = self.parse_primary_type_with(kind, context);
        self.parse_complex_type(primary, TypeOptions::for_context(context))
    }

    /// Continues a type after an already parsed primary type.
    pub(crate) fn parse_complex_type(&mut self, primary: SyntaxNode, options: TypeOptions) -> SyntaxNode {
        let postfix = self.parse_postfix_types(primary, options);
        let intersection = self.parse_binary_type_rhs(postfix, SyntaxKind::BitwiseAnd, options);
        self.parse_binary_type_rhs(intersection, SyntaxKind::Pipe, options)
    }

    fn parse_binary_type_rhs(&mut self, mut lhs: SyntaxNode, operator: SyntaxKind, options: TypeOptions) -> SyntaxNode {
        let kind = if operator == SyntaxKind::Pipe {
            SyntaxKind::UnionTypeDescriptor
        } else {
            SyntaxKind::IntersectionTypeDescriptor
        };
        while self.peek_kind() == operator {
            let op = self.consume_node();
            let next = self.peek_kind();
            let primary = self.parse_primary_type_with(next, ParserContext::TypeDescriptor);
            let mut rhs = self.parse_postfix_types(primary, options);
            if operator == SyntaxKind::Pipe {
                rhs = self.parse_binary_type_rhs(rhs, SyntaxKind::BitwiseAnd, options);
            }
            lhs = factory::node(kind, vec![Some(lhs), Some(op), Some(rhs)]);
        }
        lhs
    }

    fn parse_postfix_types(&mut self, mut ty: SyntaxNode, options: TypeOptions) -> SyntaxNode {
        loop {
            match self.peek_kind() {
                SyntaxKind::OpenBracket => {
                    if options.binding && self.is_binding_bracket_ahead() {
                        return ty;
                    }
                    let dimension = self.parse_array_dimension();
                    ty = factory::node(SyntaxKind::ArrayTypeDescriptor, vec![Some(ty), Some(dimension)]);
                }
                SyntaxKind::QuestionMark => {
                    if options.type_test && super::expressions::is_expression_start(self.peek_kind_at(2)) {
                        return ty;
                    }
                    let question = self.consume_node();
                    ty = factory::node(SyntaxKind::OptionalTypeDescriptor, vec![Some(ty), Some(question)]);
                }
                _ => return ty,
            }
        }
    }

    /// `[ ... ]` ahead whose closing bracket is followed by `=`, `;` or `in`.
    fn is_binding_bracket_ahead(&mut self) -> bool {
        if self.peek_kind_at(2) == SyntaxKind::CloseBracket {
            return false;
        }
        match self.matching_close_at(1) {
            Some(close) => matches!(
                self.peek_kind_at(close + 1),
                SyntaxKind::Equal | SyntaxKind::Semicolon | SyntaxKind::InKeyword
            ),
            None => false,
        }
    }

    /// Lookahead index of the delimiter closing the one at index `open`.
    pub(crate) fn matching_close_at(&mut self, open: usize) -> Option<usize> {
        let open_kind = self.peek_kind_at(open);
        let close_kind = match open_kind {
            SyntaxKind::OpenBracket => SyntaxKind::CloseBracket,
            SyntaxKind::OpenBrace => SyntaxKind::CloseBrace,
            SyntaxKind::OpenParen => SyntaxKind::CloseParen,
            _ => return None,
        };
        let mut depth = 0usize;
        let mut k = open;
        loop {
            let kind = self.peek_kind_at(k);
            if kind == SyntaxKind::Eof {
                return None;
            }
            if kind == open_kind {
                depth += 1;
            } else if kind == close_kind {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            k += 1;
        }
    }

    /// `[` length? `]`
    fn parse_array_dimension(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ArrayDimension, |p| {
            let open = p.consume_node();
            let length = match p.peek_kind() {
                SyntaxKind::CloseBracket => None,
                SyntaxKind::Asterisk => Some(p.consume_node()),
                kind if kind.is_numeric_literal() => {
                    let literal = p.consume_node();
                    Some(factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)]))
                }
                SyntaxKind::Identifier => Some(p.parse_type_reference()),
                _ => None,
            };
            let close = p.expect(SyntaxKind::CloseBracket, ParserContext::ArrayDimension);
            factory::node(SyntaxKind::ArrayDimension, vec![Some(open), length, Some(close)])
        })
    }

    fn parse_primary_type_with(&mut self, mut kind: SyntaxKind, context: ParserContext) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::MapKeyword
                | SyntaxKind::FutureKeyword
                | SyntaxKind::TypedescKeyword
                | SyntaxKind::ErrorKeyword => self.parse_parameterized_type(),
                k if k.is_simple_type_keyword() => {
                    let keyword = self.consume_node();
                    factory::node(SyntaxKind::BuiltinSimpleTypeDescriptor, vec![Some(keyword)])
                }
                SyntaxKind::StreamKeyword => self.parse_stream_type(),
                SyntaxKind::RecordKeyword => self.parse_record_type(),
                SyntaxKind::ObjectKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::IsolatedKeyword
                | SyntaxKind::ClientKeyword => self.parse_qualified_type(),
                SyntaxKind::DistinctKeyword => {
                    let keyword = self.consume_node();
                    let next = self.peek_kind();
                    let inner = self.parse_primary_type_with(next, context);
                    factory::node(SyntaxKind::DistinctTypeDescriptor, vec![Some(keyword), Some(inner)])
                }
                SyntaxKind::Identifier => self.parse_type_reference(),
                SyntaxKind::OpenParen => self.parse_parenthesised_type(),
                SyntaxKind::OpenBracket => {
                    let open = self.consume_node();
                    self.parse_tuple_type_rest(open, Vec::new())
                }
                k if k.is_literal() || k == SyntaxKind::Minus => self.parse_singleton_type(),
                _ => match self.recover(RecoveryRequest::TypeDescriptor { context }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => factory::node(SyntaxKind::SimpleNameReference, vec![Some(missing)]),
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// `name` or `module:name` in type position.
    pub(crate) fn parse_type_reference(&mut self) -> SyntaxNode {
        let name = self.expect(SyntaxKind::Identifier, ParserContext::TypeDescriptor);
        if self.peek_kind() == SyntaxKind::Colon && self.peek_kind_at(2) == SyntaxKind::Identifier {
            let colon = self.consume_node();
            let identifier = self.consume_node();
            return factory::node(
                SyntaxKind::QualifiedNameReference,
                vec![Some(name), Some(colon), Some(identifier)],
            );
        }
        factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)])
    }

    fn parse_parameterized_type(&mut self) -> SyntaxNode {
        let keyword = self.consume_node();
        let parameter = (self.peek_kind() == SyntaxKind::Lt).then(|| {
            self.in_context(ParserContext::TypeParameter, |p| {
                let open = p.consume_node();
                let ty = p.parse_type_descriptor(ParserContext::TypeParameter);
                let close = p.expect(SyntaxKind::Gt, ParserContext::TypeParameter);
                factory::node(SyntaxKind::TypeParameter, vec![Some(open), Some(ty), Some(close)])
            })
        });
        factory::node(SyntaxKind::ParameterizedTypeDescriptor, vec![Some(keyword), parameter])
    }

    fn parse_stream_type(&mut self) -> SyntaxNode {
        let keyword = self.consume_node();
        let params = (self.peek_kind() == SyntaxKind::Lt).then(|| {
            self.in_context(ParserContext::StreamTypeParams, |p| {
                let open = p.consume_node();
                let value = p.parse_type_descriptor(ParserContext::StreamTypeParams);
                let (comma, completion) = if p.peek_kind() == SyntaxKind::Comma {
                    let comma = p.consume_node();
                    (Some(comma), Some(p.parse_type_descriptor(ParserContext::StreamTypeParams)))
                } else {
                    (None, None)
                };
                let close = p.expect(SyntaxKind::Gt, ParserContext::StreamTypeParams);
                factory::node(
                    SyntaxKind::StreamTypeParams,
                    vec![Some(open), Some(value), comma, completion, Some(close)],
                )
            })
        });
        factory::node(SyntaxKind::StreamTypeDescriptor, vec![Some(keyword), params])
    }

    /// `()` or `(T)`.
    fn parse_parenthesised_type(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ParenthesisedTypeDescriptor, |p| {
            let open = p.consume_node();
            if p.peek_kind() == SyntaxKind::CloseParen {
                let close = p.consume_node();
                return factory::node(SyntaxKind::NilTypeDescriptor, vec![Some(open), Some(close)]);
            }
            let ty = p.parse_type_descriptor(ParserContext::ParenthesisedTypeDescriptor);
            let close = p.expect(SyntaxKind::CloseParen, ParserContext::ParenthesisedTypeDescriptor);
            factory::node(SyntaxKind::ParenthesisedTypeDescriptor, vec![Some(open), Some(ty), Some(close)])
        })
    }

    /// Finishes `[T, U...]` after the open bracket and any resolved members.
    pub(crate) fn parse_tuple_type_rest(&mut self, open: SyntaxNode, items: Vec<SyntaxNode>) -> SyntaxNode {
        let (members, close) = self.continue_delimited_list(
            ParserContext::TupleTypeDescriptor,
            SyntaxKind::CloseBracket,
            ListItem::TypeDescriptor,
            items,
            Self::parse_tuple_member,
        );
        factory::node(SyntaxKind::TupleTypeDescriptor, vec![Some(open), Some(members), Some(close)])
    }

    fn parse_tuple_member(&mut self) -> SyntaxNode {
        let ty = self.parse_type_descriptor(ParserContext::TupleTypeDescriptor);
        self.parse_rest_type_suffix(ty)
    }

    /// Wraps `ty` in a rest descriptor when `...` follows.
    pub(crate) fn parse_rest_type_suffix(&mut self, ty: SyntaxNode) -> SyntaxNode {
        if self.peek_kind() != SyntaxKind::Ellipsis {
            return ty;
        }
        let ellipsis = self.consume_node();
        factory::node(SyntaxKind::RestTypeDescriptor, vec![Some(ty), Some(ellipsis)])
    }

    fn parse_singleton_type(&mut self) -> SyntaxNode {
        let value = if self.peek_kind() == SyntaxKind::Minus {
            let minus = self.consume_node();
            let literal = self.parse_numeric_literal();
            factory::node(SyntaxKind::UnaryExpression, vec![Some(minus), Some(literal)])
        } else {
            let literal = self.consume_node();
            factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)])
        };
        factory::node(SyntaxKind::SingletonTypeDescriptor, vec![Some(value)])
    }

    /// A numeric literal, or a missing one.
    pub(crate) fn parse_numeric_literal(&mut self) -> SyntaxNode {
        let literal = if self.peek_kind().is_numeric_literal() {
            self.consume_node()
        } else {
            self.expect(SyntaxKind::DecimalIntegerLiteral, ParserContext::TypeDescriptor)
        };
        factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)])
    }

    /// Object and function types with their leading qualifiers.
    fn parse_qualified_type(&mut self) -> SyntaxNode {
        let mut qualifiers = Vec::new();
        while matches!(
            self.peek_kind(),
            SyntaxKind::IsolatedKeyword | SyntaxKind::ClientKeyword | SyntaxKind::TransactionalKeyword
        ) {
            qualifiers.push(self.consume_node());
        }
        if self.peek_kind() == SyntaxKind::FunctionKeyword {
            let qualifiers = validate_qualifiers(
                qualifiers,
                &[SyntaxKind::IsolatedKeyword, SyntaxKind::TransactionalKeyword],
            );
            return self.in_context(ParserContext::FunctionTypeDescriptor, |p| {
                let keyword = p.consume_node();
                let signature = (p.peek_kind() == SyntaxKind::OpenParen).then(|| p.parse_function_signature());
                factory::node(
                    SyntaxKind::FunctionTypeDescriptor,
                    vec![Some(qualifiers), Some(keyword), signature],
                )
            });
        }
        let qualifiers = validate_qualifiers(
            qualifiers,
            &[SyntaxKind::IsolatedKeyword, SyntaxKind::ClientKeyword, SyntaxKind::ServiceKeyword],
        );
        self.parse_object_type(qualifiers)
    }

    fn parse_object_type(&mut self, qualifiers: SyntaxNode) -> SyntaxNode {
        self.in_context(ParserContext::ObjectTypeDescriptor, |p| {
            let keyword = p.expect(SyntaxKind::ObjectKeyword, ParserContext::ObjectTypeDescriptor);
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::ObjectTypeDescriptor);
            let members = p.parse_node_list(|kind| kind == SyntaxKind::CloseBrace, |p| p.parse_class_member(true));
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::ObjectTypeDescriptor);
            factory::node(
                SyntaxKind::ObjectTypeDescriptor,
                vec![Some(qualifiers), Some(keyword), Some(open), Some(members), Some(close)],
            )
        })
    }

    /// `record { ... }` or the closed `record {| ... |}`.
    fn parse_record_type(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::RecordTypeDescriptor, |p| {
            let keyword = p.consume_node();
            let (open, close_kind) = if p.peek_kind() == SyntaxKind::OpenBracePipe {
                (p.consume_node(), SyntaxKind::ClosePipeBrace)
            } else {
                (
                    p.expect(SyntaxKind::OpenBrace, ParserContext::RecordTypeDescriptor),
                    SyntaxKind::CloseBrace,
                )
            };
            let fields = p.parse_node_list(
                |kind| matches!(kind, SyntaxKind::CloseBrace | SyntaxKind::ClosePipeBrace),
                Self::parse_record_field,
            );
            let close = p.expect(close_kind, ParserContext::RecordTypeDescriptor);
            factory::node(
                SyntaxKind::RecordTypeDescriptor,
                vec![Some(keyword), Some(open), Some(fields), Some(close)],
            )
        })
    }

    pub(crate) fn parse_record_field(&mut self) -> SyntaxNode {
        let metadata = self.parse_metadata();
        let kind = self.peek_kind();
        self.parse_record_field_with(kind, metadata)
    }

    pub(crate) fn parse_record_field_with(&mut self, mut kind: SyntaxKind, metadata: Option<SyntaxNode>) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::Asterisk => {
                    let inclusion = self.parse_type_inclusion(ParserContext::RecordField);
                    reject_annotations(inclusion, metadata)
                }
                k if is_type_start(k) => self.in_context(ParserContext::RecordField, |p| {
                    let readonly = p.is_readonly_qualifier_ahead().then(|| p.consume_node());
                    let ty = p.parse_type_descriptor(ParserContext::RecordField);
                    if p.peek_kind() == SyntaxKind::Ellipsis {
                        let ellipsis = p.consume_node();
                        let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::RecordField);
                        return factory::node(
                            SyntaxKind::RecordRestDescriptor,
                            vec![Some(ty), Some(ellipsis), Some(semicolon)],
                        );
                    }
                    let name = p.expect(SyntaxKind::Identifier, ParserContext::RecordField);
                    if p.peek_kind() == SyntaxKind::Equal {
                        let equal = p.consume_node();
                        let value = p.parse_expression(
                            super::precedence::OperatorPrecedence::Default,
                            super::expressions::ExpressionFlags::rhs(),
                        );
                        let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::RecordField);
                        return factory::node(
                            SyntaxKind::RecordFieldWithDefault,
                            vec![metadata, readonly, Some(ty), Some(name), Some(equal), Some(value), Some(semicolon)],
                        );
                    }
                    let question = p.optional(SyntaxKind::QuestionMark);
                    let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::RecordField);
                    factory::node(
                        SyntaxKind::RecordField,
                        vec![metadata, readonly, Some(ty), Some(name), question, Some(semicolon)],
                    )
                }),
                _ => match self.recover(RecoveryRequest::RecordField {
                    metadata: metadata.clone(),
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { kind: inserted, .. } | Solution::Keep(inserted) => {
                        kind = inserted;
                        continue;
                    }
                },
            };
        }
    }

    /// `*T;`
    pub(crate) fn parse_type_inclusion(&mut self, context: ParserContext) -> SyntaxNode {
        let asterisk = self.consume_node();
        let ty = self.parse_type_reference();
        let semicolon = self.expect(SyntaxKind::Semicolon, context);
        factory::node(SyntaxKind::TypeReference, vec![Some(asterisk), Some(ty), Some(semicolon)])
    }

    /// `readonly` qualifies a field when a type follows it; `readonly x;`
    /// declares a field of type `readonly`.
    pub(crate) fn is_readonly_qualifier_ahead(&mut self) -> bool {
        if self.peek_kind() != SyntaxKind::ReadonlyKeyword {
            return false;
        }
        let next = self.peek_kind_at(2);
        if next == SyntaxKind::Identifier {
            return !matches!(
                self.peek_kind_at(3),
                SyntaxKind::Semicolon | SyntaxKind::Equal | SyntaxKind::QuestionMark
            );
        }
        is_type_start(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;

    fn parse_type(source: &str) -> SyntaxNode {
        let mut parser = Parser::new(TokenReader::new(source));
        let node = parser.parse_type_descriptor(ParserContext::TypeDescriptor);
        assert_eq!(node.to_source_string(), source);
        node
    }

    #[test]
    fn test_nested_type_parameters_close_separately() {
        let node = parse_type("map<map<int>>");
        assert_eq!(node.kind(), SyntaxKind::ParameterizedTypeDescriptor);
        assert!(!node.has_diagnostics());
        assert_eq!(node.find_all(SyntaxKind::TypeParameter).len(), 2);
    }

    #[test]
    fn test_union_binds_loosest() {
        let node = parse_type("int|string[]?");
        assert_eq!(node.kind(), SyntaxKind::UnionTypeDescriptor);
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::OptionalTypeDescriptor));

        let node = parse_type("A & B | C");
        assert_eq!(node.kind(), SyntaxKind::UnionTypeDescriptor);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::IntersectionTypeDescriptor));
    }

    #[test]
    fn test_array_dimensions() {
        let node = parse_type("int[3][]");
        assert_eq!(node.kind(), SyntaxKind::ArrayTypeDescriptor);
        assert_eq!(node.find_all(SyntaxKind::ArrayDimension).len(), 2);
    }

    #[test]
    fn test_tuple_with_rest() {
        let node = parse_type("[int, string...]");
        assert_eq!(node.kind(), SyntaxKind::TupleTypeDescriptor);
        assert!(node.find(SyntaxKind::RestTypeDescriptor).is_some());
    }

    #[test]
    fn test_closed_record() {
        let node = parse_type("record {| int a; string b = \"x\"; readonly c; json...; |}");
        assert_eq!(node.kind(), SyntaxKind::RecordTypeDescriptor);
        assert!(!node.has_diagnostics());
        assert!(node.find(SyntaxKind::RecordFieldWithDefault).is_some());
        assert!(node.find(SyntaxKind::RecordRestDescriptor).is_some());
    }

    #[test]
    fn test_function_and_object_types() {
        let node = parse_type("isolated function (int a) returns string");
        assert_eq!(node.kind(), SyntaxKind::FunctionTypeDescriptor);
        assert!(!node.has_diagnostics());

        let node = parse_type("client object { int x; }");
        assert_eq!(node.kind(), SyntaxKind::ObjectTypeDescriptor);
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_singletons_and_nil() {
        assert_eq!(parse_type("\"on\"|\"off\"").kind(), SyntaxKind::UnionTypeDescriptor);
        assert_eq!(parse_type("-1").kind(), SyntaxKind::SingletonTypeDescriptor);
        assert_eq!(parse_type("()").kind(), SyntaxKind::NilTypeDescriptor);
        assert_eq!(parse_type("(int|error)").kind(), SyntaxKind::ParenthesisedTypeDescriptor);
    }

    #[test]
    fn test_qualified_reference() {
        let node = parse_type("http:Client?");
        assert_eq!(node.kind(), SyntaxKind::OptionalTypeDescriptor);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::QualifiedNameReference));
    }

    #[test]
    fn test_missing_type_is_synthesized() {
        let node = parse_type("");
        assert!(node.is_missing());
        assert_eq!(
            node.diagnostics()[0].code,
            DiagnosticCode::MissingTypeDescriptor
        );
    }
}
