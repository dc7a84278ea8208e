// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Binding patterns and match patterns.

use super::context::ParserContext;
use super::parser::Parser;
use super::recovery::{ListItem, RecoveryRequest, Solution};
use crate::lexer::TokenSource;
use crate::syntax::{SyntaxKind, SyntaxNode, factory};

/// Returns true if `kind` can begin a binding pattern.
pub fn is_binding_pattern_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::Underscore
            | SyntaxKind::OpenBracket
            | SyntaxKind::OpenBrace
            | SyntaxKind::ErrorKeyword
    )
}

/// Returns true if `kind` can begin a match pattern.
pub fn is_match_pattern_start(kind: SyntaxKind) -> bool {
    kind.is_literal()
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::Underscore
                | SyntaxKind::VarKeyword
                | SyntaxKind::Minus
                | SyntaxKind::OpenParen
                | SyntaxKind::OpenBracket
                | SyntaxKind::OpenBrace
                | SyntaxKind::ErrorKeyword
        )
}

impl<S: TokenSource> Parser<S> {
    /// `T pattern`.
    pub(crate) fn parse_typed_binding_pattern(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::TypedBindingPattern, |p| {
            let ty = p.parse_type_descriptor(ParserContext::TypedBindingPattern);
            p.parse_typed_binding_pattern_rest(ty)
        })
    }

    /// Finishes a typed binding pattern after its type.
    pub(crate) fn parse_typed_binding_pattern_rest(&mut self, ty: SyntaxNode) -> SyntaxNode {
        let binding = self.parse_binding_pattern();
        factory::node(SyntaxKind::TypedBindingPattern, vec![Some(ty), Some(binding)])
    }

    pub(crate) fn parse_binding_pattern(&mut self) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_binding_pattern_with(kind)
    }

    pub(crate) fn parse_binding_pattern_with(&mut self, mut kind: SyntaxKind) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::Identifier => {
                    let name = self.expect(SyntaxKind::Identifier, ParserContext::BindingPattern);
                    factory::node(SyntaxKind::CaptureBindingPattern, vec![Some(name)])
                }
                SyntaxKind::Underscore => {
                    let underscore = self.consume_node();
                    factory::node(SyntaxKind::WildcardBindingPattern, vec![Some(underscore)])
                }
                SyntaxKind::OpenBracket => {
                    let open = self.consume_node();
                    self.parse_list_binding_pattern_rest(open, Vec::new())
                }
                SyntaxKind::OpenBrace => self.parse_mapping_binding_pattern(),
                SyntaxKind::ErrorKeyword => self.parse_error_binding_pattern(),
                _ => match self.recover(RecoveryRequest::BindingPattern) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => {
                        factory::node(SyntaxKind::CaptureBindingPattern, vec![Some(missing)])
                    }
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// Finishes `[a, [b, c], ...d]` after the open bracket and any members
    /// already resolved.
    pub(crate) fn parse_list_binding_pattern_rest(&mut self, open: SyntaxNode, items: Vec<SyntaxNode>) -> SyntaxNode {
        let (members, close) = self.continue_delimited_list(
            ParserContext::ListBindingPattern,
            SyntaxKind::CloseBracket,
            ListItem::BindingPattern,
            items,
            |p| {
                if p.peek_kind() == SyntaxKind::Ellipsis {
                    p.parse_rest_binding_pattern()
                } else if p.is_typed_member_ahead() {
                    p.parse_typed_binding_pattern()
                } else {
                    p.parse_binding_pattern()
                }
            },
        );
        factory::node(SyntaxKind::ListBindingPattern, vec![Some(open), Some(members), Some(close)])
    }

    /// `int a`, `T b` or `m:T _` as a list member.
    fn is_typed_member_ahead(&mut self) -> bool {
        match self.peek_kind() {
            SyntaxKind::Identifier => {
                let mut k = 2;
                if self.peek_kind_at(2) == SyntaxKind::Colon && self.peek_kind_at(3) == SyntaxKind::Identifier {
                    k = 4;
                }
                matches!(self.peek_kind_at(k), SyntaxKind::Identifier | SyntaxKind::Underscore)
            }
            SyntaxKind::ErrorKeyword => match self.peek_kind_at(2) {
                SyntaxKind::Identifier => self.peek_kind_at(3) != SyntaxKind::OpenParen,
                SyntaxKind::Underscore | SyntaxKind::Lt => true,
                _ => false,
            },
            kind => kind.is_type_keyword(),
        }
    }

    fn parse_rest_binding_pattern(&mut self) -> SyntaxNode {
        let ellipsis = self.consume_node();
        let name = self.expect(SyntaxKind::Identifier, ParserContext::BindingPattern);
        factory::node(SyntaxKind::RestBindingPattern, vec![Some(ellipsis), Some(name)])
    }

    fn parse_mapping_binding_pattern(&mut self) -> SyntaxNode {
        let open = self.consume_node();
        let (fields, close) = self.parse_delimited_list(
            ParserContext::MappingBindingPattern,
            SyntaxKind::CloseBrace,
            ListItem::Identifier,
            |p| {
                if p.peek_kind() == SyntaxKind::Ellipsis {
                    return p.parse_rest_binding_pattern();
                }
                let name = p.expect(SyntaxKind::Identifier, ParserContext::MappingBindingPattern);
                let name = factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]);
                if p.peek_kind() != SyntaxKind::Colon {
                    return factory::node(SyntaxKind::FieldBindingPattern, vec![Some(name), None, None]);
                }
                let colon = p.consume_node();
                let pattern = p.parse_binding_pattern();
                factory::node(SyntaxKind::FieldBindingPattern, vec![Some(name), Some(colon), Some(pattern)])
            },
        );
        factory::node(SyntaxKind::MappingBindingPattern, vec![Some(open), Some(fields), Some(close)])
    }

    fn parse_error_binding_pattern(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ErrorBindingPattern, |p| {
            let keyword = p.consume_node();
            let type_reference = (p.peek_kind() == SyntaxKind::Identifier).then(|| p.parse_type_reference());
            let open = p.expect(SyntaxKind::OpenParen, ParserContext::ErrorBindingPattern);
            let (args, close) = p.parse_delimited_list(
                ParserContext::ErrorBindingPattern,
                SyntaxKind::CloseParen,
                ListItem::BindingPattern,
                |p| match p.peek_kind() {
                    SyntaxKind::Ellipsis => p.parse_rest_binding_pattern(),
                    SyntaxKind::Identifier if p.peek_kind_at(2) == SyntaxKind::Equal => {
                        let name = p.consume_node();
                        let equal = p.consume_node();
                        let pattern = p.parse_binding_pattern();
                        factory::node(SyntaxKind::NamedArgBindingPattern, vec![Some(name), Some(equal), Some(pattern)])
                    }
                    _ => p.parse_binding_pattern(),
                },
            );
            factory::node(
                SyntaxKind::ErrorBindingPattern,
                vec![Some(keyword), type_reference, Some(open), Some(args), Some(close)],
            )
        })
    }

    pub(crate) fn parse_match_pattern(&mut self) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_match_pattern_with(kind)
    }

    pub(crate) fn parse_match_pattern_with(&mut self, mut kind: SyntaxKind) -> SyntaxNode {
        loop {
            return match kind {
                k if k.is_literal() => {
                    let literal = self.consume_node();
                    factory::node(SyntaxKind::BasicLiteral, vec![Some(literal)])
                }
                SyntaxKind::Minus => {
                    let minus = self.consume_node();
                    let literal = self.parse_numeric_literal();
                    factory::node(SyntaxKind::UnaryExpression, vec![Some(minus), Some(literal)])
                }
                SyntaxKind::Underscore => {
                    let underscore = self.consume_node();
                    factory::node(SyntaxKind::WildcardBindingPattern, vec![Some(underscore)])
                }
                SyntaxKind::VarKeyword => {
                    let keyword = self.consume_node();
                    let ty = factory::node(SyntaxKind::BuiltinSimpleTypeDescriptor, vec![Some(keyword)]);
                    self.parse_typed_binding_pattern_rest(ty)
                }
                SyntaxKind::Identifier => self.parse_name_reference(false),
                SyntaxKind::OpenParen => {
                    let open = self.consume_node();
                    let close = self.expect(SyntaxKind::CloseParen, ParserContext::MatchPattern);
                    factory::node(SyntaxKind::NilLiteral, vec![Some(open), Some(close)])
                }
                SyntaxKind::OpenBracket => self.parse_list_match_pattern(),
                SyntaxKind::OpenBrace => self.parse_mapping_match_pattern(),
                SyntaxKind::ErrorKeyword => self.parse_error_match_pattern(),
                _ => match self.recover(RecoveryRequest::MatchPattern) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => {
                        factory::node(SyntaxKind::SimpleNameReference, vec![Some(missing)])
                    }
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// `... var x` inside list and mapping match patterns.
    fn parse_rest_match_pattern(&mut self) -> SyntaxNode {
        let ellipsis = self.consume_node();
        let var = self.expect(SyntaxKind::VarKeyword, ParserContext::MatchPattern);
        let name = self.expect(SyntaxKind::Identifier, ParserContext::MatchPattern);
        let binding = factory::node(SyntaxKind::CaptureBindingPattern, vec![Some(name)]);
        factory::node(SyntaxKind::RestMatchPattern, vec![Some(ellipsis), Some(var), Some(binding)])
    }

    fn parse_list_match_pattern(&mut self) -> SyntaxNode {
        let open = self.consume_node();
        let (members, close) = self.parse_delimited_list(
            ParserContext::ListMatchPattern,
            SyntaxKind::CloseBracket,
            ListItem::MatchPattern,
            |p| {
                if p.peek_kind() == SyntaxKind::Ellipsis {
                    p.parse_rest_match_pattern()
                } else {
                    p.parse_match_pattern()
                }
            },
        );
        factory::node(SyntaxKind::ListMatchPattern, vec![Some(open), Some(members), Some(close)])
    }

    fn parse_mapping_match_pattern(&mut self) -> SyntaxNode {
        let open = self.consume_node();
        let (fields, close) = self.parse_delimited_list(
            ParserContext::MappingMatchPattern,
            SyntaxKind::CloseBrace,
            ListItem::Identifier,
            |p| {
                if p.peek_kind() == SyntaxKind::Ellipsis {
                    return p.parse_rest_match_pattern();
                }
                let name = p.expect(SyntaxKind::Identifier, ParserContext::MappingMatchPattern);
                let colon = p.expect(SyntaxKind::Colon, ParserContext::MappingMatchPattern);
                let pattern = p.parse_match_pattern();
                factory::node(SyntaxKind::FieldMatchPattern, vec![Some(name), Some(colon), Some(pattern)])
            },
        );
        factory::node(SyntaxKind::MappingMatchPattern, vec![Some(open), Some(fields), Some(close)])
    }

    fn parse_error_match_pattern(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ErrorMatchPattern, |p| {
            let keyword = p.consume_node();
            let type_reference = (p.peek_kind() == SyntaxKind::Identifier).then(|| p.parse_type_reference());
            let open = p.expect(SyntaxKind::OpenParen, ParserContext::ErrorMatchPattern);
            let (args, close) = p.parse_delimited_list(
                ParserContext::ErrorMatchPattern,
                SyntaxKind::CloseParen,
                ListItem::MatchPattern,
                |p| match p.peek_kind() {
                    SyntaxKind::Ellipsis => p.parse_rest_match_pattern(),
                    SyntaxKind::Identifier if p.peek_kind_at(2) == SyntaxKind::Equal => {
                        let name = p.consume_node();
                        let equal = p.consume_node();
                        let pattern = p.parse_match_pattern();
                        factory::node(SyntaxKind::NamedArgMatchPattern, vec![Some(name), Some(equal), Some(pattern)])
                    }
                    _ => p.parse_match_pattern(),
                },
            );
            factory::node(
                SyntaxKind::ErrorMatchPattern,
                vec![Some(keyword), type_reference, Some(open), Some(args), Some(close)],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;

    fn binding(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_binding_pattern();
        assert_eq!(node.to_source_string(), source);
        node
    }

    fn pattern(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_match_pattern();
        assert_eq!(node.to_source_string(), source);
        node
    }

    #[test]
    fn test_nested_binding_patterns() {
        let node = binding("[a, {b, c: [d, _]}, ...rest]");
        assert_eq!(node.kind(), SyntaxKind::ListBindingPattern);
        assert!(!node.has_diagnostics());
        assert!(node.find(SyntaxKind::MappingBindingPattern).is_some());
        assert!(node.find(SyntaxKind::WildcardBindingPattern).is_some());
        assert!(node.find(SyntaxKind::RestBindingPattern).is_some());
    }

    #[test]
    fn test_typed_list_members() {
        let node = binding("[a, string b, m:Point p, error _, error(e)]");
        assert_eq!(node.kind(), SyntaxKind::ListBindingPattern);
        assert!(!node.has_diagnostics());
        assert_eq!(node.find_all(SyntaxKind::TypedBindingPattern).len(), 3);
        assert!(node.find(SyntaxKind::ErrorBindingPattern).is_some());
    }

    #[test]
    fn test_error_binding_pattern() {
        let node = binding("error MyError(message, code = c, ...details)");
        assert_eq!(node.kind(), SyntaxKind::ErrorBindingPattern);
        assert!(!node.has_diagnostics());
        assert!(node.find(SyntaxKind::NamedArgBindingPattern).is_some());
    }

    #[test]
    fn test_match_patterns() {
        assert_eq!(pattern("-1").kind(), SyntaxKind::UnaryExpression);
        assert_eq!(pattern("\"a\"").kind(), SyntaxKind::BasicLiteral);
        assert_eq!(pattern("var x").kind(), SyntaxKind::TypedBindingPattern);
        assert_eq!(pattern("m:C").kind(), SyntaxKind::QualifiedNameReference);
        assert_eq!(pattern("()").kind(), SyntaxKind::NilLiteral);

        let node = pattern("[1, {a: var x, ...var others}, ...var tail]");
        assert_eq!(node.kind(), SyntaxKind::ListMatchPattern);
        assert!(!node.has_diagnostics());
        assert_eq!(node.find_all(SyntaxKind::RestMatchPattern).len(), 2);
    }

    #[test]
    fn test_missing_binding_pattern() {
        let node = binding("");
        assert_eq!(node.kind(), SyntaxKind::CaptureBindingPattern);
        assert_eq!(
            node.diagnostics()[0].code,
            crate::syntax::DiagnosticCode::MissingBindingPattern
        );
    }
}
