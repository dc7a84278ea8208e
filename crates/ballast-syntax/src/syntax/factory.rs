// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Pure constructors for syntax nodes.
//!
//! Nodes are immutable; every "edit" here builds a new node that shares the
//! untouched subtrees with the old one.

use super::node::CompositeNode;
use super::{Diagnostic, DiagnosticCode, SyntaxKind, SyntaxNode};
use crate::lexer::{Span, Token, Trivia};

/// Wraps a token as a leaf node.
pub fn token(token: Token) -> SyntaxNode {
    SyntaxNode::Token(token)
}

/// A zero-width token of `kind` at `offset`, carrying `code`.
pub fn missing_token(kind: SyntaxKind, offset: usize, code: DiagnosticCode) -> SyntaxNode {
    let diagnostic = Diagnostic::new(code, Span::empty(offset));
    SyntaxNode::Token(Token::missing(kind, offset, diagnostic))
}

/// A composite node with a fixed slot layout.
pub fn node(kind: SyntaxKind, slots: Vec<Option<SyntaxNode>>) -> SyntaxNode {
    SyntaxNode::Composite(CompositeNode::new(kind, slots, Vec::new()))
}

/// A possibly-empty node list.
pub fn list(items: Vec<SyntaxNode>) -> SyntaxNode {
    node(SyntaxKind::List, items.into_iter().map(Some).collect())
}

/// Copy of `node` with `code` attached, spanning the node text.
pub fn with_diagnostic(node: SyntaxNode, code: DiagnosticCode) -> SyntaxNode {
    let diagnostic = Diagnostic::new(code, node.span());
    match node {
        SyntaxNode::Token(token) => SyntaxNode::Token(token.with_diagnostic(diagnostic)),
        SyntaxNode::Composite(composite) => {
            let mut diagnostics = composite.diagnostics().to_vec();
            diagnostics.push(diagnostic);
            SyntaxNode::Composite(CompositeNode::new(
                composite.kind(),
                composite.slots().to_vec(),
                diagnostics,
            ))
        }
    }
}

/// Wraps a discarded token or node as invalid trivia marked with `code`.
pub fn invalid_trivia(invalid: SyntaxNode, code: DiagnosticCode) -> Trivia {
    Trivia::Invalid(with_diagnostic(invalid, code))
}

/// Copy of `target` with `invalid` placed in front of its first token.
pub fn with_leading_invalid_node(target: SyntaxNode, invalid: SyntaxNode, code: DiagnosticCode) -> SyntaxNode {
    let trivia = invalid_trivia(invalid, code);
    let mut edit = |token: &Token| token.with_leading_prefix(vec![trivia.clone()]);
    match map_first_token(&target, &mut edit) {
        Some(node) => node,
        None => prepend_carrier(target, trivia),
    }
}

/// Copy of `target` with `invalid` placed after its last token.
pub fn with_trailing_invalid_node(target: SyntaxNode, invalid: SyntaxNode, code: DiagnosticCode) -> SyntaxNode {
    with_trailing_trivia(target, vec![invalid_trivia(invalid, code)])
}

/// Copy of `target` with `trivia` appended after its last token.
pub fn with_trailing_trivia(target: SyntaxNode, trivia: Vec<Trivia>) -> SyntaxNode {
    if trivia.is_empty() {
        return target;
    }
    let carried = trivia.clone();
    let mut edit = |token: &Token| token.with_trailing_suffix(carried.clone());
    match map_last_token(&target, &mut edit) {
        Some(node) => node,
        None => {
            let carrier = Token::missing_without_diagnostic(SyntaxKind::Invalid, target.span().end)
                .with_trailing_suffix(trivia);
            append_child(target, SyntaxNode::Token(carrier))
        }
    }
}

/// The same token under another kind, for tokens accepted in place of the
/// kind the grammar expected.
pub fn rekind_token(token: &Token, kind: SyntaxKind) -> Token {
    token.with_kind(kind)
}

fn prepend_carrier(target: SyntaxNode, trivia: Trivia) -> SyntaxNode {
    let carrier = Token::missing_without_diagnostic(SyntaxKind::Invalid, target.span().start)
        .with_leading_prefix(vec![trivia]);
    match target {
        SyntaxNode::Composite(composite) => {
            let mut slots = vec![Some(SyntaxNode::Token(carrier))];
            slots.extend(composite.slots().iter().cloned());
            SyntaxNode::Composite(CompositeNode::new(composite.kind(), slots, composite.diagnostics().to_vec()))
        }
        SyntaxNode::Token(_) => SyntaxNode::Token(carrier),
    }
}

fn append_child(target: SyntaxNode, child: SyntaxNode) -> SyntaxNode {
    match target {
        SyntaxNode::Composite(composite) => {
            let mut slots = composite.slots().to_vec();
            slots.push(Some(child));
            SyntaxNode::Composite(CompositeNode::new(composite.kind(), slots, composite.diagnostics().to_vec()))
        }
        SyntaxNode::Token(_) => child,
    }
}

fn map_first_token(node: &SyntaxNode, edit: &mut dyn FnMut(&Token) -> Token) -> Option<SyntaxNode> {
    match node {
        SyntaxNode::Token(token) => Some(SyntaxNode::Token(edit(token))),
        SyntaxNode::Composite(composite) => {
            let mut slots = composite.slots().to_vec();
            for index in 0..slots.len() {
                let Some(child) = &slots[index] else { continue };
                if let Some(replaced) = map_first_token(child, edit) {
                    slots[index] = Some(replaced);
                    return Some(SyntaxNode::Composite(CompositeNode::new(
                        composite.kind(),
                        slots,
                        composite.diagnostics().to_vec(),
                    )));
                }
            }
            None
        }
    }
}

fn map_last_token(node: &SyntaxNode, edit: &mut dyn FnMut(&Token) -> Token) -> Option<SyntaxNode> {
    match node {
        SyntaxNode::Token(token) => Some(SyntaxNode::Token(edit(token))),
        SyntaxNode::Composite(composite) => {
            let mut slots = composite.slots().to_vec();
            for index in (0..slots.len()).rev() {
                let Some(child) = &slots[index] else { continue };
                if let Some(replaced) = map_last_token(child, edit) {
                    slots[index] = Some(replaced);
                    return Some(SyntaxNode::Composite(CompositeNode::new(
                        composite.kind(),
                        slots,
                        composite.diagnostics().to_vec(),
                    )));
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str, start: usize) -> SyntaxNode {
        token(Token::new(SyntaxKind::Identifier, text, Span::new(start, start + text.len()), vec![], vec![]))
    }

    #[test]
    fn test_missing_token_carries_code() {
        let missing = missing_token(SyntaxKind::Semicolon, 4, DiagnosticCode::MissingSemicolon);
        assert!(missing.is_missing());
        assert_eq!(missing.own_diagnostics()[0].code, DiagnosticCode::MissingSemicolon);
        assert_eq!(missing.own_diagnostics()[0].span, Span::empty(4));
    }

    #[test]
    fn test_leading_invalid_node_is_lossless() {
        let target = node(SyntaxKind::ExpressionStatement, vec![Some(ident("b", 1))]);
        let junk = ident("a", 0);
        let result = with_leading_invalid_node(target, junk, DiagnosticCode::InvalidToken(SyntaxKind::Identifier));
        assert_eq!(result.to_source_string(), "ab");
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.kind(), SyntaxKind::ExpressionStatement);
    }

    #[test]
    fn test_trailing_invalid_node_on_empty_list() {
        let result = with_trailing_invalid_node(list(vec![]), ident("z", 0), DiagnosticCode::InvalidNode);
        assert_eq!(result.to_source_string(), "z");
        assert_eq!(result.diagnostics()[0].code, DiagnosticCode::InvalidNode);
    }

    #[test]
    fn test_with_diagnostic_on_composite() {
        let node = with_diagnostic(list(vec![ident("a", 3)]), DiagnosticCode::InvalidExpression);
        assert_eq!(node.own_diagnostics()[0].span, Span::new(3, 4));
    }
}
