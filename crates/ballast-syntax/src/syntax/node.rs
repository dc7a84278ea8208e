// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Immutable concrete syntax tree nodes.

use std::fmt;
use std::sync::Arc;

use super::{Diagnostic, SyntaxKind};
use crate::lexer::{Span, Token, Trivia};

#[derive(Debug, PartialEq, Eq)]
struct CompositeData {
    kind: SyntaxKind,
    slots: Vec<Option<SyntaxNode>>,
    diagnostics: Vec<Diagnostic>,
}

/// A node with children. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeNode(Arc<CompositeData>);

impl CompositeNode {
    pub(crate) fn new(kind: SyntaxKind, slots: Vec<Option<SyntaxNode>>, diagnostics: Vec<Diagnostic>) -> Self {
        Self(Arc::new(CompositeData {
            kind,
            slots,
            diagnostics,
        }))
    }

    /// The node kind.
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    /// All slots, absent optional parts included as `None`.
    pub fn slots(&self) -> &[Option<SyntaxNode>] {
        &self.0.slots
    }

    /// Diagnostics attached to this node itself.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0.diagnostics
    }
}

/// A token or a composite node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// A leaf.
    Token(Token),
    /// An interior node.
    Composite(CompositeNode),
}

impl From<Token> for SyntaxNode {
    fn from(token: Token) -> Self {
        SyntaxNode::Token(token)
    }
}

impl SyntaxNode {
    /// The kind of this node.
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxNode::Token(token) => token.kind(),
            SyntaxNode::Composite(node) => node.kind(),
        }
    }

    /// Returns true if this is a leaf.
    pub fn is_token(&self) -> bool {
        matches!(self, SyntaxNode::Token(_))
    }

    /// The token, if this is a leaf.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(_) => None,
        }
    }

    /// The composite node, if this is not a leaf.
    pub fn as_composite(&self) -> Option<&CompositeNode> {
        match self {
            SyntaxNode::Token(_) => None,
            SyntaxNode::Composite(node) => Some(node),
        }
    }

    /// Slot `index`, `None` if absent or out of range.
    pub fn slot(&self, index: usize) -> Option<&SyntaxNode> {
        self.as_composite()?.slots().get(index)?.as_ref()
    }

    /// Present children in slot order.
    pub fn children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.as_composite()
            .map(|node| node.slots())
            .unwrap_or_default()
            .iter()
            .flatten()
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children().find(|child| child.kind() == kind)
    }

    /// This node and every node beneath it, pre-order. Trivia is not entered.
    pub fn descendants(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// First descendant (or self) of the given kind.
    pub fn find(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.descendants().into_iter().find(|node| node.kind() == kind)
    }

    /// Every descendant (or self) of the given kind.
    pub fn find_all(&self, kind: SyntaxKind) -> Vec<&SyntaxNode> {
        self.descendants().into_iter().filter(|node| node.kind() == kind).collect()
    }

    /// Leaf tokens in source order, trivia excluded.
    pub fn tokens(&self) -> Vec<&Token> {
        self.descendants().into_iter().filter_map(SyntaxNode::as_token).collect()
    }

    /// The first leaf token, missing tokens included.
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(_) => self.children().find_map(SyntaxNode::first_token),
        }
    }

    /// The last leaf token, missing tokens included.
    pub fn last_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(node) => node
                .slots()
                .iter()
                .rev()
                .flatten()
                .find_map(SyntaxNode::last_token),
        }
    }

    /// Span of the node text, trivia excluded.
    pub fn span(&self) -> Span {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => first.span().cover(last.span()),
            _ => Span::default(),
        }
    }

    /// True if every token under this node was synthesized by recovery.
    pub fn is_missing(&self) -> bool {
        self.tokens().iter().all(|token| token.is_missing())
    }

    /// Width in bytes of all source text, trivia included.
    pub fn full_width(&self) -> usize {
        match self {
            SyntaxNode::Token(token) => token.full_width(),
            SyntaxNode::Composite(_) => self.children().map(SyntaxNode::full_width).sum(),
        }
    }

    /// Appends the exact source text covered by this node.
    pub fn write_source(&self, out: &mut String) {
        match self {
            SyntaxNode::Token(token) => token.write_source(out),
            SyntaxNode::Composite(_) => {
                for child in self.children() {
                    child.write_source(out);
                }
            }
        }
    }

    /// Reconstructs the source text, byte for byte.
    pub fn to_source_string(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Diagnostics attached directly to this node or token.
    pub fn own_diagnostics(&self) -> &[Diagnostic] {
        match self {
            SyntaxNode::Token(token) => token.diagnostics(),
            SyntaxNode::Composite(node) => node.diagnostics(),
        }
    }

    /// Every diagnostic in the subtree, including those inside invalid trivia.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.collect_diagnostics(&mut out);
        out.sort_by_key(|diagnostic| (diagnostic.span.start, diagnostic.span.end));
        out
    }

    fn collect_diagnostics(&self, out: &mut Vec<Diagnostic>) {
        out.extend_from_slice(self.own_diagnostics());
        match self {
            SyntaxNode::Token(token) => {
                for trivia in token.leading().iter().chain(token.trailing()) {
                    if let Trivia::Invalid(node) = trivia {
                        node.collect_diagnostics(out);
                    }
                }
            }
            SyntaxNode::Composite(_) => {
                for child in self.children() {
                    child.collect_diagnostics(out);
                }
            }
        }
    }

    /// Returns true if the subtree carries any diagnostic.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics().is_empty()
    }

    /// Compares shape and token text, ignoring trivia, spans and diagnostics.
    pub fn is_isomorphic(&self, other: &SyntaxNode) -> bool {
        match (self, other) {
            (SyntaxNode::Token(a), SyntaxNode::Token(b)) => {
                a.kind() == b.kind() && a.text() == b.text() && a.is_missing() == b.is_missing()
            }
            (SyntaxNode::Composite(a), SyntaxNode::Composite(b)) => {
                a.kind() == b.kind()
                    && a.slots().len() == b.slots().len()
                    && a.slots().iter().zip(b.slots()).all(|pair| match pair {
                        (Some(x), Some(y)) => x.is_isomorphic(y),
                        (None, None) => true,
                        _ => false,
                    })
            }
            _ => false,
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            SyntaxNode::Token(token) if token.is_missing() => {
                writeln!(f, "{indent}{:?} <missing>", token.kind())?;
            }
            SyntaxNode::Token(token) => {
                writeln!(f, "{indent}{:?} {:?}", token.kind(), token.text())?;
                for trivia in token.leading().iter().chain(token.trailing()) {
                    if let Trivia::Invalid(node) = trivia {
                        writeln!(f, "{indent}  <invalid>")?;
                        node.write_tree(f, depth + 2)?;
                    }
                }
            }
            SyntaxNode::Composite(node) => {
                writeln!(f, "{indent}{:?}", node.kind())?;
                for child in self.children() {
                    child.write_tree(f, depth + 1)?;
                }
            }
        }
        for diagnostic in self.own_diagnostics() {
            writeln!(f, "{indent}  ! {}", diagnostic.code)?;
        }
        Ok(())
    }
}

impl fmt::Display for SyntaxNode {
    /// Indented dump of kinds and token text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::factory;

    fn ident(text: &str, start: usize) -> SyntaxNode {
        factory::token(Token::new(
            SyntaxKind::Identifier,
            text,
            Span::new(start, start + text.len()),
            vec![],
            vec![Trivia::Whitespace(" ".into())],
        ))
    }

    #[test]
    fn test_children_skip_absent_slots() {
        let node = factory::node(SyntaxKind::ReturnStatement, vec![Some(ident("a", 0)), None, Some(ident("b", 2))]);
        assert_eq!(node.children().count(), 2);
        assert!(node.slot(1).is_none());
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::Identifier));
    }

    #[test]
    fn test_source_and_span() {
        let node = factory::list(vec![ident("a", 0), ident("b", 2)]);
        assert_eq!(node.to_source_string(), "a b ");
        assert_eq!(node.span(), Span::new(0, 3));
        assert_eq!(node.full_width(), 4);
        assert_eq!(node.tokens().len(), 2);
    }

    #[test]
    fn test_isomorphic_ignores_trivia() {
        let a = factory::list(vec![ident("x", 0)]);
        let b = factory::list(vec![factory::token(Token::new(
            SyntaxKind::Identifier,
            "x",
            Span::new(10, 11),
            vec![],
            vec![],
        ))]);
        assert!(a.is_isomorphic(&b));
        assert_ne!(a, b);
    }
}
