// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Token and trivia definitions.

use std::fmt;
use std::sync::Arc;

use crate::syntax::{Diagnostic, SyntaxKind, SyntaxNode};

/// A span in the source code, representing a range of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Source text that belongs to no grammar slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trivia {
    /// Spaces and tabs.
    Whitespace(Box<str>),
    /// `\n` or `\r\n`.
    EndOfLine(Box<str>),
    /// `// ...` up to, not including, the line break.
    Comment(Box<str>),
    /// `# ...` documentation line.
    Documentation(Box<str>),
    /// A token or node discarded by recovery.
    Invalid(SyntaxNode),
}

impl Trivia {
    /// Appends the source text of this trivia.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Trivia::Whitespace(text)
            | Trivia::EndOfLine(text)
            | Trivia::Comment(text)
            | Trivia::Documentation(text) => out.push_str(text),
            Trivia::Invalid(node) => node.write_source(out),
        }
    }

    /// Width in bytes of the source text of this trivia.
    pub fn width(&self) -> usize {
        match self {
            Trivia::Whitespace(text)
            | Trivia::EndOfLine(text)
            | Trivia::Comment(text)
            | Trivia::Documentation(text) => text.len(),
            Trivia::Invalid(node) => node.full_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenData {
    kind: SyntaxKind,
    text: Box<str>,
    span: Span,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
    diagnostics: Vec<Diagnostic>,
    missing: bool,
}

/// A token produced by the lexer or synthesized by recovery.
///
/// Tokens are immutable and cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Arc<TokenData>);

impl Token {
    /// Creates a token with trivia.
    pub fn new(
        kind: SyntaxKind,
        text: &str,
        span: Span,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> Self {
        Self(Arc::new(TokenData {
            kind,
            text: text.into(),
            span,
            leading,
            trailing,
            diagnostics: Vec::new(),
            missing: false,
        }))
    }

    /// Creates a zero-width missing token at `offset`.
    pub fn missing(kind: SyntaxKind, offset: usize, diagnostic: Diagnostic) -> Self {
        Self(Arc::new(TokenData {
            kind,
            text: "".into(),
            span: Span::empty(offset),
            leading: Vec::new(),
            trailing: Vec::new(),
            diagnostics: vec![diagnostic],
            missing: true,
        }))
    }

    /// A zero-width token without a diagnostic, used to carry trivia when a
    /// node has no token of its own.
    pub(crate) fn missing_without_diagnostic(kind: SyntaxKind, offset: usize) -> Self {
        Self(Arc::new(TokenData {
            kind,
            text: "".into(),
            span: Span::empty(offset),
            leading: Vec::new(),
            trailing: Vec::new(),
            diagnostics: Vec::new(),
            missing: true,
        }))
    }

    /// The kind of token
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    /// Raw source text, empty for missing tokens.
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// The span of the token text, trivia excluded.
    pub fn span(&self) -> Span {
        self.0.span
    }

    /// Leading trivia.
    pub fn leading(&self) -> &[Trivia] {
        &self.0.leading
    }

    /// Trailing trivia.
    pub fn trailing(&self) -> &[Trivia] {
        &self.0.trailing
    }

    /// Diagnostics attached to this token itself.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0.diagnostics
    }

    /// True if recovery synthesized this token.
    pub fn is_missing(&self) -> bool {
        self.0.missing
    }

    /// True if trailing trivia contains a line break.
    pub fn has_trailing_newline(&self) -> bool {
        self.0.trailing.iter().any(|t| matches!(t, Trivia::EndOfLine(_)))
    }

    /// Byte offset of the first leading trivia.
    pub fn full_start(&self) -> usize {
        self.0.span.start - self.leading_width()
    }

    /// Width of the leading trivia in bytes.
    pub fn leading_width(&self) -> usize {
        self.0.leading.iter().map(Trivia::width).sum()
    }

    /// Width of token text plus all trivia.
    pub fn full_width(&self) -> usize {
        self.leading_width() + self.0.text.len() + self.0.trailing.iter().map(Trivia::width).sum::<usize>()
    }

    /// Appends leading trivia, text and trailing trivia.
    pub fn write_source(&self, out: &mut String) {
        for trivia in &self.0.leading {
            trivia.write_source(out);
        }
        out.push_str(&self.0.text);
        for trivia in &self.0.trailing {
            trivia.write_source(out);
        }
    }

    /// Copy of this token with another kind, text untouched.
    pub fn with_kind(&self, kind: SyntaxKind) -> Token {
        self.rebuild(|data| data.kind = kind)
    }

    /// Copy of this token with an extra diagnostic.
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> Token {
        self.rebuild(|data| data.diagnostics.push(diagnostic))
    }

    /// Copy of this token with `trivia` placed before its existing leading trivia.
    pub fn with_leading_prefix(&self, trivia: Vec<Trivia>) -> Token {
        self.rebuild(|data| {
            let existing = std::mem::take(&mut data.leading);
            data.leading = trivia;
            data.leading.extend(existing);
        })
    }

    /// Copy of this token with `trivia` appended to its trailing trivia.
    pub fn with_trailing_suffix(&self, trivia: Vec<Trivia>) -> Token {
        self.rebuild(|data| data.trailing.extend(trivia))
    }

    fn rebuild(&self, edit: impl FnOnce(&mut TokenData)) -> Token {
        let mut data = TokenData::clone(&self.0);
        edit(&mut data);
        Token(Arc::new(data))
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        Arc::make_mut(&mut self.0).diagnostics.push(diagnostic);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind())?;
        if self.is_missing() {
            f.write_str("(missing)")
        } else {
            write!(f, "({:?})@{}..{}", self.text(), self.span().start, self.span().end)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::DiagnosticCode;

    #[test]
    fn test_span_cover() {
        assert_eq!(Span::new(2, 4).cover(Span::new(6, 9)), Span::new(2, 9));
        assert!(Span::empty(3).is_empty());
    }

    #[test]
    fn test_write_source_includes_trivia() {
        let token = Token::new(
            SyntaxKind::Identifier,
            "foo",
            Span::new(1, 4),
            vec![Trivia::Whitespace(" ".into())],
            vec![Trivia::EndOfLine("\n".into())],
        );
        let mut out = String::new();
        token.write_source(&mut out);
        assert_eq!(out, " foo\n");
        assert_eq!(token.full_start(), 0);
        assert_eq!(token.full_width(), 5);
        assert!(token.has_trailing_newline());
    }

    #[test]
    fn test_missing_token_is_zero_width() {
        let diagnostic = Diagnostic::new(DiagnosticCode::MissingSemicolon, Span::empty(7));
        let token = Token::missing(SyntaxKind::Semicolon, 7, diagnostic);
        assert!(token.is_missing());
        assert_eq!(token.text(), "");
        assert_eq!(token.diagnostics().len(), 1);
    }

    #[test]
    fn test_with_kind_keeps_text() {
        let token = Token::new(SyntaxKind::JoinKeyword, "join", Span::new(0, 4), vec![], vec![]);
        let kept = token.with_kind(SyntaxKind::Identifier);
        assert_eq!(kept.kind(), SyntaxKind::Identifier);
        assert_eq!(kept.text(), "join");
    }
}
