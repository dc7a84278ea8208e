// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The parser core: token plumbing, context scoping and entry points.
//!
//! Productions live in sibling modules as further `impl` blocks on
//! [`Parser`]. Every production returns a [`SyntaxNode`]; unexpected input is
//! handled by [`Parser::recover`] and never surfaces as an error.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::context::{ContextStack, ParserContext};
use super::expressions::ExpressionFlags;
use super::precedence::OperatorPrecedence;
use super::recovery::{DefaultRecovery, ListItem, RecoveryRequest, RecoveryStrategy, Solution};
use crate::lexer::{Token, TokenSource, Trivia};
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

/// Fatal parser failures. These signal a gap in the grammar implementation,
/// never a problem with the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The context cannot be resumed without intermediate arguments.
    #[error("context {0:?} cannot be resumed without intermediate state")]
    UnsupportedResumeContext(ParserContext),
}

/// Which grammar rule a parse starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentKind {
    /// A whole source file.
    #[default]
    CompilationUnit,
    /// One import or module-level declaration.
    ModuleMember,
    /// One statement.
    Statement,
    /// One expression, actions allowed.
    Expression,
}

impl FragmentKind {
    /// Every fragment kind, in declaration order.
    pub const ALL: [FragmentKind; 4] = [
        FragmentKind::CompilationUnit,
        FragmentKind::ModuleMember,
        FragmentKind::Statement,
        FragmentKind::Expression,
    ];

    /// Short lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            FragmentKind::CompilationUnit => "module",
            FragmentKind::ModuleMember => "declaration",
            FragmentKind::Statement => "statement",
            FragmentKind::Expression => "expression",
        }
    }

    /// Parses a name produced by [`FragmentKind::name`].
    pub fn from_name(name: &str) -> Option<FragmentKind> {
        FragmentKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for a single parse.
#[derive(Clone, Default)]
pub struct ParserOptions {
    fragment: FragmentKind,
    recovery: Option<Arc<dyn RecoveryStrategy>>,
}

impl ParserOptions {
    /// Full-file parsing with the default recovery engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `fragment` instead of a compilation unit.
    pub fn fragment(mut self, fragment: FragmentKind) -> Self {
        self.fragment = fragment;
        self
    }

    /// Installs a custom recovery engine.
    pub fn recovery(mut self, recovery: Arc<dyn RecoveryStrategy>) -> Self {
        self.recovery = Some(recovery);
        self
    }

    /// The fragment kind to start from.
    pub fn fragment_kind(&self) -> FragmentKind {
        self.fragment
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("fragment", &self.fragment)
            .field("custom_recovery", &self.recovery.is_some())
            .finish()
    }
}

/// An error-tolerant recursive descent parser over a [`TokenSource`].
pub struct Parser<S: TokenSource> {
    pub(super) tokens: S,
    pub(super) contexts: ContextStack,
    pub(super) recovery: Arc<dyn RecoveryStrategy>,
    /// Discarded input waiting to be attached to the next consumed token.
    pending_invalid: Vec<Trivia>,
    /// End offset of the last consumed token, where missing tokens go.
    last_end: usize,
}

impl<S: TokenSource> Parser<S> {
    /// Creates a parser using [`DefaultRecovery`].
    pub fn new(tokens: S) -> Self {
        Self {
            tokens,
            contexts: ContextStack::new(),
            recovery: Arc::new(DefaultRecovery),
            pending_invalid: Vec::new(),
            last_end: 0,
        }
    }

    /// Creates a parser configured by `options`.
    pub fn with_options(tokens: S, options: &ParserOptions) -> Self {
        let parser = Self::new(tokens);
        match &options.recovery {
            Some(recovery) => parser.with_recovery(Arc::clone(recovery)),
            None => parser,
        }
    }

    /// Replaces the recovery engine.
    pub fn with_recovery(mut self, recovery: Arc<dyn RecoveryStrategy>) -> Self {
        self.recovery = recovery;
        self
    }

    /// Parses a whole compilation unit.
    pub fn parse(&mut self) -> SyntaxNode {
        self.parse_fragment(FragmentKind::CompilationUnit)
    }

    /// Parses starting from the rule for `kind`.
    ///
    /// Input left over after the fragment is attached to it as invalid
    /// trivia, so the result still covers every byte.
    pub fn parse_fragment(&mut self, kind: FragmentKind) -> SyntaxNode {
        debug!(fragment = %kind, "parse started");
        let node = match kind {
            FragmentKind::CompilationUnit => self.parse_compilation_unit(),
            FragmentKind::ModuleMember => self.in_context(ParserContext::CompilationUnit, |p| {
                let member = if p.peek_kind() == SyntaxKind::ImportKeyword {
                    p.parse_import_declaration()
                } else {
                    p.parse_module_member()
                };
                p.finish_fragment(member)
            }),
            FragmentKind::Statement => self.in_context(ParserContext::FunctionBodyBlock, |p| {
                let statement = p.parse_statement();
                p.finish_fragment(statement)
            }),
            FragmentKind::Expression => {
                let flags = ExpressionFlags::rhs().with_actions(true);
                let expression = self.parse_expression(OperatorPrecedence::Default, flags);
                self.finish_fragment(expression)
            }
        };
        debug!(
            fragment = %kind,
            tokens = self.tokens.position(),
            diagnostics = node.diagnostics().len(),
            "parse finished"
        );
        node
    }

    /// Re-enters the grammar at `context` from the current position.
    pub fn resume_context(&mut self, context: ParserContext) -> Result<SyntaxNode, ParserError> {
        let request =
            RecoveryRequest::for_context(context).ok_or(ParserError::UnsupportedResumeContext(context))?;
        Ok(self.resume_parsing(request))
    }

    fn parse_compilation_unit(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::CompilationUnit, |p| {
            let mut imports = Vec::new();
            let mut members: Vec<SyntaxNode> = Vec::new();
            while p.peek_kind() != SyntaxKind::Eof {
                let start = p.position();
                if p.peek_kind() == SyntaxKind::ImportKeyword {
                    let import = p.parse_import_declaration();
                    if members.is_empty() {
                        imports.push(import);
                    } else {
                        members.push(factory::with_diagnostic(import, DiagnosticCode::ImportAfterDeclaration));
                    }
                    continue;
                }
                let member = p.parse_module_member();
                if p.position() == start {
                    p.invalidate_current();
                    if member.is_missing() {
                        continue;
                    }
                }
                members.push(member);
            }
            let eof = p.consume_node();
            factory::node(
                SyntaxKind::ModulePart,
                vec![Some(factory::list(imports)), Some(factory::list(members)), Some(eof)],
            )
        })
    }

    /// Discards everything up to EOF and hangs it, together with the EOF
    /// trivia, off the end of `node`.
    fn finish_fragment(&mut self, node: SyntaxNode) -> SyntaxNode {
        while self.peek_kind() != SyntaxKind::Eof {
            self.invalidate_current();
        }
        let eof = self.consume_token();
        let mut trivia = eof.leading().to_vec();
        trivia.extend_from_slice(eof.trailing());
        factory::with_trailing_trivia(node, trivia)
    }

    // Token plumbing

    pub(crate) fn peek_token(&mut self) -> Token {
        self.tokens.peek(1)
    }

    pub(crate) fn peek_token_at(&mut self, k: usize) -> Token {
        self.tokens.peek(k)
    }

    pub(crate) fn peek_kind(&mut self) -> SyntaxKind {
        self.tokens.peek(1).kind()
    }

    pub(crate) fn peek_kind_at(&mut self, k: usize) -> SyntaxKind {
        self.tokens.peek(k).kind()
    }

    /// Number of tokens consumed so far, invalidated ones included.
    pub(crate) fn position(&self) -> usize {
        self.tokens.position()
    }

    /// Consumes the current token, attaching any pending invalid trivia.
    pub(crate) fn consume_token(&mut self) -> Token {
        let token = self.tokens.consume();
        self.last_end = token.span().end;
        if self.pending_invalid.is_empty() {
            token
        } else {
            token.with_leading_prefix(std::mem::take(&mut self.pending_invalid))
        }
    }

    pub(crate) fn consume_node(&mut self) -> SyntaxNode {
        SyntaxNode::Token(self.consume_token())
    }

    /// Consumes the current token under another kind.
    pub(crate) fn consume_as(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let token = self.consume_token();
        if token.kind() == kind {
            SyntaxNode::Token(token)
        } else {
            SyntaxNode::Token(factory::rekind_token(&token, kind))
        }
    }

    /// Consumes the current token if it is `kind`.
    pub(crate) fn optional(&mut self, kind: SyntaxKind) -> Option<SyntaxNode> {
        (self.peek_kind() == kind).then(|| self.consume_node())
    }

    /// Discards the current token as invalid trivia. No-op at EOF.
    pub(crate) fn invalidate_current(&mut self) {
        if self.peek_kind() == SyntaxKind::Eof {
            return;
        }
        let token = self.tokens.consume();
        let code = DiagnosticCode::InvalidToken(token.kind());
        self.pending_invalid.push(factory::invalid_trivia(SyntaxNode::Token(token), code));
    }

    /// A zero-width token placed after the last consumed token.
    pub(crate) fn missing(&self, kind: SyntaxKind, code: DiagnosticCode) -> SyntaxNode {
        factory::missing_token(kind, self.last_end, code)
    }

    /// Consumes a token of `expected`, recovering if the current one differs.
    pub(crate) fn expect(&mut self, expected: SyntaxKind, context: ParserContext) -> SyntaxNode {
        if self.peek_kind() == expected {
            return self.consume_node();
        }
        match self.recover(RecoveryRequest::Token { context, expected }) {
            Solution::Remove(node) => node,
            Solution::Insert { missing, .. } => missing,
            Solution::Keep(_) => self.consume_as(expected),
        }
    }

    /// True if `first` and `second` touch with no trivia between them.
    pub(crate) fn adjacent(first: &Token, second: &Token) -> bool {
        first.trailing().is_empty() && second.leading().is_empty() && first.span().end == second.span().start
    }

    // Context scoping

    /// Runs `f` with `context` pushed for its whole dynamic extent.
    pub(crate) fn in_context<T>(&mut self, context: ParserContext, f: impl FnOnce(&mut Self) -> T) -> T {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    /// Replaces the innermost context once the rule is known.
    pub(crate) fn switch_context(&mut self, context: ParserContext) {
        self.contexts.switch(context);
    }

    // Lists

    /// Parses items until `is_end` holds for the current token or EOF.
    ///
    /// An iteration that consumes nothing discards the current token, so the
    /// loop always terminates.
    pub(crate) fn parse_node_list(
        &mut self,
        is_end: impl Fn(SyntaxKind) -> bool,
        mut parse_item: impl FnMut(&mut Self) -> SyntaxNode,
    ) -> SyntaxNode {
        let mut items = Vec::new();
        loop {
            let kind = self.peek_kind();
            if kind == SyntaxKind::Eof || is_end(kind) {
                break;
            }
            let start = self.position();
            let item = parse_item(self);
            if self.position() == start {
                self.invalidate_current();
                if item.is_missing() {
                    continue;
                }
            }
            items.push(item);
        }
        factory::list(items)
    }

    /// Parses `item (, item)*` and the closing delimiter, after the opening
    /// one. Returns the item list (separators included) and the close token.
    pub(crate) fn parse_delimited_list(
        &mut self,
        context: ParserContext,
        close: SyntaxKind,
        item: ListItem,
        parse_item: impl FnMut(&mut Self) -> SyntaxNode,
    ) -> (SyntaxNode, SyntaxNode) {
        self.continue_delimited_list(context, close, item, Vec::new(), parse_item)
    }

    /// Like [`Parser::parse_delimited_list`], continuing after `items`. A
    /// non-empty `items` must end with an item, not a separator.
    pub(crate) fn continue_delimited_list(
        &mut self,
        context: ParserContext,
        close: SyntaxKind,
        item: ListItem,
        mut items: Vec<SyntaxNode>,
        mut parse_item: impl FnMut(&mut Self) -> SyntaxNode,
    ) -> (SyntaxNode, SyntaxNode) {
        self.in_context(context, |p| {
            if items.is_empty() {
                let kind = p.peek_kind();
                if kind == close {
                    return (factory::list(items), p.consume_node());
                }
                let skip_first = kind == SyntaxKind::Eof || (!item.starts(kind) && p.contexts.any_owns(kind));
                if !skip_first {
                    items.push(parse_item(p));
                }
            }
            loop {
                let start = p.position();
                let separator = p.parse_list_end(context, close, item);
                if separator.kind() != SyntaxKind::Comma {
                    return (factory::list(items), separator);
                }
                items.push(separator);
                items.push(parse_item(p));
                if p.position() == start {
                    p.invalidate_current();
                }
            }
        })
    }

    /// Parses a separator or the closing delimiter of a list.
    pub(crate) fn parse_list_end(&mut self, context: ParserContext, close: SyntaxKind, item: ListItem) -> SyntaxNode {
        let kind = self.peek_kind();
        if kind == SyntaxKind::Comma || kind == close {
            return self.consume_node();
        }
        match self.recover(RecoveryRequest::ListEnd { context, close, item }) {
            Solution::Remove(node) => node,
            Solution::Insert { missing, .. } => missing,
            Solution::Keep(kind) => self.consume_as(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;

    fn parser(source: &str) -> Parser<TokenReader<'_>> {
        Parser::new(TokenReader::new(source))
    }

    #[test]
    fn test_empty_source() {
        let tree = parser("").parse();
        assert_eq!(tree.kind(), SyntaxKind::ModulePart);
        assert_eq!(tree.to_source_string(), "");
        assert!(!tree.has_diagnostics());
    }

    #[test]
    fn test_trivia_only_source_is_kept_on_eof() {
        let source = "// nothing here\n\n";
        let tree = parser(source).parse();
        assert_eq!(tree.to_source_string(), source);
    }

    #[test]
    fn test_fragment_leftovers_become_trivia() {
        let source = "a + b ) c";
        let node = parser(source).parse_fragment(FragmentKind::Expression);
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(node.to_source_string(), source);
        assert_eq!(node.diagnostics().len(), 2);
    }

    #[test]
    fn test_resume_unsupported_context() {
        let mut p = parser("x");
        assert_eq!(
            p.resume_context(ParserContext::WaitFields),
            Err(ParserError::UnsupportedResumeContext(ParserContext::WaitFields))
        );
    }

    #[test]
    fn test_resume_statement_context() {
        let mut p = parser("return 1;");
        let node = p.resume_context(ParserContext::Statement).expect("resumable");
        assert_eq!(node.kind(), SyntaxKind::ReturnStatement);
    }

    #[test]
    fn test_fragment_names_round_trip() {
        for kind in FragmentKind::ALL {
            assert_eq!(FragmentKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FragmentKind::from_name("nope"), None);
    }

    #[test]
    fn test_expect_inserts_missing_token() {
        let mut p = parser(")");
        let node = p.in_context(ParserContext::ReturnStatement, |p| {
            p.in_context(ParserContext::BracedExpression, |p| p.expect(SyntaxKind::Semicolon, ParserContext::ReturnStatement))
        });
        assert!(node.is_missing());
        assert_eq!(node.own_diagnostics()[0].code, DiagnosticCode::MissingSemicolon);
    }
}
