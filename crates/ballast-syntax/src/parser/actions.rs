// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Actions: remote calls, worker messaging, and strand control.
//!
//! Actions parse everywhere an expression does. Where the surrounding rule
//! forbids them the node is kept and flagged.

use super::context::ParserContext;
use super::expressions::ExpressionFlags;
use super::parser::Parser;
use super::precedence::OperatorPrecedence;
use super::recovery::ListItem;
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

impl<S: TokenSource> Parser<S> {
    fn check_action_allowed(&self, action: SyntaxNode, flags: ExpressionFlags) -> SyntaxNode {
        if flags.allow_actions {
            action
        } else {
            factory::with_diagnostic(action, DiagnosticCode::ActionNotAllowed)
        }
    }

    /// A worker name, or `function` for the enclosing function's worker.
    fn parse_peer_worker(&mut self, context: ParserContext) -> SyntaxNode {
        let name = if self.peek_kind() == SyntaxKind::FunctionKeyword {
            self.consume_node()
        } else {
            self.expect(SyntaxKind::Identifier, context)
        };
        factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)])
    }

    /// `lhs -> method(args)` or the asynchronous send `lhs -> worker`.
    pub(crate) fn parse_remote_call_or_async_send(&mut self, lhs: SyntaxNode, flags: ExpressionFlags) -> SyntaxNode {
        let is_call = self.peek_kind_at(2) == SyntaxKind::Identifier && self.peek_kind_at(3) == SyntaxKind::OpenParen;
        let arrow = self.consume_node();
        let action = if is_call {
            self.in_context(ParserContext::RemoteCallAction, |p| {
                let name = p.consume_node();
                let name = factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]);
                let (open, args, close) = p.parse_parenthesized_args();
                factory::node(
                    SyntaxKind::RemoteMethodCallAction,
                    vec![Some(lhs), Some(arrow), Some(name), Some(open), Some(args), Some(close)],
                )
            })
        } else {
            let peer = self.parse_peer_worker(ParserContext::SendAction);
            factory::node(SyntaxKind::AsyncSendAction, vec![Some(lhs), Some(arrow), Some(peer)])
        };
        self.check_action_allowed(action, flags)
    }

    /// `lhs ->> worker`.
    pub(crate) fn parse_sync_send(&mut self, lhs: SyntaxNode, flags: ExpressionFlags) -> SyntaxNode {
        let arrow = self.consume_node();
        let peer = self.parse_peer_worker(ParserContext::SendAction);
        let action = factory::node(SyntaxKind::SyncSendAction, vec![Some(lhs), Some(arrow), Some(peer)]);
        self.check_action_allowed(action, flags)
    }

    /// `<- worker`.
    pub(crate) fn parse_receive_action(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let arrow = self.consume_node();
        let peer = self.parse_peer_worker(ParserContext::ReceiveAction);
        let action = factory::node(SyntaxKind::ReceiveAction, vec![Some(arrow), Some(peer)]);
        self.check_action_allowed(action, flags)
    }

    /// `@strand { ... } start f()`.
    pub(crate) fn parse_start_action(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let annotations = self.parse_metadata();
        self.parse_start_action_with(annotations, flags)
    }

    pub(crate) fn parse_start_action_with(&mut self, annotations: Option<SyntaxNode>, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::StartAction, |p| {
            let keyword = p.expect(SyntaxKind::StartKeyword, ParserContext::StartAction);
            let call = p.parse_expression(OperatorPrecedence::Unary, ExpressionFlags::rhs());
            let action = factory::node(SyntaxKind::StartAction, vec![annotations, Some(keyword), Some(call)]);
            p.check_action_allowed(action, flags)
        })
    }

    /// `wait f`, `wait f1 | f2` or `wait {a: f1, f2}`.
    pub(crate) fn parse_wait_action(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::WaitAction, |p| {
            let keyword = p.consume_node();
            let body = if p.peek_kind() == SyntaxKind::OpenBrace {
                p.parse_wait_fields()
            } else {
                let first = p.parse_expression(OperatorPrecedence::BitwiseOr, ExpressionFlags::rhs());
                if p.peek_kind() == SyntaxKind::Pipe {
                    let mut alternates = vec![first];
                    while p.peek_kind() == SyntaxKind::Pipe {
                        alternates.push(p.consume_node());
                        alternates.push(p.parse_expression(OperatorPrecedence::BitwiseOr, ExpressionFlags::rhs()));
                    }
                    factory::node(SyntaxKind::AlternateWaitExpression, vec![Some(factory::list(alternates))])
                } else {
                    first
                }
            };
            let action = factory::node(SyntaxKind::WaitAction, vec![Some(keyword), Some(body)]);
            p.check_action_allowed(action, flags)
        })
    }

    fn parse_wait_fields(&mut self) -> SyntaxNode {
        let open = self.consume_node();
        let (fields, close) = self.parse_delimited_list(
            ParserContext::WaitFields,
            SyntaxKind::CloseBrace,
            ListItem::WaitField,
            |p| {
                let name = p.expect(SyntaxKind::Identifier, ParserContext::WaitFields);
                let name = factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]);
                if p.peek_kind() != SyntaxKind::Colon {
                    return factory::node(SyntaxKind::WaitField, vec![Some(name), None, None]);
                }
                let colon = p.consume_node();
                let future = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                factory::node(SyntaxKind::WaitField, vec![Some(name), Some(colon), Some(future)])
            },
        );
        factory::node(SyntaxKind::WaitFieldsList, vec![Some(open), Some(fields), Some(close)])
    }

    /// `flush` or `flush worker`.
    pub(crate) fn parse_flush_action(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let keyword = self.consume_node();
        let peer = matches!(self.peek_kind(), SyntaxKind::Identifier | SyntaxKind::FunctionKeyword)
            .then(|| self.parse_peer_worker(ParserContext::FlushAction));
        let action = factory::node(SyntaxKind::FlushAction, vec![Some(keyword), peer]);
        self.check_action_allowed(action, flags)
    }

    pub(crate) fn parse_commit_action(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let keyword = self.consume_node();
        let action = factory::node(SyntaxKind::CommitAction, vec![Some(keyword)]);
        self.check_action_allowed(action, flags)
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

    #[test]
    fn test_remote_call_and_send() {
        let node = statement("clientEp->get(\"/path\");");
        assert_eq!(node.kind(), SyntaxKind::ActionStatement);
        assert!(node.find(SyntaxKind::RemoteMethodCallAction).is_some());
        assert!(!node.has_diagnostics());

        let node = statement("x -> w1;");
        assert!(node.find(SyntaxKind::AsyncSendAction).is_some());

        let node = statement("x ->> function;");
        assert!(node.find(SyntaxKind::SyncSendAction).is_some());
    }

    #[test]
    fn test_receive_and_wait() {
        let node = statement("int x = <- w1;");
        assert_eq!(node.kind(), SyntaxKind::LocalVariableDeclaration);
        assert!(node.find(SyntaxKind::ReceiveAction).is_some());
        assert!(!node.has_diagnostics());

        let node = statement("var r = wait f1 | f2;");
        assert!(node.find(SyntaxKind::AlternateWaitExpression).is_some());
        assert!(!node.has_diagnostics());

        let node = statement("var r = wait {a: f1, f2};");
        assert!(node.find(SyntaxKind::WaitFieldsList).is_some());
    }

    #[test]
    fn test_start_flush_commit() {
        let node = statement("future<int> f = start compute(1);");
        assert!(node.find(SyntaxKind::StartAction).is_some());
        assert!(!node.has_diagnostics());
        assert_eq!(statement("error? e = flush w1;").find(SyntaxKind::FlushAction).map(SyntaxNode::kind), Some(SyntaxKind::FlushAction));
        assert!(statement("check commit;").find(SyntaxKind::CommitAction).is_some());
    }

    #[test]
    fn test_action_inside_binary_operand_is_flagged() {
        let node = statement("int x = 1 + (<- w1);");
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::ActionNotAllowed);
        assert_eq!(node.to_source_string(), "int x = 1 + (<- w1);");
    }
}
