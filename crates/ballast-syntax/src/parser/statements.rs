// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statement parsing.
//!
//! A statement beginning with an identifier, `(`, `{` or `[` may be a
//! declaration or an expression; bounded lookahead decides the first three
//! and the bracketed-list resolver decides the last.

use super::context::ParserContext;
use super::expressions::{ExpressionFlags, is_expression_start};
use super::parser::Parser;
use super::precedence::OperatorPrecedence;
use super::recovery::{RecoveryRequest, Solution};
use super::types::{TypeOptions, is_type_start};
use super::validation::validate_qualifiers;
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

/// Returns true if `kind` can begin a statement.
pub fn is_statement_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OpenBrace
            | SyntaxKind::At
            | SyntaxKind::Underscore
            | SyntaxKind::FinalKeyword
            | SyntaxKind::IfKeyword
            | SyntaxKind::WhileKeyword
            | SyntaxKind::ForeachKeyword
            | SyntaxKind::MatchKeyword
            | SyntaxKind::DoKeyword
            | SyntaxKind::ReturnKeyword
            | SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::PanicKeyword
            | SyntaxKind::FailKeyword
            | SyntaxKind::LockKeyword
            | SyntaxKind::TransactionKeyword
            | SyntaxKind::RetryKeyword
            | SyntaxKind::RollbackKeyword
            | SyntaxKind::ForkKeyword
            | SyntaxKind::WorkerKeyword
    ) || is_expression_start(kind)
        || is_type_start(kind)
}

/// Keywords that only start module members; they end a statement list.
fn is_module_only_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ImportKeyword
            | SyntaxKind::PublicKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::EnumKeyword
            | SyntaxKind::ListenerKeyword
            | SyntaxKind::AnnotationKeyword
            | SyntaxKind::ConfigurableKeyword
    )
}

/// Expressions that may stand alone as a call statement.
fn is_call(node: &SyntaxNode) -> bool {
    match node.kind() {
        SyntaxKind::FunctionCall | SyntaxKind::MethodCall => true,
        SyntaxKind::CheckExpression => node.slot(1).is_some_and(is_call),
        _ => false,
    }
}

/// Expressions that may appear left of `=`.
fn is_lvalue(node: &SyntaxNode) -> bool {
    matches!(
        node.kind(),
        SyntaxKind::SimpleNameReference
            | SyntaxKind::QualifiedNameReference
            | SyntaxKind::FieldAccess
            | SyntaxKind::OptionalFieldAccess
            | SyntaxKind::IndexedExpression
    ) || node.kind().is_binding_pattern()
}

/// Keeps annotations that have nowhere to attach as invalid trivia in front
/// of the construct that follows them.
pub(crate) fn reject_annotations(node: SyntaxNode, annotations: Option<SyntaxNode>) -> SyntaxNode {
    match annotations {
        Some(annotations) => {
            factory::with_leading_invalid_node(node, annotations, DiagnosticCode::AnnotationsNotAllowed)
        }
        None => node,
    }
}

/// Keeps misplaced qualifiers in front of `node`, in their source order.
pub(crate) fn reject_qualifiers(node: SyntaxNode, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
    qualifiers.into_iter().rev().fold(node, |node, qualifier| {
        factory::with_leading_invalid_node(node, qualifier, DiagnosticCode::QualifierNotAllowed)
    })
}

impl<S: TokenSource> Parser<S> {
    pub fn parse_statement(&mut self) -> SyntaxNode {
        let annotations = self.parse_metadata();
        let kind = self.peek_kind();
        self.parse_statement_with(kind, annotations)
    }

    pub(crate) fn parse_statement_with(&mut self, mut kind: SyntaxKind, annotations: Option<SyntaxNode>) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::FinalKeyword => self.in_context(ParserContext::LocalVariableDeclaration, |p| {
                    let keyword = p.consume_node();
                    let binding = p.parse_typed_binding_pattern();
                    let next = p.peek_kind();
                    p.parse_var_decl_rhs_with(next, annotations, vec![keyword], binding, false)
                }),
                SyntaxKind::OpenBrace => {
                    let statement = if self.is_mapping_destructure_ahead() {
                        let pattern = self.parse_binding_pattern();
                        self.parse_statement_rhs_with(SyntaxKind::Equal, None, pattern)
                    } else {
                        self.parse_block()
                    };
                    reject_annotations(statement, annotations)
                }
                SyntaxKind::Underscore => self.with_plain_statement(annotations, Self::parse_destructure_statement),
                SyntaxKind::OpenBracket => self.parse_bracketed_statement(annotations),
                SyntaxKind::ErrorKeyword if self.is_error_destructure_ahead() => {
                    self.with_plain_statement(annotations, Self::parse_destructure_statement)
                }
                SyntaxKind::IfKeyword => self.with_plain_statement(annotations, Self::parse_if_else_statement),
                SyntaxKind::WhileKeyword => self.with_plain_statement(annotations, Self::parse_while_statement),
                SyntaxKind::ForeachKeyword => self.with_plain_statement(annotations, Self::parse_foreach_statement),
                SyntaxKind::MatchKeyword => self.with_plain_statement(annotations, Self::parse_match_statement),
                SyntaxKind::DoKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_block_statement_with_on_fail(SyntaxKind::DoStatement, ParserContext::DoBlock)
                }),
                SyntaxKind::LockKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_block_statement_with_on_fail(SyntaxKind::LockStatement, ParserContext::LockStatement)
                }),
                SyntaxKind::TransactionKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_block_statement_with_on_fail(
                        SyntaxKind::TransactionStatement,
                        ParserContext::TransactionStatement,
                    )
                }),
                SyntaxKind::ReturnKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_keyword_statement(SyntaxKind::ReturnStatement, ParserContext::ReturnStatement, false)
                }),
                SyntaxKind::RollbackKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_keyword_statement(SyntaxKind::RollbackStatement, ParserContext::RollbackStatement, false)
                }),
                SyntaxKind::PanicKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_keyword_statement(SyntaxKind::PanicStatement, ParserContext::PanicStatement, true)
                }),
                SyntaxKind::FailKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_keyword_statement(SyntaxKind::FailStatement, ParserContext::FailStatement, true)
                }),
                SyntaxKind::BreakKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_bare_statement(SyntaxKind::BreakStatement, ParserContext::BreakStatement)
                }),
                SyntaxKind::ContinueKeyword => self.with_plain_statement(annotations, |p| {
                    p.parse_bare_statement(SyntaxKind::ContinueStatement, ParserContext::ContinueStatement)
                }),
                SyntaxKind::RetryKeyword => self.with_plain_statement(annotations, Self::parse_retry_statement),
                SyntaxKind::ForkKeyword => self.with_plain_statement(annotations, Self::parse_fork_statement),
                SyntaxKind::WorkerKeyword => self.parse_named_worker(annotations),
                SyntaxKind::IsolatedKeyword | SyntaxKind::TransactionalKeyword
                    if self.peek_kind_at(2) == SyntaxKind::WorkerKeyword =>
                {
                    self.parse_named_worker(annotations)
                }
                SyntaxKind::Identifier => {
                    if self.is_identifier_var_decl_ahead() {
                        self.parse_local_var_decl(annotations)
                    } else {
                        self.parse_expression_statement(annotations)
                    }
                }
                SyntaxKind::OpenParen => {
                    if self.is_parenthesised_type_var_decl_ahead() {
                        self.parse_local_var_decl(annotations)
                    } else {
                        self.parse_expression_statement(annotations)
                    }
                }
                k if k.is_type_keyword() && self.peek_kind_at(2) != SyntaxKind::Colon => {
                    if k == SyntaxKind::ErrorKeyword && self.peek_kind_at(2) == SyntaxKind::OpenParen {
                        self.parse_expression_statement(annotations)
                    } else {
                        self.parse_local_var_decl(annotations)
                    }
                }
                SyntaxKind::ClientKeyword => self.parse_local_var_decl(annotations),
                k if is_expression_start(k) => self.parse_expression_statement(annotations),
                _ => match self.recover(RecoveryRequest::Statement {
                    annotations: annotations.clone(),
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

    fn with_plain_statement(
        &mut self,
        annotations: Option<SyntaxNode>,
        parse: impl FnOnce(&mut Self) -> SyntaxNode,
    ) -> SyntaxNode {
        let statement = parse(self);
        reject_annotations(statement, annotations)
    }

    /// `_ = v;` or `error(m) = e;`
    fn parse_destructure_statement(&mut self) -> SyntaxNode {
        let pattern = self.parse_binding_pattern();
        let next = self.peek_kind();
        self.parse_statement_rhs_with(next, None, pattern)
    }

    /// `T x`, `T? x =`, `T|U x`, `m:T x` or `T[] x` ahead of an identifier.
    fn is_identifier_var_decl_ahead(&mut self) -> bool {
        let mut k = 2;
        if self.peek_kind_at(2) == SyntaxKind::Colon && self.peek_kind_at(3) == SyntaxKind::Identifier {
            k = 4;
        }
        match self.peek_kind_at(k) {
            SyntaxKind::Identifier => true,
            SyntaxKind::QuestionMark => {
                self.peek_kind_at(k + 1) == SyntaxKind::Identifier
                    && matches!(self.peek_kind_at(k + 2), SyntaxKind::Equal | SyntaxKind::Semicolon)
            }
            SyntaxKind::Pipe | SyntaxKind::BitwiseAnd => true,
            SyntaxKind::OpenBracket => {
                let Some(end) = self.array_dimensions_end(k) else {
                    return false;
                };
                match self.peek_kind_at(end) {
                    SyntaxKind::Identifier => true,
                    SyntaxKind::QuestionMark => self.peek_kind_at(end + 1) == SyntaxKind::Identifier,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Skips `[n]` groups from lookahead index `k`, returning the index
    /// after the last one. Groups longer than one token are not dimensions.
    fn array_dimensions_end(&mut self, mut k: usize) -> Option<usize> {
        while self.peek_kind_at(k) == SyntaxKind::OpenBracket {
            let close = self.matching_close_at(k)?;
            if close > k + 2 {
                return None;
            }
            k = close + 1;
        }
        Some(k)
    }

    /// `(A|B) x` ahead.
    fn is_parenthesised_type_var_decl_ahead(&mut self) -> bool {
        let Some(close) = self.matching_close_at(1) else {
            return false;
        };
        match self.peek_kind_at(close + 1) {
            SyntaxKind::Identifier => true,
            SyntaxKind::QuestionMark => self.peek_kind_at(close + 2) == SyntaxKind::Identifier,
            SyntaxKind::OpenBracket => self
                .array_dimensions_end(close + 1)
                .is_some_and(|end| self.peek_kind_at(end) == SyntaxKind::Identifier),
            _ => false,
        }
    }

    /// `{ ... } =` ahead.
    fn is_mapping_destructure_ahead(&mut self) -> bool {
        self.matching_close_at(1)
            .is_some_and(|close| self.peek_kind_at(close + 1) == SyntaxKind::Equal)
    }

    /// `error(...) =` or `error T(...) =` ahead.
    fn is_error_destructure_ahead(&mut self) -> bool {
        let open = if self.peek_kind_at(2) == SyntaxKind::Identifier { 3 } else { 2 };
        if self.peek_kind_at(open) != SyntaxKind::OpenParen {
            return false;
        }
        self.matching_close_at(open)
            .is_some_and(|close| self.peek_kind_at(close + 1) == SyntaxKind::Equal)
    }

    fn parse_local_var_decl(&mut self, annotations: Option<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::LocalVariableDeclaration, |p| {
            let binding = p.parse_typed_binding_pattern();
            let next = p.peek_kind();
            p.parse_var_decl_rhs_with(next, annotations, Vec::new(), binding, false)
        })
    }

    /// Finishes a local declaration whose type is already parsed.
    pub(crate) fn parse_local_var_decl_from_type(&mut self, annotations: Option<SyntaxNode>, ty: SyntaxNode) -> SyntaxNode {
        self.in_context(ParserContext::LocalVariableDeclaration, |p| {
            let ty = p.parse_complex_type(ty, TypeOptions::for_context(ParserContext::TypedBindingPattern));
            let binding = p.parse_typed_binding_pattern_rest(ty);
            let next = p.peek_kind();
            p.parse_var_decl_rhs_with(next, annotations, Vec::new(), binding, false)
        })
    }

    /// Initializer and terminator of a local or module variable declaration.
    pub(crate) fn parse_var_decl_rhs_with(
        &mut self,
        mut kind: SyntaxKind,
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
        binding: SyntaxNode,
        module_level: bool,
    ) -> SyntaxNode {
        let context = if module_level {
            ParserContext::ModuleVariableDeclaration
        } else {
            ParserContext::LocalVariableDeclaration
        };
        loop {
            return match kind {
                SyntaxKind::Equal => {
                    let equal = self.consume_node();
                    let initializer = if module_level && self.peek_kind() == SyntaxKind::QuestionMark {
                        let question = self.consume_node();
                        factory::node(SyntaxKind::RequiredExpression, vec![Some(question)])
                    } else {
                        self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs().with_actions(true))
                    };
                    let semicolon = self.expect(SyntaxKind::Semicolon, context);
                    Self::finish_var_decl(
                        metadata,
                        qualifiers,
                        binding,
                        [Some(equal), Some(initializer), Some(semicolon)],
                        module_level,
                    )
                }
                SyntaxKind::Semicolon => {
                    let semicolon = self.consume_node();
                    Self::finish_var_decl(metadata, qualifiers, binding, [None, None, Some(semicolon)], module_level)
                }
                _ => match self.recover(RecoveryRequest::VariableDeclarationRhs {
                    metadata: metadata.clone(),
                    qualifiers: qualifiers.clone(),
                    binding: binding.clone(),
                    module_level,
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => {
                        Self::finish_var_decl(metadata, qualifiers, binding, [None, None, Some(missing)], module_level)
                    }
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// `tail` is `=`, initializer and `;`.
    fn finish_var_decl(
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
        binding: SyntaxNode,
        tail: [Option<SyntaxNode>; 3],
        module_level: bool,
    ) -> SyntaxNode {
        let [equal, initializer, semicolon] = tail;
        if module_level {
            factory::node(
                SyntaxKind::ModuleVariableDeclaration,
                vec![metadata, Some(factory::list(qualifiers)), Some(binding), equal, initializer, semicolon],
            )
        } else {
            let final_keyword = qualifiers.into_iter().next();
            factory::node(
                SyntaxKind::LocalVariableDeclaration,
                vec![metadata, final_keyword, Some(binding), equal, initializer, semicolon],
            )
        }
    }

    fn parse_expression_statement(&mut self, annotations: Option<SyntaxNode>) -> SyntaxNode {
        let flags = ExpressionFlags::statement_start();
        let expression = match annotations {
            Some(annotations) if self.peek_kind() == SyntaxKind::StartKeyword => {
                let start = self.parse_start_action_with(Some(annotations), flags);
                self.parse_expression_rhs(OperatorPrecedence::Default, start, flags)
            }
            annotations => {
                let expression = self.parse_expression(OperatorPrecedence::Default, flags);
                let next = self.peek_kind();
                let statement = self.parse_statement_rhs_with(next, None, expression);
                return reject_annotations(statement, annotations);
            }
        };
        let next = self.peek_kind();
        self.parse_statement_rhs_with(next, None, expression)
    }

    /// Continues a statement after its left-hand expression or pattern.
    pub(crate) fn parse_statement_rhs_with(
        &mut self,
        kind: SyntaxKind,
        annotations: Option<SyntaxNode>,
        lhs: SyntaxNode,
    ) -> SyntaxNode {
        let statement = self.parse_statement_rhs(kind, lhs);
        reject_annotations(statement, annotations)
    }

    fn parse_statement_rhs(&mut self, mut kind: SyntaxKind, lhs: SyntaxNode) -> SyntaxNode {
        loop {
            if kind == self.peek_kind()
                && let Some(shape) = self.compound_assignment_ahead()
            {
                return self.in_context(ParserContext::CompoundAssignmentStatement, |p| {
                    let (operator, equal) = p.parse_compound_operator(shape);
                    let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs().with_actions(true));
                    let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::CompoundAssignmentStatement);
                    factory::node(
                        SyntaxKind::CompoundAssignmentStatement,
                        vec![Some(lhs), Some(operator), equal, Some(value), Some(semicolon)],
                    )
                });
            }
            return match kind {
                SyntaxKind::Equal => self.parse_assignment(lhs),
                SyntaxKind::Semicolon => {
                    let semicolon = self.consume_node();
                    Self::finish_expression_statement(lhs, semicolon)
                }
                _ => match self.recover(RecoveryRequest::StatementRhs {
                    annotations: None,
                    lhs: lhs.clone(),
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => Self::finish_expression_statement(lhs, missing),
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    fn parse_assignment(&mut self, lhs: SyntaxNode) -> SyntaxNode {
        let (kind, context) = if lhs.kind().is_binding_pattern() {
            (SyntaxKind::DestructuringAssignmentStatement, ParserContext::DestructuringAssignment)
        } else {
            (SyntaxKind::AssignmentStatement, ParserContext::AssignmentStatement)
        };
        let lhs = if is_lvalue(&lhs) {
            lhs
        } else {
            factory::with_diagnostic(lhs, DiagnosticCode::InvalidAssignmentTarget)
        };
        self.in_context(context, |p| {
            let equal = p.expect(SyntaxKind::Equal, context);
            let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs().with_actions(true));
            let semicolon = p.expect(SyntaxKind::Semicolon, context);
            factory::node(kind, vec![Some(lhs), Some(equal), Some(value), Some(semicolon)])
        })
    }

    fn finish_expression_statement(expression: SyntaxNode, semicolon: SyntaxNode) -> SyntaxNode {
        if is_call(&expression) {
            factory::node(SyntaxKind::CallStatement, vec![Some(expression), Some(semicolon)])
        } else if expression.kind().is_action() {
            factory::node(SyntaxKind::ActionStatement, vec![Some(expression), Some(semicolon)])
        } else {
            let statement = factory::node(SyntaxKind::ExpressionStatement, vec![Some(expression), Some(semicolon)]);
            factory::with_diagnostic(statement, DiagnosticCode::ExpressionStatementNotAllowed)
        }
    }

    /// Statements up to the closing brace of the enclosing block.
    pub(crate) fn parse_statements(&mut self) -> SyntaxNode {
        self.parse_node_list(
            |kind| kind == SyntaxKind::CloseBrace || is_module_only_keyword(kind),
            Self::parse_statement,
        )
    }

    /// `{ statements }`.
    pub(crate) fn parse_block(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::BlockStatement, |p| {
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::BlockStatement);
            let statements = p.parse_statements();
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::BlockStatement);
            factory::node(SyntaxKind::BlockStatement, vec![Some(open), Some(statements), Some(close)])
        })
    }

    /// `{ statements }` as a function body.
    pub(crate) fn parse_function_body_block(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::FunctionBodyBlock, |p| {
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::FunctionBodyBlock);
            let statements = p.parse_statements();
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::FunctionBodyBlock);
            factory::node(SyntaxKind::FunctionBodyBlock, vec![Some(open), Some(statements), Some(close)])
        })
    }

    fn parse_condition(&mut self) -> SyntaxNode {
        self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs())
    }

    fn parse_if_else_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::IfBlock, |p| {
            let keyword = p.consume_node();
            let condition = p.parse_condition();
            let body = p.parse_block();
            let else_body = (p.peek_kind() == SyntaxKind::ElseKeyword).then(|| {
                p.in_context(ParserContext::ElseBlock, |p| {
                    let keyword = p.consume_node();
                    let next = p.peek_kind();
                    let body = p.parse_else_body_with(next);
                    factory::node(SyntaxKind::ElseBlock, vec![Some(keyword), Some(body)])
                })
            });
            factory::node(
                SyntaxKind::IfElseStatement,
                vec![Some(keyword), Some(condition), Some(body), else_body],
            )
        })
    }

    /// `if ...` or `{ ... }` after `else`.
    pub(crate) fn parse_else_body_with(&mut self, mut kind: SyntaxKind) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::IfKeyword => self.parse_if_else_statement(),
                SyntaxKind::OpenBrace => self.parse_block(),
                _ => match self.recover(RecoveryRequest::ElseBody) {
                    Solution::Remove(node) => node,
                    Solution::Insert { kind: inserted, .. } | Solution::Keep(inserted) => {
                        kind = inserted;
                        continue;
                    }
                },
            };
        }
    }

    fn parse_on_fail_clause(&mut self) -> Option<SyntaxNode> {
        if self.peek_kind() != SyntaxKind::OnKeyword || self.peek_kind_at(2) != SyntaxKind::FailKeyword {
            return None;
        }
        Some(self.in_context(ParserContext::OnFailClause, |p| {
            let on = p.consume_node();
            let fail = p.consume_node();
            let binding = (p.peek_kind() != SyntaxKind::OpenBrace).then(|| p.parse_typed_binding_pattern());
            let body = p.parse_block();
            factory::node(SyntaxKind::OnFailClause, vec![Some(on), Some(fail), binding, Some(body)])
        }))
    }

    fn parse_while_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::WhileBlock, |p| {
            let keyword = p.consume_node();
            let condition = p.parse_condition();
            let body = p.parse_block();
            let on_fail = p.parse_on_fail_clause();
            factory::node(
                SyntaxKind::WhileStatement,
                vec![Some(keyword), Some(condition), Some(body), on_fail],
            )
        })
    }

    fn parse_foreach_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ForeachStatement, |p| {
            let keyword = p.consume_node();
            let binding = p.parse_typed_binding_pattern();
            let in_keyword = p.expect(SyntaxKind::InKeyword, ParserContext::ForeachStatement);
            let iterable = p.parse_condition();
            let body = p.parse_block();
            let on_fail = p.parse_on_fail_clause();
            factory::node(
                SyntaxKind::ForeachStatement,
                vec![Some(keyword), Some(binding), Some(in_keyword), Some(iterable), Some(body), on_fail],
            )
        })
    }

    /// `keyword block on-fail?` for do, lock and transaction.
    fn parse_block_statement_with_on_fail(&mut self, kind: SyntaxKind, context: ParserContext) -> SyntaxNode {
        self.in_context(context, |p| {
            let keyword = p.consume_node();
            let body = p.parse_block();
            let on_fail = p.parse_on_fail_clause();
            factory::node(kind, vec![Some(keyword), Some(body), on_fail])
        })
    }

    fn parse_match_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::MatchStatement, |p| {
            let keyword = p.consume_node();
            let subject = p.parse_condition();
            let (open, clauses, close) = p.in_context(ParserContext::MatchBody, |p| {
                let open = p.expect(SyntaxKind::OpenBrace, ParserContext::MatchBody);
                let clauses = p.parse_node_list(|kind| kind == SyntaxKind::CloseBrace, Self::parse_match_clause);
                let close = p.expect(SyntaxKind::CloseBrace, ParserContext::MatchBody);
                (open, clauses, close)
            });
            let on_fail = p.parse_on_fail_clause();
            factory::node(
                SyntaxKind::MatchStatement,
                vec![Some(keyword), Some(subject), Some(open), Some(clauses), Some(close), on_fail],
            )
        })
    }

    /// `p1 | p2 if guard => { ... }`.
    fn parse_match_clause(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::MatchClause, |p| {
            let mut patterns = vec![p.parse_match_pattern()];
            while p.peek_kind() == SyntaxKind::Pipe {
                patterns.push(p.consume_node());
                patterns.push(p.parse_match_pattern());
            }
            let guard = (p.peek_kind() == SyntaxKind::IfKeyword).then(|| {
                p.in_context(ParserContext::MatchGuard, |p| {
                    let keyword = p.consume_node();
                    let condition = p.parse_expression(
                        OperatorPrecedence::Default,
                        ExpressionFlags::rhs().with_match_guard(true),
                    );
                    factory::node(SyntaxKind::MatchGuard, vec![Some(keyword), Some(condition)])
                })
            });
            let arrow = p.expect(SyntaxKind::RightDoubleArrow, ParserContext::MatchClause);
            let body = p.parse_block();
            factory::node(
                SyntaxKind::MatchClause,
                vec![Some(factory::list(patterns)), guard, Some(arrow), Some(body)],
            )
        })
    }

    /// `keyword expression? ;` for return, rollback, panic and fail.
    fn parse_keyword_statement(&mut self, kind: SyntaxKind, context: ParserContext, required: bool) -> SyntaxNode {
        self.in_context(context, |p| {
            let keyword = p.consume_node();
            let value = (required || p.peek_kind() != SyntaxKind::Semicolon).then(|| {
                p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs().with_actions(true))
            });
            let semicolon = p.expect(SyntaxKind::Semicolon, context);
            factory::node(kind, vec![Some(keyword), value, Some(semicolon)])
        })
    }

    fn parse_bare_statement(&mut self, kind: SyntaxKind, context: ParserContext) -> SyntaxNode {
        self.in_context(context, |p| {
            let keyword = p.consume_node();
            let semicolon = p.expect(SyntaxKind::Semicolon, context);
            factory::node(kind, vec![Some(keyword), Some(semicolon)])
        })
    }

    /// `retry<Manager>(args) { }` or `retry transaction { }`.
    fn parse_retry_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::RetryStatement, |p| {
            let keyword = p.consume_node();
            let manager = (p.peek_kind() == SyntaxKind::Lt).then(|| {
                p.in_context(ParserContext::TypeParameter, |p| {
                    let open = p.consume_node();
                    let ty = p.parse_type_descriptor(ParserContext::TypeParameter);
                    let close = p.expect(SyntaxKind::Gt, ParserContext::TypeParameter);
                    factory::node(SyntaxKind::TypeParameter, vec![Some(open), Some(ty), Some(close)])
                })
            });
            let args = (p.peek_kind() == SyntaxKind::OpenParen).then(|| p.parse_parenthesized_arg_list());
            let body = if p.peek_kind() == SyntaxKind::TransactionKeyword {
                p.parse_block_statement_with_on_fail(SyntaxKind::TransactionStatement, ParserContext::TransactionStatement)
            } else {
                p.parse_block()
            };
            let on_fail = p.parse_on_fail_clause();
            factory::node(
                SyntaxKind::RetryStatement,
                vec![Some(keyword), manager, args, Some(body), on_fail],
            )
        })
    }

    fn parse_fork_statement(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ForkStatement, |p| {
            let keyword = p.consume_node();
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::ForkStatement);
            let workers = p.parse_node_list(
                |kind| kind == SyntaxKind::CloseBrace,
                |p| {
                    let annotations = p.parse_metadata();
                    p.parse_named_worker(annotations)
                },
            );
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::ForkStatement);
            factory::node(
                SyntaxKind::ForkStatement,
                vec![Some(keyword), Some(open), Some(workers), Some(close)],
            )
        })
    }

    /// `@a isolated worker w returns T { }`.
    fn parse_named_worker(&mut self, annotations: Option<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::NamedWorkerDeclaration, |p| {
            let mut qualifiers = Vec::new();
            while matches!(
                p.peek_kind(),
                SyntaxKind::IsolatedKeyword | SyntaxKind::TransactionalKeyword
            ) {
                qualifiers.push(p.consume_node());
            }
            let qualifiers = validate_qualifiers(
                qualifiers,
                &[SyntaxKind::IsolatedKeyword, SyntaxKind::TransactionalKeyword],
            );
            let keyword = p.expect(SyntaxKind::WorkerKeyword, ParserContext::NamedWorkerDeclaration);
            let name = p.expect(SyntaxKind::Identifier, ParserContext::NamedWorkerDeclaration);
            let return_type = (p.peek_kind() == SyntaxKind::ReturnsKeyword).then(|| p.parse_return_type_descriptor());
            let body = p.parse_block();
            factory::node(
                SyntaxKind::NamedWorkerDeclaration,
                vec![annotations, Some(qualifiers), Some(keyword), Some(name), return_type, Some(body)],
            )
        })
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

    fn clean(source: &str, kind: SyntaxKind) -> SyntaxNode {
        let node = statement(source);
        assert_eq!(node.kind(), kind, "{source}");
        assert!(!node.has_diagnostics(), "{source}: {:?}", node.diagnostics());
        node
    }

    #[test]
    fn test_variable_declarations() {
        clean("int x = 1;", SyntaxKind::LocalVariableDeclaration);
        clean("Person p;", SyntaxKind::LocalVariableDeclaration);
        clean("http:Client c = check new (url);", SyntaxKind::LocalVariableDeclaration);
        clean("int[] xs = [];", SyntaxKind::LocalVariableDeclaration);
        clean("Foo? f = ();", SyntaxKind::LocalVariableDeclaration);
        clean("A|B v = a;", SyntaxKind::LocalVariableDeclaration);
        clean("(int|string)[] vs = [];", SyntaxKind::LocalVariableDeclaration);
        clean("final var y = x;", SyntaxKind::LocalVariableDeclaration);
        clean("map<map<int>> x;", SyntaxKind::LocalVariableDeclaration);
    }

    #[test]
    fn test_assignments() {
        clean("x = 1;", SyntaxKind::AssignmentStatement);
        clean("a.b[0] = y;", SyntaxKind::AssignmentStatement);
        clean("_ = f();", SyntaxKind::DestructuringAssignmentStatement);
        clean("{a, b: c} = rec;", SyntaxKind::DestructuringAssignmentStatement);
        clean("error(m) = e;", SyntaxKind::DestructuringAssignmentStatement);
    }

    #[test]
    fn test_compound_assignments() {
        let node = clean("x += 1;", SyntaxKind::CompoundAssignmentStatement);
        assert!(node.slot(2).is_some());

        let node = clean("x >>= 2;", SyntaxKind::CompoundAssignmentStatement);
        assert_eq!(node.slot(1).map(SyntaxNode::kind), Some(SyntaxKind::CompositeOperator));
        assert!(node.slot(2).is_none());

        clean("x >>>= 2;", SyntaxKind::CompoundAssignmentStatement);
        clean("x <<= 2;", SyntaxKind::CompoundAssignmentStatement);
    }

    #[test]
    fn test_shift_expression_is_not_a_declaration() {
        let node = statement("a >> b;");
        assert_eq!(node.kind(), SyntaxKind::ExpressionStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::ExpressionStatementNotAllowed);
        assert!(node.find(SyntaxKind::BinaryExpression).is_some());
    }

    #[test]
    fn test_call_statements() {
        clean("foo(1);", SyntaxKind::CallStatement);
        clean("check obj.run();", SyntaxKind::CallStatement);
        clean("io:println(\"hi\");", SyntaxKind::CallStatement);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let node = statement("f() = 1;");
        assert_eq!(node.kind(), SyntaxKind::AssignmentStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::InvalidAssignmentTarget);
    }

    #[test]
    fn test_control_flow() {
        clean("if a { } else if b { } else { }", SyntaxKind::IfElseStatement);
        clean("while i < 10 { i += 1; } on fail error e { }", SyntaxKind::WhileStatement);
        clean("foreach int i in 0 ..< n { continue; }", SyntaxKind::ForeachStatement);
        clean("do { fail error(\"x\"); } on fail { }", SyntaxKind::DoStatement);
        clean("lock { count += 1; }", SyntaxKind::LockStatement);
        clean("return;", SyntaxKind::ReturnStatement);
        clean("panic e;", SyntaxKind::PanicStatement);
        clean("break;", SyntaxKind::BreakStatement);
    }

    #[test]
    fn test_match_statement() {
        let node = clean(
            "match v { 1 | 2 => { } [var a, _] if a > 0 => { } _ => { } }",
            SyntaxKind::MatchStatement,
        );
        assert_eq!(node.find_all(SyntaxKind::MatchClause).len(), 3);
        assert!(node.find(SyntaxKind::MatchGuard).is_some());
    }

    #[test]
    fn test_transactions() {
        clean("transaction { check commit; }", SyntaxKind::TransactionStatement);
        clean("retry<MyRetry>(3) transaction { rollback; }", SyntaxKind::RetryStatement);
    }

    #[test]
    fn test_workers() {
        let node = clean(
            "fork { worker a returns int { return 1; } worker b { } }",
            SyntaxKind::ForkStatement,
        );
        assert_eq!(node.find_all(SyntaxKind::NamedWorkerDeclaration).len(), 2);
        clean("@strand {thread: \"any\"} worker w { }", SyntaxKind::NamedWorkerDeclaration);
    }

    #[test]
    fn test_annotated_start_keeps_annotations() {
        let node = clean("@strand {thread: \"any\"} start f();", SyntaxKind::ActionStatement);
        let start = node.find(SyntaxKind::StartAction).expect("start");
        assert_eq!(start.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::Metadata));
    }

    #[test]
    fn test_misplaced_annotation_is_invalid_trivia() {
        let node = statement("@a return;");
        assert_eq!(node.kind(), SyntaxKind::ReturnStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::AnnotationsNotAllowed);
    }

    #[test]
    fn test_misplaced_annotations_stay_in_source_order() {
        let node = statement("@a {b, c: d} = v;");
        assert!(node.has_diagnostics());

        let node = statement("@a _ = f();");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::AnnotationsNotAllowed);

        let node = statement("@a error(m) = e;");
        assert_eq!(node.kind(), SyntaxKind::DestructuringAssignmentStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::AnnotationsNotAllowed);

        let node = statement("@a x.y = 1;");
        assert_eq!(node.kind(), SyntaxKind::AssignmentStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::AnnotationsNotAllowed);
    }

    #[test]
    fn test_annotations_before_removed_token() {
        let source = "function f() { @a {b} = v; }";
        let node = Parser::new(TokenReader::new(source)).parse();
        assert_eq!(node.to_source_string(), source);
        assert!(node.has_diagnostics());
    }

    #[test]
    fn test_missing_semicolon() {
        let node = statement("x = 1");
        assert_eq!(node.kind(), SyntaxKind::AssignmentStatement);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::MissingSemicolon);
    }
}
