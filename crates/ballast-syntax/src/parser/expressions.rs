// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expression parsing.
//!
//! One precedence-climbing loop serves expressions and actions alike. An
//! operand is parsed first, then infix and postfix operators are folded in
//! while their level is above the current floor.

use super::context::ParserContext;
use super::parser::Parser;
use super::precedence::{OperatorPrecedence, rhs_precedence};
use super::recovery::{ListItem, RecoveryRequest, Solution};
use super::validation::{validate_arguments, validate_qualifiers};
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

/// Flags threaded through expression parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExpressionFlags {
    /// The expression is on the right of something. At statement start a
    /// compound assignment operator ends the expression instead.
    pub is_rhs: bool,
    /// Actions are legal here.
    pub allow_actions: bool,
    /// Inside a match guard, where `x =>` ends the guard.
    pub in_match_guard: bool,
    /// Inside the middle operand of a conditional expression.
    pub in_conditional: bool,
}

impl ExpressionFlags {
    /// Plain right-hand-side expression without actions.
    pub fn rhs() -> Self {
        Self {
            is_rhs: true,
            ..Self::default()
        }
    }

    /// Expression at the start of a statement.
    pub fn statement_start() -> Self {
        Self {
            is_rhs: false,
            allow_actions: true,
            ..Self::default()
        }
    }

    pub fn with_actions(self, allow_actions: bool) -> Self {
        Self { allow_actions, ..self }
    }

    pub fn without_actions(self) -> Self {
        self.with_actions(false)
    }

    pub fn with_conditional(self, in_conditional: bool) -> Self {
        Self { in_conditional, ..self }
    }

    pub fn with_match_guard(self, in_match_guard: bool) -> Self {
        Self { in_match_guard, ..self }
    }

    /// Flags for a nested operand: always rhs, never in a conditional middle.
    fn nested(self) -> Self {
        Self {
            is_rhs: true,
            in_conditional: false,
            ..self
        }
    }
}

/// Returns true if `kind` can begin an expression.
pub fn is_expression_start(kind: SyntaxKind) -> bool {
    kind.is_literal()
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::OpenParen
                | SyntaxKind::OpenBracket
                | SyntaxKind::OpenBrace
                | SyntaxKind::Minus
                | SyntaxKind::Plus
                | SyntaxKind::Exclamation
                | SyntaxKind::Tilde
                | SyntaxKind::Lt
                | SyntaxKind::TypeofKeyword
                | SyntaxKind::TrapKeyword
                | SyntaxKind::CheckKeyword
                | SyntaxKind::CheckpanicKeyword
                | SyntaxKind::ErrorKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::IsolatedKeyword
                | SyntaxKind::TransactionalKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::LetKeyword
                | SyntaxKind::FromKeyword
                | SyntaxKind::StartKeyword
                | SyntaxKind::WaitKeyword
                | SyntaxKind::FlushKeyword
                | SyntaxKind::CommitKeyword
                | SyntaxKind::LeftArrow
        )
}

/// Shape of a compound assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CompoundOperator {
    /// Tokens making up the operator.
    pub tokens: usize,
    /// The `=` is part of the operator's last token (`>=`).
    pub fused_equal: bool,
}

impl<S: TokenSource> Parser<S> {
    /// Parses an expression whose operators all bind tighter than `floor`.
    pub fn parse_expression(&mut self, floor: OperatorPrecedence, flags: ExpressionFlags) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_expression_with(kind, floor, flags)
    }

    /// Like [`Parser::parse_expression`], dispatching on `kind`.
    pub(crate) fn parse_expression_with(
        &mut self,
        kind: SyntaxKind,
        floor: OperatorPrecedence,
        flags: ExpressionFlags,
    ) -> SyntaxNode {
        self.in_context(ParserContext::Expression, |p| {
            let lhs = p.parse_terminal_expression_with(kind, floor, flags);
            p.parse_expression_rhs(floor, lhs, flags)
        })
    }

    fn parse_terminal_expression_with(
        &mut self,
        mut kind: SyntaxKind,
        floor: OperatorPrecedence,
        flags: ExpressionFlags,
    ) -> SyntaxNode {
        loop {
            let next = self.peek_kind_at(2);
            return match kind {
                k if k.is_type_keyword() && next == SyntaxKind::Colon => self.parse_langlib_reference(),
                k if k.is_literal() => self.parse_basic_literal(),
                SyntaxKind::Identifier => {
                    if !flags.in_match_guard && next == SyntaxKind::RightDoubleArrow {
                        self.parse_single_param_arrow_function(flags)
                    } else {
                        self.parse_name_reference(flags.in_conditional)
                    }
                }
                SyntaxKind::OpenParen => self.parse_braced_or_arrow_function(flags),
                SyntaxKind::OpenBracket => self.parse_list_constructor(),
                SyntaxKind::OpenBrace => self.parse_mapping_constructor(),
                SyntaxKind::Minus | SyntaxKind::Plus | SyntaxKind::Exclamation | SyntaxKind::Tilde => {
                    self.parse_unary_expression(flags)
                }
                SyntaxKind::TypeofKeyword => {
                    let keyword = self.consume_node();
                    let operand = self.parse_expression(OperatorPrecedence::Unary, flags.nested().without_actions());
                    factory::node(SyntaxKind::TypeofExpression, vec![Some(keyword), Some(operand)])
                }
                SyntaxKind::TrapKeyword => {
                    let keyword = self.consume_node();
                    let operand = self.parse_expression(OperatorPrecedence::Trap, flags.nested());
                    factory::node(SyntaxKind::TrapExpression, vec![Some(keyword), Some(operand)])
                }
                SyntaxKind::CheckKeyword | SyntaxKind::CheckpanicKeyword => self.parse_check_expression(flags),
                SyntaxKind::Lt => self.parse_type_cast(flags),
                SyntaxKind::ErrorKeyword => self.parse_error_constructor(),
                SyntaxKind::FunctionKeyword | SyntaxKind::IsolatedKeyword | SyntaxKind::TransactionalKeyword => {
                    self.parse_explicit_anonymous_function()
                }
                SyntaxKind::NewKeyword => self.parse_new_expression(),
                SyntaxKind::LetKeyword => self.parse_let_expression(flags),
                SyntaxKind::FromKeyword => self.parse_query(flags),
                SyntaxKind::StartKeyword | SyntaxKind::At => self.parse_start_action(flags),
                SyntaxKind::WaitKeyword => self.parse_wait_action(flags),
                SyntaxKind::FlushKeyword => self.parse_flush_action(flags),
                SyntaxKind::CommitKeyword => self.parse_commit_action(flags),
                SyntaxKind::LeftArrow => self.parse_receive_action(flags),
                _ => match self.recover(RecoveryRequest::Expression { floor, flags }) {
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

    /// Folds operators binding tighter than `floor` onto `lhs`.
    pub(crate) fn parse_expression_rhs(
        &mut self,
        floor: OperatorPrecedence,
        mut lhs: SyntaxNode,
        flags: ExpressionFlags,
    ) -> SyntaxNode {
        loop {
            if !flags.is_rhs && self.compound_assignment_ahead().is_some() {
                break;
            }
            let Some((precedence, width)) = self.operator_ahead() else {
                break;
            };
            if precedence <= floor {
                break;
            }
            lhs = match self.peek_kind() {
                SyntaxKind::OpenParen => self.parse_function_call(lhs),
                SyntaxKind::Dot => self.parse_field_access_or_method_call(lhs),
                SyntaxKind::OptionalChaining => {
                    let operator = self.consume_node();
                    let name = self.expect(SyntaxKind::Identifier, ParserContext::Expression);
                    factory::node(SyntaxKind::OptionalFieldAccess, vec![Some(lhs), Some(operator), Some(name)])
                }
                SyntaxKind::OpenBracket => self.parse_indexed_expression(lhs),
                SyntaxKind::RightArrow => self.parse_remote_call_or_async_send(lhs, flags),
                SyntaxKind::SyncSendArrow => self.parse_sync_send(lhs, flags),
                SyntaxKind::IsKeyword | SyntaxKind::NotIs => {
                    let operator = self.consume_node();
                    let ty = self.parse_type_descriptor(ParserContext::TypeTestExpression);
                    factory::node(SyntaxKind::TypeTestExpression, vec![Some(lhs), Some(operator), Some(ty)])
                }
                SyntaxKind::QuestionMark => self.parse_conditional_expression(lhs, flags),
                SyntaxKind::Elvis => {
                    let operator = self.consume_node();
                    let rhs = self.parse_expression(OperatorPrecedence::Conditional, flags.nested().without_actions());
                    factory::node(SyntaxKind::BinaryExpression, vec![Some(lhs), Some(operator), Some(rhs)])
                }
                _ => {
                    let operator = self.parse_binary_operator(width);
                    let rhs = self.parse_expression(precedence, flags.nested().without_actions());
                    factory::node(SyntaxKind::BinaryExpression, vec![Some(lhs), Some(operator), Some(rhs)])
                }
            };
        }
        lhs
    }

    /// Level and token width of the operator at the current position.
    ///
    /// Adjacent `>` tokens are read as one shift operator.
    fn operator_ahead(&mut self) -> Option<(OperatorPrecedence, usize)> {
        let kind = self.peek_kind();
        if kind == SyntaxKind::Gt && self.peek_kind_at(2) == SyntaxKind::Gt {
            let width = if self.peek_kind_at(3) == SyntaxKind::Gt { 3 } else { 2 };
            return Some((OperatorPrecedence::Shift, width));
        }
        rhs_precedence(kind).map(|precedence| (precedence, 1))
    }

    /// Consumes a `width`-token operator. Multi-token operators are
    /// reassembled and flagged if trivia separates their parts.
    fn parse_binary_operator(&mut self, width: usize) -> SyntaxNode {
        if width == 1 {
            return self.consume_node();
        }
        let mut tokens = Vec::with_capacity(width);
        let mut adjacent = true;
        for _ in 0..width {
            let token = self.consume_token();
            if let Some(SyntaxNode::Token(previous)) = tokens.last() {
                adjacent &= Self::adjacent(previous, &token);
            }
            tokens.push(SyntaxNode::Token(token));
        }
        let operator = factory::node(SyntaxKind::CompositeOperator, tokens.into_iter().map(Some).collect());
        if adjacent {
            operator
        } else {
            factory::with_diagnostic(operator, DiagnosticCode::InvalidShiftOperator)
        }
    }

    /// Detects `op=` at the current position without consuming anything.
    pub(crate) fn compound_assignment_ahead(&mut self) -> Option<CompoundOperator> {
        let first = self.peek_token();
        if !first.kind().is_compound_operator() {
            return None;
        }
        let second = self.peek_token_at(2);
        if !Self::adjacent(&first, &second) {
            return None;
        }
        match (first.kind(), second.kind()) {
            (SyntaxKind::Gt, SyntaxKind::GtEqual) => Some(CompoundOperator {
                tokens: 2,
                fused_equal: true,
            }),
            (SyntaxKind::Gt, SyntaxKind::Gt) => {
                let third = self.peek_token_at(3);
                (third.kind() == SyntaxKind::GtEqual && Self::adjacent(&second, &third)).then_some(CompoundOperator {
                    tokens: 3,
                    fused_equal: true,
                })
            }
            (SyntaxKind::Gt, _) => None,
            (_, SyntaxKind::Equal) => Some(CompoundOperator {
                tokens: 1,
                fused_equal: false,
            }),
            _ => None,
        }
    }

    /// Consumes a compound operator detected by
    /// [`Parser::compound_assignment_ahead`], returning operator and `=`.
    pub(crate) fn parse_compound_operator(&mut self, shape: CompoundOperator) -> (SyntaxNode, Option<SyntaxNode>) {
        let operator = if shape.tokens == 1 {
            self.consume_node()
        } else {
            let tokens = (0..shape.tokens).map(|_| Some(self.consume_node())).collect();
            factory::node(SyntaxKind::CompositeOperator, tokens)
        };
        let equal = (!shape.fused_equal).then(|| self.consume_node());
        (operator, equal)
    }

    fn parse_basic_literal(&mut self) -> SyntaxNode {
        let token = self.consume_node();
        factory::node(SyntaxKind::BasicLiteral, vec![Some(token)])
    }

    /// `name` or `module:name`.
    pub(crate) fn parse_name_reference(&mut self, in_conditional: bool) -> SyntaxNode {
        let name = self.expect(SyntaxKind::Identifier, ParserContext::Expression);
        if self.is_qualified_name_ahead(in_conditional) {
            let colon = self.consume_node();
            let identifier = self.expect(SyntaxKind::Identifier, ParserContext::Expression);
            return factory::node(
                SyntaxKind::QualifiedNameReference,
                vec![Some(name), Some(colon), Some(identifier)],
            );
        }
        factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)])
    }

    /// In the middle of `a ? b : c` the colon belongs to the conditional
    /// unless a second colon follows.
    fn is_qualified_name_ahead(&mut self, in_conditional: bool) -> bool {
        self.peek_kind() == SyntaxKind::Colon
            && self.peek_kind_at(2) == SyntaxKind::Identifier
            && (!in_conditional || self.peek_kind_at(3) == SyntaxKind::Colon)
    }

    /// `int:max` and friends; the keyword stays a keyword.
    fn parse_langlib_reference(&mut self) -> SyntaxNode {
        let module = self.consume_node();
        let colon = self.expect(SyntaxKind::Colon, ParserContext::Expression);
        let name = self.expect(SyntaxKind::Identifier, ParserContext::Expression);
        factory::node(SyntaxKind::QualifiedNameReference, vec![Some(module), Some(colon), Some(name)])
    }

    fn parse_unary_expression(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let operator = self.consume_node();
        let operand = self.parse_expression(OperatorPrecedence::Unary, flags.nested().without_actions());
        factory::node(SyntaxKind::UnaryExpression, vec![Some(operator), Some(operand)])
    }

    /// `check e`, or `check` over an action when actions are allowed.
    fn parse_check_expression(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        let keyword = self.consume_node();
        let nested = flags.nested();
        let mut operand = self.parse_expression(OperatorPrecedence::Unary, nested);
        if flags.allow_actions && matches!(self.peek_kind(), SyntaxKind::RightArrow | SyntaxKind::SyncSendArrow) {
            operand = self.parse_expression_rhs(OperatorPrecedence::Trap, operand, nested);
        }
        let kind = if operand.kind().is_action() {
            SyntaxKind::CheckAction
        } else {
            SyntaxKind::CheckExpression
        };
        factory::node(kind, vec![Some(keyword), Some(operand)])
    }

    /// `<T> e`, `<@a T> e` or `<@a> e`.
    fn parse_type_cast(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::TypeCast, |p| {
            let open = p.consume_node();
            let annotations = p.parse_metadata();
            let ty = (p.peek_kind() != SyntaxKind::Gt).then(|| p.parse_type_descriptor(ParserContext::TypeCast));
            let close = p.expect(SyntaxKind::Gt, ParserContext::TypeCast);
            let operand = p.parse_expression(OperatorPrecedence::Unary, flags.nested().without_actions());
            factory::node(
                SyntaxKind::TypeCastExpression,
                vec![Some(open), annotations, ty, Some(close), Some(operand)],
            )
        })
    }

    fn parse_conditional_expression(&mut self, condition: SyntaxNode, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::ConditionalExpression, |p| {
            let question = p.consume_node();
            let middle_flags = flags.nested().without_actions().with_conditional(true);
            let middle = p.parse_expression(OperatorPrecedence::AnonFuncOrLet, middle_flags);
            let colon = p.expect(SyntaxKind::Colon, ParserContext::ConditionalExpression);
            let end = p.parse_expression(OperatorPrecedence::AnonFuncOrLet, flags.nested().without_actions());
            factory::node(
                SyntaxKind::ConditionalExpression,
                vec![Some(condition), Some(question), Some(middle), Some(colon), Some(end)],
            )
        })
    }

    /// `(e)`, `()`, or a parenthesised arrow-function parameter list.
    fn parse_braced_or_arrow_function(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        if self.is_infer_param_list_ahead() {
            return self.parse_infer_param_arrow_function(flags);
        }
        self.in_context(ParserContext::BracedExpression, |p| {
            let open = p.consume_node();
            if p.peek_kind() == SyntaxKind::CloseParen {
                let close = p.consume_node();
                return factory::node(SyntaxKind::NilLiteral, vec![Some(open), Some(close)]);
            }
            let inner = p.parse_expression(OperatorPrecedence::Default, flags.nested());
            let close = p.expect(SyntaxKind::CloseParen, ParserContext::BracedExpression);
            factory::node(SyntaxKind::BracedExpression, vec![Some(open), Some(inner), Some(close)])
        })
    }

    /// `(a, b) =>` or `() =>` ahead.
    fn is_infer_param_list_ahead(&mut self) -> bool {
        let mut k = 2;
        if self.peek_kind_at(k) == SyntaxKind::CloseParen {
            return self.peek_kind_at(k + 1) == SyntaxKind::RightDoubleArrow;
        }
        loop {
            if self.peek_kind_at(k) != SyntaxKind::Identifier {
                return false;
            }
            match self.peek_kind_at(k + 1) {
                SyntaxKind::Comma => k += 2,
                SyntaxKind::CloseParen => return self.peek_kind_at(k + 2) == SyntaxKind::RightDoubleArrow,
                _ => return false,
            }
        }
    }

    fn parse_infer_param_arrow_function(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::ArrowFunction, |p| {
            let open = p.consume_node();
            let mut names = Vec::new();
            while p.peek_kind() != SyntaxKind::CloseParen {
                let name = p.consume_node();
                names.push(factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]));
                if p.peek_kind() == SyntaxKind::Comma {
                    names.push(p.consume_node());
                }
            }
            let close = p.consume_node();
            let params = factory::node(
                SyntaxKind::InferParamList,
                vec![Some(open), Some(factory::list(names)), Some(close)],
            );
            p.finish_arrow_function(params, flags)
        })
    }

    fn parse_single_param_arrow_function(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::ArrowFunction, |p| {
            let name = p.consume_node();
            let param = factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]);
            p.finish_arrow_function(param, flags)
        })
    }

    fn finish_arrow_function(&mut self, params: SyntaxNode, flags: ExpressionFlags) -> SyntaxNode {
        let arrow = self.expect(SyntaxKind::RightDoubleArrow, ParserContext::ArrowFunction);
        let body = self.parse_expression(OperatorPrecedence::AnonFuncOrLet, flags.nested().without_actions());
        factory::node(
            SyntaxKind::ImplicitAnonymousFunction,
            vec![Some(params), Some(arrow), Some(body)],
        )
    }

    /// `[a, ...b]`.
    fn parse_list_constructor(&mut self) -> SyntaxNode {
        let open = self.expect(SyntaxKind::OpenBracket, ParserContext::ListConstructor);
        self.parse_list_constructor_rest(open, Vec::new())
    }

    /// Finishes a list constructor whose first members are already built.
    pub(crate) fn parse_list_constructor_rest(&mut self, open: SyntaxNode, items: Vec<SyntaxNode>) -> SyntaxNode {
        let (members, close) = self.continue_delimited_list(
            ParserContext::ListConstructor,
            SyntaxKind::CloseBracket,
            ListItem::Expression,
            items,
            Self::parse_list_member,
        );
        factory::node(SyntaxKind::ListConstructor, vec![Some(open), Some(members), Some(close)])
    }

    fn parse_list_member(&mut self) -> SyntaxNode {
        if self.peek_kind() == SyntaxKind::Ellipsis {
            let ellipsis = self.consume_node();
            let expression = self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
            return factory::node(SyntaxKind::SpreadMember, vec![Some(ellipsis), Some(expression)]);
        }
        self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs())
    }

    /// `{ k: v, ... }`.
    pub(crate) fn parse_mapping_constructor(&mut self) -> SyntaxNode {
        let open = self.expect(SyntaxKind::OpenBrace, ParserContext::MappingConstructor);
        let (fields, close) = self.parse_delimited_list(
            ParserContext::MappingConstructor,
            SyntaxKind::CloseBrace,
            ListItem::MappingField,
            |p| p.parse_mapping_field(ParserContext::MappingConstructor),
        );
        factory::node(SyntaxKind::MappingConstructor, vec![Some(open), Some(fields), Some(close)])
    }

    pub(crate) fn parse_mapping_field(&mut self, context: ParserContext) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_mapping_field_with(kind, context)
    }

    pub(crate) fn parse_mapping_field_with(&mut self, mut kind: SyntaxKind, context: ParserContext) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::ReadonlyKeyword | SyntaxKind::Identifier | SyntaxKind::StringLiteral => {
                    self.parse_specific_field()
                }
                SyntaxKind::OpenBracket => self.in_context(ParserContext::ComputedFieldName, |p| {
                    let open = p.consume_node();
                    let key = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    let close = p.expect(SyntaxKind::CloseBracket, ParserContext::ComputedFieldName);
                    let colon = p.expect(SyntaxKind::Colon, ParserContext::MappingField);
                    let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    factory::node(
                        SyntaxKind::ComputedNameField,
                        vec![Some(open), Some(key), Some(close), Some(colon), Some(value)],
                    )
                }),
                SyntaxKind::Ellipsis => {
                    let ellipsis = self.consume_node();
                    let expression = self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    factory::node(SyntaxKind::SpreadField, vec![Some(ellipsis), Some(expression)])
                }
                _ => match self.recover(RecoveryRequest::MappingField { context }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => {
                        factory::node(SyntaxKind::SpecificField, vec![None, Some(missing), None, None])
                    }
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// `readonly? key (: value)?`; string keys need a value.
    fn parse_specific_field(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::MappingField, |p| {
            let readonly = p.optional(SyntaxKind::ReadonlyKeyword);
            let key = if p.peek_kind() == SyntaxKind::StringLiteral {
                p.consume_node()
            } else {
                p.expect(SyntaxKind::Identifier, ParserContext::MappingField)
            };
            let needs_value = key.kind() == SyntaxKind::StringLiteral;
            let (colon, value) = if p.peek_kind() == SyntaxKind::Colon || needs_value {
                let colon = p.expect(SyntaxKind::Colon, ParserContext::MappingField);
                let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                (Some(colon), Some(value))
            } else {
                (None, None)
            };
            factory::node(SyntaxKind::SpecificField, vec![readonly, Some(key), colon, value])
        })
    }

    /// `error(args)` or `error T(args)`.
    pub(crate) fn parse_error_constructor(&mut self) -> SyntaxNode {
        let keyword = self.expect(SyntaxKind::ErrorKeyword, ParserContext::Expression);
        let type_reference = (self.peek_kind() == SyntaxKind::Identifier).then(|| self.parse_type_reference());
        let (open, args, close) = self.parse_parenthesized_args();
        factory::node(
            SyntaxKind::ErrorConstructor,
            vec![Some(keyword), type_reference, Some(open), Some(args), Some(close)],
        )
    }

    /// `( args )` with argument-order validation.
    pub(crate) fn parse_parenthesized_args(&mut self) -> (SyntaxNode, SyntaxNode, SyntaxNode) {
        let open = self.expect(SyntaxKind::OpenParen, ParserContext::ArgumentList);
        let (args, close) = self.parse_delimited_list(
            ParserContext::ArgumentList,
            SyntaxKind::CloseParen,
            ListItem::Argument,
            Self::parse_argument,
        );
        (open, validate_arguments(args), close)
    }

    pub(crate) fn parse_argument(&mut self) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_argument_with(kind)
    }

    pub(crate) fn parse_argument_with(&mut self, mut kind: SyntaxKind) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::Ellipsis => {
                    let ellipsis = self.consume_node();
                    let expression = self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    factory::node(SyntaxKind::RestArgument, vec![Some(ellipsis), Some(expression)])
                }
                SyntaxKind::Identifier if self.peek_kind_at(2) == SyntaxKind::Equal => {
                    let name = self.consume_node();
                    let name = factory::node(SyntaxKind::SimpleNameReference, vec![Some(name)]);
                    let equal = self.consume_node();
                    let expression = self.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    factory::node(SyntaxKind::NamedArgument, vec![Some(name), Some(equal), Some(expression)])
                }
                k if is_expression_start(k) => {
                    let expression = self.parse_expression_with(k, OperatorPrecedence::Default, ExpressionFlags::rhs());
                    factory::node(SyntaxKind::PositionalArgument, vec![Some(expression)])
                }
                _ => match self.recover(RecoveryRequest::Argument) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => {
                        let name = factory::node(SyntaxKind::SimpleNameReference, vec![Some(missing)]);
                        factory::node(SyntaxKind::PositionalArgument, vec![Some(name)])
                    }
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    fn parse_function_call(&mut self, callee: SyntaxNode) -> SyntaxNode {
        let (open, args, close) = self.parse_parenthesized_args();
        factory::node(
            SyntaxKind::FunctionCall,
            vec![Some(callee), Some(open), Some(args), Some(close)],
        )
    }

    fn parse_field_access_or_method_call(&mut self, target: SyntaxNode) -> SyntaxNode {
        let dot = self.consume_node();
        let name = self.expect(SyntaxKind::Identifier, ParserContext::Expression);
        if self.peek_kind() != SyntaxKind::OpenParen {
            return factory::node(SyntaxKind::FieldAccess, vec![Some(target), Some(dot), Some(name)]);
        }
        let (open, args, close) = self.parse_parenthesized_args();
        factory::node(
            SyntaxKind::MethodCall,
            vec![Some(target), Some(dot), Some(name), Some(open), Some(args), Some(close)],
        )
    }

    fn parse_indexed_expression(&mut self, container: SyntaxNode) -> SyntaxNode {
        let open = self.consume_node();
        let (keys, close) = self.parse_delimited_list(
            ParserContext::MemberAccessKey,
            SyntaxKind::CloseBracket,
            ListItem::Expression,
            |p| p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs()),
        );
        factory::node(
            SyntaxKind::IndexedExpression,
            vec![Some(container), Some(open), Some(keys), Some(close)],
        )
    }

    /// `qualifiers function (params) returns T body`.
    fn parse_explicit_anonymous_function(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::AnonymousFunction, |p| {
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
            let keyword = p.expect(SyntaxKind::FunctionKeyword, ParserContext::AnonymousFunction);
            let signature = p.parse_function_signature();
            let body = if p.peek_kind() == SyntaxKind::RightDoubleArrow {
                let arrow = p.consume_node();
                let expression = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                factory::node(SyntaxKind::ExpressionFunctionBody, vec![Some(arrow), Some(expression), None])
            } else {
                p.parse_function_body_block()
            };
            factory::node(
                SyntaxKind::ExplicitAnonymousFunction,
                vec![Some(qualifiers), Some(keyword), Some(signature), Some(body)],
            )
        })
    }

    /// `new`, `new(args)` or `new T(args)`.
    fn parse_new_expression(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::NewExpression, |p| {
            let keyword = p.consume_node();
            match p.peek_kind() {
                SyntaxKind::OpenParen => {
                    let args = p.parse_parenthesized_arg_list();
                    factory::node(SyntaxKind::ImplicitNewExpression, vec![Some(keyword), Some(args)])
                }
                SyntaxKind::Identifier | SyntaxKind::StreamKeyword => {
                    let ty = if p.peek_kind() == SyntaxKind::Identifier {
                        p.parse_type_reference()
                    } else {
                        p.parse_type_descriptor(ParserContext::NewExpression)
                    };
                    let args = p.parse_parenthesized_arg_list();
                    factory::node(SyntaxKind::ExplicitNewExpression, vec![Some(keyword), Some(ty), Some(args)])
                }
                _ => factory::node(SyntaxKind::ImplicitNewExpression, vec![Some(keyword), None]),
            }
        })
    }

    pub(crate) fn parse_parenthesized_arg_list(&mut self) -> SyntaxNode {
        let (open, args, close) = self.parse_parenthesized_args();
        factory::node(SyntaxKind::ParenthesizedArgList, vec![Some(open), Some(args), Some(close)])
    }

    /// `let T x = e, ... in body`.
    fn parse_let_expression(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::LetExpression, |p| {
            let keyword = p.consume_node();
            let (declarations, in_keyword) = p.parse_delimited_list(
                ParserContext::LetExpression,
                SyntaxKind::InKeyword,
                ListItem::TypeDescriptor,
                Self::parse_let_variable_declaration,
            );
            let body = p.parse_expression(OperatorPrecedence::AnonFuncOrLet, flags.nested().without_actions());
            factory::node(
                SyntaxKind::LetExpression,
                vec![Some(keyword), Some(declarations), Some(in_keyword), Some(body)],
            )
        })
    }

    /// `@a T x = e`, shared by let expressions and let clauses.
    pub(crate) fn parse_let_variable_declaration(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::LetVariableDeclaration, |p| {
            let annotations = p.parse_metadata();
            let binding = p.parse_typed_binding_pattern();
            let equal = p.expect(SyntaxKind::Equal, ParserContext::LetVariableDeclaration);
            let initializer = p.parse_expression(OperatorPrecedence::AnonFuncOrLet, ExpressionFlags::rhs());
            factory::node(
                SyntaxKind::LetVariableDeclaration,
                vec![annotations, Some(binding), Some(equal), Some(initializer)],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::FragmentKind;

    fn expression(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::Expression);
        assert_eq!(node.to_source_string(), source);
        node
    }

    fn operator_text(node: &SyntaxNode) -> String {
        node.slot(1).map(SyntaxNode::to_source_string).unwrap_or_default().trim().to_string()
    }

    #[test]
    fn test_left_associative_additive() {
        let node = expression("a - b - c");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::BinaryExpression));
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::SimpleNameReference));
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        let node = expression("a + b * c");
        assert_eq!(operator_text(&node), "+");
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::BinaryExpression));
    }

    #[test]
    fn test_shift_is_reassembled() {
        let node = expression("a >> b");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(node.slot(1).map(SyntaxNode::kind), Some(SyntaxKind::CompositeOperator));
        assert!(!node.has_diagnostics());

        let node = expression("a >>> b");
        assert_eq!(node.slot(1).map(|op| op.children().count()), Some(3));
    }

    #[test]
    fn test_spaced_shift_is_flagged() {
        let node = expression("a > > b");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::InvalidShiftOperator);
    }

    #[test]
    fn test_conditional_middle_is_not_qualified() {
        let node = expression("a ? b : c");
        assert_eq!(node.kind(), SyntaxKind::ConditionalExpression);
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::SimpleNameReference));

        let node = expression("a ? m:b : c");
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::QualifiedNameReference));
    }

    #[test]
    fn test_qualified_reference_outside_conditional() {
        let node = expression("io:println(x)");
        assert_eq!(node.kind(), SyntaxKind::FunctionCall);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::QualifiedNameReference));
    }

    #[test]
    fn test_elvis_is_right_associative() {
        let node = expression("a ?: b ?: c");
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::SimpleNameReference));
        assert_eq!(node.slot(2).map(SyntaxNode::kind), Some(SyntaxKind::BinaryExpression));
    }

    #[test]
    fn test_postfix_chain() {
        let node = expression("a.b(1)[2]?.c");
        assert_eq!(node.kind(), SyntaxKind::OptionalFieldAccess);
        let indexed = node.slot(0).expect("target");
        assert_eq!(indexed.kind(), SyntaxKind::IndexedExpression);
        assert_eq!(indexed.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::MethodCall));
    }

    #[test]
    fn test_unary_and_type_test() {
        let node = expression("!x is int");
        assert_eq!(node.kind(), SyntaxKind::TypeTestExpression);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::UnaryExpression));
    }

    #[test]
    fn test_arrow_functions() {
        assert_eq!(expression("x => x + 1").kind(), SyntaxKind::ImplicitAnonymousFunction);
        let node = expression("(a, b) => a");
        assert_eq!(node.kind(), SyntaxKind::ImplicitAnonymousFunction);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::InferParamList));
    }

    #[test]
    fn test_braced_and_nil() {
        assert_eq!(expression("(a)").kind(), SyntaxKind::BracedExpression);
        assert_eq!(expression("()").kind(), SyntaxKind::NilLiteral);
    }

    #[test]
    fn test_mapping_constructor_fields() {
        let node = expression("{a, \"b\": 1, [k]: 2, ...m, readonly c: 3}");
        assert_eq!(node.kind(), SyntaxKind::MappingConstructor);
        let kinds: Vec<_> = node
            .slot(1)
            .expect("fields")
            .children()
            .map(SyntaxNode::kind)
            .filter(|kind| *kind != SyntaxKind::Comma)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::SpecificField,
                SyntaxKind::SpecificField,
                SyntaxKind::ComputedNameField,
                SyntaxKind::SpreadField,
                SyntaxKind::SpecificField,
            ]
        );
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_list_constructor_missing_comma() {
        let node = expression("[1 2]");
        assert_eq!(node.kind(), SyntaxKind::ListConstructor);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::MissingToken(SyntaxKind::Comma));
    }

    #[test]
    fn test_cast_and_check() {
        let node = expression("<int> check f()");
        assert_eq!(node.kind(), SyntaxKind::TypeCastExpression);
        assert_eq!(node.slot(4).map(SyntaxNode::kind), Some(SyntaxKind::CheckExpression));
    }

    #[test]
    fn test_let_expression() {
        let node = expression("let int x = 1, int y = 2 in x + y");
        assert_eq!(node.kind(), SyntaxKind::LetExpression);
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_new_and_error_constructor() {
        assert_eq!(expression("new Foo(1)").kind(), SyntaxKind::ExplicitNewExpression);
        assert_eq!(expression("new").kind(), SyntaxKind::ImplicitNewExpression);
        assert_eq!(expression("error(\"boom\", code = 1)").kind(), SyntaxKind::ErrorConstructor);
    }

    #[test]
    fn test_langlib_reference() {
        let node = expression("int:max(1, 2)");
        assert_eq!(node.kind(), SyntaxKind::FunctionCall);
        assert_eq!(node.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::QualifiedNameReference));
    }

    #[test]
    fn test_contextual_keyword_as_identifier() {
        let node = expression("limit + 1");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        let name = node.slot(0).and_then(SyntaxNode::first_token).expect("name");
        assert_eq!(name.kind(), SyntaxKind::Identifier);
        assert_eq!(name.text(), "limit");
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_missing_operand() {
        let node = expression("a +");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(node.diagnostics()[0].code, DiagnosticCode::MissingExpression);
    }

    #[test]
    fn test_range_operator() {
        let node = expression("a ... b");
        assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(operator_text(&node), "...");
    }
}
