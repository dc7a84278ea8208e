// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Operator precedence levels shared by expressions and actions.

use crate::syntax::SyntaxKind;

/// Binding strength, weakest first.
///
/// The climbing loop keeps consuming an operator only while its level is
/// strictly above the current floor, which makes every binary operator left
/// associative. Right associative forms recurse with a lowered floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorPrecedence {
    /// Floor for a full expression.
    Default,
    Query,
    Trap,
    Action,
    RemoteCallAction,
    AnonFuncOrLet,
    Conditional,
    Elvis,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    BinaryCompare,
    Range,
    Shift,
    Additive,
    Multiplicative,
    ExpressionAction,
    Unary,
    MemberAccess,
}

impl OperatorPrecedence {
    /// Returns true if an operator of this level may follow an action.
    pub fn is_higher_than_action(self) -> bool {
        self > OperatorPrecedence::Action
    }
}

/// Level of a binary operator token; `None` for anything else.
///
/// `>` maps to comparison here; the caller upgrades a reassembled `>>` or
/// `>>>` to [`OperatorPrecedence::Shift`].
pub fn binary_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    use OperatorPrecedence as P;
    let precedence = match kind {
        SyntaxKind::Asterisk | SyntaxKind::Slash | SyntaxKind::Percent => P::Multiplicative,
        SyntaxKind::Plus | SyntaxKind::Minus => P::Additive,
        SyntaxKind::DoubleLt => P::Shift,
        SyntaxKind::Ellipsis | SyntaxKind::DoubleDotLt => P::Range,
        SyntaxKind::Lt
        | SyntaxKind::Gt
        | SyntaxKind::LtEqual
        | SyntaxKind::GtEqual
        | SyntaxKind::IsKeyword
        | SyntaxKind::NotIs => P::BinaryCompare,
        SyntaxKind::DoubleEqual
        | SyntaxKind::TripleEqual
        | SyntaxKind::NotEqual
        | SyntaxKind::NotDoubleEqual => P::Equality,
        SyntaxKind::BitwiseAnd => P::BitwiseAnd,
        SyntaxKind::Caret => P::BitwiseXor,
        SyntaxKind::Pipe => P::BitwiseOr,
        SyntaxKind::LogicalAnd => P::LogicalAnd,
        SyntaxKind::LogicalOr => P::LogicalOr,
        SyntaxKind::Elvis => P::Elvis,
        SyntaxKind::QuestionMark => P::Conditional,
        _ => return None,
    };
    Some(precedence)
}

/// Level of any token that can continue an expression after an operand.
pub fn rhs_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    match kind {
        SyntaxKind::Dot
        | SyntaxKind::OptionalChaining
        | SyntaxKind::OpenBracket
        | SyntaxKind::OpenParen => Some(OperatorPrecedence::MemberAccess),
        SyntaxKind::RightArrow => Some(OperatorPrecedence::RemoteCallAction),
        SyntaxKind::SyncSendArrow => Some(OperatorPrecedence::Action),
        _ => binary_precedence(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(OperatorPrecedence::Multiplicative > OperatorPrecedence::Additive);
        assert!(OperatorPrecedence::Additive > OperatorPrecedence::Shift);
        assert!(OperatorPrecedence::Elvis > OperatorPrecedence::Conditional);
        assert!(OperatorPrecedence::Default < OperatorPrecedence::Query);
    }

    #[test]
    fn test_rhs_precedence() {
        assert_eq!(rhs_precedence(SyntaxKind::Dot), Some(OperatorPrecedence::MemberAccess));
        assert_eq!(rhs_precedence(SyntaxKind::NotIs), Some(OperatorPrecedence::BinaryCompare));
        assert_eq!(rhs_precedence(SyntaxKind::Semicolon), None);
    }
}
