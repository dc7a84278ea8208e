// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The closed catalog of syntax diagnostics.
//!
//! Diagnostics are data attached to tokens and nodes; the parser never
//! reports a user error any other way.

use std::fmt;

use super::SyntaxKind;
use crate::lexer::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Source is still well formed but suspicious.
    Warning,
    /// Source is malformed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Every diagnostic the lexer and parser can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A token of the given kind was inserted by recovery.
    MissingToken(SyntaxKind),
    MissingIdentifier,
    MissingSemicolon,
    MissingCloseBrace,
    MissingCloseParen,
    MissingCloseBracket,
    MissingTypeDescriptor,
    MissingExpression,
    MissingBindingPattern,
    MissingMatchPattern,
    /// A token was discarded as invalid trivia.
    InvalidToken(SyntaxKind),
    /// A whole node was discarded as invalid trivia.
    InvalidNode,
    UnterminatedString,
    InvalidEscapeSequence,
    MalformedNumber,
    RequiredParamAfterDefaultable,
    ParamAfterRestParam,
    PositionalArgAfterNamedArg,
    RestArgFollowedByAnotherArg,
    DuplicateQualifier,
    QualifierNotAllowed,
    ActionNotAllowed,
    InvalidShiftOperator,
    InvalidBindingPattern,
    InvalidTypeDescriptor,
    InvalidExpression,
    InvalidAssignmentTarget,
    ExpressionStatementNotAllowed,
    AnnotationsNotAllowed,
    ImportAfterDeclaration,
    UnexpectedToken,
}

impl DiagnosticCode {
    /// Picks the dedicated missing-token code for common kinds.
    pub fn missing(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::Identifier => DiagnosticCode::MissingIdentifier,
            SyntaxKind::Semicolon => DiagnosticCode::MissingSemicolon,
            SyntaxKind::CloseBrace => DiagnosticCode::MissingCloseBrace,
            SyntaxKind::CloseParen => DiagnosticCode::MissingCloseParen,
            SyntaxKind::CloseBracket => DiagnosticCode::MissingCloseBracket,
            other => DiagnosticCode::MissingToken(other),
        }
    }

    /// Stable identifier of this code.
    pub fn id(&self) -> &'static str {
        match self {
            DiagnosticCode::MissingToken(_) => "BCE0001",
            DiagnosticCode::MissingIdentifier => "BCE0002",
            DiagnosticCode::MissingSemicolon => "BCE0003",
            DiagnosticCode::MissingCloseBrace => "BCE0004",
            DiagnosticCode::MissingCloseParen => "BCE0005",
            DiagnosticCode::MissingCloseBracket => "BCE0006",
            DiagnosticCode::MissingTypeDescriptor => "BCE0007",
            DiagnosticCode::MissingExpression => "BCE0008",
            DiagnosticCode::MissingBindingPattern => "BCE0009",
            DiagnosticCode::MissingMatchPattern => "BCE0010",
            DiagnosticCode::InvalidToken(_) => "BCE0100",
            DiagnosticCode::InvalidNode => "BCE0101",
            DiagnosticCode::UnterminatedString => "BCE0102",
            DiagnosticCode::InvalidEscapeSequence => "BCE0103",
            DiagnosticCode::MalformedNumber => "BCE0104",
            DiagnosticCode::RequiredParamAfterDefaultable => "BCE0200",
            DiagnosticCode::ParamAfterRestParam => "BCE0201",
            DiagnosticCode::PositionalArgAfterNamedArg => "BCE0202",
            DiagnosticCode::RestArgFollowedByAnotherArg => "BCE0203",
            DiagnosticCode::DuplicateQualifier => "BCE0204",
            DiagnosticCode::QualifierNotAllowed => "BCE0205",
            DiagnosticCode::ActionNotAllowed => "BCE0206",
            DiagnosticCode::InvalidShiftOperator => "BCE0207",
            DiagnosticCode::InvalidBindingPattern => "BCE0208",
            DiagnosticCode::InvalidTypeDescriptor => "BCE0209",
            DiagnosticCode::InvalidExpression => "BCE0210",
            DiagnosticCode::InvalidAssignmentTarget => "BCE0211",
            DiagnosticCode::ExpressionStatementNotAllowed => "BCE0212",
            DiagnosticCode::AnnotationsNotAllowed => "BCE0213",
            DiagnosticCode::ImportAfterDeclaration => "BCE0214",
            DiagnosticCode::UnexpectedToken => "BCE0300",
        }
    }

    /// Severity of this code.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::ExpressionStatementNotAllowed => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            DiagnosticCode::MissingToken(kind) => format!("missing {}", kind.describe()),
            DiagnosticCode::MissingIdentifier => "missing identifier".to_string(),
            DiagnosticCode::MissingSemicolon => "missing semicolon token".to_string(),
            DiagnosticCode::MissingCloseBrace => "missing close brace token".to_string(),
            DiagnosticCode::MissingCloseParen => "missing close parenthesis token".to_string(),
            DiagnosticCode::MissingCloseBracket => "missing close bracket token".to_string(),
            DiagnosticCode::MissingTypeDescriptor => "missing type descriptor".to_string(),
            DiagnosticCode::MissingExpression => "missing expression".to_string(),
            DiagnosticCode::MissingBindingPattern => "missing binding pattern".to_string(),
            DiagnosticCode::MissingMatchPattern => "missing match pattern".to_string(),
            DiagnosticCode::InvalidToken(kind) => format!("invalid token {}", kind.describe()),
            DiagnosticCode::InvalidNode => "invalid construct".to_string(),
            DiagnosticCode::UnterminatedString => "unterminated string literal".to_string(),
            DiagnosticCode::InvalidEscapeSequence => "invalid escape sequence".to_string(),
            DiagnosticCode::MalformedNumber => "malformed numeric literal".to_string(),
            DiagnosticCode::RequiredParamAfterDefaultable => {
                "required parameter after defaultable parameter".to_string()
            }
            DiagnosticCode::ParamAfterRestParam => "parameter after rest parameter".to_string(),
            DiagnosticCode::PositionalArgAfterNamedArg => {
                "positional argument after named argument".to_string()
            }
            DiagnosticCode::RestArgFollowedByAnotherArg => {
                "rest argument followed by another argument".to_string()
            }
            DiagnosticCode::DuplicateQualifier => "duplicate qualifier".to_string(),
            DiagnosticCode::QualifierNotAllowed => "qualifier not allowed here".to_string(),
            DiagnosticCode::ActionNotAllowed => "action not allowed here".to_string(),
            DiagnosticCode::InvalidShiftOperator => {
                "whitespace not allowed inside shift operator".to_string()
            }
            DiagnosticCode::InvalidBindingPattern => "invalid binding pattern".to_string(),
            DiagnosticCode::InvalidTypeDescriptor => "invalid type descriptor".to_string(),
            DiagnosticCode::InvalidExpression => "invalid expression".to_string(),
            DiagnosticCode::InvalidAssignmentTarget => "invalid assignment target".to_string(),
            DiagnosticCode::ExpressionStatementNotAllowed => {
                "expression is not allowed as a statement".to_string()
            }
            DiagnosticCode::AnnotationsNotAllowed => "annotations not allowed here".to_string(),
            DiagnosticCode::ImportAfterDeclaration => {
                "import declaration after module member".to_string()
            }
            DiagnosticCode::UnexpectedToken => "unexpected token".to_string(),
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id(), self.message())
    }
}

/// A diagnostic anchored to a source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// What went wrong.
    pub code: DiagnosticCode,
    /// Where; zero-width for missing tokens.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(code: DiagnosticCode, span: Span) -> Self {
        Self { code, span }
    }

    /// Severity of the underlying code.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.code, self.span.start, self.span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_picks_dedicated_code() {
        assert_eq!(DiagnosticCode::missing(SyntaxKind::Semicolon), DiagnosticCode::MissingSemicolon);
        assert_eq!(
            DiagnosticCode::missing(SyntaxKind::InKeyword),
            DiagnosticCode::MissingToken(SyntaxKind::InKeyword)
        );
    }

    #[test]
    fn test_display_includes_id() {
        let code = DiagnosticCode::MissingToken(SyntaxKind::Colon);
        assert_eq!(code.to_string(), "BCE0001: missing ':'");
    }

    #[test]
    fn test_expression_statement_is_warning() {
        assert_eq!(DiagnosticCode::ExpressionStatementNotAllowed.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::InvalidNode.severity(), Severity::Error);
    }
}
