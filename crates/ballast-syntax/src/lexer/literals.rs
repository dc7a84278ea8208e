// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Literal scanning documentation.
//!
//! This module documents the literal scanning logic in `scanner.rs`.
//!
//! ## Numeric Literals
//!
//! ```text
//! 42        -> DecimalIntegerLiteral
//! 0xFF      -> HexIntegerLiteral
//! 3.14      -> DecimalFloatingPointLiteral
//! .5        -> DecimalFloatingPointLiteral
//! 1e10      -> DecimalFloatingPointLiteral
//! 2.5f 7d   -> DecimalFloatingPointLiteral (float / decimal suffix)
//! ```
//!
//! Method: `scan_number`. A `.` only continues a number when a digit follows
//! it, so `1...5` is an integer, an ellipsis, and an integer.
//!
//! ## String Literals
//!
//! Method: `scan_string`. Strings are double quoted and end at the closing
//! quote or at the end of the line. An unterminated string still yields a
//! `StringLiteral` token, carrying an `UnterminatedString` diagnostic.
//!
//! | Escape | Meaning |
//! |--------|---------|
//! | `\n` `\r` `\t` | Control characters |
//! | `\\` `\"` `\'` | Literal characters |
//! | `\u{XXXX}` | Unicode code point |
//!
//! ## Identifiers and Keywords
//!
//! Method: `scan_identifier`. Identifiers follow Unicode XID rules plus `_`;
//! a lone `_` is the `Underscore` token. A leading `'` quotes a reserved word
//! (`'int`) so it lexes as an identifier. Keyword lookup goes through an
//! `FxHashMap` built once from `KEYWORDS`.

#[cfg(test)]
mod tests {
    use crate::lexer::Scanner;
    use crate::syntax::{DiagnosticCode, SyntaxKind};

    fn scan_single(source: &str) -> (SyntaxKind, String) {
        let token = Scanner::new(source).next_token();
        (token.kind(), token.text().to_string())
    }

    #[test]
    fn test_integer() {
        assert_eq!(scan_single("42"), (SyntaxKind::DecimalIntegerLiteral, "42".to_string()));
    }

    #[test]
    fn test_float() {
        assert_eq!(scan_single("3.14").0, SyntaxKind::DecimalFloatingPointLiteral);
        assert_eq!(scan_single("1.5e-3").1, "1.5e-3");
    }

    #[test]
    fn test_exponent_needs_digits() {
        let tokens: Vec<_> = Scanner::new("1e").map(|t| t.kind()).collect();
        assert_eq!(tokens, vec![SyntaxKind::DecimalIntegerLiteral, SyntaxKind::Identifier]);
    }

    #[test]
    fn test_hex_number() {
        assert_eq!(scan_single("0xFF").0, SyntaxKind::HexIntegerLiteral);
        let token = Scanner::new("0x").next_token();
        assert_eq!(token.diagnostics()[0].code, DiagnosticCode::MalformedNumber);
    }

    #[test]
    fn test_unicode_escape() {
        let token = Scanner::new(r#""\u{1F600}""#).next_token();
        assert!(token.diagnostics().is_empty());
        let token = Scanner::new(r#""\q""#).next_token();
        assert_eq!(token.diagnostics()[0].code, DiagnosticCode::InvalidEscapeSequence);
    }

    #[test]
    fn test_identifier() {
        assert_eq!(scan_single("foo_bar").0, SyntaxKind::Identifier);
        assert_eq!(scan_single("naïve").1, "naïve");
    }

    #[test]
    fn test_quoted_identifier() {
        assert_eq!(scan_single("'int"), (SyntaxKind::Identifier, "'int".to_string()));
    }

    #[test]
    fn test_literal_keywords() {
        assert_eq!(scan_single("true").0, SyntaxKind::TrueKeyword);
        assert_eq!(scan_single("null").0, SyntaxKind::NullKeyword);
        assert!(SyntaxKind::FalseKeyword.is_literal());
    }
}
