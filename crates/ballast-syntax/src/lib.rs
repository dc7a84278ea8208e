// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # ballast-syntax
//!
//! An error-tolerant, resumable parser producing a lossless concrete syntax
//! tree for Ballerina-style sources.
//!
//! ## Overview
//!
//! - Every input yields a complete tree. Syntax errors are diagnostics
//!   attached to nodes, never a failed parse.
//! - Every byte of the input is in the tree, as token text or trivia, so
//!   [`SyntaxNode::to_source_string`] reproduces the source exactly.
//! - Recovery is pluggable through [`parser::RecoveryStrategy`].
//!
//! ## Quick Start
//!
//! ```rust
//! let tree = ballast_syntax::parse("function main() { int x = 1 }");
//! assert_eq!(tree.to_source_string(), "function main() { int x = 1 }");
//! assert!(tree.has_diagnostics());
//! ```

#![warn(clippy::all)]

pub mod lexer;
pub mod parser;
pub mod syntax;

pub use lexer::{LexerMode, Span, Token, TokenReader, TokenSource, Trivia};
pub use parser::{FragmentKind, Parser, ParserOptions};
pub use syntax::{Diagnostic, DiagnosticCode, LineCol, LineIndex, Severity, SyntaxKind, SyntaxNode};

/// Parses a whole compilation unit.
pub fn parse(source: &str) -> SyntaxNode {
    Parser::new(TokenReader::new(source)).parse()
}

/// Parses `source` as a single fragment of the given kind.
pub fn parse_fragment(source: &str, kind: FragmentKind) -> SyntaxNode {
    Parser::new(TokenReader::new(source)).parse_fragment(kind)
}

/// Parses `source` with the fragment kind and recovery set in `options`.
pub fn parse_with_options(source: &str, options: &ParserOptions) -> SyntaxNode {
    Parser::with_options(TokenReader::new(source), options).parse_fragment(options.fragment_kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_points_agree() {
        let source = "int x = 1;";
        let direct = parse_fragment(source, FragmentKind::Statement);
        let options = ParserOptions::new().fragment(FragmentKind::Statement);
        let configured = parse_with_options(source, &options);
        assert!(direct.is_isomorphic(&configured));
        assert_eq!(direct.kind(), SyntaxKind::LocalVariableDeclaration);
    }

    #[test]
    fn test_parse_module() {
        let tree = parse("import ballerina/io;\n\npublic function main() {\n    io:println(\"hi\");\n}\n");
        assert_eq!(tree.kind(), SyntaxKind::ModulePart);
        assert!(!tree.has_diagnostics(), "{:?}", tree.diagnostics());
    }
}
