// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Operator scanning documentation.
//!
//! This module documents the operator scanning logic in `scanner.rs`.
//! Multi-character operators are recognised by looking ahead one or two
//! characters.
//!
//! ## Operator Table
//!
//! | Start | Method | Variants |
//! |-------|--------|----------|
//! | `-` | `scan_minus` | `-`, `->`, `->>` |
//! | `<` | `scan_less_than` | `<`, `<=`, `<<`, `<-` |
//! | `>` | `scan_greater_than` | `>`, `>=` |
//! | `=` | `scan_equal` | `=`, `==`, `===`, `=>` |
//! | `!` | `scan_bang` | `!`, `!=`, `!==`, `!is` |
//! | `&` | `scan_ampersand` | `&`, `&&` |
//! | `\|` | `scan_pipe` | `\|`, `\|\|`, `\|}` |
//! | `?` | `scan_question` | `?`, `?.`, `?:` |
//! | `.` | `scan_dot` | `.`, `...`, `..<`, `.5` (number) |
//! | `{` | `scan_open_brace` | `{`, `{\|` |
//!
//! ## Shift and Compound Assignment
//!
//! There is no `>>` token. `map<map<int>>` needs two closing `>` tokens, so
//! the parser reassembles `>>` and `>>>` from adjacent `>` tokens when it is
//! in an operator position. Compound assignment has no tokens either: the
//! parser sees `+` followed by `=` with no trivia between them.
//!
//! ```text
//! a >>= b   ->  Gt GtEqual
//! a += b    ->  Plus Equal
//! a <<= b   ->  DoubleLt Equal
//! ```
//!
//! ## Comment Handling
//!
//! `//` starts a comment that runs to the end of the line, and `#` starts a
//! documentation line. Both become trivia, never tokens.

#[cfg(test)]
mod tests {
    use crate::lexer::Scanner;
    use crate::syntax::SyntaxKind;

    fn scan_single(source: &str) -> SyntaxKind {
        let mut scanner = Scanner::new(source);
        scanner.next_token().kind()
    }

    fn scan_all(source: &str) -> Vec<SyntaxKind> {
        Scanner::new(source).map(|t| t.kind()).collect()
    }

    #[test]
    fn test_minus_operators() {
        assert_eq!(scan_single("-"), SyntaxKind::Minus);
        assert_eq!(scan_single("->"), SyntaxKind::RightArrow);
        assert_eq!(scan_single("->>"), SyntaxKind::SyncSendArrow);
    }

    #[test]
    fn test_less_than_operators() {
        assert_eq!(scan_single("<"), SyntaxKind::Lt);
        assert_eq!(scan_single("<="), SyntaxKind::LtEqual);
        assert_eq!(scan_single("<<"), SyntaxKind::DoubleLt);
        assert_eq!(scan_single("<-"), SyntaxKind::LeftArrow);
    }

    #[test]
    fn test_greater_than_operators() {
        assert_eq!(scan_single(">"), SyntaxKind::Gt);
        assert_eq!(scan_single(">="), SyntaxKind::GtEqual);
        assert_eq!(scan_all(">>>"), vec![SyntaxKind::Gt, SyntaxKind::Gt, SyntaxKind::Gt]);
    }

    #[test]
    fn test_equal_operators() {
        assert_eq!(scan_single("="), SyntaxKind::Equal);
        assert_eq!(scan_single("=="), SyntaxKind::DoubleEqual);
        assert_eq!(scan_single("==="), SyntaxKind::TripleEqual);
        assert_eq!(scan_single("=>"), SyntaxKind::RightDoubleArrow);
    }

    #[test]
    fn test_bang_operators() {
        assert_eq!(scan_single("!"), SyntaxKind::Exclamation);
        assert_eq!(scan_single("!="), SyntaxKind::NotEqual);
        assert_eq!(scan_single("!=="), SyntaxKind::NotDoubleEqual);
        assert_eq!(scan_single("!is"), SyntaxKind::NotIs);
    }

    #[test]
    fn test_pipe_operators() {
        assert_eq!(scan_single("|"), SyntaxKind::Pipe);
        assert_eq!(scan_single("||"), SyntaxKind::LogicalOr);
        assert_eq!(scan_single("|}"), SyntaxKind::ClosePipeBrace);
    }

    #[test]
    fn test_question_operators() {
        assert_eq!(scan_single("?"), SyntaxKind::QuestionMark);
        assert_eq!(scan_single("?."), SyntaxKind::OptionalChaining);
        assert_eq!(scan_single("?:"), SyntaxKind::Elvis);
    }

    #[test]
    fn test_dot_operators() {
        assert_eq!(scan_single("."), SyntaxKind::Dot);
        assert_eq!(scan_single("..."), SyntaxKind::Ellipsis);
        assert_eq!(scan_single("..<"), SyntaxKind::DoubleDotLt);
        assert_eq!(scan_single(".."), SyntaxKind::Invalid);
    }

    #[test]
    fn test_compound_assignment_is_two_tokens() {
        assert_eq!(scan_all("+="), vec![SyntaxKind::Plus, SyntaxKind::Equal]);
        assert_eq!(scan_all("<<="), vec![SyntaxKind::DoubleLt, SyntaxKind::Equal]);
    }
}
