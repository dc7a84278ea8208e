// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from source text.

use super::{Span, Token, Trivia};
use crate::syntax::{Diagnostic, DiagnosticCode, SyntaxKind};

/// Lexical mode selecting how words are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerMode {
    /// Regular source text.
    #[default]
    Default,
    /// Inside an import path; reserved words lex as identifiers, except `as`.
    ImportPath,
}

/// A scanner that tokenizes source code.
///
/// The scanner never fails. Malformed lexemes still produce a token, with a
/// diagnostic attached where the problem is lexical.
pub struct Scanner<'a> {
    source: &'a str,
    current_pos: usize,
    mode: LexerMode,
    pending: Vec<DiagnosticCode>,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current_pos: 0,
            mode: LexerMode::Default,
            pending: Vec::new(),
        }
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.current_pos
    }

    /// Current lexical mode.
    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    /// Moves back (or forward) to `offset` and continues in `mode`.
    pub fn reset(&mut self, offset: usize, mode: LexerMode) {
        self.current_pos = offset.min(self.source.len());
        self.mode = mode;
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let leading = self.scan_leading_trivia();

        let start = self.current_pos;

        let Some(ch) = self.advance() else {
            return Token::new(SyntaxKind::Eof, "", Span::new(start, start), leading, Vec::new());
        };

        let kind = match ch {
            // Single-character tokens
            '}' => SyntaxKind::CloseBrace,
            '(' => SyntaxKind::OpenParen,
            ')' => SyntaxKind::CloseParen,
            '[' => SyntaxKind::OpenBracket,
            ']' => SyntaxKind::CloseBracket,
            ';' => SyntaxKind::Semicolon,
            ',' => SyntaxKind::Comma,
            ':' => SyntaxKind::Colon,
            '~' => SyntaxKind::Tilde,
            '@' => SyntaxKind::At,
            '+' => SyntaxKind::Plus,
            '*' => SyntaxKind::Asterisk,
            '/' => SyntaxKind::Slash,
            '%' => SyntaxKind::Percent,
            '^' => SyntaxKind::Caret,

            // Multi-character tokens
            '{' => self.scan_open_brace(),
            '.' => self.scan_dot(),
            '-' => self.scan_minus(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equal(),
            '!' => self.scan_bang(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '?' => self.scan_question(),

            // String literals
            '"' => self.scan_string(),

            // Numbers
            '0'..='9' => self.scan_number(ch),

            // Quoted identifiers
            '\'' => self.scan_quoted_identifier(),

            // Identifiers and keywords
            '_' if !self.peek().is_some_and(is_id_continue) => SyntaxKind::Underscore,
            _ if is_id_start(ch) => self.scan_identifier(start),

            _ => SyntaxKind::Invalid,
        };

        let end = self.current_pos;
        let trailing = self.scan_trailing_trivia();
        let span = Span::new(start, end);
        let mut token = Token::new(kind, &self.source[start..end], span, leading, trailing);
        for code in self.pending.drain(..) {
            token.push_diagnostic(Diagnostic::new(code, span));
        }
        token
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.current_pos..].chars().next()?;
        self.current_pos += ch.len_utf8();
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current_pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current_pos..].chars();
        chars.next();
        chars.next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn text_from(&self, start: usize) -> Box<str> {
        self.source[start..self.current_pos].into()
    }

    /// Scans one piece of trivia other than a line break, if any.
    fn scan_line_trivia(&mut self) -> Option<Trivia> {
        let start = self.current_pos;
        match self.peek()? {
            ' ' | '\t' | '\u{c}' => {
                while matches!(self.peek(), Some(' ' | '\t' | '\u{c}')) {
                    self.advance();
                }
                Some(Trivia::Whitespace(self.text_from(start)))
            }
            '/' if self.peek_next() == Some('/') => {
                self.skip_to_line_end();
                Some(Trivia::Comment(self.text_from(start)))
            }
            '#' => {
                self.skip_to_line_end();
                Some(Trivia::Documentation(self.text_from(start)))
            }
            _ => None,
        }
    }

    fn scan_end_of_line(&mut self) -> Option<Trivia> {
        let start = self.current_pos;
        match self.peek()? {
            '\n' => {
                self.advance();
            }
            '\r' => {
                self.advance();
                self.eat('\n');
            }
            _ => return None,
        }
        Some(Trivia::EndOfLine(self.text_from(start)))
    }

    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.advance();
        }
    }

    fn scan_leading_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            if let Some(piece) = self.scan_line_trivia() {
                trivia.push(piece);
            } else if let Some(eol) = self.scan_end_of_line() {
                trivia.push(eol);
            } else {
                break;
            }
        }
        trivia
    }

    /// Same-line trivia up to and including the first line break.
    fn scan_trailing_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        while let Some(piece) = self.scan_line_trivia() {
            trivia.push(piece);
        }
        if let Some(eol) = self.scan_end_of_line() {
            trivia.push(eol);
        }
        trivia
    }

    fn scan_open_brace(&mut self) -> SyntaxKind {
        if self.eat('|') {
            SyntaxKind::OpenBracePipe
        } else {
            SyntaxKind::OpenBrace
        }
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return self.scan_fraction_and_exponent();
        }
        if self.peek() == Some('.') {
            match self.peek_next() {
                Some('.') => {
                    self.advance();
                    self.advance();
                    SyntaxKind::Ellipsis
                }
                Some('<') => {
                    self.advance();
                    self.advance();
                    SyntaxKind::DoubleDotLt
                }
                _ => {
                    // ".." is not a token
                    self.advance();
                    SyntaxKind::Invalid
                }
            }
        } else {
            SyntaxKind::Dot
        }
    }

    fn scan_minus(&mut self) -> SyntaxKind {
        if self.eat('>') {
            if self.eat('>') {
                SyntaxKind::SyncSendArrow
            } else {
                SyntaxKind::RightArrow
            }
        } else {
            SyntaxKind::Minus
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                SyntaxKind::LtEqual
            }
            Some('<') => {
                self.advance();
                SyntaxKind::DoubleLt
            }
            Some('-') => {
                self.advance();
                SyntaxKind::LeftArrow
            }
            _ => SyntaxKind::Lt,
        }
    }

    /// `>` never merges with a following `>`; the parser decides between a
    /// shift operator and closing type parameters.
    fn scan_greater_than(&mut self) -> SyntaxKind {
        if self.eat('=') {
            SyntaxKind::GtEqual
        } else {
            SyntaxKind::Gt
        }
    }

    fn scan_equal(&mut self) -> SyntaxKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                if self.eat('=') {
                    SyntaxKind::TripleEqual
                } else {
                    SyntaxKind::DoubleEqual
                }
            }
            Some('>') => {
                self.advance();
                SyntaxKind::RightDoubleArrow
            }
            _ => SyntaxKind::Equal,
        }
    }

    fn scan_bang(&mut self) -> SyntaxKind {
        if self.eat('=') {
            return if self.eat('=') {
                SyntaxKind::NotDoubleEqual
            } else {
                SyntaxKind::NotEqual
            };
        }
        let rest = &self.source[self.current_pos..];
        if rest.starts_with("is") && !rest[2..].chars().next().is_some_and(is_id_continue) {
            self.current_pos += 2;
            return SyntaxKind::NotIs;
        }
        SyntaxKind::Exclamation
    }

    fn scan_ampersand(&mut self) -> SyntaxKind {
        if self.eat('&') {
            SyntaxKind::LogicalAnd
        } else {
            SyntaxKind::BitwiseAnd
        }
    }

    fn scan_pipe(&mut self) -> SyntaxKind {
        match self.peek() {
            Some('|') => {
                self.advance();
                SyntaxKind::LogicalOr
            }
            Some('}') => {
                self.advance();
                SyntaxKind::ClosePipeBrace
            }
            _ => SyntaxKind::Pipe,
        }
    }

    fn scan_question(&mut self) -> SyntaxKind {
        match self.peek() {
            Some('.') if !self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                SyntaxKind::OptionalChaining
            }
            Some(':') => {
                self.advance();
                SyntaxKind::Elvis
            }
            _ => SyntaxKind::QuestionMark,
        }
    }

    fn scan_string(&mut self) -> SyntaxKind {
        loop {
            match self.peek() {
                None | Some('\n' | '\r') => {
                    self.pending.push(DiagnosticCode::UnterminatedString);
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.scan_escape();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_escape(&mut self) {
        match self.peek() {
            Some('"' | '\\' | 'n' | 't' | 'r' | 'f' | 'b' | '\'') => {
                self.advance();
            }
            Some('u') if self.peek_next() == Some('{') => {
                self.advance();
                self.advance();
                let mut digits = 0;
                while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                    digits += 1;
                }
                if digits == 0 || !self.eat('}') {
                    self.pending.push(DiagnosticCode::InvalidEscapeSequence);
                }
            }
            _ => self.pending.push(DiagnosticCode::InvalidEscapeSequence),
        }
    }

    fn scan_number(&mut self, first: char) -> SyntaxKind {
        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            return self.scan_hex_number();
        }

        self.skip_digits();

        // A dot is a fraction separator only when a digit follows it
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            return self.scan_fraction_and_exponent();
        }

        if self.scan_exponent() {
            self.scan_float_suffix();
            return SyntaxKind::DecimalFloatingPointLiteral;
        }

        if self.scan_float_suffix() {
            SyntaxKind::DecimalFloatingPointLiteral
        } else {
            SyntaxKind::DecimalIntegerLiteral
        }
    }

    /// Scans the digits after a `.`, then an optional exponent and suffix.
    fn scan_fraction_and_exponent(&mut self) -> SyntaxKind {
        self.skip_digits();
        self.scan_exponent();
        self.scan_float_suffix();
        SyntaxKind::DecimalFloatingPointLiteral
    }

    fn scan_exponent(&mut self) -> bool {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return false;
        }
        let rest = &self.source[self.current_pos + 1..];
        let digits_at = if rest.starts_with(['+', '-']) { 1 } else { 0 };
        if !rest[digits_at..].starts_with(|c: char| c.is_ascii_digit()) {
            return false;
        }
        self.current_pos += 1 + digits_at;
        self.skip_digits();
        true
    }

    fn scan_float_suffix(&mut self) -> bool {
        if matches!(self.peek(), Some('f' | 'F' | 'd' | 'D'))
            && !self.peek_next().is_some_and(is_id_continue)
        {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_hex_number(&mut self) -> SyntaxKind {
        self.advance(); // consume 'x'
        let digits_start = self.current_pos;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
        }
        if self.current_pos == digits_start {
            self.pending.push(DiagnosticCode::MalformedNumber);
        }
        SyntaxKind::HexIntegerLiteral
    }

    fn scan_quoted_identifier(&mut self) -> SyntaxKind {
        if !self.peek().is_some_and(is_id_continue) {
            return SyntaxKind::Invalid;
        }
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }
        SyntaxKind::Identifier
    }

    fn scan_identifier(&mut self, start: usize) -> SyntaxKind {
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }

        let word = &self.source[start..self.current_pos];
        match (self.mode, SyntaxKind::from_keyword(word)) {
            (LexerMode::Default, Some(keyword)) => keyword,
            (LexerMode::ImportPath, Some(SyntaxKind::AsKeyword)) => SyntaxKind::AsKeyword,
            _ => SyntaxKind::Identifier,
        }
    }
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind() == SyntaxKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        Scanner::new(source).map(|token| token.kind()).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("{ } ( ) {| |}"),
            vec![
                SyntaxKind::OpenBrace,
                SyntaxKind::CloseBrace,
                SyntaxKind::OpenParen,
                SyntaxKind::CloseParen,
                SyntaxKind::OpenBracePipe,
                SyntaxKind::ClosePipeBrace,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 0xff 1e10 2.5f 7d .5"),
            vec![
                SyntaxKind::DecimalIntegerLiteral,
                SyntaxKind::DecimalFloatingPointLiteral,
                SyntaxKind::HexIntegerLiteral,
                SyntaxKind::DecimalFloatingPointLiteral,
                SyntaxKind::DecimalFloatingPointLiteral,
                SyntaxKind::DecimalFloatingPointLiteral,
                SyntaxKind::DecimalFloatingPointLiteral,
            ]
        );
    }

    #[test]
    fn test_range_is_not_a_fraction() {
        assert_eq!(
            kinds("1...5 0..<n"),
            vec![
                SyntaxKind::DecimalIntegerLiteral,
                SyntaxKind::Ellipsis,
                SyntaxKind::DecimalIntegerLiteral,
                SyntaxKind::DecimalIntegerLiteral,
                SyntaxKind::DoubleDotLt,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let mut scanner = Scanner::new(r#""hello \"there\"" "bad"#);
        let first = scanner.next_token();
        assert_eq!(first.kind(), SyntaxKind::StringLiteral);
        assert_eq!(first.text(), r#""hello \"there\"""#);
        assert!(first.diagnostics().is_empty());
        let second = scanner.next_token();
        assert_eq!(second.text(), r#""bad"#);
        assert_eq!(second.diagnostics()[0].code, DiagnosticCode::UnterminatedString);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("function worker _ _x"),
            vec![
                SyntaxKind::FunctionKeyword,
                SyntaxKind::WorkerKeyword,
                SyntaxKind::Underscore,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_import_mode_words_are_identifiers() {
        let mut scanner = Scanner::new("lang.int as x");
        scanner.reset(0, LexerMode::ImportPath);
        let kinds: Vec<_> = scanner.map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Dot,
                SyntaxKind::Identifier,
                SyntaxKind::AsKeyword,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_greater_than_never_merges() {
        assert_eq!(
            kinds(">> >= >>="),
            vec![
                SyntaxKind::Gt,
                SyntaxKind::Gt,
                SyntaxKind::GtEqual,
                SyntaxKind::Gt,
                SyntaxKind::GtEqual,
            ]
        );
    }

    #[test]
    fn test_arrows_and_operators() {
        assert_eq!(
            kinds("-> ->> <- => ?. ?: !is !== ==="),
            vec![
                SyntaxKind::RightArrow,
                SyntaxKind::SyncSendArrow,
                SyntaxKind::LeftArrow,
                SyntaxKind::RightDoubleArrow,
                SyntaxKind::OptionalChaining,
                SyntaxKind::Elvis,
                SyntaxKind::NotIs,
                SyntaxKind::NotDoubleEqual,
                SyntaxKind::TripleEqual,
            ]
        );
        assert_eq!(kinds("!isValid"), vec![SyntaxKind::Exclamation, SyntaxKind::Identifier]);
    }

    #[test]
    fn test_trivia_attachment() {
        let mut scanner = Scanner::new("  // lead\nfoo // tail\n  bar");
        let foo = scanner.next_token();
        assert_eq!(foo.text(), "foo");
        assert_eq!(foo.leading().len(), 3);
        assert!(foo.has_trailing_newline());
        let bar = scanner.next_token();
        assert_eq!(bar.leading(), &[Trivia::Whitespace("  ".into())]);
    }

    #[test]
    fn test_eof_keeps_trailing_text() {
        let mut scanner = Scanner::new("x\n# doc\n");
        scanner.next_token();
        let eof = scanner.next_token();
        assert_eq!(eof.kind(), SyntaxKind::Eof);
        let mut text = String::new();
        eof.write_source(&mut text);
        assert_eq!(text, "# doc\n");
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(kinds("a $ b"), vec![SyntaxKind::Identifier, SyntaxKind::Invalid, SyntaxKind::Identifier]);
    }
}
