// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Buffered token stream with arbitrary lookahead and lexical modes.

use std::collections::VecDeque;

use tracing::trace;

use super::{LexerMode, Scanner, Token};
use crate::syntax::SyntaxKind;

/// The stream the parser pulls tokens from.
pub trait TokenSource {
    /// Returns the `k`-th upcoming token, 1-indexed, without consuming it.
    ///
    /// Past end of input this returns EOF indefinitely.
    fn peek(&mut self, k: usize) -> Token;

    /// Returns and retires the next token.
    fn consume(&mut self) -> Token;

    /// Enters a lexical mode until the matching [`TokenSource::end_mode`].
    fn start_mode(&mut self, mode: LexerMode);

    /// Leaves the innermost lexical mode.
    fn end_mode(&mut self);

    /// Number of tokens consumed so far.
    fn position(&self) -> usize;
}

/// [`TokenSource`] over a [`Scanner`], draining a lookahead buffer FIFO.
pub struct TokenReader<'a> {
    scanner: Scanner<'a>,
    buffer: VecDeque<Token>,
    modes: Vec<LexerMode>,
    consumed: usize,
}

impl<'a> TokenReader<'a> {
    /// Creates a reader over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            buffer: VecDeque::new(),
            modes: Vec::new(),
            consumed: 0,
        }
    }

    fn current_mode(&self) -> LexerMode {
        self.modes.last().copied().unwrap_or_default()
    }

    fn fill(&mut self, k: usize) {
        while self.buffer.len() < k {
            let token = self.scanner.next_token();
            self.buffer.push_back(token);
        }
    }

    /// Rescans buffered lookahead under the current mode.
    fn relex(&mut self) {
        let mode = self.current_mode();
        match self.buffer.front() {
            Some(first) => {
                let offset = first.full_start();
                trace!(offset, ?mode, dropped = self.buffer.len(), "relexing lookahead");
                self.buffer.clear();
                self.scanner.reset(offset, mode);
            }
            None => {
                let offset = self.scanner.offset();
                self.scanner.reset(offset, mode);
            }
        }
    }
}

impl TokenSource for TokenReader<'_> {
    fn peek(&mut self, k: usize) -> Token {
        let k = k.max(1);
        self.fill(k);
        self.buffer[k - 1].clone()
    }

    fn consume(&mut self) -> Token {
        self.fill(1);
        let token = self.buffer.pop_front().unwrap_or_else(|| self.scanner.next_token());
        if token.kind() != SyntaxKind::Eof {
            self.consumed += 1;
        }
        token
    }

    fn start_mode(&mut self, mode: LexerMode) {
        self.modes.push(mode);
        self.relex();
    }

    fn end_mode(&mut self) {
        self.modes.pop();
        self.relex();
    }

    fn position(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_is_repeatable() {
        let mut reader = TokenReader::new("a b c");
        assert_eq!(reader.peek(3).text(), "c");
        assert_eq!(reader.peek(1).text(), "a");
        assert_eq!(reader.peek(3).text(), "c");
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_consume_drains_in_order() {
        let mut reader = TokenReader::new("a b");
        reader.peek(2);
        assert_eq!(reader.consume().text(), "a");
        assert_eq!(reader.consume().text(), "b");
        assert_eq!(reader.consume().kind(), SyntaxKind::Eof);
        assert_eq!(reader.consume().kind(), SyntaxKind::Eof);
        assert_eq!(reader.peek(5).kind(), SyntaxKind::Eof);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_mode_switch_relexes_lookahead() {
        let mut reader = TokenReader::new("import lang.int;");
        assert_eq!(reader.consume().kind(), SyntaxKind::ImportKeyword);
        assert_eq!(reader.peek(3).kind(), SyntaxKind::IntKeyword);
        reader.start_mode(LexerMode::ImportPath);
        assert_eq!(reader.peek(3).kind(), SyntaxKind::Identifier);
        assert_eq!(reader.peek(3).text(), "int");
        reader.consume();
        reader.consume();
        reader.consume();
        reader.end_mode();
        assert_eq!(reader.peek(1).kind(), SyntaxKind::Semicolon);
    }
}
