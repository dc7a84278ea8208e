// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lexical analysis (tokenization).
//!
//! The lexer transforms source text into a stream of tokens. Every byte of
//! the input ends up either in a token's text or in its trivia.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token`, `Trivia` and `Span` definitions
//! - `reader.rs` - `TokenSource` trait and the buffered `TokenReader`
//!
//! ## Documentation Submodules
//!
//! - `operators` - Multi-character operator scanning
//! - `literals` - Number, string, and identifier literals
//!
//! ## Usage
//!
//! ```rust
//! use ballast_syntax::lexer::Scanner;
//! use ballast_syntax::SyntaxKind;
//!
//! let mut scanner = Scanner::new("int x = 42;");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if token.kind() == SyntaxKind::Eof {
//!         break;
//!     }
//!     println!("{:?}", token.kind());
//! }
//! ```

mod reader;
mod scanner;
mod token;

// Documentation and test submodules
pub mod literals;
pub mod operators;

pub use reader::{TokenReader, TokenSource};
pub use scanner::{LexerMode, Scanner};
pub use token::{Span, Token, Trivia};
