// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error-tolerant recursive descent parser producing a lossless tree.
//!
//! ## Structure
//!
//! - `parser` - `Parser` itself: token plumbing, list helpers, entry points
//! - `context` - grammar-rule tags and the context stack
//! - `recovery` - the Keep / Insert / Remove protocol and `DefaultRecovery`
//! - `resume` - re-entry into a rule after junk was discarded
//! - `precedence` - operator precedence levels
//!
//! ## Productions
//!
//! - `declarations` - imports, module members, class and object members
//! - `statements` - statements and blocks
//! - `ambiguity` - lists that may be a type, a pattern or an expression
//! - `expressions` - precedence climbing and terminal expressions
//! - `actions` - remote calls, worker messaging, `start`/`wait`/`flush`
//! - `queries` - query pipelines
//! - `types` - type descriptors
//! - `patterns` - binding and match patterns
//! - `validation` - order and qualifier checks over finished lists
//!
//! ## Usage
//!
//! ```rust
//! use ballast_syntax::lexer::TokenReader;
//! use ballast_syntax::parser::{FragmentKind, Parser};
//! use ballast_syntax::SyntaxKind;
//!
//! let mut parser = Parser::new(TokenReader::new("x += 1;"));
//! let tree = parser.parse_fragment(FragmentKind::Statement);
//! assert_eq!(tree.kind(), SyntaxKind::CompoundAssignmentStatement);
//! assert_eq!(tree.to_source_string(), "x += 1;");
//! ```

#[allow(clippy::module_inception)]
mod parser;

mod actions;
mod ambiguity;
mod context;
mod declarations;
mod expressions;
mod patterns;
mod precedence;
mod queries;
mod recovery;
mod resume;
mod statements;
mod types;
mod validation;

pub use context::{ContextStack, ParserContext};
pub use expressions::ExpressionFlags;
pub use parser::{FragmentKind, Parser, ParserError, ParserOptions};
pub use precedence::OperatorPrecedence;
pub use recovery::{
    Decision, DefaultRecovery, ListItem, RecoveryRequest, RecoveryStrategy, RecoveryView, Solution,
};
