// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The lossless concrete syntax tree.
//!
//! ## Structure
//!
//! - `kind.rs` - `SyntaxKind`, shared by tokens and composite nodes
//! - `node.rs` - `SyntaxNode` and its traversal utilities
//! - `factory.rs` - pure node constructors used by the parser
//! - `diagnostic.rs` - the diagnostic catalog
//! - `line_index.rs` - offset to line/column mapping for reporting

mod diagnostic;
pub mod factory;
mod kind;
mod line_index;
mod node;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use kind::{KEYWORDS, SyntaxKind};
pub use line_index::{LineCol, LineIndex};
pub use node::{CompositeNode, SyntaxNode};
