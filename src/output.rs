// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Rendering of trees, tokens and diagnostics for the terminal.

use std::fmt::Write;

use ballast_syntax::{Diagnostic, LineIndex, Severity, SyntaxNode, Token, Trivia};
use owo_colors::{OwoColorize, Style};

/// Applies styles only when colors are enabled.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn node(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan())
    }

    pub fn token(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    pub fn path(&self, text: &str) -> String {
        self.paint(text, Style::new().white().bold())
    }

    pub fn severity(&self, severity: Severity) -> String {
        let style = match severity {
            Severity::Error => Style::new().red().bold(),
            Severity::Warning => Style::new().yellow().bold(),
        };
        self.paint(&severity.to_string(), style)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, Style::new().red().bold())
    }

    pub fn ok(&self, text: &str) -> String {
        self.paint(text, Style::new().green().bold())
    }
}

/// Indented tree dump, one node or token per line.
pub fn render_tree(node: &SyntaxNode, painter: Painter) -> String {
    let mut out = String::new();
    write_tree(&mut out, node, painter, 0);
    out
}

fn write_tree(out: &mut String, node: &SyntaxNode, painter: Painter, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.as_token() {
        Some(token) if token.is_missing() => {
            let _ = writeln!(out, "{indent}{} {}", painter.dim(&format!("{:?}", token.kind())), painter.error("<missing>"));
        }
        Some(token) => {
            let _ = writeln!(
                out,
                "{indent}{} {}",
                painter.dim(&format!("{:?}", token.kind())),
                painter.token(&format!("{:?}", token.text()))
            );
            for trivia in token.leading().iter().chain(token.trailing()) {
                if let Trivia::Invalid(invalid) = trivia {
                    let _ = writeln!(out, "{indent}  {}", painter.error("<invalid>"));
                    write_tree(out, invalid, painter, depth + 2);
                }
            }
        }
        None => {
            let _ = writeln!(out, "{indent}{}", painter.node(&format!("{:?}", node.kind())));
            for child in node.children() {
                write_tree(out, child, painter, depth + 1);
            }
        }
    }
    for diagnostic in node.own_diagnostics() {
        let _ = writeln!(out, "{indent}  {} {}", painter.error("!"), diagnostic.code);
    }
}

/// One `name:line:col: severity[id]: message` line per diagnostic.
///
/// Lines and columns are one-based.
pub fn render_diagnostics(name: &str, source: &str, diagnostics: &[Diagnostic], painter: Painter) -> String {
    let index = LineIndex::new(source);
    let mut out = String::new();
    for diagnostic in diagnostics {
        let position = index.line_col(source, diagnostic.span.start);
        let _ = writeln!(
            out,
            "{}:{}:{}: {}[{}]: {}",
            painter.path(name),
            position.line + 1,
            position.col + 1,
            painter.severity(diagnostic.severity()),
            diagnostic.code.id(),
            diagnostic.code.message()
        );
    }
    out
}

/// One line per token with its position, kind and text.
pub fn render_token(token: &Token, index: &LineIndex, source: &str, trivia: bool, painter: Painter) -> String {
    let position = index.line_col(source, token.span().start);
    let mut line = format!(
        "{:>4}:{:<3} {:<28} {}",
        position.line + 1,
        position.col + 1,
        painter.node(&format!("{:?}", token.kind())),
        painter.token(&format!("{:?}", token.text()))
    );
    if trivia {
        let leading = describe_trivia(token.leading());
        let trailing = describe_trivia(token.trailing());
        if !leading.is_empty() || !trailing.is_empty() {
            let _ = write!(line, " {}", painter.dim(&format!("[{leading}] [{trailing}]")));
        }
    }
    for diagnostic in token.diagnostics() {
        let _ = write!(line, " {} {}", painter.error("!"), diagnostic.code);
    }
    line
}

fn describe_trivia(trivia: &[Trivia]) -> String {
    trivia
        .iter()
        .map(|piece| match piece {
            Trivia::Whitespace(text) => format!("ws{:?}", text),
            Trivia::EndOfLine(_) => "eol".to_string(),
            Trivia::Comment(text) => format!("comment{:?}", text),
            Trivia::Documentation(text) => format!("doc{:?}", text),
            Trivia::Invalid(node) => format!("invalid{:?}", node.to_source_string()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballast_syntax::{FragmentKind, parse_fragment};

    #[test]
    fn test_plain_tree_has_no_escapes() {
        let tree = parse_fragment("x = 1", FragmentKind::Statement);
        let text = render_tree(&tree, Painter::new(false));
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("AssignmentStatement"));
        assert!(text.contains("<missing>"));
    }

    #[test]
    fn test_colored_tree_has_escapes() {
        let tree = parse_fragment("1", FragmentKind::Expression);
        assert!(render_tree(&tree, Painter::new(true)).contains('\u{1b}'));
    }

    #[test]
    fn test_diagnostic_positions_are_one_based() {
        let source = "int a = 1;\nint b = 2";
        let tree = parse_fragment(source, FragmentKind::CompilationUnit);
        let text = render_diagnostics("m.bal", source, &tree.diagnostics(), Painter::new(false));
        assert!(text.starts_with("m.bal:2:10: error[BCE0003]"), "{text}");
    }
}
