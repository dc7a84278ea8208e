// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Order and qualifier checks run over finished lists.
//!
//! These only attach diagnostics. Every node is kept in place.

use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

fn list_items(list: &SyntaxNode) -> Vec<SyntaxNode> {
    list.children().cloned().collect()
}

/// Flags required parameters after defaultable ones and anything after a
/// rest parameter.
pub(crate) fn validate_parameters(list: SyntaxNode) -> SyntaxNode {
    let mut seen_defaultable = false;
    let mut seen_rest = false;
    let items = list_items(&list)
        .into_iter()
        .map(|item| {
            if item.kind() == SyntaxKind::Comma {
                return item;
            }
            let code = if seen_rest {
                Some(DiagnosticCode::ParamAfterRestParam)
            } else if seen_defaultable && item.kind() == SyntaxKind::RequiredParameter {
                Some(DiagnosticCode::RequiredParamAfterDefaultable)
            } else {
                None
            };
            match item.kind() {
                SyntaxKind::DefaultableParameter => seen_defaultable = true,
                SyntaxKind::RestParameter => seen_rest = true,
                _ => {}
            }
            match code {
                Some(code) => factory::with_diagnostic(item, code),
                None => item,
            }
        })
        .collect();
    factory::list(items)
}

/// Flags positional arguments after named ones and anything after a rest
/// argument.
pub(crate) fn validate_arguments(list: SyntaxNode) -> SyntaxNode {
    let mut seen_named = false;
    let mut seen_rest = false;
    let items = list_items(&list)
        .into_iter()
        .map(|item| {
            if item.kind() == SyntaxKind::Comma {
                return item;
            }
            let code = if seen_rest {
                Some(DiagnosticCode::RestArgFollowedByAnotherArg)
            } else if seen_named && item.kind() == SyntaxKind::PositionalArgument {
                Some(DiagnosticCode::PositionalArgAfterNamedArg)
            } else {
                None
            };
            match item.kind() {
                SyntaxKind::NamedArgument => seen_named = true,
                SyntaxKind::RestArgument => seen_rest = true,
                _ => {}
            }
            match code {
                Some(code) => factory::with_diagnostic(item, code),
                None => item,
            }
        })
        .collect();
    factory::list(items)
}

/// Builds the qualifier list, flagging repeats and qualifiers outside
/// `allowed`.
pub(crate) fn validate_qualifiers(qualifiers: Vec<SyntaxNode>, allowed: &[SyntaxKind]) -> SyntaxNode {
    let mut seen = Vec::with_capacity(qualifiers.len());
    let items = qualifiers
        .into_iter()
        .map(|qualifier| {
            let kind = qualifier.kind();
            let code = if seen.contains(&kind) {
                Some(DiagnosticCode::DuplicateQualifier)
            } else if !allowed.contains(&kind) {
                Some(DiagnosticCode::QualifierNotAllowed)
            } else {
                None
            };
            seen.push(kind);
            match code {
                Some(code) => factory::with_diagnostic(qualifier, code),
                None => qualifier,
            }
        })
        .collect();
    factory::list(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::{FragmentKind, Parser};

    fn codes(node: &SyntaxNode) -> Vec<DiagnosticCode> {
        node.diagnostics().into_iter().map(|d| d.code).collect()
    }

    fn member(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::ModuleMember);
        assert_eq!(node.to_source_string(), source);
        node
    }

    #[test]
    fn test_parameter_order() {
        let node = member("function f(int a = 1, int b) {}");
        assert_eq!(codes(&node), vec![DiagnosticCode::RequiredParamAfterDefaultable]);

        let node = member("function f(int... rest, int b) {}");
        assert_eq!(codes(&node), vec![DiagnosticCode::ParamAfterRestParam]);

        assert!(codes(&member("function f(int a, int b = 2, int... c) {}")).is_empty());
    }

    #[test]
    fn test_argument_order() {
        let node = Parser::new(TokenReader::new("f(a = 1, 2)")).parse_fragment(FragmentKind::Expression);
        assert_eq!(codes(&node), vec![DiagnosticCode::PositionalArgAfterNamedArg]);

        let node = Parser::new(TokenReader::new("f(...xs, 2)")).parse_fragment(FragmentKind::Expression);
        assert_eq!(codes(&node), vec![DiagnosticCode::RestArgFollowedByAnotherArg]);
    }

    #[test]
    fn test_qualifiers() {
        let node = member("public public function f() {}");
        assert_eq!(codes(&node), vec![DiagnosticCode::DuplicateQualifier]);

        let node = member("remote function f() {}");
        assert_eq!(codes(&node), vec![DiagnosticCode::QualifierNotAllowed]);
    }
}
