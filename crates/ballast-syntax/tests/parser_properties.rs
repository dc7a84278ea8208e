// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Whole-parser properties: every input parses, every byte survives, and
//! recovery always terminates.

use std::sync::Arc;

use ballast_syntax::lexer::{Scanner, TokenReader};
use ballast_syntax::parser::{Decision, FragmentKind, Parser, ParserContext, RecoveryRequest, RecoveryStrategy, RecoveryView};
use ballast_syntax::{DiagnosticCode, Severity, SyntaxKind, SyntaxNode, parse, parse_fragment};

const PROGRAM: &str = r#"import ballerina/io;

const int LIMIT = 3;

type Pair [int, string];

public function main() returns error? {
    Pair p = [1, "one"];
    [int, string] [n, s] = p;
    [n, s] = p;
    int total = 0;
    foreach int i in 0 ..< LIMIT {
        total += i;
    }
    if total >= 3 {
        io:println(s, n);
    } else {
        return error("small");
    }
    map<map<int>> nested = {};
    int shifted = total >> 1;
    worker w1 {
        100 -> function;
    }
    int got = <- w1;
}
"#;

const BROKEN: &[&str] = &[
    "",
    ";",
    "}}}",
    "function",
    "function f(",
    "function f() { int x = ; }",
    "public public",
    "type T record { int x }",
    "function f() { if { } else }",
    "function f() { x = [1, 2; }",
    "function f() { match x { 1 => } }",
    "class C { function ( }",
    "import ;",
    "@ @ @",
    "function f() { from int i in xs where }",
    "service on { resource function }",
    "\"unterminated",
    "function f() { [a, b, = c; }",
    "function f() { int x = 1 >> > 2; }",
    "$ % ^",
];

fn assert_lossless(source: &str) -> SyntaxNode {
    let tree = parse(source);
    assert_eq!(tree.kind(), SyntaxKind::ModulePart, "{source:?}");
    assert_eq!(tree.to_source_string(), source, "{source:?}");
    tree
}

#[test]
fn test_valid_program_has_no_errors() {
    let tree = assert_lossless(PROGRAM);
    let errors: Vec<_> = tree
        .diagnostics()
        .into_iter()
        .filter(|d| d.severity() == Severity::Error)
        .collect();
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_broken_inputs_are_total_and_lossless() {
    for source in BROKEN {
        let tree = assert_lossless(source);
        if !source.trim().is_empty() {
            assert!(tree.has_diagnostics(), "{source:?}");
        }
    }
}

#[test]
fn test_deleting_any_token_still_parses() {
    let spans: Vec<_> = Scanner::new(PROGRAM).map(|token| token.span()).collect();
    assert!(spans.len() > 50);
    for span in spans {
        let mut source = String::with_capacity(PROGRAM.len());
        source.push_str(&PROGRAM[..span.start]);
        source.push_str(&PROGRAM[span.end..]);
        assert_lossless(&source);
    }
}

#[test]
fn test_truncation_at_every_token_still_parses() {
    for token in Scanner::new(PROGRAM) {
        assert_lossless(&PROGRAM[..token.span().end]);
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let source = BROKEN.join("\n");
    assert!(parse(&source).is_isomorphic(&parse(&source)));
}

#[test]
fn test_bracketed_statements_resolve_three_ways() {
    let cases = [
        ("[a, b] = f();", SyntaxKind::DestructuringAssignmentStatement),
        ("[int, string] t = f();", SyntaxKind::LocalVariableDeclaration),
        ("[a, b].forEach(g);", SyntaxKind::CallStatement),
    ];
    for (source, kind) in cases {
        let node = parse_fragment(source, FragmentKind::Statement);
        assert_eq!(node.kind(), kind, "{source}");
        assert_eq!(node.to_source_string(), source);
        assert!(!node.has_diagnostics(), "{source}: {:?}", node.diagnostics());
    }
}

#[test]
fn test_one_opening_bracket_three_outcomes() {
    let constructor = parse_fragment("var x = [1, 2, 3];", FragmentKind::Statement);
    assert_eq!(constructor.kind(), SyntaxKind::LocalVariableDeclaration);
    assert!(constructor.find(SyntaxKind::ListConstructor).is_some());
    assert!(!constructor.has_diagnostics());

    let destructure = parse_fragment("[int a, string b] = t;", FragmentKind::Statement);
    assert_eq!(destructure.kind(), SyntaxKind::DestructuringAssignmentStatement);
    assert_eq!(destructure.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::ListBindingPattern));
    assert!(!destructure.has_diagnostics(), "{:?}", destructure.diagnostics());

    let declaration = parse_fragment("[int, string] x = t;", FragmentKind::Statement);
    assert_eq!(declaration.kind(), SyntaxKind::LocalVariableDeclaration);
    let binding = declaration.find(SyntaxKind::TypedBindingPattern).expect("typed binding");
    assert_eq!(binding.slot(0).map(SyntaxNode::kind), Some(SyntaxKind::TupleTypeDescriptor));
    assert!(!declaration.has_diagnostics());
}

#[test]
fn test_misplaced_annotations_are_lossless() {
    for statement in [
        "@a [x, y] = v;",
        "@a [1, 2].foo();",
        "@a [int a, string b] = t;",
        "@a {b} = v;",
        "@a {b, c: d} = v;",
        "@a _ = f();",
        "@a error(m) = e;",
        "@a @b if c { }",
        "@a = ;",
    ] {
        let source = format!("function f() {{ {statement} }}");
        let tree = assert_lossless(&source);
        assert!(tree.has_diagnostics(), "{source}");
    }
}

#[test]
fn test_expression_fragment_matches_embedded_expression() {
    let fragment = parse_fragment("a + b", FragmentKind::Expression);
    let tree = parse("function f() { a + b; }");
    let embedded = tree.find(SyntaxKind::BinaryExpression).expect("binary expression");
    assert_eq!(fragment.kind(), SyntaxKind::BinaryExpression);
    assert!(fragment.is_isomorphic(embedded));
}

#[test]
fn test_nested_type_arguments_versus_shift() {
    let declaration = parse_fragment("map<map<int>> x;", FragmentKind::Statement);
    assert_eq!(declaration.kind(), SyntaxKind::LocalVariableDeclaration);
    assert!(!declaration.has_diagnostics());

    let shift = parse_fragment("y = a >> b;", FragmentKind::Statement);
    assert_eq!(shift.kind(), SyntaxKind::AssignmentStatement);
    assert!(shift.find(SyntaxKind::BinaryExpression).is_some());
    assert!(!shift.has_diagnostics());
}

#[test]
fn test_parameter_order_is_validated() {
    let node = parse_fragment("function f(int a = 1, int b, int... c, int d) {}", FragmentKind::ModuleMember);
    let codes: Vec<_> = node.diagnostics().into_iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![DiagnosticCode::RequiredParamAfterDefaultable, DiagnosticCode::ParamAfterRestParam]
    );
    assert_eq!(node.find_all(SyntaxKind::RequiredParameter).len(), 2);
}

#[test]
fn test_resumed_rule_matches_fresh_parse() {
    for source in ["int x = 1;", "[a, b] = c;", "foo(bar);"] {
        let fresh = parse_fragment(source, FragmentKind::Statement);
        let resumed = Parser::new(TokenReader::new(source))
            .resume_context(ParserContext::Statement)
            .expect("statements are resumable");
        assert!(fresh.is_isomorphic(&resumed), "{source}");
    }
}

#[test]
fn test_unsupported_resume_context_is_an_error() {
    let result = Parser::new(TokenReader::new("x")).resume_context(ParserContext::WaitFields);
    assert!(result.is_err());
}

#[test]
fn test_resume_enters_rules_by_tag() {
    let cases = [
        (ParserContext::ImportDeclaration, "import ballerina/io;", SyntaxKind::ImportDeclaration),
        (ParserContext::ServiceDeclaration, "service on ep { }", SyntaxKind::ServiceDeclaration),
        (ParserContext::WhileBlock, "while x { }", SyntaxKind::WhileStatement),
        (ParserContext::MappingConstructor, "{a: 1}", SyntaxKind::MappingConstructor),
        (ParserContext::ErrorMatchPattern, "error(m)", SyntaxKind::ErrorMatchPattern),
    ];
    for (context, source, kind) in cases {
        let node = Parser::new(TokenReader::new(source))
            .resume_context(context)
            .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(node.kind(), kind, "{context:?}");
        assert_eq!(node.to_source_string(), source);
    }
}

/// Discards anything unexpected.
struct AlwaysRemove;

impl RecoveryStrategy for AlwaysRemove {
    fn decide(&self, _request: &RecoveryRequest, _view: &RecoveryView<'_>) -> Decision {
        Decision::Remove
    }
}

#[test]
fn test_custom_strategy_terminates() {
    for source in BROKEN {
        let tree = Parser::new(TokenReader::new(source))
            .with_recovery(Arc::new(AlwaysRemove))
            .parse();
        assert_eq!(tree.to_source_string(), *source);
    }
}

#[test]
fn test_missing_tokens_are_zero_width() {
    let tree = parse("function f() { int x = 1 }");
    let missing: Vec<_> = tree
        .descendants()
        .into_iter()
        .filter(|node| node.is_missing())
        .collect();
    assert!(!missing.is_empty());
    assert!(missing.iter().all(|node| node.to_source_string().is_empty()));
    assert!(
        tree.diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::MissingSemicolon)
    );
}
