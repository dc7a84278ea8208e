// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Re-entry into a rule after recovery discarded junk.
//!
//! The match is exhaustive over [`RecoveryRequest`], so adding a request
//! without a way back into its rule fails to compile.

use tracing::trace;

use super::parser::Parser;
use super::recovery::RecoveryRequest;
use crate::lexer::TokenSource;
use crate::syntax::SyntaxNode;

impl<S: TokenSource> Parser<S> {
    /// Resumes the rule `request` was raised from, dispatching on the
    /// current token with the arguments the rule had computed.
    ///
    /// Tools can build a request themselves to enter a rule mid-construct,
    /// such as [`RecoveryRequest::StatementRhs`] with an already parsed
    /// left-hand side.
    pub fn resume_parsing(&mut self, request: RecoveryRequest) -> SyntaxNode {
        let kind = self.peek_kind();
        trace!(context = ?request.context(), token = ?kind, "resuming");
        match request {
            RecoveryRequest::Token { context, expected } => self.expect(expected, context),
            RecoveryRequest::ListEnd { context, close, item } => self.parse_list_end(context, close, item),
            RecoveryRequest::Import => self.parse_import_declaration(),
            RecoveryRequest::ModuleMember { metadata, qualifiers } => {
                self.parse_module_member_with(kind, metadata, qualifiers)
            }
            RecoveryRequest::Statement { annotations } => self.parse_statement_with(kind, annotations),
            RecoveryRequest::StatementRhs { annotations, lhs } => self.parse_statement_rhs_with(kind, annotations, lhs),
            RecoveryRequest::ClassMember {
                metadata,
                qualifiers,
                object_type,
            } => self.parse_class_member_with(kind, metadata, qualifiers, object_type),
            RecoveryRequest::RecordField { metadata } => self.parse_record_field_with(kind, metadata),
            RecoveryRequest::Parameter { annotations } => self.parse_parameter_with(kind, annotations),
            RecoveryRequest::Argument => self.parse_argument_with(kind),
            RecoveryRequest::TypeDescriptor { context } => self.parse_type_descriptor_with(kind, context),
            RecoveryRequest::BindingPattern => self.parse_binding_pattern_with(kind),
            RecoveryRequest::MatchPattern => self.parse_match_pattern_with(kind),
            RecoveryRequest::Expression { floor, flags } => self.parse_expression_with(kind, floor, flags),
            RecoveryRequest::FunctionBody => self.parse_function_body_with(kind),
            RecoveryRequest::VariableDeclarationRhs {
                metadata,
                qualifiers,
                binding,
                module_level,
            } => self.parse_var_decl_rhs_with(kind, metadata, qualifiers, binding, module_level),
            RecoveryRequest::ElseBody => self.parse_else_body_with(kind),
            RecoveryRequest::QueryPipelineEnd { pipeline, flags } => self.parse_query_end_with(kind, pipeline, flags),
            RecoveryRequest::MappingField { context } => self.parse_mapping_field_with(kind, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::{FragmentKind, ParserContext};
    use crate::syntax::SyntaxKind;

    #[test]
    fn test_junk_before_statement_is_skipped() {
        let source = "int x = 1 ) ) ; int y = 2;";
        let node = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::Statement);
        assert_eq!(node.to_source_string(), source);
        assert!(node.has_diagnostics());
    }

    #[test]
    fn test_resume_each_context_from_scratch() {
        let cases = [
            (ParserContext::Expression, "a + b", SyntaxKind::BinaryExpression),
            (ParserContext::TypeDescriptor, "int|string", SyntaxKind::UnionTypeDescriptor),
            (ParserContext::BindingPattern, "[a, b]", SyntaxKind::ListBindingPattern),
            (ParserContext::ModuleMember, "type T int;", SyntaxKind::TypeDefinition),
            (ParserContext::FunctionBody, "=> 1;", SyntaxKind::ExpressionFunctionBody),
            (ParserContext::RecordField, "int x;", SyntaxKind::RecordField),
        ];
        for (context, source, kind) in cases {
            let mut parser = Parser::new(TokenReader::new(source));
            let node = parser.resume_context(context).expect("resumable context");
            assert_eq!(node.kind(), kind, "{context:?}");
            assert_eq!(node.to_source_string(), source);
            assert!(!node.has_diagnostics(), "{context:?}");
        }
    }

    #[test]
    fn test_resume_rules_without_own_request() {
        let cases = [
            (ParserContext::ImportDeclaration, "import org/pkg as p;", SyntaxKind::ImportDeclaration),
            (ParserContext::FunctionDefinition, "function f() {}", SyntaxKind::FunctionDefinition),
            (ParserContext::IfBlock, "if a { }", SyntaxKind::IfElseStatement),
            (ParserContext::BlockStatement, "{ x = 1; }", SyntaxKind::BlockStatement),
            (ParserContext::ListConstructor, "[1, 2]", SyntaxKind::ListConstructor),
            (ParserContext::QueryExpression, "from var x in xs select x", SyntaxKind::QueryExpression),
            (ParserContext::TupleTypeDescriptor, "[int, string]", SyntaxKind::TupleTypeDescriptor),
            (ParserContext::ListBindingPattern, "[a, _]", SyntaxKind::ListBindingPattern),
        ];
        for (context, source, kind) in cases {
            let mut parser = Parser::new(TokenReader::new(source));
            let node = parser.resume_context(context).expect("resumable context");
            assert_eq!(node.kind(), kind, "{context:?}");
            assert_eq!(node.to_source_string(), source);
            assert!(!node.has_diagnostics(), "{context:?}: {:?}", node.diagnostics());
        }
    }

    #[test]
    fn test_resume_with_computed_lhs() {
        let lhs = Parser::new(TokenReader::new("x")).parse_fragment(FragmentKind::Expression);
        let mut parser = Parser::new(TokenReader::new(" = 1;"));
        let node = parser.resume_parsing(RecoveryRequest::StatementRhs { annotations: None, lhs });
        assert_eq!(node.kind(), SyntaxKind::AssignmentStatement);
        assert_eq!(node.to_source_string(), "x = 1;");
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_resumed_statement_matches_fresh_parse() {
        let source = "foo(1, 2);";
        let fresh = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::Statement);
        let resumed = Parser::new(TokenReader::new(source))
            .resume_context(ParserContext::Statement)
            .expect("resumable context");
        assert!(fresh.is_isomorphic(&resumed));
    }
}
