// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Query expressions and query actions.

use super::context::ParserContext;
use super::expressions::ExpressionFlags;
use super::parser::Parser;
use super::precedence::OperatorPrecedence;
use super::recovery::{RecoveryRequest, Solution};
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

fn is_intermediate_clause_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::FromKeyword
            | SyntaxKind::WhereKeyword
            | SyntaxKind::LetKeyword
            | SyntaxKind::JoinKeyword
            | SyntaxKind::OuterKeyword
            | SyntaxKind::OrderKeyword
            | SyntaxKind::LimitKeyword
    )
}

impl<S: TokenSource> Parser<S> {
    /// `from ... select e` or `from ... do { }`.
    pub(crate) fn parse_query(&mut self, flags: ExpressionFlags) -> SyntaxNode {
        self.in_context(ParserContext::QueryExpression, |p| {
            let from = p.parse_from_clause();
            let mut clauses = Vec::new();
            while is_intermediate_clause_start(p.peek_kind()) {
                clauses.push(p.parse_intermediate_clause());
            }
            let pipeline = factory::node(SyntaxKind::QueryPipeline, vec![Some(from), Some(factory::list(clauses))]);
            let kind = p.peek_kind();
            p.parse_query_end_with(kind, pipeline, flags)
        })
    }

    /// Ends a pipeline. Stray clauses found here are appended to it.
    pub(crate) fn parse_query_end_with(
        &mut self,
        mut kind: SyntaxKind,
        mut pipeline: SyntaxNode,
        flags: ExpressionFlags,
    ) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::SelectKeyword => {
                    let keyword = self.consume_node();
                    self.finish_query_expression(pipeline, keyword)
                }
                SyntaxKind::DoKeyword => self.in_context(ParserContext::QueryAction, |p| {
                    let keyword = p.consume_node();
                    let block = p.parse_block();
                    let action = factory::node(SyntaxKind::QueryAction, vec![Some(pipeline), Some(keyword), Some(block)]);
                    if flags.allow_actions {
                        action
                    } else {
                        factory::with_diagnostic(action, DiagnosticCode::ActionNotAllowed)
                    }
                }),
                k if is_intermediate_clause_start(k) => {
                    let clause = self.parse_intermediate_clause();
                    pipeline = Self::append_clause(&pipeline, clause);
                    kind = self.peek_kind();
                    continue;
                }
                _ => match self.recover(RecoveryRequest::QueryPipelineEnd {
                    pipeline: pipeline.clone(),
                    flags,
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => self.finish_query_expression(pipeline, missing),
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    fn finish_query_expression(&mut self, pipeline: SyntaxNode, keyword: SyntaxNode) -> SyntaxNode {
        let expression = self.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
        let select = factory::node(SyntaxKind::SelectClause, vec![Some(keyword), Some(expression)]);
        factory::node(SyntaxKind::QueryExpression, vec![Some(pipeline), Some(select)])
    }

    fn append_clause(pipeline: &SyntaxNode, clause: SyntaxNode) -> SyntaxNode {
        let from = pipeline.slot(0).cloned();
        let mut clauses: Vec<SyntaxNode> = pipeline.slot(1).map(|list| list.children().cloned().collect()).unwrap_or_default();
        clauses.push(clause);
        factory::node(SyntaxKind::QueryPipeline, vec![from, Some(factory::list(clauses))])
    }

    fn parse_from_clause(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::FromClause, |p| {
            let keyword = p.expect(SyntaxKind::FromKeyword, ParserContext::FromClause);
            let binding = p.parse_typed_binding_pattern();
            let in_keyword = p.expect(SyntaxKind::InKeyword, ParserContext::FromClause);
            let source = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
            factory::node(
                SyntaxKind::FromClause,
                vec![Some(keyword), Some(binding), Some(in_keyword), Some(source)],
            )
        })
    }

    fn parse_intermediate_clause(&mut self) -> SyntaxNode {
        match self.peek_kind() {
            SyntaxKind::WhereKeyword => self.in_context(ParserContext::WhereClause, |p| {
                let keyword = p.consume_node();
                let condition = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
                factory::node(SyntaxKind::WhereClause, vec![Some(keyword), Some(condition)])
            }),
            SyntaxKind::LetKeyword => self.in_context(ParserContext::LetClause, |p| {
                let keyword = p.consume_node();
                let mut declarations = vec![p.parse_let_variable_declaration()];
                while p.peek_kind() == SyntaxKind::Comma {
                    declarations.push(p.consume_node());
                    declarations.push(p.parse_let_variable_declaration());
                }
                factory::node(SyntaxKind::LetClause, vec![Some(keyword), Some(factory::list(declarations))])
            }),
            SyntaxKind::JoinKeyword | SyntaxKind::OuterKeyword => self.parse_join_clause(),
            SyntaxKind::OrderKeyword => self.in_context(ParserContext::OrderByClause, |p| {
                let order = p.consume_node();
                let by = p.expect(SyntaxKind::ByKeyword, ParserContext::OrderByClause);
                let mut keys = vec![p.parse_order_key()];
                while p.peek_kind() == SyntaxKind::Comma {
                    keys.push(p.consume_node());
                    keys.push(p.parse_order_key());
                }
                factory::node(SyntaxKind::OrderByClause, vec![Some(order), Some(by), Some(factory::list(keys))])
            }),
            SyntaxKind::LimitKeyword => self.in_context(ParserContext::LimitClause, |p| {
                let keyword = p.consume_node();
                let count = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
                factory::node(SyntaxKind::LimitClause, vec![Some(keyword), Some(count)])
            }),
            _ => self.parse_from_clause(),
        }
    }

    fn parse_order_key(&mut self) -> SyntaxNode {
        let key = self.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
        let direction = matches!(
            self.peek_kind(),
            SyntaxKind::AscendingKeyword | SyntaxKind::DescendingKeyword
        )
        .then(|| self.consume_node());
        factory::node(SyntaxKind::OrderKey, vec![Some(key), direction])
    }

    fn parse_join_clause(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::JoinClause, |p| {
            let outer = p.optional(SyntaxKind::OuterKeyword);
            let join = p.expect(SyntaxKind::JoinKeyword, ParserContext::JoinClause);
            let binding = p.parse_typed_binding_pattern();
            let in_keyword = p.expect(SyntaxKind::InKeyword, ParserContext::JoinClause);
            let source = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
            let on = p.in_context(ParserContext::OnClause, |p| {
                let on = p.expect(SyntaxKind::OnKeyword, ParserContext::OnClause);
                let lhs = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
                let equals = p.expect(SyntaxKind::EqualsKeyword, ParserContext::OnClause);
                let rhs = p.parse_expression(OperatorPrecedence::Query, ExpressionFlags::rhs());
                factory::node(SyntaxKind::OnClause, vec![Some(on), Some(lhs), Some(equals), Some(rhs)])
            });
            factory::node(
                SyntaxKind::JoinClause,
                vec![outer, Some(join), Some(binding), Some(in_keyword), Some(source), Some(on)],
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::FragmentKind;

    fn parse(source: &str, kind: FragmentKind) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_fragment(kind);
        assert_eq!(node.to_source_string(), source);
        node
    }

    #[test]
    fn test_full_pipeline() {
        let source = "from var p in people \
                      join var d in depts on p.dept equals d.id \
                      where p.age > 21 \
                      let string n = p.name \
                      order by n descending, p.age \
                      limit 10 \
                      select {n, d}";
        let node = parse(source, FragmentKind::Expression);
        assert_eq!(node.kind(), SyntaxKind::QueryExpression);
        assert!(!node.has_diagnostics(), "{:?}", node.diagnostics());
        for kind in [
            SyntaxKind::JoinClause,
            SyntaxKind::OnClause,
            SyntaxKind::WhereClause,
            SyntaxKind::LetClause,
            SyntaxKind::OrderByClause,
            SyntaxKind::LimitClause,
            SyntaxKind::SelectClause,
        ] {
            assert!(node.find(kind).is_some(), "{kind:?}");
        }
        assert_eq!(node.find_all(SyntaxKind::OrderKey).len(), 2);
    }

    #[test]
    fn test_query_action() {
        let node = parse("from int i in xs do { total += i; };", FragmentKind::Statement);
        assert_eq!(node.kind(), SyntaxKind::ActionStatement);
        assert!(node.find(SyntaxKind::QueryAction).is_some());
        assert!(!node.has_diagnostics());
    }

    #[test]
    fn test_missing_select_is_inserted() {
        let node = parse("from int i in xs", FragmentKind::Expression);
        assert_eq!(node.kind(), SyntaxKind::QueryExpression);
        assert!(
            node.diagnostics()
                .iter()
                .any(|d| d.code == DiagnosticCode::MissingToken(SyntaxKind::SelectKeyword))
        );
    }
}
