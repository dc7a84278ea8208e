// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The recovery protocol.
//!
//! A production that meets an unexpected token builds a [`RecoveryRequest`]
//! naming the rule and the arguments it had already computed, and hands it
//! to [`Parser::recover`]. The installed [`RecoveryStrategy`] picks one of
//! three edits and the parser turns that into a [`Solution`]:
//!
//! - `Keep(kind)`: the current token is accepted as `kind`.
//! - `Insert { kind, missing }`: a zero-width `kind` token is deemed to be
//!   next; the caller re-dispatches on `kind` without consuming anything.
//! - `Remove(node)`: junk was discarded as invalid trivia and the rule was
//!   resumed from its arguments; `node` is the finished result.

use tracing::trace;

use super::context::ParserContext;
use super::declarations::{is_class_member_start, is_module_member_start, is_record_field_start};
use super::expressions::{ExpressionFlags, is_expression_start};
use super::patterns::{is_binding_pattern_start, is_match_pattern_start};
use super::precedence::OperatorPrecedence;
use super::statements::is_statement_start;
use super::types::is_type_start;
use super::Parser;
use crate::lexer::TokenSource;
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode};

/// Grammar of the items in a separated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItem {
    Expression,
    Argument,
    TypeDescriptor,
    BindingPattern,
    MatchPattern,
    Parameter,
    MappingField,
    WaitField,
    Identifier,
    /// Members of a list whose grammar is not decided yet.
    Ambiguous,
}

impl ListItem {
    /// Returns true if `kind` can begin an item.
    pub fn starts(self, kind: SyntaxKind) -> bool {
        match self {
            ListItem::Expression => is_expression_start(kind) || kind == SyntaxKind::Ellipsis,
            ListItem::Argument => is_expression_start(kind) || kind == SyntaxKind::Ellipsis,
            ListItem::TypeDescriptor => is_type_start(kind),
            ListItem::BindingPattern => is_binding_pattern_start(kind) || kind == SyntaxKind::Ellipsis,
            ListItem::MatchPattern => is_match_pattern_start(kind) || kind == SyntaxKind::Ellipsis,
            ListItem::Parameter => is_type_start(kind) || kind == SyntaxKind::At,
            ListItem::MappingField => is_mapping_field_start(kind),
            ListItem::WaitField | ListItem::Identifier => kind == SyntaxKind::Identifier,
            ListItem::Ambiguous => {
                is_expression_start(kind) || is_type_start(kind) || kind == SyntaxKind::Ellipsis
            }
        }
    }
}

/// Returns true if `kind` can begin a field of a mapping constructor.
pub fn is_mapping_field_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::StringLiteral
            | SyntaxKind::OpenBracket
            | SyntaxKind::Ellipsis
            | SyntaxKind::ReadonlyKeyword
    )
}

/// A rule that could not continue, with the arguments it had computed.
#[derive(Debug, Clone)]
pub enum RecoveryRequest {
    /// A single token of a known kind.
    Token {
        context: ParserContext,
        expected: SyntaxKind,
    },
    /// A separator or the closing delimiter of a list.
    ListEnd {
        context: ParserContext,
        close: SyntaxKind,
        item: ListItem,
    },
    /// An import declaration from its keyword.
    Import,
    /// A module member after its metadata and qualifiers.
    ModuleMember {
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
    },
    /// A statement after its annotations.
    Statement { annotations: Option<SyntaxNode> },
    /// What follows the left-hand expression of a statement.
    StatementRhs {
        annotations: Option<SyntaxNode>,
        lhs: SyntaxNode,
    },
    /// A class or object type member after metadata and qualifiers.
    ClassMember {
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
        object_type: bool,
    },
    /// A record type field after its metadata.
    RecordField { metadata: Option<SyntaxNode> },
    /// A function parameter after its annotations.
    Parameter { annotations: Option<SyntaxNode> },
    /// A call argument.
    Argument,
    /// A type descriptor in the given position.
    TypeDescriptor { context: ParserContext },
    /// A binding pattern.
    BindingPattern,
    /// A match pattern.
    MatchPattern,
    /// An expression at the given precedence floor.
    Expression {
        floor: OperatorPrecedence,
        flags: ExpressionFlags,
    },
    /// A function body.
    FunctionBody,
    /// The initializer or terminator of a variable declaration.
    VariableDeclarationRhs {
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
        binding: SyntaxNode,
        module_level: bool,
    },
    /// The body after `else`.
    ElseBody,
    /// The clause after the intermediate clauses of a query.
    QueryPipelineEnd {
        pipeline: SyntaxNode,
        flags: ExpressionFlags,
    },
    /// A mapping constructor field.
    MappingField { context: ParserContext },
}

impl RecoveryRequest {
    /// Argument-free request that re-enters `context` at the current token.
    ///
    /// Rules without a request of their own are entered through the
    /// nearest enclosing rule that starts from a token, which parses them
    /// whole: `IfBlock` resumes as a statement, `ListConstructor` as an
    /// expression. Rules that continue an operand or a prefix already
    /// parsed, such as `ConditionalExpression` or `WaitFields`, return
    /// `None`; pass a request carrying that state to
    /// [`Parser::resume_parsing`] instead.
    pub fn for_context(context: ParserContext) -> Option<RecoveryRequest> {
        use ParserContext as C;
        let request = match context {
            C::CompilationUnit
            | C::ModuleMember
            | C::FunctionDefinition
            | C::ModuleVariableDeclaration
            | C::ConstantDeclaration
            | C::TypeDefinition
            | C::ClassDefinition
            | C::EnumDeclaration
            | C::AnnotationDeclaration
            | C::ListenerDeclaration
            | C::ServiceDeclaration => RecoveryRequest::ModuleMember {
                metadata: None,
                qualifiers: Vec::new(),
            },
            C::ImportDeclaration => RecoveryRequest::Import,
            C::Statement
            | C::BlockStatement
            | C::LocalVariableDeclaration
            | C::AssignmentStatement
            | C::CompoundAssignmentStatement
            | C::DestructuringAssignment
            | C::ExpressionStatement
            | C::IfBlock
            | C::WhileBlock
            | C::ForeachStatement
            | C::MatchStatement
            | C::DoBlock
            | C::ReturnStatement
            | C::BreakStatement
            | C::ContinueStatement
            | C::PanicStatement
            | C::FailStatement
            | C::LockStatement
            | C::TransactionStatement
            | C::RetryStatement
            | C::RollbackStatement
            | C::ForkStatement
            | C::NamedWorkerDeclaration
            | C::QueryAction
            | C::AmbiguousList => RecoveryRequest::Statement { annotations: None },
            C::ClassMember | C::ObjectField => RecoveryRequest::ClassMember {
                metadata: None,
                qualifiers: Vec::new(),
                object_type: false,
            },
            C::ObjectMember => RecoveryRequest::ClassMember {
                metadata: None,
                qualifiers: Vec::new(),
                object_type: true,
            },
            C::RecordField => RecoveryRequest::RecordField { metadata: None },
            C::Parameter | C::DefaultableParameter => RecoveryRequest::Parameter { annotations: None },
            C::Argument => RecoveryRequest::Argument,
            C::TypeDescriptor
            | C::TupleTypeDescriptor
            | C::RecordTypeDescriptor
            | C::ObjectTypeDescriptor
            | C::FunctionTypeDescriptor
            | C::ParenthesisedTypeDescriptor => RecoveryRequest::TypeDescriptor { context },
            C::BindingPattern | C::ListBindingPattern | C::MappingBindingPattern | C::ErrorBindingPattern => {
                RecoveryRequest::BindingPattern
            }
            C::MatchPattern | C::ListMatchPattern | C::MappingMatchPattern | C::ErrorMatchPattern => {
                RecoveryRequest::MatchPattern
            }
            C::Expression
            | C::BracedExpression
            | C::ListConstructor
            | C::MappingConstructor
            | C::TypeCast
            | C::AnonymousFunction
            | C::ArrowFunction
            | C::NewExpression
            | C::LetExpression
            | C::QueryExpression
            | C::StartAction
            | C::WaitAction
            | C::FlushAction
            | C::ReceiveAction => RecoveryRequest::Expression {
                floor: OperatorPrecedence::Default,
                flags: ExpressionFlags::rhs().with_actions(true),
            },
            C::FunctionBody | C::FunctionBodyBlock | C::ExternalFunctionBody | C::ExpressionFunctionBody => {
                RecoveryRequest::FunctionBody
            }
            C::ElseBlock => RecoveryRequest::ElseBody,
            C::MappingField | C::ComputedFieldName => RecoveryRequest::MappingField {
                context: C::MappingConstructor,
            },
            C::ImportOrgOrModuleName
            | C::ImportModuleName
            | C::ImportPrefix
            | C::FunctionSignature
            | C::ParameterList
            | C::ReturnTypeDescriptor
            | C::EnumMember
            | C::AnnotationAttachPoints
            | C::ServicePath
            | C::ResourcePath
            | C::Annotations
            | C::VariableDeclarationRhs
            | C::MatchBody
            | C::MatchClause
            | C::MatchGuard
            | C::OnFailClause
            | C::TypeParameter
            | C::ArrayDimension
            | C::StreamTypeParams
            | C::TypeTestExpression
            | C::TypedBindingPattern
            | C::ArgumentList
            | C::MemberAccessKey
            | C::ConditionalExpression
            | C::LetVariableDeclaration
            | C::FromClause
            | C::WhereClause
            | C::LetClause
            | C::JoinClause
            | C::OnClause
            | C::OrderByClause
            | C::LimitClause
            | C::SelectClause
            | C::RemoteCallAction
            | C::SendAction
            | C::WaitFields
            | C::AmbiguousMapping
            | C::AmbiguousParen => return None,
        };
        Some(request)
    }

    /// The rule this request belongs to.
    pub fn context(&self) -> ParserContext {
        match self {
            RecoveryRequest::Token { context, .. } | RecoveryRequest::ListEnd { context, .. } => *context,
            RecoveryRequest::Import => ParserContext::ImportDeclaration,
            RecoveryRequest::ModuleMember { .. } => ParserContext::ModuleMember,
            RecoveryRequest::Statement { .. } => ParserContext::Statement,
            RecoveryRequest::StatementRhs { .. } => ParserContext::ExpressionStatement,
            RecoveryRequest::ClassMember { object_type, .. } => {
                if *object_type {
                    ParserContext::ObjectMember
                } else {
                    ParserContext::ClassMember
                }
            }
            RecoveryRequest::RecordField { .. } => ParserContext::RecordField,
            RecoveryRequest::Parameter { .. } => ParserContext::Parameter,
            RecoveryRequest::Argument => ParserContext::Argument,
            RecoveryRequest::TypeDescriptor { .. } => ParserContext::TypeDescriptor,
            RecoveryRequest::BindingPattern => ParserContext::BindingPattern,
            RecoveryRequest::MatchPattern => ParserContext::MatchPattern,
            RecoveryRequest::Expression { .. } => ParserContext::Expression,
            RecoveryRequest::FunctionBody => ParserContext::FunctionBody,
            RecoveryRequest::VariableDeclarationRhs { .. } => ParserContext::VariableDeclarationRhs,
            RecoveryRequest::ElseBody => ParserContext::ElseBlock,
            RecoveryRequest::QueryPipelineEnd { .. } => ParserContext::QueryExpression,
            RecoveryRequest::MappingField { .. } => ParserContext::MappingField,
        }
    }

    /// Returns true if the rule can continue with a token of `kind`.
    pub fn accepts(&self, kind: SyntaxKind) -> bool {
        match self {
            RecoveryRequest::Token { expected, .. } => kind == *expected,
            RecoveryRequest::ListEnd { close, .. } => kind == SyntaxKind::Comma || kind == *close,
            RecoveryRequest::Import => kind == SyntaxKind::ImportKeyword,
            RecoveryRequest::ModuleMember { .. } => is_module_member_start(kind),
            RecoveryRequest::Statement { .. } => is_statement_start(kind),
            RecoveryRequest::StatementRhs { .. } => matches!(kind, SyntaxKind::Equal | SyntaxKind::Semicolon),
            RecoveryRequest::ClassMember { .. } => is_class_member_start(kind),
            RecoveryRequest::RecordField { .. } => is_record_field_start(kind),
            RecoveryRequest::Parameter { .. } => ListItem::Parameter.starts(kind),
            RecoveryRequest::Argument => ListItem::Argument.starts(kind),
            RecoveryRequest::TypeDescriptor { .. } => is_type_start(kind),
            RecoveryRequest::BindingPattern => is_binding_pattern_start(kind),
            RecoveryRequest::MatchPattern => is_match_pattern_start(kind),
            RecoveryRequest::Expression { .. } => is_expression_start(kind),
            RecoveryRequest::FunctionBody => matches!(
                kind,
                SyntaxKind::OpenBrace | SyntaxKind::RightDoubleArrow | SyntaxKind::Equal
            ),
            RecoveryRequest::VariableDeclarationRhs { .. } => {
                matches!(kind, SyntaxKind::Equal | SyntaxKind::Semicolon)
            }
            RecoveryRequest::ElseBody => matches!(kind, SyntaxKind::IfKeyword | SyntaxKind::OpenBrace),
            RecoveryRequest::QueryPipelineEnd { .. } => matches!(
                kind,
                SyntaxKind::SelectKeyword
                    | SyntaxKind::DoKeyword
                    | SyntaxKind::FromKeyword
                    | SyntaxKind::WhereKeyword
                    | SyntaxKind::LetKeyword
                    | SyntaxKind::JoinKeyword
                    | SyntaxKind::OuterKeyword
                    | SyntaxKind::OrderKeyword
                    | SyntaxKind::LimitKeyword
            ),
            RecoveryRequest::MappingField { .. } => is_mapping_field_start(kind),
        }
    }

    /// The kind to synthesize when a token must be inserted.
    pub fn primary(&self) -> SyntaxKind {
        match self {
            RecoveryRequest::Token { expected, .. } => *expected,
            RecoveryRequest::ListEnd { close, .. } => *close,
            RecoveryRequest::FunctionBody | RecoveryRequest::ElseBody => SyntaxKind::OpenBrace,
            RecoveryRequest::StatementRhs { .. } | RecoveryRequest::VariableDeclarationRhs { .. } => {
                SyntaxKind::Semicolon
            }
            RecoveryRequest::QueryPipelineEnd { .. } => SyntaxKind::SelectKeyword,
            RecoveryRequest::Import => SyntaxKind::ImportKeyword,
            RecoveryRequest::ModuleMember { .. }
            | RecoveryRequest::Statement { .. }
            | RecoveryRequest::ClassMember { .. }
            | RecoveryRequest::RecordField { .. }
            | RecoveryRequest::Parameter { .. }
            | RecoveryRequest::Argument
            | RecoveryRequest::TypeDescriptor { .. }
            | RecoveryRequest::BindingPattern
            | RecoveryRequest::MatchPattern
            | RecoveryRequest::Expression { .. }
            | RecoveryRequest::MappingField { .. } => SyntaxKind::Identifier,
        }
    }

    /// Diagnostic for a token of `kind` inserted on behalf of this rule.
    pub fn missing_code(&self, kind: SyntaxKind) -> DiagnosticCode {
        match self {
            RecoveryRequest::Expression { .. } | RecoveryRequest::Argument => DiagnosticCode::MissingExpression,
            RecoveryRequest::TypeDescriptor { .. } => DiagnosticCode::MissingTypeDescriptor,
            RecoveryRequest::BindingPattern => DiagnosticCode::MissingBindingPattern,
            RecoveryRequest::MatchPattern => DiagnosticCode::MissingMatchPattern,
            _ => DiagnosticCode::missing(kind),
        }
    }
}

/// What the parser sees when it asks for a decision.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryView<'a> {
    /// Kind of the current token.
    pub current: SyntaxKind,
    /// Kind of the token after it.
    pub next: SyntaxKind,
    /// Rules in progress, outermost first.
    pub contexts: &'a [ParserContext],
}

impl RecoveryView<'_> {
    /// Returns true if a rule in progress would consume `kind` itself.
    pub fn owned_by_enclosing(&self, kind: SyntaxKind) -> bool {
        self.contexts.iter().any(|context| context.owns(kind))
    }
}

/// The edit a strategy chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Accept the current token as the given kind.
    Keep(SyntaxKind),
    /// Synthesize a token of the given kind.
    Insert(SyntaxKind),
    /// Discard the current token.
    Remove,
}

/// The outcome of one recovery call, consumed immediately by the caller.
#[derive(Debug, Clone)]
pub enum Solution {
    /// Proceed treating the current token as this kind.
    Keep(SyntaxKind),
    /// The rule was resumed after discarding junk; return this node.
    Remove(SyntaxNode),
    /// Re-dispatch on `kind`; `missing` is the synthesized token.
    Insert { kind: SyntaxKind, missing: SyntaxNode },
}

/// Chooses how to get past an unexpected token.
pub trait RecoveryStrategy: Send + Sync {
    /// Decides for `request` given the parser state in `view`.
    fn decide(&self, request: &RecoveryRequest, view: &RecoveryView<'_>) -> Decision;
}

/// The built-in strategy: cheap local edits guided by the context stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecovery;

impl RecoveryStrategy for DefaultRecovery {
    fn decide(&self, request: &RecoveryRequest, view: &RecoveryView<'_>) -> Decision {
        if view.current == SyntaxKind::Eof {
            return Decision::Insert(request.primary());
        }

        if view.current.is_contextual_keyword() && request.accepts(SyntaxKind::Identifier) {
            return Decision::Keep(SyntaxKind::Identifier);
        }

        if let RecoveryRequest::ListEnd { item, .. } = request
            && item.starts(view.current)
            && !view.owned_by_enclosing(view.current)
        {
            return Decision::Insert(SyntaxKind::Comma);
        }

        let owned = view.owned_by_enclosing(view.current);
        if request.accepts(view.next) && !owned {
            return Decision::Remove;
        }
        if owned {
            return Decision::Insert(request.primary());
        }
        Decision::Remove
    }
}

impl<S: TokenSource> Parser<S> {
    /// Asks the strategy for a decision without acting on it.
    fn decide(&mut self, request: &RecoveryRequest) -> Decision {
        let current = self.peek_kind();
        let next = self.peek_kind_at(2);
        let view = RecoveryView {
            current,
            next,
            contexts: self.contexts.as_slice(),
        };
        let decision = self.recovery.decide(request, &view);
        match decision {
            Decision::Remove if current == SyntaxKind::Eof => Decision::Insert(request.primary()),
            other => other,
        }
    }

    /// Runs one recovery step for `request`. See the module docs.
    pub fn recover(&mut self, request: RecoveryRequest) -> Solution {
        let current = self.peek_token();
        let decision = self.decide(&request);
        trace!(
            context = ?request.context(),
            token = ?current.kind(),
            offset = current.span().start,
            ?decision,
            "recovery"
        );
        match decision {
            Decision::Keep(kind) => Solution::Keep(kind),
            Decision::Insert(kind) => {
                let missing = self.missing(kind, request.missing_code(kind));
                Solution::Insert { kind, missing }
            }
            Decision::Remove => {
                self.invalidate_current();
                while self.peek_kind() != SyntaxKind::Eof
                    && !request.accepts(self.peek_kind())
                    && self.decide(&request) == Decision::Remove
                {
                    self.invalidate_current();
                }
                Solution::Remove(self.resume_parsing(request))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(current: SyntaxKind, next: SyntaxKind, contexts: &[ParserContext]) -> RecoveryView<'_> {
        RecoveryView { current, next, contexts }
    }

    fn semicolon() -> RecoveryRequest {
        RecoveryRequest::Token {
            context: ParserContext::ReturnStatement,
            expected: SyntaxKind::Semicolon,
        }
    }

    #[test]
    fn test_eof_inserts() {
        let contexts = [ParserContext::CompilationUnit];
        let decision = DefaultRecovery.decide(&semicolon(), &view(SyntaxKind::Eof, SyntaxKind::Eof, &contexts));
        assert_eq!(decision, Decision::Insert(SyntaxKind::Semicolon));
    }

    #[test]
    fn test_contextual_keyword_is_kept() {
        let request = RecoveryRequest::Token {
            context: ParserContext::Expression,
            expected: SyntaxKind::Identifier,
        };
        let decision = DefaultRecovery.decide(&request, &view(SyntaxKind::JoinKeyword, SyntaxKind::Semicolon, &[]));
        assert_eq!(decision, Decision::Keep(SyntaxKind::Identifier));
    }

    #[test]
    fn test_junk_before_acceptable_token_is_removed() {
        let contexts = [ParserContext::FunctionBodyBlock, ParserContext::ReturnStatement];
        let decision = DefaultRecovery.decide(
            &semicolon(),
            &view(SyntaxKind::Identifier, SyntaxKind::Semicolon, &contexts),
        );
        assert_eq!(decision, Decision::Remove);
    }

    #[test]
    fn test_enclosing_terminator_inserts() {
        let contexts = [ParserContext::FunctionBodyBlock, ParserContext::ReturnStatement];
        let decision = DefaultRecovery.decide(
            &semicolon(),
            &view(SyntaxKind::CloseBrace, SyntaxKind::Eof, &contexts),
        );
        assert_eq!(decision, Decision::Insert(SyntaxKind::Semicolon));
    }

    #[test]
    fn test_missing_separator_inserts_comma() {
        let request = RecoveryRequest::ListEnd {
            context: ParserContext::ListConstructor,
            close: SyntaxKind::CloseBracket,
            item: ListItem::Expression,
        };
        let contexts = [ParserContext::ListConstructor];
        let decision = DefaultRecovery.decide(
            &request,
            &view(SyntaxKind::DecimalIntegerLiteral, SyntaxKind::CloseBracket, &contexts),
        );
        assert_eq!(decision, Decision::Insert(SyntaxKind::Comma));
    }

    #[test]
    fn test_every_resumable_context_has_consistent_primary() {
        use ParserContext as C;
        for context in [
            C::ModuleMember,
            C::Statement,
            C::ClassMember,
            C::ObjectMember,
            C::RecordField,
            C::Parameter,
            C::Argument,
            C::TypeDescriptor,
            C::BindingPattern,
            C::MatchPattern,
            C::Expression,
            C::FunctionBody,
            C::ElseBlock,
            C::MappingField,
            C::ImportDeclaration,
            C::IfBlock,
            C::TupleTypeDescriptor,
            C::ListConstructor,
            C::QueryExpression,
        ] {
            let request = RecoveryRequest::for_context(context).expect("resumable");
            assert!(request.accepts(request.primary()), "{context:?}");
        }
    }

    #[test]
    fn test_rules_entered_through_enclosing_rule() {
        use ParserContext as C;
        let context_of = |context| RecoveryRequest::for_context(context).map(|request| request.context());
        assert_eq!(context_of(C::ImportDeclaration), Some(C::ImportDeclaration));
        assert_eq!(context_of(C::FunctionDefinition), Some(C::ModuleMember));
        assert_eq!(context_of(C::BlockStatement), Some(C::Statement));
        assert_eq!(context_of(C::QueryExpression), Some(C::Expression));
        assert_eq!(context_of(C::ObjectField), Some(C::ClassMember));
        assert_eq!(context_of(C::ConditionalExpression), None);
        assert_eq!(context_of(C::VariableDeclarationRhs), None);
    }
}
