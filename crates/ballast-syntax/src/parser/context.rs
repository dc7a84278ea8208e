// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Grammar-rule tags and the context stack.
//!
//! The stack only feeds recovery decisions. It never changes tree shape.

use crate::syntax::SyntaxKind;

/// Tag of a grammar rule in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserContext {
    CompilationUnit,
    ModuleMember,
    ImportDeclaration,
    ImportOrgOrModuleName,
    ImportModuleName,
    ImportPrefix,
    FunctionDefinition,
    FunctionSignature,
    ParameterList,
    Parameter,
    DefaultableParameter,
    ReturnTypeDescriptor,
    FunctionBody,
    FunctionBodyBlock,
    ExternalFunctionBody,
    ExpressionFunctionBody,
    ModuleVariableDeclaration,
    ConstantDeclaration,
    TypeDefinition,
    ClassDefinition,
    ClassMember,
    ObjectField,
    EnumDeclaration,
    EnumMember,
    AnnotationDeclaration,
    AnnotationAttachPoints,
    ListenerDeclaration,
    ServiceDeclaration,
    ServicePath,
    ResourcePath,
    Annotations,

    Statement,
    BlockStatement,
    LocalVariableDeclaration,
    VariableDeclarationRhs,
    AssignmentStatement,
    CompoundAssignmentStatement,
    DestructuringAssignment,
    ExpressionStatement,
    IfBlock,
    ElseBlock,
    WhileBlock,
    ForeachStatement,
    MatchStatement,
    MatchBody,
    MatchClause,
    MatchPattern,
    ListMatchPattern,
    MappingMatchPattern,
    ErrorMatchPattern,
    MatchGuard,
    DoBlock,
    OnFailClause,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    PanicStatement,
    FailStatement,
    LockStatement,
    TransactionStatement,
    RetryStatement,
    RollbackStatement,
    ForkStatement,
    NamedWorkerDeclaration,

    TypeDescriptor,
    TypeParameter,
    ArrayDimension,
    TupleTypeDescriptor,
    RecordTypeDescriptor,
    RecordField,
    ObjectTypeDescriptor,
    ObjectMember,
    FunctionTypeDescriptor,
    ParenthesisedTypeDescriptor,
    StreamTypeParams,
    TypeTestExpression,

    BindingPattern,
    TypedBindingPattern,
    ListBindingPattern,
    MappingBindingPattern,
    ErrorBindingPattern,

    Expression,
    BracedExpression,
    ArgumentList,
    Argument,
    ListConstructor,
    MappingConstructor,
    MappingField,
    ComputedFieldName,
    MemberAccessKey,
    TypeCast,
    ConditionalExpression,
    AnonymousFunction,
    ArrowFunction,
    NewExpression,
    LetExpression,
    LetVariableDeclaration,
    QueryExpression,
    FromClause,
    WhereClause,
    LetClause,
    JoinClause,
    OnClause,
    OrderByClause,
    LimitClause,
    SelectClause,
    QueryAction,

    RemoteCallAction,
    SendAction,
    ReceiveAction,
    StartAction,
    WaitAction,
    WaitFields,
    FlushAction,

    AmbiguousList,
    AmbiguousMapping,
    AmbiguousParen,
}

const BLOCK_STARTERS: &[SyntaxKind] = &[
    SyntaxKind::CloseBrace,
    SyntaxKind::IfKeyword,
    SyntaxKind::WhileKeyword,
    SyntaxKind::ForeachKeyword,
    SyntaxKind::MatchKeyword,
    SyntaxKind::ReturnKeyword,
    SyntaxKind::BreakKeyword,
    SyntaxKind::ContinueKeyword,
    SyntaxKind::PanicKeyword,
    SyntaxKind::LockKeyword,
    SyntaxKind::DoKeyword,
    SyntaxKind::ForkKeyword,
    SyntaxKind::WorkerKeyword,
    SyntaxKind::TransactionKeyword,
    SyntaxKind::RetryKeyword,
    SyntaxKind::RollbackKeyword,
    SyntaxKind::FinalKeyword,
    SyntaxKind::VarKeyword,
];

const MODULE_STARTERS: &[SyntaxKind] = &[
    SyntaxKind::Eof,
    SyntaxKind::ImportKeyword,
    SyntaxKind::PublicKeyword,
    SyntaxKind::FunctionKeyword,
    SyntaxKind::TypeKeyword,
    SyntaxKind::ConstKeyword,
    SyntaxKind::ClassKeyword,
    SyntaxKind::EnumKeyword,
    SyntaxKind::ListenerKeyword,
    SyntaxKind::ServiceKeyword,
    SyntaxKind::AnnotationKeyword,
    SyntaxKind::ConfigurableKeyword,
];

const QUERY_CLAUSE_STARTERS: &[SyntaxKind] = &[
    SyntaxKind::FromKeyword,
    SyntaxKind::WhereKeyword,
    SyntaxKind::LetKeyword,
    SyntaxKind::JoinKeyword,
    SyntaxKind::OuterKeyword,
    SyntaxKind::OrderKeyword,
    SyntaxKind::LimitKeyword,
    SyntaxKind::SelectKeyword,
    SyntaxKind::DoKeyword,
];

impl ParserContext {
    /// Tokens that end or restart this rule, and which recovery should
    /// therefore leave for the rule to consume.
    pub fn terminators(self) -> &'static [SyntaxKind] {
        use ParserContext as C;
        match self {
            C::CompilationUnit => MODULE_STARTERS,
            C::FunctionBodyBlock | C::BlockStatement | C::IfBlock | C::ElseBlock | C::WhileBlock | C::DoBlock
            | C::LockStatement | C::TransactionStatement | C::OnFailClause | C::NamedWorkerDeclaration => {
                BLOCK_STARTERS
            }
            C::ClassDefinition
            | C::ObjectTypeDescriptor
            | C::ServiceDeclaration
            | C::EnumDeclaration
            | C::MatchBody
            | C::ForkStatement
            | C::MappingConstructor
            | C::MappingBindingPattern
            | C::MappingMatchPattern
            | C::AmbiguousMapping
            | C::WaitFields => &[SyntaxKind::CloseBrace],
            C::RecordTypeDescriptor => &[SyntaxKind::CloseBrace, SyntaxKind::ClosePipeBrace],
            C::ParameterList
            | C::ArgumentList
            | C::BracedExpression
            | C::ParenthesisedTypeDescriptor
            | C::ErrorBindingPattern
            | C::ErrorMatchPattern
            | C::AmbiguousParen => &[SyntaxKind::CloseParen],
            C::ListConstructor
            | C::ListBindingPattern
            | C::ListMatchPattern
            | C::TupleTypeDescriptor
            | C::MemberAccessKey
            | C::ArrayDimension
            | C::ComputedFieldName
            | C::AmbiguousList => &[SyntaxKind::CloseBracket],
            C::TypeParameter | C::StreamTypeParams | C::TypeCast => &[SyntaxKind::Gt],
            C::ImportDeclaration
            | C::ModuleVariableDeclaration
            | C::ConstantDeclaration
            | C::TypeDefinition
            | C::ObjectField
            | C::RecordField
            | C::AnnotationDeclaration
            | C::ListenerDeclaration
            | C::LocalVariableDeclaration
            | C::VariableDeclarationRhs
            | C::AssignmentStatement
            | C::CompoundAssignmentStatement
            | C::DestructuringAssignment
            | C::ExpressionStatement
            | C::ReturnStatement
            | C::BreakStatement
            | C::ContinueStatement
            | C::PanicStatement
            | C::FailStatement
            | C::RollbackStatement
            | C::ExpressionFunctionBody
            | C::ExternalFunctionBody => &[SyntaxKind::Semicolon],
            C::MatchClause | C::MatchGuard => &[SyntaxKind::RightDoubleArrow],
            C::ConditionalExpression => &[SyntaxKind::Colon],
            C::ForeachStatement | C::FromClause | C::JoinClause => &[SyntaxKind::InKeyword],
            C::QueryExpression
            | C::QueryAction
            | C::WhereClause
            | C::LetClause
            | C::OnClause
            | C::OrderByClause
            | C::LimitClause => QUERY_CLAUSE_STARTERS,
            C::ServicePath => &[SyntaxKind::OnKeyword],
            C::LetExpression => &[SyntaxKind::InKeyword],
            C::MatchStatement => &[SyntaxKind::OpenBrace],
            C::FunctionSignature | C::ReturnTypeDescriptor => {
                &[SyntaxKind::OpenBrace, SyntaxKind::RightDoubleArrow, SyntaxKind::Equal]
            }
            _ => &[],
        }
    }

    /// Returns true if recovery should leave `kind` to this rule.
    pub fn owns(self, kind: SyntaxKind) -> bool {
        self.terminators().contains(&kind)
    }
}

/// Stack of rules in progress, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    stack: Vec<ParserContext>,
}

impl ContextStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a rule.
    pub fn push(&mut self, context: ParserContext) {
        self.stack.push(context);
    }

    /// Replaces the innermost rule.
    pub fn switch(&mut self, context: ParserContext) {
        match self.stack.last_mut() {
            Some(top) => *top = context,
            None => self.stack.push(context),
        }
    }

    /// Leaves the innermost rule.
    pub fn pop(&mut self) -> Option<ParserContext> {
        self.stack.pop()
    }

    /// Innermost rule.
    pub fn current(&self) -> Option<ParserContext> {
        self.stack.last().copied()
    }

    /// Rules in progress, outermost first.
    pub fn as_slice(&self) -> &[ParserContext] {
        &self.stack
    }

    /// Number of rules in progress.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if any rule in progress owns `kind`.
    pub fn any_owns(&self, kind: SyntaxKind) -> bool {
        self.stack.iter().any(|context| context.owns(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_replaces_top() {
        let mut stack = ContextStack::new();
        stack.push(ParserContext::CompilationUnit);
        stack.push(ParserContext::Statement);
        stack.switch(ParserContext::ReturnStatement);
        assert_eq!(stack.current(), Some(ParserContext::ReturnStatement));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some(ParserContext::ReturnStatement));
    }

    #[test]
    fn test_any_owns_consults_enclosing_rules() {
        let mut stack = ContextStack::new();
        stack.push(ParserContext::ArgumentList);
        stack.push(ParserContext::Expression);
        assert!(stack.any_owns(SyntaxKind::CloseParen));
        assert!(!stack.any_owns(SyntaxKind::CloseBracket));
    }

    #[test]
    fn test_block_owns_statement_keywords() {
        assert!(ParserContext::FunctionBodyBlock.owns(SyntaxKind::ReturnKeyword));
        assert!(ParserContext::CompilationUnit.owns(SyntaxKind::Eof));
        assert!(!ParserContext::Expression.owns(SyntaxKind::Semicolon));
    }
}
