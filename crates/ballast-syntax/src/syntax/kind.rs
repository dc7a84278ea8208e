// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The single kind enumeration shared by tokens and composite nodes.
//!
//! Token kinds are declared first, followed by [`SyntaxKind::ModulePart`]
//! and the remaining composite kinds, so that [`SyntaxKind::is_token`] is a
//! plain discriminant comparison. Composite variants document their child
//! slot layout; a `?` marks a slot that may be absent.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

macro_rules! keywords {
    ($($kind:ident => $text:literal),* $(,)?) => {
        /// Every reserved and contextual keyword with its source text.
        pub const KEYWORDS: &[(&str, SyntaxKind)] = &[$(($text, SyntaxKind::$kind)),*];

        impl SyntaxKind {
            fn keyword_text(self) -> Option<&'static str> {
                match self {
                    $(SyntaxKind::$kind => Some($text),)*
                    _ => None,
                }
            }
        }
    };
}

/// Kind of a token or composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // Keywords
    PublicKeyword,
    PrivateKeyword,
    RemoteKeyword,
    ResourceKeyword,
    FunctionKeyword,
    ReturnsKeyword,
    ReturnKeyword,
    ExternalKeyword,
    TypeKeyword,
    RecordKeyword,
    ObjectKeyword,
    ReadonlyKeyword,
    DistinctKeyword,
    IsolatedKeyword,
    ClientKeyword,
    ServiceKeyword,
    ListenerKeyword,
    OnKeyword,
    ImportKeyword,
    AsKeyword,
    ConstKeyword,
    FinalKeyword,
    ConfigurableKeyword,
    VarKeyword,
    IfKeyword,
    ElseKeyword,
    WhileKeyword,
    ForeachKeyword,
    InKeyword,
    MatchKeyword,
    DoKeyword,
    FailKeyword,
    BreakKeyword,
    ContinueKeyword,
    PanicKeyword,
    CheckKeyword,
    CheckpanicKeyword,
    TrapKeyword,
    NewKeyword,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    IsKeyword,
    TypeofKeyword,
    LetKeyword,
    FromKeyword,
    WhereKeyword,
    SelectKeyword,
    LimitKeyword,
    OrderKeyword,
    ByKeyword,
    AscendingKeyword,
    DescendingKeyword,
    JoinKeyword,
    EqualsKeyword,
    OuterKeyword,
    WorkerKeyword,
    ForkKeyword,
    StartKeyword,
    WaitKeyword,
    FlushKeyword,
    CommitKeyword,
    RollbackKeyword,
    RetryKeyword,
    TransactionKeyword,
    TransactionalKeyword,
    LockKeyword,
    ClassKeyword,
    EnumKeyword,
    AnnotationKeyword,
    SourceKeyword,
    ErrorKeyword,
    NeverKeyword,
    IntKeyword,
    FloatKeyword,
    DecimalKeyword,
    StringKeyword,
    BooleanKeyword,
    ByteKeyword,
    JsonKeyword,
    XmlKeyword,
    AnydataKeyword,
    AnyKeyword,
    HandleKeyword,
    MapKeyword,
    FutureKeyword,
    TypedescKeyword,
    StreamKeyword,

    // Punctuation
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `{|`
    OpenBracePipe,
    /// `|}`
    ClosePipeBrace,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `..<`
    DoubleDotLt,
    /// `?`
    QuestionMark,
    /// `?.`
    OptionalChaining,
    /// `?:`
    Elvis,
    /// `@`
    At,
    /// `=`
    Equal,
    /// `==`
    DoubleEqual,
    /// `===`
    TripleEqual,
    /// `!=`
    NotEqual,
    /// `!==`
    NotDoubleEqual,
    /// `!is`
    NotIs,
    /// `<`
    Lt,
    /// `>`; the scanner never produces `>>` so type parameters can close.
    Gt,
    /// `<=`
    LtEqual,
    /// `>=`
    GtEqual,
    /// `<<`
    DoubleLt,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Exclamation,
    /// `~`
    Tilde,
    /// `&`
    BitwiseAnd,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `->`
    RightArrow,
    /// `->>`
    SyncSendArrow,
    /// `<-`
    LeftArrow,
    /// `=>`
    RightDoubleArrow,
    /// `_`
    Underscore,

    // Literals and identifiers
    Identifier,
    DecimalIntegerLiteral,
    HexIntegerLiteral,
    DecimalFloatingPointLiteral,
    StringLiteral,

    /// A character sequence the scanner could not classify.
    Invalid,
    /// End of input; its leading trivia holds everything after the last token.
    Eof,

    // Composite nodes
    /// imports, members, eof
    ModulePart,
    /// A homogeneous sequence; slots are the items, separators included.
    List,

    /// `import` org? module-name prefix? `;`
    ImportDeclaration,
    /// name `/`
    ImportOrgName,
    /// `as` name
    ImportPrefix,
    /// metadata? qualifiers `function` name signature body
    FunctionDefinition,
    /// metadata? qualifiers `function` name signature `;`
    MethodDeclaration,
    /// `(` params `)` return-type?
    FunctionSignature,
    /// `returns` annotations type
    ReturnTypeDescriptor,
    /// `{` statements `}`
    FunctionBodyBlock,
    /// `=>` expression `;`?
    ExpressionFunctionBody,
    /// `=` annotations `external` `;`
    ExternalFunctionBody,
    /// annotations type name?
    RequiredParameter,
    /// annotations type name `=` expression
    DefaultableParameter,
    /// annotations type `...` name?
    RestParameter,
    /// accessor path-segments
    ResourcePath,
    /// `[` type name? `]`
    ResourcePathParameter,
    /// metadata? qualifiers typed-binding-pattern (`=` initializer)? `;`
    ModuleVariableDeclaration,
    /// metadata? qualifiers `const` type? name `=` expression `;`
    ConstantDeclaration,
    /// metadata? qualifiers `type` name type `;`
    TypeDefinition,
    /// metadata? qualifiers `class` name `{` members `}`
    ClassDefinition,
    /// metadata? qualifiers type name (`=` expression)? `;`
    ObjectField,
    /// `*` type `;`
    TypeReference,
    /// metadata? qualifiers `enum` name `{` members `}`
    EnumDeclaration,
    /// metadata? name (`=` expression)?
    EnumMember,
    /// metadata? qualifiers `annotation` type? name `on`? attach-points `;`
    AnnotationDeclaration,
    /// `source`? words
    AnnotationAttachPoint,
    /// metadata? qualifiers `listener` type? name `=` expression `;`
    ListenerDeclaration,
    /// metadata? qualifiers `service` type? path `on` expressions `{` members `}`
    ServiceDeclaration,
    /// annotations
    Metadata,
    /// `@` reference mapping-constructor?
    Annotation,

    /// `{` statements `}`
    BlockStatement,
    /// annotations `final`? typed-binding-pattern (`=` expression)? `;`
    LocalVariableDeclaration,
    /// lhs `=` expression `;`
    AssignmentStatement,
    /// lhs operator `=` expression `;`
    CompoundAssignmentStatement,
    /// binding-pattern `=` expression `;`
    DestructuringAssignmentStatement,
    /// expression `;`
    ExpressionStatement,
    /// call `;`
    CallStatement,
    /// action `;`
    ActionStatement,
    /// `if` condition block else?
    IfElseStatement,
    /// `else` (if-statement | block)
    ElseBlock,
    /// `while` condition block on-fail?
    WhileStatement,
    /// `foreach` typed-binding-pattern `in` expression block on-fail?
    ForeachStatement,
    /// `match` expression `{` clauses `}` on-fail?
    MatchStatement,
    /// patterns guard? `=>` block
    MatchClause,
    /// `if` expression
    MatchGuard,
    /// `do` block on-fail?
    DoStatement,
    /// `on` `fail` typed-binding-pattern? block
    OnFailClause,
    /// `return` expression? `;`
    ReturnStatement,
    /// `break` `;`
    BreakStatement,
    /// `continue` `;`
    ContinueStatement,
    /// `panic` expression `;`
    PanicStatement,
    /// `fail` expression `;`
    FailStatement,
    /// `lock` block on-fail?
    LockStatement,
    /// `transaction` block on-fail?
    TransactionStatement,
    /// `retry` type-params? args? (block | transaction) on-fail?
    RetryStatement,
    /// `rollback` expression? `;`
    RollbackStatement,
    /// `fork` `{` workers `}`
    ForkStatement,
    /// annotations qualifiers `worker` name return-type? block
    NamedWorkerDeclaration,

    /// type binding-pattern
    TypedBindingPattern,
    /// name
    CaptureBindingPattern,
    /// `_`
    WildcardBindingPattern,
    /// `[` members `]`
    ListBindingPattern,
    /// `...` name
    RestBindingPattern,
    /// `{` fields `}`
    MappingBindingPattern,
    /// name (`:` binding-pattern)?
    FieldBindingPattern,
    /// `error` type-ref? `(` args `)`
    ErrorBindingPattern,
    /// name `=` binding-pattern
    NamedArgBindingPattern,

    /// `[` members `]`
    ListMatchPattern,
    /// `...` binding
    RestMatchPattern,
    /// `{` fields `}`
    MappingMatchPattern,
    /// name `:` pattern
    FieldMatchPattern,
    /// `error` type-ref? `(` args `)`
    ErrorMatchPattern,
    /// name `=` pattern
    NamedArgMatchPattern,

    /// keyword
    BuiltinSimpleTypeDescriptor,
    /// `(` `)`
    NilTypeDescriptor,
    /// keyword type-parameter?
    ParameterizedTypeDescriptor,
    /// `<` type `>`
    TypeParameter,
    /// `stream` `<` type (`,` type)? `>`
    StreamTypeDescriptor,
    /// `<` type (`,` type)? `>`
    StreamTypeParams,
    /// member-type dimension
    ArrayTypeDescriptor,
    /// `[` length? `]`
    ArrayDimension,
    /// type `?`
    OptionalTypeDescriptor,
    /// lhs `|` rhs
    UnionTypeDescriptor,
    /// lhs `&` rhs
    IntersectionTypeDescriptor,
    /// `[` members `]`
    TupleTypeDescriptor,
    /// type `...`
    RestTypeDescriptor,
    /// `record` (`{` | `{|`) fields (`}` | `|}`); a rest descriptor is one of the fields
    RecordTypeDescriptor,
    /// metadata? `readonly`? type name `?`? `;`
    RecordField,
    /// metadata? `readonly`? type name `=` expression `;`
    RecordFieldWithDefault,
    /// type `...` `;`
    RecordRestDescriptor,
    /// qualifiers `object` `{` members `}`
    ObjectTypeDescriptor,
    /// qualifiers `function` signature?
    FunctionTypeDescriptor,
    /// `(` type `)`
    ParenthesisedTypeDescriptor,
    /// literal
    SingletonTypeDescriptor,
    /// `distinct` type
    DistinctTypeDescriptor,

    /// identifier
    SimpleNameReference,
    /// module `:` identifier
    QualifiedNameReference,
    /// literal token
    BasicLiteral,
    /// `(` `)`
    NilLiteral,
    /// operator expression
    UnaryExpression,
    /// lhs operator rhs
    BinaryExpression,
    /// Operator reassembled from adjacent single-character tokens.
    CompositeOperator,
    /// `(` expression `)`
    BracedExpression,
    /// `typeof` expression
    TypeofExpression,
    /// `trap` expression
    TrapExpression,
    /// (`check` | `checkpanic`) expression
    CheckExpression,
    /// (`check` | `checkpanic`) action
    CheckAction,
    /// `<` annotations type? `>` expression
    TypeCastExpression,
    /// expression (`is` | `!is`) type
    TypeTestExpression,
    /// condition `?` middle `:` end
    ConditionalExpression,
    /// expression `.` name
    FieldAccess,
    /// expression `?.` name
    OptionalFieldAccess,
    /// expression `[` keys `]`
    IndexedExpression,
    /// reference `(` args `)`
    FunctionCall,
    /// expression `.` name `(` args `)`
    MethodCall,
    /// expression
    PositionalArgument,
    /// name `=` expression
    NamedArgument,
    /// `...` expression
    RestArgument,
    /// `[` members `]`
    ListConstructor,
    /// `...` expression
    SpreadMember,
    /// `{` fields `}`
    MappingConstructor,
    /// `readonly`? key (`:` expression)?
    SpecificField,
    /// `[` expression `]` `:` expression
    ComputedNameField,
    /// `...` expression
    SpreadField,
    /// `error` type-ref? `(` args `)`
    ErrorConstructor,
    /// qualifiers `function` signature body
    ExplicitAnonymousFunction,
    /// params `=>` expression
    ImplicitAnonymousFunction,
    /// `(` names `)`
    InferParamList,
    /// `new` args?
    ImplicitNewExpression,
    /// `new` type args
    ExplicitNewExpression,
    /// `(` args `)`
    ParenthesizedArgList,
    /// `let` declarations `in` expression
    LetExpression,
    /// annotations typed-binding-pattern `=` expression
    LetVariableDeclaration,
    /// `?` standing for a required configurable value
    RequiredExpression,
    /// expression `|` expression ...
    AlternateWaitExpression,

    /// pipeline select
    QueryExpression,
    /// from-clause intermediate-clauses
    QueryPipeline,
    /// `from` typed-binding-pattern `in` expression
    FromClause,
    /// `where` expression
    WhereClause,
    /// `let` declarations
    LetClause,
    /// `outer`? `join` typed-binding-pattern `in` expression on-clause
    JoinClause,
    /// `on` expression `equals` expression
    OnClause,
    /// `order` `by` keys
    OrderByClause,
    /// expression direction?
    OrderKey,
    /// `limit` expression
    LimitClause,
    /// `select` expression
    SelectClause,
    /// pipeline `do` block
    QueryAction,

    /// expression `->` name `(` args `)`
    RemoteMethodCallAction,
    /// expression `->` peer
    AsyncSendAction,
    /// expression `->>` peer
    SyncSendAction,
    /// `<-` peer
    ReceiveAction,
    /// annotations `start` expression
    StartAction,
    /// `wait` (expression | fields)
    WaitAction,
    /// `{` fields `}`
    WaitFieldsList,
    /// name (`:` expression)?
    WaitField,
    /// `flush` peer?
    FlushAction,
    /// `commit`
    CommitAction,
}

keywords! {
    PublicKeyword => "public",
    PrivateKeyword => "private",
    RemoteKeyword => "remote",
    ResourceKeyword => "resource",
    FunctionKeyword => "function",
    ReturnsKeyword => "returns",
    ReturnKeyword => "return",
    ExternalKeyword => "external",
    TypeKeyword => "type",
    RecordKeyword => "record",
    ObjectKeyword => "object",
    ReadonlyKeyword => "readonly",
    DistinctKeyword => "distinct",
    IsolatedKeyword => "isolated",
    ClientKeyword => "client",
    ServiceKeyword => "service",
    ListenerKeyword => "listener",
    OnKeyword => "on",
    ImportKeyword => "import",
    AsKeyword => "as",
    ConstKeyword => "const",
    FinalKeyword => "final",
    ConfigurableKeyword => "configurable",
    VarKeyword => "var",
    IfKeyword => "if",
    ElseKeyword => "else",
    WhileKeyword => "while",
    ForeachKeyword => "foreach",
    InKeyword => "in",
    MatchKeyword => "match",
    DoKeyword => "do",
    FailKeyword => "fail",
    BreakKeyword => "break",
    ContinueKeyword => "continue",
    PanicKeyword => "panic",
    CheckKeyword => "check",
    CheckpanicKeyword => "checkpanic",
    TrapKeyword => "trap",
    NewKeyword => "new",
    TrueKeyword => "true",
    FalseKeyword => "false",
    NullKeyword => "null",
    IsKeyword => "is",
    TypeofKeyword => "typeof",
    LetKeyword => "let",
    FromKeyword => "from",
    WhereKeyword => "where",
    SelectKeyword => "select",
    LimitKeyword => "limit",
    OrderKeyword => "order",
    ByKeyword => "by",
    AscendingKeyword => "ascending",
    DescendingKeyword => "descending",
    JoinKeyword => "join",
    EqualsKeyword => "equals",
    OuterKeyword => "outer",
    WorkerKeyword => "worker",
    ForkKeyword => "fork",
    StartKeyword => "start",
    WaitKeyword => "wait",
    FlushKeyword => "flush",
    CommitKeyword => "commit",
    RollbackKeyword => "rollback",
    RetryKeyword => "retry",
    TransactionKeyword => "transaction",
    TransactionalKeyword => "transactional",
    LockKeyword => "lock",
    ClassKeyword => "class",
    EnumKeyword => "enum",
    AnnotationKeyword => "annotation",
    SourceKeyword => "source",
    ErrorKeyword => "error",
    NeverKeyword => "never",
    IntKeyword => "int",
    FloatKeyword => "float",
    DecimalKeyword => "decimal",
    StringKeyword => "string",
    BooleanKeyword => "boolean",
    ByteKeyword => "byte",
    JsonKeyword => "json",
    XmlKeyword => "xml",
    AnydataKeyword => "anydata",
    AnyKeyword => "any",
    HandleKeyword => "handle",
    MapKeyword => "map",
    FutureKeyword => "future",
    TypedescKeyword => "typedesc",
    StreamKeyword => "stream",
}

fn keyword_map() -> &'static FxHashMap<&'static str, SyntaxKind> {
    static MAP: OnceLock<FxHashMap<&'static str, SyntaxKind>> = OnceLock::new();
    MAP.get_or_init(|| KEYWORDS.iter().copied().collect())
}

impl SyntaxKind {
    /// Looks up the keyword spelled by `text`.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        keyword_map().get(text).copied()
    }

    /// Returns true for token kinds, false for composite node kinds.
    pub fn is_token(self) -> bool {
        (self as u16) < (SyntaxKind::ModulePart as u16)
    }

    /// Returns true if this kind is a keyword.
    pub fn is_keyword(self) -> bool {
        (self as u16) <= (SyntaxKind::StreamKeyword as u16)
    }

    /// Keywords that are only reserved inside query pipelines and may
    /// otherwise be used as identifiers.
    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::AscendingKeyword
                | SyntaxKind::DescendingKeyword
                | SyntaxKind::EqualsKeyword
                | SyntaxKind::OuterKeyword
                | SyntaxKind::JoinKeyword
                | SyntaxKind::OrderKeyword
                | SyntaxKind::ByKeyword
                | SyntaxKind::LimitKeyword
                | SyntaxKind::SourceKeyword
        )
    }

    /// Returns true for literal tokens usable as a basic literal expression.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::DecimalIntegerLiteral
                | SyntaxKind::HexIntegerLiteral
                | SyntaxKind::DecimalFloatingPointLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NullKeyword
        )
    }

    /// Returns true for numeric literal tokens.
    pub fn is_numeric_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::DecimalIntegerLiteral
                | SyntaxKind::HexIntegerLiteral
                | SyntaxKind::DecimalFloatingPointLiteral
        )
    }

    /// Keywords that name a built-in type without parameters.
    pub fn is_simple_type_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntKeyword
                | SyntaxKind::FloatKeyword
                | SyntaxKind::DecimalKeyword
                | SyntaxKind::StringKeyword
                | SyntaxKind::BooleanKeyword
                | SyntaxKind::ByteKeyword
                | SyntaxKind::JsonKeyword
                | SyntaxKind::XmlKeyword
                | SyntaxKind::AnydataKeyword
                | SyntaxKind::AnyKeyword
                | SyntaxKind::HandleKeyword
                | SyntaxKind::NeverKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::VarKeyword
        )
    }

    /// Keywords that take an optional `<type>` parameter.
    pub fn is_parameterized_type_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::MapKeyword
                | SyntaxKind::FutureKeyword
                | SyntaxKind::TypedescKeyword
                | SyntaxKind::ErrorKeyword
        )
    }

    /// Keywords that can begin a type descriptor.
    pub fn is_type_keyword(self) -> bool {
        self.is_simple_type_keyword()
            || self.is_parameterized_type_keyword()
            || matches!(
                self,
                SyntaxKind::RecordKeyword
                    | SyntaxKind::ObjectKeyword
                    | SyntaxKind::StreamKeyword
                    | SyntaxKind::DistinctKeyword
                    | SyntaxKind::FunctionKeyword
            )
    }

    /// Operators that form a compound assignment when directly followed by `=`.
    pub fn is_compound_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::Plus
                | SyntaxKind::Minus
                | SyntaxKind::Asterisk
                | SyntaxKind::Slash
                | SyntaxKind::BitwiseAnd
                | SyntaxKind::Pipe
                | SyntaxKind::Caret
                | SyntaxKind::DoubleLt
                | SyntaxKind::Gt
        )
    }

    /// Composite kinds that can occupy a type descriptor slot.
    pub fn is_type_descriptor(self) -> bool {
        matches!(
            self,
            SyntaxKind::BuiltinSimpleTypeDescriptor
                | SyntaxKind::NilTypeDescriptor
                | SyntaxKind::ParameterizedTypeDescriptor
                | SyntaxKind::StreamTypeDescriptor
                | SyntaxKind::ArrayTypeDescriptor
                | SyntaxKind::OptionalTypeDescriptor
                | SyntaxKind::UnionTypeDescriptor
                | SyntaxKind::IntersectionTypeDescriptor
                | SyntaxKind::TupleTypeDescriptor
                | SyntaxKind::RestTypeDescriptor
                | SyntaxKind::RecordTypeDescriptor
                | SyntaxKind::ObjectTypeDescriptor
                | SyntaxKind::FunctionTypeDescriptor
                | SyntaxKind::ParenthesisedTypeDescriptor
                | SyntaxKind::SingletonTypeDescriptor
                | SyntaxKind::DistinctTypeDescriptor
                | SyntaxKind::SimpleNameReference
                | SyntaxKind::QualifiedNameReference
        )
    }

    /// Composite kinds that can occupy a binding pattern slot.
    pub fn is_binding_pattern(self) -> bool {
        matches!(
            self,
            SyntaxKind::CaptureBindingPattern
                | SyntaxKind::WildcardBindingPattern
                | SyntaxKind::ListBindingPattern
                | SyntaxKind::RestBindingPattern
                | SyntaxKind::MappingBindingPattern
                | SyntaxKind::FieldBindingPattern
                | SyntaxKind::ErrorBindingPattern
                | SyntaxKind::NamedArgBindingPattern
                | SyntaxKind::TypedBindingPattern
        )
    }

    /// Composite kinds produced for actions rather than expressions.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            SyntaxKind::RemoteMethodCallAction
                | SyntaxKind::AsyncSendAction
                | SyntaxKind::SyncSendAction
                | SyntaxKind::ReceiveAction
                | SyntaxKind::StartAction
                | SyntaxKind::WaitAction
                | SyntaxKind::FlushAction
                | SyntaxKind::CommitAction
                | SyntaxKind::QueryAction
                | SyntaxKind::CheckAction
        )
    }

    /// Returns true for closing delimiters.
    pub fn is_closing_delimiter(self) -> bool {
        matches!(
            self,
            SyntaxKind::CloseBrace
                | SyntaxKind::ClosePipeBrace
                | SyntaxKind::CloseParen
                | SyntaxKind::CloseBracket
        )
    }

    /// Returns the fixed source text of this kind, if it has one.
    ///
    /// Identifiers, literals, and composite kinds have no fixed text.
    pub fn text(self) -> Option<&'static str> {
        if let Some(text) = self.keyword_text() {
            return Some(text);
        }
        let text = match self {
            SyntaxKind::OpenBrace => "{",
            SyntaxKind::CloseBrace => "}",
            SyntaxKind::OpenBracePipe => "{|",
            SyntaxKind::ClosePipeBrace => "|}",
            SyntaxKind::OpenParen => "(",
            SyntaxKind::CloseParen => ")",
            SyntaxKind::OpenBracket => "[",
            SyntaxKind::CloseBracket => "]",
            SyntaxKind::Semicolon => ";",
            SyntaxKind::Comma => ",",
            SyntaxKind::Colon => ":",
            SyntaxKind::Dot => ".",
            SyntaxKind::Ellipsis => "...",
            SyntaxKind::DoubleDotLt => "..<",
            SyntaxKind::QuestionMark => "?",
            SyntaxKind::OptionalChaining => "?.",
            SyntaxKind::Elvis => "?:",
            SyntaxKind::At => "@",
            SyntaxKind::Equal => "=",
            SyntaxKind::DoubleEqual => "==",
            SyntaxKind::TripleEqual => "===",
            SyntaxKind::NotEqual => "!=",
            SyntaxKind::NotDoubleEqual => "!==",
            SyntaxKind::NotIs => "!is",
            SyntaxKind::Lt => "<",
            SyntaxKind::Gt => ">",
            SyntaxKind::LtEqual => "<=",
            SyntaxKind::GtEqual => ">=",
            SyntaxKind::DoubleLt => "<<",
            SyntaxKind::Plus => "+",
            SyntaxKind::Minus => "-",
            SyntaxKind::Asterisk => "*",
            SyntaxKind::Slash => "/",
            SyntaxKind::Percent => "%",
            SyntaxKind::Exclamation => "!",
            SyntaxKind::Tilde => "~",
            SyntaxKind::BitwiseAnd => "&",
            SyntaxKind::Pipe => "|",
            SyntaxKind::Caret => "^",
            SyntaxKind::LogicalAnd => "&&",
            SyntaxKind::LogicalOr => "||",
            SyntaxKind::RightArrow => "->",
            SyntaxKind::SyncSendArrow => "->>",
            SyntaxKind::LeftArrow => "<-",
            SyntaxKind::RightDoubleArrow => "=>",
            SyntaxKind::Underscore => "_",
            _ => return None,
        };
        Some(text)
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(self) -> String {
        match self.text() {
            Some(text) => format!("'{text}'"),
            None => match self {
                SyntaxKind::Identifier => "identifier".to_string(),
                SyntaxKind::StringLiteral => "string literal".to_string(),
                SyntaxKind::DecimalIntegerLiteral | SyntaxKind::HexIntegerLiteral => {
                    "integer literal".to_string()
                }
                SyntaxKind::DecimalFloatingPointLiteral => "floating point literal".to_string(),
                SyntaxKind::Eof => "end of input".to_string(),
                other => format!("{other:?}"),
            },
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_and_node_partition() {
        assert!(SyntaxKind::Identifier.is_token());
        assert!(SyntaxKind::Eof.is_token());
        assert!(!SyntaxKind::ModulePart.is_token());
        assert!(!SyntaxKind::CommitAction.is_token());
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(SyntaxKind::from_keyword("worker"), Some(SyntaxKind::WorkerKeyword));
        assert_eq!(SyntaxKind::from_keyword("checkpanic"), Some(SyntaxKind::CheckpanicKeyword));
        assert_eq!(SyntaxKind::from_keyword("workers"), None);
    }

    #[test]
    fn test_every_keyword_round_trips() {
        for (text, kind) in KEYWORDS {
            assert!(kind.is_keyword(), "{kind:?}");
            assert_eq!(kind.text(), Some(*text));
            assert_eq!(SyntaxKind::from_keyword(text), Some(*kind));
        }
    }

    #[test]
    fn test_punctuation_text() {
        assert_eq!(SyntaxKind::SyncSendArrow.text(), Some("->>"));
        assert_eq!(SyntaxKind::ClosePipeBrace.text(), Some("|}"));
        assert_eq!(SyntaxKind::Identifier.text(), None);
        assert!(!SyntaxKind::OpenBrace.is_keyword());
    }
}
