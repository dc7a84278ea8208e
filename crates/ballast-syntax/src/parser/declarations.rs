// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Imports, module-level declarations, and the members of classes, object
//! types and services.
//!
//! Qualifiers are collected up front, before the declaration keyword is
//! known, and validated once the declaration kind has been decided.

use super::context::ParserContext;
use super::expressions::ExpressionFlags;
use super::parser::Parser;
use super::precedence::OperatorPrecedence;
use super::recovery::{ListItem, RecoveryRequest, Solution};
use super::statements::{reject_annotations, reject_qualifiers};
use super::types::is_type_start;
use super::validation::{validate_parameters, validate_qualifiers};
use crate::lexer::{LexerMode, TokenSource};
use crate::syntax::{DiagnosticCode, SyntaxKind, SyntaxNode, factory};

const FUNCTION_QUALIFIERS: &[SyntaxKind] = &[
    SyntaxKind::PublicKeyword,
    SyntaxKind::IsolatedKeyword,
    SyntaxKind::TransactionalKeyword,
];

const VARIABLE_QUALIFIERS: &[SyntaxKind] = &[
    SyntaxKind::PublicKeyword,
    SyntaxKind::FinalKeyword,
    SyntaxKind::ConfigurableKeyword,
    SyntaxKind::IsolatedKeyword,
];

const PUBLIC_ONLY: &[SyntaxKind] = &[SyntaxKind::PublicKeyword];

const CLASS_QUALIFIERS: &[SyntaxKind] = &[
    SyntaxKind::PublicKeyword,
    SyntaxKind::IsolatedKeyword,
    SyntaxKind::ReadonlyKeyword,
    SyntaxKind::DistinctKeyword,
    SyntaxKind::ClientKeyword,
    SyntaxKind::ServiceKeyword,
];

const SERVICE_QUALIFIERS: &[SyntaxKind] = &[SyntaxKind::IsolatedKeyword];

const FIELD_QUALIFIERS: &[SyntaxKind] = &[
    SyntaxKind::PublicKeyword,
    SyntaxKind::PrivateKeyword,
    SyntaxKind::FinalKeyword,
    SyntaxKind::ReadonlyKeyword,
];

const METHOD_QUALIFIERS: &[SyntaxKind] = &[
    SyntaxKind::PublicKeyword,
    SyntaxKind::PrivateKeyword,
    SyntaxKind::RemoteKeyword,
    SyntaxKind::ResourceKeyword,
    SyntaxKind::IsolatedKeyword,
    SyntaxKind::TransactionalKeyword,
];

/// Returns true if `kind` can begin a module member.
pub fn is_module_member_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::At
            | SyntaxKind::ImportKeyword
            | SyntaxKind::PublicKeyword
            | SyntaxKind::TransactionalKeyword
            | SyntaxKind::FinalKeyword
            | SyntaxKind::ConfigurableKeyword
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::TypeKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::EnumKeyword
            | SyntaxKind::AnnotationKeyword
            | SyntaxKind::ListenerKeyword
            | SyntaxKind::ServiceKeyword
            | SyntaxKind::DistinctKeyword
    ) || is_type_start(kind)
}

/// Returns true if `kind` can begin a class or object type member.
pub fn is_class_member_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::At
            | SyntaxKind::Asterisk
            | SyntaxKind::PublicKeyword
            | SyntaxKind::PrivateKeyword
            | SyntaxKind::RemoteKeyword
            | SyntaxKind::ResourceKeyword
            | SyntaxKind::TransactionalKeyword
            | SyntaxKind::FinalKeyword
            | SyntaxKind::FunctionKeyword
    ) || is_type_start(kind)
}

/// Returns true if `kind` can begin a record type field.
pub fn is_record_field_start(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::At | SyntaxKind::Asterisk) || is_type_start(kind)
}

fn is_class_qualifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ReadonlyKeyword
            | SyntaxKind::DistinctKeyword
            | SyntaxKind::ClientKeyword
            | SyntaxKind::ServiceKeyword
            | SyntaxKind::IsolatedKeyword
    )
}

fn qualifier_list(qualifiers: Vec<SyntaxNode>, allowed: &[SyntaxKind]) -> Vec<SyntaxNode> {
    validate_qualifiers(qualifiers, allowed).children().cloned().collect()
}

impl<S: TokenSource> Parser<S> {
    /// `@a @m:b {..}` ahead of a declaration, or `None`.
    ///
    /// Documentation comments are trivia and need no handling here.
    pub(crate) fn parse_metadata(&mut self) -> Option<SyntaxNode> {
        if self.peek_kind() != SyntaxKind::At {
            return None;
        }
        self.in_context(ParserContext::Annotations, |p| {
            let mut annotations = Vec::new();
            while p.peek_kind() == SyntaxKind::At {
                let at = p.consume_node();
                let reference = p.parse_type_reference();
                let value = (p.peek_kind() == SyntaxKind::OpenBrace).then(|| p.parse_mapping_constructor());
                annotations.push(factory::node(SyntaxKind::Annotation, vec![Some(at), Some(reference), value]));
            }
            Some(factory::node(SyntaxKind::Metadata, vec![Some(factory::list(annotations))]))
        })
    }

    /// `import org/a.b as p;`
    ///
    /// The module path is scanned in import mode so reserved words such as
    /// `int` in `lang.int` are plain names.
    pub(crate) fn parse_import_declaration(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ImportDeclaration, |p| {
            let keyword = p.expect(SyntaxKind::ImportKeyword, ParserContext::ImportDeclaration);
            p.tokens.start_mode(LexerMode::ImportPath);
            let org = (p.peek_kind() == SyntaxKind::Identifier && p.peek_kind_at(2) == SyntaxKind::Slash).then(|| {
                let name = p.consume_node();
                let slash = p.consume_node();
                factory::node(SyntaxKind::ImportOrgName, vec![Some(name), Some(slash)])
            });
            let mut names = vec![p.expect(SyntaxKind::Identifier, ParserContext::ImportModuleName)];
            while p.peek_kind() == SyntaxKind::Dot {
                names.push(p.consume_node());
                names.push(p.expect(SyntaxKind::Identifier, ParserContext::ImportModuleName));
            }
            let prefix = (p.peek_kind() == SyntaxKind::AsKeyword).then(|| {
                let keyword = p.consume_node();
                let name = p.expect(SyntaxKind::Identifier, ParserContext::ImportPrefix);
                factory::node(SyntaxKind::ImportPrefix, vec![Some(keyword), Some(name)])
            });
            p.tokens.end_mode();
            let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ImportDeclaration);
            factory::node(
                SyntaxKind::ImportDeclaration,
                vec![Some(keyword), org, Some(factory::list(names)), prefix, Some(semicolon)],
            )
        })
    }

    /// A module-level declaration. An import reaching this rule follows a
    /// declaration and is flagged.
    pub(crate) fn parse_module_member(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ModuleMember, |p| {
            let metadata = p.parse_metadata();
            let qualifiers = p.parse_module_qualifiers();
            let kind = p.peek_kind();
            p.parse_module_member_with(kind, metadata, qualifiers)
        })
    }

    fn parse_module_qualifiers(&mut self) -> Vec<SyntaxNode> {
        let mut qualifiers = Vec::new();
        loop {
            let is_qualifier = match self.peek_kind() {
                SyntaxKind::PublicKeyword
                | SyntaxKind::IsolatedKeyword
                | SyntaxKind::TransactionalKeyword
                | SyntaxKind::FinalKeyword
                | SyntaxKind::ConfigurableKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::RemoteKeyword
                | SyntaxKind::ResourceKeyword => true,
                SyntaxKind::ReadonlyKeyword
                | SyntaxKind::DistinctKeyword
                | SyntaxKind::ClientKeyword
                | SyntaxKind::ServiceKeyword => self.is_class_qualifier_run_ahead(),
                _ => false,
            };
            if !is_qualifier {
                return qualifiers;
            }
            qualifiers.push(self.consume_node());
        }
    }

    /// `readonly client ... class`: class qualifiers running into `class`.
    fn is_class_qualifier_run_ahead(&mut self) -> bool {
        let mut k = 1;
        while is_class_qualifier(self.peek_kind_at(k)) {
            k += 1;
        }
        self.peek_kind_at(k) == SyntaxKind::ClassKeyword
    }

    pub(crate) fn parse_module_member_with(
        &mut self,
        mut kind: SyntaxKind,
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
    ) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::FunctionKeyword if self.peek_kind_at(2) == SyntaxKind::Identifier => {
                    self.parse_function_definition(metadata, qualifiers)
                }
                SyntaxKind::ImportKeyword => {
                    let import = self.parse_import_declaration();
                    let import = factory::with_diagnostic(import, DiagnosticCode::ImportAfterDeclaration);
                    reject_annotations(reject_qualifiers(import, qualifiers), metadata)
                }
                SyntaxKind::ConstKeyword => self.parse_constant_declaration(metadata, qualifiers),
                SyntaxKind::TypeKeyword => self.parse_type_definition(metadata, qualifiers),
                SyntaxKind::ClassKeyword => self.parse_class_definition(metadata, qualifiers),
                SyntaxKind::EnumKeyword => self.parse_enum_declaration(metadata, qualifiers),
                SyntaxKind::AnnotationKeyword => self.parse_annotation_declaration(metadata, qualifiers),
                SyntaxKind::ListenerKeyword => self.parse_listener_declaration(metadata, qualifiers),
                SyntaxKind::ServiceKeyword => self.parse_service_declaration(metadata, qualifiers),
                k if is_type_start(k) => self.in_context(ParserContext::ModuleVariableDeclaration, |p| {
                    let qualifiers = qualifier_list(qualifiers, VARIABLE_QUALIFIERS);
                    let binding = p.parse_typed_binding_pattern();
                    let next = p.peek_kind();
                    p.parse_var_decl_rhs_with(next, metadata, qualifiers, binding, true)
                }),
                _ => match self.recover(RecoveryRequest::ModuleMember {
                    metadata: metadata.clone(),
                    qualifiers: qualifiers.clone(),
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { kind: inserted, .. } | Solution::Keep(inserted) => {
                        kind = inserted;
                        continue;
                    }
                },
            };
        }
    }

    /// `function name(params) returns T body`.
    fn parse_function_definition(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::FunctionDefinition, |p| {
            let qualifiers = validate_qualifiers(qualifiers, FUNCTION_QUALIFIERS);
            let keyword = p.consume_node();
            let name = p.expect(SyntaxKind::Identifier, ParserContext::FunctionDefinition);
            let signature = p.parse_function_signature();
            let body = p.parse_function_body();
            factory::node(
                SyntaxKind::FunctionDefinition,
                vec![metadata, Some(qualifiers), Some(keyword), Some(name), Some(signature), Some(body)],
            )
        })
    }

    /// `(params) returns T`.
    pub(crate) fn parse_function_signature(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::FunctionSignature, |p| {
            let open = p.expect(SyntaxKind::OpenParen, ParserContext::FunctionSignature);
            let (parameters, close) = p.parse_delimited_list(
                ParserContext::ParameterList,
                SyntaxKind::CloseParen,
                ListItem::Parameter,
                Self::parse_parameter,
            );
            let parameters = validate_parameters(parameters);
            let return_type = (p.peek_kind() == SyntaxKind::ReturnsKeyword).then(|| p.parse_return_type_descriptor());
            factory::node(
                SyntaxKind::FunctionSignature,
                vec![Some(open), Some(parameters), Some(close), return_type],
            )
        })
    }

    /// `returns @a T`.
    pub(crate) fn parse_return_type_descriptor(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ReturnTypeDescriptor, |p| {
            let keyword = p.expect(SyntaxKind::ReturnsKeyword, ParserContext::ReturnTypeDescriptor);
            let annotations = p.parse_metadata();
            let ty = p.parse_type_descriptor(ParserContext::ReturnTypeDescriptor);
            factory::node(SyntaxKind::ReturnTypeDescriptor, vec![Some(keyword), annotations, Some(ty)])
        })
    }

    fn parse_parameter(&mut self) -> SyntaxNode {
        let annotations = self.parse_metadata();
        let kind = self.peek_kind();
        self.parse_parameter_with(kind, annotations)
    }

    /// Required `T x`, defaultable `T x = e` or rest `T... x`. Parameters of
    /// function types may omit the name.
    pub(crate) fn parse_parameter_with(&mut self, mut kind: SyntaxKind, annotations: Option<SyntaxNode>) -> SyntaxNode {
        loop {
            return match kind {
                k if is_type_start(k) => self.in_context(ParserContext::Parameter, |p| {
                    let ty = p.parse_type_descriptor(ParserContext::Parameter);
                    if p.peek_kind() == SyntaxKind::Ellipsis {
                        let ellipsis = p.consume_node();
                        let name = p.optional(SyntaxKind::Identifier);
                        return factory::node(
                            SyntaxKind::RestParameter,
                            vec![annotations, Some(ty), Some(ellipsis), name],
                        );
                    }
                    let name = p.optional(SyntaxKind::Identifier);
                    if name.is_some() && p.peek_kind() == SyntaxKind::Equal {
                        p.switch_context(ParserContext::DefaultableParameter);
                        let equal = p.consume_node();
                        let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                        return factory::node(
                            SyntaxKind::DefaultableParameter,
                            vec![annotations, Some(ty), name, Some(equal), Some(value)],
                        );
                    }
                    factory::node(SyntaxKind::RequiredParameter, vec![annotations, Some(ty), name])
                }),
                _ => match self.recover(RecoveryRequest::Parameter {
                    annotations: annotations.clone(),
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { kind: inserted, .. } | Solution::Keep(inserted) => {
                        kind = inserted;
                        continue;
                    }
                },
            };
        }
    }

    pub(crate) fn parse_function_body(&mut self) -> SyntaxNode {
        let kind = self.peek_kind();
        self.parse_function_body_with(kind)
    }

    /// `{ .. }`, `=> e;` or `= external;`.
    pub(crate) fn parse_function_body_with(&mut self, mut kind: SyntaxKind) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::OpenBrace => self.parse_function_body_block(),
                SyntaxKind::RightDoubleArrow => self.in_context(ParserContext::ExpressionFunctionBody, |p| {
                    let arrow = p.consume_node();
                    let expression = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                    let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ExpressionFunctionBody);
                    factory::node(
                        SyntaxKind::ExpressionFunctionBody,
                        vec![Some(arrow), Some(expression), Some(semicolon)],
                    )
                }),
                SyntaxKind::Equal => self.in_context(ParserContext::ExternalFunctionBody, |p| {
                    let equal = p.consume_node();
                    let annotations = p.parse_metadata();
                    let external = p.expect(SyntaxKind::ExternalKeyword, ParserContext::ExternalFunctionBody);
                    let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ExternalFunctionBody);
                    factory::node(
                        SyntaxKind::ExternalFunctionBody,
                        vec![Some(equal), annotations, Some(external), Some(semicolon)],
                    )
                }),
                _ => match self.recover(RecoveryRequest::FunctionBody) {
                    Solution::Remove(node) => node,
                    Solution::Insert { missing, .. } => self.finish_function_body_block(missing),
                    Solution::Keep(kept) => {
                        kind = kept;
                        continue;
                    }
                },
            };
        }
    }

    /// Statements and `}` after an inserted `{`.
    fn finish_function_body_block(&mut self, open: SyntaxNode) -> SyntaxNode {
        self.in_context(ParserContext::FunctionBodyBlock, |p| {
            let statements = p.parse_statements();
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::FunctionBodyBlock);
            factory::node(SyntaxKind::FunctionBodyBlock, vec![Some(open), Some(statements), Some(close)])
        })
    }

    /// `const T NAME = e;` with the type optional.
    fn parse_constant_declaration(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::ConstantDeclaration, |p| {
            let qualifiers = validate_qualifiers(qualifiers, PUBLIC_ONLY);
            let keyword = p.consume_node();
            let untyped = p.peek_kind() == SyntaxKind::Identifier && p.peek_kind_at(2) == SyntaxKind::Equal;
            let ty = (!untyped && is_type_start(p.peek_kind()))
                .then(|| p.parse_type_descriptor(ParserContext::ConstantDeclaration));
            let name = p.expect(SyntaxKind::Identifier, ParserContext::ConstantDeclaration);
            let equal = p.expect(SyntaxKind::Equal, ParserContext::ConstantDeclaration);
            let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
            let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ConstantDeclaration);
            factory::node(
                SyntaxKind::ConstantDeclaration,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    ty,
                    Some(name),
                    Some(equal),
                    Some(value),
                    Some(semicolon),
                ],
            )
        })
    }

    /// `type Name T;`
    fn parse_type_definition(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::TypeDefinition, |p| {
            let qualifiers = validate_qualifiers(qualifiers, PUBLIC_ONLY);
            let keyword = p.consume_node();
            let name = p.expect(SyntaxKind::Identifier, ParserContext::TypeDefinition);
            let ty = p.parse_type_descriptor(ParserContext::TypeDefinition);
            let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::TypeDefinition);
            factory::node(
                SyntaxKind::TypeDefinition,
                vec![metadata, Some(qualifiers), Some(keyword), Some(name), Some(ty), Some(semicolon)],
            )
        })
    }

    /// `class Name { members }`.
    fn parse_class_definition(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::ClassDefinition, |p| {
            let qualifiers = validate_qualifiers(qualifiers, CLASS_QUALIFIERS);
            let keyword = p.consume_node();
            let name = p.expect(SyntaxKind::Identifier, ParserContext::ClassDefinition);
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::ClassDefinition);
            let members = p.parse_node_list(|kind| kind == SyntaxKind::CloseBrace, |p| p.parse_class_member(false));
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::ClassDefinition);
            factory::node(
                SyntaxKind::ClassDefinition,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    Some(name),
                    Some(open),
                    Some(members),
                    Some(close),
                ],
            )
        })
    }

    /// A member of a class, service or object type. Object type methods
    /// end with `;` instead of a body.
    pub(crate) fn parse_class_member(&mut self, object_type: bool) -> SyntaxNode {
        let context = if object_type {
            ParserContext::ObjectMember
        } else {
            ParserContext::ClassMember
        };
        self.in_context(context, |p| {
            let metadata = p.parse_metadata();
            let mut qualifiers = Vec::new();
            loop {
                let is_qualifier = match p.peek_kind() {
                    SyntaxKind::PublicKeyword
                    | SyntaxKind::PrivateKeyword
                    | SyntaxKind::RemoteKeyword
                    | SyntaxKind::ResourceKeyword
                    | SyntaxKind::TransactionalKeyword
                    | SyntaxKind::FinalKeyword => true,
                    SyntaxKind::IsolatedKeyword => p.peek_kind_at(2) != SyntaxKind::ObjectKeyword,
                    SyntaxKind::ReadonlyKeyword => p.is_readonly_qualifier_ahead(),
                    _ => false,
                };
                if !is_qualifier {
                    break;
                }
                qualifiers.push(p.consume_node());
            }
            let kind = p.peek_kind();
            p.parse_class_member_with(kind, metadata, qualifiers, object_type)
        })
    }

    pub(crate) fn parse_class_member_with(
        &mut self,
        mut kind: SyntaxKind,
        metadata: Option<SyntaxNode>,
        qualifiers: Vec<SyntaxNode>,
        object_type: bool,
    ) -> SyntaxNode {
        loop {
            return match kind {
                SyntaxKind::Asterisk => {
                    let inclusion = self.parse_type_inclusion(ParserContext::ClassMember);
                    reject_annotations(reject_qualifiers(inclusion, qualifiers), metadata)
                }
                SyntaxKind::FunctionKeyword => self.parse_method(metadata, qualifiers, object_type),
                k if is_type_start(k) => self.in_context(ParserContext::ObjectField, |p| {
                    let qualifiers = validate_qualifiers(qualifiers, FIELD_QUALIFIERS);
                    let ty = p.parse_type_descriptor(ParserContext::ObjectField);
                    let name = p.expect(SyntaxKind::Identifier, ParserContext::ObjectField);
                    let (equal, value) = if p.peek_kind() == SyntaxKind::Equal {
                        let equal = p.consume_node();
                        let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                        (Some(equal), Some(value))
                    } else {
                        (None, None)
                    };
                    let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ObjectField);
                    factory::node(
                        SyntaxKind::ObjectField,
                        vec![metadata, Some(qualifiers), Some(ty), Some(name), equal, value, Some(semicolon)],
                    )
                }),
                _ => match self.recover(RecoveryRequest::ClassMember {
                    metadata: metadata.clone(),
                    qualifiers: qualifiers.clone(),
                    object_type,
                }) {
                    Solution::Remove(node) => node,
                    Solution::Insert { kind: inserted, .. } | Solution::Keep(inserted) => {
                        kind = inserted;
                        continue;
                    }
                },
            };
        }
    }

    /// A method. `resource` methods name an accessor and a path instead of
    /// a plain name.
    fn parse_method(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>, object_type: bool) -> SyntaxNode {
        self.in_context(ParserContext::FunctionDefinition, |p| {
            let is_resource = qualifiers.iter().any(|q| q.kind() == SyntaxKind::ResourceKeyword);
            let qualifiers = validate_qualifiers(qualifiers, METHOD_QUALIFIERS);
            let keyword = p.consume_node();
            let name = if is_resource {
                p.parse_resource_path()
            } else {
                p.expect(SyntaxKind::Identifier, ParserContext::FunctionDefinition)
            };
            let signature = p.parse_function_signature();
            if object_type {
                let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ObjectMember);
                return factory::node(
                    SyntaxKind::MethodDeclaration,
                    vec![metadata, Some(qualifiers), Some(keyword), Some(name), Some(signature), Some(semicolon)],
                );
            }
            let body = p.parse_function_body();
            factory::node(
                SyntaxKind::FunctionDefinition,
                vec![metadata, Some(qualifiers), Some(keyword), Some(name), Some(signature), Some(body)],
            )
        })
    }

    /// `get users/[string id]/orders`, `post .` or `get [string... rest]`.
    fn parse_resource_path(&mut self) -> SyntaxNode {
        self.in_context(ParserContext::ResourcePath, |p| {
            let accessor = p.expect(SyntaxKind::Identifier, ParserContext::ResourcePath);
            let mut segments = Vec::new();
            if p.peek_kind() == SyntaxKind::Dot {
                segments.push(p.consume_node());
            } else if p.peek_kind() != SyntaxKind::OpenParen {
                loop {
                    let segment = if p.peek_kind() == SyntaxKind::OpenBracket {
                        p.parse_resource_path_parameter()
                    } else {
                        p.expect(SyntaxKind::Identifier, ParserContext::ResourcePath)
                    };
                    segments.push(segment);
                    if p.peek_kind() != SyntaxKind::Slash {
                        break;
                    }
                    segments.push(p.consume_node());
                }
            }
            factory::node(SyntaxKind::ResourcePath, vec![Some(accessor), Some(factory::list(segments))])
        })
    }

    fn parse_resource_path_parameter(&mut self) -> SyntaxNode {
        let open = self.consume_node();
        let ty = self.parse_type_descriptor(ParserContext::ResourcePath);
        let ty = self.parse_rest_type_suffix(ty);
        let name = self.optional(SyntaxKind::Identifier);
        let close = self.expect(SyntaxKind::CloseBracket, ParserContext::ResourcePath);
        factory::node(SyntaxKind::ResourcePathParameter, vec![Some(open), Some(ty), name, Some(close)])
    }

    /// `enum Name { A, B = "b" }`.
    fn parse_enum_declaration(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::EnumDeclaration, |p| {
            let qualifiers = validate_qualifiers(qualifiers, PUBLIC_ONLY);
            let keyword = p.consume_node();
            let name = p.expect(SyntaxKind::Identifier, ParserContext::EnumDeclaration);
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::EnumDeclaration);
            let (members, close) = p.parse_delimited_list(
                ParserContext::EnumDeclaration,
                SyntaxKind::CloseBrace,
                ListItem::Identifier,
                |p| {
                    p.in_context(ParserContext::EnumMember, |p| {
                        let metadata = p.parse_metadata();
                        let name = p.expect(SyntaxKind::Identifier, ParserContext::EnumMember);
                        if p.peek_kind() != SyntaxKind::Equal {
                            return factory::node(SyntaxKind::EnumMember, vec![metadata, Some(name), None, None]);
                        }
                        let equal = p.consume_node();
                        let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
                        factory::node(SyntaxKind::EnumMember, vec![metadata, Some(name), Some(equal), Some(value)])
                    })
                },
            );
            factory::node(
                SyntaxKind::EnumDeclaration,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    Some(name),
                    Some(open),
                    Some(members),
                    Some(close),
                ],
            )
        })
    }

    /// `annotation T name on function, source type;`
    fn parse_annotation_declaration(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::AnnotationDeclaration, |p| {
            let qualifiers = validate_qualifiers(qualifiers, PUBLIC_ONLY);
            let keyword = p.consume_node();
            let untyped = p.peek_kind() == SyntaxKind::Identifier
                && matches!(p.peek_kind_at(2), SyntaxKind::Semicolon | SyntaxKind::OnKeyword);
            let ty = (!untyped).then(|| p.parse_type_descriptor(ParserContext::AnnotationDeclaration));
            let name = p.expect(SyntaxKind::Identifier, ParserContext::AnnotationDeclaration);
            let (on, points) = if p.peek_kind() == SyntaxKind::OnKeyword {
                let on = p.consume_node();
                let points = p.in_context(ParserContext::AnnotationAttachPoints, |p| {
                    let mut points = vec![p.parse_attach_point()];
                    while p.peek_kind() == SyntaxKind::Comma {
                        points.push(p.consume_node());
                        points.push(p.parse_attach_point());
                    }
                    factory::list(points)
                });
                (Some(on), Some(points))
            } else {
                (None, None)
            };
            let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::AnnotationDeclaration);
            factory::node(
                SyntaxKind::AnnotationDeclaration,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    ty,
                    Some(name),
                    on,
                    points,
                    Some(semicolon),
                ],
            )
        })
    }

    /// `source`? then one or more words such as `object function`.
    fn parse_attach_point(&mut self) -> SyntaxNode {
        let source = self.optional(SyntaxKind::SourceKeyword);
        let mut words = Vec::new();
        while self.peek_kind() == SyntaxKind::Identifier || self.peek_kind().is_keyword() {
            words.push(self.consume_node());
        }
        if words.is_empty() {
            words.push(self.expect(SyntaxKind::Identifier, ParserContext::AnnotationAttachPoints));
        }
        factory::node(SyntaxKind::AnnotationAttachPoint, vec![source, Some(factory::list(words))])
    }

    /// `listener T name = e;` with the type optional.
    fn parse_listener_declaration(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::ListenerDeclaration, |p| {
            let qualifiers = validate_qualifiers(qualifiers, PUBLIC_ONLY);
            let keyword = p.consume_node();
            let untyped = p.peek_kind() == SyntaxKind::Identifier && p.peek_kind_at(2) == SyntaxKind::Equal;
            let ty = (!untyped).then(|| p.parse_type_descriptor(ParserContext::ListenerDeclaration));
            let name = p.expect(SyntaxKind::Identifier, ParserContext::ListenerDeclaration);
            let equal = p.expect(SyntaxKind::Equal, ParserContext::ListenerDeclaration);
            let value = p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs());
            let semicolon = p.expect(SyntaxKind::Semicolon, ParserContext::ListenerDeclaration);
            factory::node(
                SyntaxKind::ListenerDeclaration,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    ty,
                    Some(name),
                    Some(equal),
                    Some(value),
                    Some(semicolon),
                ],
            )
        })
    }

    /// `service T /path on ep1, ep2 { members }`.
    fn parse_service_declaration(&mut self, metadata: Option<SyntaxNode>, qualifiers: Vec<SyntaxNode>) -> SyntaxNode {
        self.in_context(ParserContext::ServiceDeclaration, |p| {
            let qualifiers = validate_qualifiers(qualifiers, SERVICE_QUALIFIERS);
            let keyword = p.consume_node();
            let ty = match p.peek_kind() {
                SyntaxKind::Slash | SyntaxKind::StringLiteral | SyntaxKind::OnKeyword => None,
                k if is_type_start(k) => Some(p.parse_type_descriptor(ParserContext::ServiceDeclaration)),
                _ => None,
            };
            let path = p.parse_service_path();
            let on = p.expect(SyntaxKind::OnKeyword, ParserContext::ServiceDeclaration);
            let mut listeners = vec![p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs())];
            while p.peek_kind() == SyntaxKind::Comma {
                listeners.push(p.consume_node());
                listeners.push(p.parse_expression(OperatorPrecedence::Default, ExpressionFlags::rhs()));
            }
            let open = p.expect(SyntaxKind::OpenBrace, ParserContext::ServiceDeclaration);
            let members = p.parse_node_list(|kind| kind == SyntaxKind::CloseBrace, |p| p.parse_class_member(false));
            let close = p.expect(SyntaxKind::CloseBrace, ParserContext::ServiceDeclaration);
            factory::node(
                SyntaxKind::ServiceDeclaration,
                vec![
                    metadata,
                    Some(qualifiers),
                    Some(keyword),
                    ty,
                    path,
                    Some(on),
                    Some(factory::list(listeners)),
                    Some(open),
                    Some(members),
                    Some(close),
                ],
            )
        })
    }

    /// `/a/b`, `/` or a string literal.
    fn parse_service_path(&mut self) -> Option<SyntaxNode> {
        match self.peek_kind() {
            SyntaxKind::StringLiteral => Some(factory::list(vec![self.consume_node()])),
            SyntaxKind::Slash => self.in_context(ParserContext::ServicePath, |p| {
                let mut segments = Vec::new();
                while p.peek_kind() == SyntaxKind::Slash {
                    segments.push(p.consume_node());
                    if p.peek_kind() == SyntaxKind::Identifier {
                        segments.push(p.consume_node());
                    }
                }
                Some(factory::list(segments))
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenReader;
    use crate::parser::FragmentKind;

    fn member(source: &str) -> SyntaxNode {
        let node = Parser::new(TokenReader::new(source)).parse_fragment(FragmentKind::ModuleMember);
        assert_eq!(node.to_source_string(), source);
        node
    }

    fn clean(source: &str, kind: SyntaxKind) -> SyntaxNode {
        let node = member(source);
        assert_eq!(node.kind(), kind, "{source}");
        assert!(!node.has_diagnostics(), "{source}: {:?}", node.diagnostics());
        node
    }

    #[test]
    fn test_imports() {
        let node = clean("import ballerina/lang.int as ints;", SyntaxKind::ImportDeclaration);
        assert!(node.find(SyntaxKind::ImportOrgName).is_some());
        assert!(node.find(SyntaxKind::ImportPrefix).is_some());
        let node = clean("import foo;", SyntaxKind::ImportDeclaration);
        assert!(node.slot(1).is_none());
    }

    #[test]
    fn test_function_definitions() {
        let node = clean(
            "public isolated function add(int a, int b = 1, int... rest) returns @tainted int { return a + b; }",
            SyntaxKind::FunctionDefinition,
        );
        assert!(node.find(SyntaxKind::DefaultableParameter).is_some());
        assert!(node.find(SyntaxKind::RestParameter).is_some());
        assert!(node.find(SyntaxKind::ReturnTypeDescriptor).is_some());
        assert!(node.find(SyntaxKind::Annotation).is_some());

        let node = clean("function double(int x) returns int => x * 2;", SyntaxKind::FunctionDefinition);
        assert!(node.find(SyntaxKind::ExpressionFunctionBody).is_some());

        let node = clean("function now() returns int = @java:Method {} external;", SyntaxKind::FunctionDefinition);
        assert!(node.find(SyntaxKind::ExternalFunctionBody).is_some());
    }

    #[test]
    fn test_module_variables() {
        let node = clean("configurable int port = ?;", SyntaxKind::ModuleVariableDeclaration);
        assert!(node.find(SyntaxKind::RequiredExpression).is_some());
        clean("final string name = \"x\";", SyntaxKind::ModuleVariableDeclaration);
        clean("http:Client c = check new (\"url\");", SyntaxKind::ModuleVariableDeclaration);
        clean("isolated function (int) returns int f = g;", SyntaxKind::ModuleVariableDeclaration);
    }

    #[test]
    fn test_constants_types_enums() {
        clean("const MAX = 10;", SyntaxKind::ConstantDeclaration);
        clean("public const int MAX = 10;", SyntaxKind::ConstantDeclaration);
        clean("type Point record {| int x; int y; |};", SyntaxKind::TypeDefinition);
        let node = clean("enum Color { RED, GREEN = \"g\", BLUE }", SyntaxKind::EnumDeclaration);
        assert_eq!(node.find_all(SyntaxKind::EnumMember).len(), 3);
    }

    #[test]
    fn test_classes() {
        let source = "public isolated client class Store {\n\
                      *Base;\n\
                      private final map<int> items = {};\n\
                      function init() {}\n\
                      remote function get(string k) returns int? { return self.items[k]; }\n\
                      }";
        let node = clean(source, SyntaxKind::ClassDefinition);
        assert!(node.find(SyntaxKind::TypeReference).is_some());
        assert!(node.find(SyntaxKind::ObjectField).is_some());
        assert_eq!(node.find_all(SyntaxKind::FunctionDefinition).len(), 2);
    }

    #[test]
    fn test_object_type_methods_have_no_body() {
        let node = clean(
            "type Shape object { function area() returns float; };",
            SyntaxKind::TypeDefinition,
        );
        assert!(node.find(SyntaxKind::MethodDeclaration).is_some());
    }

    #[test]
    fn test_services_and_listeners() {
        clean("listener http:Listener ep = new (8080);", SyntaxKind::ListenerDeclaration);
        let source = "service /api/v1 on ep, other {\n\
                      resource function get users/[string id]() returns json { return {}; }\n\
                      resource function post .() {}\n\
                      }";
        let node = clean(source, SyntaxKind::ServiceDeclaration);
        assert_eq!(node.find_all(SyntaxKind::ResourcePath).len(), 2);
        assert!(node.find(SyntaxKind::ResourcePathParameter).is_some());
    }

    #[test]
    fn test_annotation_declarations() {
        let node = clean(
            "public annotation Config cfg on function, object function, source type;",
            SyntaxKind::AnnotationDeclaration,
        );
        assert_eq!(node.find_all(SyntaxKind::AnnotationAttachPoint).len(), 3);
        clean("annotation tag;", SyntaxKind::AnnotationDeclaration);
    }

    #[test]
    fn test_misplaced_qualifier() {
        let node = member("configurable function f() {}");
        assert_eq!(node.kind(), SyntaxKind::FunctionDefinition);
        let codes: Vec<_> = node.diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::QualifierNotAllowed]);
    }

    #[test]
    fn test_misplaced_import_keeps_prefix_order() {
        let node = member("@a public import m;");
        assert_eq!(node.kind(), SyntaxKind::ImportDeclaration);
        let codes: Vec<_> = node.diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(codes[0], DiagnosticCode::AnnotationsNotAllowed);
        assert!(codes.contains(&DiagnosticCode::QualifierNotAllowed));
        assert!(codes.contains(&DiagnosticCode::ImportAfterDeclaration));
    }

    #[test]
    fn test_missing_body_is_inserted() {
        let node = member("function f() return 1; }");
        assert_eq!(node.kind(), SyntaxKind::FunctionDefinition);
        assert!(node.find(SyntaxKind::FunctionBodyBlock).is_some());
        assert!(node.has_diagnostics());
    }
}
