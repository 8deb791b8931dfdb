//! Whole-environment validation.
//!
//! Walks every entity and every reference it makes, collecting all failures:
//! - namespace prefixes of declared names must be declared classes or modules
//! - every named type, `singleton(...)` operand, superclass and mixin target resolves
//! - generic argument counts match the referenced declaration
//! - superclasses are classes and mixin targets have an allowed kind
//! - interfaces declare no singleton methods
//! - no method is declared twice in one entity and every alias has a target
//! - ancestor graphs are acyclic

use std::collections::HashSet;

use indexmap::IndexSet;
use signa_core::{EntityKind, TypeName};
use tracing::debug;

use crate::Error;
use crate::ancestors::{Context, mixin_allowed};
use crate::ast::visitor::{Visitor, walk_named_type};
use crate::ast::{Member, Mixin, NamedType, SingletonType, TypeParam};
use crate::definitions::DefinitionBuilder;
use crate::diagnostics::{DiagnosticKind, Diagnostics, SignatureError};
use crate::env::{Entry, Environment};
use crate::resolve::{NameResolver, Nesting, Usage};
use crate::source::Span;

pub struct Validator<'a> {
    env: &'a Environment,
    definitions: &'a DefinitionBuilder,
    resolver: NameResolver<'a>,
    diagnostics: Diagnostics,
    reported: HashSet<(DiagnosticKind, Span)>,
    /// Entity whose members are being visited, for mixin checks.
    owner: Option<(TypeName, EntityKind)>,
    nesting: Nesting,
}

impl<'a> Validator<'a> {
    pub fn new(definitions: &'a DefinitionBuilder) -> Self {
        let env = definitions.ancestor_builder().environment();
        Self {
            env,
            definitions,
            resolver: NameResolver::new(env),
            diagnostics: Diagnostics::new(),
            reported: HashSet::new(),
            owner: None,
            nesting: Nesting::top_level(),
        }
    }

    /// Runs every check. Diagnostics come back in discovery order.
    pub fn run(mut self) -> Diagnostics {
        let env = self.env;
        for entry in env.entries() {
            self.check_entry(entry);
        }
        for global in env.globals() {
            self.nesting = global.nesting.clone();
            self.visit_type(&global.decl.ty);
        }
        debug!(errors = self.diagnostics.len(), "validation finished");
        self.diagnostics
    }

    fn check_entry(&mut self, entry: &'a Entry) {
        self.check_namespace_prefix(entry);
        self.owner = None;

        match entry {
            Entry::Class(group) => {
                for fragment in &group.fragments {
                    self.nesting = fragment.nesting.clone();
                    self.check_type_params(&fragment.decl.type_params);
                    if let Some(super_class) = &fragment.decl.super_class {
                        self.check_super_class(&group.name, super_class);
                    }
                }
            }
            Entry::Module(group) => {
                for fragment in &group.fragments {
                    self.nesting = fragment.nesting.clone();
                    self.check_type_params(&fragment.decl.type_params);
                    for self_type in &fragment.decl.self_types {
                        self.visit_named_type(self_type);
                    }
                }
            }
            Entry::Interface(group) => {
                for fragment in &group.fragments {
                    self.nesting = fragment.nesting.clone();
                    self.check_type_params(&fragment.decl.type_params);
                }
            }
            Entry::Alias(group) => {
                for fragment in &group.fragments {
                    self.nesting = fragment.nesting.clone();
                    self.check_type_params(&fragment.decl.type_params);
                    self.visit_type(&fragment.decl.ty);
                }
            }
            Entry::Constant(group) => {
                for fragment in &group.fragments {
                    self.nesting = fragment.nesting.clone();
                    self.visit_type(&fragment.decl.ty);
                }
            }
        }

        self.check_bodies(entry);
        self.check_duplicates(entry);
        self.check_ancestry(entry);
    }

    /// Reports the outermost undeclared (or non-namespace) prefix of the entity's name.
    fn check_namespace_prefix(&mut self, entry: &Entry) {
        let missing = self
            .env
            .namespace_chain(entry.name())
            .into_iter()
            .find(|(_, kind)| !kind.is_some_and(EntityKind::is_namespace));
        if let Some((type_name, _)) = missing {
            self.push(SignatureError::NoTypeFound {
                type_name,
                span: entry.name_span(),
            });
        }
    }

    fn check_type_params(&mut self, params: &[TypeParam]) {
        for param in params {
            self.visit_type_param(param);
        }
    }

    fn check_super_class(&mut self, type_name: &TypeName, super_class: &NamedType) {
        match self.resolver.resolve(&super_class.name, &self.nesting, Usage::Type) {
            Err(unresolved) => self.push(SignatureError::NoTypeFound {
                type_name: unresolved.missing,
                span: super_class.span,
            }),
            Ok(resolved) if self.env.class(&resolved).is_none() => {
                self.push(SignatureError::InvalidSuperclass {
                    type_name: type_name.clone(),
                    super_class: resolved,
                    span: super_class.span,
                });
            }
            Ok(resolved) => self.check_arity(&resolved, super_class),
        }
        walk_named_type(self, super_class);
    }

    fn check_bodies(&mut self, entry: &'a Entry) {
        let is_interface = entry.kind() == EntityKind::Interface;
        for body in entry.bodies() {
            self.owner = Some((entry.name().clone(), entry.kind()));
            self.nesting = body.nesting.clone();
            for member in body.members {
                if is_interface
                    && let Member::Method(method) = member
                    && method.kind.has_singleton_side()
                {
                    self.push(SignatureError::InterfaceSingletonMethod {
                        interface: entry.name().clone(),
                        method: method.name.clone(),
                        span: method.span,
                    });
                }
                self.visit_member(member);
            }
        }
        self.owner = None;
    }

    fn check_duplicates(&mut self, entry: &Entry) {
        let mut instance = IndexSet::new();
        let mut singleton = IndexSet::new();
        let mut duplicates = Vec::new();

        for body in entry.bodies() {
            for member in body.members {
                let (names, instance_side, singleton_side, span) = match member {
                    Member::Method(method) => (
                        vec![method.name.clone()],
                        method.kind.has_instance_side(),
                        method.kind.has_singleton_side(),
                        method.span,
                    ),
                    Member::Attribute(attribute) => {
                        let mut names = Vec::new();
                        if attribute.kind.has_reader() {
                            names.push(attribute.name.clone());
                        }
                        if attribute.kind.has_writer() {
                            names.push(format!("{}=", attribute.name));
                        }
                        (names, !attribute.singleton, attribute.singleton, attribute.span)
                    }
                    _ => continue,
                };
                for name in names {
                    let fresh_instance = !instance_side || instance.insert(name.clone());
                    let fresh_singleton = !singleton_side || singleton.insert(name.clone());
                    if !(fresh_instance && fresh_singleton) {
                        duplicates.push((name, span));
                    }
                }
            }
        }

        for (method, span) in duplicates {
            self.push(SignatureError::DuplicatedMethodDefinition {
                type_name: entry.name().clone(),
                method,
                span,
            });
        }
    }

    /// Builds the entity's definitions, surfacing cycles and dangling aliases.
    fn check_ancestry(&mut self, entry: &Entry) {
        let contexts: &[Context] = match entry.kind() {
            EntityKind::Class | EntityKind::Module => &[Context::Instance, Context::Singleton],
            EntityKind::Interface => &[Context::Instance],
            EntityKind::Alias | EntityKind::Constant => &[],
        };
        for &context in contexts {
            match self.definitions.build(entry.name(), context) {
                Ok(definition) => {
                    let missing = definition
                        .missing_aliases()
                        .iter()
                        .filter(|alias| alias.owner == *entry.name());
                    for alias in missing {
                        self.push(SignatureError::UnknownMethodAlias {
                            type_name: alias.owner.clone(),
                            method: alias.old_name.clone(),
                            span: alias.span,
                        });
                    }
                }
                Err(Error::Signature(error)) => self.push(error),
                Err(_) => {}
            }
        }
    }

    fn check_arity(&mut self, resolved: &TypeName, named: &NamedType) {
        let expected = self.env.type_params(resolved).map_or(0, <[TypeParam]>::len);
        if expected != named.args.len() {
            self.push(SignatureError::ArityMismatch {
                type_name: resolved.clone(),
                expected,
                actual: named.args.len(),
                span: named.span,
            });
        }
    }

    /// Records an error once per kind and location.
    fn push(&mut self, error: SignatureError) {
        if self.reported.insert((error.kind(), error.span())) {
            self.diagnostics.push(error);
        }
    }
}

impl Visitor for Validator<'_> {
    fn visit_mixin(&mut self, mixin: &Mixin) {
        let target = &mixin.target;
        match self.resolver.resolve(&target.name, &self.nesting, Usage::Type) {
            Err(unresolved) => self.push(SignatureError::NoTypeFound {
                type_name: unresolved.missing,
                span: target.span,
            }),
            Ok(resolved) => {
                let allowed = match (&self.owner, self.env.entity_kind(&resolved)) {
                    (Some((_, owner)), Some(kind)) => mixin_allowed(*owner, mixin.kind, kind),
                    _ => true,
                };
                if allowed {
                    self.check_arity(&resolved, target);
                } else if let Some((type_name, _)) = &self.owner {
                    let type_name = type_name.clone();
                    self.push(SignatureError::InvalidMixinTarget {
                        type_name,
                        target: resolved,
                        directive: mixin.kind.keyword(),
                        span: target.span,
                    });
                }
            }
        }
        walk_named_type(self, target);
    }

    fn visit_named_type(&mut self, named: &NamedType) {
        match self.resolver.resolve(&named.name, &self.nesting, Usage::Type) {
            Ok(resolved) => self.check_arity(&resolved, named),
            Err(unresolved) => self.push(SignatureError::NoTypeFound {
                type_name: unresolved.missing,
                span: named.span,
            }),
        }
        walk_named_type(self, named);
    }

    fn visit_singleton_type(&mut self, singleton: &SingletonType) {
        if let Err(unresolved) =
            self.resolver
                .resolve(&singleton.name, &self.nesting, Usage::Namespace)
        {
            self.push(SignatureError::NoTypeFound {
                type_name: unresolved.missing,
                span: singleton.span,
            });
        }
    }
}
