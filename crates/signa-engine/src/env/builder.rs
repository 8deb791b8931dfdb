//! Merging declarations into an [`Environment`].
//!
//! Two passes:
//! 1. Insert every declaration (nested ones included) under its absolute name,
//!    merging reopenings and recording kind, duplicate and arity conflicts
//! 2. Once every name is known, compare the superclasses of reopened classes
//!    and let fragments written without a parameter list see the entity's
//!    parameters

use signa_core::{Namespace, TypeName};
use tracing::{debug, trace};

use super::{EntityGroup, Entry, Environment, Fragment};
use crate::Diagnostics;
use crate::ast::{Declaration, Member, TypeExpr};
use crate::diagnostics::SignatureError;
use crate::resolve::{NameResolver, Nesting};
use crate::source::{SourceId, Span};

#[derive(Debug, Default)]
pub struct EnvironmentBuilder {
    env: Environment,
    diagnostics: Diagnostics,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the top-level declarations of one source.
    pub fn add_source(&mut self, source: SourceId, declarations: &[Declaration]) {
        let nesting = Nesting::top_level();
        for declaration in declarations {
            self.insert(declaration, &nesting, source);
        }
    }

    pub fn build(self) -> (Environment, Diagnostics) {
        let Self {
            mut env,
            mut diagnostics,
        } = self;
        check_super_classes(&env, &mut diagnostics);
        adopt_type_params(&mut env);
        debug!(
            entities = env.len(),
            conflicts = diagnostics.len(),
            "environment built"
        );
        (env, diagnostics)
    }

    fn insert(&mut self, declaration: &Declaration, nesting: &Nesting, source: SourceId) {
        let Declaration::Global(global) = declaration else {
            return self.insert_entity(declaration, nesting, source);
        };
        if self.env.globals.contains_key(&global.name) {
            self.conflict(
                TypeName::new(Namespace::empty(), global.name.clone()),
                "global declared more than once".to_owned(),
                global.span,
            );
            return;
        }
        self.env.globals.insert(
            global.name.clone(),
            Fragment::new(global.clone(), nesting, source),
        );
    }

    fn insert_entity(&mut self, declaration: &Declaration, nesting: &Nesting, source: SourceId) {
        let (Some(written), Some(kind)) = (declaration.name(), declaration.entity_kind()) else {
            return;
        };
        let name = written.with_prefix(nesting.innermost());

        match self.env.entries.get_mut(&name) {
            None => {
                trace!(%name, %kind, "declared");
                let entry = match declaration {
                    Declaration::Class(d) => Entry::Class(group(&name, d, nesting, source)),
                    Declaration::Module(d) => Entry::Module(group(&name, d, nesting, source)),
                    Declaration::Interface(d) => {
                        Entry::Interface(group(&name, d, nesting, source))
                    }
                    Declaration::Alias(d) => Entry::Alias(group(&name, d, nesting, source)),
                    Declaration::Constant(d) => {
                        Entry::Constant(group(&name, d, nesting, source))
                    }
                    Declaration::Global(_) => return,
                };
                self.env.entries.insert(name.clone(), entry);
            }
            Some(existing) if existing.kind() != kind => {
                let reason = format!("both {} and {kind}", existing.kind());
                let span = name_span(declaration);
                self.conflict(name.clone(), reason, span);
            }
            Some(existing) => {
                let canonical = existing.type_params().len();
                let reopened = match declaration {
                    Declaration::Class(d) => d.type_params.len(),
                    Declaration::Module(d) => d.type_params.len(),
                    _ => 0,
                };
                let merged = match (existing, declaration) {
                    _ if canonical > 0 && reopened > 0 && canonical != reopened => Err(format!(
                        "{reopened} type parameters here, {canonical} before"
                    )),
                    (Entry::Class(group), Declaration::Class(d)) => {
                        group.fragments.push(Fragment::new(d.clone(), nesting, source));
                        Ok(())
                    }
                    (Entry::Module(group), Declaration::Module(d)) => {
                        group.fragments.push(Fragment::new(d.clone(), nesting, source));
                        Ok(())
                    }
                    _ => Err(format!("{kind} declared more than once")),
                };
                if let Err(reason) = merged {
                    let span = name_span(declaration);
                    self.conflict(name.clone(), reason, span);
                } else {
                    trace!(%name, "reopened");
                }
            }
        }

        let members = match declaration {
            Declaration::Class(d) => &d.members,
            Declaration::Module(d) => &d.members,
            _ => return,
        };
        let inner = nesting.enter(name.to_namespace());
        for member in members {
            if let Member::Declaration(nested) = member {
                self.insert(nested, &inner, source);
            }
        }
    }

    fn conflict(&mut self, type_name: TypeName, reason: String, span: Span) {
        self.diagnostics.push(SignatureError::DeclarationConflict {
            type_name,
            reason,
            span,
        });
    }
}

fn group<D: Clone>(name: &TypeName, decl: &D, nesting: &Nesting, source: SourceId) -> EntityGroup<D> {
    EntityGroup::new(name.clone(), Fragment::new(decl.clone(), nesting, source))
}

fn name_span(declaration: &Declaration) -> Span {
    match declaration {
        Declaration::Class(d) => d.name_span,
        Declaration::Module(d) => d.name_span,
        Declaration::Interface(d) => d.name_span,
        Declaration::Alias(d) => d.name_span,
        Declaration::Constant(d) => d.name_span,
        Declaration::Global(d) => d.span,
    }
}

/// Every reopening that names a superclass must name the same one.
fn check_super_classes(env: &Environment, diagnostics: &mut Diagnostics) {
    let resolver = NameResolver::new(env);
    for group in env.entries().filter_map(Entry::as_class) {
        let mut first: Option<TypeName> = None;
        for fragment in &group.fragments {
            let Some(super_class) = &fragment.decl.super_class else {
                continue;
            };
            let Some(resolved) = resolver.resolve_type(&super_class.name, &fragment.nesting)
            else {
                continue;
            };
            match &first {
                None => first = Some(resolved),
                Some(expected) if *expected != resolved => {
                    diagnostics.push(SignatureError::DeclarationConflict {
                        type_name: group.name.clone(),
                        reason: format!("superclass `{resolved}` here, `{expected}` before"),
                        span: super_class.span,
                    });
                }
                Some(_) => {}
            }
        }
    }
}

/// Rewrites bare references to the entity's type parameters into variables
/// in every class or module fragment that declares no parameter list.
///
/// `class Box[T]` reopened as `class Box` still means `T` inside the body.
fn adopt_type_params(env: &mut Environment) {
    for entry in env.entries.values_mut() {
        let params: Vec<String> = entry.type_param_names().map(str::to_owned).collect();
        if params.is_empty() {
            continue;
        }
        let mut bind = |ty: TypeExpr| match ty {
            TypeExpr::Named(named)
                if named.args.is_empty()
                    && !named.name.is_absolute()
                    && named.name.namespace().is_empty()
                    && params.iter().any(|p| p == named.name.name()) =>
            {
                TypeExpr::var(named.name.name())
            }
            other => other,
        };
        match entry {
            Entry::Class(group) => {
                for fragment in group.fragments.iter_mut() {
                    if !fragment.decl.type_params.is_empty() {
                        continue;
                    }
                    trace!(name = %group.name, "fragment adopts type parameters");
                    let decl = &mut fragment.decl;
                    decl.members = decl.members.iter().map(|m| m.map_types(&mut bind)).collect();
                    decl.super_class = decl.super_class.as_ref().map(|s| s.map_args(&mut bind));
                }
            }
            Entry::Module(group) => {
                for fragment in group.fragments.iter_mut() {
                    if !fragment.decl.type_params.is_empty() {
                        continue;
                    }
                    trace!(name = %group.name, "fragment adopts type parameters");
                    let decl = &mut fragment.decl;
                    decl.members = decl.members.iter().map(|m| m.map_types(&mut bind)).collect();
                    decl.self_types = decl.self_types.iter().map(|s| s.map_args(&mut bind)).collect();
                }
            }
            Entry::Interface(_) | Entry::Alias(_) | Entry::Constant(_) => {}
        }
    }
}
