//! Relative name resolution.
//!
//! A reference written inside `module A; class B` is looked up as `::A::B::Ref`,
//! then `::A::Ref`, then `::Ref`. The first candidate that is declared with a
//! kind matching the reference wins.

use signa_core::{EntityKind, NameKind, Namespace, TypeName};

use crate::ast::{MethodType, TypeExpr};
use crate::env::Environment;

/// Lexical scopes around a reference, innermost first. Always ends at `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nesting(Vec<Namespace>);

impl Nesting {
    pub fn top_level() -> Self {
        Nesting(vec![Namespace::root()])
    }

    /// Pushes `namespace` as the new innermost scope.
    pub fn enter(&self, namespace: Namespace) -> Self {
        let mut scopes = Vec::with_capacity(self.0.len() + 1);
        scopes.push(namespace);
        scopes.extend(self.0.iter().cloned());
        Nesting(scopes)
    }

    pub fn innermost(&self) -> &Namespace {
        &self.0[0]
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Namespace> {
        self.0.iter()
    }
}

impl Default for Nesting {
    fn default() -> Self {
        Self::top_level()
    }
}

/// What a reference is used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// A type: class instance, interface or alias, chosen by spelling.
    Type,
    /// A constant value: a class, a module, or a declared constant.
    Constant,
    /// The operand of `singleton(...)`: a class or a module.
    Namespace,
}

impl Usage {
    fn accepts(self, name: &TypeName, kind: EntityKind) -> bool {
        match self {
            Usage::Type => kind.accepts(name.kind()),
            Usage::Constant => name.kind() == NameKind::Class
                && matches!(
                    kind,
                    EntityKind::Class | EntityKind::Module | EntityKind::Constant
                ),
            Usage::Namespace => kind.is_namespace(),
        }
    }
}

/// Resolution failure: the shortest missing prefix of the closest candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub missing: TypeName,
}

pub struct NameResolver<'e> {
    env: &'e Environment,
}

impl<'e> NameResolver<'e> {
    pub fn new(env: &'e Environment) -> Self {
        Self { env }
    }

    pub fn resolve(
        &self,
        name: &TypeName,
        nesting: &Nesting,
        usage: Usage,
    ) -> Result<TypeName, Unresolved> {
        if name.is_absolute() {
            if self.exists(name, usage) {
                return Ok(name.clone());
            }
            return Err(self.unresolved(name));
        }

        for scope in nesting.scopes() {
            let candidate = name.with_prefix(scope);
            if self.exists(&candidate, usage) {
                return Ok(candidate);
            }
        }

        // The closest candidate is the one whose first segment is declared.
        let head = TypeName::new(Namespace::empty(), name.head());
        let scope = nesting
            .scopes()
            .find(|scope| self.env.get(&head.with_prefix(scope)).is_some())
            .cloned()
            .unwrap_or_else(Namespace::root);
        Err(self.unresolved(&name.with_prefix(&scope)))
    }

    /// Resolves as a type reference, or `None`.
    pub fn resolve_type(&self, name: &TypeName, nesting: &Nesting) -> Option<TypeName> {
        self.resolve(name, nesting, Usage::Type).ok()
    }

    /// Rewrites every resolvable name in `ty` to its absolute form.
    /// Names that do not resolve are kept as written.
    pub fn absolutize(&self, ty: &TypeExpr, nesting: &Nesting) -> TypeExpr {
        ty.map(&mut |t| self.absolutize_node(t, nesting))
    }

    /// [`absolutize`](Self::absolutize) over every type in a method signature.
    pub fn absolutize_method(&self, method: &MethodType, nesting: &Nesting) -> MethodType {
        method.map(&mut |t| self.absolutize_node(t, nesting))
    }

    fn absolutize_node(&self, ty: TypeExpr, nesting: &Nesting) -> TypeExpr {
        match ty {
            TypeExpr::Named(mut named) => {
                if let Some(absolute) = self.resolve_type(&named.name, nesting) {
                    named.name = absolute;
                }
                TypeExpr::Named(named)
            }
            TypeExpr::Singleton(mut singleton) => {
                if let Ok(absolute) = self.resolve(&singleton.name, nesting, Usage::Namespace) {
                    singleton.name = absolute;
                }
                TypeExpr::Singleton(singleton)
            }
            other => other,
        }
    }

    fn exists(&self, candidate: &TypeName, usage: Usage) -> bool {
        self.prefixes_declared(candidate)
            && self
                .env
                .entity_kind(candidate)
                .is_some_and(|kind| usage.accepts(candidate, kind))
    }

    fn prefixes_declared(&self, candidate: &TypeName) -> bool {
        candidate.prefixes().iter().all(|prefix| self.is_namespace(prefix))
    }

    fn is_namespace(&self, name: &TypeName) -> bool {
        self.env
            .entity_kind(name)
            .is_some_and(EntityKind::is_namespace)
    }

    fn unresolved(&self, candidate: &TypeName) -> Unresolved {
        let missing = candidate
            .prefixes()
            .into_iter()
            .find(|prefix| !self.is_namespace(prefix))
            .unwrap_or_else(|| candidate.clone());
        Unresolved { missing }
    }
}
