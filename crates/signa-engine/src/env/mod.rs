//! The merged view of every loaded declaration.
//!
//! Reopened classes and modules become one [`Entry`] holding all fragments in
//! load order. Nested declarations are flattened to their absolute names.
//! The environment is immutable once built.

mod builder;
mod entry;


pub use builder::EnvironmentBuilder;
pub use entry::{Body, EntityGroup, Entry, Fragment, GlobalEntry};

use indexmap::IndexMap;
use signa_core::{EntityKind, TypeName};

use crate::ast::{ClassDecl, TypeParam};

#[derive(Debug, Clone, Default)]
pub struct Environment {
    entries: IndexMap<TypeName, Entry>,
    globals: IndexMap<String, GlobalEntry>,
}

impl Environment {
    /// Entry for an absolute name.
    pub fn get(&self, name: &TypeName) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Entry for an absolute name, only if it has the given kind.
    pub fn lookup(&self, name: &TypeName, kind: EntityKind) -> Option<&Entry> {
        self.get(name).filter(|entry| entry.kind() == kind)
    }

    pub fn entity_kind(&self, name: &TypeName) -> Option<EntityKind> {
        self.get(name).map(Entry::kind)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.entries.contains_key(name)
    }

    pub fn class(&self, name: &TypeName) -> Option<&EntityGroup<ClassDecl>> {
        self.get(name).and_then(Entry::as_class)
    }

    pub fn type_params(&self, name: &TypeName) -> Option<&[TypeParam]> {
        self.get(name).map(Entry::type_params)
    }

    /// Every entity in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.entries.keys()
    }

    /// Enclosing namespaces of `name`, outermost first, with their kinds if declared.
    pub fn namespace_chain(&self, name: &TypeName) -> Vec<(TypeName, Option<EntityKind>)> {
        name.prefixes()
            .into_iter()
            .map(|prefix| {
                let kind = self.entity_kind(&prefix);
                (prefix, kind)
            })
            .collect()
    }

    pub fn globals(&self) -> impl Iterator<Item = &GlobalEntry> {
        self.globals.values()
    }

    pub fn global(&self, name: &str) -> Option<&GlobalEntry> {
        self.globals.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
