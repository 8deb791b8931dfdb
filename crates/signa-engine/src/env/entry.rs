//! Merged entity records.

use signa_core::{EntityKind, TypeName};

use crate::ast::{
    AliasDecl, ClassDecl, ConstantDecl, GlobalDecl, InterfaceDecl, Member, ModuleDecl, NamedType,
    TypeParam,
};
use crate::resolve::Nesting;
use crate::source::{SourceId, Span};

/// One declaration of an entity together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<D> {
    pub decl: D,
    /// Lexical scopes around the declaration, innermost first.
    pub nesting: Nesting,
    pub source: SourceId,
}

impl<D> Fragment<D> {
    pub(super) fn new(decl: D, nesting: &Nesting, source: SourceId) -> Self {
        Self {
            decl,
            nesting: nesting.clone(),
            source,
        }
    }
}

/// All fragments declaring one entity, in load order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup<D> {
    pub name: TypeName,
    pub fragments: Vec<Fragment<D>>,
}

impl<D> EntityGroup<D> {
    pub(super) fn new(name: TypeName, fragment: Fragment<D>) -> Self {
        Self {
            name,
            fragments: vec![fragment],
        }
    }

    pub fn primary(&self) -> &Fragment<D> {
        &self.fragments[0]
    }
}

/// A declared entity of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Class(EntityGroup<ClassDecl>),
    Module(EntityGroup<ModuleDecl>),
    Interface(EntityGroup<InterfaceDecl>),
    Alias(EntityGroup<AliasDecl>),
    Constant(EntityGroup<ConstantDecl>),
}

impl Entry {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entry::Class(_) => EntityKind::Class,
            Entry::Module(_) => EntityKind::Module,
            Entry::Interface(_) => EntityKind::Interface,
            Entry::Alias(_) => EntityKind::Alias,
            Entry::Constant(_) => EntityKind::Constant,
        }
    }

    pub fn name(&self) -> &TypeName {
        match self {
            Entry::Class(g) => &g.name,
            Entry::Module(g) => &g.name,
            Entry::Interface(g) => &g.name,
            Entry::Alias(g) => &g.name,
            Entry::Constant(g) => &g.name,
        }
    }

    /// Where the entity's name is first written.
    pub fn name_span(&self) -> Span {
        match self {
            Entry::Class(g) => g.primary().decl.name_span,
            Entry::Module(g) => g.primary().decl.name_span,
            Entry::Interface(g) => g.primary().decl.name_span,
            Entry::Alias(g) => g.primary().decl.name_span,
            Entry::Constant(g) => g.primary().decl.name_span,
        }
    }

    /// Canonical type parameters: those of the first fragment that declares any.
    pub fn type_params(&self) -> &[TypeParam] {
        fn first_declared<'a>(
            mut params: impl Iterator<Item = &'a [TypeParam]>,
        ) -> &'a [TypeParam] {
            params.find(|p| !p.is_empty()).unwrap_or(&[])
        }
        match self {
            Entry::Class(g) => first_declared(g.fragments.iter().map(|f| &f.decl.type_params[..])),
            Entry::Module(g) => {
                first_declared(g.fragments.iter().map(|f| &f.decl.type_params[..]))
            }
            Entry::Interface(g) => &g.primary().decl.type_params,
            Entry::Alias(g) => &g.primary().decl.type_params,
            Entry::Constant(_) => &[],
        }
    }

    pub fn type_param_names(&self) -> impl Iterator<Item = &str> {
        self.type_params().iter().map(|p| p.name.as_str())
    }

    pub fn as_class(&self) -> Option<&EntityGroup<ClassDecl>> {
        match self {
            Entry::Class(g) => Some(g),
            _ => None,
        }
    }

    /// One [`Body`] per fragment. Aliases and constants have none.
    pub fn bodies(&self) -> Vec<Body<'_>> {
        match self {
            Entry::Class(g) => g
                .fragments
                .iter()
                .map(|f| Body::new(&g.name, &f.decl.members, &f.decl.type_params, f))
                .collect(),
            Entry::Module(g) => g
                .fragments
                .iter()
                .map(|f| Body::new(&g.name, &f.decl.members, &f.decl.type_params, f))
                .collect(),
            Entry::Interface(g) => g
                .fragments
                .iter()
                .map(|f| Body::new(&g.name, &f.decl.members, &f.decl.type_params, f))
                .collect(),
            Entry::Alias(_) | Entry::Constant(_) => Vec::new(),
        }
    }
}

impl EntityGroup<ClassDecl> {
    /// The first explicitly written superclass, with the fragment declaring it.
    pub fn super_class(&self) -> Option<(&NamedType, &Fragment<ClassDecl>)> {
        self.fragments
            .iter()
            .find_map(|f| f.decl.super_class.as_ref().map(|s| (s, f)))
    }
}

/// The members of one fragment with the scope they resolve in.
#[derive(Debug, Clone)]
pub struct Body<'e> {
    pub members: &'e [Member],
    pub type_params: &'e [TypeParam],
    /// Scopes for references inside the body: the entity itself, then the
    /// scopes around the declaration.
    pub nesting: Nesting,
    pub source: SourceId,
}

impl<'e> Body<'e> {
    fn new<D>(
        name: &TypeName,
        members: &'e [Member],
        type_params: &'e [TypeParam],
        fragment: &Fragment<D>,
    ) -> Self {
        Self {
            members,
            type_params,
            nesting: fragment.nesting.enter(name.to_namespace()),
            source: fragment.source,
        }
    }
}

/// A global variable declaration.
pub type GlobalEntry = Fragment<GlobalDecl>;
