//! Declaration model produced by the parser.
//!
//! Immutable once built. Every identifier occurrence that can fail to
//! resolve carries a [`Span`] so later passes can point back at it.

mod types;
pub mod visitor;

#[cfg(test)]
mod types_tests;

use std::fmt;

use serde::Serialize;
use signa_core::{EntityKind, TypeName};

pub use types::{
    Block, FunctionType, Literal, MethodType, NamedType, Param, ProcType, RecordField, RecordKey,
    SingletonType, Special, TypeExpr,
};

use crate::source::Span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Class(ClassDecl),
    Module(ModuleDecl),
    Interface(InterfaceDecl),
    Alias(AliasDecl),
    Constant(ConstantDecl),
    Global(GlobalDecl),
}

impl Declaration {
    /// Name as written. Globals have no type name.
    pub fn name(&self) -> Option<&TypeName> {
        match self {
            Declaration::Class(d) => Some(&d.name),
            Declaration::Module(d) => Some(&d.name),
            Declaration::Interface(d) => Some(&d.name),
            Declaration::Alias(d) => Some(&d.name),
            Declaration::Constant(d) => Some(&d.name),
            Declaration::Global(_) => None,
        }
    }

    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Declaration::Class(_) => Some(EntityKind::Class),
            Declaration::Module(_) => Some(EntityKind::Module),
            Declaration::Interface(_) => Some(EntityKind::Interface),
            Declaration::Alias(_) => Some(EntityKind::Alias),
            Declaration::Constant(_) => Some(EntityKind::Constant),
            Declaration::Global(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Class(d) => d.span,
            Declaration::Module(d) => d.span,
            Declaration::Interface(d) => d.span,
            Declaration::Alias(d) => d.span,
            Declaration::Constant(d) => d.span,
            Declaration::Global(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeParam {
    pub name: String,
    pub variance: Variance,
    pub unchecked: bool,
    pub upper_bound: Option<TypeExpr>,
    pub span: Span,
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchecked {
            f.write_str("unchecked ")?;
        }
        match self.variance {
            Variance::Invariant => {}
            Variance::Covariant => f.write_str("out ")?,
            Variance::Contravariant => f.write_str("in ")?,
        }
        f.write_str(&self.name)?;
        if let Some(bound) = &self.upper_bound {
            write!(f, " < {bound}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub super_class: Option<NamedType>,
    pub members: Vec<Member>,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub self_types: Vec<NamedType>,
    pub members: Vec<Member>,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub members: Vec<Member>,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeExpr,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantDecl {
    pub name: TypeName,
    pub ty: TypeExpr,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalDecl {
    /// Includes the leading `$`.
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Method(MethodMember),
    Attribute(AttributeMember),
    Alias(AliasMember),
    Mixin(Mixin),
    Visibility(VisibilityMarker),
    Variable(VariableMember),
    Declaration(Declaration),
}

impl Member {
    /// Maps every type written in this member. Nested declarations are kept as is.
    pub fn map_types(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> Member {
        match self {
            Member::Method(method) => Member::Method(MethodMember {
                overloads: method.overloads.iter().map(|o| o.map(f)).collect(),
                ..method.clone()
            }),
            Member::Attribute(attr) => Member::Attribute(AttributeMember {
                ty: attr.ty.map(f),
                ..attr.clone()
            }),
            Member::Variable(var) => Member::Variable(VariableMember {
                ty: var.ty.map(f),
                ..var.clone()
            }),
            Member::Mixin(mixin) => Member::Mixin(Mixin {
                target: mixin.target.map_args(f),
                ..mixin.clone()
            }),
            Member::Alias(_) | Member::Visibility(_) | Member::Declaration(_) => self.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// `def foo`
    Instance,
    /// `def self.foo`
    Singleton,
    /// `def self?.foo`: public singleton method plus private instance method.
    SingletonInstance,
}

impl MethodKind {
    pub fn has_instance_side(self) -> bool {
        matches!(self, MethodKind::Instance | MethodKind::SingletonInstance)
    }

    pub fn has_singleton_side(self) -> bool {
        matches!(self, MethodKind::Singleton | MethodKind::SingletonInstance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodMember {
    pub name: String,
    pub kind: MethodKind,
    pub overloads: Vec<MethodType>,
    /// Explicit `private def` / `public def`; `None` follows the section.
    pub visibility: Option<Visibility>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Reader,
    Writer,
    Accessor,
}

impl AttributeKind {
    pub fn has_reader(self) -> bool {
        matches!(self, AttributeKind::Reader | AttributeKind::Accessor)
    }

    pub fn has_writer(self) -> bool {
        matches!(self, AttributeKind::Writer | AttributeKind::Accessor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeMember {
    pub kind: AttributeKind,
    pub name: String,
    pub ty: TypeExpr,
    pub singleton: bool,
    pub visibility: Option<Visibility>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasMember {
    pub new_name: String,
    pub old_name: String,
    pub singleton: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MixinKind {
    Include,
    Extend,
    Prepend,
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl MixinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            MixinKind::Include => "include",
            MixinKind::Extend => "extend",
            MixinKind::Prepend => "prepend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mixin {
    pub kind: MixinKind,
    pub target: NamedType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityMarker {
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// `@name: T`
    Instance,
    /// `@@name: T`
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableMember {
    pub kind: VariableKind,
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}
