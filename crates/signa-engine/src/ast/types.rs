//! Type expressions and method types.

use std::fmt;

use serde::Serialize;
use signa_core::TypeName;

use crate::source::Span;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// Class instance, interface or alias reference: `::Array[Integer]`.
    Named(NamedType),
    /// `singleton(::Foo)`
    Singleton(SingletonType),
    /// Reference to a type parameter in scope.
    Var { name: String },
    Union { types: Vec<TypeExpr> },
    Intersection { types: Vec<TypeExpr> },
    Optional { inner: Box<TypeExpr> },
    Tuple { types: Vec<TypeExpr> },
    Record { fields: Vec<RecordField> },
    Proc(Box<ProcType>),
    Literal { value: Literal },
    Special { special: Special },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedType {
    pub name: TypeName,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingletonType {
    pub name: TypeName,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordField {
    pub key: RecordKey,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    /// `name: T`
    Symbol(String),
    /// `"name" => T`
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcType {
    pub function: FunctionType,
    pub block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Stored with its quotes.
    String(String),
    /// Stored without the leading colon.
    Symbol(String),
    Integer(i64),
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Untyped,
    Void,
    SelfType,
    Instance,
    Class,
    Bot,
    Top,
    Nil,
    Bool,
}

/// One positional or keyword parameter: a type and an optional variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionType {
    pub required: Vec<Param>,
    pub optional: Vec<Param>,
    pub rest: Option<Param>,
    pub trailing: Vec<Param>,
    pub required_keywords: Vec<(String, Param)>,
    pub optional_keywords: Vec<(String, Param)>,
    pub rest_keywords: Option<Param>,
    pub return_type: Box<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub required: bool,
    pub function: FunctionType,
}

/// One overload of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodType {
    pub type_params: Vec<super::TypeParam>,
    pub function: FunctionType,
    pub block: Option<Block>,
    pub span: Span,
}

impl TypeExpr {
    pub fn untyped() -> Self {
        TypeExpr::Special {
            special: Special::Untyped,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypeExpr::Var { name: name.into() }
    }

    /// Rebuilds the tree bottom-up, handing every rebuilt node to `f`.
    ///
    /// Children are mapped before their parent, so a replacement returned by
    /// `f` is never visited again.
    pub fn map(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> TypeExpr {
        let rebuilt = match self {
            TypeExpr::Named(named) => TypeExpr::Named(NamedType {
                name: named.name.clone(),
                args: map_all(&named.args, f),
                span: named.span,
            }),
            TypeExpr::Union { types } => TypeExpr::Union {
                types: map_all(types, f),
            },
            TypeExpr::Intersection { types } => TypeExpr::Intersection {
                types: map_all(types, f),
            },
            TypeExpr::Optional { inner } => TypeExpr::Optional {
                inner: Box::new(inner.map(f)),
            },
            TypeExpr::Tuple { types } => TypeExpr::Tuple {
                types: map_all(types, f),
            },
            TypeExpr::Record { fields } => TypeExpr::Record {
                fields: fields
                    .iter()
                    .map(|field| RecordField {
                        key: field.key.clone(),
                        ty: field.ty.map(f),
                    })
                    .collect(),
            },
            TypeExpr::Proc(proc) => TypeExpr::Proc(Box::new(ProcType {
                function: proc.function.map(f),
                block: proc.block.as_ref().map(|b| b.map(f)),
            })),
            TypeExpr::Singleton(_)
            | TypeExpr::Var { .. }
            | TypeExpr::Literal { .. }
            | TypeExpr::Special { .. } => self.clone(),
        };
        f(rebuilt)
    }

    /// Visits every node, parents before children.
    pub fn walk(&self, f: &mut impl FnMut(&TypeExpr)) {
        f(self);
        match self {
            TypeExpr::Named(named) => named.args.iter().for_each(|t| t.walk(f)),
            TypeExpr::Union { types }
            | TypeExpr::Intersection { types }
            | TypeExpr::Tuple { types } => types.iter().for_each(|t| t.walk(f)),
            TypeExpr::Optional { inner } => inner.walk(f),
            TypeExpr::Record { fields } => fields.iter().for_each(|field| field.ty.walk(f)),
            TypeExpr::Proc(proc) => {
                proc.function.walk(f);
                if let Some(block) = &proc.block {
                    block.function.walk(f);
                }
            }
            TypeExpr::Singleton(_)
            | TypeExpr::Var { .. }
            | TypeExpr::Literal { .. }
            | TypeExpr::Special { .. } => {}
        }
    }
}

impl NamedType {
    /// Maps the type arguments, keeping the name and span.
    pub fn map_args(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> NamedType {
        NamedType {
            name: self.name.clone(),
            args: map_all(&self.args, f),
            span: self.span,
        }
    }
}

fn map_all(types: &[TypeExpr], f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> Vec<TypeExpr> {
    types.iter().map(|t| t.map(f)).collect()
}

fn map_keywords(
    keywords: &[(String, Param)],
    f: &mut impl FnMut(TypeExpr) -> TypeExpr,
) -> Vec<(String, Param)> {
    keywords
        .iter()
        .map(|(name, param)| (name.clone(), param.map(f)))
        .collect()
}

impl Param {
    fn map(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> Param {
        Param {
            ty: self.ty.map(f),
            name: self.name.clone(),
        }
    }
}

impl FunctionType {
    /// `() -> return_type`
    pub fn returning(return_type: TypeExpr) -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
            rest: None,
            trailing: Vec::new(),
            required_keywords: Vec::new(),
            optional_keywords: Vec::new(),
            rest_keywords: None,
            return_type: Box::new(return_type),
        }
    }

    pub fn map(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> FunctionType {
        FunctionType {
            required: self.required.iter().map(|p| p.map(f)).collect(),
            optional: self.optional.iter().map(|p| p.map(f)).collect(),
            rest: self.rest.as_ref().map(|p| p.map(f)),
            trailing: self.trailing.iter().map(|p| p.map(f)).collect(),
            required_keywords: map_keywords(&self.required_keywords, f),
            optional_keywords: map_keywords(&self.optional_keywords, f),
            rest_keywords: self.rest_keywords.as_ref().map(|p| p.map(f)),
            return_type: Box::new(self.return_type.map(f)),
        }
    }

    pub fn walk(&self, f: &mut impl FnMut(&TypeExpr)) {
        for param in self.params() {
            param.ty.walk(f);
        }
        self.return_type.walk(f);
    }

    /// All parameters in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.required
            .iter()
            .chain(&self.optional)
            .chain(&self.rest)
            .chain(&self.trailing)
            .chain(self.required_keywords.iter().map(|(_, p)| p))
            .chain(self.optional_keywords.iter().map(|(_, p)| p))
            .chain(&self.rest_keywords)
    }

    fn has_params(&self) -> bool {
        self.params().next().is_some()
    }
}

impl Block {
    fn map(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> Block {
        Block {
            required: self.required,
            function: self.function.map(f),
        }
    }
}

impl MethodType {
    /// Maps every type in the signature, type parameter bounds included.
    pub fn map(&self, f: &mut impl FnMut(TypeExpr) -> TypeExpr) -> MethodType {
        MethodType {
            type_params: self
                .type_params
                .iter()
                .map(|param| super::TypeParam {
                    upper_bound: param.upper_bound.as_ref().map(|b| b.map(f)),
                    ..param.clone()
                })
                .collect(),
            function: self.function.map(f),
            block: self.block.as_ref().map(|b| b.map(f)),
            span: self.span,
        }
    }

    pub fn walk(&self, f: &mut impl FnMut(&TypeExpr)) {
        for param in &self.type_params {
            if let Some(bound) = &param.upper_bound {
                bound.walk(f);
            }
        }
        self.function.walk(f);
        if let Some(block) = &self.block {
            block.function.walk(f);
        }
    }

    pub fn type_param_names(&self) -> impl Iterator<Item = &str> {
        self.type_params.iter().map(|p| p.name.as_str())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(named) => write!(f, "{named}"),
            TypeExpr::Singleton(singleton) => write!(f, "singleton({})", singleton.name),
            TypeExpr::Var { name } => f.write_str(name),
            TypeExpr::Union { types } => write_joined(f, types, " | ", Precedence::Union),
            TypeExpr::Intersection { types } => {
                write_joined(f, types, " & ", Precedence::Intersection)
            }
            TypeExpr::Optional { inner } => {
                write_operand(f, inner, Precedence::Optional)?;
                f.write_str("?")
            }
            TypeExpr::Tuple { types } if types.is_empty() => f.write_str("[ ]"),
            TypeExpr::Tuple { types } => {
                f.write_str("[")?;
                write_list(f, types)?;
                f.write_str("]")
            }
            TypeExpr::Record { fields } if fields.is_empty() => f.write_str("{ }"),
            TypeExpr::Record { fields } => {
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match &field.key {
                        RecordKey::Symbol(key) => write!(f, "{key}: {}", field.ty)?,
                        RecordKey::String(key) => write!(f, "{key} => {}", field.ty)?,
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Proc(proc) => {
                f.write_str("^")?;
                write_callable(f, &proc.function, proc.block.as_ref())
            }
            TypeExpr::Literal { value } => write!(f, "{value}"),
            TypeExpr::Special { special } => write!(f, "{special}"),
        }
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            f.write_str("[")?;
            write_list(f, &self.args)?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Symbol(s) => write!(f, ":{s}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::True => f.write_str("true"),
            Literal::False => f.write_str("false"),
        }
    }
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Special::Untyped => "untyped",
            Special::Void => "void",
            Special::SelfType => "self",
            Special::Instance => "instance",
            Special::Class => "class",
            Special::Bot => "bot",
            Special::Top => "top",
            Special::Nil => "nil",
            Special::Bool => "bool",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_callable(f, self, None)
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            f.write_str("[")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str("] ")?;
        }
        write_callable(f, &self.function, self.block.as_ref())
    }
}

/// `(params) { block } -> return`
fn write_callable(f: &mut fmt::Formatter<'_>, function: &FunctionType, block: Option<&Block>) -> fmt::Result {
    write_params(f, function)?;
    f.write_str(" ")?;
    if let Some(block) = block {
        if !block.required {
            f.write_str("?")?;
        }
        f.write_str("{ ")?;
        write_params(f, &block.function)?;
        write!(f, " -> {} }} ", block.function.return_type)?;
    }
    f.write_str("-> ")?;
    write_operand(f, &function.return_type, Precedence::Optional)
}

fn write_params(f: &mut fmt::Formatter<'_>, function: &FunctionType) -> fmt::Result {
    f.write_str("(")?;
    if function.has_params() {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(function.required.iter().map(ToString::to_string));
        parts.extend(function.optional.iter().map(|p| format!("?{p}")));
        parts.extend(function.rest.iter().map(|p| format!("*{p}")));
        parts.extend(function.trailing.iter().map(ToString::to_string));
        parts.extend(
            function
                .required_keywords
                .iter()
                .map(|(key, p)| format!("{key}: {p}")),
        );
        parts.extend(
            function
                .optional_keywords
                .iter()
                .map(|(key, p)| format!("?{key}: {p}")),
        );
        parts.extend(function.rest_keywords.iter().map(|p| format!("**{p}")));
        f.write_str(&parts.join(", "))?;
    }
    f.write_str(")")
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TypeExpr]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Union,
    Intersection,
    Optional,
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    types: &[TypeExpr],
    separator: &str,
    context: Precedence,
) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_operand(f, ty, context)?;
    }
    Ok(())
}

fn write_operand(f: &mut fmt::Formatter<'_>, ty: &TypeExpr, context: Precedence) -> fmt::Result {
    let parenthesize = match ty {
        TypeExpr::Proc(_) | TypeExpr::Union { .. } => true,
        TypeExpr::Intersection { .. } => context >= Precedence::Intersection,
        _ => false,
    };
    if parenthesize {
        write!(f, "({ty})")
    } else {
        write!(f, "{ty}")
    }
}
