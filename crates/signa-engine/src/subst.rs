//! Type variable substitution.

use std::fmt;

use indexmap::IndexMap;

use crate::ast::{MethodType, TypeExpr};

/// Maps type parameter names to the types they stand for.
///
/// Order follows the parameter list, so printing `::Set[A]` can read the
/// arguments back out of [`Substitution::values`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution(IndexMap<String, TypeExpr>);

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every parameter maps to itself.
    pub fn identity<'a>(params: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            params
                .into_iter()
                .map(|name| (name.to_owned(), TypeExpr::var(name)))
                .collect(),
        )
    }

    /// Pairs parameters with arguments. Missing arguments become `untyped`,
    /// surplus arguments are dropped.
    pub fn bind<'a>(
        params: impl IntoIterator<Item = &'a str>,
        args: &[TypeExpr],
    ) -> Self {
        Self(
            params
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    let arg = args.get(i).cloned().unwrap_or_else(TypeExpr::untyped);
                    (name.to_owned(), arg)
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TypeExpr> {
        self.0.get(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &TypeExpr> {
        self.0.values()
    }

    pub fn apply(&self, ty: &TypeExpr) -> TypeExpr {
        if self.0.is_empty() {
            return ty.clone();
        }
        ty.map(&mut |t| match t {
            TypeExpr::Var { name } => match self.0.get(&name) {
                Some(replacement) => replacement.clone(),
                None => TypeExpr::Var { name },
            },
            other => other,
        })
    }

    /// Applies to a method type, leaving its own type parameters untouched.
    pub fn apply_method(&self, method: &MethodType) -> MethodType {
        let shadowed: Vec<&str> = method.type_param_names().collect();
        let inner = self.without(&shadowed);
        if inner.is_empty() {
            return method.clone();
        }
        method.map(&mut |t| match t {
            TypeExpr::Var { name } => match inner.0.get(&name) {
                Some(replacement) => replacement.clone(),
                None => TypeExpr::Var { name },
            },
            other => other,
        })
    }

    /// Composes `self` after `inner`: every value of `inner` gets `self` applied.
    pub fn compose(&self, inner: &Substitution) -> Substitution {
        Self(
            inner
                .0
                .iter()
                .map(|(name, ty)| (name.clone(), self.apply(ty)))
                .collect(),
        )
    }

    /// Renames keys to `names`, keeping values in order.
    ///
    /// A reopened declaration may spell its parameters differently from the
    /// first one; this maps its spelling onto the canonical values.
    pub fn rebind<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Substitution {
        Self(
            names
                .into_iter()
                .zip(self.0.values())
                .map(|(name, ty)| (name.to_owned(), ty.clone()))
                .collect(),
        )
    }

    pub fn without(&self, names: &[&str]) -> Substitution {
        Self(
            self.0
                .iter()
                .filter(|(name, _)| !names.contains(&name.as_str()))
                .map(|(name, ty)| (name.clone(), ty.clone()))
                .collect(),
        )
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, ty)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} => {ty}")?;
        }
        f.write_str("}")
    }
}
