//! Qualified names.
//!
//! `::Foo::Bar::baz` reads as namespace `::Foo::Bar::` plus simple name `baz`.
//! A leading `::` anchors the name at the top level; names without it are
//! relative and only acquire meaning once resolved against a nesting context.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::NameKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    path: Vec<String>,
    absolute: bool,
}

impl Namespace {
    /// The top-level namespace, `::`.
    pub fn root() -> Self {
        Self {
            path: Vec::new(),
            absolute: true,
        }
    }

    /// The empty relative namespace.
    pub fn empty() -> Self {
        Self {
            path: Vec::new(),
            absolute: false,
        }
    }

    pub fn new(path: Vec<String>, absolute: bool) -> Self {
        Self { path, absolute }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self {
            path,
            absolute: self.absolute,
        }
    }

    /// Appends a relative namespace. An absolute `other` replaces `self`.
    pub fn join(&self, other: &Namespace) -> Self {
        if other.absolute {
            return other.clone();
        }
        let mut path = self.path.clone();
        path.extend(other.path.iter().cloned());
        Self {
            path,
            absolute: self.absolute,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.path.split_last()?;
        Some(Self {
            path: rest.to_vec(),
            absolute: self.absolute,
        })
    }

    /// `::A::B::` becomes `::A::B`. The root namespace has no name.
    pub fn to_type_name(&self) -> Option<TypeName> {
        let (last, rest) = self.path.split_last()?;
        Some(TypeName {
            namespace: Self {
                path: rest.to_vec(),
                absolute: self.absolute,
            },
            name: last.clone(),
        })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("::")?;
        }
        for segment in &self.path {
            write!(f, "{segment}::")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    namespace: Namespace,
    name: String,
}

impl TypeName {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Parses `Foo`, `::Foo::Bar`, `Foo::_Each`, `::Foo::t`.
    ///
    /// Every namespace segment must be class-like. Returns `None` for
    /// malformed input.
    pub fn parse(text: &str) -> Option<Self> {
        let (absolute, rest) = match text.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut segments: Vec<&str> = rest.split("::").collect();
        let name = segments.pop()?;
        if !is_identifier(name) {
            return None;
        }
        if !segments
            .iter()
            .all(|s| is_identifier(s) && NameKind::of(s) == NameKind::Class)
        {
            return None;
        }
        let path = segments.into_iter().map(str::to_owned).collect();
        Some(Self {
            namespace: Namespace { path, absolute },
            name: name.to_owned(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NameKind {
        NameKind::of(&self.name)
    }

    pub fn is_absolute(&self) -> bool {
        self.namespace.absolute
    }

    /// The same path anchored at the top level.
    pub fn absolute(&self) -> Self {
        Self {
            namespace: Namespace {
                path: self.namespace.path.clone(),
                absolute: true,
            },
            name: self.name.clone(),
        }
    }

    /// Places a relative name inside `namespace`. Absolute names are returned unchanged.
    pub fn with_prefix(&self, namespace: &Namespace) -> Self {
        Self {
            namespace: namespace.join(&self.namespace),
            name: self.name.clone(),
        }
    }

    /// The namespace this name opens when used as a class or module.
    pub fn to_namespace(&self) -> Namespace {
        self.namespace.append(self.name.clone())
    }

    /// First segment as written: `A` for `A::B::C`, `C` for `C`.
    pub fn head(&self) -> &str {
        self.namespace.path.first().unwrap_or(&self.name)
    }

    /// Names of the enclosing namespaces, outermost first.
    ///
    /// `::A::B::C` yields `::A`, `::A::B`.
    pub fn prefixes(&self) -> Vec<TypeName> {
        let path = &self.namespace.path;
        (0..path.len())
            .map(|i| TypeName {
                namespace: Namespace {
                    path: path[..i].to_vec(),
                    absolute: self.namespace.absolute,
                },
                name: path[i].clone(),
            })
            .collect()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.namespace
            .path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.name)
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
