use serde::Serialize;

/// What a simple name can denote, judged by its spelling alone.
///
/// - `Foo` → class, module or constant
/// - `_Foo` → interface
/// - `foo` → type alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKind {
    Class,
    Interface,
    Alias,
}

impl NameKind {
    pub fn of(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some('_'), Some(c)) if c.is_ascii_uppercase() => NameKind::Interface,
            (Some(c), _) if c.is_ascii_uppercase() => NameKind::Class,
            _ => NameKind::Alias,
        }
    }
}

/// Kind of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Module,
    Interface,
    Alias,
    Constant,
}

impl EntityKind {
    /// Class and module names may act as namespaces for other declarations.
    pub fn is_namespace(self) -> bool {
        matches!(self, EntityKind::Class | EntityKind::Module)
    }

    /// Whether a type reference spelled with `kind` can denote this entity.
    pub fn accepts(self, kind: NameKind) -> bool {
        match kind {
            NameKind::Class => matches!(self, EntityKind::Class | EntityKind::Module),
            NameKind::Interface => self == EntityKind::Interface,
            NameKind::Alias => self == EntityKind::Alias,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Class => "class",
            EntityKind::Module => "module",
            EntityKind::Interface => "interface",
            EntityKind::Alias => "type alias",
            EntityKind::Constant => "constant",
        };
        f.write_str(s)
    }
}
