//! Signatures bundled with the engine.
//!
//! `core` describes the built-in classes every session starts from. Named
//! libraries are opt-in and load on top of `core`.

use crate::source::Provenance;

/// One embedded signature file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledFile {
    pub path: &'static str,
    pub content: &'static str,
}

macro_rules! bundled {
    ($($path:literal),* $(,)?) => {
        &[$(BundledFile {
            path: $path,
            content: include_str!($path),
        }),*]
    };
}

static CORE: &[BundledFile] = bundled![
    "core/basic_object.rbs",
    "core/object.rbs",
    "core/module.rbs",
    "core/comparable.rbs",
    "core/enumerable.rbs",
    "core/numeric.rbs",
    "core/string.rbs",
    "core/boolean.rbs",
    "core/array.rbs",
    "core/hash.rbs",
    "core/range.rbs",
    "core/proc.rbs",
    "core/exception.rbs",
    "core/builtins.rbs",
];

static SET: &[BundledFile] = bundled!["set/set.rbs"];

static LIBRARIES: &[(&str, &[BundledFile])] = &[("set", SET)];

pub fn core() -> &'static [BundledFile] {
    CORE
}

/// Files of a bundled library, or `None` if no library has that name.
pub fn library(name: &str) -> Option<&'static [BundledFile]> {
    LIBRARIES
        .iter()
        .find(|(library, _)| *library == name)
        .map(|(_, files)| *files)
}

pub fn library_names() -> impl Iterator<Item = &'static str> {
    LIBRARIES.iter().map(|(name, _)| *name)
}

pub fn library_provenance(name: &str) -> Provenance {
    Provenance::Library {
        name: name.to_owned(),
        version: None,
    }
}
