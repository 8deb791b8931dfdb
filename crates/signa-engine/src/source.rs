//! Source storage and locations.
//!
//! Every loaded signature file lives in the [`SourceMap`] together with its
//! [`Provenance`]. Locations elsewhere in the engine are [`Span`]s: a source
//! handle plus a byte range, turned into line/column only when printed.

use std::fmt;

use serde::Serialize;
use text_size::{TextRange, TextSize};

/// Lightweight handle to a source in a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize)]
pub struct SourceId(pub(crate) u32);

/// Where a source came from. Inert metadata for the engine.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Path(String),
    Library {
        name: String,
        version: Option<String>,
    },
    Gem {
        name: String,
        version: Option<String>,
    },
    Stdlib,
}

impl Provenance {
    /// Name used in diagnostics when the source has no path of its own.
    pub fn display_name(&self) -> String {
        match self {
            Provenance::Path(path) => path.clone(),
            Provenance::Library { name, .. } => format!("<library:{name}>"),
            Provenance::Gem { name, .. } => format!("<gem:{name}>"),
            Provenance::Stdlib => "<stdlib>".to_owned(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Path(path) => write!(f, "path={path}"),
            Provenance::Library { name, version } => {
                write!(f, "library, name={name}")?;
                if let Some(version) = version {
                    write!(f, ", version={version}")?;
                }
                Ok(())
            }
            Provenance::Gem { name, version } => write!(
                f,
                "gem, name={name}, version={}",
                version.as_deref().unwrap_or_default()
            ),
            Provenance::Stdlib => f.write_str("stdlib"),
        }
    }
}

/// A byte range inside one source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Span {
    pub source: SourceId,
    pub range: TextRange,
}

impl Span {
    pub fn new(source: SourceId, range: TextRange) -> Self {
        Self { source, range }
    }

    /// Smallest span covering both. Both must come from the same source.
    pub fn cover(self, other: Span) -> Span {
        debug_assert_eq!(self.source, other.source);
        Span {
            source: self.source,
            range: self.range.cover(other.range),
        }
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }
}

/// Resolved position: 1-based line, 0-based column.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Location<'s> {
    pub path: &'s str,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// A borrowed view of a source.
#[derive(Clone, Debug)]
pub struct Source<'s> {
    pub id: SourceId,
    pub path: &'s str,
    pub provenance: &'s Provenance,
    pub content: &'s str,
}

#[derive(Clone, Debug)]
struct SourceEntry {
    path: String,
    provenance: Provenance,
    content: String,
}

/// Registry of all sources.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source under an explicit display path.
    pub fn add(&mut self, path: &str, provenance: Provenance, content: &str) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        self.entries.push(SourceEntry {
            path: path.to_owned(),
            provenance,
            content: content.to_owned(),
        });
        id
    }

    /// Add a file source; its path is also its provenance.
    pub fn add_file(&mut self, path: &str, content: &str) -> SourceId {
        self.add(path, Provenance::Path(path.to_owned()), content)
    }

    pub fn get(&self, id: SourceId) -> Option<Source<'_>> {
        let entry = self.entries.get(id.0 as usize)?;
        Some(Source {
            id,
            path: &entry.path,
            provenance: &entry.provenance,
            content: &entry.content,
        })
    }

    pub fn content(&self, id: SourceId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|e| e.content.as_str())
    }

    pub fn path(&self, id: SourceId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|e| e.path.as_str())
    }

    pub fn provenance(&self, id: SourceId) -> Option<&Provenance> {
        self.entries.get(id.0 as usize).map(|e| &e.provenance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Source<'_>> {
        self.entries.iter().enumerate().map(|(idx, entry)| Source {
            id: SourceId(idx as u32),
            path: &entry.path,
            provenance: &entry.provenance,
            content: &entry.content,
        })
    }

    pub fn location(&self, span: Span) -> Option<Location<'_>> {
        let entry = self.entries.get(span.source.0 as usize)?;
        let (line, column) = line_col(&entry.content, span.start());
        Some(Location {
            path: &entry.path,
            line,
            column,
        })
    }
}

/// 1-based line and 0-based column (in characters) of `offset`.
pub fn line_col(content: &str, offset: TextSize) -> (usize, usize) {
    let offset = usize::from(offset).min(content.len());
    let before = content.get(..offset).unwrap_or(content);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count();
    (line, column)
}
