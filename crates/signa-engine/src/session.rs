//! Loading signatures and querying the result.
//!
//! [`SessionBuilder`] collects sources (bundled or caller-supplied), parses
//! them, and merges the declarations into an [`Environment`]. The resulting
//! [`Session`] answers ancestor, definition and constant queries on demand and
//! runs whole-environment validation.

use std::sync::Arc;

use signa_core::{EntityKind, Namespace, TypeName};
use tracing::debug;

use crate::ancestors::{AncestorBuilder, AncestorChain, Context};
use crate::ast::{Declaration, Member, SingletonType, TypeExpr};
use crate::definitions::{Definition, DefinitionBuilder, MethodDefinition};
use crate::diagnostics::{Diagnostics, SignatureError};
use crate::env::{Entry, Environment, EnvironmentBuilder};
use crate::parser::Parser;
use crate::parser::lexer::lex;
use crate::resolve::{NameResolver, Nesting, Usage};
use crate::source::{Provenance, SourceId, SourceMap};
use crate::validate::Validator;
use crate::{Error, Result, stdlib};

const DEFAULT_EXEC_FUEL: u32 = 1_000_000;
/// Each unit covers one nested type or member, several parser frames deep.
const DEFAULT_RECURSION_FUEL: u32 = 128;

pub struct SessionBuilder {
    stdlib: bool,
    libraries: Vec<String>,
    sources: Vec<(String, Provenance, String)>,
    exec_fuel: Option<u32>,
    recursion_fuel: Option<u32>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            stdlib: true,
            libraries: Vec::new(),
            sources: Vec::new(),
            exec_fuel: Some(DEFAULT_EXEC_FUEL),
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
        }
    }

    /// Token budget for parsing one source. `None` disables the limit.
    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel = limit;
        self
    }

    /// Nesting budget for parsing one source. `None` disables the limit.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel = limit;
        self
    }

    /// Skips the bundled core signatures.
    pub fn no_stdlib(mut self) -> Self {
        self.stdlib = false;
        self
    }

    /// Loads a bundled library such as `"set"`.
    pub fn library(mut self, name: &str) -> Self {
        if !self.libraries.iter().any(|l| l == name) {
            self.libraries.push(name.to_owned());
        }
        self
    }

    pub fn add_source(mut self, provenance: Provenance, content: &str) -> Self {
        let path = provenance.display_name();
        self.sources.push((path, provenance, content.to_owned()));
        self
    }

    pub fn add_file(self, path: &str, content: &str) -> Self {
        self.add_source(Provenance::Path(path.to_owned()), content)
    }

    /// Every source the builder would load, bundled ones first.
    pub fn source_map(&self) -> Result<SourceMap> {
        let mut map = SourceMap::new();
        if self.stdlib {
            for file in stdlib::core() {
                map.add(file.path, Provenance::Stdlib, file.content);
            }
        }
        for name in &self.libraries {
            let files = stdlib::library(name).ok_or_else(|| Error::UnknownSource(name.clone()))?;
            for file in files {
                map.add(file.path, stdlib::library_provenance(name), file.content);
            }
        }
        for (path, provenance, content) in &self.sources {
            map.add(path, provenance.clone(), content);
        }
        Ok(map)
    }

    /// Parses every source on its own and reports what each file gets wrong
    /// without merging them: syntax errors and interface singleton methods.
    pub fn check_sources(&self) -> Result<Diagnostics> {
        let sources = self.source_map()?;
        let (parsed, mut diagnostics) = self.parse_all(&sources)?;
        for (_, declarations) in &parsed {
            for declaration in declarations {
                interface_singletons(declaration, &Namespace::root(), &mut diagnostics);
            }
        }
        diagnostics.sort(&sources);
        Ok(diagnostics)
    }

    pub fn build(self) -> Result<Session> {
        let sources = self.source_map()?;
        let (declarations, mut syntax) = self.parse_all(&sources)?;
        if !syntax.is_empty() {
            syntax.sort(&sources);
            return Err(Error::ParseFailed(syntax));
        }

        let mut builder = EnvironmentBuilder::new();
        for (source, decls) in &declarations {
            builder.add_source(*source, decls);
        }
        let (env, mut env_diagnostics) = builder.build();
        env_diagnostics.sort(&sources);

        let env = Arc::new(env);
        let ancestors = Arc::new(AncestorBuilder::new(env.clone()));
        let definitions = DefinitionBuilder::new(ancestors.clone());
        Ok(Session {
            sources,
            declarations,
            env,
            env_diagnostics,
            ancestors,
            definitions,
        })
    }

    fn parse_all(&self, sources: &SourceMap) -> Result<(ParsedSources, Diagnostics)> {
        let mut parsed = Vec::with_capacity(sources.len());
        let mut diagnostics = Diagnostics::new();
        for source in sources.iter() {
            let (declarations, errors) = Parser::new(source.content, source.id, lex(source.content))
                .with_exec_fuel(self.exec_fuel)
                .with_recursion_fuel(self.recursion_fuel)
                .parse()?;
            diagnostics.extend(errors);
            parsed.push((source.id, declarations));
        }
        debug!(
            sources = sources.len(),
            errors = diagnostics.len(),
            "sources parsed"
        );
        Ok((parsed, diagnostics))
    }
}

type ParsedSources = Vec<(SourceId, Vec<Declaration>)>;

/// Interfaces declaring `self.` or `self?.` methods, nested declarations included.
fn interface_singletons(
    declaration: &Declaration,
    namespace: &Namespace,
    diagnostics: &mut Diagnostics,
) {
    let (name, members) = match declaration {
        Declaration::Class(d) => (&d.name, &d.members),
        Declaration::Module(d) => (&d.name, &d.members),
        Declaration::Interface(d) => (&d.name, &d.members),
        _ => return,
    };
    let name = name.with_prefix(namespace);
    let is_interface = matches!(declaration, Declaration::Interface(_));

    for member in members {
        match member {
            Member::Method(method) if is_interface && method.kind.has_singleton_side() => {
                diagnostics.push(SignatureError::InterfaceSingletonMethod {
                    interface: name.clone(),
                    method: method.name.clone(),
                    span: method.span,
                });
            }
            Member::Declaration(nested) => {
                interface_singletons(nested, &name.to_namespace(), diagnostics);
            }
            _ => {}
        }
    }
}

/// A loaded, merged set of signatures.
pub struct Session {
    sources: SourceMap,
    declarations: ParsedSources,
    env: Arc<Environment>,
    env_diagnostics: Diagnostics,
    ancestors: Arc<AncestorBuilder>,
    definitions: DefinitionBuilder,
}

impl Session {
    pub fn source_map(&self) -> &SourceMap {
        &self.sources
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn ancestors(&self, name: &TypeName, context: Context) -> Result<Arc<AncestorChain>> {
        self.ancestors.ancestors(name, context)
    }

    pub fn instance_ancestors(&self, name: &TypeName) -> Result<Arc<AncestorChain>> {
        self.ancestors.instance_ancestors(name)
    }

    pub fn singleton_ancestors(&self, name: &TypeName) -> Result<Arc<AncestorChain>> {
        self.ancestors.singleton_ancestors(name)
    }

    pub fn definition(&self, name: &TypeName, context: Context) -> Result<Arc<Definition>> {
        self.definitions.build(name, context)
    }

    pub fn method(
        &self,
        name: &TypeName,
        context: Context,
        method: &str,
    ) -> Result<Option<MethodDefinition>> {
        self.definitions.method(name, context, method)
    }

    /// Type of the constant `name` as seen from `nesting`.
    ///
    /// Classes and modules are `singleton(::Name)`; declared constants yield
    /// their written type with names made absolute.
    pub fn constant(&self, name: &TypeName, nesting: &Nesting) -> Option<TypeExpr> {
        let resolver = NameResolver::new(&self.env);
        let resolved = resolver.resolve(name, nesting, Usage::Constant).ok()?;
        match self.env.get(&resolved)? {
            Entry::Constant(group) => {
                let fragment = group.primary();
                Some(resolver.absolutize(&fragment.decl.ty, &fragment.nesting))
            }
            entry @ (Entry::Class(_) | Entry::Module(_)) => {
                Some(TypeExpr::Singleton(SingletonType {
                    name: resolved,
                    span: entry.name_span(),
                }))
            }
            Entry::Interface(_) | Entry::Alias(_) => None,
        }
    }

    /// Declared entities in load order, optionally restricted to one kind.
    pub fn entities(
        &self,
        filter: Option<EntityKind>,
    ) -> impl Iterator<Item = (&TypeName, EntityKind)> {
        self.env
            .entries()
            .map(|entry| (entry.name(), entry.kind()))
            .filter(move |(_, kind)| filter.is_none_or(|f| f == *kind))
    }

    /// Every problem in the loaded set, sorted by file then offset.
    pub fn validate(&self) -> Diagnostics {
        let mut diagnostics = self.env_diagnostics.clone();
        diagnostics.extend(Validator::new(&self.definitions).run());
        diagnostics.sort(&self.sources);
        diagnostics
    }

    /// Parsed declarations of every source as JSON.
    pub fn dump_declarations(&self) -> serde_json::Result<String> {
        let declarations: Vec<&Declaration> = self
            .declarations
            .iter()
            .flat_map(|(_, decls)| decls)
            .collect();
        serde_json::to_string_pretty(&declarations)
    }
}
