//! Method tables merged over an ancestor chain.
//!
//! The chain is folded from its least specific entry to its most specific
//! one, so a nearer entry overwrites whatever a farther one defined. Within
//! one entry, methods and attributes are collected first and aliases are
//! resolved afterwards against the table built so far.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use signa_core::TypeName;
use tracing::{instrument, trace};

use crate::Result;
use crate::ancestors::{AncestorBuilder, AncestorChain, AncestorEntry, Context};
use crate::ast::{
    AliasMember, AttributeMember, FunctionType, Member, MethodKind, MethodMember, MethodType, Param,
    Visibility,
};
use crate::env::Environment;
use crate::resolve::NameResolver;
use crate::source::Span;
use crate::subst::Substitution;

/// One resolved method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    pub name: String,
    /// The ancestor whose member defines this name.
    pub owner: TypeName,
    /// Where the body lives: the owner, or for an alias, the target's implementation.
    pub implementation: TypeName,
    pub accessibility: Visibility,
    /// Overloads with absolute names and the owner's substitution applied.
    pub overloads: Vec<MethodType>,
    pub span: Span,
}

impl MethodDefinition {
    pub fn is_public(&self) -> bool {
        self.accessibility == Visibility::Public
    }
}

/// An alias whose target was not found when its entry was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAlias {
    pub owner: TypeName,
    pub new_name: String,
    pub old_name: String,
    pub span: Span,
}

/// The merged method table of one `(TypeName, Context)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub type_name: TypeName,
    pub context: Context,
    pub ancestors: Arc<AncestorChain>,
    methods: IndexMap<String, MethodDefinition>,
    missing_aliases: Vec<MissingAlias>,
}

impl Definition {
    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.get(name)
    }

    /// Every method, sorted by name.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDefinition> {
        self.methods.values()
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn missing_aliases(&self) -> &[MissingAlias] {
        &self.missing_aliases
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

type Key = (TypeName, Context);

/// Computes and memoizes [`Definition`]s.
#[derive(Debug)]
pub struct DefinitionBuilder {
    ancestors: Arc<AncestorBuilder>,
    cache: RwLock<HashMap<Key, Arc<Definition>>>,
}

impl DefinitionBuilder {
    pub fn new(ancestors: Arc<AncestorBuilder>) -> Self {
        Self {
            ancestors,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn ancestor_builder(&self) -> &AncestorBuilder {
        &self.ancestors
    }

    #[instrument(level = "debug", skip_all, fields(%name, %context))]
    pub fn build(&self, name: &TypeName, context: Context) -> Result<Arc<Definition>> {
        let key = (name.clone(), context);
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(definition) = cache.get(&key) {
                trace!("definition cache hit");
                return Ok(definition.clone());
            }
        }

        let chain = self.ancestors.ancestors(name, context)?;
        let env = self.ancestors.environment();
        let mut table = MethodTable::default();
        for entry in chain.entries().iter().rev() {
            table.add_entry(env, entry);
        }

        let mut methods = table.methods;
        methods.sort_keys();
        let definition = Arc::new(Definition {
            type_name: name.clone(),
            context,
            ancestors: chain,
            methods,
            missing_aliases: table.missing_aliases,
        });
        trace!(methods = definition.len(), "definition built");
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(key).or_insert(definition).clone())
    }

    pub fn instance(&self, name: &TypeName) -> Result<Arc<Definition>> {
        self.build(name, Context::Instance)
    }

    pub fn singleton(&self, name: &TypeName) -> Result<Arc<Definition>> {
        self.build(name, Context::Singleton)
    }

    /// Looks up one method. `Ok(None)` if the chain builds but lacks `method`.
    pub fn method(
        &self,
        name: &TypeName,
        context: Context,
        method: &str,
    ) -> Result<Option<MethodDefinition>> {
        Ok(self.build(name, context)?.method(method).cloned())
    }
}

#[derive(Default)]
struct MethodTable {
    methods: IndexMap<String, MethodDefinition>,
    missing_aliases: Vec<MissingAlias>,
}

impl MethodTable {
    /// Overlays the members one chain entry contributes.
    fn add_entry(&mut self, env: &Environment, entry: &AncestorEntry) {
        let Some(declared) = env.get(&entry.name) else {
            return;
        };
        let resolver = NameResolver::new(env);
        let canonical: Vec<&str> = declared.type_param_names().collect();
        let singleton_side = entry.context == Context::Singleton;
        let mut aliases = Vec::new();

        for body in declared.bodies() {
            let rename = if body.type_params.is_empty() {
                Substitution::new()
            } else {
                Substitution::identity(canonical.iter().copied())
                    .rebind(body.type_params.iter().map(|p| p.name.as_str()))
            };
            let prepare = |method: &MethodType| {
                let method = resolver.absolutize_method(method, &body.nesting);
                entry.substitution.apply_method(&rename.apply_method(&method))
            };

            let mut section = Visibility::Public;
            for member in body.members {
                match member {
                    Member::Visibility(marker) => section = marker.visibility,
                    Member::Method(method) => {
                        if let Some(accessibility) = method_side(method, entry.context, section) {
                            let overloads = method.overloads.iter().map(&prepare).collect();
                            self.define(entry, &method.name, accessibility, overloads, method.span);
                        }
                    }
                    Member::Attribute(attribute) => {
                        if attribute.singleton != singleton_side {
                            continue;
                        }
                        let accessibility = attribute.visibility.unwrap_or(section);
                        for (name, overload) in accessors(attribute) {
                            let overloads = vec![prepare(&overload)];
                            self.define(entry, &name, accessibility, overloads, attribute.span);
                        }
                    }
                    Member::Alias(alias) if alias.singleton == singleton_side => {
                        aliases.push(alias);
                    }
                    Member::Alias(_)
                    | Member::Mixin(_)
                    | Member::Variable(_)
                    | Member::Declaration(_) => {}
                }
            }
        }

        for alias in aliases {
            self.alias(entry, alias);
        }
    }

    fn define(
        &mut self,
        entry: &AncestorEntry,
        name: &str,
        accessibility: Visibility,
        overloads: Vec<MethodType>,
        span: Span,
    ) {
        trace!(owner = %entry.name, name, "method defined");
        self.methods.insert(
            name.to_owned(),
            MethodDefinition {
                name: name.to_owned(),
                owner: entry.name.clone(),
                implementation: entry.name.clone(),
                accessibility,
                overloads,
                span,
            },
        );
    }

    fn alias(&mut self, entry: &AncestorEntry, alias: &AliasMember) {
        let Some(target) = self.methods.get(&alias.old_name) else {
            self.missing_aliases.push(MissingAlias {
                owner: entry.name.clone(),
                new_name: alias.new_name.clone(),
                old_name: alias.old_name.clone(),
                span: alias.span,
            });
            return;
        };
        let definition = MethodDefinition {
            name: alias.new_name.clone(),
            owner: entry.name.clone(),
            implementation: target.implementation.clone(),
            accessibility: target.accessibility,
            overloads: target.overloads.clone(),
            span: alias.span,
        };
        self.methods.insert(alias.new_name.clone(), definition);
    }
}

/// Accessibility of `method` on the `context` side, or `None` if it has no such side.
fn method_side(method: &MethodMember, context: Context, section: Visibility) -> Option<Visibility> {
    let declared = method.visibility.unwrap_or(section);
    match (method.kind, context) {
        (MethodKind::Instance, Context::Instance) => Some(declared),
        (MethodKind::SingletonInstance, Context::Instance) => Some(Visibility::Private),
        (MethodKind::SingletonInstance, Context::Singleton) => Some(Visibility::Public),
        (MethodKind::Singleton, Context::Singleton) => Some(declared),
        (MethodKind::Instance, Context::Singleton) | (MethodKind::Singleton, Context::Instance) => {
            None
        }
    }
}

/// Reader `name: () -> T` and writer `name=: (T name) -> T`.
fn accessors(attribute: &AttributeMember) -> Vec<(String, MethodType)> {
    let method = |function: FunctionType| MethodType {
        type_params: Vec::new(),
        function,
        block: None,
        span: attribute.span,
    };
    let mut methods = Vec::new();
    if attribute.kind.has_reader() {
        let reader = FunctionType::returning(attribute.ty.clone());
        methods.push((attribute.name.clone(), method(reader)));
    }
    if attribute.kind.has_writer() {
        let mut writer = FunctionType::returning(attribute.ty.clone());
        writer.required.push(Param {
            ty: attribute.ty.clone(),
            name: Some(attribute.name.clone()),
        });
        methods.push((format!("{}=", attribute.name), method(writer)));
    }
    methods
}
