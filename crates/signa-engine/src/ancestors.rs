//! Ancestor linearization.
//!
//! # Instance chains
//!
//! For a class: prepended modules (in declared order), the class itself,
//! included modules (the last `include` nearest to the class), then the
//! superclass chain. Modules omit the superclass step; interfaces consist of
//! themselves plus their included interfaces.
//!
//! # Singleton chains
//!
//! `singleton(C)`, extended modules, then the singleton chain of the
//! superclass. The root class continues with the instance chain of `::Class`;
//! a module continues with the instance chain of `::Module`.
//!
//! Every chain is built generically, with the entity's own type parameters
//! left as variables, and cached. Splicing a chain into a larger one composes
//! the argument substitution at the splice site with each entry's own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use signa_core::{EntityKind, Namespace, TypeName};
use tracing::{instrument, trace};

use crate::ast::{ClassDecl, Member, MixinKind, TypeExpr, TypeParam};
use crate::diagnostics::SignatureError;
use crate::env::{Body, EntityGroup, Entry, Environment};
use crate::resolve::{NameResolver, Usage};
use crate::subst::Substitution;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Instance,
    Singleton,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Context::Instance => "instance",
            Context::Singleton => "singleton",
        })
    }
}

/// How an entry entered the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The entity the chain was requested for.
    Own,
    Superclass,
    Include,
    Extend,
    Prepend,
    InterfaceInclude,
    /// Part of the `::Class` or `::Module` tail of a singleton chain.
    Metaclass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorEntry {
    pub name: TypeName,
    pub context: Context,
    /// The entity's own type parameters mapped to the types active here.
    pub substitution: Substitution,
    pub origin: Origin,
}

impl AncestorEntry {
    pub fn args(&self) -> impl Iterator<Item = &TypeExpr> {
        self.substitution.values()
    }
}

impl fmt::Display for AncestorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context == Context::Singleton {
            return write!(f, "singleton({})", self.name);
        }
        write!(f, "{}", self.name)?;
        if !self.substitution.is_empty() {
            let args: Vec<String> = self.args().map(ToString::to_string).collect();
            write!(f, "[{}]", args.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    pub type_name: TypeName,
    pub context: Context,
    entries: Vec<AncestorEntry>,
}

impl AncestorChain {
    pub fn entries(&self) -> &[AncestorEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AncestorEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a `directive` in an entity of kind `owner` may name a `target` of this kind.
pub(crate) fn mixin_allowed(owner: EntityKind, directive: MixinKind, target: EntityKind) -> bool {
    match (owner, directive) {
        (EntityKind::Interface, MixinKind::Include) => target == EntityKind::Interface,
        (EntityKind::Interface, _) => false,
        (_, MixinKind::Include | MixinKind::Extend) => {
            matches!(target, EntityKind::Module | EntityKind::Interface)
        }
        (_, MixinKind::Prepend) => target == EntityKind::Module,
    }
}

type Key = (TypeName, Context);

struct MixinSite {
    target: TypeName,
    args: Vec<TypeExpr>,
    origin: Origin,
}

/// Computes and memoizes ancestor chains over one environment.
#[derive(Debug)]
pub struct AncestorBuilder {
    env: Arc<Environment>,
    cache: RwLock<HashMap<Key, Arc<AncestorChain>>>,
}

impl AncestorBuilder {
    pub fn new(env: Arc<Environment>) -> Self {
        Self {
            env,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    #[instrument(level = "debug", skip_all, fields(%name, %context))]
    pub fn ancestors(&self, name: &TypeName, context: Context) -> Result<Arc<AncestorChain>> {
        self.prepare((name.clone(), context))?;
        let mut path = Vec::new();
        self.chain(name, context, &mut path)
    }

    pub fn instance_ancestors(&self, name: &TypeName) -> Result<Arc<AncestorChain>> {
        self.ancestors(name, Context::Instance)
    }

    pub fn singleton_ancestors(&self, name: &TypeName) -> Result<Arc<AncestorChain>> {
        self.ancestors(name, Context::Singleton)
    }

    fn cached(&self, key: &Key) -> Option<Arc<AncestorChain>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).cloned()
    }

    /// Builds every chain `root` depends on, deepest first, off an explicit
    /// stack. Afterwards `chain` finds each dependency in the cache, so its
    /// own recursion never goes more than one level deep.
    fn prepare(&self, root: Key) -> Result<()> {
        if self.cached(&root).is_some() {
            return Ok(());
        }
        let deps = self.dependencies(&root);
        let mut stack: Vec<(Key, std::vec::IntoIter<Key>)> = vec![(root, deps.into_iter())];

        while let Some((_, deps)) = stack.last_mut() {
            let Some(dep) = deps.next() else {
                if let Some(((name, context), _)) = stack.pop() {
                    self.chain(&name, context, &mut Vec::new())?;
                }
                continue;
            };
            if let Some(start) = stack.iter().position(|(key, _)| *key == dep) {
                let path: Vec<Key> = stack[start..].iter().map(|(key, _)| key.clone()).collect();
                return Err(self.cycle(&path, &dep.0));
            }
            if self.cached(&dep).is_some() {
                continue;
            }
            let next = self.dependencies(&dep);
            stack.push((dep, next.into_iter()));
        }
        Ok(())
    }

    /// Chains that building `key` splices in, in the order `chain` asks for them.
    fn dependencies(&self, (name, context): &Key) -> Vec<Key> {
        let Some(entry) = self.env.get(name) else {
            return Vec::new();
        };
        let instance = |sites: Vec<MixinSite>| {
            sites
                .into_iter()
                .map(|site| (site.target, Context::Instance))
        };
        let mut deps = Vec::new();
        match (entry, context) {
            (Entry::Class(group), Context::Instance) => {
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Prepend)));
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Include)));
                if let Some((super_class, _)) = self.super_class(group) {
                    deps.push((super_class, Context::Instance));
                }
            }
            (Entry::Class(group), Context::Singleton) => {
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Extend)));
                match self.super_class(group) {
                    Some((super_class, _)) => deps.push((super_class, Context::Singleton)),
                    None => deps.extend(self.metaclass_root("Class")),
                }
            }
            (Entry::Module(_), Context::Instance) => {
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Prepend)));
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Include)));
            }
            (Entry::Module(_), Context::Singleton) => {
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Extend)));
                deps.extend(self.metaclass_root("Module"));
            }
            (Entry::Interface(_), Context::Instance) => {
                deps.extend(instance(self.mixin_sites(entry, MixinKind::Include)));
            }
            (Entry::Interface(_) | Entry::Alias(_) | Entry::Constant(_), _) => {}
        }
        deps
    }

    fn chain(
        &self,
        name: &TypeName,
        context: Context,
        path: &mut Vec<Key>,
    ) -> Result<Arc<AncestorChain>> {
        let key = (name.clone(), context);
        if let Some(start) = path.iter().position(|k| *k == key) {
            return Err(self.cycle(&path[start..], name));
        }
        if let Some(chain) = self.cached(&key) {
            trace!(%name, %context, "ancestor cache hit");
            return Ok(chain);
        }
        let entry = self
            .env
            .get(name)
            .ok_or_else(|| Error::UnknownType(name.clone()))?;

        path.push(key.clone());
        let entries = match (entry, context) {
            (Entry::Class(group), Context::Instance) => self.class_instance(entry, group, path),
            (Entry::Class(group), Context::Singleton) => self.class_singleton(entry, group, path),
            (Entry::Module(_), Context::Instance) => self.module_instance(entry, path),
            (Entry::Module(_), Context::Singleton) => self.module_singleton(entry, path),
            (Entry::Interface(_), Context::Instance) => self.interface_instance(entry, path),
            (Entry::Interface(_), Context::Singleton) => {
                Err(Error::Signature(SignatureError::NoSingletonChain {
                    type_name: name.clone(),
                    span: entry.name_span(),
                }))
            }
            (Entry::Alias(_) | Entry::Constant(_), _) => Err(Error::UnknownType(name.clone())),
        };
        path.pop();

        let chain = Arc::new(AncestorChain {
            type_name: name.clone(),
            context,
            entries: dedupe(entries?),
        });
        trace!(%name, %context, len = chain.len(), "ancestors built");
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(key).or_insert(chain).clone())
    }

    fn cycle(&self, path: &[Key], revisited: &TypeName) -> Error {
        let Some(entry) = self.env.get(revisited) else {
            return Error::UnknownType(revisited.clone());
        };
        let mut names: Vec<TypeName> = path.iter().map(|(name, _)| name.clone()).collect();
        names.push(revisited.clone());
        Error::Signature(SignatureError::CyclicAncestor {
            path: names,
            span: entry.name_span(),
        })
    }

    fn class_instance(
        &self,
        entry: &Entry,
        group: &EntityGroup<ClassDecl>,
        path: &mut Vec<Key>,
    ) -> Result<Vec<AncestorEntry>> {
        let mut entries = self.mixins(entry, MixinKind::Prepend, path)?;
        entries.push(own(entry, Context::Instance));
        entries.extend(self.mixins(entry, MixinKind::Include, path)?);
        if let Some((super_class, args)) = self.super_class(group) {
            let chain = self.chain(&super_class, Context::Instance, path)?;
            let site = self.bind(&super_class, &args);
            entries.extend(splice(&chain, &site, Origin::Superclass));
        }
        Ok(entries)
    }

    fn class_singleton(
        &self,
        entry: &Entry,
        group: &EntityGroup<ClassDecl>,
        path: &mut Vec<Key>,
    ) -> Result<Vec<AncestorEntry>> {
        let mut entries = vec![own(entry, Context::Singleton)];
        entries.extend(self.mixins(entry, MixinKind::Extend, path)?);
        match self.super_class(group) {
            Some((super_class, _)) => {
                let chain = self.chain(&super_class, Context::Singleton, path)?;
                entries.extend(splice(&chain, &Substitution::new(), Origin::Superclass));
            }
            None => entries.extend(self.metaclass_tail("Class", path)?),
        }
        Ok(entries)
    }

    fn module_instance(&self, entry: &Entry, path: &mut Vec<Key>) -> Result<Vec<AncestorEntry>> {
        let mut entries = self.mixins(entry, MixinKind::Prepend, path)?;
        entries.push(own(entry, Context::Instance));
        entries.extend(self.mixins(entry, MixinKind::Include, path)?);
        Ok(entries)
    }

    fn module_singleton(&self, entry: &Entry, path: &mut Vec<Key>) -> Result<Vec<AncestorEntry>> {
        let mut entries = vec![own(entry, Context::Singleton)];
        entries.extend(self.mixins(entry, MixinKind::Extend, path)?);
        entries.extend(self.metaclass_tail("Module", path)?);
        Ok(entries)
    }

    fn interface_instance(
        &self,
        entry: &Entry,
        path: &mut Vec<Key>,
    ) -> Result<Vec<AncestorEntry>> {
        let mut entries = vec![own(entry, Context::Instance)];
        entries.extend(self.mixins(entry, MixinKind::Include, path)?);
        Ok(entries)
    }

    /// Instance chain of `::Class` or `::Module`, if declared.
    fn metaclass_tail(&self, root: &str, path: &mut Vec<Key>) -> Result<Vec<AncestorEntry>> {
        let Some((name, context)) = self.metaclass_root(root) else {
            return Ok(Vec::new());
        };
        let chain = self.chain(&name, context, path)?;
        Ok(splice(&chain, &Substitution::new(), Origin::Metaclass).collect())
    }

    fn metaclass_root(&self, root: &str) -> Option<Key> {
        let name = TypeName::new(Namespace::root(), root);
        self.env.class(&name)?;
        Some((name, Context::Instance))
    }

    /// Expanded chains of every `directive` in `entry`, in chain order.
    ///
    /// Prepends keep declared order. For includes and extends, the last
    /// directive lands nearest to the entity.
    fn mixins(
        &self,
        entry: &Entry,
        directive: MixinKind,
        path: &mut Vec<Key>,
    ) -> Result<Vec<AncestorEntry>> {
        let mut groups = Vec::new();
        for site in self.mixin_sites(entry, directive) {
            let chain = self.chain(&site.target, Context::Instance, path)?;
            let binding = self.bind(&site.target, &site.args);
            trace!(owner = %entry.name(), target = %site.target, origin = ?site.origin, "splicing mixin");
            groups.push(splice(&chain, &binding, site.origin).collect::<Vec<_>>());
        }

        // TODO: Ruby itself yields `[B, A, C]` for `prepend A; prepend B`,
        // mirroring includes. Confirm against the reference behavior and
        // reverse prepends too if it agrees.
        if directive != MixinKind::Prepend {
            groups.reverse();
        }
        Ok(groups.into_iter().flatten().collect())
    }

    /// Resolved `directive` targets of `entry` in declared order. Targets that
    /// do not resolve, or whose kind the directive does not accept, are skipped.
    fn mixin_sites(&self, entry: &Entry, directive: MixinKind) -> Vec<MixinSite> {
        let resolver = NameResolver::new(&self.env);
        let canonical: Vec<&str> = entry.type_param_names().collect();
        let mut sites = Vec::new();

        for body in entry.bodies() {
            let rename = rename(&canonical, &body);
            let mixins = body.members.iter().filter_map(|member| match member {
                Member::Mixin(mixin) if mixin.kind == directive => Some(mixin),
                _ => None,
            });
            for mixin in mixins {
                let Ok(target) = resolver.resolve(&mixin.target.name, &body.nesting, Usage::Type)
                else {
                    continue;
                };
                let Some(target_kind) = self.env.entity_kind(&target) else {
                    continue;
                };
                if !mixin_allowed(entry.kind(), directive, target_kind) {
                    continue;
                }
                let args = mixin
                    .target
                    .args
                    .iter()
                    .map(|arg| rename.apply(&resolver.absolutize(arg, &body.nesting)))
                    .collect();
                let origin = match directive {
                    MixinKind::Include if target_kind == EntityKind::Interface => {
                        Origin::InterfaceInclude
                    }
                    MixinKind::Include => Origin::Include,
                    MixinKind::Extend => Origin::Extend,
                    MixinKind::Prepend => Origin::Prepend,
                };
                sites.push(MixinSite {
                    target,
                    args,
                    origin,
                });
            }
        }
        sites
    }

    /// The superclass with its absolutised arguments: explicit if it resolves
    /// to a class, otherwise `::Object` (none for `::Object` and `::BasicObject`).
    fn super_class(&self, group: &EntityGroup<ClassDecl>) -> Option<(TypeName, Vec<TypeExpr>)> {
        let resolver = NameResolver::new(&self.env);
        let canonical: Vec<&str> = group
            .fragments
            .iter()
            .map(|f| &f.decl.type_params)
            .find(|params| !params.is_empty())
            .map(|params| params.iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default();

        if let Some((super_class, fragment)) = group.super_class()
            && let Some(name) = resolver.resolve_type(&super_class.name, &fragment.nesting)
            && self.env.class(&name).is_some()
        {
            let rename = rename_params(&canonical, &fragment.decl.type_params);
            let args = super_class
                .args
                .iter()
                .map(|arg| rename.apply(&resolver.absolutize(arg, &fragment.nesting)))
                .collect();
            return Some((name, args));
        }

        let object = TypeName::new(Namespace::root(), "Object");
        let basic_object = TypeName::new(Namespace::root(), "BasicObject");
        if group.name == object || group.name == basic_object || self.env.class(&object).is_none()
        {
            return None;
        }
        Some((object, Vec::new()))
    }

    fn bind(&self, target: &TypeName, args: &[TypeExpr]) -> Substitution {
        let params = self.env.type_params(target).unwrap_or(&[]);
        Substitution::bind(params.iter().map(|p| p.name.as_str()), args)
    }
}

fn own(entry: &Entry, context: Context) -> AncestorEntry {
    let substitution = match context {
        Context::Instance => Substitution::identity(entry.type_param_names()),
        Context::Singleton => Substitution::new(),
    };
    AncestorEntry {
        name: entry.name().clone(),
        context,
        substitution,
        origin: Origin::Own,
    }
}

/// Maps a fragment's spelling of the type parameters onto the canonical names.
fn rename(canonical: &[&str], body: &Body<'_>) -> Substitution {
    rename_params(canonical, body.type_params)
}

fn rename_params(canonical: &[&str], params: &[TypeParam]) -> Substitution {
    if params.is_empty() {
        return Substitution::new();
    }
    Substitution::identity(canonical.iter().copied())
        .rebind(params.iter().map(|p| p.name.as_str()))
}

fn splice<'c>(
    chain: &'c AncestorChain,
    site: &'c Substitution,
    origin: Origin,
) -> impl Iterator<Item = AncestorEntry> + 'c {
    chain.entries.iter().map(move |entry| AncestorEntry {
        name: entry.name.clone(),
        context: entry.context,
        substitution: site.compose(&entry.substitution),
        origin: if entry.origin == Origin::Own {
            origin
        } else {
            entry.origin
        },
    })
}

/// Keeps the first occurrence of every `(name, context)`.
fn dedupe(entries: Vec<AncestorEntry>) -> Vec<AncestorEntry> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert((entry.name.clone(), entry.context)))
        .collect()
}
