//! Normalized declarations handed over by the front-end.
//!
//! The core never parses source text. A front-end scans annotations and
//! produces the records here: injectable classes, provider callables,
//! contribution declarations, and dependency-graph declarations, each
//! registered in a [`DeclarationStore`] under a stable [`DeclarationId`]
//! that diagnostics map back to a source position.

use crate::annotations::{MapKey, Qualifier, Scope};
use crate::bindings::MultibindingKind;
use crate::intern::TypeId;
use crate::keys::ContextualTypeKey;
use crate::parameters::{Parameter, Parameters};
use dashmap::DashMap;
use lattice_common::interner::{Atom, Interner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Stable identity of one source declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(pub u32);

impl DeclarationId {
    /// Sentinel value for "no declaration". Never returned by registration.
    pub const INVALID: Self = Self(0);

    /// First valid id.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// An injectable or contributing class.
    Class,
    /// A provider callable (function or property accessor).
    Callable,
    /// A contributed module whose providers merge into a graph.
    Module,
    /// A dependency-graph declaration.
    Graph,
}

/// Identity record stored per declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationInfo {
    /// Fully qualified name.
    pub name: Atom,
    pub kind: DeclarationKind,
}

/// Append-only store of declaration identities.
///
/// Registration takes `&self` so front-end workers can share one store;
/// ids are allocated sequentially and never reused within a pass.
#[derive(Debug)]
pub struct DeclarationStore {
    infos: DashMap<u32, DeclarationInfo>,
    next_id: AtomicU32,
}

impl Default for DeclarationStore {
    fn default() -> Self {
        Self {
            infos: DashMap::new(),
            next_id: AtomicU32::new(DeclarationId::FIRST_VALID),
        }
    }
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, info: DeclarationInfo) -> DeclarationId {
        let id = DeclarationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(decl_id = id.0, kind = ?info.kind, "registered declaration");
        self.infos.insert(id.0, info);
        id
    }

    pub fn get(&self, id: DeclarationId) -> Option<DeclarationInfo> {
        self.infos.get(&id.0).map(|info| info.clone())
    }

    pub fn contains(&self, id: DeclarationId) -> bool {
        self.infos.contains_key(&id.0)
    }

    /// Render a declaration's fully qualified name for diagnostics.
    pub fn display(&self, id: DeclarationId, names: &Interner) -> String {
        match self.get(id) {
            Some(info) => names.display(info.name).to_string(),
            None => format!("<declaration #{}>", id.0),
        }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// A class whose constructor participates in injection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectableClass {
    pub declaration: DeclarationId,
    /// The class's own type (type-parameter references for generics).
    pub key_type: TypeId,
    pub type_params: SmallVec<[TypeId; 2]>,
    /// Declared supertypes, in declaration order. Used for implicit
    /// bound-type inference of contributions.
    pub supertypes: SmallVec<[TypeId; 2]>,
    pub parameters: Parameters,
    pub scope: Option<Scope>,
    pub qualifier: Option<Qualifier>,
    /// Class-level map key, the fallback for into-map contributions that
    /// declare none on their bound-type expression.
    pub map_key: Option<MapKey>,
}

/// A provider callable declared on a graph or a contributed module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCallable {
    pub declaration: DeclarationId,
    pub owner: DeclarationId,
    pub name: Atom,
    pub parameters: Parameters,
    pub return_key: ContextualTypeKey,
    pub scope: Option<Scope>,
    pub is_property: bool,
    /// Set when the provider contributes into a multibinding container
    /// instead of claiming its return key directly.
    pub contributes_into: Option<MultibindingKind>,
    pub map_key: Option<MapKey>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContributionKind {
    /// `ContributesBinding`: alias the bound supertype to the class.
    Binding,
    /// `ContributesIntoSet`: add the class to a `Set<Bound>` multibinding.
    IntoSet,
    /// `ContributesIntoMap`: add the class to a `Map<K, Bound>` multibinding.
    IntoMap,
    /// `ContributesTo`: merge the origin module's providers into the graph.
    Supertype,
}

/// One contribution annotation on a class or module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionDeclaration {
    pub origin: DeclarationId,
    pub kind: ContributionKind,
    /// The scope whose graphs receive this contribution.
    pub target_scope: Scope,
    /// Explicit `binding<T>()` argument, when given.
    pub explicit_bound_type: Option<TypeId>,
    /// Qualifier declared on the bound-type expression; overrides the
    /// contributing class's own qualifier.
    pub explicit_qualifier: Option<Qualifier>,
    /// Interop flag suppressing qualifier propagation entirely.
    pub ignore_qualifier: bool,
    /// Map key declared on the bound-type expression (into-map only).
    pub explicit_map_key: Option<MapKey>,
    /// Origins whose contributions this one replaces.
    pub replaces: SmallVec<[DeclarationId; 2]>,
}

/// A module merged into graphs via a supertype contribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributedModule {
    pub declaration: DeclarationId,
    pub providers: Vec<ProviderCallable>,
}

/// One requested root of a dependency graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub name: Atom,
    pub key: ContextualTypeKey,
}

/// A user-declared dependency graph: the compile unit of resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphDeclaration {
    pub declaration: DeclarationId,
    pub primary_scope: Option<Scope>,
    pub additional_scopes: SmallVec<[Scope; 2]>,
    /// Contribution origins excluded from this graph's candidate set.
    pub excludes: SmallVec<[DeclarationId; 2]>,
    /// Accessor properties/functions — the roots to resolve.
    pub accessors: Vec<Accessor>,
    /// Providers declared directly inside the graph.
    pub providers: Vec<ProviderCallable>,
    /// Creator parameters carrying `is_binds_instance` / `is_graph_instance`.
    pub bound_instances: Vec<Parameter>,
    /// Extended parent graphs, in declaration order.
    pub extended_parents: SmallVec<[DeclarationId; 2]>,
}

impl GraphDeclaration {
    /// Primary scope followed by additional scopes, in declaration order.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.primary_scope.iter().chain(self.additional_scopes.iter())
    }

    pub fn declares_scope(&self, scope: &Scope) -> bool {
        self.scopes().any(|s| s == scope)
    }
}

/// All declarations visible to one compilation pass, indexed for the
/// aggregator. Insertion order of contributions is the discovery order that
/// stabilizes multibinding element emission.
#[derive(Debug, Default)]
pub struct DeclarationIndex {
    classes: FxHashMap<DeclarationId, InjectableClass>,
    modules: FxHashMap<DeclarationId, ContributedModule>,
    contributions: Vec<ContributionDeclaration>,
    graphs: Vec<GraphDeclaration>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: InjectableClass) {
        self.classes.insert(class.declaration, class);
    }

    pub fn add_module(&mut self, module: ContributedModule) {
        self.modules.insert(module.declaration, module);
    }

    pub fn add_contribution(&mut self, contribution: ContributionDeclaration) {
        self.contributions.push(contribution);
    }

    pub fn add_graph(&mut self, graph: GraphDeclaration) {
        self.graphs.push(graph);
    }

    pub fn class(&self, id: DeclarationId) -> Option<&InjectableClass> {
        self.classes.get(&id)
    }

    pub fn module(&self, id: DeclarationId) -> Option<&ContributedModule> {
        self.modules.get(&id)
    }

    pub fn contributions(&self) -> &[ContributionDeclaration] {
        &self.contributions
    }

    pub fn graphs(&self) -> &[GraphDeclaration] {
        &self.graphs
    }

    pub fn graph_for(&self, id: DeclarationId) -> Option<&GraphDeclaration> {
        self.graphs.iter().find(|g| g.declaration == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_allocates_valid_sequential_ids() {
        let mut names = Interner::new();
        let store = DeclarationStore::new();
        assert!(!DeclarationId::INVALID.is_valid());

        let a = store.register(DeclarationInfo {
            name: names.intern("app.Foo"),
            kind: DeclarationKind::Class,
        });
        let b = store.register(DeclarationInfo {
            name: names.intern("app.Bar"),
            kind: DeclarationKind::Graph,
        });
        assert!(a.is_valid());
        assert!(b.is_valid());
        assert_ne!(a, b);
        assert_eq!(store.display(a, &names), "app.Foo");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_declaration_renders_placeholder() {
        let names = Interner::new();
        let store = DeclarationStore::new();
        assert_eq!(store.display(DeclarationId(99), &names), "<declaration #99>");
    }

    #[test]
    fn graph_scope_set_is_primary_plus_additional() {
        let mut names = Interner::new();
        let app = Scope::marker(names.intern("AppScope"));
        let logged_in = Scope::marker(names.intern("LoggedInScope"));
        let other = Scope::marker(names.intern("OtherScope"));

        let graph = GraphDeclaration {
            declaration: DeclarationId(1),
            primary_scope: Some(app.clone()),
            additional_scopes: SmallVec::from_vec(vec![logged_in.clone()]),
            excludes: SmallVec::new(),
            accessors: Vec::new(),
            providers: Vec::new(),
            bound_instances: Vec::new(),
            extended_parents: SmallVec::new(),
        };

        assert!(graph.declares_scope(&app));
        assert!(graph.declares_scope(&logged_in));
        assert!(!graph.declares_scope(&other));
    }
}
