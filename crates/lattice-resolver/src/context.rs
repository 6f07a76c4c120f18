//! Per-pass resolver context.
//!
//! One `ResolverContext` lives for one compilation pass, threaded by
//! reference into aggregation and resolution, and discarded at pass end. It
//! is never a process-wide singleton: sealed graphs and plans are keyed by
//! declaration identity and valid only within the pass that produced them.
//!
//! A failure is fatal to its own graph declaration but does not abort
//! sibling declarations; the context collects every diagnostic across the
//! pass so the host reports them together.

use crate::graph::BindingGraph;
use crate::plan::ConstructionPlan;
use crate::resolve::GraphResolver;
use lattice_aggregator::aggregate;
use lattice_common::diagnostics::Diagnostic;
use lattice_common::interner::Interner;
use lattice_model::{
    BuiltinTypes, DeclarationId, DeclarationIndex, DeclarationStore, GraphDeclaration,
    TypeInterner,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::{debug, warn};

pub struct ResolverContext<'a> {
    pub decls: &'a DeclarationStore,
    pub names: &'a Interner,
    pub types: &'a TypeInterner,
    pub builtins: BuiltinTypes,
    /// Sealed binding graphs finished this pass, consulted as parents by
    /// graphs that extend them.
    graphs: FxHashMap<DeclarationId, BindingGraph>,
    plans: FxHashMap<DeclarationId, ConstructionPlan>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ResolverContext<'a> {
    pub fn new(
        decls: &'a DeclarationStore,
        names: &'a Interner,
        types: &'a TypeInterner,
        builtins: BuiltinTypes,
    ) -> Self {
        Self {
            decls,
            names,
            types,
            builtins,
            graphs: FxHashMap::default(),
            plans: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Aggregate and resolve every graph declaration in the index, in
    /// declaration order. Parents must precede the graphs extending them.
    pub fn resolve_pass(&mut self, index: &DeclarationIndex) {
        debug!(graphs = index.graphs().len(), "starting resolution pass");
        for graph in index.graphs() {
            self.resolve_graph(graph, index);
        }
    }

    /// Aggregate, load, seal, and resolve one graph declaration. On failure
    /// the diagnostic is recorded and siblings continue.
    pub fn resolve_graph(&mut self, declaration: &GraphDeclaration, index: &DeclarationIndex) {
        let candidates = match aggregate(declaration, index, self.types, self.builtins) {
            Ok(candidates) => candidates,
            Err(error) => {
                self.diagnostics
                    .push(error.into_diagnostic(self.decls, self.names));
                return;
            }
        };

        let mut graph = BindingGraph::new(declaration.declaration);
        if let Err(error) = graph.load(candidates) {
            self.diagnostics
                .push(error.into_diagnostic(self.decls, self.names, self.types));
            return;
        }
        graph.seal();

        let result = {
            let parents = self.collect_parents(declaration, index);
            GraphResolver::with_parents(&graph, declaration, parents).resolve(&declaration.accessors)
        };
        match result {
            Ok(plan) => {
                self.plans.insert(declaration.declaration, plan);
            }
            Err(error) => {
                self.diagnostics
                    .push(error.into_diagnostic(self.decls, self.names, self.types));
            }
        }
        self.graphs.insert(declaration.declaration, graph);
    }

    /// The full extension ancestry of `declaration`, breadth-first: direct
    /// parents in declaration order, then their parents, deduplicated. A key
    /// satisfiable only by a grandparent graph must still resolve.
    fn collect_parents(
        &self,
        declaration: &GraphDeclaration,
        index: &DeclarationIndex,
    ) -> Vec<(DeclarationId, &BindingGraph)> {
        let mut ancestry: Vec<DeclarationId> = Vec::new();
        let mut seen: FxHashSet<DeclarationId> = FxHashSet::default();
        let mut queue: VecDeque<DeclarationId> =
            declaration.extended_parents.iter().copied().collect();
        while let Some(parent) = queue.pop_front() {
            if !seen.insert(parent) {
                continue;
            }
            ancestry.push(parent);
            if let Some(parent_declaration) = index.graph_for(parent) {
                queue.extend(parent_declaration.extended_parents.iter().copied());
            }
        }
        ancestry
            .into_iter()
            .filter_map(|parent| {
                let sealed = self.graphs.get(&parent);
                if sealed.is_none() {
                    warn!(
                        graph = declaration.declaration.0,
                        parent = parent.0,
                        "extended parent graph was not resolved before its child"
                    );
                }
                sealed.map(|g| (parent, g))
            })
            .collect()
    }

    pub fn plan(&self, declaration: DeclarationId) -> Option<&ConstructionPlan> {
        self.plans.get(&declaration)
    }

    pub fn graph(&self, declaration: DeclarationId) -> Option<&BindingGraph> {
        self.graphs.get(&declaration)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Tear down the pass, yielding everything the host needs.
    pub fn finish(
        self,
    ) -> (
        FxHashMap<DeclarationId, ConstructionPlan>,
        Vec<Diagnostic>,
    ) {
        (self.plans, self.diagnostics)
    }
}
