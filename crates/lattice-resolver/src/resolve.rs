//! The graph resolver: depth-first closure over a sealed binding graph.
//!
//! For each accessor root the resolver looks up the binding for the plain
//! key (wrapper state never changes binding identity), descends into its
//! parameter dependencies, and appends the binding to the construction plan
//! once every dependency is placed — post-order, so parameters precede
//! dependents.
//!
//! Per-binding state within one pass is `UNSEEN → IN_PROGRESS → RESOLVED`
//! or `UNSEEN → IN_PROGRESS → FAILED`. A RESOLVED revisit is a memo hit. An
//! IN_PROGRESS revisit is a cycle: permitted when at least one edge from the
//! revisited binding back to itself is Provider- or Lazy-wrapped (the
//! deferred indirection breaks eager construction order), otherwise a
//! `DependencyCycle` error. A FAILED binding never gets a second chance;
//! failure is fatal to the whole graph declaration.
//!
//! Lookup order per key: local graph, then extended parent graphs in
//! declaration order (a hit becomes a `GraphDependency` plan entry, not a
//! re-resolution of the parent), then multibinding containers, then the
//! request's default value, then `MissingBinding`.

use crate::errors::{ResolutionError, ResolutionErrorKind};
use crate::graph::BindingGraph;
use crate::plan::{ConstructionPlan, PlanEntry};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::stack::{BindingStack, Requester};
use lattice_model::{
    Accessor, Binding, ContextualTypeKey, DeclarationId, GraphDeclaration, Scope, TypeKey,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ResolveState {
    InProgress,
    Resolved,
    Failed,
}

/// One level of the active descent: the binding being resolved and the
/// request that led into it.
struct Frame {
    key: TypeKey,
    via: ContextualTypeKey,
}

/// Resolves one graph declaration's accessor roots against its sealed
/// binding graph, producing a construction plan or the first fatal error.
pub struct GraphResolver<'a> {
    graph: &'a BindingGraph,
    declaration: DeclarationId,
    scopes: SmallVec<[Scope; 2]>,
    parents: Vec<(DeclarationId, &'a BindingGraph)>,
    states: FxHashMap<TypeKey, ResolveState>,
    in_progress: Vec<Frame>,
    stack: BindingStack,
    guard: RecursionGuard<TypeKey>,
    plan: ConstructionPlan,
}

impl<'a> GraphResolver<'a> {
    pub fn new(graph: &'a BindingGraph, declaration: &GraphDeclaration) -> Self {
        Self::with_parents(graph, declaration, Vec::new())
    }

    /// A resolver that consults extended parent graphs, in declaration
    /// order, before declaring a binding missing.
    pub fn with_parents(
        graph: &'a BindingGraph,
        declaration: &GraphDeclaration,
        parents: Vec<(DeclarationId, &'a BindingGraph)>,
    ) -> Self {
        debug_assert!(graph.is_sealed(), "resolving an unsealed binding graph");
        Self {
            graph,
            declaration: declaration.declaration,
            scopes: declaration.scopes().cloned().collect(),
            parents,
            states: FxHashMap::default(),
            in_progress: Vec::new(),
            stack: BindingStack::new(),
            guard: RecursionGuard::with_profile(RecursionProfile::GraphResolution),
            plan: ConstructionPlan::new(),
        }
    }

    /// Resolve every accessor root, in declaration order.
    pub fn resolve(mut self, accessors: &[Accessor]) -> Result<ConstructionPlan, ResolutionError> {
        debug!(
            graph = self.declaration.0,
            roots = accessors.len(),
            bindings = self.graph.len(),
            "resolving graph"
        );
        for accessor in accessors {
            self.resolve_request(&accessor.key, Requester::Graph(self.declaration))?;
        }
        debug_assert!(self.stack.is_empty());
        debug_assert!(self.in_progress.is_empty());
        debug!(
            graph = self.declaration.0,
            entries = self.plan.len(),
            slots = self.plan.singleton_slots.len(),
            "resolution complete"
        );
        Ok(self.plan)
    }

    fn resolve_request(
        &mut self,
        request: &ContextualTypeKey,
        requester: Requester,
    ) -> Result<(), ResolutionError> {
        // Push/pop mirror the recursion exactly so an error snapshot shows
        // the active chain.
        self.stack.push(requester, request.clone());
        let result = self.resolve_key(request);
        self.stack.pop();
        result
    }

    fn resolve_key(&mut self, request: &ContextualTypeKey) -> Result<(), ResolutionError> {
        let key = request.key.clone();
        match self.states.get(&key) {
            Some(ResolveState::Resolved) => return Ok(()),
            Some(ResolveState::InProgress) => return self.check_cycle(&key, request),
            Some(ResolveState::Failed) | None => {
                // FAILED is terminal for the pass; the first error aborts
                // resolution, so a failed binding is never revisited.
                debug_assert!(!matches!(
                    self.states.get(&key),
                    Some(ResolveState::Failed)
                ));
            }
        }

        match self.guard.enter(key.clone()) {
            RecursionResult::Entered => {}
            // States gate revisits, so the guard only trips on limits.
            _ => return Err(self.runaway(&key)),
        }
        self.states.insert(key.clone(), ResolveState::InProgress);
        self.in_progress.push(Frame {
            key: key.clone(),
            via: request.clone(),
        });

        let result = self.resolve_binding(&key, request);

        self.in_progress.pop();
        self.guard.leave(&key);
        match result {
            Ok(()) => {
                self.states.insert(key, ResolveState::Resolved);
                Ok(())
            }
            Err(error) => {
                self.states.insert(key, ResolveState::Failed);
                Err(error)
            }
        }
    }

    fn resolve_binding(
        &mut self,
        key: &TypeKey,
        request: &ContextualTypeKey,
    ) -> Result<(), ResolutionError> {
        // `graph` is a shared borrow independent of `self`, so bindings can
        // be walked while the resolver mutates its own state.
        let graph = self.graph;

        if let Some(binding) = graph.lookup(key) {
            trace!(key = ?key, kind = binding.kind_name(), "resolving binding");
            self.check_scope(key, binding)?;
            for dependency in binding.dependencies() {
                self.resolve_request(&dependency, Requester::Binding(key.clone()))?;
            }
            self.emit(key.clone(), binding.clone());
            return Ok(());
        }

        if let Some(parent) = self.parent_owning(key) {
            trace!(key = ?key, parent = parent.0, "satisfied by extended parent graph");
            self.emit(
                key.clone(),
                Binding::GraphDependency {
                    graph: parent,
                    type_key: key.clone(),
                },
            );
            return Ok(());
        }

        if let Some(slot) = graph.multibinding(key) {
            let mut element_keys = Vec::with_capacity(slot.elements.len());
            for (_, element) in &slot.elements {
                let element_key = element.type_key().clone();
                self.check_scope(&element_key, element)?;
                for dependency in element.dependencies() {
                    self.resolve_request(&dependency, Requester::Binding(element_key.clone()))?;
                }
                // Elements are constructed per container; they are not
                // registered under their own keys.
                self.emit(element_key.clone(), element.clone());
                element_keys.push(element_key);
            }
            self.emit(
                key.clone(),
                Binding::Multibinding {
                    type_key: key.clone(),
                    kind: slot.kind,
                    elements: element_keys,
                },
            );
            return Ok(());
        }

        if request.has_default {
            // The call site's default value applies; codegen omits the
            // argument.
            self.emit(key.clone(), Binding::Absent {
                type_key: key.clone(),
            });
            return Ok(());
        }

        Err(self.error(ResolutionErrorKind::MissingBinding {
            requested: request.clone(),
        }))
    }

    /// An IN_PROGRESS revisit. Permitted when at least one edge of the
    /// cycle — the requests leading from the revisited binding back around,
    /// plus the closing request itself — defers construction through a
    /// Provider or Lazy wrapper.
    fn check_cycle(
        &mut self,
        key: &TypeKey,
        request: &ContextualTypeKey,
    ) -> Result<(), ResolutionError> {
        let position = match self.in_progress.iter().position(|frame| &frame.key == key) {
            Some(position) => position,
            None => {
                debug_assert!(false, "IN_PROGRESS binding missing from the active descent");
                return Ok(());
            }
        };
        let deferred = request.is_deferrable()
            || self.in_progress[position + 1..]
                .iter()
                .any(|frame| frame.via.is_deferrable());
        if deferred {
            trace!(key = ?key, "cycle broken by deferred edge");
            return Ok(());
        }
        let mut cycle: Vec<TypeKey> = self.in_progress[position..]
            .iter()
            .map(|frame| frame.key.clone())
            .collect();
        cycle.push(key.clone());
        Err(self.error(ResolutionErrorKind::DependencyCycle { cycle }))
    }

    fn check_scope(&self, key: &TypeKey, binding: &Binding) -> Result<(), ResolutionError> {
        if let Some(scope) = binding.scope() {
            if !self.scopes.iter().any(|declared| declared == scope) {
                return Err(self.error(ResolutionErrorKind::IncompatibleScope {
                    type_key: key.clone(),
                    scope: scope.clone(),
                }));
            }
        }
        Ok(())
    }

    fn parent_owning(&self, key: &TypeKey) -> Option<DeclarationId> {
        self.parents
            .iter()
            .find(|(_, parent)| parent.lookup(key).is_some() || parent.multibinding(key).is_some())
            .map(|(id, _)| *id)
    }

    fn emit(&mut self, key: TypeKey, binding: Binding) {
        let scoped = binding.scope().is_some();
        self.plan.push(PlanEntry {
            type_key: key.clone(),
            binding,
        });
        if scoped {
            self.plan.assign_slot(key);
        }
    }

    fn error(&self, kind: ResolutionErrorKind) -> ResolutionError {
        ResolutionError {
            graph: self.declaration,
            kind,
            stack: self.stack.snapshot(),
        }
    }

    /// Depth or iteration blowout: report the active chain as a cycle.
    fn runaway(&self, key: &TypeKey) -> ResolutionError {
        let mut cycle: Vec<TypeKey> = self
            .in_progress
            .iter()
            .map(|frame| frame.key.clone())
            .collect();
        cycle.push(key.clone());
        self.error(ResolutionErrorKind::DependencyCycle { cycle })
    }
}
