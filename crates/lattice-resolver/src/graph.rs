//! The binding graph: what can satisfy each key in one compile unit.
//!
//! One `BindingGraph` exists per dependency-graph declaration. It is
//! write-once-then-read: every `put`/`contribute` happens while loading the
//! aggregator's candidate set, every `lookup` happens during resolution.
//! `seal()` flips the graph read-only; writes after sealing are a bug and
//! panic in debug builds.

use crate::errors::{ResolutionError, ResolutionErrorKind};
use indexmap::IndexMap;
use lattice_aggregator::CandidateBindings;
use lattice_model::{Binding, DeclarationId, MapKey, MultibindingKind, TypeKey};
use tracing::trace;

/// Accumulating element list for one `Set<T>` / `Map<K, V>` container key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultibindingSlot {
    pub kind: MultibindingKind,
    /// Elements in aggregation discovery order; the map key is present for
    /// map containers only.
    pub elements: Vec<(Option<MapKey>, Binding)>,
}

#[derive(Debug)]
pub struct BindingGraph {
    declaration: DeclarationId,
    bindings: IndexMap<TypeKey, Binding>,
    multibindings: IndexMap<TypeKey, MultibindingSlot>,
    sealed: bool,
}

impl BindingGraph {
    pub fn new(declaration: DeclarationId) -> Self {
        Self {
            declaration,
            bindings: IndexMap::new(),
            multibindings: IndexMap::new(),
            sealed: false,
        }
    }

    /// The graph declaration this binding set belongs to.
    pub fn declaration(&self) -> DeclarationId {
        self.declaration
    }

    /// Register a non-multibinding. Identical duplicate claims collapse;
    /// a different binding claiming an already-taken key is an error.
    pub fn put(&mut self, binding: Binding) -> Result<(), ResolutionError> {
        debug_assert!(!self.sealed, "put on a sealed binding graph");
        let key = binding.type_key().clone();
        if let Some(existing) = self.bindings.get(&key) {
            if *existing == binding {
                return Ok(());
            }
            return Err(self.error(ResolutionErrorKind::DuplicateBinding {
                type_key: key,
                existing: existing.origin(),
                incoming: binding.origin(),
            }));
        }
        trace!(key = ?key, kind = binding.kind_name(), "registered binding");
        self.bindings.insert(key, binding);
        Ok(())
    }

    /// Append an element to the container accumulating under `container`.
    pub fn contribute(
        &mut self,
        container: TypeKey,
        kind: MultibindingKind,
        map_key: Option<MapKey>,
        element: Binding,
    ) -> Result<(), ResolutionError> {
        debug_assert!(!self.sealed, "contribute on a sealed binding graph");
        let slot = self
            .multibindings
            .entry(container.clone())
            .or_insert_with(|| MultibindingSlot {
                kind,
                elements: Vec::new(),
            });
        debug_assert_eq!(slot.kind, kind, "container kind changed between contributions");

        if let Some(ref incoming_key) = map_key {
            let clash = slot
                .elements
                .iter()
                .find(|(existing_key, _)| existing_key.as_ref() == Some(incoming_key));
            if let Some((_, existing)) = clash {
                return Err(ResolutionError {
                    graph: self.declaration,
                    kind: ResolutionErrorKind::DuplicateMapKey {
                        container,
                        map_key: incoming_key.clone(),
                        existing: existing.origin(),
                        incoming: element.origin(),
                    },
                    stack: Vec::new(),
                });
            }
        }
        slot.elements.push((map_key, element));
        Ok(())
    }

    /// Load an aggregated candidate set.
    pub fn load(&mut self, candidates: CandidateBindings) -> Result<(), ResolutionError> {
        for binding in candidates.bindings {
            self.put(binding)?;
        }
        for (container, element) in candidates.set_contributions {
            self.contribute(container, MultibindingKind::Set, None, element)?;
        }
        for (container, map_key, element) in candidates.map_contributions {
            self.contribute(container, MultibindingKind::Map, Some(map_key), element)?;
        }
        Ok(())
    }

    pub fn lookup(&self, key: &TypeKey) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub fn multibinding(&self, key: &TypeKey) -> Option<&MultibindingSlot> {
        self.multibindings.get(key)
    }

    /// Flip the graph read-only. Aggregation is complete; only lookups
    /// remain.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.multibindings.is_empty()
    }

    fn error(&self, kind: ResolutionErrorKind) -> ResolutionError {
        ResolutionError {
            graph: self.declaration,
            kind,
            stack: Vec::new(),
        }
    }
}
