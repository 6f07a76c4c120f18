//! Per-graph candidate binding assembly.
//!
//! `aggregate` walks everything visible to one dependency-graph declaration
//! and produces its candidate binding set, in deterministic order:
//!
//! 1. Creator-supplied bound instances
//! 2. Providers declared directly inside the graph
//! 3. Scope-matched contributions, in discovery order, after dedup,
//!    replacement, and exclusion
//!
//! Replacement is resolved before exclusion. The replaced-origin set is
//! collected from every scope-matched contribution at once: a contribution
//! that is itself replaced, or later excluded, still replaces its targets,
//! and exclusion never resurrects a replaced contribution. Origins named in
//! the graph declaration's `excludes` list are dropped afterwards.

use crate::contributions::{ResolvedContribution, map_key_type, resolve_contribution};
use crate::errors::AggregationError;
use indexmap::IndexSet;
use lattice_common::limits;
use lattice_model::{
    Binding, BuiltinTypes, ContributionKind, DeclarationId, DeclarationIndex, GraphDeclaration,
    MapKey, MultibindingKind, ProviderCallable, TypeInterner, TypeKey,
};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// The candidate binding set of one graph declaration, ready to be loaded
/// into a binding graph. Vec order is the stabilized discovery order.
#[derive(Clone, Debug, Default)]
pub struct CandidateBindings {
    /// Regular (non-multibinding) bindings.
    pub bindings: Vec<Binding>,
    /// `(container key, element binding)` set contributions.
    pub set_contributions: Vec<(TypeKey, Binding)>,
    /// `(container key, map key, element binding)` map contributions.
    pub map_contributions: Vec<(TypeKey, MapKey, Binding)>,
}

impl CandidateBindings {
    /// Pre-sized for a typical graph's candidate count.
    fn with_capacity() -> Self {
        Self {
            bindings: Vec::with_capacity(limits::CANDIDATE_SET_CAPACITY),
            set_contributions: Vec::new(),
            map_contributions: Vec::new(),
        }
    }
}

/// One surviving contribution, before emission.
enum Pending {
    Class(ResolvedContribution),
    Module {
        origin: DeclarationId,
        providers: Vec<ProviderCallable>,
    },
}

impl Pending {
    fn origin(&self) -> DeclarationId {
        match self {
            Pending::Class(resolved) => resolved.origin,
            Pending::Module { origin, .. } => *origin,
        }
    }
}

/// Build the candidate binding set for `graph`.
pub fn aggregate(
    graph: &GraphDeclaration,
    index: &DeclarationIndex,
    types: &TypeInterner,
    builtins: BuiltinTypes,
) -> Result<CandidateBindings, AggregationError> {
    let mut out = CandidateBindings::with_capacity();

    // 1. Creator-supplied instances.
    for parameter in &graph.bound_instances {
        if parameter.flags.is_binds_instance || parameter.flags.is_graph_instance {
            out.bindings.push(Binding::BoundInstance {
                origin: graph.declaration,
                parameter_name: parameter.name,
                type_key: parameter.contextual_key.key.clone(),
            });
        }
    }

    // 2. The graph's own providers.
    for provider in &graph.providers {
        push_provider(&mut out, provider, types, builtins)?;
    }

    // 3. Scope-matched contributions. Resolve all of them first — the
    //    replacement set must be computed over the full discovery list.
    let mut seen: IndexSet<(DeclarationId, TypeKey, ContributionKind)> = IndexSet::new();
    let mut pending: Vec<Pending> = Vec::new();
    let mut replaced: FxHashSet<DeclarationId> = FxHashSet::default();

    for contribution in index.contributions() {
        if !graph.declares_scope(&contribution.target_scope) {
            continue;
        }
        replaced.extend(contribution.replaces.iter().copied());

        match contribution.kind {
            ContributionKind::Supertype => {
                let Some(module) = index.module(contribution.origin) else {
                    warn!(origin = contribution.origin.0, "contributed module is not in the index");
                    continue;
                };
                // Dedup by origin alone; a module merged twice is one merge.
                let key = (
                    contribution.origin,
                    TypeKey::new(lattice_model::TypeId::INVALID),
                    ContributionKind::Supertype,
                );
                if seen.insert(key) {
                    pending.push(Pending::Module {
                        origin: contribution.origin,
                        providers: module.providers.clone(),
                    });
                }
            }
            _ => {
                let Some(class) = index.class(contribution.origin) else {
                    warn!(origin = contribution.origin.0, "contributing class is not in the index");
                    continue;
                };
                let resolved = resolve_contribution(contribution, class, types)?;
                // Identical duplicates collapse; same origin with a
                // different bound type stays distinct.
                let key = (resolved.origin, resolved.bound_key.clone(), resolved.kind);
                if seen.insert(key) {
                    pending.push(Pending::Class(resolved));
                }
            }
        }
    }

    // Replacement before exclusion.
    let excluded: FxHashSet<DeclarationId> = graph.excludes.iter().copied().collect();
    pending.retain(|p| !replaced.contains(&p.origin()));
    pending.retain(|p| !excluded.contains(&p.origin()));

    // 4. Emit surviving contributions in discovery order.
    let mut constructors_emitted: FxHashSet<TypeKey> = FxHashSet::default();
    for entry in pending {
        match entry {
            Pending::Module { providers, .. } => {
                for provider in &providers {
                    push_provider(&mut out, provider, types, builtins)?;
                }
            }
            Pending::Class(resolved) => match resolved.kind {
                ContributionKind::Binding => {
                    // Two contributions from one class share one constructor
                    // binding; each gets its own alias.
                    if constructors_emitted.insert(resolved.impl_key.clone()) {
                        out.bindings.push(resolved.constructor.clone());
                    }
                    out.bindings.push(Binding::Alias {
                        type_key: resolved.bound_key,
                        target: resolved.impl_key,
                        origin: resolved.origin,
                    });
                }
                ContributionKind::IntoSet => {
                    let container = TypeKey {
                        ty: types.generic(builtins.set, [resolved.bound_key.ty]),
                        qualifier: resolved.bound_key.qualifier.clone(),
                    };
                    out.set_contributions.push((container, resolved.constructor));
                }
                ContributionKind::IntoMap => {
                    // resolve_contribution guarantees a key for into-map.
                    let map_key = match resolved.map_key.clone() {
                        Some(key) => key,
                        None => continue,
                    };
                    let key_ty = map_key_type(&map_key, types, builtins);
                    let container = TypeKey {
                        ty: types.generic(builtins.map, [key_ty, resolved.bound_key.ty]),
                        qualifier: resolved.bound_key.qualifier.clone(),
                    };
                    out.map_contributions
                        .push((container, map_key, resolved.constructor));
                }
                ContributionKind::Supertype => unreachable!("handled above"),
            },
        }
    }

    debug!(
        graph = graph.declaration.0,
        bindings = out.bindings.len(),
        set_elements = out.set_contributions.len(),
        map_elements = out.map_contributions.len(),
        "aggregated candidate bindings"
    );
    Ok(out)
}

/// Register one provider callable: either a direct binding for its return
/// key or an element contribution into a multibinding container.
fn push_provider(
    out: &mut CandidateBindings,
    provider: &ProviderCallable,
    types: &TypeInterner,
    builtins: BuiltinTypes,
) -> Result<(), AggregationError> {
    let binding = Binding::Provided {
        owner: provider.owner,
        callable_name: provider.name,
        parameters: provider.parameters.clone(),
        contextual_key: provider.return_key.clone(),
        scope: provider.scope.clone(),
        is_property: provider.is_property,
    };
    match provider.contributes_into {
        None => out.bindings.push(binding),
        Some(MultibindingKind::Set) => {
            let container = TypeKey {
                ty: types.generic(builtins.set, [provider.return_key.key.ty]),
                qualifier: provider.return_key.key.qualifier.clone(),
            };
            out.set_contributions.push((container, binding));
        }
        Some(MultibindingKind::Map) => {
            let map_key = provider
                .map_key
                .clone()
                .ok_or(AggregationError::MissingMapKey {
                    origin: provider.declaration,
                })?;
            let key_ty = map_key_type(&map_key, types, builtins);
            let container = TypeKey {
                ty: types.generic(builtins.map, [key_ty, provider.return_key.key.ty]),
                qualifier: provider.return_key.key.qualifier.clone(),
            };
            out.map_contributions.push((container, map_key, binding));
        }
    }
    Ok(())
}
