//! Per-contribution resolution: bound type, qualifier, and map key.
//!
//! Argument resolution follows one documented precedence (rather than an ad
//! hoc fallback chain):
//!
//! - **Bound type**: explicit `binding<T>()` argument → the sole declared
//!   supertype → `AmbiguousBoundType` error.
//! - **Qualifier**: explicit qualifier on the bound-type expression →
//!   qualifier on the contributing class → none. The `ignore_qualifier`
//!   interop flag suppresses both.
//! - **Map key** (into-map only): key on the bound-type expression → key on
//!   the contributing class → `MissingMapKey` error.
//!
//! When a generic class is bound to a concrete supertype instance (e.g.
//! `JsonHandler<T> : Handler<T>` contributed as `Handler<String>`), the
//! type-parameter mapping is derived by structural matching and applied
//! functionally to the class's own type and constructor parameters.

use crate::errors::AggregationError;
use lattice_model::{
    AnnotationValue, Binding, BuiltinTypes, ContributionDeclaration, ContributionKind,
    InjectableClass, MapKey, Qualifier, TypeId, TypeInterner, TypeKey, match_type_params,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use lattice_model::DeclarationId;

/// A class contribution with its arguments fully resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedContribution {
    pub origin: DeclarationId,
    pub kind: ContributionKind,
    /// The key the contribution is registered under (bound type plus
    /// effective qualifier). For into-set/into-map this is the element key
    /// the container accumulates.
    pub bound_key: TypeKey,
    /// Effective map key (into-map only).
    pub map_key: Option<MapKey>,
    pub replaces: SmallVec<[DeclarationId; 2]>,
    /// The implementation key (the class's own type, substituted).
    pub impl_key: TypeKey,
    /// Constructor-injection binding for the implementation.
    pub constructor: Binding,
}

/// Resolve a class contribution's bound type, qualifier, and map key.
pub fn resolve_contribution(
    contribution: &ContributionDeclaration,
    class: &InjectableClass,
    types: &TypeInterner,
) -> Result<ResolvedContribution, AggregationError> {
    debug_assert!(contribution.kind != ContributionKind::Supertype);

    let bound_ty = resolve_bound_type(contribution, class)?;

    // Match the chosen bound type against the declared supertypes (or the
    // class's own type) to derive the type-parameter substitution.
    let mut mapping = FxHashMap::default();
    let matched = std::iter::once(class.key_type)
        .chain(class.supertypes.iter().copied())
        .any(|declared| {
            let mut candidate = FxHashMap::default();
            if match_type_params(types, declared, bound_ty, &mut candidate) {
                mapping = candidate;
                true
            } else {
                false
            }
        });
    if !matched {
        trace!(
            origin = contribution.origin.0,
            "bound type does not structurally match any declared supertype"
        );
    }

    let impl_ty = types.substitute(class.key_type, &mapping);
    let impl_key = TypeKey::new(impl_ty);

    let qualifier = effective_qualifier(contribution, class);
    let bound_key = TypeKey {
        ty: bound_ty,
        qualifier,
    };

    let map_key = match contribution.kind {
        ContributionKind::IntoMap => Some(effective_map_key(contribution, class)?),
        _ => None,
    };

    let constructor = Binding::ConstructorInjected {
        class: class.declaration,
        type_key: impl_key.clone(),
        parameters: class.parameters.substituted(types, &mapping),
        scope: class.scope.clone(),
    };

    Ok(ResolvedContribution {
        origin: contribution.origin,
        kind: contribution.kind,
        bound_key,
        map_key,
        replaces: contribution.replaces.clone(),
        impl_key,
        constructor,
    })
}

fn resolve_bound_type(
    contribution: &ContributionDeclaration,
    class: &InjectableClass,
) -> Result<TypeId, AggregationError> {
    if let Some(explicit) = contribution.explicit_bound_type {
        return Ok(explicit);
    }
    match class.supertypes.as_slice() {
        [sole] => Ok(*sole),
        supertypes => Err(AggregationError::AmbiguousBoundType {
            origin: contribution.origin,
            supertype_count: supertypes.len(),
        }),
    }
}

fn effective_qualifier(
    contribution: &ContributionDeclaration,
    class: &InjectableClass,
) -> Option<Qualifier> {
    if contribution.ignore_qualifier {
        return None;
    }
    contribution
        .explicit_qualifier
        .clone()
        .or_else(|| class.qualifier.clone())
}

fn effective_map_key(
    contribution: &ContributionDeclaration,
    class: &InjectableClass,
) -> Result<MapKey, AggregationError> {
    contribution
        .explicit_map_key
        .clone()
        .or_else(|| class.map_key.clone())
        .ok_or(AggregationError::MissingMapKey {
            origin: contribution.origin,
        })
}

/// Derive the key type of a `Map<K, V>` container from its map-key
/// annotation's first argument: string literals key by `String`, int
/// literals by `Int`, bool literals by `Boolean`, class literals by the
/// named class, and enum entries (or argument-less keys) by the annotation
/// class itself.
pub fn map_key_type(map_key: &MapKey, types: &TypeInterner, builtins: BuiltinTypes) -> TypeId {
    match map_key.0.arguments.first().map(|(_, value)| value) {
        Some(AnnotationValue::Str(_)) => types.named(builtins.string),
        Some(AnnotationValue::Int(_)) => types.named(builtins.int),
        Some(AnnotationValue::Bool(_)) => types.named(builtins.boolean),
        Some(AnnotationValue::Type(ty)) => *ty,
        Some(AnnotationValue::EnumEntry(_)) | None => types.named(map_key.0.class_name),
    }
}
