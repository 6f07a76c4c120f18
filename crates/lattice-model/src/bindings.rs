//! The binding variant set.
//!
//! Every way a `TypeKey` can be satisfied is one variant of the closed
//! [`Binding`] enum; resolution logic switches on the tag. Each binding
//! satisfies exactly one `TypeKey` (multibinding container keys are distinct
//! from their element keys) and optionally carries a scope restricting it to
//! single-instance-per-scope semantics.

use crate::annotations::Scope;
use crate::declarations::DeclarationId;
use crate::keys::{ContextualTypeKey, TypeKey};
use crate::parameters::Parameters;
use lattice_common::interner::Atom;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MultibindingKind {
    Set,
    Map,
}

/// A resolved strategy for producing an instance of a `TypeKey`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Constructor injection: instantiate `class` with resolved parameters.
    ConstructorInjected {
        class: DeclarationId,
        type_key: TypeKey,
        parameters: Parameters,
        scope: Option<Scope>,
    },
    /// Provider callable declared on a graph or contributed module.
    Provided {
        owner: DeclarationId,
        callable_name: Atom,
        parameters: Parameters,
        contextual_key: ContextualTypeKey,
        scope: Option<Scope>,
        is_property: bool,
    },
    /// Zero-cost alias from a bound supertype key to the implementation key.
    Alias {
        type_key: TypeKey,
        target: TypeKey,
        origin: DeclarationId,
    },
    /// Synthetic collect binding for a `Set<T>` / `Map<K, V>` container,
    /// depending on every contributed element in discovery order.
    Multibinding {
        type_key: TypeKey,
        kind: MultibindingKind,
        elements: Vec<TypeKey>,
    },
    /// Creator-supplied value bound at graph construction time.
    BoundInstance {
        origin: DeclarationId,
        parameter_name: Atom,
        type_key: TypeKey,
    },
    /// A value produced by another (parent or included) graph instance.
    GraphDependency {
        graph: DeclarationId,
        type_key: TypeKey,
    },
    /// A defaulted request with no binding; the call site's default applies.
    Absent { type_key: TypeKey },
}

impl Binding {
    /// The one key this binding satisfies.
    pub fn type_key(&self) -> &TypeKey {
        match self {
            Binding::ConstructorInjected { type_key, .. }
            | Binding::Alias { type_key, .. }
            | Binding::Multibinding { type_key, .. }
            | Binding::BoundInstance { type_key, .. }
            | Binding::GraphDependency { type_key, .. }
            | Binding::Absent { type_key } => type_key,
            Binding::Provided { contextual_key, .. } => &contextual_key.key,
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Binding::ConstructorInjected { scope, .. } | Binding::Provided { scope, .. } => {
                scope.as_ref()
            }
            _ => None,
        }
    }

    /// The requests that must resolve before this binding can be
    /// constructed. Assisted parameters are excluded (call-site supplied).
    pub fn dependencies(&self) -> Vec<ContextualTypeKey> {
        match self {
            Binding::ConstructorInjected { parameters, .. }
            | Binding::Provided { parameters, .. } => parameters
                .graph_dependencies()
                .map(|p| p.contextual_key.clone())
                .collect(),
            Binding::Alias { target, .. } => {
                vec![ContextualTypeKey::plain(target.clone())]
            }
            Binding::Multibinding { elements, .. } => elements
                .iter()
                .map(|key| ContextualTypeKey::plain(key.clone()))
                .collect(),
            Binding::BoundInstance { .. }
            | Binding::GraphDependency { .. }
            | Binding::Absent { .. } => Vec::new(),
        }
    }

    /// The parameter aggregate codegen needs, if this binding runs user code.
    pub fn parameters(&self) -> Option<&Parameters> {
        match self {
            Binding::ConstructorInjected { parameters, .. }
            | Binding::Provided { parameters, .. } => Some(parameters),
            _ => None,
        }
    }

    /// Declaration identity for diagnostics, when one exists.
    pub fn origin(&self) -> Option<DeclarationId> {
        match self {
            Binding::ConstructorInjected { class, .. } => Some(*class),
            Binding::Provided { owner, .. } => Some(*owner),
            Binding::Alias { origin, .. } => Some(*origin),
            Binding::BoundInstance { origin, .. } => Some(*origin),
            Binding::GraphDependency { graph, .. } => Some(*graph),
            Binding::Multibinding { .. } | Binding::Absent { .. } => None,
        }
    }

    /// Short tag for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Binding::ConstructorInjected { .. } => "constructor",
            Binding::Provided { .. } => "provides",
            Binding::Alias { .. } => "alias",
            Binding::Multibinding { .. } => "multibinding",
            Binding::BoundInstance { .. } => "bound-instance",
            Binding::GraphDependency { .. } => "graph-dependency",
            Binding::Absent { .. } => "absent",
        }
    }
}
