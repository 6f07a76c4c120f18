//! Callable parameter model.
//!
//! Every binding that runs user code (a constructor injection or a provider
//! callable) owns exactly one [`Parameters`] aggregate: optional instance
//! receiver, optional extension receiver, and the ordered value parameters.
//! Equality and ordering are structural and deterministic — instance first,
//! then extension receiver, then declaration order — so two resolution runs
//! over the same declarations produce identical plans.

use crate::intern::TypeInterner;
use crate::keys::{ContextualTypeKey, TypeKey};
use lattice_common::interner::Atom;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::intern::TypeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterKind {
    Instance,
    ExtensionReceiver,
    Value,
}

/// Behavior flags a front-end resolves from parameter annotations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterFlags {
    /// Supplied by the call site through an assisted factory, not the graph.
    pub is_assisted: bool,
    /// A graph instance handed in at graph construction time.
    pub is_graph_instance: bool,
    /// A creator-supplied bound instance.
    pub is_binds_instance: bool,
    /// Marks an included dependency graph parameter.
    pub is_includes: bool,
    /// Marks an extended parent graph parameter.
    pub is_extends: bool,
    /// The parameter declares a default value.
    pub has_default: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub name: Atom,
    pub contextual_key: ContextualTypeKey,
    pub flags: ParameterFlags,
    /// Distinguishes multiple assisted parameters of the same type.
    pub assisted_identifier: Option<Atom>,
}

impl Parameter {
    pub fn value(name: Atom, contextual_key: ContextualTypeKey) -> Self {
        Self {
            kind: ParameterKind::Value,
            name,
            contextual_key,
            flags: ParameterFlags::default(),
            assisted_identifier: None,
        }
    }

    pub fn with_flags(mut self, flags: ParameterFlags) -> Self {
        self.flags = flags;
        // Keep the flag and the key's default marker in agreement.
        self.flags.has_default |= self.contextual_key.has_default;
        self
    }

    pub fn assisted(mut self, identifier: Option<Atom>) -> Self {
        self.flags.is_assisted = true;
        self.assisted_identifier = identifier;
        self
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.contextual_key.key
    }
}

/// Identity of an assisted parameter: `(TypeKey, assisted identifier)`.
///
/// Two assisted parameters of the same type are distinct when their
/// identifiers differ, and collide when they do not — the front-end reports
/// that collision before resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssistedParameterKey {
    pub type_key: TypeKey,
    pub assisted_identifier: Option<Atom>,
}

impl AssistedParameterKey {
    pub fn for_parameter(parameter: &Parameter) -> Self {
        Self {
            type_key: parameter.contextual_key.key.clone(),
            assisted_identifier: parameter.assisted_identifier,
        }
    }
}

/// The full parameter aggregate of one callable.
///
/// The derived `Ord` is the canonical comparator: instance receiver, then
/// extension receiver, then value parameters in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameters {
    pub instance: Option<Parameter>,
    pub extension_receiver: Option<Parameter>,
    pub value_parameters: SmallVec<[Parameter; 4]>,
}

impl Parameters {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(value_parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            value_parameters: value_parameters.into_iter().collect(),
            ..Self::default()
        }
    }

    /// All parameters in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.instance
            .iter()
            .chain(self.extension_receiver.iter())
            .chain(self.value_parameters.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
            && self.extension_receiver.is_none()
            && self.value_parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        usize::from(self.instance.is_some())
            + usize::from(self.extension_receiver.is_some())
            + self.value_parameters.len()
    }

    /// The requests the graph must satisfy for this callable.
    ///
    /// Assisted parameters are excluded — the call site supplies them.
    /// Defaulted parameters are included; a defaulted request with no
    /// binding resolves to an absent binding rather than an error.
    pub fn graph_dependencies(&self) -> impl Iterator<Item = &Parameter> {
        self.iter().filter(|p| !p.flags.is_assisted)
    }

    /// Assisted parameters with their identities, in declaration order.
    pub fn assisted_keys(&self) -> Vec<AssistedParameterKey> {
        self.iter()
            .filter(|p| p.flags.is_assisted)
            .map(AssistedParameterKey::for_parameter)
            .collect()
    }

    /// Rebuild with a type-parameter substitution applied to every
    /// parameter's key. Used when a callable is inherited across a generic
    /// hierarchy and its types must be remapped to the target class.
    pub fn substituted(
        &self,
        types: &TypeInterner,
        mapping: &FxHashMap<TypeId, TypeId>,
    ) -> Parameters {
        let remap = |p: &Parameter| {
            let mut p = p.clone();
            p.contextual_key.key.ty = types.substitute(p.contextual_key.key.ty, mapping);
            p
        };
        Parameters {
            instance: self.instance.as_ref().map(remap),
            extension_receiver: self.extension_receiver.as_ref().map(remap),
            value_parameters: self.value_parameters.iter().map(remap).collect(),
        }
    }
}
