//! Binding keys.
//!
//! A [`TypeKey`] is the canonical identity a binding satisfies: underlying
//! type plus optional qualifier. A [`ContextualTypeKey`] is a `TypeKey` as
//! requested at a particular use site, carrying the Provider/Lazy wrapper
//! state and whether the requesting parameter has a default value. Wrapper
//! state never participates in binding identity — a request for
//! `Provider<Foo>` is satisfied by the binding for `Foo` — but it decides
//! whether an edge can break a dependency cycle.

use crate::annotations::Qualifier;
use crate::intern::{TypeData, TypeId, TypeInterner};
use lattice_common::interner::Interner;

/// Canonical `(type, qualifier)` binding identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    pub ty: TypeId,
    pub qualifier: Option<Qualifier>,
}

impl TypeKey {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            qualifier: None,
        }
    }

    pub fn qualified(ty: TypeId, qualifier: Qualifier) -> Self {
        Self {
            ty,
            qualifier: Some(qualifier),
        }
    }

    /// Render for diagnostics, e.g. `@Named("api") HttpClient`.
    pub fn render(&self, types: &TypeInterner, names: &Interner) -> String {
        let ty = render_type(types, names, self.ty);
        match &self.qualifier {
            Some(qualifier) => format!("{} {ty}", qualifier.render(names)),
            None => ty,
        }
    }
}

/// A `TypeKey` as requested at one use site.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextualTypeKey {
    pub key: TypeKey,
    pub wrapped_in_provider: bool,
    pub wrapped_in_lazy: bool,
    /// `Provider<Lazy<T>>` — a provider of cached suppliers.
    pub lazy_wrapped_in_provider: bool,
    /// The requesting parameter declares a default value.
    pub has_default: bool,
}

impl ContextualTypeKey {
    /// An eager, non-defaulted request.
    pub fn plain(key: TypeKey) -> Self {
        Self {
            key,
            wrapped_in_provider: false,
            wrapped_in_lazy: false,
            lazy_wrapped_in_provider: false,
            has_default: false,
        }
    }

    pub fn provider(key: TypeKey) -> Self {
        Self {
            wrapped_in_provider: true,
            ..Self::plain(key)
        }
    }

    pub fn lazy(key: TypeKey) -> Self {
        Self {
            wrapped_in_lazy: true,
            ..Self::plain(key)
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// True when this request is satisfied through a deferred indirection,
    /// which makes the edge eligible to break a dependency cycle.
    pub fn is_deferrable(&self) -> bool {
        self.wrapped_in_provider || self.wrapped_in_lazy || self.lazy_wrapped_in_provider
    }

    /// Render for diagnostics with wrapper state, e.g. `Provider<Foo>`.
    pub fn render(&self, types: &TypeInterner, names: &Interner) -> String {
        let inner = self.key.render(types, names);
        if self.lazy_wrapped_in_provider {
            format!("Provider<Lazy<{inner}>>")
        } else if self.wrapped_in_provider {
            format!("Provider<{inner}>")
        } else if self.wrapped_in_lazy {
            format!("Lazy<{inner}>")
        } else {
            inner
        }
    }
}

/// Render an interned type reference, e.g. `Map<String, Plugin>`.
pub fn render_type(types: &TypeInterner, names: &Interner, ty: TypeId) -> String {
    match types.get(ty) {
        Some(TypeData::Named { name, args }) => {
            let base = names.display(name).to_string();
            if args.is_empty() {
                base
            } else {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|&arg| render_type(types, names, arg))
                    .collect();
                format!("{base}<{}>", rendered.join(", "))
            }
        }
        Some(TypeData::Param { name, .. }) => names.display(name).to_string(),
        None => format!("<type #{}>", ty.0),
    }
}
