//! Interned type references.
//!
//! Type references are interned so that `TypeKey` comparison and hashing —
//! which happen on every resolver step — reduce to 32-bit id comparisons.
//! The interner is append-only and shareable: interning takes `&self`, so a
//! `TypeInterner` can be populated by the front-end and then consulted
//! immutably during aggregation and resolution.
//!
//! Substitution is functional: [`TypeInterner::substitute`] maps a type
//! through an explicit `TypeId → TypeId` mapping and interns the result,
//! never rewriting stored data in place.

use dashmap::DashMap;
use lattice_common::interner::{Atom, Interner};
use lattice_common::limits;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Interned type reference identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel value for "no type". Never produced by interning.
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

/// Structural data of a type reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Named nominal type with ordered type arguments, e.g. `Repo<User>`.
    Named {
        name: Atom,
        args: SmallVec<[TypeId; 2]>,
    },
    /// Reference to a type parameter of a generic declaration, e.g. the `T`
    /// of `class Cache<T>`. `owner` is the declaring class's name.
    Param { owner: Atom, name: Atom },
}

/// Append-only type interner.
///
/// Both directions of the mapping are kept so equality is O(1) and
/// structural inspection (argument extraction, substitution) is cheap.
#[derive(Debug, Default)]
pub struct TypeInterner {
    ids: DashMap<TypeData, TypeId>,
    data: DashMap<u32, TypeData>,
    next_id: AtomicU32,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.ids.get(&data) {
            return *id;
        }
        let id = *self
            .ids
            .entry(data.clone())
            .or_insert_with(|| TypeId(self.next_id.fetch_add(1, Ordering::Relaxed)));
        self.data.entry(id.0).or_insert(data);
        trace!(type_id = id.0, "interned type");
        id
    }

    /// Intern a non-generic named type.
    pub fn named(&self, name: Atom) -> TypeId {
        self.intern(TypeData::Named {
            name,
            args: SmallVec::new(),
        })
    }

    /// Intern a generic named type instance.
    pub fn generic(&self, name: Atom, args: impl IntoIterator<Item = TypeId>) -> TypeId {
        self.intern(TypeData::Named {
            name,
            args: args.into_iter().collect(),
        })
    }

    /// Intern a type-parameter reference.
    pub fn param(&self, owner: Atom, name: Atom) -> TypeId {
        self.intern(TypeData::Param { owner, name })
    }

    pub fn get(&self, id: TypeId) -> Option<TypeData> {
        self.data.get(&id.0).map(|d| d.clone())
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.data.contains_key(&id.0)
    }

    /// Apply a substitution mapping to `id`, interning the result.
    ///
    /// Unmapped type-parameter references are left as-is; named types are
    /// rebuilt with substituted arguments. Substitution never mutates
    /// existing interned data.
    pub fn substitute(&self, id: TypeId, mapping: &FxHashMap<TypeId, TypeId>) -> TypeId {
        if let Some(&target) = mapping.get(&id) {
            return target;
        }
        match self.get(id) {
            Some(TypeData::Named { name, args }) if !args.is_empty() => {
                let new_args: SmallVec<[TypeId; 2]> = args
                    .iter()
                    .map(|&arg| self.substitute(arg, mapping))
                    .collect();
                if new_args == args {
                    id
                } else {
                    self.intern(TypeData::Named {
                        name,
                        args: new_args,
                    })
                }
            }
            _ => id,
        }
    }

    /// If `id` is `set_name<T>`, return `T`.
    pub fn as_set(&self, id: TypeId, set_name: Atom) -> Option<TypeId> {
        match self.get(id)? {
            TypeData::Named { name, args } if name == set_name && args.len() == 1 => Some(args[0]),
            _ => None,
        }
    }

    /// If `id` is `map_name<K, V>`, return `(K, V)`.
    pub fn as_map(&self, id: TypeId, map_name: Atom) -> Option<(TypeId, TypeId)> {
        match self.get(id)? {
            TypeData::Named { name, args } if name == map_name && args.len() == 2 => {
                Some((args[0], args[1]))
            }
            _ => None,
        }
    }
}

/// Well-known type names recognized by multibinding resolution and map-key
/// type derivation.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinTypes {
    pub set: Atom,
    pub map: Atom,
    pub provider: Atom,
    pub lazy: Atom,
    pub string: Atom,
    pub int: Atom,
    pub boolean: Atom,
}

impl BuiltinTypes {
    pub fn intern(names: &mut Interner) -> Self {
        Self {
            set: names.intern("Set"),
            map: names.intern("Map"),
            provider: names.intern("Provider"),
            lazy: names.intern("Lazy"),
            string: names.intern("String"),
            int: names.intern("Int"),
            boolean: names.intern("Boolean"),
        }
    }
}

/// Derive a type-parameter substitution by structurally matching a declared
/// (parameter-bearing) type against a concrete instance of it.
///
/// Used when a contribution binds a generic class to a concrete supertype
/// instance: matching `I<T>` against `I<String>` yields `T → String`, which
/// is then applied to the class's constructor parameters.
///
/// Returns `false` when the shapes disagree (different names or arities),
/// or when the structures nest past `limits::MAX_SUPERTYPE_WALK_DEPTH`.
pub fn match_type_params(
    types: &TypeInterner,
    declared: TypeId,
    concrete: TypeId,
    mapping: &mut FxHashMap<TypeId, TypeId>,
) -> bool {
    match_bounded(types, declared, concrete, mapping, 0)
}

fn match_bounded(
    types: &TypeInterner,
    declared: TypeId,
    concrete: TypeId,
    mapping: &mut FxHashMap<TypeId, TypeId>,
    depth: u32,
) -> bool {
    if depth > limits::MAX_SUPERTYPE_WALK_DEPTH {
        return false;
    }
    if declared == concrete {
        return true;
    }
    match types.get(declared) {
        Some(TypeData::Param { .. }) => {
            // First match wins; a conflicting second match is a shape error.
            match mapping.get(&declared) {
                Some(&existing) => existing == concrete,
                None => {
                    mapping.insert(declared, concrete);
                    true
                }
            }
        }
        Some(TypeData::Named { name, args }) => match types.get(concrete) {
            Some(TypeData::Named {
                name: concrete_name,
                args: concrete_args,
            }) if name == concrete_name && args.len() == concrete_args.len() => args
                .iter()
                .zip(concrete_args.iter())
                .all(|(&d, &c)| match_bounded(types, d, c, mapping, depth + 1)),
            _ => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let foo = names.intern("Foo");
        assert_eq!(types.named(foo), types.named(foo));
    }

    #[test]
    fn distinct_arguments_make_distinct_types() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let repo = names.intern("Repo");
        let user = types.named(names.intern("User"));
        let order = types.named(names.intern("Order"));
        assert_ne!(types.generic(repo, [user]), types.generic(repo, [order]));
    }

    #[test]
    fn substitute_rewrites_nested_params() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let cache = names.intern("Cache");
        let list = names.intern("List");
        let t = types.param(cache, names.intern("T"));
        let string_ty = types.named(names.intern("String"));
        let list_of_t = types.generic(list, [t]);

        let mut mapping = FxHashMap::default();
        mapping.insert(t, string_ty);

        let substituted = types.substitute(list_of_t, &mapping);
        assert_eq!(substituted, types.generic(list, [string_ty]));
        // Unrelated types pass through untouched.
        assert_eq!(types.substitute(string_ty, &mapping), string_ty);
    }

    #[test]
    fn set_and_map_recognizers() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let builtins = BuiltinTypes::intern(&mut names);
        let elem = types.named(names.intern("Plugin"));
        let key = types.named(names.intern("String"));

        let set_ty = types.generic(builtins.set, [elem]);
        assert_eq!(types.as_set(set_ty, builtins.set), Some(elem));
        assert_eq!(types.as_map(set_ty, builtins.map), None);

        let map_ty = types.generic(builtins.map, [key, elem]);
        assert_eq!(types.as_map(map_ty, builtins.map), Some((key, elem)));
        assert_eq!(types.as_set(map_ty, builtins.set), None);
    }

    #[test]
    fn match_type_params_derives_mapping() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let iface = names.intern("Handler");
        let owner = names.intern("JsonHandler");
        let t = types.param(owner, names.intern("T"));
        let declared = types.generic(iface, [t]);
        let string_ty = types.named(names.intern("String"));
        let concrete = types.generic(iface, [string_ty]);

        let mut mapping = FxHashMap::default();
        assert!(match_type_params(&types, declared, concrete, &mut mapping));
        assert_eq!(mapping.get(&t), Some(&string_ty));
    }

    #[test]
    fn match_type_params_bails_out_on_pathological_nesting() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let wrap = names.intern("Wrap");
        let owner = names.intern("Deep");
        let t = types.param(owner, names.intern("T"));
        let string_ty = types.named(names.intern("String"));

        let mut declared = t;
        let mut concrete = string_ty;
        for _ in 0..=limits::MAX_SUPERTYPE_WALK_DEPTH {
            declared = types.generic(wrap, [declared]);
            concrete = types.generic(wrap, [concrete]);
        }

        let mut mapping = FxHashMap::default();
        assert!(!match_type_params(&types, declared, concrete, &mut mapping));
    }

    #[test]
    fn match_type_params_rejects_shape_mismatch() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let a = types.named(names.intern("A"));
        let b = types.named(names.intern("B"));
        let mut mapping = FxHashMap::default();
        assert!(!match_type_params(&types, a, b, &mut mapping));
    }
}
