//! String interning for declaration and annotation names.
//!
//! Names flow through every key type in the resolver (type names, qualifier
//! class names, parameter names), so they are interned once and compared as
//! 32-bit ids afterwards. Two interners are provided:
//!
//! - [`Interner`]: single-owner interner for one compilation pass
//! - [`SharedInterner`]: thread-shareable interner (`DashMap`-backed) for
//!   hosts that intern from several front-end workers before resolution

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Interned string identifier.
///
/// Cheap to copy, hash, and compare. An `Atom` is only meaningful relative
/// to the interner that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel for "no name". Never returned by interning.
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

/// Single-owner string interner.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Atom`. Idempotent.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let arc: Arc<str> = Arc::from(s);
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(Arc::clone(&arc));
        self.map.insert(arc, atom);
        atom
    }

    /// Resolve an `Atom` back to its string.
    ///
    /// Returns `None` for atoms not produced by this interner.
    pub fn resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Resolve an `Atom`, falling back to a placeholder for foreign atoms.
    ///
    /// Diagnostics rendering uses this so a stale atom degrades to a
    /// recognizable marker instead of a panic.
    pub fn display(&self, atom: Atom) -> &str {
        self.resolve(atom).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Thread-shareable interner.
///
/// Interning and resolution both take `&self`, so a host can hand clones of
/// an `Arc<SharedInterner>` to parallel front-end workers. Resolution of one
/// dependency graph is still single-threaded; only name interning is shared.
#[derive(Debug, Default)]
pub struct SharedInterner {
    map: DashMap<Arc<str>, Atom>,
    strings: DashMap<u32, Arc<str>>,
    next_id: AtomicU32,
}

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Atom {
        if let Some(atom) = self.map.get(s) {
            return *atom;
        }
        let arc: Arc<str> = Arc::from(s);
        // Two workers may race to intern the same string; entry() makes the
        // first insertion win and the loser reuse its atom.
        let atom = *self
            .map
            .entry(Arc::clone(&arc))
            .or_insert_with(|| Atom(self.next_id.fetch_add(1, Ordering::Relaxed)));
        self.strings.entry(atom.0).or_insert(arc);
        atom
    }

    pub fn resolve(&self, atom: Atom) -> Option<Arc<str>> {
        self.strings.get(&atom.0).map(|s| Arc::clone(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("AppScope");
        let b = interner.intern("AppScope");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_strings_get_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("Foo");
        let b = interner.intern("Bar");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), Some("Foo"));
        assert_eq!(interner.resolve(b), Some("Bar"));
    }

    #[test]
    fn invalid_atom_is_not_resolvable() {
        let interner = Interner::new();
        assert!(!Atom::INVALID.is_valid());
        assert_eq!(interner.resolve(Atom::INVALID), None);
        assert_eq!(interner.display(Atom::INVALID), "<unknown>");
    }

    #[test]
    fn shared_interner_round_trip() {
        let interner = SharedInterner::new();
        let a = interner.intern("LoggedInScope");
        let b = interner.intern("LoggedInScope");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a).as_deref(), Some("LoggedInScope"));
    }
}
