//! The binding stack: the resolver's diagnostic request chain.
//!
//! Every descent into a dependency pushes one entry ("who asked for what");
//! every return pops it, on success and failure exits alike. The stack is
//! never consulted for correctness — at the moment an error is raised it is
//! snapshotted into the error so the user sees the exact chain of
//! requirements that led there.

use lattice_common::interner::Interner;
use lattice_model::{ContextualTypeKey, DeclarationId, DeclarationStore, TypeInterner, TypeKey};

/// The entity that requested a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requester {
    /// A graph accessor root.
    Graph(DeclarationId),
    /// A binding resolving its parameters.
    Binding(TypeKey),
}

impl Requester {
    pub fn render(&self, decls: &DeclarationStore, names: &Interner, types: &TypeInterner) -> String {
        match self {
            Requester::Graph(id) => decls.display(*id, names),
            Requester::Binding(key) => key.render(types, names),
        }
    }
}

/// One frame of the request chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub requester: Requester,
    pub requested: ContextualTypeKey,
}

/// Ordered request chain, outermost root first.
#[derive(Debug, Default)]
pub struct BindingStack {
    entries: Vec<StackEntry>,
}

impl BindingStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, requester: Requester, requested: ContextualTypeKey) {
        self.entries.push(StackEntry {
            requester,
            requested,
        });
    }

    pub fn pop(&mut self) {
        let popped = self.entries.pop();
        debug_assert!(popped.is_some(), "pop on an empty binding stack");
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn last(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    /// Clone the active chain, for embedding in an error.
    pub fn snapshot(&self) -> Vec<StackEntry> {
        self.entries.clone()
    }

    /// Render the chain as one line per frame, outermost first.
    pub fn render(
        &self,
        decls: &DeclarationStore,
        names: &Interner,
        types: &TypeInterner,
    ) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "'{}' requires '{}'",
                    entry.requester.render(decls, names, types),
                    entry.requested.render(types, names)
                )
            })
            .collect()
    }
}
