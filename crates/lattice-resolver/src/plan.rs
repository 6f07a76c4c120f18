//! The construction plan: the resolver's handoff to code generation.
//!
//! Entries are in dependency order — a binding's parameters always precede
//! it — so a generator can emit initialization statements top to bottom and
//! only ever reference already-initialized values. Scoped bindings are
//! additionally assigned singleton slots (one cached instance per graph
//! instance) in plan order; unscoped bindings get no slot and are
//! constructed fresh at every use site.

use indexmap::IndexMap;
use lattice_common::interner::Interner;
use lattice_common::limits;
use lattice_model::{Binding, TypeInterner, TypeKey};
use serde::Serialize;

/// One construction step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    pub type_key: TypeKey,
    pub binding: Binding,
}

/// Dependency-ordered construction steps plus singleton slot assignments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructionPlan {
    pub entries: Vec<PlanEntry>,
    /// Scoped binding key → slot index, in plan order.
    pub singleton_slots: IndexMap<TypeKey, u32>,
}

impl ConstructionPlan {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(limits::PLAN_CAPACITY),
            singleton_slots: IndexMap::new(),
        }
    }

    pub fn push(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    /// Assign the next singleton slot to a scoped binding's key.
    pub fn assign_slot(&mut self, key: TypeKey) {
        let slot = self.singleton_slots.len() as u32;
        self.singleton_slots.entry(key).or_insert(slot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }

    /// Position of the entry for `key`, if the plan constructs it.
    pub fn position(&self, key: &TypeKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.type_key == key)
    }

    /// Render a serializable summary for hosts and snapshot tests.
    pub fn summary(&self, types: &TypeInterner, names: &Interner) -> PlanSummary {
        PlanSummary {
            entries: self
                .entries
                .iter()
                .map(|entry| PlanEntrySummary {
                    key: entry.type_key.render(types, names),
                    kind: entry.binding.kind_name(),
                    scope: entry.binding.scope().map(|s| s.render(names)),
                })
                .collect(),
            singleton_slots: self
                .singleton_slots
                .iter()
                .map(|(key, slot)| SlotSummary {
                    key: key.render(types, names),
                    slot: *slot,
                })
                .collect(),
        }
    }
}

/// Rendered plan, stable across runs over the same declarations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub entries: Vec<PlanEntrySummary>,
    pub singleton_slots: Vec<SlotSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanEntrySummary {
    pub key: String,
    pub kind: &'static str,
    pub scope: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub key: String,
    pub slot: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_model::{DeclarationId, Parameters, Scope};

    #[test]
    fn slots_are_assigned_in_plan_order_and_only_once() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let a = TypeKey::new(types.named(names.intern("A")));
        let b = TypeKey::new(types.named(names.intern("B")));

        let mut plan = ConstructionPlan::new();
        plan.assign_slot(a.clone());
        plan.assign_slot(b.clone());
        plan.assign_slot(a.clone());

        assert_eq!(plan.singleton_slots.get(&a), Some(&0));
        assert_eq!(plan.singleton_slots.get(&b), Some(&1));
        assert_eq!(plan.singleton_slots.len(), 2);
    }

    #[test]
    fn summary_renders_keys_and_scopes() {
        let mut names = Interner::new();
        let types = TypeInterner::new();
        let service = TypeKey::new(types.named(names.intern("Service")));
        let app = Scope::marker(names.intern("AppScope"));

        let mut plan = ConstructionPlan::new();
        plan.push(PlanEntry {
            type_key: service.clone(),
            binding: Binding::ConstructorInjected {
                class: DeclarationId(1),
                type_key: service.clone(),
                parameters: Parameters::empty(),
                scope: Some(app),
            },
        });
        plan.assign_slot(service);

        let summary = plan.summary(&types, &names);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].key, "Service");
        assert_eq!(summary.entries[0].kind, "constructor");
        assert_eq!(summary.entries[0].scope.as_deref(), Some("@AppScope"));
        assert_eq!(summary.singleton_slots[0].slot, 0);
    }
}
