//! Contribution aggregation.
//!
//! This crate turns the declarations visible to one dependency-graph
//! declaration into its candidate binding set: bindings declared directly
//! inside the graph (providers, creator-supplied instances) merged with
//! bindings aggregated from scope-wide contribution annotations
//! (`ContributesBinding`, `ContributesIntoSet`, `ContributesIntoMap`,
//! `ContributesTo`).
//!
//! Aggregation is pure: it reads the [`DeclarationIndex`], resolves each
//! contribution's bound type, qualifier, and map key under a documented
//! precedence, applies dedup / replaces / excludes, and emits a
//! [`CandidateBindings`] value the resolver loads into a binding graph.
//!
//! [`DeclarationIndex`]: lattice_model::DeclarationIndex

pub mod aggregate;
pub mod contributions;
pub mod errors;

pub use aggregate::{CandidateBindings, aggregate};
pub use contributions::ResolvedContribution;
pub use errors::AggregationError;
