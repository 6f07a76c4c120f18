//! Binding graph and graph resolver for the lattice dependency-injection
//! compiler.
//!
//! Given a graph declaration's aggregated candidate bindings, this crate
//! builds the per-compile-unit [`BindingGraph`], resolves every accessor
//! root with the cycle-aware, scope-respecting [`GraphResolver`], and emits
//! a dependency-ordered [`ConstructionPlan`] for code generation — or a
//! structured [`ResolutionError`] carrying the binding stack that led to
//! the failure.

pub mod context;
pub mod errors;
pub mod graph;
pub mod plan;
pub mod recursion;
pub mod resolve;
pub mod stack;

pub use context::ResolverContext;
pub use errors::{ResolutionError, ResolutionErrorKind};
pub use graph::{BindingGraph, MultibindingSlot};
pub use plan::{ConstructionPlan, PlanEntry, PlanSummary};
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use resolve::GraphResolver;
pub use stack::{BindingStack, Requester, StackEntry};
