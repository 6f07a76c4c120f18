//! Centralized limits and thresholds for the lattice compiler.
//!
//! Shared constants for recursion depths, operation counts, and capacity
//! hints used throughout the workspace. Centralizing these values prevents
//! duplicate definitions with inconsistent values and documents the
//! rationale for each limit in one place.
//!
//! Resolver recursion limits are consumed through
//! `lattice_resolver::recursion::RecursionProfile`; the constants here are
//! the single source of truth the profiles read.

/// Maximum depth of the resolver's dependency descent.
///
/// Each binding whose parameters are being resolved adds one level. Object
/// graphs hundreds of constructors deep are pathological; the resolver
/// bails out rather than risking stack overflow on adversarial input.
pub const MAX_RESOLUTION_DEPTH: u32 = 250;

/// Maximum total resolution steps per graph declaration.
///
/// Guards against non-termination bugs in closure computation. A legitimate
/// graph performs one step per distinct (binding, wrapper) request plus
/// memoized revisits, which stays far below this bound.
pub const MAX_RESOLUTION_ITERATIONS: u32 = 100_000;

/// Maximum structural depth when matching a contribution's bound type
/// against a declared supertype during type-parameter derivation.
pub const MAX_SUPERTYPE_WALK_DEPTH: u32 = 64;

/// Pre-allocation hint for a graph's candidate binding set.
pub const CANDIDATE_SET_CAPACITY: usize = 64;

/// Pre-allocation hint for construction plan entries.
pub const PLAN_CAPACITY: usize = 32;
