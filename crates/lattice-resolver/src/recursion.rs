//! Recursion guard for the resolver's depth-first descent.
//!
//! The resolver tracks per-binding state for cycle handling itself; the
//! guard's job is bounding the descent. It combines a visiting set (a second
//! line of cycle defense), a depth limit, and a total iteration budget so a
//! runaway closure computation fails with a diagnostic instead of a stack
//! overflow.
//!
//! Limits come from named [`RecursionProfile`] presets backed by
//! `lattice_common::limits`, so a call site reads as intent rather than a
//! pair of magic numbers.
//!
//! In debug builds, dropping a guard with active entries panics, catching
//! `enter` calls without a matching `leave`.

use lattice_common::limits;
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// The resolver's dependency descent: one level per binding whose
    /// parameters are being resolved.
    GraphResolution,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::GraphResolution => limits::MAX_RESOLUTION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::GraphResolution => limits::MAX_RESOLUTION_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Outcome of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already in the visiting set.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Visiting set plus depth and iteration bounds.
///
/// Every successful [`enter`](Self::enter) must be paired with exactly one
/// [`leave`](Self::leave) for the same key, including on error exits.
pub struct RecursionGuard<K: Hash + Eq + Clone> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Clone> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a computation for `key`. On [`RecursionResult::Entered`]
    /// the caller must call [`leave`](Self::leave) with the same key.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: &K) {
        let was_present = self.visiting.remove(key);
        debug_assert!(
            was_present,
            "leave() for a key that is not in the visiting set"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Sticky: stays `true` once any limit trips, until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Reset all state while preserving the configured limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Clone> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries (enter without leave)",
                self.visiting.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_read_the_shared_limits() {
        let resolution = RecursionProfile::GraphResolution;
        assert_eq!(resolution.max_depth(), limits::MAX_RESOLUTION_DEPTH);
        assert_eq!(resolution.max_iterations(), limits::MAX_RESOLUTION_ITERATIONS);

        let custom = RecursionProfile::Custom {
            max_depth: 4,
            max_iterations: 16,
        };
        let guard = RecursionGuard::<u32>::with_profile(custom);
        assert_eq!(guard.max_depth, 4);
        assert_eq!(guard.max_iterations, 16);
    }

    #[test]
    fn enter_leave_round_trip() {
        let mut guard = RecursionGuard::new(10, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert!(guard.is_visiting(&1));
        assert_eq!(guard.depth(), 1);
        guard.leave(&1);
        assert!(!guard.is_visiting(&1));
        assert_eq!(guard.depth(), 0);
        // Re-enterable after leave.
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        guard.leave(&1);
    }

    #[test]
    fn revisit_while_visiting_is_a_cycle() {
        let mut guard = RecursionGuard::new(10, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.enter(1u32), RecursionResult::Cycle);
        assert!(!guard.is_exceeded());
        guard.leave(&1);
    }

    #[test]
    fn depth_limit_is_sticky() {
        let mut guard = RecursionGuard::new(1, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.enter(2u32), RecursionResult::DepthExceeded);
        guard.leave(&1);
        assert!(guard.is_exceeded());
        guard.reset();
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn iteration_budget_counts_every_attempt() {
        let mut guard = RecursionGuard::new(100, 2);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        guard.leave(&1);
        assert_eq!(guard.enter(2u32), RecursionResult::Entered);
        guard.leave(&2);
        assert_eq!(guard.enter(3u32), RecursionResult::IterationExceeded);
        assert!(guard.is_exceeded());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not in the visiting set")]
    fn debug_leave_without_enter_panics() {
        let mut guard = RecursionGuard::new(10, 100);
        guard.leave(&1u32);
    }
}
