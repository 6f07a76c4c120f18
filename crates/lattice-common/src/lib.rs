//! Common types and utilities for the lattice dependency-injection compiler.
//!
//! This crate provides foundational types used across all lattice crates:
//! - String interning (`Atom`, `Interner`, `SharedInterner`)
//! - Diagnostic primitives (`Diagnostic`, error code table, message templates)
//! - Centralized limits and thresholds

// String interning for name deduplication
pub mod interner;
pub use interner::{Atom, Interner, SharedInterner};

// Diagnostic primitives shared by the aggregator and the resolver
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, format_message,
};

// Centralized limits and thresholds
pub mod limits;
