//! Aggregation failures.

use lattice_common::diagnostics::{Diagnostic, diagnostic_codes, format_message, get_message_template};
use lattice_common::interner::Interner;
use lattice_model::{DeclarationId, DeclarationStore};

/// A failure while resolving contributions into candidate bindings.
///
/// Aggregation errors are fatal to the enclosing graph declaration's
/// compilation; the host collects them across declarations and reports
/// them together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregationError {
    /// A contribution has several declared supertypes and no explicit
    /// `binding<T>()` argument to pick one.
    AmbiguousBoundType {
        origin: DeclarationId,
        supertype_count: usize,
    },
    /// An into-map contribution declares no map key on either its bound-type
    /// expression or its class.
    MissingMapKey { origin: DeclarationId },
}

impl AggregationError {
    pub fn code(&self) -> u32 {
        match self {
            AggregationError::AmbiguousBoundType { .. } => diagnostic_codes::AMBIGUOUS_BOUND_TYPE,
            AggregationError::MissingMapKey { .. } => diagnostic_codes::MISSING_MAP_KEY,
        }
    }

    pub fn origin(&self) -> DeclarationId {
        match self {
            AggregationError::AmbiguousBoundType { origin, .. }
            | AggregationError::MissingMapKey { origin } => *origin,
        }
    }

    pub fn into_diagnostic(self, decls: &DeclarationStore, names: &Interner) -> Diagnostic {
        let code = self.code();
        let origin = decls.display(self.origin(), names);
        let template = get_message_template(code).unwrap_or("{0}");
        let message = match &self {
            AggregationError::AmbiguousBoundType {
                supertype_count, ..
            } => format_message(template, &[&origin, &supertype_count.to_string()]),
            AggregationError::MissingMapKey { .. } => format_message(template, &[&origin]),
        };
        Diagnostic::error(origin, message, code)
    }
}
