//! Diagnostic primitives for aggregation and resolution failures.
//!
//! The aggregator and resolver report failures as structured error values;
//! those render into `Diagnostic` at the host boundary. A `Diagnostic`
//! carries a stable error code, the offending declaration's identity, a
//! formatted message, and related-information entries (one per binding-stack
//! frame) so the host can surface the complete requirement chain with source
//! positions attached on its side.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

/// Stable error codes for the resolution failure taxonomy.
///
/// | Code | Failure |
/// |------|---------|
/// | 1001 | Missing binding |
/// | 1002 | Dependency cycle |
/// | 1003 | Duplicate binding |
/// | 1004 | Duplicate map key |
/// | 1005 | Incompatible scope |
/// | 1006 | Ambiguous bound type |
/// | 1007 | Missing map key |
pub mod diagnostic_codes {
    pub const MISSING_BINDING: u32 = 1001;
    pub const DEPENDENCY_CYCLE: u32 = 1002;
    pub const DUPLICATE_BINDING: u32 = 1003;
    pub const DUPLICATE_MAP_KEY: u32 = 1004;
    pub const INCOMPATIBLE_SCOPE: u32 = 1005;
    pub const AMBIGUOUS_BOUND_TYPE: u32 = 1006;
    pub const MISSING_MAP_KEY: u32 = 1007;
}

/// Message templates, indexed by error code. `{0}`, `{1}`, … are substituted
/// by [`format_message`].
pub mod diagnostic_messages {
    use super::diagnostic_codes as codes;

    pub const TEMPLATES: &[(u32, &str)] = &[
        (
            codes::MISSING_BINDING,
            "No binding found for '{0}'. Requested by '{1}'.",
        ),
        (
            codes::DEPENDENCY_CYCLE,
            "Dependency cycle detected while resolving '{0}'. Every edge in the cycle is eagerly required; wrap at least one dependency in Provider or Lazy to break it.",
        ),
        (
            codes::DUPLICATE_BINDING,
            "Duplicate binding for '{0}': already provided by '{1}', also claimed by '{2}'.",
        ),
        (
            codes::DUPLICATE_MAP_KEY,
            "Duplicate map key '{0}' for multibinding '{1}': contributed by both '{2}' and '{3}'.",
        ),
        (
            codes::INCOMPATIBLE_SCOPE,
            "Binding '{0}' is scoped to '{1}', which graph '{2}' does not declare.",
        ),
        (
            codes::AMBIGUOUS_BOUND_TYPE,
            "Contribution from '{0}' has {1} declared supertypes and no explicit bound type; declare one with binding<T>().",
        ),
        (
            codes::MISSING_MAP_KEY,
            "Into-map contribution from '{0}' declares no map key on its bound type or class.",
        ),
    ];
}

/// A frame of supporting context attached to a diagnostic, typically one
/// entry of the rendered binding stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    /// Declaration identity the frame points at (fully qualified name).
    pub origin: String,
    pub message_text: String,
}

/// A rendered aggregation/resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Identity of the offending declaration (fully qualified name). The
    /// host maps this back to a source position.
    pub origin: String,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    pub fn error(origin: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            origin: origin.into(),
            message_text: message.into(),
            related_information: Vec::new(),
        }
    }

    pub fn with_related(mut self, origin: impl Into<String>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            category: DiagnosticCategory::Message,
            origin: origin.into(),
            message_text: message.into(),
        });
        self
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    diagnostic_messages::TEMPLATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, m)| *m)
}

/// Substitute `{0}`, `{1}`, … placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
