//! Resolution failures.
//!
//! Every variant carries enough structure to render the user-facing message
//! lazily: interned keys and declaration ids stay structured until the host
//! asks for a [`Diagnostic`], at which point the binding-stack snapshot
//! becomes one related-information entry per frame. A resolution error is
//! fatal to its graph declaration's compilation; the host collects errors
//! across declarations and reports them together.

use crate::stack::StackEntry;
use lattice_common::diagnostics::{
    Diagnostic, diagnostic_codes, format_message, get_message_template,
};
use lattice_common::interner::Interner;
use lattice_model::{
    ContextualTypeKey, DeclarationId, DeclarationStore, MapKey, Scope, TypeInterner, TypeKey,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// No local binding, no parent binding, no multibinding container, and
    /// the request has no default.
    MissingBinding { requested: ContextualTypeKey },
    /// An eager dependency cycle: no edge from the revisited binding back to
    /// itself goes through a Provider or Lazy indirection. Also raised when
    /// the descent blows its depth or iteration budget, with the active
    /// chain as the path.
    DependencyCycle { cycle: Vec<TypeKey> },
    /// Two non-identical bindings claim the same key.
    DuplicateBinding {
        type_key: TypeKey,
        existing: Option<DeclarationId>,
        incoming: Option<DeclarationId>,
    },
    /// Two map-multibinding elements declare the same map key.
    DuplicateMapKey {
        container: TypeKey,
        map_key: MapKey,
        existing: Option<DeclarationId>,
        incoming: Option<DeclarationId>,
    },
    /// A scoped binding reached from a graph that does not declare its scope.
    IncompatibleScope { type_key: TypeKey, scope: Scope },
}

/// A resolution failure with the request chain active when it was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionError {
    /// The graph declaration whose resolution failed.
    pub graph: DeclarationId,
    pub kind: ResolutionErrorKind,
    pub stack: Vec<StackEntry>,
}

impl ResolutionError {
    pub fn code(&self) -> u32 {
        match &self.kind {
            ResolutionErrorKind::MissingBinding { .. } => diagnostic_codes::MISSING_BINDING,
            ResolutionErrorKind::DependencyCycle { .. } => diagnostic_codes::DEPENDENCY_CYCLE,
            ResolutionErrorKind::DuplicateBinding { .. } => diagnostic_codes::DUPLICATE_BINDING,
            ResolutionErrorKind::DuplicateMapKey { .. } => diagnostic_codes::DUPLICATE_MAP_KEY,
            ResolutionErrorKind::IncompatibleScope { .. } => diagnostic_codes::INCOMPATIBLE_SCOPE,
        }
    }

    pub fn into_diagnostic(
        self,
        decls: &DeclarationStore,
        names: &Interner,
        types: &TypeInterner,
    ) -> Diagnostic {
        let code = self.code();
        let graph_name = decls.display(self.graph, names);
        let template = get_message_template(code).unwrap_or("{0}");
        let display = |id: Option<DeclarationId>| match id {
            Some(id) => decls.display(id, names),
            None => "<synthetic>".to_string(),
        };

        let message = match &self.kind {
            ResolutionErrorKind::MissingBinding { requested } => {
                let requester = match self.stack.last() {
                    Some(entry) => entry.requester.render(decls, names, types),
                    None => graph_name.clone(),
                };
                format_message(template, &[&requested.render(types, names), &requester])
            }
            ResolutionErrorKind::DependencyCycle { cycle } => {
                let head = match cycle.first() {
                    Some(key) => key.render(types, names),
                    None => graph_name.clone(),
                };
                format_message(template, &[&head])
            }
            ResolutionErrorKind::DuplicateBinding {
                type_key,
                existing,
                incoming,
            } => format_message(
                template,
                &[
                    &type_key.render(types, names),
                    &display(*existing),
                    &display(*incoming),
                ],
            ),
            ResolutionErrorKind::DuplicateMapKey {
                container,
                map_key,
                existing,
                incoming,
            } => format_message(
                template,
                &[
                    &map_key.render(names),
                    &container.render(types, names),
                    &display(*existing),
                    &display(*incoming),
                ],
            ),
            ResolutionErrorKind::IncompatibleScope { type_key, scope } => format_message(
                template,
                &[
                    &type_key.render(types, names),
                    &scope.render(names),
                    &graph_name,
                ],
            ),
        };

        let mut diagnostic = Diagnostic::error(graph_name, message, code);
        for entry in &self.stack {
            diagnostic = diagnostic.with_related(
                entry.requester.render(decls, names, types),
                format!("requires '{}'", entry.requested.render(types, names)),
            );
        }
        diagnostic
    }
}
