//! Annotation identities.
//!
//! Qualifiers, scopes, and map keys are all annotation identities: an
//! annotation class plus its literal arguments, compared structurally. The
//! three roles share one representation ([`Annotation`]) behind distinct
//! newtypes so a scope can never be passed where a qualifier is expected.

use crate::intern::TypeId;
use lattice_common::interner::{Atom, Interner};
use smallvec::SmallVec;

/// A literal annotation argument value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationValue {
    /// String literal (interned).
    Str(Atom),
    Int(i64),
    Bool(bool),
    /// Class-literal argument, e.g. `binding<T>()`'s `T`.
    Type(TypeId),
    /// Enum entry, e.g. `Priority.HIGH` (interned as one atom).
    EnumEntry(Atom),
}

/// An annotation identity: class plus named literal arguments.
///
/// Equality and hashing are structural over the class and the full argument
/// list, so `@Named("x")` and `@Named("y")` are distinct identities.
/// Arguments are kept in declaration order; the front-end normalizes
/// argument names before handing declarations over.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Annotation {
    pub class_name: Atom,
    pub arguments: SmallVec<[(Atom, AnnotationValue); 1]>,
}

impl Annotation {
    /// A marker annotation with no arguments, e.g. `@AppScope`.
    pub fn marker(class_name: Atom) -> Self {
        Self {
            class_name,
            arguments: SmallVec::new(),
        }
    }

    pub fn with_argument(mut self, name: Atom, value: AnnotationValue) -> Self {
        self.arguments.push((name, value));
        self
    }

    /// Render for diagnostics, e.g. `@Named("api")`.
    pub fn render(&self, names: &Interner) -> String {
        let class = names.display(self.class_name);
        if self.arguments.is_empty() {
            return format!("@{class}");
        }
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|(_, value)| match value {
                AnnotationValue::Str(atom) => format!("\"{}\"", names.display(*atom)),
                AnnotationValue::Int(v) => v.to_string(),
                AnnotationValue::Bool(v) => v.to_string(),
                AnnotationValue::Type(ty) => format!("<type #{}>", ty.0),
                AnnotationValue::EnumEntry(atom) => names.display(*atom).to_string(),
            })
            .collect();
        format!("@{class}({})", args.join(", "))
    }
}

macro_rules! annotation_role {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Annotation);

        impl $name {
            pub fn marker(class_name: Atom) -> Self {
                Self(Annotation::marker(class_name))
            }

            pub fn render(&self, names: &Interner) -> String {
                self.0.render(names)
            }
        }
    };
}

annotation_role! {
    /// Disambiguates multiple bindings of the same underlying type.
    Qualifier
}

annotation_role! {
    /// Marks a binding as single-instance-per-graph-instance, and a graph
    /// declaration as owning that scope.
    Scope
}

annotation_role! {
    /// Identifies one element of a map multibinding.
    MapKey
}
