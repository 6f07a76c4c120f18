//! Data model for the lattice dependency-injection compiler.
//!
//! This crate defines the normalized form the front-end hands to the
//! aggregator and resolver:
//!
//! - **Interned type references** (`TypeId`, `TypeInterner`) with O(1)
//!   equality and functional type-parameter substitution
//! - **Annotation identities** (`Annotation`, `Qualifier`, `Scope`, `MapKey`)
//! - **Binding keys** (`TypeKey`, `ContextualTypeKey`)
//! - **Callable parameters** (`Parameter`, `Parameters`,
//!   `AssistedParameterKey`)
//! - **Bindings** — the closed variant set resolution switches on
//! - **Declarations** — injectable classes, providers, contributions, and
//!   dependency-graph declarations, indexed by `DeclarationId`
//!
//! Everything here is immutable once constructed; the aggregator produces
//! bindings from declarations and the resolver only ever reads them.

pub mod annotations;
pub mod bindings;
pub mod declarations;
pub mod intern;
pub mod keys;
pub mod parameters;

pub use annotations::{Annotation, AnnotationValue, MapKey, Qualifier, Scope};
pub use bindings::{Binding, MultibindingKind};
pub use declarations::{
    Accessor, ContributedModule, ContributionDeclaration, ContributionKind, DeclarationId,
    DeclarationIndex,
    DeclarationInfo, DeclarationKind, DeclarationStore, GraphDeclaration, InjectableClass,
    ProviderCallable,
};
pub use intern::{BuiltinTypes, TypeData, TypeId, TypeInterner, match_type_params};
pub use keys::{ContextualTypeKey, TypeKey, render_type};
pub use parameters::{AssistedParameterKey, Parameter, ParameterFlags, ParameterKind, Parameters};
