//! Filter compilation and predicate building for analytics queries

mod compiler;
mod key_scope;
mod predicate;
pub mod schema;

pub use compiler::{compile, compile_field, CompiledField, CompiledFilterSet, FieldPayload};
pub use key_scope::{build_key_scope, build_resolver_predicate};
pub use predicate::{like_pattern, Predicate, Record};
pub use schema::{fields, Domain, FieldSpec, PayloadShape, Route, UnknownDomain, ValueKind};
