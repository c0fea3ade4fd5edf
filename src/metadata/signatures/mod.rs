//! The signature grammar.
//!
//! Signatures describe the shape of fields, methods, properties, locals and generic
//! instantiations. They are decoded by the backing store against a
//! [`crate::metadata::provider::TokenResolver`], so every type reference inside a signature is
//! an already materialized [`crate::metadata::tables::TypeDefOrRef`] rather than a raw token.
//!
//! The grammar is an exhaustive set of enums; consumers such as the
//! [generic containment analyzer](crate::metadata::typesystem) match on it without fallthrough
//! casts.

mod types;

pub use types::*;
