//! `TypeRef` table: symbolic references to types, resolved through their resolution scope.
//!
//! A nested type reference is scoped to the reference of its enclosing type. The
//! [`Resolver`](crate::metadata::resolver::Resolver) first walks that chain out to the
//! outermost reference with [`TypeRef::non_nested`], then dispatches on its scope.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `TypeRef`
pub type TypeRefRc = Arc<TypeRef>;
