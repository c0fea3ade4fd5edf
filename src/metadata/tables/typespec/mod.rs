//! `TypeSpec` table: types described by a signature, generic instantiations, arrays, pointers
//! and generic parameters.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `TypeSpec`
pub type TypeSpecRc = Arc<TypeSpec>;
