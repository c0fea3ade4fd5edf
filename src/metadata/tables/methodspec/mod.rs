//! `MethodSpec` table: instantiations of generic methods.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `MethodSpec`
pub type MethodSpecRc = Arc<MethodSpec>;
