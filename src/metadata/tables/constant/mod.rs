//! `Constant` table: compile-time default values of fields, parameters and properties.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `Constant`
pub type ConstantRc = Arc<Constant>;
