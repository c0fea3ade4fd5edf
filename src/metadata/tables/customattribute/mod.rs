//! `CustomAttribute` table: attributes applied to metadata entities.
//!
//! The attribute blob is kept verbatim; only the constructor is resolved.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A vector that holds a list of `CustomAttribute`
pub type CustomAttributeList = Arc<boxcar::Vec<CustomAttributeRc>>;
/// A reference to a `CustomAttribute`
pub type CustomAttributeRc = Arc<CustomAttribute>;
