//! `GenericParamConstraint` table: the type constraints of a generic parameter.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The constraints of a generic parameter
pub type GenericParamConstraintList = Arc<boxcar::Vec<GenericParamConstraintRc>>;
/// A reference to a `GenericParamConstraint`
pub type GenericParamConstraintRc = Arc<GenericParamConstraint>;
