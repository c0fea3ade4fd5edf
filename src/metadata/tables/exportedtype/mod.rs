//! `ExportedType` table: types a manifest module makes visible from its other modules, and
//! forwarders redirecting a type to another assembly.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The exported types of a module
pub type ExportedTypeList = Arc<boxcar::Vec<ExportedTypeRc>>;
/// A reference to an `ExportedType`
pub type ExportedTypeRc = Arc<ExportedType>;
