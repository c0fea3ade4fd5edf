//! `ModuleRef` table: references to other modules of the same assembly, by name.
//!
//! Module references appear as resolution scopes of type references, as parents of member
//! references and as the import scope of P/Invoke mappings.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A vector that holds a list of `ModuleRef`
pub type ModuleRefList = Arc<boxcar::Vec<ModuleRefRc>>;
/// A reference to a `ModuleRef`
pub type ModuleRefRc = Arc<ModuleRef>;
