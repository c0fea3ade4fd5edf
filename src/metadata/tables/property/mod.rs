//! `Property` table: properties declared by the types of the current module.
//!
//! Accessors are not part of the row. They are bound through `MethodSemantics` rows and loaded
//! together, the first time any of them is requested.

use std::sync::Arc;

use crate::metadata::{ownership::OwnedList, tables::MethodDefRc};

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The properties declared by a type
pub type PropertyList = Arc<OwnedList<DeclaredProperties>>;
/// A reference to a `Property`
pub type PropertyRc = Arc<Property>;
/// Accessor methods of one role
pub type AccessorList = Arc<boxcar::Vec<MethodDefRc>>;

#[allow(non_snake_case)]
/// Property attribute flags, ECMA-335 §II.23.1.14
pub mod PropertyAttributes {
    /// Property is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// Runtime should check name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x0400;
    /// Property has a default value
    pub const HAS_DEFAULT: u32 = 0x1000;
}
