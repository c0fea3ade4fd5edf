//! `Param` table: named parameters of methods, and the return value when it carries metadata.

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The parameter rows of a method
pub type ParamList = Arc<OwnedList<MethodParams>>;
/// A reference to a `Param`
pub type ParamRc = Arc<Param>;

#[allow(non_snake_case)]
/// Parameter attribute flags, ECMA-335 §II.23.1.13
pub mod ParamAttributes {
    /// Param is `[In]`
    pub const IN: u32 = 0x0001;
    /// Param is `[Out]`
    pub const OUT: u32 = 0x0002;
    /// Param is optional
    pub const OPTIONAL: u32 = 0x0010;
    /// Param has a default value
    pub const HAS_DEFAULT: u32 = 0x1000;
    /// Param has marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x2000;
}
