//! `GenericParam` table: generic parameters of types and methods.
//!
//! A generic parameter is owned either by a type or by a method. The owner is a
//! [`TypeOrMethodDef`](crate::metadata::tables::TypeOrMethodDef) and is held weakly.

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The generic parameters of a type or method
pub type GenericParamList = Arc<OwnedList<GenericParams>>;
/// A reference to a `GenericParam`
pub type GenericParamRc = Arc<GenericParam>;

#[allow(non_snake_case)]
/// Generic parameter attribute flags, ECMA-335 §II.23.1.7
pub mod GenericParamAttributes {
    /// Mask for the variance flags
    pub const VARIANCE_MASK: u32 = 0x0003;
    /// Invariant
    pub const NONVARIANT: u32 = 0x0000;
    /// Covariant, `out T`
    pub const COVARIANT: u32 = 0x0001;
    /// Contravariant, `in T`
    pub const CONTRAVARIANT: u32 = 0x0002;
    /// Mask for the special constraint flags
    pub const SPECIAL_CONSTRAINT_MASK: u32 = 0x001C;
    /// `class` constraint
    pub const REFERENCE_TYPE_CONSTRAINT: u32 = 0x0004;
    /// `struct` constraint
    pub const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT: u32 = 0x0008;
    /// `new()` constraint
    pub const DEFAULT_CONSTRUCTOR_CONSTRAINT: u32 = 0x0010;
}
