//! `MethodSemantics` table: binds accessor methods to properties and events.
//!
//! The rows are never exposed as entities; they populate the accessor lists of
//! [`crate::metadata::tables::Property`] and [`crate::metadata::tables::Event`] and the
//! semantics flags of [`crate::metadata::tables::MethodDef`].

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `MethodSemanticsAttributes`
pub mod MethodSemanticsAttributes {
    /// Setter for property
    pub const SETTER: u32 = 0x0001;
    /// Getter for property
    pub const GETTER: u32 = 0x0002;
    /// Other method for property or event
    pub const OTHER: u32 = 0x0004;
    /// `AddOn` method for event
    pub const ADD_ON: u32 = 0x0008;
    /// `RemoveOn` method for event
    pub const REMOVE_ON: u32 = 0x0010;
    /// Fire method for event
    pub const FIRE: u32 = 0x0020;
}
