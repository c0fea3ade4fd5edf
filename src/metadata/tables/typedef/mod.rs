//! `TypeDef` table: types defined in the current module.
//!
//! A [`TypeDef`] owns its members through [`OwnedList`](crate::metadata::ownership::OwnedList)s,
//! and is itself owned either by its module (top-level types) or by its enclosing type (nested
//! types), never both.
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::tables::{TypeAttributes, TypeDef};
//!
//! let outer = TypeDef::new("Demo", "Outer", TypeAttributes::PUBLIC);
//! let inner = TypeDef::new("", "Inner", TypeAttributes::NESTED_PUBLIC);
//!
//! inner.set_declaring_type(Some(&outer))?;
//! assert_eq!(inner.full_name(), "Demo.Outer/Inner");
//! assert!(outer.nested_types().contains(&inner));
//! # Ok::<(), cilgraph::Error>(())
//! ```

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `TypeDef`
pub type TypeDefRc = Arc<TypeDef>;
/// The top-level types of a module
pub type ModuleTypeList = Arc<OwnedList<ModuleTypes>>;
/// The nested types of a type
pub type NestedTypeList = Arc<OwnedList<NestedTypes>>;

#[allow(non_snake_case)]
/// Type attribute flags, ECMA-335 §II.23.1.15
pub mod TypeAttributes {
    /// Mask for extracting type visibility information
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Type has no public scope
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Type has public scope
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested type with public visibility
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested type with private visibility
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Nested type with family visibility
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Nested type with assembly visibility
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Mask for extracting class semantics information
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class cannot be extended
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Class is imported from a type library, or is a Windows Runtime type
    pub const IMPORT: u32 = 0x0000_1000;
    /// Class is serializable
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Initialize the class any time before the first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}
