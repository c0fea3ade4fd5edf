//! `Field` table: fields declared by the types of the current module.

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The fields declared by a type
pub type FieldList = Arc<OwnedList<DeclaredFields>>;
/// A reference to a `Field`
pub type FieldRc = Arc<Field>;

#[allow(non_snake_case)]
/// Field attribute flags, ECMA-335 §II.23.1.5
pub mod FieldAttributes {
    /// Mask for extracting member access information
    pub const FIELD_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessible by anyone in the assembly
    pub const ASSEMBLY: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessible by sub-types anywhere, plus anyone in the assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessible by anyone who has visibility to this scope
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on the type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Field can only be initialized, not written to after init
    pub const INIT_ONLY: u32 = 0x0020;
    /// Value is a compile time constant
    pub const LITERAL: u32 = 0x0040;
    /// Field has a special name
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// The runtime should check the name encoding
    pub const RTSPECIAL_NAME: u32 = 0x0400;
    /// Field has marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x1000;
    /// Field has a default value
    pub const HAS_DEFAULT: u32 = 0x8000;
    /// Field has an RVA
    pub const HAS_FIELD_RVA: u32 = 0x0100;
}
