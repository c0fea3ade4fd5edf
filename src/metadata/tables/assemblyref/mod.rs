//! `AssemblyRef` table: references to other assemblies.
//!
//! An [`AssemblyRef`] is the scope of every type reference into another assembly, and the
//! implementation of every exported type that was forwarded there. Resolution hands
//! [`AssemblyRef::identity`] to an [`crate::metadata::resolver::AssemblyResolver`].

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A vector that holds a list of `AssemblyRef`
pub type AssemblyRefList = Arc<boxcar::Vec<AssemblyRefRc>>;
/// A reference to an `AssemblyRef`
pub type AssemblyRefRc = Arc<AssemblyRef>;

#[allow(non_snake_case)]
/// Flags of an assembly reference, ECMA-335 §II.23.1.2
pub mod AssemblyFlags {
    /// The reference holds the full public key rather than its token
    pub const PUBLIC_KEY: u32 = 0x0001;
    /// The referenced assembly may be retargeted at runtime
    pub const RETARGETABLE: u32 = 0x0100;
    /// Mask of the content type bits
    pub const CONTENT_TYPE_MASK: u32 = 0x0E00;
    /// Content type of a Windows Runtime metadata file
    pub const WINDOWS_RUNTIME: u32 = 0x0200;
}
