//! `ManifestResource` table: named resources of an assembly.
//!
//! A resource is embedded in the image of the manifest module, lives in another file of the
//! assembly, or is supplied by another assembly. Which one follows from its implementation.

use std::sync::Arc;

use strum::Display;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The resources of a module
pub type ManifestResourceList = Arc<boxcar::Vec<ManifestResourceRc>>;
/// A reference to a `ManifestResource`
pub type ManifestResourceRc = Arc<ManifestResource>;

#[allow(non_snake_case)]
/// Flags of a manifest resource, ECMA-335 §II.23.1.9
pub mod ManifestResourceAttributes {
    /// Mask for the visibility bits
    pub const VISIBILITY_MASK: u32 = 0x0007;
    /// The resource is exported from the assembly
    pub const PUBLIC: u32 = 0x0001;
    /// The resource is private to the assembly
    pub const PRIVATE: u32 = 0x0002;
}

/// Where the bytes of a resource live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ResourceType {
    /// In the resources directory of the manifest module
    Embedded,
    /// In another assembly
    AssemblyLinked,
    /// In another file of this assembly
    Linked,
}
