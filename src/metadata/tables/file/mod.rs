//! `File` table: the other files making up a multi-module assembly.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `File`
pub type FileRc = Arc<File>;

#[allow(non_snake_case)]
/// Flags of a file entry, ECMA-335 §II.23.1.6
pub mod FileAttributes {
    /// The file is a module with metadata
    pub const CONTAINS_META_DATA: u32 = 0x0000;
    /// The file is a resource or other non-metadata file
    pub const CONTAINS_NO_META_DATA: u32 = 0x0001;
}
