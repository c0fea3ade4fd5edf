use std::sync::Arc;

use crate::metadata::{
    streams::Name,
    tables::{CustomAttributeList, FileAttributes, FileRc, TableId},
    token::Token,
};

/// A file of a multi-module assembly
pub struct File {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this entry
    pub token: Token,
    /// `FileAttributes` bitmask
    pub flags: u32,
    /// File name, matched against module names when resolving
    pub name: Name,
    /// Hash of the file contents
    pub hash_value: Vec<u8>,
    /// Custom attributes applied to this entry
    pub custom_attributes: CustomAttributeList,
}

impl File {
    /// Create a file entry in memory
    #[must_use]
    pub fn new(name: impl Into<Name>, flags: u32) -> FileRc {
        Arc::new(File {
            rid: 0,
            token: Token::from_parts(TableId::File, 0),
            flags,
            name: name.into(),
            hash_value: Vec::new(),
            custom_attributes: Arc::new(boxcar::Vec::new()),
        })
    }

    /// Returns `true` if the file is a module carrying metadata
    #[must_use]
    pub fn contains_metadata(&self) -> bool {
        self.flags & FileAttributes::CONTAINS_NO_META_DATA == 0
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("rid", &self.rid)
            .field("name", &self.name)
            .field("flags", &format_args!("{:#x}", self.flags))
            .finish_non_exhaustive()
    }
}
