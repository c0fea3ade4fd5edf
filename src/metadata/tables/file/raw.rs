use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{File, FileRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `File` row (ECMA-335 §II.22.19), heap indices unresolved
pub struct FileRaw {
    /// Row identifier within the `File` table
    pub rid: u32,
    /// Token of this row, `0x26??????`
    pub token: Token,
    /// `FileAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the blob heap
    pub hash_value: u32,
}

impl FileRaw {
    /// Converts this row into an owned [`File`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> FileRc {
        Arc::new(File {
            rid: self.rid,
            token: self.token,
            flags: self.flags,
            name: ctx.string(self.name),
            hash_value: ctx.blob(self.hash_value),
            custom_attributes: ctx.custom_attributes(self.token),
        })
    }
}
