use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, ImplMap, ImplMapRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `ImplMap` row (ECMA-335 §II.22.22), heap indices unresolved
pub struct ImplMapRaw {
    /// Row identifier within the `ImplMap` table
    pub rid: u32,
    /// Token of this row, `0x1C??????`
    pub token: Token,
    /// `PInvokeAttributes` bitmask
    pub mapping_flags: u32,
    /// `MemberForwarded` coded index of the mapped method
    pub member_forwarded: CodedIndex,
    /// Index into the string heap, the unmanaged entry point
    pub import_name: u32,
    /// Row in the `ModuleRef` table naming the native library
    pub import_scope: u32,
}

impl ImplMapRaw {
    /// Converts this row into an owned [`ImplMap`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ImplMapRc {
        Arc::new(ImplMap {
            rid: self.rid,
            token: self.token,
            flags: self.mapping_flags,
            name: ctx.string(self.import_name),
            scope: ctx.module_ref(self.import_scope),
        })
    }
}
