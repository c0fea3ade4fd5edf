use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{ModuleRef, ModuleRefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `ModuleRef` row (ECMA-335 §II.22.31), heap indices unresolved
pub struct ModuleRefRaw {
    /// Row identifier within the `ModuleRef` table
    pub rid: u32,
    /// Token of this row, `0x1A??????`
    pub token: Token,
    /// Index into the string heap
    pub name: u32,
}

impl ModuleRefRaw {
    /// Converts this row into an owned [`ModuleRef`], resolving the name
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ModuleRefRc {
        Arc::new(ModuleRef {
            rid: self.rid,
            token: self.token,
            name: ctx.string(self.name),
            custom_attributes: ctx.custom_attributes(self.token),
        })
    }
}
