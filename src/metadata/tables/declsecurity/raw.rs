use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, DeclSecurity, DeclSecurityRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `DeclSecurity` row (ECMA-335 §II.22.11), heap indices unresolved
pub struct DeclSecurityRaw {
    /// Row identifier within the `DeclSecurity` table
    pub rid: u32,
    /// Token of this row, `0x0E??????`
    pub token: Token,
    /// `SecurityAction` value
    pub action: u16,
    /// `HasDeclSecurity` coded index of the protected entity
    pub parent: CodedIndex,
    /// Index into the blob heap
    pub permission_set: u32,
}

impl DeclSecurityRaw {
    /// Converts this row into an owned [`DeclSecurity`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> DeclSecurityRc {
        Arc::new(DeclSecurity {
            rid: self.rid,
            token: self.token,
            action: self.action,
            permission_set: ctx.blob(self.permission_set),
            custom_attributes: ctx.custom_attributes(self.token),
        })
    }
}
