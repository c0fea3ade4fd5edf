use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, Constant, ConstantRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Constant` row (ECMA-335 §II.22.9), heap indices unresolved
pub struct ConstantRaw {
    /// Row identifier within the `Constant` table
    pub rid: u32,
    /// Token of this row, `0x0B??????`
    pub token: Token,
    /// Element type of the value, see ECMA-335 §II.23.1.16
    pub base: u8,
    /// `HasConstant` coded index of the field, parameter or property
    pub parent: CodedIndex,
    /// Index into the blob heap
    pub value: u32,
}

impl ConstantRaw {
    /// Converts this row into an owned [`Constant`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ConstantRc {
        Arc::new(Constant {
            rid: self.rid,
            token: self.token,
            element_type: self.base,
            value: ctx.blob(self.value),
        })
    }
}
