use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, GenericParam, GenericParamRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `GenericParam` row (ECMA-335 §II.22.20), heap indices unresolved
pub struct GenericParamRaw {
    /// Row identifier within the `GenericParam` table
    pub rid: u32,
    /// Token of this row, `0x2A??????`
    pub token: Token,
    /// 0-based position in the owner's parameter list
    pub number: u32,
    /// `GenericParamAttributes` bitmask
    pub flags: u32,
    /// `TypeOrMethodDef` coded index of the owner
    pub owner: CodedIndex,
    /// Index into the string heap
    pub name: u32,
}

impl GenericParamRaw {
    /// Materialize an unresolved [`GenericParam`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> GenericParamRc {
        GenericParam::materialized(ctx, self.rid, self.number, self.flags, ctx.string(self.name))
    }
}
