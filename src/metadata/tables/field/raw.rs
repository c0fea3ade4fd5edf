use crate::metadata::{
    loader::LoaderContext,
    tables::{Field, FieldRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Field` row (ECMA-335 §II.22.15), heap indices unresolved
pub struct FieldRaw {
    /// Row identifier within the `Field` table
    pub rid: u32,
    /// Token of this row, `0x04??????`
    pub token: Token,
    /// `FieldAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the blob heap
    pub signature: u32,
}

impl FieldRaw {
    /// Materialize an unresolved [`Field`]; the signature is decoded on first access
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> FieldRc {
        Field::materialized(ctx, self.rid, self.flags, ctx.string(self.name))
    }
}
