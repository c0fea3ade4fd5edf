use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, MemberRef, MemberRefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `MemberRef` row (ECMA-335 §II.22.25), heap indices unresolved
pub struct MemberRefRaw {
    /// Row identifier within the `MemberRef` table
    pub rid: u32,
    /// Token of this row, `0x0A??????`
    pub token: Token,
    /// `MemberRefParent` coded index
    pub class: CodedIndex,
    /// Index into the string heap
    pub name: u32,
    /// Index into the blob heap
    pub signature: u32,
}

impl MemberRefRaw {
    /// Materialize an unresolved [`MemberRef`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> MemberRefRc {
        MemberRef::materialized(ctx, self.rid, ctx.string(self.name))
    }
}
