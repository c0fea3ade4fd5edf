use crate::metadata::{
    loader::LoaderContext,
    tables::{Param, ParamRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Param` row (ECMA-335 §II.22.33), heap indices unresolved
pub struct ParamRaw {
    /// Row identifier within the `Param` table
    pub rid: u32,
    /// Token of this row, `0x08??????`
    pub token: Token,
    /// `ParamAttributes` bitmask
    pub flags: u32,
    /// 0 for the return value, 1-based position otherwise
    pub sequence: u32,
    /// Index into the string heap
    pub name: u32,
}

impl ParamRaw {
    /// Materialize a [`Param`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ParamRc {
        Param::materialized(ctx, self.rid, self.flags, self.sequence, ctx.string(self.name))
    }
}
