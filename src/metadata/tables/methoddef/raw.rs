use crate::metadata::{
    loader::LoaderContext,
    tables::{MethodDef, MethodDefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `MethodDef` row (ECMA-335 §II.22.26), heap indices unresolved.
///
/// The parameter range is not part of the row; it is answered by the provider's relations.
pub struct MethodDefRaw {
    /// Row identifier within the `MethodDef` table
    pub rid: u32,
    /// Token of this row, `0x06??????`
    pub token: Token,
    /// RVA of the method body, 0 for abstract and runtime-implemented methods
    pub rva: u32,
    /// `MethodImplAttributes` bitmask
    pub impl_flags: u32,
    /// `MethodAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the blob heap
    pub signature: u32,
}

impl MethodDefRaw {
    /// Materialize an unresolved [`MethodDef`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> MethodDefRc {
        MethodDef::materialized(
            ctx,
            self.rid,
            self.rva,
            self.impl_flags,
            self.flags,
            ctx.string(self.name),
        )
    }
}
