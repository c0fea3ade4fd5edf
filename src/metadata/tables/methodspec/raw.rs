use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, MethodSpec, MethodSpecRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `MethodSpec` row (ECMA-335 §II.22.29)
pub struct MethodSpecRaw {
    /// Row identifier within the `MethodSpec` table
    pub rid: u32,
    /// Token of this row, `0x2B??????`
    pub token: Token,
    /// `MethodDefOrRef` coded index of the generic method
    pub method: CodedIndex,
    /// Index into the blob heap
    pub instantiation: u32,
}

impl MethodSpecRaw {
    /// Materialize an unresolved [`MethodSpec`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> MethodSpecRc {
        MethodSpec::materialized(ctx, self.rid)
    }
}
