use crate::metadata::{
    loader::LoaderContext,
    tables::{TypeSpec, TypeSpecRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `TypeSpec` row (ECMA-335 §II.22.39)
pub struct TypeSpecRaw {
    /// Row identifier within the `TypeSpec` table
    pub rid: u32,
    /// Token of this row, `0x1B??????`
    pub token: Token,
    /// Index into the blob heap
    pub signature: u32,
}

impl TypeSpecRaw {
    /// Materialize a [`TypeSpec`]; the signature is decoded on first access
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> TypeSpecRc {
        TypeSpec::materialized(ctx, self.rid)
    }
}
