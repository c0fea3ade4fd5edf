use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, TypeRef, TypeRefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `TypeRef` row (ECMA-335 §II.22.38), heap indices unresolved
pub struct TypeRefRaw {
    /// Row identifier within the `TypeRef` table
    pub rid: u32,
    /// Token of this row, `0x01??????`
    pub token: Token,
    /// `ResolutionScope` coded index
    pub resolution_scope: CodedIndex,
    /// Index into the string heap
    pub type_name: u32,
    /// Index into the string heap
    pub type_namespace: u32,
}

impl TypeRefRaw {
    /// Materialize an unresolved [`TypeRef`]; the scope is resolved on first access
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> TypeRefRc {
        TypeRef::materialized(
            ctx,
            self.rid,
            ctx.string(self.type_namespace),
            ctx.string(self.type_name),
        )
    }
}
