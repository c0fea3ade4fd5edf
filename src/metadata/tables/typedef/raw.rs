use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, TypeDef, TypeDefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `TypeDef` row (ECMA-335 §II.22.37), heap indices unresolved.
///
/// Field, method and nesting ranges are not part of the row; they are answered by the provider's
/// relations.
pub struct TypeDefRaw {
    /// Row identifier within the `TypeDef` table
    pub rid: u32,
    /// Token of this row, `0x02??????`
    pub token: Token,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub type_name: u32,
    /// Index into the string heap
    pub type_namespace: u32,
    /// `TypeDefOrRef` coded index of the base type
    pub extends: CodedIndex,
}

impl TypeDefRaw {
    /// Materialize an unresolved [`TypeDef`]: names and flags only, everything else is lazy
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> TypeDefRc {
        TypeDef::materialized(
            ctx,
            self.rid,
            self.flags,
            ctx.string(self.type_namespace),
            ctx.string(self.type_name),
        )
    }
}
