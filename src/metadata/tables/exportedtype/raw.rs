use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, ExportedType, ExportedTypeRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `ExportedType` row (ECMA-335 §II.22.14), heap indices unresolved
pub struct ExportedTypeRaw {
    /// Row identifier within the `ExportedType` table
    pub rid: u32,
    /// Token of this row, `0x27??????`
    pub token: Token,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Hint: the `TypeDef` token in the implementing module, may be 0
    pub type_def_id: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the string heap
    pub namespace: u32,
    /// `Implementation` coded index
    pub implementation: CodedIndex,
}

impl ExportedTypeRaw {
    /// Materialize an unresolved [`ExportedType`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ExportedTypeRc {
        ExportedType::materialized(
            ctx,
            self.rid,
            self.flags,
            self.type_def_id,
            ctx.string(self.namespace),
            ctx.string(self.name),
        )
    }
}
