use crate::metadata::{tables::CodedIndex, token::Token};

#[derive(Clone, Debug)]
/// Raw `MethodImpl` row (ECMA-335 §II.22.27)
pub struct MethodImplRaw {
    /// Row identifier within the `MethodImpl` table
    pub rid: u32,
    /// Token of this row, `0x19??????`
    pub token: Token,
    /// Row in the `TypeDef` table declaring the override
    pub class: u32,
    /// `MethodDefOrRef` coded index of the implementing method
    pub method_body: CodedIndex,
    /// `MethodDefOrRef` coded index of the overridden method
    pub method_declaration: CodedIndex,
}
