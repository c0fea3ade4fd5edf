use crate::metadata::{tables::CodedIndex, token::Token};

#[derive(Clone, Debug)]
/// Raw `MethodSemantics` row (ECMA-335 §II.22.28)
pub struct MethodSemanticsRaw {
    /// Row identifier within the `MethodSemantics` table
    pub rid: u32,
    /// Token of this row, `0x18??????`
    pub token: Token,
    /// `MethodSemanticsAttributes` bitmask
    pub semantics: u32,
    /// Row in the `MethodDef` table
    pub method: u32,
    /// `HasSemantics` coded index of the property or event
    pub association: CodedIndex,
}
