use crate::metadata::token::Token;

#[derive(Clone, Debug)]
/// Raw `Module` row (ECMA-335 §II.22.30), heap indices unresolved
pub struct ModuleRaw {
    /// Row identifier, always 1
    pub rid: u32,
    /// Token of this row, `0x00000001`
    pub token: Token,
    /// Reserved, 0
    pub generation: u16,
    /// Index into the string heap
    pub name: u32,
    /// Index into the GUID heap
    pub mvid: u32,
}
