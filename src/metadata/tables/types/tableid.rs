use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers of the metadata tables the object model materializes entities from.
///
/// The discriminant is the table byte used in the upper 8 bits of a [`crate::metadata::token::Token`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
pub enum TableId {
    /// `Module` table, 0x00
    Module = 0x00,
    /// `TypeRef` table, 0x01
    TypeRef = 0x01,
    /// `TypeDef` table, 0x02
    TypeDef = 0x02,
    /// `Field` table, 0x04
    Field = 0x04,
    /// `MethodDef` table, 0x06
    MethodDef = 0x06,
    /// `Param` table, 0x08
    Param = 0x08,
    /// `MemberRef` table, 0x0A
    MemberRef = 0x0A,
    /// `Constant` table, 0x0B
    Constant = 0x0B,
    /// `CustomAttribute` table, 0x0C
    CustomAttribute = 0x0C,
    /// `DeclSecurity` table, 0x0E
    DeclSecurity = 0x0E,
    /// `StandAloneSig` table, 0x11
    StandAloneSig = 0x11,
    /// `Event` table, 0x14
    Event = 0x14,
    /// `Property` table, 0x17
    Property = 0x17,
    /// `MethodSemantics` table, 0x18
    MethodSemantics = 0x18,
    /// `MethodImpl` table, 0x19
    MethodImpl = 0x19,
    /// `ModuleRef` table, 0x1A
    ModuleRef = 0x1A,
    /// `TypeSpec` table, 0x1B
    TypeSpec = 0x1B,
    /// `ImplMap` table, 0x1C
    ImplMap = 0x1C,
    /// `Assembly` table, 0x20
    Assembly = 0x20,
    /// `AssemblyRef` table, 0x23
    AssemblyRef = 0x23,
    /// `File` table, 0x26
    File = 0x26,
    /// `ExportedType` table, 0x27
    ExportedType = 0x27,
    /// `ManifestResource` table, 0x28
    ManifestResource = 0x28,
    /// `GenericParam` table, 0x2A
    GenericParam = 0x2A,
    /// `MethodSpec` table, 0x2B
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table, 0x2C
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Look up the table identified by a token's table byte
    #[must_use]
    pub fn from_byte(value: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == value)
    }
}
