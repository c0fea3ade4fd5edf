use strum::{EnumCount, EnumIter};

use crate::metadata::{tables::TableId, token::Token};

/// The kinds of coded indices that reference other tables.
///
/// Each kind only admits a fixed set of target tables; a row pointing anywhere else is malformed
/// and is treated as a null reference by the loader.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`
    HasConstant,
    /// `MemberRef` parents
    MemberRefParent,
    /// `Event` or `Property`
    HasSemantics,
    /// `TypeDef`, `MethodDef` or `Assembly`
    HasDeclSecurity,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// `Field` or `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`
    Implementation,
    /// `MethodDef` or `MemberRef`, as custom attribute constructor
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef`
    ResolutionScope,
    /// `TypeDef` or `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The tables a coded index of this kind may point into
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MethodDefOrRef | CodedIndexType::CustomAttributeType => {
                &[TableId::MethodDef, TableId::MemberRef]
            }
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }
}

/// A decoded coded index: the target table and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The table this index points into
    pub tag: TableId,
    /// The 1-based row, 0 for a null reference
    pub row: u32,
    /// The token of the referenced row
    pub token: Token,
}

impl CodedIndex {
    /// Create a new coded index
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// A null reference
    #[must_use]
    pub fn null() -> CodedIndex {
        CodedIndex {
            tag: TableId::Module,
            row: 0,
            token: Token::new(0),
        }
    }

    /// Returns `true` if this index does not reference a row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }

    /// Returns `true` if this index is non-null and points into a table admitted by `kind`
    #[must_use]
    pub fn is_valid_for(&self, kind: CodedIndexType) -> bool {
        !self.is_null() && kind.tables().contains(&self.tag)
    }
}

impl Default for CodedIndex {
    fn default() -> Self {
        CodedIndex::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_follows_tag() {
        let index = CodedIndex::new(TableId::AssemblyRef, 3);
        assert_eq!(index.token.value(), 0x2300_0003);
    }

    #[test]
    fn module_row_one() {
        let index = CodedIndex::new(TableId::Module, 1);
        assert_eq!(index.token.value(), 0x0000_0001);
        assert!(index.is_valid_for(CodedIndexType::ResolutionScope));
    }

    #[test]
    fn validity() {
        assert!(!CodedIndex::null().is_valid_for(CodedIndexType::TypeDefOrRef));
        assert!(!CodedIndex::new(TableId::Field, 1).is_valid_for(CodedIndexType::TypeDefOrRef));
        assert!(CodedIndex::new(TableId::TypeSpec, 1).is_valid_for(CodedIndexType::TypeDefOrRef));
        assert!(CodedIndex::new(TableId::Assembly, 1).is_valid_for(CodedIndexType::HasDeclSecurity));
        assert!(!CodedIndex::new(TableId::Field, 1).is_valid_for(CodedIndexType::HasDeclSecurity));
    }
}
