use std::sync::Arc;

use crate::metadata::{
    streams::Name,
    tables::{CustomAttributeList, ModuleRefRc, TableId},
    token::Token,
};

/// A reference to another module of the current assembly.
///
/// Module references are immutable once created; the resolver matches them against the modules
/// of the owning assembly by name, ignoring ASCII case.
pub struct ModuleRef {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this reference
    pub token: Token,
    /// Name of the referenced module, including the file extension
    pub name: Name,
    /// Custom attributes applied to this reference
    pub custom_attributes: CustomAttributeList,
}

impl ModuleRef {
    /// Create a module reference in memory
    #[must_use]
    pub fn new(name: impl Into<Name>) -> ModuleRefRc {
        Arc::new(ModuleRef {
            rid: 0,
            token: Token::from_parts(TableId::ModuleRef, 0),
            name: name.into(),
            custom_attributes: Arc::new(boxcar::Vec::new()),
        })
    }
}

impl std::fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRef")
            .field("rid", &self.rid)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
