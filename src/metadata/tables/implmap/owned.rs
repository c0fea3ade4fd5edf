use std::sync::Arc;

use crate::metadata::{
    streams::Name,
    tables::{ImplMapRc, ModuleRefRc, TableId},
    token::Token,
};

/// Maps a method to an entry point of a native library
#[derive(Debug)]
pub struct ImplMap {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this mapping
    pub token: Token,
    /// `PInvokeAttributes` bitmask
    pub flags: u32,
    /// Name of the unmanaged entry point
    pub name: Name,
    /// The native library, `None` if the row references a missing module reference
    pub scope: Option<ModuleRefRc>,
}

impl ImplMap {
    /// Create a mapping in memory
    #[must_use]
    pub fn new(scope: ModuleRefRc, name: impl Into<Name>, flags: u32) -> ImplMapRc {
        Arc::new(ImplMap {
            rid: 0,
            token: Token::from_parts(TableId::ImplMap, 0),
            flags,
            name: name.into(),
            scope: Some(scope),
        })
    }
}
