use std::sync::Arc;

use crate::metadata::{
    tables::{CustomAttributeRc, MethodDefOrRef, TableId},
    token::Token,
};

/// An attribute instance: its constructor and the encoded arguments
#[derive(Debug)]
pub struct CustomAttribute {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this attribute
    pub token: Token,
    /// The attribute constructor, `None` if the row references an invalid target
    pub constructor: Option<MethodDefOrRef>,
    /// The encoded fixed and named arguments
    pub value: Vec<u8>,
}

impl CustomAttribute {
    /// Create an attribute in memory
    #[must_use]
    pub fn new(constructor: MethodDefOrRef, value: Vec<u8>) -> CustomAttributeRc {
        Arc::new(CustomAttribute {
            rid: 0,
            token: Token::from_parts(TableId::CustomAttribute, 0),
            constructor: Some(constructor),
            value,
        })
    }
}
