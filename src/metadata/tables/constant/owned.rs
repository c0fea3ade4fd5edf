use std::sync::Arc;

use crate::metadata::{
    tables::{ConstantRc, TableId},
    token::Token,
};

/// A default value, stored as its raw little-endian encoding
#[derive(Debug)]
pub struct Constant {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this constant
    pub token: Token,
    /// Element type of the value
    pub element_type: u8,
    /// Encoded value
    pub value: Vec<u8>,
}

impl Constant {
    /// Create a constant in memory
    #[must_use]
    pub fn new(element_type: u8, value: Vec<u8>) -> ConstantRc {
        Arc::new(Constant {
            rid: 0,
            token: Token::from_parts(TableId::Constant, 0),
            element_type,
            value,
        })
    }
}
