use std::sync::Arc;

use crate::metadata::{
    tables::{CustomAttributeList, GenericParamConstraintRc, TableId, TypeDefOrRef},
    token::Token,
};

/// A type a generic argument has to derive from or implement
#[derive(Debug)]
pub struct GenericParamConstraint {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this constraint
    pub token: Token,
    /// The constraint type, `None` if the row references an invalid target
    pub constraint: Option<TypeDefOrRef>,
    /// Custom attributes applied to this constraint
    pub custom_attributes: CustomAttributeList,
}

impl GenericParamConstraint {
    /// Create a constraint in memory
    #[must_use]
    pub fn new(constraint: TypeDefOrRef) -> GenericParamConstraintRc {
        Arc::new(GenericParamConstraint {
            rid: 0,
            token: Token::from_parts(TableId::GenericParamConstraint, 0),
            constraint: Some(constraint),
            custom_attributes: Arc::new(boxcar::Vec::new()),
        })
    }
}
