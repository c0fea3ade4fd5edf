use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, GenericParamConstraint, GenericParamConstraintRc, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `GenericParamConstraint` row (ECMA-335 §II.22.21)
pub struct GenericParamConstraintRaw {
    /// Row identifier within the `GenericParamConstraint` table
    pub rid: u32,
    /// Token of this row, `0x2C??????`
    pub token: Token,
    /// Row of the constrained `GenericParam`
    pub owner: u32,
    /// `TypeDefOrRef` coded index of the constraint type
    pub constraint: CodedIndex,
}

impl GenericParamConstraintRaw {
    /// Materialize a [`GenericParamConstraint`], resolving the constraint type
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> GenericParamConstraintRc {
        Arc::new(GenericParamConstraint {
            rid: self.rid,
            token: self.token,
            constraint: ctx.type_def_or_ref(self.constraint),
            custom_attributes: ctx.custom_attributes(Token::from_parts(
                TableId::GenericParamConstraint,
                self.rid,
            )),
        })
    }
}
