use std::sync::Arc;

use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, CustomAttribute, CustomAttributeRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `CustomAttribute` row (ECMA-335 §II.22.10), heap indices unresolved
pub struct CustomAttributeRaw {
    /// Row identifier within the `CustomAttribute` table
    pub rid: u32,
    /// Token of this row, `0x0C??????`
    pub token: Token,
    /// `HasCustomAttribute` coded index of the decorated entity
    pub parent: CodedIndex,
    /// `CustomAttributeType` coded index of the constructor
    pub constructor: CodedIndex,
    /// Index into the blob heap
    pub value: u32,
}

impl CustomAttributeRaw {
    /// Converts this row into an owned [`CustomAttribute`], resolving the constructor
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> CustomAttributeRc {
        Arc::new(CustomAttribute {
            rid: self.rid,
            token: self.token,
            constructor: ctx.custom_attribute_type(self.constructor),
            value: ctx.blob(self.value),
        })
    }
}
