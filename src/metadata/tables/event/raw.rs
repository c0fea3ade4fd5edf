use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, Event, EventRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Event` row (ECMA-335 §II.22.13), heap indices unresolved
pub struct EventRaw {
    /// Row identifier within the `Event` table
    pub rid: u32,
    /// Token of this row, `0x14??????`
    pub token: Token,
    /// `EventAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// `TypeDefOrRef` coded index of the delegate type
    pub event_type: CodedIndex,
}

impl EventRaw {
    /// Materialize an unresolved [`Event`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> EventRc {
        Event::materialized(ctx, self.rid, self.flags, ctx.string(self.name))
    }
}
