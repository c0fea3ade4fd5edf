//! `Event` table: events declared by the types of the current module.

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// The events declared by a type
pub type EventList = Arc<OwnedList<DeclaredEvents>>;
/// A reference to an `Event`
pub type EventRc = Arc<Event>;

#[allow(non_snake_case)]
/// Event attribute flags, ECMA-335 §II.23.1.4
pub mod EventAttributes {
    /// Event is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the event
    pub const RTSPECIAL_NAME: u32 = 0x0400;
}
