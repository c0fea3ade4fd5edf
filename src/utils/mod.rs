//! Utilities shared by the metadata object model.

mod synchronization;

pub use synchronization::{EntityLock, InitPolicy, LazySlot};
