//! Fixtures shared by the unit tests.
//!
//! Every fixture builds a [`MemoryProvider`](crate::metadata::provider::MemoryProvider) and
//! materializes it, so the lazy paths of the loader are what the tests exercise.

mod factories;
mod forwarding;

pub(crate) use factories::*;
pub(crate) use forwarding::*;
