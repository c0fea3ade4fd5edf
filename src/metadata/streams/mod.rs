//! Heap values: names and the in-memory string heap.

mod name;
mod strings;

pub use name::Name;
pub use strings::StringHeap;
