//! Structural analysis over the type system.
//!
//! Every walk over types and signatures in this crate is bounded by [`MAX_RECURSION_DEPTH`]:
//! graphs built from untrusted input may be cyclic (a `TypeSpec` whose signature refers back to
//! itself, a type nested in its own nested type) or pathologically deep. Exceeding the bound
//! yields a conservative default, never an error.
//!
//! - [`GenericContainment`] - decides whether a type or signature contains an open generic
//!   parameter (`!n` or `!!n`)

mod generics;

pub use generics::GenericContainment;

/// Maximum recursion depth for walks over types and signatures
pub const MAX_RECURSION_DEPTH: usize = 100;
