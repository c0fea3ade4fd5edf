//! `MethodImpl` table: explicit method overrides.
//!
//! Rows are grouped by class and exposed per method through
//! [`crate::metadata::tables::MethodDef::overrides`].

mod raw;

pub use raw::*;
