//! `MethodDef` table: methods declared by the types of the current module.
//!
//! Besides its signature, a method carries a number of lazily computed properties that live in
//! other tables: its parameters, generic parameters, P/Invoke mapping (`ImplMap`), accessor
//! semantics (`MethodSemantics`), explicit overrides (`MethodImpl` rows of the declaring type) and
//! its body.

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod body;
mod flags;
mod owned;
mod raw;

pub use body::*;
pub use flags::*;
pub use owned::*;
pub use raw::*;

/// The methods declared by a type
pub type MethodDefList = Arc<OwnedList<DeclaredMethods>>;
/// A reference to a `MethodDef`
pub type MethodDefRc = Arc<MethodDef>;
/// The explicit overrides of a method
pub type MethodOverrideList = Arc<boxcar::Vec<MethodOverride>>;
