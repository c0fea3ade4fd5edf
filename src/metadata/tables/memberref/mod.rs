//! `MemberRef` table: references to fields and methods, by parent, name and signature.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `MemberRef`
pub type MemberRefRc = Arc<MemberRef>;
