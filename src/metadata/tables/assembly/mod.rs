//! `Assembly` table: the identity of the current assembly and the modules it consists of.
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     tables::{Assembly, Module},
//! };
//!
//! let assembly = Assembly::new(AssemblyIdentity::new(
//!     "Demo",
//!     AssemblyVersion::new(1, 0, 0, 0),
//!     None,
//!     None,
//! ));
//! assembly.modules().add(Module::new("Demo.dll"))?;
//! assert!(assembly.find_module("demo.DLL").is_some());
//! # Ok::<(), cilgraph::Error>(())
//! ```

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to an `Assembly`
pub type AssemblyRc = Arc<Assembly>;
