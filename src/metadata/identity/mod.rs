//! Assembly identities.
//!
//! Resolution across assembly boundaries needs to decide whether a loaded assembly satisfies a
//! symbolic assembly reference. This module provides the pieces for that decision:
//!
//! - [`Identity`] - a strong name, either a full public key or its 8-byte token
//! - [`AssemblyVersion`] - four-part version with compatibility rules
//! - [`AssemblyIdentity`] - name, version, culture and strong name combined
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::identity::AssemblyIdentity;
//!
//! let required = AssemblyIdentity::parse("System.Runtime, Version=4.0.0.0, Culture=neutral")?;
//! let loaded = AssemblyIdentity::parse("system.runtime, Version=4.2.1.0")?;
//! assert!(loaded.satisfies(&required));
//! # Ok::<(), cilgraph::Error>(())
//! ```

mod assembly;
mod key;

pub use assembly::{AssemblyIdentity, AssemblyVersion};
pub use key::{AssemblyHashAlgorithm, Identity};
