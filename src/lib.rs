// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cilgraph
//!
//! A lazy, mutable object model over .NET (ECMA-335) metadata, with reference resolution across
//! module and assembly boundaries.
//!
//! ## Features
//!
//! - **Lazy materialization** - Entities are created from rows on demand, and every property
//!   that points at another entity is computed on first access and cached
//! - **Consistent ownership** - Member collections keep owner back-references in sync, and
//!   refuse to let an entity belong to two owners
//! - **Cross-assembly resolution** - `TypeRef` and `MemberRef` resolve to their definitions,
//!   following exported-type forwarders with a bounded hop count
//! - **Windows Runtime projection** - References into `.winmd` files map onto the CLR types
//!   they surface as
//! - **Generic containment analysis** - Find out whether a signature still mentions an open
//!   generic parameter
//! - **Thread safety** - Under the default policy each lazy value is computed exactly once, even
//!   when several threads ask for it at the same time
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cilgraph::prelude::*;
//!
//! let mut provider = MemoryProvider::new();
//! provider.add_module("Demo.dll");
//! provider.add_type_def("", "<Module>", 0, None);
//! provider.add_assembly(&AssemblyIdentity::new(
//!     "Demo",
//!     AssemblyVersion::new(1, 0, 0, 0),
//!     None,
//!     None,
//! ));
//!
//! let assembly = Assembly::from_provider(Arc::new(provider), LoaderConfig::default())?;
//! let module = assembly.manifest_module().unwrap();
//! assert!(module.global_type().is_some());
//! # Ok::<(), cilgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::provider`] - The backing store a module is materialized from. Reading PE files
//!   is left to the host; [`metadata::provider::MemoryProvider`] is a complete in-memory store
//! - [`metadata::tables`] - The entities and their lazy properties
//! - [`metadata::ownership`] - Owner-tracking collections
//! - [`metadata::resolver`] - The [`metadata::resolver::Resolver`] and its collaborators
//! - [`metadata::typesystem`] - The [`metadata::typesystem::GenericContainment`] analyzer
//!
//! ## Error Handling
//!
//! Lookups report "not found" as `None` and never fail. Operations that can be misused return
//! [`Result`], see [`Error`] for the failure categories.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (re-materialized rows, followed
//! forwarders, exhausted recursion bounds) and never installs a subscriber.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use cilgraph::prelude::*;
///
/// let ty = TypeDef::new("Demo", "Widget", 0);
/// assert_eq!(ty.full_name(), "Demo.Widget");
/// ```
pub mod prelude;

/// The metadata object model, resolution and analysis.
pub mod metadata;

/// Synchronization primitives behind lazy entity properties.
pub mod utils;

pub use error::{Error, Result};
