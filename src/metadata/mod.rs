//! The metadata object model.
//!
//! A module is an entity graph: types own their members, members point back at their owners, and
//! references point at rows of other tables. Graphs are either built in memory or materialized
//! lazily from a [`provider::MetadataProvider`]. A materialized entity carries only the scalar
//! columns of its row; everything else is computed on first access and cached.
//!
//! # Key Components
//!
//! - [`tables`] - The entities, one per metadata table, and the coded-index unions
//! - [`ownership`] - Collections that keep owner back-references consistent
//! - [`provider`] - The backing-store seam and the in-memory [`provider::MemoryProvider`]
//! - [`loader`] - Materialization of rows into entities
//! - [`resolver`] - Resolution of references across modules and assemblies
//! - [`typesystem`] - Structural analysis of types and signatures
//! - [`signatures`] - The signature grammar over resolved entities
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilgraph::metadata::{
//!     config::LoaderConfig,
//!     provider::MemoryProvider,
//!     tables::Module,
//! };
//!
//! let mut provider = MemoryProvider::new();
//! provider.add_module("Empty.dll");
//!
//! let module = Module::from_provider(Arc::new(provider), LoaderConfig::default())?;
//! assert_eq!(module.name(), "Empty.dll");
//! # Ok::<(), cilgraph::Error>(())
//! ```

#[macro_use]
pub mod entity;

pub mod config;
pub mod customdebuginformation;
pub mod identity;
pub mod loader;
pub mod ownership;
pub mod provider;
pub mod resolver;
pub mod signatures;
pub mod streams;
pub mod tables;
pub mod token;
pub mod typesystem;
