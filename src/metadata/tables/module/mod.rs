//! `Module` table: the root of a materialized object graph.
//!
//! A [`Module`] created by [`Module::from_provider`] owns the
//! [`LoaderContext`](crate::metadata::loader::LoaderContext) that materializes every other entity
//! of the graph. Entities refer back to the loader weakly, so dropping the module releases the
//! whole graph.
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::tables::{Module, TypeDef};
//!
//! let module = Module::new("Demo.dll");
//! assert_eq!(module.types().len(), 1);
//! assert!(module.global_type().is_some_and(|global| global.name() == "<Module>"));
//!
//! let widget = TypeDef::new("Demo", "Widget", 0);
//! module.types().add(widget.clone())?;
//! assert!(module.find_by_name("Demo", "Widget").is_some());
//! # Ok::<(), cilgraph::Error>(())
//! ```

use std::sync::Arc;

use crate::metadata::ownership::OwnedList;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to a `Module`
pub type ModuleRc = Arc<Module>;
/// The modules of an assembly
pub type ModuleList = Arc<OwnedList<AssemblyModules>>;
