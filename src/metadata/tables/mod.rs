//! Metadata tables as entities.
//!
//! Every table lives in its own directory with a `raw.rs` (the row as a
//! [`MetadataProvider`](crate::metadata::provider::MetadataProvider) supplies it, heap indices
//! unresolved) and, for tables that become entities, an `owned.rs` with the lazy entity built
//! from that row.
//!
//! Entities that other entities point at are shared through `Arc` aliases (`TypeDefRc`,
//! `MethodDefRc`, ...). Coded-index columns become tagged unions such as [`TypeDefOrRef`] and [`ResolutionScope`].

mod assembly;
mod assemblyref;
mod constant;
mod customattribute;
mod declsecurity;
mod event;
mod exportedtype;
mod field;
mod file;
mod genericparam;
mod genericparamconstraint;
mod implmap;
mod manifestresource;
mod memberref;
mod methoddef;
mod methodimpl;
mod methodsemantics;
mod methodspec;
mod module;
mod moduleref;
mod param;
mod property;
mod references;
mod typedef;
mod typeref;
mod types;
mod typespec;

pub use assembly::*;
pub use assemblyref::*;
pub use constant::*;
pub use customattribute::*;
pub use declsecurity::*;
pub use event::*;
pub use exportedtype::*;
pub use field::*;
pub use file::*;
pub use genericparam::*;
pub use genericparamconstraint::*;
pub use implmap::*;
pub use manifestresource::*;
pub use memberref::*;
pub use methoddef::*;
pub use methodimpl::*;
pub use methodsemantics::*;
pub use methodspec::*;
pub use module::*;
pub use moduleref::*;
pub use param::*;
pub use property::*;
pub use references::*;
pub use typedef::*;
pub use typeref::*;
pub use types::*;
pub use typespec::*;
