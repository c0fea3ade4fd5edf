//! Custom debug information attached to metadata entities.
//!
//! Records are supplied by the debug-symbol collaborator through the
//! [`MetadataProvider`](crate::metadata::provider::MetadataProvider) and exposed lazily on
//! [`MethodDef::custom_debug_infos`](crate::metadata::tables::MethodDef::custom_debug_infos).

mod types;

use std::sync::Arc;

pub use types::{CustomDebugInfo, CustomDebugKind};

/// A list of custom debug information records
pub type CustomDebugInfoList = Arc<boxcar::Vec<CustomDebugInfo>>;
