//! Capabilities shared by every entity of the object graph.
//!
//! Entities come in two flavours, told apart by their [`Origin`]:
//!
//! - materialized from a backing store: the rid is the original row, and every lazy slot computes
//!   its value from the [`LoaderContext`] on first access;
//! - constructed in memory: the rid starts at 0 and every collection starts out initialized and
//!   empty.
//!
//! Both flavours share one struct per entity kind; lazy hooks dispatch on the origin tag.

use std::sync::{Arc, Weak};

use crate::metadata::{loader::LoaderContext, tables::TableId, token::Token};

/// Where an entity came from
#[derive(Debug, Clone, Default)]
pub enum Origin {
    /// Materialized from row `rid` of a backing store
    FromBytes {
        /// The original row
        rid: u32,
        /// The loader that materialized the entity
        reader: Weak<LoaderContext>,
    },
    /// Constructed by the host
    #[default]
    InMemory,
}

impl Origin {
    /// The original row, if materialized
    #[must_use]
    pub fn original_rid(&self) -> Option<u32> {
        match self {
            Origin::FromBytes { rid, .. } => Some(*rid),
            Origin::InMemory => None,
        }
    }

    /// The loader together with the original row, if materialized and the loader is still alive
    #[must_use]
    pub fn reader(&self) -> Option<(u32, Arc<LoaderContext>)> {
        match self {
            Origin::FromBytes { rid, reader } => reader.upgrade().map(|reader| (*rid, reader)),
            Origin::InMemory => None,
        }
    }

    /// Returns `true` for entities materialized from a backing store
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(self, Origin::FromBytes { .. })
    }
}

/// Identity of a table-backed entity
pub trait MetadataEntity {
    /// The table entities of this kind live in
    const TABLE: TableId;

    /// The current rid, 0 until placed in a table
    fn rid(&self) -> u32;

    /// Where the entity came from
    fn origin(&self) -> &Origin;

    /// The token, built from [`MetadataEntity::TABLE`] and the current rid
    fn token(&self) -> Token {
        Token::from_parts(Self::TABLE, self.rid())
    }
}

/// Implements [`MetadataEntity`] for an entity carrying `rid: AtomicU32` and `origin: Origin`,
/// plus a `set_rid` used by layout steps.
macro_rules! impl_metadata_entity {
    ($entity:ty, $table:ident) => {
        impl $crate::metadata::entity::MetadataEntity for $entity {
            const TABLE: $crate::metadata::tables::TableId =
                $crate::metadata::tables::TableId::$table;

            fn rid(&self) -> u32 {
                self.rid.load(std::sync::atomic::Ordering::Acquire)
            }

            fn origin(&self) -> &$crate::metadata::entity::Origin {
                &self.origin
            }
        }

        impl $entity {
            /// Assign the rid this entity occupies once written to a table
            pub fn set_rid(&self, rid: u32) {
                self.rid.store(rid, std::sync::atomic::Ordering::Release);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_origin() {
        let origin = Origin::default();
        assert!(!origin.is_materialized());
        assert!(origin.original_rid().is_none());
        assert!(origin.reader().is_none());
    }

    #[test]
    fn dropped_reader() {
        let origin = Origin::FromBytes {
            rid: 4,
            reader: Weak::new(),
        };
        assert!(origin.is_materialized());
        assert_eq!(origin.original_rid(), Some(4));
        assert!(origin.reader().is_none());
    }
}
