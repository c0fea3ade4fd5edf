//! Configuration for loading and resolving.
//!
//! Both configurations are plain values with a `Default`; there is no file or environment layer.
//! Hosts that want different settings build them in code:
//!
//! ```rust
//! use cilgraph::metadata::config::{LoaderConfig, ResolverConfig};
//!
//! let loader = LoaderConfig::single_threaded();
//! let resolver = ResolverConfig::default().without_projection();
//! assert_eq!(resolver.max_forwarder_hops, 30);
//! # let _ = loader;
//! ```

use crate::utils::InitPolicy;

/// Settings applied when materializing a module from a backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderConfig {
    /// How lazy slots of every entity in the graph are initialized
    pub init_policy: InitPolicy,
}

impl LoaderConfig {
    /// Unsynchronized lazy initialization, for hosts that never share the graph across threads
    #[must_use]
    pub fn single_threaded() -> Self {
        LoaderConfig {
            init_policy: InitPolicy::NoLocking,
        }
    }

    /// Per-entity locking, every lazy value is computed exactly once
    #[must_use]
    pub fn thread_safe() -> Self {
        LoaderConfig {
            init_policy: InitPolicy::PerEntityLock,
        }
    }
}

/// Settings of a [`crate::metadata::resolver::Resolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Map references into Windows Runtime metadata onto their CLR projections before resolving
    pub project_winmd_refs: bool,
    /// Upper bound on exported-type forwarders followed for one reference
    pub max_forwarder_hops: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            project_winmd_refs: true,
            max_forwarder_hops: 30,
        }
    }
}

impl ResolverConfig {
    /// Disable Windows Runtime projection
    #[must_use]
    pub fn without_projection(mut self) -> Self {
        self.project_winmd_refs = false;
        self
    }

    /// Override the forwarder hop bound
    #[must_use]
    pub fn with_max_forwarder_hops(mut self, hops: usize) -> Self {
        self.max_forwarder_hops = hops;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(LoaderConfig::default().init_policy, InitPolicy::PerEntityLock);
        assert_eq!(LoaderConfig::default(), LoaderConfig::thread_safe());
        assert_eq!(
            LoaderConfig::single_threaded().init_policy,
            InitPolicy::NoLocking
        );

        let resolver = ResolverConfig::default();
        assert!(resolver.project_winmd_refs);
        assert_eq!(resolver.max_forwarder_hops, 30);
    }

    #[test]
    fn builders() {
        let resolver = ResolverConfig::default()
            .without_projection()
            .with_max_forwarder_hops(2);
        assert!(!resolver.project_winmd_refs);
        assert_eq!(resolver.max_forwarder_hops, 2);
    }
}
