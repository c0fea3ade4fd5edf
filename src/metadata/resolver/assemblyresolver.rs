use std::sync::Arc;

use dashmap::DashMap;

use crate::metadata::{
    identity::AssemblyIdentity,
    tables::{AssemblyRc, ModuleRc},
};

/// Finds the assembly satisfying an identity.
///
/// Locating assemblies on disk, in a GAC or in a package cache is the host's business. The
/// [`crate::metadata::resolver::Resolver`] only asks for an assembly and treats `None` as
/// "not found".
pub trait AssemblyResolver: Send + Sync {
    /// The assembly satisfying `identity`. `source` is the module the request originates from,
    /// if known, for resolvers that search relative to it.
    fn resolve(&self, identity: &AssemblyIdentity, source: Option<&ModuleRc>) -> Option<AssemblyRc>;
}

impl<T: AssemblyResolver + ?Sized> AssemblyResolver for Arc<T> {
    fn resolve(
        &self,
        identity: &AssemblyIdentity,
        source: Option<&ModuleRc>,
    ) -> Option<AssemblyRc> {
        (**self).resolve(identity, source)
    }
}

/// An [`AssemblyResolver`] over assemblies registered up front.
///
/// Assemblies are keyed by their lower-cased simple name. A request is answered with the
/// registered assembly whose identity [satisfies](AssemblyIdentity::satisfies) it; among several,
/// the one with the version closest to the requested one wins.
///
/// The key is taken when the assembly is registered, renaming an assembly afterwards requires
/// removing and registering it again.
///
/// ```rust
/// use cilgraph::metadata::{
///     identity::{AssemblyIdentity, AssemblyVersion},
///     resolver::{AssemblyCache, AssemblyResolver},
///     tables::Assembly,
/// };
///
/// let cache = AssemblyCache::new();
/// cache.register(Assembly::new(AssemblyIdentity::new(
///     "Widgets",
///     AssemblyVersion::new(1, 2, 0, 0),
///     None,
///     None,
/// )));
///
/// let wanted = AssemblyIdentity::parse("widgets, Version=1.0.0.0")?;
/// assert!(cache.resolve(&wanted, None).is_some());
/// # Ok::<(), cilgraph::Error>(())
/// ```
#[derive(Default)]
pub struct AssemblyCache {
    assemblies: DashMap<String, Vec<AssemblyRc>>,
}

impl AssemblyCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        AssemblyCache {
            assemblies: DashMap::new(),
        }
    }

    /// Make `assembly` available. Registering the same assembly twice has no effect.
    pub fn register(&self, assembly: AssemblyRc) {
        let key = assembly.name().to_ascii_lowercase();
        let mut entry = self.assemblies.entry(key).or_default();
        if !entry.iter().any(|known| Arc::ptr_eq(known, &assembly)) {
            tracing::trace!(assembly = %assembly.identity().display_name(), "registered assembly");
            entry.push(assembly);
        }
    }

    /// Forget `assembly`, returns `true` if it was registered
    pub fn remove(&self, assembly: &AssemblyRc) -> bool {
        let key = assembly.name().to_ascii_lowercase();
        let Some(mut entry) = self.assemblies.get_mut(&key) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|known| !Arc::ptr_eq(known, assembly));
        let removed = entry.len() != before;
        let now_empty = entry.is_empty();
        drop(entry);

        if now_empty {
            self.assemblies.remove_if(&key, |_, list| list.is_empty());
        }
        removed
    }

    /// Number of registered assemblies
    #[must_use]
    pub fn len(&self) -> usize {
        self.assemblies.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns `true` if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssemblyResolver for AssemblyCache {
    fn resolve(
        &self,
        identity: &AssemblyIdentity,
        _source: Option<&ModuleRc>,
    ) -> Option<AssemblyRc> {
        let candidates = self.assemblies.get(&identity.name.to_ascii_lowercase())?;

        let mut best: Option<(&AssemblyRc, AssemblyIdentity)> = None;
        for candidate in candidates.iter() {
            let candidate_identity = candidate.identity();
            if !candidate_identity.satisfies(identity) {
                continue;
            }

            let better = match &best {
                None => true,
                Some((_, current)) => candidate_identity
                    .version
                    .is_closer_to(&current.version, &identity.version),
            };
            if better {
                best = Some((candidate, candidate_identity));
            }
        }

        best.map(|(assembly, _)| assembly.clone())
    }
}

impl std::fmt::Debug for AssemblyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyCache")
            .field("assemblies", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::{AssemblyVersion, Identity},
        tables::Assembly,
    };

    fn assembly(name: &str, version: AssemblyVersion) -> AssemblyRc {
        Assembly::new(AssemblyIdentity::new(name, version, None, None))
    }

    #[test]
    fn case_insensitive_lookup() {
        let cache = AssemblyCache::new();
        cache.register(assembly("Widgets", AssemblyVersion::new(1, 0, 0, 0)));

        let request = AssemblyIdentity::new("WIDGETS", AssemblyVersion::UNKNOWN, None, None);
        assert!(cache.resolve(&request, None).is_some());

        let missing = AssemblyIdentity::new("Gadgets", AssemblyVersion::UNKNOWN, None, None);
        assert!(cache.resolve(&missing, None).is_none());
    }

    #[test]
    fn closest_version_wins() {
        let cache = AssemblyCache::new();
        let old = assembly("Lib", AssemblyVersion::new(2, 0, 0, 0));
        let newer = assembly("Lib", AssemblyVersion::new(2, 5, 0, 0));
        let other_major = assembly("Lib", AssemblyVersion::new(3, 0, 0, 0));
        cache.register(old);
        cache.register(newer.clone());
        cache.register(other_major);

        let request = AssemblyIdentity::new("Lib", AssemblyVersion::new(2, 1, 0, 0), None, None);
        let found = cache.resolve(&request, None).unwrap();
        assert!(Arc::ptr_eq(&found, &newer));

        let too_new = AssemblyIdentity::new("Lib", AssemblyVersion::new(2, 9, 0, 0), None, None);
        assert!(cache.resolve(&too_new, None).is_none());
    }

    #[test]
    fn strong_name_must_match() {
        let cache = AssemblyCache::new();
        cache.register(Assembly::new(AssemblyIdentity::new(
            "Signed",
            AssemblyVersion::new(1, 0, 0, 0),
            None,
            Some(Identity::Token(0x1111)),
        )));

        let wrong = AssemblyIdentity::new(
            "Signed",
            AssemblyVersion::new(1, 0, 0, 0),
            None,
            Some(Identity::Token(0x2222)),
        );
        assert!(cache.resolve(&wrong, None).is_none());
    }

    #[test]
    fn register_and_remove() {
        let cache = AssemblyCache::new();
        let lib = assembly("Lib", AssemblyVersion::new(1, 0, 0, 0));

        cache.register(lib.clone());
        cache.register(lib.clone());
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(&lib));
        assert!(!cache.remove(&lib));
        assert!(cache.is_empty());
    }
}
