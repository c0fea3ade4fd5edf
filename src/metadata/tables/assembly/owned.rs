use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        config::LoaderConfig,
        entity::Origin,
        identity::{AssemblyHashAlgorithm, AssemblyIdentity, Identity},
        ownership::OwnedList,
        provider::{MetadataProvider, RawRow},
        tables::{
            AssemblyRc, CustomAttributeList, DeclSecurityList, Module, ModuleList, ModuleRc,
            TableId, TypeDefRc, TypeRefRc,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Result,
};

/// An assembly: an identity plus the modules that make it up, the manifest module first
pub struct Assembly {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    identity: RwLock<AssemblyIdentity>,
    hash_algorithm: AtomicU32,
    flags: AtomicU32,
    modules: ModuleList,
    custom_attributes: LazySlot<CustomAttributeList>,
    decl_securities: LazySlot<DeclSecurityList>,
}

impl_metadata_entity!(Assembly, Assembly);

impl Assembly {
    /// Create an assembly in memory, without modules
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> AssemblyRc {
        Arc::new_cyclic(|this: &Weak<Assembly>| Assembly {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            identity: RwLock::new(identity),
            hash_algorithm: AtomicU32::new(AssemblyHashAlgorithm::SHA1),
            flags: AtomicU32::new(0),
            modules: Arc::new(OwnedList::new(this.clone())),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            decl_securities: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    /// Materialize the assembly whose manifest module is stored in `provider`.
    ///
    /// The manifest module becomes the first module of the assembly. Other modules are added by
    /// the host.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the store lacks the `Module` or the `Assembly` row.
    pub fn from_provider(
        provider: Arc<dyn MetadataProvider>,
        config: LoaderConfig,
    ) -> Result<AssemblyRc> {
        let module = Module::from_provider(provider, config)?;
        let ctx = module
            .loader()
            .cloned()
            .ok_or_else(|| malformed_error!("materialized module has no loader"))?;

        let Some(RawRow::Assembly(raw)) = ctx.provider().row(TableId::Assembly, 1) else {
            return Err(malformed_error!(
                "module {} is not a manifest module, the backing store has no Assembly row",
                module.name()
            ));
        };

        let identity = raw.identity(&ctx);
        let assembly = Arc::new_cyclic(|this: &Weak<Assembly>| Assembly {
            rid: AtomicU32::new(raw.rid),
            origin: ctx.origin(raw.rid),
            sync: ctx.lock(),
            identity: RwLock::new(identity),
            hash_algorithm: AtomicU32::new(raw.hash_alg_id),
            flags: AtomicU32::new(raw.flags),
            modules: Arc::new(OwnedList::new(this.clone())),
            custom_attributes: LazySlot::new(),
            decl_securities: LazySlot::new(),
        });
        assembly.modules.add(module)?;

        tracing::debug!(assembly = %assembly.identity().display_name(), "materialized assembly");
        Ok(assembly)
    }

    /// The identity of this assembly
    pub fn identity(&self) -> AssemblyIdentity {
        self.identity.read().clone()
    }

    /// Replace the identity
    pub fn set_identity(&self, identity: AssemblyIdentity) {
        *self.identity.write() = identity;
    }

    /// The simple name
    pub fn name(&self) -> String {
        self.identity.read().name.clone()
    }

    /// `AssemblyFlags` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// `AssemblyHashAlgorithm` used for file hashes and the public key token
    pub fn hash_algorithm(&self) -> u32 {
        self.hash_algorithm.load(Ordering::Acquire)
    }

    /// The public key token, `None` if the assembly is not strong named
    pub fn public_key_token(&self) -> Option<u64> {
        let identity = self.identity.read();
        match identity.strong_name.as_ref()? {
            Identity::PubKey(_) => identity
                .strong_name
                .as_ref()
                .map(|key| key.to_token(self.hash_algorithm())),
            Identity::Token(token) => Some(*token),
        }
    }

    /// The modules of this assembly
    pub fn modules(&self) -> ModuleList {
        self.modules.clone()
    }

    /// The module holding the manifest
    pub fn manifest_module(&self) -> Option<ModuleRc> {
        self.modules.get(0)
    }

    /// The module named `name`, compared ignoring ASCII case
    pub fn find_module(&self, name: &str) -> Option<ModuleRc> {
        self.modules
            .iter()
            .find(|module| module.name().as_bytes().eq_ignore_ascii_case(name.as_bytes()))
    }

    /// The definition matching `reference` in any module, the manifest module first
    pub fn find(&self, reference: &TypeRefRc) -> Option<TypeDefRc> {
        self.modules.iter().find_map(|module| module.find(reference))
    }

    /// The top-level type `namespace.name` in any module
    pub fn find_by_name(&self, namespace: &str, name: &str) -> Option<TypeDefRc> {
        self.modules
            .iter()
            .find_map(|module| module.find_by_name(namespace, name))
    }

    /// Custom attributes applied to this assembly
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || match self.origin.reader() {
            Some((rid, ctx)) => ctx.custom_attributes(Token::from_parts(TableId::Assembly, rid)),
            None => Arc::new(boxcar::Vec::new()),
        })
    }

    /// Declarative security requested by this assembly
    pub fn decl_securities(&self) -> DeclSecurityList {
        self.decl_securities.get(&self.sync, || match self.origin.reader() {
            Some((rid, ctx)) => ctx.decl_securities(Token::from_parts(TableId::Assembly, rid)),
            None => Arc::new(boxcar::Vec::new()),
        })
    }

    /// Returns `true` if any declarative security is attached to this assembly
    pub fn has_decl_securities(&self) -> bool {
        self.decl_securities().count() > 0
    }
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembly")
            .field("identity", &self.identity().display_name())
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            entity::MetadataEntity,
            identity::AssemblyVersion,
            provider::MemoryProvider,
        },
        test::widget_assembly,
        Error,
    };

    fn identity(name: &str) -> AssemblyIdentity {
        AssemblyIdentity::new(name, AssemblyVersion::new(2, 0, 0, 0), None, None)
    }

    #[test]
    fn modules_belong_to_one_assembly() {
        let first = Assembly::new(identity("First"));
        let second = Assembly::new(identity("Second"));
        let module = Module::new("Shared.dll");

        first.modules().add(module.clone()).unwrap();
        assert!(module.is_manifest_module());
        assert!(Arc::ptr_eq(&module.assembly().unwrap(), &first));
        assert!(matches!(
            second.modules().add(module.clone()),
            Err(Error::InvalidOperation(_))
        ));

        first.modules().remove(&module);
        assert!(module.assembly().is_none());
        second.modules().add(module.clone()).unwrap();
        assert!(second.find_module("SHARED.dll").is_some());
    }

    #[test]
    fn materialized_assembly() {
        let assembly = widget_assembly();
        assert_eq!(assembly.name(), "Widgets");
        assert_eq!(assembly.identity().version, AssemblyVersion::new(1, 2, 0, 0));
        assert_eq!(assembly.rid(), 1);

        let manifest = assembly.manifest_module().unwrap();
        assert!(Arc::ptr_eq(&manifest.assembly().unwrap(), &assembly));
        assert!(assembly.find_by_name("Demo", "Widget").is_some());
        assert!(assembly.public_key_token().is_none());
    }

    #[test]
    fn module_without_assembly_row() {
        let mut provider = MemoryProvider::new();
        provider.add_module("Plain.netmodule");
        let result = Assembly::from_provider(Arc::new(provider), LoaderConfig::default());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn token_of_strong_named_assembly() {
        let assembly = Assembly::new(AssemblyIdentity::new(
            "Signed",
            AssemblyVersion::new(1, 0, 0, 0),
            None,
            Some(Identity::Token(0x1122_3344_5566_7788)),
        ));
        assert_eq!(assembly.public_key_token(), Some(0x1122_3344_5566_7788));
    }
}
