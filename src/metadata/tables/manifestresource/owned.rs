use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        streams::Name,
        tables::{
            AssemblyRefRc, CustomAttributeList, FileRc, Implementation, ManifestResourceAttributes,
            ManifestResourceRc, ResourceType, TableId,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// A named resource of an assembly
pub struct ManifestResource {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    offset: u32,
    flags: AtomicU32,
    name: RwLock<Name>,
    implementation: LazySlot<Option<Implementation>>,
    data: LazySlot<Option<Arc<Vec<u8>>>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(ManifestResource, ManifestResource);

impl ManifestResource {
    fn in_memory(
        name: impl Into<Name>,
        flags: u32,
        implementation: Option<Implementation>,
        data: Option<Vec<u8>>,
    ) -> ManifestResourceRc {
        Arc::new(ManifestResource {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            offset: 0,
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            implementation: LazySlot::with_value(implementation),
            data: LazySlot::with_value(data.map(Arc::new)),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    /// Create a resource embedded in the manifest module
    #[must_use]
    pub fn embedded(name: impl Into<Name>, data: Vec<u8>, flags: u32) -> ManifestResourceRc {
        Self::in_memory(name, flags, None, Some(data))
    }

    /// Create a resource supplied by another assembly
    #[must_use]
    pub fn assembly_linked(
        name: impl Into<Name>,
        assembly: AssemblyRefRc,
        flags: u32,
    ) -> ManifestResourceRc {
        Self::in_memory(name, flags, Some(Implementation::AssemblyRef(assembly)), None)
    }

    /// Create a resource stored in another file of this assembly
    #[must_use]
    pub fn linked(name: impl Into<Name>, file: FileRc, flags: u32) -> ManifestResourceRc {
        Self::in_memory(name, flags, Some(Implementation::File(file)), None)
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        offset: u32,
        flags: u32,
        name: Name,
    ) -> ManifestResourceRc {
        Arc::new(ManifestResource {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            offset,
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            implementation: LazySlot::new(),
            data: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// The resource name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the resource
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// `ManifestResourceAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// Returns `true` if the resource is visible outside the assembly
    pub fn is_public(&self) -> bool {
        self.flags() & ManifestResourceAttributes::VISIBILITY_MASK
            == ManifestResourceAttributes::PUBLIC
    }

    /// Returns `true` if the resource is private to the assembly
    pub fn is_private(&self) -> bool {
        self.flags() & ManifestResourceAttributes::VISIBILITY_MASK
            == ManifestResourceAttributes::PRIVATE
    }

    /// Offset of an embedded resource within the resources directory, 0 for other kinds
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The file or assembly holding the resource, `None` for embedded resources
    pub fn implementation(&self) -> Option<Implementation> {
        self.implementation.get(&self.sync, || {
            self.load(|ctx, rid| ctx.resource_implementation(rid))
                .flatten()
        })
    }

    /// Where the resource bytes live. An implementation pointing at an exported type is invalid
    /// and yields `None`.
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self.implementation() {
            None => Some(ResourceType::Embedded),
            Some(Implementation::AssemblyRef(_)) => Some(ResourceType::AssemblyLinked),
            Some(Implementation::File(_)) => Some(ResourceType::Linked),
            Some(Implementation::ExportedType(_)) => None,
        }
    }

    /// The assembly supplying an assembly-linked resource
    pub fn assembly(&self) -> Option<AssemblyRefRc> {
        match self.implementation()? {
            Implementation::AssemblyRef(assembly) => Some(assembly),
            _ => None,
        }
    }

    /// The file holding a linked resource
    pub fn file(&self) -> Option<FileRc> {
        match self.implementation()? {
            Implementation::File(file) => Some(file),
            _ => None,
        }
    }

    /// Name of the file holding a linked resource, empty for other kinds
    pub fn file_name(&self) -> Name {
        self.file().map(|file| file.name.clone()).unwrap_or_default()
    }

    /// The bytes of an embedded resource, read from the backing store on first access
    pub fn data(&self) -> Option<Arc<Vec<u8>>> {
        if self.resource_type() != Some(ResourceType::Embedded) {
            return None;
        }
        self.data.get(&self.sync, || {
            self.load(|ctx, rid| ctx.resource_data(rid, self.offset))
                .flatten()
                .map(Arc::new)
        })
    }

    /// Replace the bytes of an embedded resource
    pub fn set_data(&self, data: Option<Vec<u8>>) {
        self.data.set(&self.sync, data.map(Arc::new));
    }

    /// Custom attributes applied to this resource
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| {
                ctx.custom_attributes(Token::from_parts(TableId::ManifestResource, rid))
            })
            .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for ManifestResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestResource")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .field("flags", &format_args!("{:#x}", self.flags()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            config::LoaderConfig,
            entity::MetadataEntity,
            identity::{AssemblyIdentity, AssemblyVersion},
            tables::{AssemblyRef, File, FileAttributes, Module},
        },
        test::widget_provider,
    };

    #[test]
    fn in_memory_kinds() {
        let embedded = ManifestResource::embedded(
            "Strings.resources",
            vec![1, 2, 3],
            ManifestResourceAttributes::PUBLIC,
        );
        assert_eq!(embedded.resource_type(), Some(ResourceType::Embedded));
        assert_eq!(embedded.data().unwrap().as_slice(), &[1, 2, 3]);
        assert!(embedded.is_public());

        let shared = AssemblyRef::new(
            &AssemblyIdentity::new("Shared", AssemblyVersion::new(1, 0, 0, 0), None, None),
            0,
        );
        let satellite = ManifestResource::assembly_linked(
            "Shared.resources",
            shared,
            ManifestResourceAttributes::PRIVATE,
        );
        assert_eq!(satellite.resource_type(), Some(ResourceType::AssemblyLinked));
        assert_eq!(satellite.assembly().unwrap().name, "Shared");
        assert!(satellite.data().is_none());
        assert!(satellite.is_private());

        let file = File::new("readme.txt", FileAttributes::CONTAINS_NO_META_DATA);
        let linked = ManifestResource::linked("readme", file, ManifestResourceAttributes::PUBLIC);
        assert_eq!(linked.resource_type(), Some(ResourceType::Linked));
        assert_eq!(linked.file_name(), "readme.txt");
    }

    #[test]
    fn module_resources_load_lazily() {
        let (mut provider, _) = widget_provider(true);
        let shared = provider.add_assembly_ref(
            &AssemblyIdentity::new("Shared", AssemblyVersion::new(1, 0, 0, 0), None, None),
            0,
        );
        let notes = provider.add_file("notes.txt", FileAttributes::CONTAINS_NO_META_DATA);
        let (public, private) = (
            ManifestResourceAttributes::PUBLIC,
            ManifestResourceAttributes::PRIVATE,
        );
        provider.add_embedded_resource("Widgets.resources", public, vec![0xCE, 0xCA, 0xEF, 0xBE]);
        provider.add_linked_resource("Shared.resources", private, shared);
        provider.add_linked_resource("notes", public, notes);

        let module = Module::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap();
        let resources = module.resources();
        assert_eq!(resources.count(), 3);
        assert!(Arc::ptr_eq(&resources, &module.resources()));

        let embedded = module.find_resource("Widgets.resources").unwrap();
        assert_eq!(embedded.rid(), 1);
        assert_eq!(embedded.resource_type(), Some(ResourceType::Embedded));
        assert_eq!(embedded.data().unwrap().as_slice(), &[0xCE, 0xCA, 0xEF, 0xBE]);

        let satellite = module.find_resource("Shared.resources").unwrap();
        assert_eq!(satellite.resource_type(), Some(ResourceType::AssemblyLinked));
        assert_eq!(satellite.assembly().unwrap().name, "Shared");
        assert!(satellite.data().is_none());

        let linked = module.find_resource("notes").unwrap();
        assert_eq!(linked.resource_type(), Some(ResourceType::Linked));
        assert_eq!(linked.file_name(), "notes.txt");

        assert!(module.find_resource("missing").is_none());
    }
}
