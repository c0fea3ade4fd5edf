use std::{
    collections::VecDeque,
    sync::{
        atomic::AtomicU32,
        Arc, Weak,
    },
};

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::{
    metadata::{
        config::LoaderConfig,
        entity::Origin,
        loader::LoaderContext,
        ownership::{OwnedList, OwnershipEdge},
        provider::{MetadataProvider, RawRow},
        resolver::SigComparer,
        streams::Name,
        tables::{
            Assembly, AssemblyRc, AssemblyRefRc, CustomAttributeList, EventRc, ExportedTypeList,
            ExportedTypeRc, FieldRc, FileRc, GenericParamRc, ManifestResourceList,
            ManifestResourceRc, MemberRefRc, MethodDefRc,
            MethodSpecRc, ModuleList, ModuleRc, ModuleRefRc, ModuleTypeList, ParamRc, PropertyRc,
            TableId, TypeDef, TypeDefRc, TypeRefRc, TypeSpecRc,
        },
        token::Token,
        typesystem::MAX_RECURSION_DEPTH,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// Name of the type holding a module's global fields and methods
pub const GLOBAL_TYPE_NAME: &str = "<Module>";

/// Typed row accessors, each failing with [`Error::RowNotFound`] for rows the store lacks
macro_rules! row_accessor {
    ($(#[$doc:meta])* $name:ident, $table:ident, $rc:ty) => {
        $(#[$doc])*
        ///
        /// # Errors
        /// Returns [`Error::RowNotFound`] if the module was not materialized from a backing store
        /// or the row does not exist.
        pub fn $name(&self, rid: u32) -> Result<$rc> {
            self.loader
                .as_ref()
                .and_then(|ctx| ctx.$name(rid))
                .ok_or(Error::RowNotFound(Token::from_parts(TableId::$table, rid)))
        }
    };
}

/// A module: a single file of an assembly, holding types and references.
///
/// A module materialized through [`Module::from_provider`] owns the loader of its graph; every
/// entity reached from it stays materializable for as long as the module lives.
pub struct Module {
    this: Weak<Module>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    name: RwLock<Name>,
    mvid: RwLock<uguid::Guid>,
    assembly: LazySlot<Option<Weak<Assembly>>>,
    loader: Option<Arc<LoaderContext>>,
    types: LazySlot<ModuleTypeList>,
    exported_types: LazySlot<ExportedTypeList>,
    resources: LazySlot<ManifestResourceList>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(Module, Module);

impl Module {
    /// Create an empty module in memory, holding only its global type
    #[must_use]
    pub fn new(name: impl Into<Name>) -> ModuleRc {
        let name = name.into();
        let module = Arc::new_cyclic(|this: &Weak<Module>| Module {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            name: RwLock::new(name),
            mvid: RwLock::new(uguid::Guid::ZERO),
            assembly: LazySlot::with_value(None),
            loader: None,
            types: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            exported_types: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            resources: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        });

        // a fresh, unowned type cannot be rejected
        let _ = module.types().add(TypeDef::new("", GLOBAL_TYPE_NAME, 0));
        module
    }

    /// Materialize the module stored in `provider`.
    ///
    /// Only the `Module` row is read here; types, members and references are materialized on
    /// first access.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the store has no `Module` row.
    pub fn from_provider(
        provider: Arc<dyn MetadataProvider>,
        config: LoaderConfig,
    ) -> Result<ModuleRc> {
        let Some(RawRow::Module(raw)) = provider.row(TableId::Module, 1) else {
            return Err(malformed_error!("the backing store has no Module row"));
        };

        let ctx = LoaderContext::new(provider, config.init_policy);
        let module = Arc::new_cyclic(|this: &Weak<Module>| Module {
            this: this.clone(),
            rid: AtomicU32::new(raw.rid),
            origin: ctx.origin(raw.rid),
            sync: ctx.lock(),
            name: RwLock::new(ctx.string(raw.name)),
            mvid: RwLock::new(ctx.guid(raw.mvid).unwrap_or(uguid::Guid::ZERO)),
            assembly: LazySlot::with_value(None),
            loader: Some(ctx.clone()),
            types: LazySlot::new(),
            exported_types: LazySlot::new(),
            resources: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        });
        ctx.attach_module(&module);

        tracing::debug!(
            module = %module.name(),
            policy = %config.init_policy,
            "materialized module"
        );
        Ok(module)
    }

    /// The loader of a materialized module
    pub fn loader(&self) -> Option<&Arc<LoaderContext>> {
        self.loader.as_ref()
    }

    /// The module name, usually the file name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the module
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// The module version identifier
    pub fn mvid(&self) -> uguid::Guid {
        *self.mvid.read()
    }

    /// Replace the module version identifier
    pub fn set_mvid(&self, mvid: uguid::Guid) {
        *self.mvid.write() = mvid;
    }

    /// The assembly listing this module
    pub fn assembly(&self) -> Option<AssemblyRc> {
        self.assembly
            .get_relaxed(|| None)
            .and_then(|assembly| assembly.upgrade())
    }

    /// Returns `true` if this is the manifest module of its assembly
    pub fn is_manifest_module(&self) -> bool {
        self.assembly()
            .and_then(|assembly| assembly.manifest_module())
            .is_some_and(|manifest| Weak::ptr_eq(&Arc::downgrade(&manifest), &self.this))
    }

    /// The top-level types, the global type first
    pub fn types(&self) -> ModuleTypeList {
        self.types.get(&self.sync, || match (&self.loader, self.this.upgrade()) {
            (Some(ctx), Some(this)) => ctx.module_types(&this),
            _ => Arc::new(OwnedList::new(self.this.clone())),
        })
    }

    /// The `<Module>` type holding global members
    pub fn global_type(&self) -> Option<TypeDefRc> {
        self.types().get(0)
    }

    /// Types exported by this module's assembly, including forwarders
    pub fn exported_types(&self) -> ExportedTypeList {
        self.exported_types.get(&self.sync, || match &self.loader {
            Some(ctx) => ctx.module_exported_types(),
            None => Arc::new(boxcar::Vec::new()),
        })
    }

    /// Manifest resources of this module's assembly
    pub fn resources(&self) -> ManifestResourceList {
        self.resources.get(&self.sync, || match &self.loader {
            Some(ctx) => ctx.module_resources(),
            None => Arc::new(boxcar::Vec::new()),
        })
    }

    /// The resource named `name`
    pub fn find_resource(&self, name: &str) -> Option<ManifestResourceRc> {
        self.resources()
            .iter()
            .find(|(_, resource)| resource.name() == name)
            .map(|(_, resource)| resource.clone())
    }

    /// Custom attributes applied to this module
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            match (&self.loader, self.origin.original_rid()) {
                (Some(ctx), Some(rid)) => {
                    ctx.custom_attributes(Token::from_parts(TableId::Module, rid))
                }
                _ => Arc::new(boxcar::Vec::new()),
            }
        })
    }

    row_accessor!(
        /// The `TypeDef` at `rid`
        type_def, TypeDef, TypeDefRc
    );
    row_accessor!(
        /// The `TypeRef` at `rid`
        type_ref, TypeRef, TypeRefRc
    );
    row_accessor!(
        /// The `TypeSpec` at `rid`
        type_spec, TypeSpec, TypeSpecRc
    );
    row_accessor!(
        /// The `Field` at `rid`
        field, Field, FieldRc
    );
    row_accessor!(
        /// The `MethodDef` at `rid`
        method_def, MethodDef, MethodDefRc
    );
    row_accessor!(
        /// The `Param` at `rid`
        param, Param, ParamRc
    );
    row_accessor!(
        /// The `MemberRef` at `rid`
        member_ref, MemberRef, MemberRefRc
    );
    row_accessor!(
        /// The `Event` at `rid`
        event, Event, EventRc
    );
    row_accessor!(
        /// The `Property` at `rid`
        property, Property, PropertyRc
    );
    row_accessor!(
        /// The `ModuleRef` at `rid`
        module_ref, ModuleRef, ModuleRefRc
    );
    row_accessor!(
        /// The `AssemblyRef` at `rid`
        assembly_ref, AssemblyRef, AssemblyRefRc
    );
    row_accessor!(
        /// The `File` at `rid`
        file, File, FileRc
    );
    row_accessor!(
        /// The `ExportedType` at `rid`
        exported_type, ExportedType, ExportedTypeRc
    );
    row_accessor!(
        /// The `ManifestResource` at `rid`
        manifest_resource, ManifestResource, ManifestResourceRc
    );
    row_accessor!(
        /// The `GenericParam` at `rid`
        generic_param, GenericParam, GenericParamRc
    );
    row_accessor!(
        /// The `MethodSpec` at `rid`
        method_spec, MethodSpec, MethodSpecRc
    );

    /// Number of `AssemblyRef` rows in the backing store
    pub fn assembly_ref_count(&self) -> u32 {
        self.loader
            .as_ref()
            .map_or(0, |ctx| ctx.provider().row_count(TableId::AssemblyRef))
    }

    /// The top-level type `namespace.name`
    pub fn find_by_name(&self, namespace: &str, name: &str) -> Option<TypeDefRc> {
        self.types()
            .iter()
            .find(|ty| ty.namespace() == namespace && ty.name() == name)
    }

    /// The definition matching `reference` by name, namespace and enclosing chain.
    ///
    /// The scope of the reference is not compared.
    pub fn find(&self, reference: &TypeRefRc) -> Option<TypeDefRc> {
        let chain = reference.nesting_chain()?;
        let (outermost, nested) = chain.split_first()?;

        let mut current = self.types().iter().find(|ty| {
            ty.namespace() == outermost.namespace() && ty.name() == outermost.name()
        })?;
        for inner in nested {
            current = current
                .nested_types()
                .iter()
                .find(|ty| ty.name() == inner.name() && ty.namespace() == inner.namespace())?;
        }
        Some(current)
    }

    /// The exported type matching `reference` by name, namespace and enclosing chain
    pub fn find_exported(&self, reference: &TypeRefRc) -> Option<ExportedTypeRc> {
        let comparer = SigComparer::default();
        self.exported_types()
            .iter()
            .find(|(_, exported)| comparer.equals_exported_type(exported, reference))
            .map(|(_, exported)| exported.clone())
    }

    /// Every type of the module, nested types included, in breadth-first order.
    ///
    /// Nesting deeper than the recursion bound is not followed.
    pub fn all_types(&self) -> Vec<TypeDefRc> {
        let mut all = Vec::new();
        let mut queue: VecDeque<(TypeDefRc, usize)> =
            self.types().iter().map(|ty| (ty, 0)).collect();

        while let Some((ty, depth)) = queue.pop_front() {
            if depth < MAX_RECURSION_DEPTH {
                queue.extend(ty.nested_types().iter().map(|nested| (nested, depth + 1)));
            }
            all.push(ty);
        }
        all
    }

    /// Force every lazy property of every entity reachable from this module.
    ///
    /// Types are initialized in parallel; only use this with the per-entity locking policy.
    pub fn initialize_all(&self) {
        let _ = self.custom_attributes();
        for (_, exported) in self.exported_types().iter() {
            let _ = exported.implementation();
            let _ = exported.custom_attributes();
        }
        for (_, resource) in self.resources().iter() {
            let _ = resource.data();
            let _ = resource.custom_attributes();
        }

        let types = self.all_types();
        types.par_iter().for_each(|ty| ty.initialize());
        tracing::debug!(module = %self.name(), types = types.len(), "initialized module");
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name())
            .field("mvid", &self.mvid())
            .field("materialized", &self.origin.is_materialized())
            .finish_non_exhaustive()
    }
}

/// Modules of an assembly
pub struct AssemblyModules;

impl OwnershipEdge for AssemblyModules {
    type Child = Module;
    type Owner = AssemblyRc;
    type WeakOwner = Weak<Assembly>;

    const CHILD_KIND: &'static str = "module";

    fn downgrade(owner: &Self::Owner) -> Self::WeakOwner {
        Arc::downgrade(owner)
    }

    fn upgrade(owner: &Self::WeakOwner) -> Option<Self::Owner> {
        owner.upgrade()
    }

    fn same_owner(a: &Self::Owner, b: &Self::Owner) -> bool {
        Arc::ptr_eq(a, b)
    }

    fn owner_of(child: &Self::Child) -> Option<Self::Owner> {
        child.assembly()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.assembly.set_relaxed(owner.map(Arc::downgrade));
    }

    fn list(owner: &Self::Owner) -> ModuleList {
        owner.modules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{entity::MetadataEntity, tables::TypeRef},
        test::{forwarding_fixture, widget_module},
    };

    #[test]
    fn in_memory_module_has_global_type() {
        let module = Module::new("Demo.dll");
        let global = module.global_type().unwrap();
        assert_eq!(global.name(), GLOBAL_TYPE_NAME);
        assert!(global.is_global_module_type());
        assert!(Arc::ptr_eq(&global.owner_module().unwrap(), &module));
        assert!(module.exported_types().is_empty());
        assert!(matches!(module.type_def(1), Err(Error::RowNotFound(_))));
    }

    #[test]
    fn materialized_module_lists_types() {
        let module = widget_module();
        assert_eq!(module.name(), "Widgets.dll");
        assert!(module.origin().is_materialized());
        assert_eq!(module.token(), Token::new(0x0000_0001));

        let types = module.types();
        assert_eq!(types.get(0).unwrap().name(), GLOBAL_TYPE_NAME);
        let widget = module.find_by_name("Demo", "Widget").unwrap();
        assert!(Arc::ptr_eq(&widget, &module.type_def(widget.rid()).unwrap()));
        assert!(Arc::ptr_eq(&widget.module().unwrap(), &module));
    }

    #[test]
    fn missing_module_row_is_malformed() {
        let provider = crate::metadata::provider::MemoryProvider::new();
        let result = Module::from_provider(Arc::new(provider), LoaderConfig::default());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn find_walks_nesting_chain() {
        let module = widget_module();
        let outer = TypeRef::new(&module, "Demo", "Widget", None);
        let inner = TypeRef::new(
            &module,
            "",
            "Part",
            Some(crate::metadata::tables::ResolutionScope::TypeRef(outer.clone())),
        );

        let found = module.find(&inner).unwrap();
        assert_eq!(found.full_name(), "Demo.Widget/Part");
        assert!(module.find(&TypeRef::new(&module, "Demo", "Missing", None)).is_none());
    }

    #[test]
    fn all_types_includes_nested() {
        let module = widget_module();
        let names: Vec<String> = module.all_types().iter().map(|ty| ty.full_name()).collect();
        assert!(names.contains(&"Demo.Widget/Part".to_string()));
        module.initialize_all();
    }

    #[test]
    fn exported_types_are_materialized() {
        let fixture = forwarding_fixture(2);
        let facade = fixture.facade.manifest_module().unwrap();
        assert_eq!(facade.exported_types().count(), 1);
    }
}
