use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;

use crate::metadata::{
    entity::Origin,
    provider::{MetadataProvider, RawRow, Relation, TokenResolver},
    streams::Name,
    tables::{
        AssemblyRefRc, CodedIndex, CodedIndexType, ConstantRc, CustomAttributeList,
        DeclSecurityList, EventRc, ExportedTypeRc, FieldRc, FileRc, GenericParamRc, ImplMapRc,
        Implementation, ManifestResourceRc, MemberRefParent, MemberRefRc, MethodDefOrRef,
        MethodDefRc, MethodSpecRc, Module,
        ModuleRc, ModuleRefRc, ParamRc, PropertyRc, ResolutionScope, TableId, TypeDefOrRef,
        TypeDefRc, TypeOrMethodDef, TypeRefRc, TypeSpecRc,
    },
    token::Token,
};
use crate::utils::{EntityLock, InitPolicy};

/// Defines the cached getter and the uncached `fresh_*` constructor of one table.
macro_rules! table_access {
    ($(#[$doc:meta])* $get:ident, $fresh:ident, $cache:ident, $table:ident, $rc:ty) => {
        $(#[$doc])*
        pub(crate) fn $get(&self, rid: u32) -> Option<$rc> {
            if let Some(entry) = self.$cache.get(&rid) {
                return Some(entry.value().clone());
            }

            let fresh = self.$fresh(rid)?;
            tracing::trace!(table = ?TableId::$table, rid, "materialized row");
            Some(self.$cache.entry(rid).or_insert(fresh).value().clone())
        }

        /// Materialize the row again, bypassing the cache
        pub(crate) fn $fresh(&self, rid: u32) -> Option<$rc> {
            match self.provider.row(TableId::$table, rid)? {
                RawRow::$table(raw) => Some(raw.to_owned(self)),
                _ => None,
            }
        }
    };
}

/// Shared state of one materialized module.
///
/// Owned by the [`Module`] it materialized; every entity refers back to it weakly through its
/// [`Origin`].
pub struct LoaderContext {
    this: Weak<LoaderContext>,
    provider: Arc<dyn MetadataProvider>,
    policy: InitPolicy,
    module: OnceLock<Weak<Module>>,
    type_defs: DashMap<u32, TypeDefRc>,
    type_refs: DashMap<u32, TypeRefRc>,
    type_specs: DashMap<u32, TypeSpecRc>,
    fields: DashMap<u32, FieldRc>,
    method_defs: DashMap<u32, MethodDefRc>,
    params: DashMap<u32, ParamRc>,
    member_refs: DashMap<u32, MemberRefRc>,
    events: DashMap<u32, EventRc>,
    properties: DashMap<u32, PropertyRc>,
    module_refs: DashMap<u32, ModuleRefRc>,
    assembly_refs: DashMap<u32, AssemblyRefRc>,
    files: DashMap<u32, FileRc>,
    exported_types: DashMap<u32, ExportedTypeRc>,
    manifest_resources: DashMap<u32, ManifestResourceRc>,
    generic_params: DashMap<u32, GenericParamRc>,
    method_specs: DashMap<u32, MethodSpecRc>,
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderContext")
            .field("policy", &self.policy)
            .field("type_defs", &self.type_defs.len())
            .field("method_defs", &self.method_defs.len())
            .finish_non_exhaustive()
    }
}

impl LoaderContext {
    /// Create a loader over `provider`
    pub(crate) fn new(provider: Arc<dyn MetadataProvider>, policy: InitPolicy) -> Arc<Self> {
        Arc::new_cyclic(|this| LoaderContext {
            this: this.clone(),
            provider,
            policy,
            module: OnceLock::new(),
            type_defs: DashMap::new(),
            type_refs: DashMap::new(),
            type_specs: DashMap::new(),
            fields: DashMap::new(),
            method_defs: DashMap::new(),
            params: DashMap::new(),
            member_refs: DashMap::new(),
            events: DashMap::new(),
            properties: DashMap::new(),
            module_refs: DashMap::new(),
            assembly_refs: DashMap::new(),
            files: DashMap::new(),
            exported_types: DashMap::new(),
            manifest_resources: DashMap::new(),
            generic_params: DashMap::new(),
            method_specs: DashMap::new(),
        })
    }

    /// The backing store
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    /// The initialization policy of every entity this loader materializes
    #[must_use]
    pub fn policy(&self) -> InitPolicy {
        self.policy
    }

    /// Number of rows materialized so far, across all tables
    #[must_use]
    pub fn materialized_count(&self) -> usize {
        self.type_defs.len()
            + self.type_refs.len()
            + self.type_specs.len()
            + self.fields.len()
            + self.method_defs.len()
            + self.params.len()
            + self.member_refs.len()
            + self.events.len()
            + self.properties.len()
            + self.module_refs.len()
            + self.assembly_refs.len()
            + self.files.len()
            + self.exported_types.len()
            + self.manifest_resources.len()
            + self.generic_params.len()
            + self.method_specs.len()
    }

    pub(crate) fn origin(&self, rid: u32) -> Origin {
        Origin::FromBytes {
            rid,
            reader: self.this.clone(),
        }
    }

    pub(crate) fn lock(&self) -> EntityLock {
        EntityLock::new(self.policy)
    }

    pub(crate) fn attach_module(&self, module: &ModuleRc) {
        let _ = self.module.set(Arc::downgrade(module));
    }

    /// The module this loader materialized
    #[must_use]
    pub fn module(&self) -> Option<ModuleRc> {
        self.module.get().and_then(Weak::upgrade)
    }

    pub(crate) fn module_weak(&self) -> Weak<Module> {
        self.module.get().cloned().unwrap_or_default()
    }

    pub(crate) fn string(&self, index: u32) -> Name {
        self.provider.string(index).unwrap_or_default()
    }

    pub(crate) fn blob(&self, index: u32) -> Vec<u8> {
        self.provider.blob(index).unwrap_or_default()
    }

    pub(crate) fn guid(&self, index: u32) -> Option<uguid::Guid> {
        self.provider.guid(index)
    }

    /// The children of `owner` along `relation`
    pub(crate) fn children(&self, relation: Relation, owner: Token) -> Vec<u32> {
        self.provider.children(relation, owner)
    }

    table_access!(
        /// The `TypeDef` at `rid`
        type_def, fresh_type_def, type_defs, TypeDef, TypeDefRc
    );
    table_access!(
        /// The `TypeRef` at `rid`
        type_ref, fresh_type_ref, type_refs, TypeRef, TypeRefRc
    );
    table_access!(
        /// The `TypeSpec` at `rid`
        type_spec, fresh_type_spec, type_specs, TypeSpec, TypeSpecRc
    );
    table_access!(
        /// The `Field` at `rid`
        field, fresh_field, fields, Field, FieldRc
    );
    table_access!(
        /// The `MethodDef` at `rid`
        method_def, fresh_method_def, method_defs, MethodDef, MethodDefRc
    );
    table_access!(
        /// The `Param` at `rid`
        param, fresh_param, params, Param, ParamRc
    );
    table_access!(
        /// The `MemberRef` at `rid`
        member_ref, fresh_member_ref, member_refs, MemberRef, MemberRefRc
    );
    table_access!(
        /// The `Event` at `rid`
        event, fresh_event, events, Event, EventRc
    );
    table_access!(
        /// The `Property` at `rid`
        property, fresh_property, properties, Property, PropertyRc
    );
    table_access!(
        /// The `ModuleRef` at `rid`
        module_ref, fresh_module_ref, module_refs, ModuleRef, ModuleRefRc
    );
    table_access!(
        /// The `AssemblyRef` at `rid`
        assembly_ref, fresh_assembly_ref, assembly_refs, AssemblyRef, AssemblyRefRc
    );
    table_access!(
        /// The `File` at `rid`
        file, fresh_file, files, File, FileRc
    );
    table_access!(
        /// The `ExportedType` at `rid`
        exported_type, fresh_exported_type, exported_types, ExportedType, ExportedTypeRc
    );
    table_access!(
        /// The `ManifestResource` at `rid`
        manifest_resource,
        fresh_manifest_resource,
        manifest_resources,
        ManifestResource,
        ManifestResourceRc
    );
    table_access!(
        /// The `GenericParam` at `rid`
        generic_param, fresh_generic_param, generic_params, GenericParam, GenericParamRc
    );
    table_access!(
        /// The `MethodSpec` at `rid`
        method_spec, fresh_method_spec, method_specs, MethodSpec, MethodSpecRc
    );

    /// A `TypeDefOrRef` coded index, `None` when null, out of range or pointing at a table the
    /// coded index does not admit
    pub(crate) fn type_def_or_ref(&self, index: CodedIndex) -> Option<TypeDefOrRef> {
        if !index.is_valid_for(CodedIndexType::TypeDefOrRef) {
            return None;
        }
        match index.tag {
            TableId::TypeDef => self.type_def(index.row).map(TypeDefOrRef::TypeDef),
            TableId::TypeRef => self.type_ref(index.row).map(TypeDefOrRef::TypeRef),
            TableId::TypeSpec => self.type_spec(index.row).map(TypeDefOrRef::TypeSpec),
            _ => None,
        }
    }

    pub(crate) fn resolution_scope(&self, index: CodedIndex) -> Option<ResolutionScope> {
        if !index.is_valid_for(CodedIndexType::ResolutionScope) {
            return None;
        }
        match index.tag {
            TableId::Module if index.row == 1 => Some(ResolutionScope::Module(self.module_weak())),
            TableId::ModuleRef => self.module_ref(index.row).map(ResolutionScope::ModuleRef),
            TableId::AssemblyRef => self.assembly_ref(index.row).map(ResolutionScope::AssemblyRef),
            TableId::TypeRef => self.type_ref(index.row).map(ResolutionScope::TypeRef),
            _ => None,
        }
    }

    pub(crate) fn member_ref_parent(&self, index: CodedIndex) -> Option<MemberRefParent> {
        if !index.is_valid_for(CodedIndexType::MemberRefParent) {
            return None;
        }
        match index.tag {
            TableId::TypeDef => self.type_def(index.row).map(MemberRefParent::TypeDef),
            TableId::TypeRef => self.type_ref(index.row).map(MemberRefParent::TypeRef),
            TableId::TypeSpec => self.type_spec(index.row).map(MemberRefParent::TypeSpec),
            TableId::ModuleRef => self.module_ref(index.row).map(MemberRefParent::ModuleRef),
            TableId::MethodDef => self.method_def(index.row).map(MemberRefParent::MethodDef),
            _ => None,
        }
    }

    fn method_def_or_ref_of(
        &self,
        index: CodedIndex,
        kind: CodedIndexType,
    ) -> Option<MethodDefOrRef> {
        if !index.is_valid_for(kind) {
            return None;
        }
        match index.tag {
            TableId::MethodDef => self.method_def(index.row).map(MethodDefOrRef::MethodDef),
            TableId::MemberRef => self.member_ref(index.row).map(MethodDefOrRef::MemberRef),
            _ => None,
        }
    }

    pub(crate) fn method_def_or_ref(&self, index: CodedIndex) -> Option<MethodDefOrRef> {
        self.method_def_or_ref_of(index, CodedIndexType::MethodDefOrRef)
    }

    pub(crate) fn custom_attribute_type(&self, index: CodedIndex) -> Option<MethodDefOrRef> {
        self.method_def_or_ref_of(index, CodedIndexType::CustomAttributeType)
    }

    pub(crate) fn implementation(&self, index: CodedIndex) -> Option<Implementation> {
        if !index.is_valid_for(CodedIndexType::Implementation) {
            return None;
        }
        match index.tag {
            TableId::File => self.file(index.row).map(Implementation::File),
            TableId::AssemblyRef => self.assembly_ref(index.row).map(Implementation::AssemblyRef),
            TableId::ExportedType => {
                self.exported_type(index.row).map(Implementation::ExportedType)
            }
            _ => None,
        }
    }

    pub(crate) fn type_or_method_def(&self, index: CodedIndex) -> Option<TypeOrMethodDef> {
        if !index.is_valid_for(CodedIndexType::TypeOrMethodDef) {
            return None;
        }
        match index.tag {
            TableId::TypeDef => self.type_def(index.row).map(TypeOrMethodDef::TypeDef),
            TableId::MethodDef => self.method_def(index.row).map(TypeOrMethodDef::MethodDef),
            _ => None,
        }
    }

    /// Custom attributes decorating `parent`, materialized eagerly
    pub(crate) fn custom_attributes(&self, parent: Token) -> CustomAttributeList {
        let list = boxcar::Vec::new();
        for rid in self.children(Relation::CustomAttributes, parent) {
            if let Some(RawRow::CustomAttribute(raw)) =
                self.provider.row(TableId::CustomAttribute, rid)
            {
                list.push(raw.to_owned(self));
            }
        }
        Arc::new(list)
    }

    /// Declarative security protecting `parent`, in table order
    pub(crate) fn decl_securities(&self, parent: Token) -> DeclSecurityList {
        let list = boxcar::Vec::new();
        for rid in self.children(Relation::DeclSecurities, parent) {
            if let Some(RawRow::DeclSecurity(raw)) = self.provider.row(TableId::DeclSecurity, rid)
            {
                list.push(raw.to_owned(self));
            }
        }
        Arc::new(list)
    }

    /// The default value of `parent`; the first row wins if several claim the same parent
    pub(crate) fn constant(&self, parent: Token) -> Option<ConstantRc> {
        let rid = *self.children(Relation::Constant, parent).first()?;
        match self.provider.row(TableId::Constant, rid)? {
            RawRow::Constant(raw) => Some(raw.to_owned(self)),
            _ => None,
        }
    }

    /// The P/Invoke mapping of `method`
    pub(crate) fn impl_map(&self, method: Token) -> Option<ImplMapRc> {
        let rid = *self.children(Relation::ImplMap, method).first()?;
        match self.provider.row(TableId::ImplMap, rid)? {
            RawRow::ImplMap(raw) => Some(raw.to_owned(self)),
            _ => None,
        }
    }
}

impl TokenResolver for LoaderContext {
    fn type_def_or_ref(&self, token: Token) -> Option<TypeDefOrRef> {
        let table = token.table_id()?;
        LoaderContext::type_def_or_ref(self, CodedIndex::new(table, token.row()))
    }
}
