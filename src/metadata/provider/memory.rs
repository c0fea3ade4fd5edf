use std::{collections::HashMap, fmt, sync::Arc};

use uguid::Guid;

use crate::metadata::{
    customdebuginformation::CustomDebugInfo,
    identity::{AssemblyHashAlgorithm, AssemblyIdentity, Identity},
    provider::{MetadataProvider, RawRow, Relation, TokenResolver},
    signatures::{Signature, TypeSignature},
    streams::{Name, StringHeap},
    tables::{
        AssemblyFlags, AssemblyRaw, AssemblyRefRaw, CodedIndex, ConstantRaw, CustomAttributeRaw,
        DeclSecurityRaw, EventRaw, ExportedTypeRaw, FieldRaw, FileRaw, GenericParamConstraintRaw,
        GenericParamRaw, ImplMapRaw, ManifestResourceRaw, MemberRefRaw, MethodBody, MethodDefRaw,
        MethodImplRaw, MethodSemanticsRaw, MethodSpecRaw, ModuleRaw, ModuleRefRaw, ParamRaw,
        PropertyRaw, TableId, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
    },
    token::Token,
};

/// Deferred decoding of a member signature
pub type SignatureThunk = Arc<dyn Fn(&dyn TokenResolver) -> Option<Signature> + Send + Sync>;
/// Deferred decoding of a type signature
pub type TypeSignatureThunk =
    Arc<dyn Fn(&dyn TokenResolver) -> Option<TypeSignature> + Send + Sync>;

enum BlobEntry {
    Data(Vec<u8>),
    Signature(SignatureThunk),
    TypeSignature(TypeSignatureThunk),
}

/// A backing store held entirely in memory.
///
/// Signatures are stored as closures over a [`TokenResolver`]: they build the decoded signature
/// on demand, exactly like a blob decoder would, so the loader's laziness is observable.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cilgraph::metadata::{config::LoaderConfig, provider::MemoryProvider, tables::Module};
///
/// let mut provider = MemoryProvider::new();
/// provider.add_module("Demo.dll");
/// provider.add_type_def("Demo", "Widget", 0x1, None);
///
/// let module = Module::from_provider(Arc::new(provider), LoaderConfig::default())?;
/// assert!(module.find_by_name("Demo", "Widget").is_some());
/// # Ok::<(), cilgraph::Error>(())
/// ```
#[derive(Default)]
pub struct MemoryProvider {
    tables: HashMap<TableId, Vec<RawRow>>,
    strings: StringHeap,
    blobs: Vec<BlobEntry>,
    guids: Vec<Guid>,
    links: HashMap<(Relation, Token), Vec<u32>>,
    parents: HashMap<(Relation, Token), Token>,
    bodies: HashMap<u32, MethodBody>,
    next_rva: u32,
    resources: HashMap<u32, Vec<u8>>,
    next_resource_offset: u32,
    debug_infos: HashMap<Token, Vec<CustomDebugInfo>>,
}

impl fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows: Vec<(TableId, usize)> =
            self.tables.iter().map(|(table, rows)| (*table, rows.len())).collect();
        rows.sort();

        f.debug_struct("MemoryProvider")
            .field("rows", &rows)
            .field("strings", &self.strings.len())
            .field("blobs", &self.blobs.len())
            .finish_non_exhaustive()
    }
}

/// A coded index pointing at `token`, null for the null token or an unknown table
fn coded(token: Token) -> CodedIndex {
    match token.table_id() {
        Some(table) if !token.is_null() => CodedIndex::new(table, token.row()),
        _ => CodedIndex::null(),
    }
}

impl MemoryProvider {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        MemoryProvider {
            next_rva: 0x2050,
            ..Default::default()
        }
    }

    /// The rid the next row of `table` receives, and its token
    fn next(&self, table: TableId) -> (u32, Token) {
        #[allow(clippy::cast_possible_truncation)]
        let rid = self.tables.get(&table).map_or(0, Vec::len) as u32 + 1;
        (rid, Token::from_parts(table, rid))
    }

    /// Append a row. The row's rid must be the one [`MemoryProvider::row_count`] + 1 predicts.
    pub fn push(&mut self, row: RawRow) -> Token {
        let token = row.token();
        self.tables.entry(row.table()).or_default().push(row);
        token
    }

    /// Add `child` to the children of `owner`. The first owner registered for a child is the one
    /// [`MetadataProvider::parent`] reports.
    pub fn link(&mut self, relation: Relation, owner: Token, child: Token) {
        self.links
            .entry((relation, owner))
            .or_default()
            .push(child.row());
        self.parents.entry((relation, child)).or_insert(owner);
    }

    /// Add an identifier to the string heap
    pub fn add_string(&mut self, value: &str) -> u32 {
        self.strings.add(value.as_bytes())
    }

    /// Add raw bytes to the blob heap; index 0 stays the empty blob
    pub fn add_blob(&mut self, data: Vec<u8>) -> u32 {
        self.push_blob(BlobEntry::Data(data))
    }

    /// Add a member signature to the blob heap
    pub fn add_signature<F>(&mut self, decode: F) -> u32
    where
        F: Fn(&dyn TokenResolver) -> Option<Signature> + Send + Sync + 'static,
    {
        self.push_blob(BlobEntry::Signature(Arc::new(decode)))
    }

    /// Add a type signature to the blob heap
    pub fn add_type_signature<F>(&mut self, decode: F) -> u32
    where
        F: Fn(&dyn TokenResolver) -> Option<TypeSignature> + Send + Sync + 'static,
    {
        self.push_blob(BlobEntry::TypeSignature(Arc::new(decode)))
    }

    fn push_blob(&mut self, entry: BlobEntry) -> u32 {
        self.blobs.push(entry);
        #[allow(clippy::cast_possible_truncation)]
        let index = self.blobs.len() as u32;
        index
    }

    /// Add a GUID to the GUID heap
    pub fn add_guid(&mut self, guid: Guid) -> u32 {
        self.guids.push(guid);
        #[allow(clippy::cast_possible_truncation)]
        let index = self.guids.len() as u32;
        index
    }

    /// Store `body` for `method` and point the method's RVA at it
    pub fn set_method_body(&mut self, method: Token, body: MethodBody) {
        let rva = self.next_rva;
        let size = u32::try_from(body.code.len()).unwrap_or(0);
        self.next_rva = self.next_rva.saturating_add(0x10 + size);

        if let Some(RawRow::MethodDef(row)) = self
            .tables
            .get_mut(&TableId::MethodDef)
            .and_then(|rows| rows.get_mut(method.row().checked_sub(1)? as usize))
        {
            row.rva = rva;
            self.bodies.insert(rva, body);
        }
    }

    /// Attach a custom debug information record to `token`
    pub fn add_custom_debug_info(&mut self, token: Token, info: CustomDebugInfo) {
        self.debug_infos.entry(token).or_default().push(info);
    }

    /// Add the `Module` row
    pub fn add_module(&mut self, name: &str) -> Token {
        let (rid, token) = self.next(TableId::Module);
        let name = self.add_string(name);
        let mvid = self.add_guid(Guid::from_random_bytes([rid as u8; 16]));
        self.push(RawRow::Module(ModuleRaw {
            rid,
            token,
            generation: 0,
            name,
            mvid,
        }))
    }

    /// Add the `Assembly` row, making this the manifest module of `identity`
    pub fn add_assembly(&mut self, identity: &AssemblyIdentity) -> Token {
        let (rid, token) = self.next(TableId::Assembly);
        let (public_key, flags) = match &identity.strong_name {
            Some(Identity::PubKey(key)) => (self.add_blob(key.clone()), AssemblyFlags::PUBLIC_KEY),
            _ => (0, 0),
        };
        let name = self.add_string(&identity.name);
        let culture = self.add_string(identity.culture.as_deref().unwrap_or_default());

        self.push(RawRow::Assembly(AssemblyRaw {
            rid,
            token,
            hash_alg_id: AssemblyHashAlgorithm::SHA1,
            major_version: identity.version.major,
            minor_version: identity.version.minor,
            build_number: identity.version.build,
            revision_number: identity.version.revision,
            flags,
            public_key,
            name,
            culture,
        }))
    }

    /// Add an `AssemblyRef` row
    pub fn add_assembly_ref(&mut self, identity: &AssemblyIdentity, flags: u32) -> Token {
        let (rid, token) = self.next(TableId::AssemblyRef);
        let (public_key_or_token, flags) = match &identity.strong_name {
            Some(Identity::PubKey(key)) => (
                self.add_blob(key.clone()),
                flags | AssemblyFlags::PUBLIC_KEY,
            ),
            Some(Identity::Token(value)) => (
                self.add_blob(value.to_le_bytes().to_vec()),
                flags & !AssemblyFlags::PUBLIC_KEY,
            ),
            None => (0, flags & !AssemblyFlags::PUBLIC_KEY),
        };
        let name = self.add_string(&identity.name);
        let culture = self.add_string(identity.culture.as_deref().unwrap_or_default());

        self.push(RawRow::AssemblyRef(AssemblyRefRaw {
            rid,
            token,
            major_version: identity.version.major,
            minor_version: identity.version.minor,
            build_number: identity.version.build,
            revision_number: identity.version.revision,
            flags,
            public_key_or_token,
            name,
            culture,
            hash_value: 0,
        }))
    }

    /// Add a `ModuleRef` row
    pub fn add_module_ref(&mut self, name: &str) -> Token {
        let (rid, token) = self.next(TableId::ModuleRef);
        let name = self.add_string(name);
        self.push(RawRow::ModuleRef(ModuleRefRaw { rid, token, name }))
    }

    /// Add a `File` row
    pub fn add_file(&mut self, name: &str, flags: u32) -> Token {
        let (rid, token) = self.next(TableId::File);
        let name = self.add_string(name);
        self.push(RawRow::File(FileRaw {
            rid,
            token,
            flags,
            name,
            hash_value: 0,
        }))
    }

    /// Add a `TypeRef` row resolved in `scope` (a module, module reference, assembly reference or
    /// enclosing type reference token)
    pub fn add_type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> Token {
        let (rid, token) = self.next(TableId::TypeRef);
        let type_name = self.add_string(name);
        let type_namespace = self.add_string(namespace);
        self.push(RawRow::TypeRef(TypeRefRaw {
            rid,
            token,
            resolution_scope: coded(scope),
            type_name,
            type_namespace,
        }))
    }

    /// Add a top-level `TypeDef` row
    pub fn add_type_def(
        &mut self,
        namespace: &str,
        name: &str,
        flags: u32,
        extends: Option<Token>,
    ) -> Token {
        let (rid, token) = self.next(TableId::TypeDef);
        let type_name = self.add_string(name);
        let type_namespace = self.add_string(namespace);
        self.push(RawRow::TypeDef(TypeDefRaw {
            rid,
            token,
            flags,
            type_name,
            type_namespace,
            extends: extends.map_or_else(CodedIndex::null, coded),
        }))
    }

    /// Add a `TypeDef` row nested in `enclosing`
    pub fn add_nested_type(&mut self, enclosing: Token, name: &str, flags: u32) -> Token {
        let nested = self.add_type_def("", name, flags, None);
        self.link(Relation::NestedTypes, enclosing, nested);
        nested
    }

    /// Add a `Field` row declared by `owner`
    pub fn add_field(&mut self, owner: Token, name: &str, flags: u32, signature: u32) -> Token {
        let (rid, token) = self.next(TableId::Field);
        let name = self.add_string(name);
        self.push(RawRow::Field(FieldRaw {
            rid,
            token,
            flags,
            name,
            signature,
        }));
        self.link(Relation::Fields, owner, token);
        token
    }

    /// Add a `MethodDef` row declared by `owner`
    pub fn add_method(&mut self, owner: Token, name: &str, flags: u32, signature: u32) -> Token {
        let (rid, token) = self.next(TableId::MethodDef);
        let name = self.add_string(name);
        self.push(RawRow::MethodDef(MethodDefRaw {
            rid,
            token,
            rva: 0,
            impl_flags: 0,
            flags,
            name,
            signature,
        }));
        self.link(Relation::Methods, owner, token);
        token
    }

    /// Add a `Param` row of `method`
    pub fn add_param(&mut self, method: Token, sequence: u16, name: &str) -> Token {
        let (rid, token) = self.next(TableId::Param);
        let name = self.add_string(name);
        self.push(RawRow::Param(ParamRaw {
            rid,
            token,
            flags: 0,
            sequence: u32::from(sequence),
            name,
        }));
        self.link(Relation::Params, method, token);
        token
    }

    /// Add a `Property` row declared by `owner`
    pub fn add_property(&mut self, owner: Token, name: &str, signature: u32) -> Token {
        let (rid, token) = self.next(TableId::Property);
        let name = self.add_string(name);
        self.push(RawRow::Property(PropertyRaw {
            rid,
            token,
            flags: 0,
            name,
            signature,
        }));
        self.link(Relation::Properties, owner, token);
        token
    }

    /// Add an `Event` row declared by `owner`
    pub fn add_event(&mut self, owner: Token, name: &str, event_type: Option<Token>) -> Token {
        let (rid, token) = self.next(TableId::Event);
        let name = self.add_string(name);
        self.push(RawRow::Event(EventRaw {
            rid,
            token,
            flags: 0,
            name,
            event_type: event_type.map_or_else(CodedIndex::null, coded),
        }));
        self.link(Relation::Events, owner, token);
        token
    }

    /// Add a `GenericParam` row owned by the type or method `owner`
    pub fn add_generic_param(&mut self, owner: Token, number: u16, name: &str) -> Token {
        let (rid, token) = self.next(TableId::GenericParam);
        let name = self.add_string(name);
        self.push(RawRow::GenericParam(GenericParamRaw {
            rid,
            token,
            number: u32::from(number),
            flags: 0,
            owner: coded(owner),
            name,
        }))
    }

    /// Add a `GenericParamConstraint` row
    pub fn add_generic_param_constraint(&mut self, param: Token, constraint: Token) -> Token {
        let (rid, token) = self.next(TableId::GenericParamConstraint);
        self.push(RawRow::GenericParamConstraint(GenericParamConstraintRaw {
            rid,
            token,
            owner: param.row(),
            constraint: coded(constraint),
        }))
    }

    /// Add a `MemberRef` row
    pub fn add_member_ref(&mut self, class: Token, name: &str, signature: u32) -> Token {
        let (rid, token) = self.next(TableId::MemberRef);
        let name = self.add_string(name);
        self.push(RawRow::MemberRef(MemberRefRaw {
            rid,
            token,
            class: coded(class),
            name,
            signature,
        }))
    }

    /// Add a `TypeSpec` row
    pub fn add_type_spec(&mut self, signature: u32) -> Token {
        let (rid, token) = self.next(TableId::TypeSpec);
        self.push(RawRow::TypeSpec(TypeSpecRaw {
            rid,
            token,
            signature,
        }))
    }

    /// Add a `MethodSpec` row
    pub fn add_method_spec(&mut self, method: Token, instantiation: u32) -> Token {
        let (rid, token) = self.next(TableId::MethodSpec);
        self.push(RawRow::MethodSpec(MethodSpecRaw {
            rid,
            token,
            method: coded(method),
            instantiation,
        }))
    }

    /// Add an `ExportedType` row
    pub fn add_exported_type(
        &mut self,
        namespace: &str,
        name: &str,
        flags: u32,
        implementation: Token,
    ) -> Token {
        let (rid, token) = self.next(TableId::ExportedType);
        let name = self.add_string(name);
        let namespace = self.add_string(namespace);
        self.push(RawRow::ExportedType(ExportedTypeRaw {
            rid,
            token,
            flags,
            type_def_id: 0,
            name,
            namespace,
            implementation: coded(implementation),
        }))
    }

    /// Add a `Constant` row
    pub fn add_constant(&mut self, parent: Token, element_type: u8, value: Vec<u8>) -> Token {
        let (rid, token) = self.next(TableId::Constant);
        let value = self.add_blob(value);
        self.push(RawRow::Constant(ConstantRaw {
            rid,
            token,
            base: element_type,
            parent: coded(parent),
            value,
        }))
    }

    /// Add a `CustomAttribute` row
    pub fn add_custom_attribute(
        &mut self,
        parent: Token,
        constructor: Token,
        value: Vec<u8>,
    ) -> Token {
        let (rid, token) = self.next(TableId::CustomAttribute);
        let value = self.add_blob(value);
        self.push(RawRow::CustomAttribute(CustomAttributeRaw {
            rid,
            token,
            parent: coded(parent),
            constructor: coded(constructor),
            value,
        }))
    }

    /// Add a `DeclSecurity` row protecting the type, method or assembly `parent`
    pub fn add_decl_security(
        &mut self,
        parent: Token,
        action: u16,
        permission_set: Vec<u8>,
    ) -> Token {
        let (rid, token) = self.next(TableId::DeclSecurity);
        let permission_set = self.add_blob(permission_set);
        self.push(RawRow::DeclSecurity(DeclSecurityRaw {
            rid,
            token,
            action,
            parent: coded(parent),
            permission_set,
        }))
    }

    /// Add a `ManifestResource` row for a resource embedded in this module, storing `data` in the
    /// resources directory
    pub fn add_embedded_resource(&mut self, name: &str, flags: u32, data: Vec<u8>) -> Token {
        let (rid, token) = self.next(TableId::ManifestResource);
        let offset = self.next_resource_offset;
        let size = u32::try_from(data.len()).unwrap_or(0);
        // each entry is prefixed by its length and aligned to 8 bytes
        self.next_resource_offset = offset.saturating_add(4 + size).saturating_add(7) & !7;
        self.resources.insert(offset, data);

        let name = self.add_string(name);
        self.push(RawRow::ManifestResource(ManifestResourceRaw {
            rid,
            token,
            offset,
            flags,
            name,
            implementation: CodedIndex::null(),
        }))
    }

    /// Add a `ManifestResource` row for a resource held by the file or assembly reference
    /// `implementation`
    pub fn add_linked_resource(&mut self, name: &str, flags: u32, implementation: Token) -> Token {
        let (rid, token) = self.next(TableId::ManifestResource);
        let name = self.add_string(name);
        self.push(RawRow::ManifestResource(ManifestResourceRaw {
            rid,
            token,
            offset: 0,
            flags,
            name,
            implementation: coded(implementation),
        }))
    }

    /// Add an `ImplMap` row mapping `method` to `import_name` in the native library `scope`
    pub fn add_impl_map(
        &mut self,
        method: Token,
        import_name: &str,
        scope: Token,
        flags: u32,
    ) -> Token {
        let (rid, token) = self.next(TableId::ImplMap);
        let import_name = self.add_string(import_name);
        self.push(RawRow::ImplMap(ImplMapRaw {
            rid,
            token,
            mapping_flags: flags,
            member_forwarded: coded(method),
            import_name,
            import_scope: scope.row(),
        }))
    }

    /// Add a `MethodImpl` row
    pub fn add_method_impl(&mut self, class: Token, body: Token, declaration: Token) -> Token {
        let (rid, token) = self.next(TableId::MethodImpl);
        self.push(RawRow::MethodImpl(MethodImplRaw {
            rid,
            token,
            class: class.row(),
            method_body: coded(body),
            method_declaration: coded(declaration),
        }))
    }

    /// Add a `MethodSemantics` row binding `method` to the property or event `association`
    pub fn add_method_semantics(
        &mut self,
        semantics: u32,
        method: Token,
        association: Token,
    ) -> Token {
        let (rid, token) = self.next(TableId::MethodSemantics);
        self.push(RawRow::MethodSemantics(MethodSemanticsRaw {
            rid,
            token,
            semantics,
            method: method.row(),
            association: coded(association),
        }))
    }

    fn rows(&self, table: TableId) -> &[RawRow] {
        self.tables.get(&table).map_or(&[], Vec::as_slice)
    }

    fn scan<F>(&self, table: TableId, matches: F) -> Vec<u32>
    where
        F: Fn(&RawRow) -> bool,
    {
        self.rows(table)
            .iter()
            .filter(|row| matches(row))
            .map(RawRow::rid)
            .collect()
    }

    fn is_top_level(&self, type_def: Token) -> bool {
        !self
            .parents
            .contains_key(&(Relation::NestedTypes, type_def))
    }
}

/// The `Module` row token every module-level relation is keyed by
const MODULE_TOKEN: Token = Token(0x0000_0001);

impl MetadataProvider for MemoryProvider {
    fn row_count(&self, table: TableId) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.rows(table).len() as u32;
        count
    }

    fn row(&self, table: TableId, rid: u32) -> Option<RawRow> {
        let index = rid.checked_sub(1)? as usize;
        self.rows(table).get(index).cloned()
    }

    fn children(&self, relation: Relation, owner: Token) -> Vec<u32> {
        match relation {
            Relation::TypeDefs => {
                if owner != MODULE_TOKEN {
                    return Vec::new();
                }
                self.scan(TableId::TypeDef, |row| self.is_top_level(row.token()))
            }
            Relation::ExportedTypes => {
                if owner != MODULE_TOKEN {
                    return Vec::new();
                }
                self.scan(TableId::ExportedType, |_| true)
            }
            Relation::ManifestResources => {
                if owner != MODULE_TOKEN {
                    return Vec::new();
                }
                self.scan(TableId::ManifestResource, |_| true)
            }
            Relation::DeclSecurities => self.scan(TableId::DeclSecurity, |row| {
                matches!(row, RawRow::DeclSecurity(security) if security.parent.token == owner)
            }),
            Relation::GenericParams => self.scan(TableId::GenericParam, |row| {
                matches!(row, RawRow::GenericParam(param) if param.owner.token == owner)
            }),
            Relation::GenericParamConstraints => {
                self.scan(TableId::GenericParamConstraint, |row| {
                    matches!(row, RawRow::GenericParamConstraint(constraint)
                        if Token::from_parts(TableId::GenericParam, constraint.owner) == owner)
                })
            }
            Relation::CustomAttributes => self.scan(TableId::CustomAttribute, |row| {
                matches!(row, RawRow::CustomAttribute(attribute) if attribute.parent.token == owner)
            }),
            Relation::Constant => self.scan(TableId::Constant, |row| {
                matches!(row, RawRow::Constant(constant) if constant.parent.token == owner)
            }),
            Relation::ImplMap => self.scan(TableId::ImplMap, |row| {
                matches!(row, RawRow::ImplMap(map) if map.member_forwarded.token == owner)
            }),
            Relation::MethodImpls => self.scan(TableId::MethodImpl, |row| {
                matches!(row, RawRow::MethodImpl(implementation)
                    if Token::from_parts(TableId::TypeDef, implementation.class) == owner)
            }),
            Relation::MethodSemantics => self.scan(TableId::MethodSemantics, |row| {
                matches!(row, RawRow::MethodSemantics(semantics)
                    if semantics.association.token == owner)
            }),
            Relation::NestedTypes
            | Relation::Fields
            | Relation::Methods
            | Relation::Properties
            | Relation::Events
            | Relation::Params => self
                .links
                .get(&(relation, owner))
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn parent(&self, relation: Relation, child: Token) -> Option<Token> {
        match relation {
            Relation::TypeDefs => (child.table_id() == Some(TableId::TypeDef)
                && self.row(TableId::TypeDef, child.row()).is_some()
                && self.is_top_level(child)
                && self.row(TableId::Module, 1).is_some())
            .then_some(MODULE_TOKEN),
            _ if relation.is_explicit() => self.parents.get(&(relation, child)).copied(),
            _ => None,
        }
    }

    fn string(&self, index: u32) -> Option<Name> {
        self.strings.get(index)
    }

    fn blob(&self, index: u32) -> Option<Vec<u8>> {
        if index == 0 {
            return Some(Vec::new());
        }
        match self.blobs.get(index as usize - 1)? {
            BlobEntry::Data(data) => Some(data.clone()),
            BlobEntry::Signature(_) | BlobEntry::TypeSignature(_) => None,
        }
    }

    fn guid(&self, index: u32) -> Option<Guid> {
        self.guids.get(index.checked_sub(1)? as usize).copied()
    }

    fn signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<Signature> {
        match self.blobs.get(index.checked_sub(1)? as usize)? {
            BlobEntry::Signature(decode) => decode(resolver),
            BlobEntry::Data(_) | BlobEntry::TypeSignature(_) => None,
        }
    }

    fn type_signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<TypeSignature> {
        match self.blobs.get(index.checked_sub(1)? as usize)? {
            BlobEntry::TypeSignature(decode) => decode(resolver),
            BlobEntry::Data(_) | BlobEntry::Signature(_) => None,
        }
    }

    fn method_body(&self, _method: Token, rva: u32) -> Option<MethodBody> {
        self.bodies.get(&rva).cloned()
    }

    fn resource_data(&self, _resource: Token, offset: u32) -> Option<Vec<u8>> {
        self.resources.get(&offset).cloned()
    }

    fn custom_debug_infos(&self, token: Token) -> Vec<CustomDebugInfo> {
        self.debug_infos.get(&token).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::signatures::SignatureField;

    struct NoTokens;

    impl TokenResolver for NoTokens {
        fn type_def_or_ref(&self, _token: Token) -> Option<crate::metadata::tables::TypeDefOrRef> {
            None
        }
    }

    #[test]
    fn rows_are_one_based() {
        let mut provider = MemoryProvider::new();
        let module = provider.add_module("Demo.dll");
        assert_eq!(module, MODULE_TOKEN);
        assert_eq!(provider.row_count(TableId::Module), 1);
        assert!(provider.row(TableId::Module, 0).is_none());
        assert!(provider.row(TableId::Module, 2).is_none());

        let Some(RawRow::Module(row)) = provider.row(TableId::Module, 1) else {
            panic!("module row missing");
        };
        assert_eq!(provider.string(row.name).unwrap(), "Demo.dll");
        assert!(provider.guid(row.mvid).is_some());
    }

    #[test]
    fn top_level_types_exclude_nested() {
        let mut provider = MemoryProvider::new();
        provider.add_module("Demo.dll");
        let outer = provider.add_type_def("Demo", "Outer", 0, None);
        let inner = provider.add_nested_type(outer, "Inner", 0);

        assert_eq!(
            provider.children(Relation::TypeDefs, MODULE_TOKEN),
            vec![outer.row()]
        );
        assert_eq!(
            provider.children(Relation::NestedTypes, outer),
            vec![inner.row()]
        );
        assert_eq!(provider.parent(Relation::NestedTypes, inner), Some(outer));
        assert_eq!(provider.parent(Relation::TypeDefs, outer), Some(MODULE_TOKEN));
        assert_eq!(provider.parent(Relation::TypeDefs, inner), None);
    }

    #[test]
    fn first_parent_wins() {
        let mut provider = MemoryProvider::new();
        let first = provider.add_type_def("", "First", 0, None);
        let second = provider.add_type_def("", "Second", 0, None);
        let field = provider.add_field(first, "shared", 0, 0);
        provider.link(Relation::Fields, second, field);

        assert_eq!(provider.children(Relation::Fields, second), vec![field.row()]);
        assert_eq!(provider.parent(Relation::Fields, field), Some(first));
    }

    #[test]
    fn scanned_relations() {
        let mut provider = MemoryProvider::new();
        let owner = provider.add_type_def("", "Generic`1", 0, None);
        let param = provider.add_generic_param(owner, 0, "T");
        let constraint = provider.add_generic_param_constraint(param, owner);
        let attribute = provider.add_custom_attribute(owner, Token::new(0x0A00_0001), vec![1, 0]);

        assert_eq!(
            provider.children(Relation::GenericParams, owner),
            vec![param.row()]
        );
        assert_eq!(
            provider.children(Relation::GenericParamConstraints, param),
            vec![constraint.row()]
        );
        assert_eq!(
            provider.children(Relation::CustomAttributes, owner),
            vec![attribute.row()]
        );
        assert!(provider.parent(Relation::GenericParams, param).is_none());
    }

    #[test]
    fn resources_and_security() {
        let mut provider = MemoryProvider::new();
        let module = provider.add_module("Demo.dll");
        let owner = provider.add_type_def("Demo", "Guarded", 0, None);
        let security = provider.add_decl_security(owner, 0x0002, vec![b'.']);
        let first = provider.add_embedded_resource("a", 1, vec![7; 5]);
        let second = provider.add_embedded_resource("b", 1, vec![9]);

        assert_eq!(
            provider.children(Relation::DeclSecurities, owner),
            vec![security.row()]
        );
        assert_eq!(
            provider.children(Relation::ManifestResources, module),
            vec![first.row(), second.row()]
        );
        assert!(provider.children(Relation::ManifestResources, owner).is_empty());

        let Some(RawRow::ManifestResource(row)) = provider.row(TableId::ManifestResource, 2) else {
            panic!("resource row missing");
        };
        assert_eq!(row.offset, 16);
        assert_eq!(provider.resource_data(second, row.offset), Some(vec![9]));
        assert_eq!(provider.resource_data(first, 0), Some(vec![7; 5]));
    }

    #[test]
    fn blobs_and_signatures() {
        let mut provider = MemoryProvider::new();
        let data = provider.add_blob(vec![1, 2, 3]);
        let signature = provider.add_signature(|_| {
            Some(Signature::Field(SignatureField {
                base: TypeSignature::I4,
                ..Default::default()
            }))
        });

        assert_eq!(provider.blob(0), Some(Vec::new()));
        assert_eq!(provider.blob(data), Some(vec![1, 2, 3]));
        assert!(provider.blob(signature).is_none());
        assert!(provider.signature(data, &NoTokens).is_none());
        assert!(provider.type_signature(signature, &NoTokens).is_none());
        assert!(matches!(
            provider.signature(signature, &NoTokens),
            Some(Signature::Field(_))
        ));
        assert!(provider.signature(99, &NoTokens).is_none());
    }

    #[test]
    fn method_bodies_by_rva() {
        let mut provider = MemoryProvider::new();
        let owner = provider.add_type_def("", "Host", 0, None);
        let method = provider.add_method(owner, "Run", 0, 0);
        provider.set_method_body(
            method,
            MethodBody {
                max_stack: 8,
                code: vec![0x2A],
                ..Default::default()
            },
        );

        let Some(RawRow::MethodDef(row)) = provider.row(TableId::MethodDef, method.row()) else {
            panic!("method row missing");
        };
        assert_ne!(row.rva, 0);
        let body = provider.method_body(method, row.rva).unwrap();
        assert_eq!(body.code, vec![0x2A]);
    }
}
