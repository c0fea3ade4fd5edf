//! Compute hooks of every lazy slot.
//!
//! Each hook receives the original rid of the entity it computes for and only reads rows,
//! materializes through the caches, or builds fresh copies. Hooks never access a lazy slot of
//! another entity, so running one while the lock of the requesting entity is held cannot
//! deadlock.

use std::sync::{Arc, Weak};

use crate::metadata::{
    customdebuginformation::CustomDebugInfoList,
    entity::MetadataEntity,
    loader::LoaderContext,
    ownership::{OwnedList, OwnershipEdge},
    provider::{RawRow, Relation},
    signatures::{
        Signature, SignatureField, SignatureMethod, SignatureMethodSpec, SignatureProperty,
        TypeSignature,
    },
    tables::{
        DeclaredEvents, DeclaredFields, DeclaredMethods, DeclaredProperties, EventAccessors,
        EventList, ExportedTypeList, FieldList, GenericParamConstraintList, GenericParamList,
        GenericParams, Implementation, ManifestResourceList, MemberRefParent, MethodBody,
        MethodDef, MethodDefList, MethodDefOrRef, MethodDefRc, MethodOverride, MethodOverrideList,
        MethodParams, MethodSemanticsAttributes, Module, ModuleRc, ModuleTypeList, ModuleTypes,
        NestedTypeList, NestedTypes, ParamList, PropertyAccessors, PropertyList, ResolutionScope,
        TableId, TypeDef, TypeDefOrRef, TypeDefRc, TypeOrMethodDef, TypeOrMethodDefRef,
    },
    token::Token,
};

/// The raw row `rid` of `table`, `None` if missing or of an unexpected kind
macro_rules! row_of {
    ($ctx:expr, $table:ident, $rid:expr) => {
        match $ctx.provider().row(TableId::$table, $rid) {
            Some(RawRow::$table(raw)) => Some(raw),
            _ => None,
        }
    };
}

const MODULE_TOKEN: Token = Token(0x0000_0001);

impl LoaderContext {
    /// Fill an ownership list from the children of `parent` along `relation`.
    ///
    /// `order` sorts the candidates before adoption; rows claimed by another owner are
    /// materialized again through `fresh`.
    fn populate<E, G, F>(
        &self,
        owner: &E::Owner,
        relation: Relation,
        parent: Token,
        get: G,
        fresh: F,
        order: Option<fn(&Arc<E::Child>) -> u32>,
    ) -> Arc<OwnedList<E>>
    where
        E: OwnershipEdge,
        E::Child: MetadataEntity,
        G: Fn(&Self, u32) -> Option<Arc<E::Child>>,
        F: Fn(&Self, u32) -> Option<Arc<E::Child>>,
    {
        let mut candidates: Vec<Arc<E::Child>> = self
            .children(relation, parent)
            .into_iter()
            .filter_map(|rid| get(self, rid))
            .collect();
        if let Some(key) = order {
            candidates.sort_by_key(key);
        }

        Arc::new(OwnedList::<E>::populate(owner, candidates, |conflicting| {
            conflicting
                .origin()
                .original_rid()
                .and_then(|rid| fresh(self, rid))
        }))
    }

    fn type_token(rid: u32) -> Token {
        Token::from_parts(TableId::TypeDef, rid)
    }

    pub(crate) fn type_base(&self, rid: u32) -> Option<TypeDefOrRef> {
        let raw = row_of!(self, TypeDef, rid)?;
        self.type_def_or_ref(raw.extends)
    }

    pub(crate) fn type_owner_module(&self, rid: u32) -> Option<Weak<Module>> {
        let parent = self
            .provider()
            .parent(Relation::TypeDefs, Self::type_token(rid))?;
        (parent == MODULE_TOKEN).then(|| self.module_weak())
    }

    pub(crate) fn type_enclosing(&self, rid: u32) -> Option<Weak<TypeDef>> {
        let parent = self
            .provider()
            .parent(Relation::NestedTypes, Self::type_token(rid))?;
        if parent.table_id() != Some(TableId::TypeDef) {
            return None;
        }
        self.type_def(parent.row()).map(|enclosing| Arc::downgrade(&enclosing))
    }

    pub(crate) fn type_fields(&self, rid: u32, this: &TypeDefRc) -> FieldList {
        self.populate::<DeclaredFields, _, _>(
            this,
            Relation::Fields,
            Self::type_token(rid),
            Self::field,
            Self::fresh_field,
            None,
        )
    }

    pub(crate) fn type_methods(&self, rid: u32, this: &TypeDefRc) -> MethodDefList {
        self.populate::<DeclaredMethods, _, _>(
            this,
            Relation::Methods,
            Self::type_token(rid),
            Self::method_def,
            Self::fresh_method_def,
            None,
        )
    }

    pub(crate) fn type_properties(&self, rid: u32, this: &TypeDefRc) -> PropertyList {
        self.populate::<DeclaredProperties, _, _>(
            this,
            Relation::Properties,
            Self::type_token(rid),
            Self::property,
            Self::fresh_property,
            None,
        )
    }

    pub(crate) fn type_events(&self, rid: u32, this: &TypeDefRc) -> EventList {
        self.populate::<DeclaredEvents, _, _>(
            this,
            Relation::Events,
            Self::type_token(rid),
            Self::event,
            Self::fresh_event,
            None,
        )
    }

    pub(crate) fn type_nested(&self, rid: u32, this: &TypeDefRc) -> NestedTypeList {
        self.populate::<NestedTypes, _, _>(
            this,
            Relation::NestedTypes,
            Self::type_token(rid),
            move |ctx, nested| {
                if nested == rid {
                    tracing::warn!(rid, "type lists itself as nested type, skipping");
                    return None;
                }
                ctx.type_def(nested)
            },
            Self::fresh_type_def,
            None,
        )
    }

    pub(crate) fn module_types(&self, this: &ModuleRc) -> ModuleTypeList {
        self.populate::<ModuleTypes, _, _>(
            this,
            Relation::TypeDefs,
            MODULE_TOKEN,
            Self::type_def,
            Self::fresh_type_def,
            None,
        )
    }

    pub(crate) fn module_exported_types(&self) -> ExportedTypeList {
        let list = boxcar::Vec::new();
        for rid in self.children(Relation::ExportedTypes, MODULE_TOKEN) {
            if let Some(exported) = self.exported_type(rid) {
                list.push(exported);
            }
        }
        Arc::new(list)
    }

    pub(crate) fn module_resources(&self) -> ManifestResourceList {
        let list = boxcar::Vec::new();
        for rid in self.children(Relation::ManifestResources, MODULE_TOKEN) {
            if let Some(resource) = self.manifest_resource(rid) {
                list.push(resource);
            }
        }
        Arc::new(list)
    }

    /// The type declaring the field, method, property or event `member`
    pub(crate) fn member_declaring_type(
        &self,
        relation: Relation,
        member: Token,
    ) -> Option<Weak<TypeDef>> {
        let parent = self.provider().parent(relation, member)?;
        if parent.table_id() != Some(TableId::TypeDef) {
            return None;
        }
        self.type_def(parent.row()).map(|owner| Arc::downgrade(&owner))
    }

    pub(crate) fn param_owner(&self, param: Token) -> Option<Weak<MethodDef>> {
        let parent = self.provider().parent(Relation::Params, param)?;
        if parent.table_id() != Some(TableId::MethodDef) {
            return None;
        }
        self.method_def(parent.row()).map(|method| Arc::downgrade(&method))
    }

    pub(crate) fn method_params(&self, rid: u32, this: &MethodDefRc) -> ParamList {
        self.populate::<MethodParams, _, _>(
            this,
            Relation::Params,
            Token::from_parts(TableId::MethodDef, rid),
            Self::param,
            Self::fresh_param,
            Some(|param| param.sequence()),
        )
    }

    fn signature_at(&self, index: u32) -> Option<Signature> {
        self.provider().signature(index, self)
    }

    pub(crate) fn field_signature(&self, rid: u32) -> Option<Arc<SignatureField>> {
        let raw = row_of!(self, Field, rid)?;
        match self.signature_at(raw.signature)? {
            Signature::Field(field) => Some(Arc::new(field)),
            _ => None,
        }
    }

    pub(crate) fn method_signature(&self, rid: u32) -> Option<Arc<SignatureMethod>> {
        let raw = row_of!(self, MethodDef, rid)?;
        match self.signature_at(raw.signature)? {
            Signature::Method(method) => Some(Arc::new(method)),
            _ => None,
        }
    }

    pub(crate) fn property_signature(&self, rid: u32) -> Option<Arc<SignatureProperty>> {
        let raw = row_of!(self, Property, rid)?;
        match self.signature_at(raw.signature)? {
            Signature::Property(property) => Some(Arc::new(property)),
            _ => None,
        }
    }

    pub(crate) fn member_ref_signature(&self, rid: u32) -> Option<Arc<Signature>> {
        let raw = row_of!(self, MemberRef, rid)?;
        self.signature_at(raw.signature).map(Arc::new)
    }

    pub(crate) fn type_spec_signature(&self, rid: u32) -> Option<Arc<TypeSignature>> {
        let raw = row_of!(self, TypeSpec, rid)?;
        self.provider()
            .type_signature(raw.signature, self)
            .map(Arc::new)
    }

    pub(crate) fn method_spec_instantiation(&self, rid: u32) -> Option<Arc<SignatureMethodSpec>> {
        let raw = row_of!(self, MethodSpec, rid)?;
        match self.signature_at(raw.instantiation)? {
            Signature::MethodSpec(spec) => Some(Arc::new(spec)),
            _ => None,
        }
    }

    pub(crate) fn method_body(&self, rid: u32, rva: u32) -> Option<Arc<MethodBody>> {
        if rva == 0 {
            return None;
        }
        self.provider()
            .method_body(Token::from_parts(TableId::MethodDef, rid), rva)
            .map(Arc::new)
    }

    /// Every `MethodSemantics` role `rid` is bound with, combined
    pub(crate) fn method_semantics(&self, rid: u32) -> u32 {
        let rows = self.provider().row_count(TableId::MethodSemantics);
        (1..=rows)
            .filter_map(|row| row_of!(self, MethodSemantics, row))
            .filter(|raw| raw.method == rid)
            .fold(0, |roles, raw| roles | raw.semantics)
    }

    /// Overrides implemented by `rid`, read from the `MethodImpl` rows of its declaring type
    pub(crate) fn method_overrides(&self, rid: u32) -> MethodOverrideList {
        let list = boxcar::Vec::new();
        let declaring = self
            .provider()
            .parent(Relation::Methods, Token::from_parts(TableId::MethodDef, rid));

        if let Some(declaring) = declaring {
            for row in self.children(Relation::MethodImpls, declaring) {
                let Some(raw) = row_of!(self, MethodImpl, row) else {
                    continue;
                };
                if raw.method_body.tag != TableId::MethodDef || raw.method_body.row != rid {
                    continue;
                }
                if let (Some(body), Some(declaration)) = (
                    self.method_def_or_ref(raw.method_body),
                    self.method_def_or_ref(raw.method_declaration),
                ) {
                    list.push(MethodOverride { body, declaration });
                }
            }
        }
        Arc::new(list)
    }

    /// The methods bound to `association` with their `MethodSemantics` roles
    fn accessors_of(&self, association: Token) -> Vec<(u32, MethodDefRc)> {
        self.children(Relation::MethodSemantics, association)
            .into_iter()
            .filter_map(|row| row_of!(self, MethodSemantics, row))
            .filter_map(|raw| Some((raw.semantics, self.method_def(raw.method)?)))
            .collect()
    }

    pub(crate) fn property_accessors(&self, rid: u32) -> PropertyAccessors {
        let accessors = PropertyAccessors::default();
        for (role, method) in self.accessors_of(Token::from_parts(TableId::Property, rid)) {
            if role & MethodSemanticsAttributes::GETTER != 0 {
                accessors.getters.push(method);
            } else if role & MethodSemanticsAttributes::SETTER != 0 {
                accessors.setters.push(method);
            } else if role & MethodSemanticsAttributes::OTHER != 0 {
                accessors.others.push(method);
            }
        }
        accessors
    }

    pub(crate) fn event_accessors(&self, rid: u32) -> EventAccessors {
        let mut accessors = EventAccessors::default();
        for (role, method) in self.accessors_of(Token::from_parts(TableId::Event, rid)) {
            if role & MethodSemanticsAttributes::ADD_ON != 0 {
                accessors.add.get_or_insert(method);
            } else if role & MethodSemanticsAttributes::REMOVE_ON != 0 {
                accessors.remove.get_or_insert(method);
            } else if role & MethodSemanticsAttributes::FIRE != 0 {
                accessors.fire.get_or_insert(method);
            } else if role & MethodSemanticsAttributes::OTHER != 0 {
                accessors.others.push(method);
            }
        }
        accessors
    }

    pub(crate) fn event_type(&self, rid: u32) -> Option<TypeDefOrRef> {
        let raw = row_of!(self, Event, rid)?;
        self.type_def_or_ref(raw.event_type)
    }

    pub(crate) fn generic_params_of(
        &self,
        owner: Token,
        this: &TypeOrMethodDef,
    ) -> GenericParamList {
        self.populate::<GenericParams, _, _>(
            this,
            Relation::GenericParams,
            owner,
            Self::generic_param,
            Self::fresh_generic_param,
            Some(|param| param.number()),
        )
    }

    pub(crate) fn generic_param_owner(&self, rid: u32) -> Option<TypeOrMethodDefRef> {
        let raw = row_of!(self, GenericParam, rid)?;
        self.type_or_method_def(raw.owner)
            .map(|owner| owner.downgrade())
    }

    pub(crate) fn generic_param_constraints(&self, rid: u32) -> GenericParamConstraintList {
        let list = boxcar::Vec::new();
        let owner = Token::from_parts(TableId::GenericParam, rid);
        for row in self.children(Relation::GenericParamConstraints, owner) {
            if let Some(raw) = row_of!(self, GenericParamConstraint, row) {
                list.push(raw.to_owned(self));
            }
        }
        Arc::new(list)
    }

    pub(crate) fn type_ref_scope(&self, rid: u32) -> Option<ResolutionScope> {
        let raw = row_of!(self, TypeRef, rid)?;
        self.resolution_scope(raw.resolution_scope)
    }

    pub(crate) fn member_ref_class(&self, rid: u32) -> Option<MemberRefParent> {
        let raw = row_of!(self, MemberRef, rid)?;
        self.member_ref_parent(raw.class)
    }

    pub(crate) fn method_spec_method(&self, rid: u32) -> Option<MethodDefOrRef> {
        let raw = row_of!(self, MethodSpec, rid)?;
        self.method_def_or_ref(raw.method)
    }

    pub(crate) fn exported_type_implementation(&self, rid: u32) -> Option<Implementation> {
        let raw = row_of!(self, ExportedType, rid)?;
        self.implementation(raw.implementation)
    }

    pub(crate) fn resource_implementation(&self, rid: u32) -> Option<Implementation> {
        let raw = row_of!(self, ManifestResource, rid)?;
        self.implementation(raw.implementation)
    }

    pub(crate) fn resource_data(&self, rid: u32, offset: u32) -> Option<Vec<u8>> {
        self.provider()
            .resource_data(Token::from_parts(TableId::ManifestResource, rid), offset)
    }

    pub(crate) fn custom_debug_infos(&self, token: Token) -> CustomDebugInfoList {
        let list = boxcar::Vec::new();
        for info in self.provider().custom_debug_infos(token) {
            list.push(info);
        }
        Arc::new(list)
    }
}
