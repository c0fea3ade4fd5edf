use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        ownership::{reassign, OwnedList, OwnershipEdge},
        resolver::SigComparer,
        signatures::{Signature, SignatureField, SignatureMethod},
        streams::Name,
        tables::{
            CustomAttributeList, DeclSecurityList, EventList, EventRc, FieldList, FieldRc,
            GenericParamList, MemberDef, MethodDefList, MethodDefRc, Module, ModuleRc,
            ModuleTypeList, NestedTypeList, PropertyList, PropertyRc, TableId, TypeAttributes,
            TypeDefOrRef, TypeDefRc, TypeOrMethodDef, TypeOrMethodDefRef,
        },
        token::Token,
        typesystem::MAX_RECURSION_DEPTH,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// A type defined in the current module.
///
/// Names and flags are plain mutable properties. Every entity-valued property (base type,
/// declaring type, member lists, ...) is computed from the backing store on first access when
/// the type was materialized, and starts out empty when the type was created in memory.
pub struct TypeDef {
    this: Weak<TypeDef>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    flags: AtomicU32,
    namespace: RwLock<Name>,
    name: RwLock<Name>,
    base_type: LazySlot<Option<TypeDefOrRef>>,
    module: LazySlot<Option<Weak<Module>>>,
    declaring_type: LazySlot<Option<Weak<TypeDef>>>,
    fields: LazySlot<FieldList>,
    methods: LazySlot<MethodDefList>,
    properties: LazySlot<PropertyList>,
    events: LazySlot<EventList>,
    nested_types: LazySlot<NestedTypeList>,
    generic_params: LazySlot<GenericParamList>,
    custom_attributes: LazySlot<CustomAttributeList>,
    decl_securities: LazySlot<DeclSecurityList>,
}

impl_metadata_entity!(TypeDef, TypeDef);

impl TypeDef {
    /// Create a type in memory. It belongs to no module until added to one.
    #[must_use]
    pub fn new(namespace: impl Into<Name>, name: impl Into<Name>, flags: u32) -> TypeDefRc {
        let (namespace, name) = (namespace.into(), name.into());
        Arc::new_cyclic(|this: &Weak<TypeDef>| TypeDef {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            flags: AtomicU32::new(flags),
            namespace: RwLock::new(namespace),
            name: RwLock::new(name),
            base_type: LazySlot::with_value(None),
            module: LazySlot::with_value(None),
            declaring_type: LazySlot::with_value(None),
            fields: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            methods: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            properties: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            events: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            nested_types: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            generic_params: LazySlot::with_value(Arc::new(OwnedList::new(
                TypeOrMethodDefRef::TypeDef(this.clone()),
            ))),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            decl_securities: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        flags: u32,
        namespace: Name,
        name: Name,
    ) -> TypeDefRc {
        Arc::new_cyclic(|this| TypeDef {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            flags: AtomicU32::new(flags),
            namespace: RwLock::new(namespace),
            name: RwLock::new(name),
            base_type: LazySlot::new(),
            module: LazySlot::new(),
            declaring_type: LazySlot::new(),
            fields: LazySlot::new(),
            methods: LazySlot::new(),
            properties: LazySlot::new(),
            events: LazySlot::new(),
            nested_types: LazySlot::new(),
            generic_params: LazySlot::new(),
            custom_attributes: LazySlot::new(),
            decl_securities: LazySlot::new(),
        })
    }

    /// Run `compute` against the loader, if this type was materialized and the loader is alive
    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32, TypeDefRc) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        let this = self.this.upgrade()?;
        Some(compute(&ctx, rid, this))
    }

    /// `TypeAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The namespace, empty for nested types
    pub fn namespace(&self) -> Name {
        self.namespace.read().clone()
    }

    /// Rename the namespace
    pub fn set_namespace(&self, namespace: impl Into<Name>) {
        *self.namespace.write() = namespace.into();
    }

    /// The simple name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the type
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// The full name: enclosing types separated by `/`, each qualified with its namespace
    pub fn full_name(&self) -> String {
        fn qualified(namespace: &Name, name: &Name) -> String {
            if namespace.is_empty() {
                name.to_string_lossy()
            } else {
                format!("{namespace}.{name}")
            }
        }

        let mut parts = vec![qualified(&self.namespace(), &self.name())];
        let mut current = self.declaring_type();
        for _ in 0..MAX_RECURSION_DEPTH {
            let Some(enclosing) = current else { break };
            parts.push(qualified(&enclosing.namespace(), &enclosing.name()));
            current = enclosing.declaring_type();
        }

        parts.reverse();
        parts.join("/")
    }

    /// The base type, `None` for interfaces and `System.Object`
    pub fn base_type(&self) -> Option<TypeDefOrRef> {
        self.base_type.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.type_base(rid)).flatten()
        })
    }

    /// Replace the base type
    pub fn set_base_type(&self, base: Option<TypeDefOrRef>) {
        self.base_type.set(&self.sync, base);
    }

    /// The module listing this type among its top-level types; `None` for nested types
    pub fn owner_module(&self) -> Option<ModuleRc> {
        self.module
            .get_relaxed(|| self.load(|ctx, rid, _| ctx.type_owner_module(rid)).flatten())
            .and_then(|module| module.upgrade())
    }

    /// The module defining this type, found through the outermost enclosing type
    pub fn module(&self) -> Option<ModuleRc> {
        let mut outermost = match self.declaring_type() {
            None => return self.owner_module(),
            Some(enclosing) => enclosing,
        };
        for _ in 0..MAX_RECURSION_DEPTH {
            match outermost.declaring_type() {
                Some(enclosing) => outermost = enclosing,
                None => return outermost.owner_module(),
            }
        }
        None
    }

    /// The enclosing type of a nested type
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type
            .get_relaxed(|| self.load(|ctx, rid, _| ctx.type_enclosing(rid)).flatten())
            .and_then(|enclosing| enclosing.upgrade())
    }

    /// Move this type into the nested types of `enclosing`, or detach it with `None`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the type is a top-level type of a module; remove it
    /// from the module first.
    pub fn set_declaring_type(&self, enclosing: Option<&TypeDefRc>) -> Result<()> {
        let this = self.this.upgrade().ok_or_else(|| {
            Error::InvalidOperation("the type is being dropped".to_string())
        })?;
        reassign::<NestedTypes>(&this, enclosing)
    }

    /// Returns `true` if this type is nested in another type
    pub fn is_nested(&self) -> bool {
        self.declaring_type().is_some()
    }

    /// Returns `true` for interfaces
    pub fn is_interface(&self) -> bool {
        self.flags() & TypeAttributes::CLASS_SEMANTICS_MASK == TypeAttributes::INTERFACE
    }

    /// Returns `true` if this is the `<Module>` type holding global members
    pub fn is_global_module_type(&self) -> bool {
        self.owner_module()
            .and_then(|module| module.global_type())
            .is_some_and(|global| Weak::ptr_eq(&Arc::downgrade(&global), &self.this))
    }

    /// Declared fields
    pub fn fields(&self) -> FieldList {
        self.fields.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.type_fields(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// Declared methods
    pub fn methods(&self) -> MethodDefList {
        self.methods.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.type_methods(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// Declared properties
    pub fn properties(&self) -> PropertyList {
        self.properties.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.type_properties(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// Declared events
    pub fn events(&self) -> EventList {
        self.events.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.type_events(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// Nested types
    pub fn nested_types(&self) -> NestedTypeList {
        self.nested_types.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.type_nested(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// Generic parameters, ordered by number
    pub fn generic_params(&self) -> GenericParamList {
        self.generic_params.get(&self.sync, || {
            self.load(|ctx, rid, this| {
                ctx.generic_params_of(
                    Token::from_parts(TableId::TypeDef, rid),
                    &TypeOrMethodDef::TypeDef(this),
                )
            })
            .unwrap_or_else(|| {
                Arc::new(OwnedList::new(TypeOrMethodDefRef::TypeDef(
                    self.this.clone(),
                )))
            })
        })
    }

    /// Custom attributes applied to this type
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.custom_attributes(Token::from_parts(TableId::TypeDef, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Declarative security attached to this type
    pub fn decl_securities(&self) -> DeclSecurityList {
        self.decl_securities.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.decl_securities(Token::from_parts(TableId::TypeDef, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Returns `true` if any declarative security is attached to this type
    pub fn has_decl_securities(&self) -> bool {
        self.decl_securities().count() > 0
    }

    /// The method named `name`, matching `signature` when given
    pub fn find_method(
        &self,
        name: &str,
        signature: Option<&SignatureMethod>,
    ) -> Option<MethodDefRc> {
        let comparer = SigComparer::default();
        self.methods().iter().find(|method| {
            method.name() == name
                && signature.map_or(true, |expected| {
                    method
                        .signature()
                        .is_some_and(|actual| comparer.equals_method_sig(&actual, expected))
                })
        })
    }

    /// The field named `name`, matching `signature` when given
    pub fn find_field(&self, name: &str, signature: Option<&SignatureField>) -> Option<FieldRc> {
        let comparer = SigComparer::default();
        self.fields().iter().find(|field| {
            field.name() == name
                && signature.map_or(true, |expected| {
                    field
                        .signature()
                        .is_some_and(|actual| comparer.equals_field_sig(&actual, expected))
                })
        })
    }

    /// The method or field named `name` with `signature`, looked up in this type and then in
    /// its base types defined in the same module. Bases that are references are not followed,
    /// use [`crate::metadata::resolver::Resolver::resolve_member`] for those.
    pub fn resolve_member(&self, name: &str, signature: &Signature) -> Option<MemberDef> {
        let lookup = |ty: &TypeDef| match signature {
            Signature::Method(method) => ty.find_method(name, Some(method)).map(MemberDef::Method),
            Signature::Field(field) => ty.find_field(name, Some(field)).map(MemberDef::Field),
            _ => None,
        };

        if let Some(found) = lookup(self) {
            return Some(found);
        }

        let mut base = self.base_type();
        for _ in 0..MAX_RECURSION_DEPTH {
            let current = match base? {
                TypeDefOrRef::TypeDef(def) => def,
                TypeDefOrRef::TypeSpec(spec) => match spec.scope_type()? {
                    TypeDefOrRef::TypeDef(def) => def,
                    _ => return None,
                },
                TypeDefOrRef::TypeRef(_) => return None,
            };
            if let Some(found) = lookup(&*current) {
                return Some(found);
            }
            base = current.base_type();
        }
        None
    }

    /// The property named `name`
    pub fn find_property(&self, name: &str) -> Option<PropertyRc> {
        self.properties().iter().find(|property| property.name() == name)
    }

    /// The event named `name`
    pub fn find_event(&self, name: &str) -> Option<EventRc> {
        self.events().iter().find(|event| event.name() == name)
    }

    /// The nested type named `name`
    pub fn find_nested(&self, name: &str) -> Option<TypeDefRc> {
        self.nested_types().iter().find(|nested| nested.name() == name)
    }

    /// Force every lazy property of this type and its members
    pub fn initialize(&self) {
        let _ = self.base_type();
        let _ = self.declaring_type();
        let _ = self.generic_params();
        let _ = self.custom_attributes();
        let _ = self.decl_securities();
        for field in self.fields().iter() {
            field.initialize();
        }
        for method in self.methods().iter() {
            method.initialize();
        }
        for property in self.properties().iter() {
            property.initialize();
        }
        for event in self.events().iter() {
            event.initialize();
        }
    }
}

impl std::fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDef")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.full_name())
            .field("flags", &format_args!("{:#x}", self.flags()))
            .finish_non_exhaustive()
    }
}

/// Top-level types of a module
pub struct ModuleTypes;

impl OwnershipEdge for ModuleTypes {
    type Child = TypeDef;
    type Owner = ModuleRc;
    type WeakOwner = Weak<Module>;

    const CHILD_KIND: &'static str = "type";

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
        child.owner_module()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.module.set_relaxed(owner.map(Arc::downgrade));
    }

    fn claimed_elsewhere(child: &Self::Child) -> bool {
        child.declaring_type().is_some()
    }

    fn list(owner: &Self::Owner) -> ModuleTypeList {
        owner.types()
    }
}

/// Types nested in a type
pub struct NestedTypes;

impl OwnershipEdge for NestedTypes {
    type Child = TypeDef;
    type Owner = TypeDefRc;
    type WeakOwner = Weak<TypeDef>;

    const CHILD_KIND: &'static str = "nested type";

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
        child.declaring_type()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.declaring_type.set_relaxed(owner.map(Arc::downgrade));
    }

    fn claimed_elsewhere(child: &Self::Child) -> bool {
        child.owner_module().is_some()
    }

    fn list(owner: &Self::Owner) -> NestedTypeList {
        owner.nested_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        entity::MetadataEntity,
        signatures::{SignatureMethod, TypeSignature},
        tables::{Field, MethodDef},
    };

    #[test]
    fn in_memory_type_starts_empty() {
        let ty = TypeDef::new("Demo", "Widget", TypeAttributes::PUBLIC);
        assert_eq!(ty.full_name(), "Demo.Widget");
        assert_eq!(ty.rid(), 0);
        assert!(ty.methods().is_empty());
        assert!(ty.fields().is_empty());
        assert!(ty.base_type().is_none());
        assert!(ty.module().is_none());
        assert!(!ty.origin().is_materialized());
    }

    #[test]
    fn nesting_keeps_both_sides_consistent() {
        let outer = TypeDef::new("Demo", "Outer", 0);
        let other = TypeDef::new("Demo", "Other", 0);
        let inner = TypeDef::new("", "Inner", TypeAttributes::NESTED_PUBLIC);

        inner.set_declaring_type(Some(&outer)).unwrap();
        assert!(outer.nested_types().contains(&inner));
        assert_eq!(inner.full_name(), "Demo.Outer/Inner");

        inner.set_declaring_type(Some(&other)).unwrap();
        assert!(!outer.nested_types().contains(&inner));
        assert!(other.nested_types().contains(&inner));
        assert!(Arc::ptr_eq(&inner.declaring_type().unwrap(), &other));

        inner.set_declaring_type(None).unwrap();
        assert!(other.nested_types().is_empty());
        assert!(!inner.is_nested());
    }

    #[test]
    fn member_lookup() {
        let ty = TypeDef::new("Demo", "Widget", 0);
        let run = MethodDef::new("Run", 0, None);
        let count = Field::new("count", 0, None);
        ty.methods().add(run.clone()).unwrap();
        ty.fields().add(count.clone()).unwrap();

        assert!(Arc::ptr_eq(&ty.find_method("Run", None).unwrap(), &run));
        assert!(ty.find_method("Stop", None).is_none());
        assert!(Arc::ptr_eq(&ty.find_field("count", None).unwrap(), &count));
        assert!(Arc::ptr_eq(&run.declaring_type().unwrap(), &ty));
    }

    #[test]
    fn resolve_member_walks_local_bases() {
        let base = TypeDef::new("Demo", "Base", 0);
        let derived = TypeDef::new("Demo", "Derived", 0);
        derived.set_base_type(Some(TypeDefOrRef::TypeDef(base.clone())));

        let signature = SignatureMethod {
            has_this: true,
            params: vec![TypeSignature::I4],
            ..SignatureMethod::default()
        };
        let spin = MethodDef::new("Spin", 0, Some(signature.clone()));
        base.methods().add(spin.clone()).unwrap();

        let found = derived.resolve_member("Spin", &Signature::Method(signature));
        assert!(matches!(found, Some(MemberDef::Method(method)) if Arc::ptr_eq(&method, &spin)));

        let other = Signature::Method(SignatureMethod::default());
        assert!(derived.resolve_member("Spin", &other).is_none());
    }

    #[test]
    fn flags_and_names_are_mutable() {
        let ty = TypeDef::new("Demo", "Widget", 0);
        ty.set_flags(TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT);
        ty.set_name("IWidget");
        ty.set_namespace("Demo.Api");
        assert!(ty.is_interface());
        assert_eq!(ty.full_name(), "Demo.Api.IWidget");
    }
}
