use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        customdebuginformation::CustomDebugInfoList,
        entity::Origin,
        loader::LoaderContext,
        ownership::{reassign, OwnedList, OwnershipEdge},
        provider::Relation,
        signatures::SignatureMethod,
        streams::Name,
        tables::{
            CustomAttributeList, DeclSecurityList, GenericParamList, ImplMapRc,
            MethodAccessFlags, MethodBody, MethodDefList, MethodDefRc, MethodModifiers,
            MethodOverrideList, MethodSemanticsAttributes, ParamList, ParamRc, TableId, TypeDef, TypeDefRc,
            TypeOrMethodDef, TypeOrMethodDefRef,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// A method declared by a type
pub struct MethodDef {
    this: Weak<MethodDef>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    rva: AtomicU32,
    impl_flags: AtomicU32,
    flags: AtomicU32,
    name: RwLock<Name>,
    signature: LazySlot<Option<Arc<SignatureMethod>>>,
    declaring_type: LazySlot<Option<Weak<TypeDef>>>,
    body: LazySlot<Option<Arc<MethodBody>>>,
    impl_map: LazySlot<Option<ImplMapRc>>,
    semantics: LazySlot<u32>,
    params: LazySlot<ParamList>,
    generic_params: LazySlot<GenericParamList>,
    overrides: LazySlot<MethodOverrideList>,
    custom_attributes: LazySlot<CustomAttributeList>,
    decl_securities: LazySlot<DeclSecurityList>,
    custom_debug_infos: LazySlot<CustomDebugInfoList>,
}

impl_metadata_entity!(MethodDef, MethodDef);

impl MethodDef {
    /// Create a method in memory, without body or parameters
    #[must_use]
    pub fn new(
        name: impl Into<Name>,
        flags: u32,
        signature: Option<SignatureMethod>,
    ) -> MethodDefRc {
        Arc::new_cyclic(|this: &Weak<MethodDef>| MethodDef {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            rva: AtomicU32::new(0),
            impl_flags: AtomicU32::new(0),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            signature: LazySlot::with_value(signature.map(Arc::new)),
            declaring_type: LazySlot::with_value(None),
            body: LazySlot::with_value(None),
            impl_map: LazySlot::with_value(None),
            semantics: LazySlot::with_value(0),
            params: LazySlot::with_value(Arc::new(OwnedList::new(this.clone()))),
            generic_params: LazySlot::with_value(Arc::new(OwnedList::new(
                TypeOrMethodDefRef::MethodDef(this.clone()),
            ))),
            overrides: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            decl_securities: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            custom_debug_infos: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        rva: u32,
        impl_flags: u32,
        flags: u32,
        name: Name,
    ) -> MethodDefRc {
        Arc::new_cyclic(|this| MethodDef {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            rva: AtomicU32::new(rva),
            impl_flags: AtomicU32::new(impl_flags),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            signature: LazySlot::new(),
            declaring_type: LazySlot::new(),
            body: LazySlot::new(),
            impl_map: LazySlot::new(),
            semantics: LazySlot::new(),
            params: LazySlot::new(),
            generic_params: LazySlot::new(),
            overrides: LazySlot::new(),
            custom_attributes: LazySlot::new(),
            decl_securities: LazySlot::new(),
            custom_debug_infos: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32, MethodDefRc) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        let this = self.this.upgrade()?;
        Some(compute(&ctx, rid, this))
    }

    fn original_token(rid: u32) -> Token {
        Token::from_parts(TableId::MethodDef, rid)
    }

    /// `MethodAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// `MethodImplAttributes` bitmask
    pub fn impl_flags(&self) -> u32 {
        self.impl_flags.load(Ordering::Acquire)
    }

    /// Replace the implementation flags
    pub fn set_impl_flags(&self, impl_flags: u32) {
        self.impl_flags.store(impl_flags, Ordering::Release);
    }

    /// RVA of the body in the original image, 0 if there is none
    pub fn rva(&self) -> u32 {
        self.rva.load(Ordering::Acquire)
    }

    /// The method name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the method
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Access flags
    pub fn access(&self) -> MethodAccessFlags {
        MethodAccessFlags::from_method_flags(self.flags())
    }

    /// Modifier flags
    pub fn modifiers(&self) -> MethodModifiers {
        MethodModifiers::from_method_flags(self.flags())
    }

    /// Returns `true` for static methods
    pub fn is_static(&self) -> bool {
        self.modifiers().contains(MethodModifiers::STATIC)
    }

    /// Returns `true` for virtual methods
    pub fn is_virtual(&self) -> bool {
        self.modifiers().contains(MethodModifiers::VIRTUAL)
    }

    /// Returns `true` for `.ctor` and `.cctor`
    pub fn is_constructor(&self) -> bool {
        let name = self.name();
        self.modifiers().contains(MethodModifiers::RTSPECIAL_NAME)
            && (name == ".ctor" || name == ".cctor")
    }

    /// The method signature, `None` if the blob could not be decoded as one
    pub fn signature(&self) -> Option<Arc<SignatureMethod>> {
        self.signature.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.method_signature(rid)).flatten()
        })
    }

    /// Replace the signature
    pub fn set_signature(&self, signature: Option<SignatureMethod>) {
        self.signature.set(&self.sync, signature.map(Arc::new));
    }

    /// The declaring type
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type
            .get_relaxed(|| {
                self.load(|ctx, rid, _| {
                    ctx.member_declaring_type(Relation::Methods, Self::original_token(rid))
                })
                .flatten()
            })
            .and_then(|owner| owner.upgrade())
    }

    /// Move this method to `owner`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the method is being dropped.
    pub fn set_declaring_type(&self, owner: Option<&TypeDefRc>) -> Result<()> {
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| Error::InvalidOperation("the method is being dropped".to_string()))?;
        reassign::<DeclaredMethods>(&this, owner)
    }

    /// The body, `None` for abstract, runtime-implemented and P/Invoke methods
    pub fn body(&self) -> Option<Arc<MethodBody>> {
        self.body.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.method_body(rid, self.rva()))
                .flatten()
        })
    }

    /// Replace the body
    pub fn set_body(&self, body: Option<MethodBody>) {
        self.body.set(&self.sync, body.map(Arc::new));
    }

    /// Drop the cached body. Materialized methods decode it again on next access, in-memory
    /// methods lose it.
    pub fn free_body(&self) {
        self.body.reset(&self.sync);
    }

    /// Returns `true` once the body has been decoded or assigned
    pub fn is_body_loaded(&self) -> bool {
        self.body.is_initialized()
    }

    /// The P/Invoke mapping
    pub fn impl_map(&self) -> Option<ImplMapRc> {
        self.impl_map.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.impl_map(Self::original_token(rid)))
                .flatten()
        })
    }

    /// Replace the P/Invoke mapping
    pub fn set_impl_map(&self, impl_map: Option<ImplMapRc>) {
        self.impl_map.set(&self.sync, impl_map);
    }

    /// `MethodSemanticsAttributes` of every property or event accessor role this method plays
    pub fn semantics(&self) -> u32 {
        self.semantics.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.method_semantics(rid))
                .unwrap_or(0)
        })
    }

    /// Replace the semantics attributes
    pub fn set_semantics(&self, semantics: u32) {
        self.semantics.set(&self.sync, semantics);
    }

    /// Returns `true` for property getters
    pub fn is_getter(&self) -> bool {
        self.semantics() & MethodSemanticsAttributes::GETTER != 0
    }

    /// Returns `true` for property setters
    pub fn is_setter(&self) -> bool {
        self.semantics() & MethodSemanticsAttributes::SETTER != 0
    }

    /// Parameter rows, ordered by sequence. The return value, if it has a row, is sequence 0.
    pub fn params(&self) -> ParamList {
        self.params.get(&self.sync, || {
            self.load(|ctx, rid, this| ctx.method_params(rid, &this))
                .unwrap_or_else(|| Arc::new(OwnedList::new(self.this.clone())))
        })
    }

    /// The parameter row with sequence number `sequence`
    pub fn param(&self, sequence: u32) -> Option<ParamRc> {
        self.params().iter().find(|param| param.sequence() == sequence)
    }

    /// Generic parameters, ordered by number
    pub fn generic_params(&self) -> GenericParamList {
        self.generic_params.get(&self.sync, || {
            self.load(|ctx, rid, this| {
                ctx.generic_params_of(Self::original_token(rid), &TypeOrMethodDef::MethodDef(this))
            })
            .unwrap_or_else(|| {
                Arc::new(OwnedList::new(TypeOrMethodDefRef::MethodDef(
                    self.this.clone(),
                )))
            })
        })
    }

    /// Explicit overrides, from the `MethodImpl` rows of the declaring type naming this method as
    /// body
    pub fn overrides(&self) -> MethodOverrideList {
        self.overrides.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.method_overrides(rid))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Custom attributes applied to this method
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.custom_attributes(Self::original_token(rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Declarative security attached to this method
    pub fn decl_securities(&self) -> DeclSecurityList {
        self.decl_securities.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.decl_securities(Self::original_token(rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Returns `true` if any declarative security is attached to this method
    pub fn has_decl_securities(&self) -> bool {
        self.decl_securities().count() > 0
    }

    /// Custom debug information supplied by the symbol store
    pub fn custom_debug_infos(&self) -> CustomDebugInfoList {
        self.custom_debug_infos.get(&self.sync, || {
            self.load(|ctx, rid, _| ctx.custom_debug_infos(Self::original_token(rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// `Type::Name`
    pub fn full_name(&self) -> String {
        match self.declaring_type() {
            Some(owner) => format!("{}::{}", owner.full_name(), self.name()),
            None => self.name().to_string_lossy(),
        }
    }

    /// Force every lazy property, parameters included
    pub fn initialize(&self) {
        let _ = self.signature();
        let _ = self.declaring_type();
        let _ = self.body();
        let _ = self.impl_map();
        let _ = self.semantics();
        let _ = self.generic_params();
        let _ = self.overrides();
        let _ = self.custom_attributes();
        let _ = self.decl_securities();
        let _ = self.custom_debug_infos();
        for param in self.params().iter() {
            param.initialize();
        }
    }
}

impl std::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDef")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .field("flags", &format_args!("{:#x}", self.flags()))
            .finish_non_exhaustive()
    }
}

/// Methods declared by a type
pub struct DeclaredMethods;

impl OwnershipEdge for DeclaredMethods {
    type Child = MethodDef;
    type Owner = TypeDefRc;
    type WeakOwner = Weak<TypeDef>;

    const CHILD_KIND: &'static str = "method";

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

    fn list(owner: &Self::Owner) -> MethodDefList {
        owner.methods()
    }
}
