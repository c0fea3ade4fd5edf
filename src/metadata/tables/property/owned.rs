use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        ownership::{reassign, OwnershipEdge},
        provider::Relation,
        signatures::SignatureProperty,
        streams::Name,
        tables::{
            AccessorList, ConstantRc, CustomAttributeList, PropertyList, PropertyRc, TableId,
            TypeDef, TypeDefRc,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// The accessor methods of a property, by role
#[derive(Clone, Debug, Default)]
pub struct PropertyAccessors {
    /// `get_` methods
    pub getters: AccessorList,
    /// `set_` methods
    pub setters: AccessorList,
    /// Methods bound with the `Other` role
    pub others: AccessorList,
}

/// A property declared by a type
pub struct Property {
    this: Weak<Property>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    flags: AtomicU32,
    name: RwLock<Name>,
    signature: LazySlot<Option<Arc<SignatureProperty>>>,
    declaring_type: LazySlot<Option<Weak<TypeDef>>>,
    accessors: LazySlot<PropertyAccessors>,
    constant: LazySlot<Option<ConstantRc>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(Property, Property);

impl Property {
    /// Create a property in memory, without accessors
    #[must_use]
    pub fn new(name: impl Into<Name>, flags: u32, signature: Option<SignatureProperty>) -> PropertyRc {
        Arc::new_cyclic(|this| Property {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            signature: LazySlot::with_value(signature.map(Arc::new)),
            declaring_type: LazySlot::with_value(None),
            accessors: LazySlot::with_value(PropertyAccessors::default()),
            constant: LazySlot::with_value(None),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32, flags: u32, name: Name) -> PropertyRc {
        Arc::new_cyclic(|this| Property {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            signature: LazySlot::new(),
            declaring_type: LazySlot::new(),
            accessors: LazySlot::new(),
            constant: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// `PropertyAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The property name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the property
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// The property signature
    pub fn signature(&self) -> Option<Arc<SignatureProperty>> {
        self.signature.get(&self.sync, || {
            self.load(|ctx, rid| ctx.property_signature(rid)).flatten()
        })
    }

    /// Replace the signature. The cached default value is dropped and recomputed on next access.
    pub fn set_signature(&self, signature: Option<SignatureProperty>) {
        self.signature.set(&self.sync, signature.map(Arc::new));
        self.constant.reset(&self.sync);
    }

    /// The declaring type
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type
            .get_relaxed(|| {
                self.load(|ctx, rid| {
                    ctx.member_declaring_type(
                        Relation::Properties,
                        Token::from_parts(TableId::Property, rid),
                    )
                })
                .flatten()
            })
            .and_then(|owner| owner.upgrade())
    }

    /// Move this property to `owner`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the property is being dropped.
    pub fn set_declaring_type(&self, owner: Option<&TypeDefRc>) -> Result<()> {
        let this = self.this.upgrade().ok_or_else(|| {
            Error::InvalidOperation("the property is being dropped".to_string())
        })?;
        reassign::<DeclaredProperties>(&this, owner)
    }

    /// All accessors, loaded together
    pub fn accessors(&self) -> PropertyAccessors {
        self.accessors.get(&self.sync, || {
            self.load(|ctx, rid| ctx.property_accessors(rid))
                .unwrap_or_default()
        })
    }

    /// Getter methods
    pub fn getters(&self) -> AccessorList {
        self.accessors().getters
    }

    /// Setter methods
    pub fn setters(&self) -> AccessorList {
        self.accessors().setters
    }

    /// Methods with the `Other` role
    pub fn others(&self) -> AccessorList {
        self.accessors().others
    }

    /// The default value, if any
    pub fn constant(&self) -> Option<ConstantRc> {
        self.constant.get(&self.sync, || {
            self.load(|ctx, rid| ctx.constant(Token::from_parts(TableId::Property, rid)))
                .flatten()
        })
    }

    /// Replace the default value
    pub fn set_constant(&self, constant: Option<ConstantRc>) {
        self.constant.set(&self.sync, constant);
    }

    /// Custom attributes applied to this property
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::Property, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Force every lazy property
    pub fn initialize(&self) {
        let _ = self.signature();
        let _ = self.declaring_type();
        let _ = self.accessors();
        let _ = self.constant();
        let _ = self.custom_attributes();
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Properties declared by a type
pub struct DeclaredProperties;

impl OwnershipEdge for DeclaredProperties {
    type Child = Property;
    type Owner = TypeDefRc;
    type WeakOwner = Weak<TypeDef>;

    const CHILD_KIND: &'static str = "property";

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

    fn list(owner: &Self::Owner) -> PropertyList {
        owner.properties()
    }
}
