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
        signatures::SignatureField,
        streams::Name,
        tables::{
            ConstantRc, CustomAttributeList, FieldAttributes, FieldList, FieldRc, TableId, TypeDef,
            TypeDefRc,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// A field declared by a type
pub struct Field {
    this: Weak<Field>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    flags: AtomicU32,
    name: RwLock<Name>,
    signature: LazySlot<Option<Arc<SignatureField>>>,
    declaring_type: LazySlot<Option<Weak<TypeDef>>>,
    constant: LazySlot<Option<ConstantRc>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(Field, Field);

impl Field {
    /// Create a field in memory
    #[must_use]
    pub fn new(name: impl Into<Name>, flags: u32, signature: Option<SignatureField>) -> FieldRc {
        Arc::new_cyclic(|this| Field {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            signature: LazySlot::with_value(signature.map(Arc::new)),
            declaring_type: LazySlot::with_value(None),
            constant: LazySlot::with_value(None),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32, flags: u32, name: Name) -> FieldRc {
        Arc::new_cyclic(|this| Field {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            signature: LazySlot::new(),
            declaring_type: LazySlot::new(),
            constant: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// `FieldAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The field name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the field
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Returns `true` for static fields
    pub fn is_static(&self) -> bool {
        self.flags() & FieldAttributes::STATIC != 0
    }

    /// The field signature, `None` if the blob could not be decoded as one
    pub fn signature(&self) -> Option<Arc<SignatureField>> {
        self.signature.get(&self.sync, || {
            self.load(|ctx, rid| ctx.field_signature(rid)).flatten()
        })
    }

    /// Replace the signature. The cached default value is dropped and recomputed on next access.
    pub fn set_signature(&self, signature: Option<SignatureField>) {
        self.signature.set(&self.sync, signature.map(Arc::new));
        self.constant.reset(&self.sync);
    }

    /// The declaring type
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type
            .get_relaxed(|| {
                self.load(|ctx, rid| {
                    ctx.member_declaring_type(Relation::Fields, Token::from_parts(TableId::Field, rid))
                })
                .flatten()
            })
            .and_then(|owner| owner.upgrade())
    }

    /// Move this field to `owner`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the field is being dropped.
    pub fn set_declaring_type(&self, owner: Option<&TypeDefRc>) -> Result<()> {
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| Error::InvalidOperation("the field is being dropped".to_string()))?;
        reassign::<DeclaredFields>(&this, owner)
    }

    /// The default value, if any
    pub fn constant(&self) -> Option<ConstantRc> {
        self.constant.get(&self.sync, || {
            self.load(|ctx, rid| ctx.constant(Token::from_parts(TableId::Field, rid)))
                .flatten()
        })
    }

    /// Replace the default value
    pub fn set_constant(&self, constant: Option<ConstantRc>) {
        self.constant.set(&self.sync, constant);
    }

    /// Custom attributes applied to this field
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::Field, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// `Type::name`
    pub fn full_name(&self) -> String {
        match self.declaring_type() {
            Some(owner) => format!("{}::{}", owner.full_name(), self.name()),
            None => self.name().to_string_lossy(),
        }
    }

    /// Force every lazy property
    pub fn initialize(&self) {
        let _ = self.signature();
        let _ = self.declaring_type();
        let _ = self.constant();
        let _ = self.custom_attributes();
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .field("flags", &format_args!("{:#x}", self.flags()))
            .finish_non_exhaustive()
    }
}

/// Fields declared by a type
pub struct DeclaredFields;

impl OwnershipEdge for DeclaredFields {
    type Child = Field;
    type Owner = TypeDefRc;
    type WeakOwner = Weak<TypeDef>;

    const CHILD_KIND: &'static str = "field";

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

    fn list(owner: &Self::Owner) -> FieldList {
        owner.fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{signatures::TypeSignature, tables::Constant};

    #[test]
    fn reparenting_moves_between_lists() {
        let first = TypeDef::new("Demo", "First", 0);
        let second = TypeDef::new("Demo", "Second", 0);
        let field = Field::new("value", FieldAttributes::PRIVATE, None);

        field.set_declaring_type(Some(&first)).unwrap();
        assert!(first.fields().contains(&field));
        assert_eq!(field.full_name(), "Demo.First::value");

        field.set_declaring_type(Some(&second)).unwrap();
        assert!(first.fields().is_empty());
        assert!(second.fields().contains(&field));

        assert!(second.fields().remove(&field));
        assert!(field.declaring_type().is_none());
    }

    #[test]
    fn adding_owned_field_elsewhere_fails() {
        let first = TypeDef::new("Demo", "First", 0);
        let second = TypeDef::new("Demo", "Second", 0);
        let field = Field::new("value", 0, None);

        first.fields().add(field.clone()).unwrap();
        assert!(matches!(
            second.fields().add(field.clone()),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn new_signature_drops_constant() {
        let field = Field::new(
            "limit",
            FieldAttributes::LITERAL | FieldAttributes::STATIC,
            Some(SignatureField {
                base: TypeSignature::I4,
            }),
        );
        field.set_constant(Some(Constant::new(0x08, vec![1, 0, 0, 0])));
        assert!(field.constant().is_some());
        assert!(field.is_static());

        field.set_signature(Some(SignatureField {
            base: TypeSignature::I8,
        }));
        // In-memory fields have nothing to recompute from
        assert!(field.constant().is_none());
        assert_eq!(field.signature().unwrap().base, TypeSignature::I8);
    }
}
