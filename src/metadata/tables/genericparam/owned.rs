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
        streams::Name,
        tables::{
            CustomAttributeList, GenericParamAttributes, GenericParamConstraintList,
            GenericParamList, GenericParamRc, TableId, TypeOrMethodDef, TypeOrMethodDefRef,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// A generic parameter of a type or method
pub struct GenericParam {
    this: Weak<GenericParam>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    number: AtomicU32,
    flags: AtomicU32,
    name: RwLock<Name>,
    owner: LazySlot<Option<TypeOrMethodDefRef>>,
    constraints: LazySlot<GenericParamConstraintList>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(GenericParam, GenericParam);

impl GenericParam {
    /// Create a generic parameter in memory
    #[must_use]
    pub fn new(name: impl Into<Name>, number: u32, flags: u32) -> GenericParamRc {
        Arc::new_cyclic(|this| GenericParam {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            number: AtomicU32::new(number),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            owner: LazySlot::with_value(None),
            constraints: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        number: u32,
        flags: u32,
        name: Name,
    ) -> GenericParamRc {
        Arc::new_cyclic(|this| GenericParam {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            number: AtomicU32::new(number),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            owner: LazySlot::new(),
            constraints: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// 0-based position in the owner's parameter list
    pub fn number(&self) -> u32 {
        self.number.load(Ordering::Acquire)
    }

    /// Move the parameter to another position
    pub fn set_number(&self, number: u32) {
        self.number.store(number, Ordering::Release);
    }

    /// `GenericParamAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The parameter name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the parameter
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Returns `true` for `out T`
    pub fn is_covariant(&self) -> bool {
        self.flags() & GenericParamAttributes::VARIANCE_MASK == GenericParamAttributes::COVARIANT
    }

    /// Returns `true` for `in T`
    pub fn is_contravariant(&self) -> bool {
        self.flags() & GenericParamAttributes::VARIANCE_MASK
            == GenericParamAttributes::CONTRAVARIANT
    }

    /// The type or method declaring this parameter
    pub fn owner(&self) -> Option<TypeOrMethodDef> {
        self.owner
            .get_relaxed(|| self.load(|ctx, rid| ctx.generic_param_owner(rid)).flatten())
            .and_then(|owner| owner.upgrade())
    }

    /// Move this parameter to `owner`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the parameter is being dropped.
    pub fn set_owner(&self, owner: Option<&TypeOrMethodDef>) -> Result<()> {
        let this = self.this.upgrade().ok_or_else(|| {
            Error::InvalidOperation("the generic parameter is being dropped".to_string())
        })?;
        reassign::<GenericParams>(&this, owner)
    }

    /// Constraints on the parameter
    pub fn constraints(&self) -> GenericParamConstraintList {
        self.constraints.get(&self.sync, || {
            self.load(|ctx, rid| ctx.generic_param_constraints(rid))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Custom attributes applied to this parameter
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| {
                ctx.custom_attributes(Token::from_parts(TableId::GenericParam, rid))
            })
            .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for GenericParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericParam")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("number", &self.number())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Generic parameters of a type or method
pub struct GenericParams;

impl OwnershipEdge for GenericParams {
    type Child = GenericParam;
    type Owner = TypeOrMethodDef;
    type WeakOwner = TypeOrMethodDefRef;

    const CHILD_KIND: &'static str = "generic parameter";

    fn downgrade(owner: &Self::Owner) -> Self::WeakOwner {
        owner.downgrade()
    }

    fn upgrade(owner: &Self::WeakOwner) -> Option<Self::Owner> {
        owner.upgrade()
    }

    fn same_owner(a: &Self::Owner, b: &Self::Owner) -> bool {
        a == b
    }

    fn owner_of(child: &Self::Child) -> Option<Self::Owner> {
        child.owner()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.owner.set_relaxed(owner.map(TypeOrMethodDef::downgrade));
    }

    fn list(owner: &Self::Owner) -> GenericParamList {
        match owner {
            TypeOrMethodDef::TypeDef(def) => def.generic_params(),
            TypeOrMethodDef::MethodDef(method) => method.generic_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{GenericParamConstraint, MethodDef, TypeDef, TypeDefOrRef};

    #[test]
    fn moves_between_type_and_method() {
        let list = TypeDef::new("System.Collections.Generic", "List`1", 0);
        let select = MethodDef::new("Select", 0, None);
        let t = GenericParam::new("T", 0, GenericParamAttributes::COVARIANT);

        list.generic_params().add(t.clone()).unwrap();
        assert!(matches!(t.owner(), Some(TypeOrMethodDef::TypeDef(_))));
        assert!(t.is_covariant());

        t.set_owner(Some(&TypeOrMethodDef::MethodDef(select.clone())))
            .unwrap();
        assert!(list.generic_params().is_empty());
        assert!(select.generic_params().contains(&t));
        assert_eq!(t.owner(), Some(TypeOrMethodDef::MethodDef(select)));
    }

    #[test]
    fn constraints_are_appendable() {
        let t = GenericParam::new("T", 0, 0);
        let disposable = TypeDef::new("System", "IDisposable", 0x20);
        t.constraints()
            .push(GenericParamConstraint::new(TypeDefOrRef::TypeDef(disposable)));
        assert_eq!(t.constraints().count(), 1);
    }
}
