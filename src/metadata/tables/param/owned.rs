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
        tables::{ConstantRc, CustomAttributeList, MethodDef, MethodDefRc, ParamList, ParamRc, TableId},
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// A parameter row of a method
pub struct Param {
    this: Weak<Param>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    flags: AtomicU32,
    sequence: AtomicU32,
    name: RwLock<Name>,
    declaring_method: LazySlot<Option<Weak<MethodDef>>>,
    constant: LazySlot<Option<ConstantRc>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(Param, Param);

impl Param {
    /// Create a parameter in memory
    #[must_use]
    pub fn new(name: impl Into<Name>, sequence: u32, flags: u32) -> ParamRc {
        Arc::new_cyclic(|this| Param {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            flags: AtomicU32::new(flags),
            sequence: AtomicU32::new(sequence),
            name: RwLock::new(name.into()),
            declaring_method: LazySlot::with_value(None),
            constant: LazySlot::with_value(None),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        flags: u32,
        sequence: u32,
        name: Name,
    ) -> ParamRc {
        Arc::new_cyclic(|this| Param {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            flags: AtomicU32::new(flags),
            sequence: AtomicU32::new(sequence),
            name: RwLock::new(name),
            declaring_method: LazySlot::new(),
            constant: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, Token) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, Token::from_parts(TableId::Param, rid)))
    }

    /// `ParamAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// 0 for the return value, 1-based position otherwise
    pub fn sequence(&self) -> u32 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Move the parameter to another position
    pub fn set_sequence(&self, sequence: u32) {
        self.sequence.store(sequence, Ordering::Release);
    }

    /// The parameter name, empty for unnamed parameters
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the parameter
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Returns `true` if this row describes the return value
    pub fn is_return_value(&self) -> bool {
        self.sequence() == 0
    }

    /// The method listing this parameter
    pub fn declaring_method(&self) -> Option<MethodDefRc> {
        self.declaring_method
            .get_relaxed(|| {
                self.load(|ctx, token| ctx.param_owner(token))
                    .flatten()
            })
            .and_then(|owner| owner.upgrade())
    }

    /// Move this parameter to `method`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the parameter is being dropped.
    pub fn set_declaring_method(&self, method: Option<&MethodDefRc>) -> Result<()> {
        let this = self.this.upgrade().ok_or_else(|| {
            Error::InvalidOperation("the parameter is being dropped".to_string())
        })?;
        reassign::<MethodParams>(&this, method)
    }

    /// The default value, if any
    pub fn constant(&self) -> Option<ConstantRc> {
        self.constant
            .get(&self.sync, || self.load(|ctx, token| ctx.constant(token)).flatten())
    }

    /// Replace the default value
    pub fn set_constant(&self, constant: Option<ConstantRc>) {
        self.constant.set(&self.sync, constant);
    }

    /// Custom attributes applied to this parameter
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, token| ctx.custom_attributes(token))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Force every lazy property
    pub fn initialize(&self) {
        let _ = self.declaring_method();
        let _ = self.constant();
        let _ = self.custom_attributes();
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Param")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("sequence", &self.sequence())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Parameter rows of a method
pub struct MethodParams;

impl OwnershipEdge for MethodParams {
    type Child = Param;
    type Owner = MethodDefRc;
    type WeakOwner = Weak<MethodDef>;

    const CHILD_KIND: &'static str = "parameter";

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
        child.declaring_method()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.declaring_method.set_relaxed(owner.map(Arc::downgrade));
    }

    fn list(owner: &Self::Owner) -> ParamList {
        owner.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::ParamAttributes;

    #[test]
    fn clear_detaches_every_parameter() {
        let method = MethodDef::new("Run", 0, None);
        let ret = Param::new("", 0, 0);
        let value = Param::new("value", 1, ParamAttributes::IN);
        method.params().add(ret.clone()).unwrap();
        method.params().add(value.clone()).unwrap();
        assert!(ret.is_return_value());

        method.params().clear();
        assert!(method.params().is_empty());
        assert!(ret.declaring_method().is_none());
        assert!(value.declaring_method().is_none());
    }
}
