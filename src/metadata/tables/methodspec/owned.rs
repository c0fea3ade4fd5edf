use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        signatures::SignatureMethodSpec,
        tables::{CustomAttributeList, MethodDefOrRef, MethodSpecRc, TableId},
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// A generic method together with its type arguments
pub struct MethodSpec {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    method: LazySlot<Option<MethodDefOrRef>>,
    instantiation: LazySlot<Option<Arc<SignatureMethodSpec>>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(MethodSpec, MethodSpec);

impl MethodSpec {
    /// Create a method instantiation in memory
    #[must_use]
    pub fn new(method: MethodDefOrRef, instantiation: SignatureMethodSpec) -> MethodSpecRc {
        Arc::new(MethodSpec {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            method: LazySlot::with_value(Some(method)),
            instantiation: LazySlot::with_value(Some(Arc::new(instantiation))),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32) -> MethodSpecRc {
        Arc::new(MethodSpec {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            method: LazySlot::new(),
            instantiation: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// The generic method being instantiated
    pub fn method(&self) -> Option<MethodDefOrRef> {
        self.method
            .get(&self.sync, || self.load(|ctx, rid| ctx.method_spec_method(rid)).flatten())
    }

    /// Replace the generic method
    pub fn set_method(&self, method: Option<MethodDefOrRef>) {
        self.method.set(&self.sync, method);
    }

    /// The generic arguments
    pub fn instantiation(&self) -> Option<Arc<SignatureMethodSpec>> {
        self.instantiation.get(&self.sync, || {
            self.load(|ctx, rid| ctx.method_spec_instantiation(rid))
                .flatten()
        })
    }

    /// Replace the generic arguments
    pub fn set_instantiation(&self, instantiation: Option<SignatureMethodSpec>) {
        self.instantiation.set(&self.sync, instantiation.map(Arc::new));
    }

    /// Custom attributes applied to this instantiation
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::MethodSpec, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSpec")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("method", &self.method().map(|method| method.name()))
            .finish_non_exhaustive()
    }
}
