use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        signatures::{Signature, SignatureField, SignatureMethod},
        streams::Name,
        tables::{CustomAttributeList, MemberRefParent, MemberRefRc, Module, ModuleRc, TableId},
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// A reference to a field or method
pub struct MemberRef {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    module: Weak<Module>,
    name: RwLock<Name>,
    class: LazySlot<Option<MemberRefParent>>,
    signature: LazySlot<Option<Arc<Signature>>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(MemberRef, MemberRef);

impl MemberRef {
    /// Create a member reference in memory, used by `module`
    #[must_use]
    pub fn new(
        module: &ModuleRc,
        name: impl Into<Name>,
        class: Option<MemberRefParent>,
        signature: Option<Signature>,
    ) -> MemberRefRc {
        Arc::new(MemberRef {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            module: Arc::downgrade(module),
            name: RwLock::new(name.into()),
            class: LazySlot::with_value(class),
            signature: LazySlot::with_value(signature.map(Arc::new)),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32, name: Name) -> MemberRefRc {
        Arc::new(MemberRef {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            module: ctx.module_weak(),
            name: RwLock::new(name),
            class: LazySlot::new(),
            signature: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// The module this reference appears in
    pub fn module(&self) -> Option<ModuleRc> {
        self.module.upgrade()
    }

    /// The member name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the referenced member
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// The parent the member is looked up in
    pub fn class(&self) -> Option<MemberRefParent> {
        self.class
            .get(&self.sync, || self.load(|ctx, rid| ctx.member_ref_class(rid)).flatten())
    }

    /// Replace the parent
    pub fn set_class(&self, class: Option<MemberRefParent>) {
        self.class.set(&self.sync, class);
    }

    /// The member signature
    pub fn signature(&self) -> Option<Arc<Signature>> {
        self.signature.get(&self.sync, || {
            self.load(|ctx, rid| ctx.member_ref_signature(rid)).flatten()
        })
    }

    /// Replace the signature
    pub fn set_signature(&self, signature: Option<Signature>) {
        self.signature.set(&self.sync, signature.map(Arc::new));
    }

    /// The method signature, if this references a method
    pub fn method_sig(&self) -> Option<SignatureMethod> {
        self.signature()
            .and_then(|signature| signature.as_method().cloned())
    }

    /// The field signature, if this references a field
    pub fn field_sig(&self) -> Option<SignatureField> {
        self.signature()
            .and_then(|signature| signature.as_field().cloned())
    }

    /// Returns `true` if this references a method
    pub fn is_method_ref(&self) -> bool {
        self.signature()
            .is_some_and(|signature| signature.as_method().is_some())
    }

    /// Returns `true` if this references a field
    pub fn is_field_ref(&self) -> bool {
        self.signature()
            .is_some_and(|signature| signature.as_field().is_some())
    }

    /// `Parent::Name`
    pub fn full_name(&self) -> String {
        let parent = match self.class() {
            Some(MemberRefParent::TypeDef(def)) => def.full_name(),
            Some(MemberRefParent::TypeRef(reference)) => reference.full_name(),
            Some(MemberRefParent::TypeSpec(spec)) => spec.full_name(),
            Some(MemberRefParent::ModuleRef(module_ref)) => module_ref.name.to_string_lossy(),
            Some(MemberRefParent::MethodDef(method)) => method
                .declaring_type()
                .map(|owner| owner.full_name())
                .unwrap_or_default(),
            None => String::new(),
        };

        if parent.is_empty() {
            self.name().to_string_lossy()
        } else {
            format!("{parent}::{}", self.name())
        }
    }

    /// Custom attributes applied to this reference
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::MemberRef, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberRef")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        signatures::TypeSignature,
        tables::{AssemblyRef, ResolutionScope, TypeRef},
        identity::{AssemblyIdentity, AssemblyVersion},
    };

    #[test]
    fn method_reference_shape() {
        let module = Module::new("Demo.dll");
        let corlib = AssemblyRef::new(
            &AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0), None, None),
            0,
        );
        let console = TypeRef::new(
            &module,
            "System",
            "Console",
            Some(ResolutionScope::AssemblyRef(corlib)),
        );
        let write_line = MemberRef::new(
            &module,
            "WriteLine",
            Some(MemberRefParent::TypeRef(console)),
            Some(Signature::Method(SignatureMethod {
                return_type: TypeSignature::Void,
                params: vec![TypeSignature::String],
                ..Default::default()
            })),
        );

        assert!(write_line.is_method_ref());
        assert!(!write_line.is_field_ref());
        assert_eq!(write_line.method_sig().unwrap().params.len(), 1);
        assert_eq!(write_line.full_name(), "System.Console::WriteLine");
        assert!(Arc::ptr_eq(&write_line.module().unwrap(), &module));
    }
}
