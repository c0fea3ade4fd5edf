use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        signatures::TypeSignature,
        tables::{CustomAttributeList, TableId, TypeDefOrRef, TypeSpecRc},
        token::Token,
        typesystem::MAX_RECURSION_DEPTH,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// A type described by a signature
pub struct TypeSpec {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    type_sig: LazySlot<Option<Arc<TypeSignature>>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(TypeSpec, TypeSpec);

impl TypeSpec {
    /// Create a type specification in memory
    #[must_use]
    pub fn new(type_sig: TypeSignature) -> TypeSpecRc {
        Arc::new(TypeSpec {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            type_sig: LazySlot::with_value(Some(Arc::new(type_sig))),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32) -> TypeSpecRc {
        Arc::new(TypeSpec {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            type_sig: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// The type signature, `None` if the blob could not be decoded
    pub fn type_sig(&self) -> Option<Arc<TypeSignature>> {
        self.type_sig.get(&self.sync, || {
            self.load(|ctx, rid| ctx.type_spec_signature(rid)).flatten()
        })
    }

    /// Replace the type signature
    pub fn set_type_sig(&self, type_sig: Option<TypeSignature>) {
        self.type_sig.set(&self.sync, type_sig.map(Arc::new));
    }

    /// The definition or reference this specification is built on: the generic type of an
    /// instantiation, the element type of arrays and pointers. `None` for generic parameters,
    /// primitives and chains that do not end within the recursion bound.
    pub fn scope_type(&self) -> Option<TypeDefOrRef> {
        let mut signature = self.type_sig()?;
        for _ in 0..MAX_RECURSION_DEPTH {
            let mut node: &TypeSignature = &signature;
            let mut steps = 0;
            while let Some(next) = node.next() {
                node = next;
                steps += 1;
                if steps > MAX_RECURSION_DEPTH {
                    return None;
                }
            }

            match node.type_def_or_ref()? {
                TypeDefOrRef::TypeSpec(spec) => signature = spec.type_sig()?,
                other => return Some(other.clone()),
            }
        }
        None
    }

    /// The signature in display form, empty if it could not be decoded
    pub fn full_name(&self) -> String {
        self.type_sig()
            .map(|signature| signature.to_string())
            .unwrap_or_default()
    }

    /// Custom attributes applied to this specification
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::TypeSpec, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSpec")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("signature", &self.type_sig())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::TypeDef;

    #[test]
    fn scope_type_unwraps_instantiations() {
        let list = TypeDef::new("System.Collections.Generic", "List`1", 0);
        let spec = TypeSpec::new(TypeSignature::GenericInst(
            Box::new(TypeSignature::Class(TypeDefOrRef::TypeDef(list.clone()))),
            vec![TypeSignature::I4],
        ));
        let scope = spec.scope_type().unwrap();
        assert!(Arc::ptr_eq(scope.as_type_def().unwrap(), &list));

        let array = TypeSpec::new(TypeSignature::SzArray(Box::new(TypeSignature::Class(
            TypeDefOrRef::TypeSpec(spec.clone()),
        ))));
        assert!(Arc::ptr_eq(
            array.scope_type().unwrap().as_type_def().unwrap(),
            &list
        ));
    }

    #[test]
    fn generic_parameters_have_no_scope_type() {
        let spec = TypeSpec::new(TypeSignature::GenericParamType(0));
        assert!(spec.scope_type().is_none());
        assert_eq!(spec.full_name(), TypeSignature::GenericParamType(0).to_string());
    }
}
