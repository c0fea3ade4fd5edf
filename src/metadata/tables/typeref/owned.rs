use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        streams::Name,
        tables::{CustomAttributeList, Module, ModuleRc, ResolutionScope, TableId, TypeRefRc},
        token::Token,
        typesystem::MAX_RECURSION_DEPTH,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// A reference to a type, possibly defined in another module or assembly
pub struct TypeRef {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    module: Weak<Module>,
    namespace: RwLock<Name>,
    name: RwLock<Name>,
    scope: LazySlot<Option<ResolutionScope>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(TypeRef, TypeRef);

impl TypeRef {
    /// Create a type reference in memory, used by `module`
    #[must_use]
    pub fn new(
        module: &ModuleRc,
        namespace: impl Into<Name>,
        name: impl Into<Name>,
        scope: Option<ResolutionScope>,
    ) -> TypeRefRc {
        Arc::new(TypeRef {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            module: Arc::downgrade(module),
            namespace: RwLock::new(namespace.into()),
            name: RwLock::new(name.into()),
            scope: LazySlot::with_value(scope),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        namespace: Name,
        name: Name,
    ) -> TypeRefRc {
        Arc::new(TypeRef {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            module: ctx.module_weak(),
            namespace: RwLock::new(namespace),
            name: RwLock::new(name),
            scope: LazySlot::new(),
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

    /// The namespace, empty for nested references
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

    /// Rename the referenced type
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Where the referenced type is to be looked up
    pub fn resolution_scope(&self) -> Option<ResolutionScope> {
        self.scope
            .get(&self.sync, || self.load(|ctx, rid| ctx.type_ref_scope(rid)).flatten())
    }

    /// Replace the resolution scope
    pub fn set_resolution_scope(&self, scope: Option<ResolutionScope>) {
        self.scope.set(&self.sync, scope);
    }

    /// The reference of the enclosing type, for nested references
    pub fn declaring_type(&self) -> Option<TypeRefRc> {
        match self.resolution_scope() {
            Some(ResolutionScope::TypeRef(enclosing)) => Some(enclosing),
            _ => None,
        }
    }

    /// Returns `true` if this references a nested type
    pub fn is_nested(&self) -> bool {
        self.declaring_type().is_some()
    }

    /// The outermost enclosing reference, `None` if the chain does not end within the recursion
    /// bound
    pub fn non_nested(self: &Arc<Self>) -> Option<TypeRefRc> {
        let mut current = self.clone();
        for _ in 0..MAX_RECURSION_DEPTH {
            match current.declaring_type() {
                Some(enclosing) => current = enclosing,
                None => return Some(current),
            }
        }
        None
    }

    /// The enclosing chain from the outermost reference down to this one
    pub fn nesting_chain(self: &Arc<Self>) -> Option<Vec<TypeRefRc>> {
        let mut chain = vec![self.clone()];
        for _ in 0..MAX_RECURSION_DEPTH {
            let Some(enclosing) = chain.last().and_then(|last| last.declaring_type()) else {
                chain.reverse();
                return Some(chain);
            };
            chain.push(enclosing);
        }
        None
    }

    /// The full name, enclosing references separated by `/`
    pub fn full_name(&self) -> String {
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

    /// Custom attributes applied to this reference
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::TypeRef, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

fn qualified(namespace: &Name, name: &Name) -> String {
    if namespace.is_empty() {
        name.to_string_lossy()
    } else {
        format!("{namespace}.{name}")
    }
}

impl std::fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRef")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.full_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_reference_names() {
        let module = Module::new("Demo.dll");
        let outer = TypeRef::new(&module, "System", "Environment", None);
        let inner = TypeRef::new(
            &module,
            "",
            "SpecialFolder",
            Some(ResolutionScope::TypeRef(outer.clone())),
        );

        assert!(inner.is_nested());
        assert_eq!(inner.full_name(), "System.Environment/SpecialFolder");
        assert!(Arc::ptr_eq(&inner.non_nested().unwrap(), &outer));

        let chain = inner.nesting_chain().unwrap();
        assert_eq!(chain.len(), 2);
        assert!(Arc::ptr_eq(&chain[0], &outer));
    }

    #[test]
    fn cyclic_scope_chain_terminates() {
        let module = Module::new("Demo.dll");
        let a = TypeRef::new(&module, "", "A", None);
        let b = TypeRef::new(&module, "", "B", Some(ResolutionScope::TypeRef(a.clone())));
        a.set_resolution_scope(Some(ResolutionScope::TypeRef(b.clone())));

        assert!(a.non_nested().is_none());
        assert!(b.nesting_chain().is_none());
        assert!(!a.full_name().is_empty());

        // Break the cycle so both references can be dropped
        a.set_resolution_scope(None);
    }
}
