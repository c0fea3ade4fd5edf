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
        tables::{
            AssemblyRc, AssemblyRefRc, CustomAttributeList, ExportedTypeRc, Implementation, Module,
            ModuleRc, TableId,
        },
        token::Token,
        typesystem::MAX_RECURSION_DEPTH,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
};

/// `TypeAttributes` flag marking an exported type as a forwarder
pub const FORWARDER: u32 = 0x0020_0000;

/// The assembly an exported type is defined in
#[derive(Clone, Debug)]
pub enum DefinitionAssembly {
    /// The assembly owning the exported type's module
    Assembly(AssemblyRc),
    /// Another assembly
    Reference(AssemblyRefRc),
}

/// A type exported by the current assembly
pub struct ExportedType {
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    module: Weak<Module>,
    flags: AtomicU32,
    type_def_id: AtomicU32,
    namespace: RwLock<Name>,
    name: RwLock<Name>,
    implementation: LazySlot<Option<Implementation>>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(ExportedType, ExportedType);

impl ExportedType {
    /// Create an exported type in memory, listed by `module`
    #[must_use]
    pub fn new(
        module: &ModuleRc,
        namespace: impl Into<Name>,
        name: impl Into<Name>,
        flags: u32,
        implementation: Option<Implementation>,
    ) -> ExportedTypeRc {
        Arc::new(ExportedType {
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            module: Arc::downgrade(module),
            flags: AtomicU32::new(flags),
            type_def_id: AtomicU32::new(0),
            namespace: RwLock::new(namespace.into()),
            name: RwLock::new(name.into()),
            implementation: LazySlot::with_value(implementation),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(
        ctx: &LoaderContext,
        rid: u32,
        flags: u32,
        type_def_id: u32,
        namespace: Name,
        name: Name,
    ) -> ExportedTypeRc {
        Arc::new(ExportedType {
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            module: ctx.module_weak(),
            flags: AtomicU32::new(flags),
            type_def_id: AtomicU32::new(type_def_id),
            namespace: RwLock::new(namespace),
            name: RwLock::new(name),
            implementation: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// The module listing this exported type
    pub fn module(&self) -> Option<ModuleRc> {
        self.module.upgrade()
    }

    /// `TypeAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The `TypeDef` row hint in the implementing module
    pub fn type_def_id(&self) -> u32 {
        self.type_def_id.load(Ordering::Acquire)
    }

    /// The namespace, empty for nested exported types
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

    /// Rename the exported type
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// Returns `true` if this redirects to another assembly
    pub fn is_forwarder(&self) -> bool {
        self.flags() & FORWARDER != 0
    }

    /// Where the type is implemented
    pub fn implementation(&self) -> Option<Implementation> {
        self.implementation.get(&self.sync, || {
            self.load(|ctx, rid| ctx.exported_type_implementation(rid))
                .flatten()
        })
    }

    /// Replace the implementation
    pub fn set_implementation(&self, implementation: Option<Implementation>) {
        self.implementation.set(&self.sync, implementation);
    }

    /// The enclosing exported type, for nested exported types
    pub fn declaring_type(&self) -> Option<ExportedTypeRc> {
        match self.implementation() {
            Some(Implementation::ExportedType(enclosing)) => Some(enclosing),
            _ => None,
        }
    }

    /// Returns `true` for nested exported types
    pub fn is_nested(&self) -> bool {
        self.declaring_type().is_some()
    }

    /// The full name, enclosing exported types separated by `/`
    pub fn full_name(&self) -> String {
        let qualified = |namespace: Name, name: Name| {
            if namespace.is_empty() {
                name.to_string_lossy()
            } else {
                format!("{namespace}.{name}")
            }
        };

        let mut parts = vec![qualified(self.namespace(), self.name())];
        let mut current = self.declaring_type();
        for _ in 0..MAX_RECURSION_DEPTH {
            let Some(enclosing) = current else { break };
            parts.push(qualified(enclosing.namespace(), enclosing.name()));
            current = enclosing.declaring_type();
        }

        parts.reverse();
        parts.join("/")
    }

    /// The assembly defining the type.
    ///
    /// Follows enclosing exported types out to the outermost one; a `File` implementation denotes
    /// the assembly of this module. `None` if the chain does not end within the recursion bound
    /// or ends in an invalid row.
    pub fn definition_assembly(&self) -> Option<DefinitionAssembly> {
        let mut implementation = self.implementation()?;
        for _ in 0..MAX_RECURSION_DEPTH {
            match implementation {
                Implementation::AssemblyRef(reference) => {
                    return Some(DefinitionAssembly::Reference(reference))
                }
                Implementation::File(_) => {
                    return self.module()?.assembly().map(DefinitionAssembly::Assembly)
                }
                Implementation::ExportedType(enclosing) => {
                    implementation = enclosing.implementation()?;
                }
            }
        }
        None
    }

    /// Custom attributes applied to this exported type
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| {
                ctx.custom_attributes(Token::from_parts(TableId::ExportedType, rid))
            })
            .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }
}

impl std::fmt::Debug for ExportedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedType")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.full_name())
            .field("forwarder", &self.is_forwarder())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        tables::{Assembly, AssemblyRef, File},
    };

    fn identity(name: &str) -> AssemblyIdentity {
        AssemblyIdentity::new(name, AssemblyVersion::new(1, 0, 0, 0), None, None)
    }

    #[test]
    fn forwarder_to_reference() {
        let module = Module::new("Facade.dll");
        let target = AssemblyRef::new(&identity("Impl"), 0);
        let outer = ExportedType::new(
            &module,
            "Demo",
            "Outer",
            FORWARDER,
            Some(Implementation::AssemblyRef(target.clone())),
        );
        let inner = ExportedType::new(
            &module,
            "",
            "Inner",
            0,
            Some(Implementation::ExportedType(outer.clone())),
        );

        assert!(outer.is_forwarder());
        assert_eq!(inner.full_name(), "Demo.Outer/Inner");
        match inner.definition_assembly() {
            Some(DefinitionAssembly::Reference(reference)) => {
                assert!(Arc::ptr_eq(&reference, &target));
            }
            other => panic!("unexpected definition assembly {other:?}"),
        }
    }

    #[test]
    fn file_implementation_denotes_own_assembly() {
        let assembly = Assembly::new(identity("Multi"));
        let module = Module::new("Multi.dll");
        assembly.modules().add(module.clone()).unwrap();

        let exported = ExportedType::new(
            &module,
            "Demo",
            "Elsewhere",
            0,
            Some(Implementation::File(File::new("Second.netmodule", 0))),
        );
        match exported.definition_assembly() {
            Some(DefinitionAssembly::Assembly(found)) => assert!(Arc::ptr_eq(&found, &assembly)),
            other => panic!("unexpected definition assembly {other:?}"),
        }
    }
}
