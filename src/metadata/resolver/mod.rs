//! Resolution of references to their definitions across module and assembly boundaries.
//!
//! A [`Resolver`] turns a `TypeRef` into the `TypeDef` it denotes and a `MemberRef` into the
//! `MethodDef` or `Field` it names. It never loads anything itself: assemblies come from an
//! [`AssemblyResolver`] supplied by the host, for example an [`AssemblyCache`] of assemblies
//! materialized up front.
//!
//! # Type resolution
//!
//! 1. With projection enabled, references into Windows Runtime metadata are mapped to their CLR
//!    equivalents ([`WinMdProjection`]).
//! 2. The scope of the outermost enclosing reference decides where to look: another assembly,
//!    a module of the current assembly, or a module named by a `ModuleRef`.
//! 3. If the type is not defined there, the exported types of the searched modules are checked
//!    for a forwarder and the lookup repeats in the assembly it points to. At most
//!    [`ResolverConfig::max_forwarder_hops`] forwarders are followed, so circular chains in
//!    malformed input terminate.
//!
//! Anything that cannot be resolved yields `None`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cilgraph::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     resolver::{AssemblyCache, Resolver},
//!     tables::{Assembly, AssemblyRef, Module, ResolutionScope, TypeDef, TypeRef},
//! };
//!
//! let identity = AssemblyIdentity::new("Widgets", AssemblyVersion::new(1, 0, 0, 0), None, None);
//! let widgets = Assembly::new(identity.clone());
//! let module = Module::new("Widgets.dll");
//! module.types().add(TypeDef::new("Demo", "Widget", 0))?;
//! widgets.modules().add(module)?;
//!
//! let cache = Arc::new(AssemblyCache::new());
//! cache.register(widgets);
//! let resolver = Resolver::builder().assembly_resolver(cache).build()?;
//!
//! let app = Module::new("App.exe");
//! let scope = ResolutionScope::AssemblyRef(AssemblyRef::new(&identity, 0));
//! let reference = TypeRef::new(&app, "Demo", "Widget", Some(scope));
//! let widget = resolver.resolve_type(&reference, Some(&app)).unwrap();
//! assert_eq!(widget.full_name(), "Demo.Widget");
//! # Ok::<(), cilgraph::Error>(())
//! ```

mod assemblyresolver;
mod comparer;
mod projection;

pub use assemblyresolver::{AssemblyCache, AssemblyResolver};
pub use comparer::{SigComparer, SigComparerOptions};
pub use projection::{ReferenceProjection, WinMdProjection};

use std::sync::Arc;

use crate::{
    metadata::{
        config::ResolverConfig,
        identity::AssemblyIdentity,
        signatures::Signature,
        tables::{
            AssemblyRc, DefinitionAssembly, FieldRc, MemberDef, MemberRefParent, MemberRefRc,
            MethodDefRc, ModuleRc, ResolutionScope, TypeDefOrRef, TypeDefRc, TypeRefRc,
        },
        typesystem::MAX_RECURSION_DEPTH,
    },
    Error, Result,
};

/// Resolves references to definitions.
///
/// Built through [`Resolver::builder`]. A resolver holds no per-call state and can be shared
/// between threads.
pub struct Resolver {
    assemblies: Arc<dyn AssemblyResolver>,
    projection: Option<Arc<dyn ReferenceProjection>>,
    comparer: SigComparer,
    config: ResolverConfig,
}

/// Builder for a [`Resolver`]
#[derive(Default)]
pub struct ResolverBuilder {
    assemblies: Option<Arc<dyn AssemblyResolver>>,
    projection: Option<Arc<dyn ReferenceProjection>>,
    config: ResolverConfig,
}

impl ResolverBuilder {
    /// The collaborator assemblies are requested from. Mandatory.
    #[must_use]
    pub fn assembly_resolver(mut self, resolver: Arc<dyn AssemblyResolver>) -> Self {
        self.assemblies = Some(resolver);
        self
    }

    /// Replace the default [`WinMdProjection`]
    #[must_use]
    pub fn projection(mut self, projection: Arc<dyn ReferenceProjection>) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Settings of the resolver
    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the resolver.
    ///
    /// # Errors
    /// Returns [`Error::MissingCollaborator`] if no assembly resolver was supplied.
    pub fn build(self) -> Result<Resolver> {
        let assemblies = self
            .assemblies
            .ok_or(Error::MissingCollaborator("assembly resolver"))?;

        let projection = if self.config.project_winmd_refs {
            Some(self.projection.unwrap_or_else(|| {
                Arc::new(WinMdProjection::new()) as Arc<dyn ReferenceProjection>
            }))
        } else {
            None
        };

        Ok(Resolver {
            assemblies,
            projection,
            comparer: SigComparer::default(),
            config: self.config,
        })
    }
}

impl Resolver {
    /// Start building a resolver
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// The settings of this resolver
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The collaborator assemblies are requested from
    #[must_use]
    pub fn assembly_resolver(&self) -> &Arc<dyn AssemblyResolver> {
        &self.assemblies
    }

    /// The definition `reference` denotes.
    ///
    /// `source` is the module the reference is used from; it defaults to the module the
    /// reference belongs to and is passed on to the assembly resolver.
    pub fn resolve_type(
        &self,
        reference: &TypeRefRc,
        source: Option<&ModuleRc>,
    ) -> Option<TypeDefRc> {
        let reference = self.project_type(reference);
        let owner = reference.module();
        let source = source.or(owner.as_ref());

        let outermost = reference.non_nested()?;
        match outermost.resolution_scope()? {
            ResolutionScope::AssemblyRef(assembly_ref) => {
                let assembly = self.resolve_assembly(&assembly_ref.identity(), source)?;
                assembly.find(&reference).or_else(|| {
                    self.follow_forwarders(assembly.modules().to_vec(), &reference, source)
                })
            }
            ResolutionScope::Module(module) => {
                let module = module.upgrade()?;
                module
                    .find(&reference)
                    .or_else(|| self.follow_forwarders(vec![module.clone()], &reference, source))
            }
            ResolutionScope::ModuleRef(module_ref) => {
                let current = outermost.module()?;
                let target = if self.comparer.equals_module_ref(&module_ref, &current) {
                    current
                } else {
                    current
                        .assembly()?
                        .find_module(&module_ref.name.to_string_lossy())?
                };
                target
                    .find(&reference)
                    .or_else(|| self.follow_forwarders(vec![target.clone()], &reference, source))
            }
            ResolutionScope::TypeRef(_) => None,
        }
    }

    /// The definition behind a `TypeDefOrRef`: definitions as they are, references resolved,
    /// specifications through the type they are built on
    pub fn resolve_type_def_or_ref(
        &self,
        ty: &TypeDefOrRef,
        source: Option<&ModuleRc>,
    ) -> Option<TypeDefRc> {
        match ty {
            TypeDefOrRef::TypeDef(def) => Some(def.clone()),
            TypeDefOrRef::TypeRef(reference) => self.resolve_type(reference, source),
            TypeDefOrRef::TypeSpec(spec) => match spec.scope_type()? {
                TypeDefOrRef::TypeDef(def) => Some(def),
                TypeDefOrRef::TypeRef(reference) => self.resolve_type(&reference, source),
                TypeDefOrRef::TypeSpec(_) => None,
            },
        }
    }

    /// The field or method `member` names.
    ///
    /// The member is looked up by name and signature in its declaring type, then in the base
    /// types of that type.
    pub fn resolve_member(&self, member: &MemberRefRc) -> Option<MemberDef> {
        let member = self.project_member(member);
        let parent = member.class()?;

        if let MemberRefParent::MethodDef(method) = parent {
            return Some(MemberDef::Method(method));
        }

        let source = member.module();
        let declaring = match parent {
            MemberRefParent::TypeDef(def) => def,
            MemberRefParent::TypeRef(reference) => self.resolve_type(&reference, source.as_ref())?,
            MemberRefParent::TypeSpec(spec) => {
                self.resolve_type_def_or_ref(&TypeDefOrRef::TypeSpec(spec), source.as_ref())?
            }
            MemberRefParent::ModuleRef(module_ref) => {
                let current = source?;
                self.comparer
                    .equals_module_ref(&module_ref, &current)
                    .then(|| current.global_type())
                    .flatten()
                    .or_else(|| {
                        current
                            .assembly()?
                            .find_module(&module_ref.name.to_string_lossy())?
                            .global_type()
                    })?
            }
            MemberRefParent::MethodDef(_) => return None,
        };

        let signature = member.signature()?;
        self.find_member(&declaring, &member.name().to_string_lossy(), &signature)
    }

    /// The method `member` names, `None` if it names a field or does not resolve
    pub fn resolve_method(&self, member: &MemberRefRc) -> Option<MethodDefRc> {
        match self.resolve_member(member)? {
            MemberDef::Method(method) => Some(method),
            MemberDef::Field(_) => None,
        }
    }

    /// The field `member` names, `None` if it names a method or does not resolve
    pub fn resolve_field(&self, member: &MemberRefRc) -> Option<FieldRc> {
        match self.resolve_member(member)? {
            MemberDef::Field(field) => Some(field),
            MemberDef::Method(_) => None,
        }
    }

    fn project_type(&self, reference: &TypeRefRc) -> TypeRefRc {
        self.projection
            .as_ref()
            .and_then(|projection| projection.project_type_ref(reference))
            .unwrap_or_else(|| reference.clone())
    }

    fn project_member(&self, member: &MemberRefRc) -> MemberRefRc {
        self.projection
            .as_ref()
            .and_then(|projection| projection.project_member_ref(member))
            .unwrap_or_else(|| member.clone())
    }

    fn resolve_assembly(
        &self,
        identity: &AssemblyIdentity,
        source: Option<&ModuleRc>,
    ) -> Option<AssemblyRc> {
        let assembly = self.assemblies.resolve(identity, source);
        if assembly.is_none() {
            tracing::debug!(assembly = %identity.display_name(), "assembly could not be resolved");
        }
        assembly
    }

    /// Follows exported-type forwarders starting at `modules` until the type is defined in the
    /// assembly reached, the chain breaks or the hop bound is exhausted
    fn follow_forwarders(
        &self,
        mut modules: Vec<ModuleRc>,
        reference: &TypeRefRc,
        source: Option<&ModuleRc>,
    ) -> Option<TypeDefRc> {
        for hop in 0..self.config.max_forwarder_hops {
            let exported = modules
                .iter()
                .find_map(|module| module.find_exported(reference))?;

            let identity = match exported.definition_assembly()? {
                DefinitionAssembly::Assembly(assembly) => assembly.identity(),
                DefinitionAssembly::Reference(assembly_ref) => assembly_ref.identity(),
            };
            tracing::debug!(
                hop,
                ty = %reference.full_name(),
                target = %identity.display_name(),
                "following type forwarder"
            );

            let assembly = self.resolve_assembly(&identity, source)?;
            if let Some(found) = assembly.find(reference) {
                return Some(found);
            }
            modules = assembly.modules().iter().collect();
        }

        tracing::warn!(
            ty = %reference.full_name(),
            hops = self.config.max_forwarder_hops,
            "type forwarder chain exceeds the hop bound, giving up"
        );
        None
    }

    /// Looks for the member in `declaring`, then along its base types
    fn find_member(
        &self,
        declaring: &TypeDefRc,
        name: &str,
        signature: &Signature,
    ) -> Option<MemberDef> {
        let mut current = declaring.clone();
        for _ in 0..MAX_RECURSION_DEPTH {
            let found = match signature {
                Signature::Method(method) => current
                    .find_method(name, Some(method))
                    .map(MemberDef::Method),
                Signature::Field(field) => {
                    current.find_field(name, Some(field)).map(MemberDef::Field)
                }
                _ => return None,
            };
            if found.is_some() {
                return found;
            }

            let base = current.base_type()?;
            current = self.resolve_type_def_or_ref(&base, current.module().as_ref())?;
        }
        None
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("projection", &self.projection.is_some())
            .finish_non_exhaustive()
    }
}
