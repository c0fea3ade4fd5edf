//! Mapping of platform-surfaced references onto the types behind them.
//!
//! Windows Runtime metadata (`.winmd`) describes types such as `Windows.Foundation.Uri` that the
//! CLR surfaces as `System.Uri`. A reference into a WinMD file has to be rewritten to its CLR
//! equivalent before it can be resolved against the framework assemblies.

use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion, Identity},
    signatures::{Signature, SignatureField, SignatureMethod, SignatureModifier, TypeSignature},
    tables::{
        AssemblyRef, MemberRef, MemberRefParent, MemberRefRc, ResolutionScope, TypeDefOrRef,
        TypeRef, TypeRefRc, TypeSpec,
    },
    typesystem::MAX_RECURSION_DEPTH,
};

/// A reference-to-reference rewrite applied before resolution.
///
/// Both methods return `None` if no mapping applies, resolution then continues with the
/// reference unchanged.
pub trait ReferenceProjection: Send + Sync {
    /// The projected form of a type reference
    fn project_type_ref(&self, reference: &TypeRefRc) -> Option<TypeRefRc>;

    /// The projected form of a member reference
    fn project_member_ref(&self, reference: &MemberRefRc) -> Option<MemberRefRc>;
}

/// Contract assemblies projected types live in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClrAssembly {
    SystemRuntime,
    SystemObjectModel,
    SystemRuntimeWindowsRuntime,
    InteropServicesWindowsRuntime,
}

/// `b03f5f7f11d50a3a`
const CONTRACT_TOKEN: u64 = 0x3a0a_d511_7f5f_3fb0;
/// `b77a5c561934e089`
const ECMA_TOKEN: u64 = 0x89e0_3419_565c_7ab7;

impl ClrAssembly {
    fn identity(self) -> AssemblyIdentity {
        let (name, token) = match self {
            ClrAssembly::SystemRuntime => ("System.Runtime", CONTRACT_TOKEN),
            ClrAssembly::SystemObjectModel => ("System.ObjectModel", CONTRACT_TOKEN),
            ClrAssembly::SystemRuntimeWindowsRuntime => {
                ("System.Runtime.WindowsRuntime", ECMA_TOKEN)
            }
            ClrAssembly::InteropServicesWindowsRuntime => {
                ("System.Runtime.InteropServices.WindowsRuntime", CONTRACT_TOKEN)
            }
        };
        AssemblyIdentity::new(
            name,
            AssemblyVersion::new(4, 0, 0, 0),
            None,
            Some(Identity::Token(token)),
        )
    }
}

struct Mapping {
    winrt_namespace: &'static str,
    winrt_name: &'static str,
    clr_namespace: &'static str,
    clr_name: &'static str,
    assembly: ClrAssembly,
}

macro_rules! mappings {
    ($(($winrt_ns:literal, $winrt:literal) => ($clr_ns:literal, $clr:literal, $asm:ident),)+) => {
        &[$(Mapping {
            winrt_namespace: $winrt_ns,
            winrt_name: $winrt,
            clr_namespace: $clr_ns,
            clr_name: $clr,
            assembly: ClrAssembly::$asm,
        },)+]
    };
}

static MAPPINGS: &[Mapping] = mappings! {
    ("Windows.Foundation.Metadata", "AttributeUsageAttribute") => ("System", "AttributeUsageAttribute", SystemRuntime),
    ("Windows.Foundation.Metadata", "AttributeTargets") => ("System", "AttributeTargets", SystemRuntime),
    ("Windows.UI", "Color") => ("Windows.UI", "Color", SystemRuntimeWindowsRuntime),
    ("Windows.Foundation", "DateTime") => ("System", "DateTimeOffset", SystemRuntime),
    ("Windows.Foundation", "EventHandler`1") => ("System", "EventHandler`1", SystemRuntime),
    ("Windows.Foundation", "EventRegistrationToken") => ("System.Runtime.InteropServices.WindowsRuntime", "EventRegistrationToken", InteropServicesWindowsRuntime),
    ("Windows.Foundation", "HResult") => ("System", "Exception", SystemRuntime),
    ("Windows.Foundation", "IReference`1") => ("System", "Nullable`1", SystemRuntime),
    ("Windows.Foundation", "Point") => ("Windows.Foundation", "Point", SystemRuntimeWindowsRuntime),
    ("Windows.Foundation", "Rect") => ("Windows.Foundation", "Rect", SystemRuntimeWindowsRuntime),
    ("Windows.Foundation", "Size") => ("Windows.Foundation", "Size", SystemRuntimeWindowsRuntime),
    ("Windows.Foundation", "TimeSpan") => ("System", "TimeSpan", SystemRuntime),
    ("Windows.Foundation", "Uri") => ("System", "Uri", SystemRuntime),
    ("Windows.Foundation", "IClosable") => ("System", "IDisposable", SystemRuntime),
    ("Windows.Foundation.Collections", "IIterable`1") => ("System.Collections.Generic", "IEnumerable`1", SystemRuntime),
    ("Windows.Foundation.Collections", "IVector`1") => ("System.Collections.Generic", "IList`1", SystemRuntime),
    ("Windows.Foundation.Collections", "IVectorView`1") => ("System.Collections.Generic", "IReadOnlyList`1", SystemRuntime),
    ("Windows.Foundation.Collections", "IMap`2") => ("System.Collections.Generic", "IDictionary`2", SystemRuntime),
    ("Windows.Foundation.Collections", "IMapView`2") => ("System.Collections.Generic", "IReadOnlyDictionary`2", SystemRuntime),
    ("Windows.Foundation.Collections", "IKeyValuePair`2") => ("System.Collections.Generic", "KeyValuePair`2", SystemRuntime),
    ("Windows.UI.Xaml.Input", "ICommand") => ("System.Windows.Input", "ICommand", SystemObjectModel),
    ("Windows.UI.Xaml.Interop", "IBindableIterable") => ("System.Collections", "IEnumerable", SystemRuntime),
    ("Windows.UI.Xaml.Interop", "IBindableVector") => ("System.Collections", "IList", SystemRuntime),
    ("Windows.UI.Xaml.Interop", "INotifyCollectionChanged") => ("System.Collections.Specialized", "INotifyCollectionChanged", SystemObjectModel),
    ("Windows.UI.Xaml.Interop", "NotifyCollectionChangedEventHandler") => ("System.Collections.Specialized", "NotifyCollectionChangedEventHandler", SystemObjectModel),
    ("Windows.UI.Xaml.Interop", "NotifyCollectionChangedEventArgs") => ("System.Collections.Specialized", "NotifyCollectionChangedEventArgs", SystemObjectModel),
    ("Windows.UI.Xaml.Interop", "NotifyCollectionChangedAction") => ("System.Collections.Specialized", "NotifyCollectionChangedAction", SystemObjectModel),
    ("Windows.UI.Xaml.Data", "INotifyPropertyChanged") => ("System.ComponentModel", "INotifyPropertyChanged", SystemObjectModel),
    ("Windows.UI.Xaml.Data", "PropertyChangedEventHandler") => ("System.ComponentModel", "PropertyChangedEventHandler", SystemObjectModel),
    ("Windows.UI.Xaml.Data", "PropertyChangedEventArgs") => ("System.ComponentModel", "PropertyChangedEventArgs", SystemObjectModel),
    ("Windows.UI.Xaml.Interop", "TypeName") => ("System", "Type", SystemRuntime),
};

/// Members whose name changes along with their declaring type
static MEMBER_RENAMES: &[(&str, &str, &str, &str)] =
    &[("Windows.Foundation", "IClosable", "Close", "Dispose")];

/// The CLR projection of Windows Runtime types.
///
/// Only references scoped to an assembly reference with the Windows Runtime content type are
/// projected. Member references are rewritten when their class, or a type in their signature,
/// projects; `IClosable.Close` becomes `IDisposable.Dispose`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinMdProjection;

impl WinMdProjection {
    /// Create the projection
    #[must_use]
    pub fn new() -> Self {
        WinMdProjection
    }

    fn mapping_for(reference: &TypeRefRc) -> Option<&'static Mapping> {
        let Some(ResolutionScope::AssemblyRef(assembly_ref)) = reference.resolution_scope() else {
            return None;
        };
        if !assembly_ref.is_windows_runtime() {
            return None;
        }

        let namespace = reference.namespace();
        let name = reference.name();
        MAPPINGS
            .iter()
            .find(|mapping| namespace == mapping.winrt_namespace && name == mapping.winrt_name)
    }

    fn project_type_def_or_ref(&self, ty: &TypeDefOrRef, depth: usize) -> Option<TypeDefOrRef> {
        match ty {
            TypeDefOrRef::TypeRef(reference) => {
                self.project_type_ref(reference).map(TypeDefOrRef::TypeRef)
            }
            TypeDefOrRef::TypeSpec(spec) => {
                let signature = spec.type_sig()?;
                let projected = self.project_sig(&signature, depth)?;
                Some(TypeDefOrRef::TypeSpec(TypeSpec::new(projected)))
            }
            TypeDefOrRef::TypeDef(_) => None,
        }
    }

    /// The projected signature, `None` if nothing in it projects
    fn project_sig(&self, signature: &TypeSignature, depth: usize) -> Option<TypeSignature> {
        let depth = depth.checked_sub(1)?;
        let boxed = |inner: &TypeSignature| self.project_sig(inner, depth).map(Box::new);

        match signature {
            TypeSignature::Class(ty) => self
                .project_type_def_or_ref(ty, depth)
                .map(TypeSignature::Class),
            TypeSignature::ValueType(ty) => self
                .project_type_def_or_ref(ty, depth)
                .map(TypeSignature::ValueType),
            TypeSignature::Ptr(inner) => boxed(inner).map(TypeSignature::Ptr),
            TypeSignature::ByRef(inner) => boxed(inner).map(TypeSignature::ByRef),
            TypeSignature::SzArray(inner) => boxed(inner).map(TypeSignature::SzArray),
            TypeSignature::Pinned(inner) => boxed(inner).map(TypeSignature::Pinned),
            TypeSignature::Array(array) => {
                let mut projected = array.clone();
                projected.base = boxed(&array.base)?;
                Some(TypeSignature::Array(projected))
            }
            TypeSignature::GenericInst(base, args) => {
                let projected_base = boxed(base);
                let projected_args = self.project_all(args, depth);
                if projected_base.is_none() && projected_args.is_none() {
                    return None;
                }
                Some(TypeSignature::GenericInst(
                    projected_base.unwrap_or_else(|| base.clone()),
                    projected_args.unwrap_or_else(|| args.clone()),
                ))
            }
            TypeSignature::ModifiedRequired(modifier) => self
                .project_modifier(modifier, depth)
                .map(TypeSignature::ModifiedRequired),
            TypeSignature::ModifiedOptional(modifier) => self
                .project_modifier(modifier, depth)
                .map(TypeSignature::ModifiedOptional),
            TypeSignature::FnPtr(method) => self
                .project_method_sig(method, depth)
                .map(|method| TypeSignature::FnPtr(Box::new(method))),
            _ => None,
        }
    }

    fn project_modifier(
        &self,
        modifier: &SignatureModifier,
        depth: usize,
    ) -> Option<SignatureModifier> {
        let base = self.project_sig(&modifier.base, depth)?;
        Some(SignatureModifier {
            modifier: modifier.modifier.clone(),
            base: Box::new(base),
        })
    }

    /// `None` if no element projects
    fn project_all(&self, types: &[TypeSignature], depth: usize) -> Option<Vec<TypeSignature>> {
        let projected: Vec<Option<TypeSignature>> =
            types.iter().map(|ty| self.project_sig(ty, depth)).collect();
        if projected.iter().all(Option::is_none) {
            return None;
        }

        Some(
            projected
                .into_iter()
                .zip(types)
                .map(|(projected, original)| projected.unwrap_or_else(|| original.clone()))
                .collect(),
        )
    }

    fn project_method_sig(
        &self,
        method: &SignatureMethod,
        depth: usize,
    ) -> Option<SignatureMethod> {
        let return_type = self.project_sig(&method.return_type, depth);
        let params = self.project_all(&method.params, depth);
        if return_type.is_none() && params.is_none() {
            return None;
        }

        let mut projected = method.clone();
        if let Some(return_type) = return_type {
            projected.return_type = return_type;
        }
        if let Some(params) = params {
            projected.params = params;
        }
        Some(projected)
    }

    fn project_signature(&self, signature: &Signature) -> Option<Signature> {
        match signature {
            Signature::Method(method) => self
                .project_method_sig(method, MAX_RECURSION_DEPTH)
                .map(Signature::Method),
            Signature::Field(field) => self
                .project_sig(&field.base, MAX_RECURSION_DEPTH)
                .map(|base| Signature::Field(SignatureField { base })),
            _ => None,
        }
    }
}

impl ReferenceProjection for WinMdProjection {
    fn project_type_ref(&self, reference: &TypeRefRc) -> Option<TypeRefRc> {
        let mapping = Self::mapping_for(reference)?;
        let module = reference.module()?;

        tracing::trace!(
            winrt = %reference.full_name(),
            clr_namespace = mapping.clr_namespace,
            clr_name = mapping.clr_name,
            "projected type reference"
        );

        let scope = AssemblyRef::new(&mapping.assembly.identity(), 0);
        Some(TypeRef::new(
            &module,
            mapping.clr_namespace,
            mapping.clr_name,
            Some(ResolutionScope::AssemblyRef(scope)),
        ))
    }

    fn project_member_ref(&self, reference: &MemberRefRc) -> Option<MemberRefRc> {
        let module = reference.module()?;
        let class = reference.class();
        let signature = reference.signature();

        let mut name = reference.name();
        let projected_class = match &class {
            Some(MemberRefParent::TypeRef(owner)) => {
                let projected = self.project_type_ref(owner);
                if projected.is_some() {
                    let rename = MEMBER_RENAMES.iter().find(|(ns, ty, member, _)| {
                        owner.namespace() == *ns && owner.name() == *ty && name == *member
                    });
                    if let Some((_, _, _, renamed)) = rename {
                        name = (*renamed).into();
                    }
                }
                projected.map(MemberRefParent::TypeRef)
            }
            Some(MemberRefParent::TypeSpec(spec)) => spec
                .type_sig()
                .and_then(|sig| self.project_sig(&sig, MAX_RECURSION_DEPTH))
                .map(|sig| MemberRefParent::TypeSpec(TypeSpec::new(sig))),
            _ => None,
        };
        let projected_signature = signature
            .as_deref()
            .and_then(|signature| self.project_signature(signature));

        if projected_class.is_none() && projected_signature.is_none() {
            return None;
        }

        Some(MemberRef::new(
            &module,
            name,
            projected_class.or(class),
            projected_signature.or_else(|| signature.map(|signature| (*signature).clone())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{AssemblyFlags, Module, ModuleRc};

    fn winrt_ref(module: &ModuleRc, namespace: &str, name: &str) -> TypeRefRc {
        let scope = AssemblyRef::new(
            &AssemblyIdentity::new("Windows", AssemblyVersion::new(255, 255, 255, 255), None, None),
            AssemblyFlags::WINDOWS_RUNTIME,
        );
        TypeRef::new(module, namespace, name, Some(ResolutionScope::AssemblyRef(scope)))
    }

    #[test]
    fn projects_well_known_types() {
        let module = Module::new("App.exe");
        let uri = winrt_ref(&module, "Windows.Foundation", "Uri");

        let projected = WinMdProjection.project_type_ref(&uri).unwrap();
        assert_eq!(projected.full_name(), "System.Uri");
        let Some(ResolutionScope::AssemblyRef(scope)) = projected.resolution_scope() else {
            panic!("projected reference must be scoped to an assembly reference");
        };
        assert_eq!(scope.name, "System.Runtime");
        assert!(!scope.is_windows_runtime());
    }

    #[test]
    fn leaves_other_references_alone() {
        let module = Module::new("App.exe");
        let unknown = winrt_ref(&module, "Windows.Storage", "StorageFile");
        assert!(WinMdProjection.project_type_ref(&unknown).is_none());

        let plain_scope = AssemblyRef::new(
            &AssemblyIdentity::new("Windows", AssemblyVersion::UNKNOWN, None, None),
            0,
        );
        let not_winrt = TypeRef::new(
            &module,
            "Windows.Foundation",
            "Uri",
            Some(ResolutionScope::AssemblyRef(plain_scope)),
        );
        assert!(WinMdProjection.project_type_ref(&not_winrt).is_none());
    }

    #[test]
    fn close_becomes_dispose() {
        let module = Module::new("App.exe");
        let closable = winrt_ref(&module, "Windows.Foundation", "IClosable");
        let close = MemberRef::new(
            &module,
            "Close",
            Some(MemberRefParent::TypeRef(closable)),
            Some(Signature::Method(SignatureMethod {
                has_this: true,
                return_type: TypeSignature::Void,
                ..SignatureMethod::default()
            })),
        );

        let projected = WinMdProjection.project_member_ref(&close).unwrap();
        assert_eq!(projected.full_name(), "System.IDisposable::Dispose");
    }

    #[test]
    fn generic_instantiation_class_projects() {
        let module = Module::new("App.exe");
        let iterable = winrt_ref(&module, "Windows.Foundation.Collections", "IIterable`1");
        let instance = TypeSpec::new(TypeSignature::GenericInst(
            Box::new(TypeSignature::Class(iterable.into())),
            vec![TypeSignature::String],
        ));
        let first = MemberRef::new(
            &module,
            "First",
            Some(MemberRefParent::TypeSpec(instance)),
            None,
        );

        let projected = WinMdProjection.project_member_ref(&first).unwrap();
        let Some(MemberRefParent::TypeSpec(spec)) = projected.class() else {
            panic!("class must stay a specification");
        };
        let Some(TypeDefOrRef::TypeRef(generic)) = spec.scope_type() else {
            panic!("specification must be built on a reference");
        };
        assert_eq!(generic.full_name(), "System.Collections.Generic.IEnumerable`1");
    }
}
