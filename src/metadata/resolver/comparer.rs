//! Structural comparison of types, references and signatures.
//!
//! Entities compare by identity everywhere else in the crate. Resolution needs the other notion:
//! a `TypeRef` in one module and a `TypeDef` in another denote the same type when their names,
//! namespaces and enclosing chains agree. [`SigComparer`] implements that comparison and extends
//! it over the signature grammar for member lookup.

use bitflags::bitflags;

use crate::metadata::{
    signatures::{
        SignatureField, SignatureMethod, SignatureModifier, SignatureProperty, TypeSignature,
    },
    streams::Name,
    tables::{ExportedType, Module, ModuleRef, ResolutionScope, TypeDefOrRef, TypeRefRc},
    typesystem::MAX_RECURSION_DEPTH,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Knobs of a [`SigComparer`]
    pub struct SigComparerOptions: u32 {
        /// Types must also agree on the assembly (or module) they live in
        const COMPARE_TYPE_SCOPE = 0x0001;
        /// Custom modifiers are skipped instead of compared
        const IGNORE_MODIFIERS = 0x0002;
        /// Arguments after the vararg sentinel take part in method signature comparison
        const COMPARE_VARARGS = 0x0004;
    }
}

/// `(namespace, name)` for each level of a type, outermost first
type TypePath = Vec<(Name, Name)>;

/// Compares types and signatures by structure instead of identity.
///
/// The default comparer ignores type scopes, so a reference matches a definition wherever the
/// definition lives. That is what the lookup behind an exported-type forwarder needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigComparer {
    options: SigComparerOptions,
}

impl SigComparer {
    /// Create a comparer with `options`
    #[must_use]
    pub fn new(options: SigComparerOptions) -> Self {
        SigComparer { options }
    }

    /// The options of this comparer
    #[must_use]
    pub fn options(&self) -> SigComparerOptions {
        self.options
    }

    /// Returns `true` if both denote the same type
    #[must_use]
    pub fn equals_type(&self, a: &TypeDefOrRef, b: &TypeDefOrRef) -> bool {
        self.type_def_or_ref(a, b, MAX_RECURSION_DEPTH)
    }

    /// Returns `true` if both signatures describe the same type
    #[must_use]
    pub fn equals_type_sig(&self, a: &TypeSignature, b: &TypeSignature) -> bool {
        self.types(a, b, MAX_RECURSION_DEPTH)
    }

    /// Returns `true` if both method signatures match.
    ///
    /// Call-site arguments after the vararg sentinel are only compared with
    /// [`SigComparerOptions::COMPARE_VARARGS`], a `MemberRef` to a vararg method carries them
    /// while the definition never does.
    #[must_use]
    pub fn equals_method_sig(&self, a: &SignatureMethod, b: &SignatureMethod) -> bool {
        self.method_sig(a, b, MAX_RECURSION_DEPTH)
    }

    /// Returns `true` if both field signatures match
    #[must_use]
    pub fn equals_field_sig(&self, a: &SignatureField, b: &SignatureField) -> bool {
        self.types(&a.base, &b.base, MAX_RECURSION_DEPTH)
    }

    /// Returns `true` if both property signatures match
    #[must_use]
    pub fn equals_property_sig(&self, a: &SignatureProperty, b: &SignatureProperty) -> bool {
        a.has_this == b.has_this
            && self.types(&a.base, &b.base, MAX_RECURSION_DEPTH)
            && self.all(&a.params, &b.params, MAX_RECURSION_DEPTH)
    }

    /// Returns `true` if `exported` names the type `reference` refers to.
    ///
    /// Names, namespaces and the enclosing chain are compared, scopes never are: the exported
    /// type is found in the assembly the reference was resolved against.
    #[must_use]
    pub fn equals_exported_type(&self, exported: &ExportedType, reference: &TypeRefRc) -> bool {
        let Some(chain) = reference.nesting_chain() else {
            return false;
        };
        let expected: TypePath = chain
            .iter()
            .map(|level| (level.namespace(), level.name()))
            .collect();

        let mut actual: TypePath = vec![(exported.namespace(), exported.name())];
        let mut current = exported.declaring_type();
        for _ in 0..MAX_RECURSION_DEPTH {
            let Some(enclosing) = current else {
                actual.reverse();
                return actual == expected;
            };
            actual.push((enclosing.namespace(), enclosing.name()));
            current = enclosing.declaring_type();
        }
        false
    }

    /// Returns `true` if `module_ref` names `module`, ignoring ASCII case
    #[must_use]
    pub fn equals_module_ref(&self, module_ref: &ModuleRef, module: &Module) -> bool {
        module_ref.name.eq_ignore_ascii_case(&module.name())
    }

    fn type_def_or_ref(&self, a: &TypeDefOrRef, b: &TypeDefOrRef, depth: usize) -> bool {
        let Some(depth) = depth.checked_sub(1) else {
            return false;
        };

        match (a, b) {
            (TypeDefOrRef::TypeSpec(a), TypeDefOrRef::TypeSpec(b)) => {
                if std::sync::Arc::ptr_eq(a, b) {
                    return true;
                }
                match (a.type_sig(), b.type_sig()) {
                    (Some(a), Some(b)) => self.types(&a, &b, depth),
                    _ => false,
                }
            }
            (TypeDefOrRef::TypeSpec(_), _) | (_, TypeDefOrRef::TypeSpec(_)) => false,
            _ => {
                let (Some(path_a), Some(path_b)) = (type_path(a), type_path(b)) else {
                    return false;
                };
                if path_a != path_b {
                    return false;
                }
                if self.options.contains(SigComparerOptions::COMPARE_TYPE_SCOPE) {
                    return match (scope_name(a), scope_name(b)) {
                        (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
                        _ => false,
                    };
                }
                true
            }
        }
    }

    fn method_sig(&self, a: &SignatureMethod, b: &SignatureMethod, depth: usize) -> bool {
        a.has_this == b.has_this
            && a.explicit_this == b.explicit_this
            && a.vararg == b.vararg
            && a.param_count_generic == b.param_count_generic
            && self.types(&a.return_type, &b.return_type, depth)
            && self.all(&a.params, &b.params, depth)
            && (!self.options.contains(SigComparerOptions::COMPARE_VARARGS)
                || self.all(&a.varargs, &b.varargs, depth))
    }

    fn all(&self, a: &[TypeSignature], b: &[TypeSignature], depth: usize) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.types(a, b, depth))
    }

    fn modifier(&self, a: &SignatureModifier, b: &SignatureModifier, depth: usize) -> bool {
        self.type_def_or_ref(&a.modifier, &b.modifier, depth) && self.types(&a.base, &b.base, depth)
    }

    fn types(&self, a: &TypeSignature, b: &TypeSignature, depth: usize) -> bool {
        let Some(depth) = depth.checked_sub(1) else {
            return false;
        };

        let ignore_modifiers = self.options.contains(SigComparerOptions::IGNORE_MODIFIERS);
        let a = if ignore_modifiers { strip_modifiers(a) } else { a };
        let b = if ignore_modifiers { strip_modifiers(b) } else { b };

        match (a, b) {
            (TypeSignature::Ptr(a), TypeSignature::Ptr(b))
            | (TypeSignature::ByRef(a), TypeSignature::ByRef(b))
            | (TypeSignature::SzArray(a), TypeSignature::SzArray(b))
            | (TypeSignature::Pinned(a), TypeSignature::Pinned(b)) => self.types(a, b, depth),
            (TypeSignature::ValueType(a), TypeSignature::ValueType(b))
            | (TypeSignature::Class(a), TypeSignature::Class(b)) => {
                self.type_def_or_ref(a, b, depth)
            }
            (TypeSignature::GenericParamType(a), TypeSignature::GenericParamType(b))
            | (TypeSignature::GenericParamMethod(a), TypeSignature::GenericParamMethod(b)) => {
                a == b
            }
            (TypeSignature::Array(a), TypeSignature::Array(b)) => {
                a.rank == b.rank
                    && a.dimensions == b.dimensions
                    && self.types(&a.base, &b.base, depth)
            }
            (
                TypeSignature::GenericInst(base_a, args_a),
                TypeSignature::GenericInst(base_b, args_b),
            ) => self.types(base_a, base_b, depth) && self.all(args_a, args_b, depth),
            (TypeSignature::FnPtr(a), TypeSignature::FnPtr(b)) => self.method_sig(a, b, depth),
            (TypeSignature::ModifiedRequired(a), TypeSignature::ModifiedRequired(b))
            | (TypeSignature::ModifiedOptional(a), TypeSignature::ModifiedOptional(b)) => {
                self.modifier(a, b, depth)
            }
            (TypeSignature::ValueArray(a, size_a), TypeSignature::ValueArray(b, size_b))
            | (TypeSignature::Module(a, size_a), TypeSignature::Module(b, size_b)) => {
                size_a == size_b && self.types(a, b, depth)
            }
            _ => std::mem::discriminant(a) == std::mem::discriminant(b) && is_leaf(a),
        }
    }
}

fn strip_modifiers(mut signature: &TypeSignature) -> &TypeSignature {
    for _ in 0..MAX_RECURSION_DEPTH {
        match signature {
            TypeSignature::ModifiedRequired(modifier)
            | TypeSignature::ModifiedOptional(modifier) => {
                signature = &modifier.base;
            }
            _ => break,
        }
    }
    signature
}

fn is_leaf(signature: &TypeSignature) -> bool {
    matches!(
        signature,
        TypeSignature::Unknown
            | TypeSignature::Void
            | TypeSignature::Boolean
            | TypeSignature::Char
            | TypeSignature::I1
            | TypeSignature::U1
            | TypeSignature::I2
            | TypeSignature::U2
            | TypeSignature::I4
            | TypeSignature::U4
            | TypeSignature::I8
            | TypeSignature::U8
            | TypeSignature::R4
            | TypeSignature::R8
            | TypeSignature::String
            | TypeSignature::TypedByRef
            | TypeSignature::I
            | TypeSignature::U
            | TypeSignature::Object
            | TypeSignature::Internal
            | TypeSignature::Sentinel
    )
}

/// The levels of a definition or reference, outermost first. `None` for specifications and for
/// nesting that does not end within the recursion bound.
fn type_path(ty: &TypeDefOrRef) -> Option<TypePath> {
    let mut path = Vec::new();
    match ty {
        TypeDefOrRef::TypeDef(def) => {
            path.push((def.namespace(), def.name()));
            let mut current = def.declaring_type();
            for _ in 0..MAX_RECURSION_DEPTH {
                let Some(enclosing) = current else {
                    path.reverse();
                    return Some(path);
                };
                path.push((enclosing.namespace(), enclosing.name()));
                current = enclosing.declaring_type();
            }
            None
        }
        TypeDefOrRef::TypeRef(reference) => Some(
            reference
                .nesting_chain()?
                .iter()
                .map(|level| (level.namespace(), level.name()))
                .collect(),
        ),
        TypeDefOrRef::TypeSpec(_) => None,
    }
}

/// The simple name of the assembly a type lives in, the module name when the module belongs to
/// no assembly
fn scope_name(ty: &TypeDefOrRef) -> Option<String> {
    fn module_scope(module: &Module) -> String {
        match module.assembly() {
            Some(assembly) => assembly.name(),
            None => module.name().to_string_lossy(),
        }
    }

    match ty {
        TypeDefOrRef::TypeDef(def) => def.module().map(|module| module_scope(&module)),
        TypeDefOrRef::TypeRef(reference) => match reference.non_nested()?.resolution_scope()? {
            ResolutionScope::AssemblyRef(assembly_ref) => Some(assembly_ref.name.to_string_lossy()),
            ResolutionScope::Module(module) => module.upgrade().map(|module| module_scope(&module)),
            ResolutionScope::ModuleRef(_) => reference.module().map(|module| module_scope(&module)),
            ResolutionScope::TypeRef(_) => None,
        },
        TypeDefOrRef::TypeSpec(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            identity::{AssemblyIdentity, AssemblyVersion},
            signatures::SignatureArray,
            tables::{AssemblyRef, TypeDef, TypeRef, TypeSpec},
        },
        test::widget_module,
    };

    fn system_ref(assembly: &str) -> ResolutionScope {
        ResolutionScope::AssemblyRef(AssemblyRef::new(
            &AssemblyIdentity::new(assembly, AssemblyVersion::new(4, 0, 0, 0), None, None),
            0,
        ))
    }

    #[test]
    fn reference_matches_definition_by_name() {
        let module = widget_module();
        let widget = module.find_by_name("Demo", "Widget").unwrap();
        let reference = TypeRef::new(&module, "Demo", "Widget", Some(system_ref("Other")));

        let comparer = SigComparer::default();
        assert!(comparer.equals_type(&widget.clone().into(), &reference.clone().into()));

        let scoped = SigComparer::new(SigComparerOptions::COMPARE_TYPE_SCOPE);
        assert!(!scoped.equals_type(&widget.into(), &reference.into()));
    }

    #[test]
    fn enclosing_chain_takes_part() {
        let module = widget_module();
        let widget = module.find_by_name("Demo", "Widget").unwrap();
        let part = widget.find_nested("Part").unwrap();

        let outer = TypeRef::new(&module, "Demo", "Widget", Some(system_ref("Widgets")));
        let nested = TypeRef::new(&module, "", "Part", Some(ResolutionScope::TypeRef(outer)));
        let flat = TypeRef::new(&module, "", "Part", Some(system_ref("Widgets")));

        let comparer = SigComparer::default();
        assert!(comparer.equals_type(&part.clone().into(), &nested.into()));
        assert!(!comparer.equals_type(&part.into(), &flat.into()));
    }

    #[test]
    fn signatures_compare_structurally() {
        let module = widget_module();
        let widget = module.find_by_name("Demo", "Widget").unwrap();
        let reference = TypeRef::new(&module, "Demo", "Widget", Some(system_ref("Widgets")));

        let by_def = TypeSignature::SzArray(Box::new(TypeSignature::Class(widget.into())));
        let by_ref = TypeSignature::SzArray(Box::new(TypeSignature::Class(reference.into())));
        let comparer = SigComparer::default();
        assert!(comparer.equals_type_sig(&by_def, &by_ref));
        let object_array = TypeSignature::SzArray(Box::new(TypeSignature::Object));
        assert!(!comparer.equals_type_sig(&by_def, &object_array));

        let array = |rank| {
            TypeSignature::Array(SignatureArray {
                base: Box::new(TypeSignature::I4),
                rank,
                dimensions: Vec::new(),
            })
        };
        assert!(comparer.equals_type_sig(&array(2), &array(2)));
        assert!(!comparer.equals_type_sig(&array(2), &array(3)));
    }

    #[test]
    fn varargs_only_compared_on_request() {
        let definition = SignatureMethod {
            vararg: true,
            return_type: TypeSignature::Void,
            params: vec![TypeSignature::String],
            ..SignatureMethod::default()
        };
        let call_site = SignatureMethod {
            varargs: vec![TypeSignature::I4],
            ..definition.clone()
        };

        assert!(SigComparer::default().equals_method_sig(&definition, &call_site));
        assert!(!SigComparer::new(SigComparerOptions::COMPARE_VARARGS)
            .equals_method_sig(&definition, &call_site));
    }

    #[test]
    fn modifiers_can_be_ignored() {
        let modifier = TypeDef::new("System.Runtime.CompilerServices", "IsVolatile", 0);
        let modified = TypeSignature::ModifiedRequired(SignatureModifier {
            modifier: modifier.into(),
            base: Box::new(TypeSignature::I4),
        });

        assert!(!SigComparer::default().equals_type_sig(&modified, &TypeSignature::I4));
        assert!(SigComparer::new(SigComparerOptions::IGNORE_MODIFIERS)
            .equals_type_sig(&modified, &TypeSignature::I4));
    }

    #[test]
    fn self_referential_specs_terminate() {
        let spec = TypeSpec::new(TypeSignature::Object);
        spec.set_type_sig(Some(TypeSignature::SzArray(Box::new(TypeSignature::Class(
            spec.clone().into(),
        )))));
        let other = TypeSpec::new(TypeSignature::Object);
        other.set_type_sig(Some(TypeSignature::SzArray(Box::new(TypeSignature::Class(
            other.clone().into(),
        )))));

        assert!(!SigComparer::default().equals_type(&spec.into(), &other.into()));
    }
}
