//! Generic parameter containment.
//!
//! A type or signature that contains `!n` or `!!n` is only meaningful inside a generic context;
//! it has to be instantiated before it can be compared with closed types or emitted outside that
//! context.
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::{signatures::TypeSignature, typesystem::GenericContainment};
//!
//! let analyzer = GenericContainment::default();
//! let open = TypeSignature::SzArray(Box::new(TypeSignature::GenericParamType(0)));
//! assert!(analyzer.type_sig(&open));
//! assert!(!analyzer.type_sig(&TypeSignature::SzArray(Box::new(TypeSignature::I4))));
//! ```

use crate::metadata::{
    signatures::{
        Signature, SignatureField, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
        SignatureProperty, TypeSignature,
    },
    tables::{
        ExportedType, GenericParamConstraint, MemberRef, MemberRefParent, MethodSpec, TypeDef,
        TypeDefOrRef, TypeRef, TypeSpec,
    },
    typesystem::MAX_RECURSION_DEPTH,
};

/// Decides whether types and signatures contain an open generic parameter.
///
/// Every step into a component consumes one unit of the depth budget. When the budget runs out
/// the component is reported as not containing, which is also the answer for self-referential
/// specification graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericContainment {
    max_depth: usize,
}

impl Default for GenericContainment {
    fn default() -> Self {
        GenericContainment {
            max_depth: MAX_RECURSION_DEPTH,
        }
    }
}

impl GenericContainment {
    /// An analyzer with a custom depth budget
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        GenericContainment { max_depth }
    }

    /// Definitions carry no parameter slots themselves
    #[must_use]
    pub fn type_def(&self, _type_def: &TypeDef) -> bool {
        false
    }

    /// References carry no parameter slots themselves
    #[must_use]
    pub fn type_ref(&self, _type_ref: &TypeRef) -> bool {
        false
    }

    /// Exported type records carry no parameter slots
    #[must_use]
    pub fn exported_type(&self, _exported: &ExportedType) -> bool {
        false
    }

    /// Returns `true` if the signature of `spec` contains a generic parameter
    #[must_use]
    pub fn type_spec(&self, spec: &TypeSpec) -> bool {
        self.spec(spec, self.max_depth)
    }

    /// Returns `true` if `reference` is a specification containing a generic parameter
    #[must_use]
    pub fn type_def_or_ref(&self, reference: &TypeDefOrRef) -> bool {
        self.reference(reference, self.max_depth)
    }

    /// Returns `true` if `signature` contains a generic parameter
    #[must_use]
    pub fn type_sig(&self, signature: &TypeSignature) -> bool {
        self.ty(signature, self.max_depth)
    }

    /// Returns `true` if any signature kind contains a generic parameter
    #[must_use]
    pub fn signature(&self, signature: &Signature) -> bool {
        match signature {
            Signature::Field(field) => self.field_sig(field),
            Signature::Method(method) => self.method_sig(method),
            Signature::Property(property) => self.property_sig(property),
            Signature::LocalVar(locals) => self.local_sig(locals),
            Signature::MethodSpec(spec) => self.method_spec_sig(spec),
        }
    }

    /// Returns `true` if the field type contains a generic parameter
    #[must_use]
    pub fn field_sig(&self, signature: &SignatureField) -> bool {
        self.field(signature, self.max_depth)
    }

    /// Returns `true` if the return type, a parameter or a vararg parameter contains a generic
    /// parameter
    #[must_use]
    pub fn method_sig(&self, signature: &SignatureMethod) -> bool {
        self.method(signature, self.max_depth)
    }

    /// Returns `true` if the property type or an indexer parameter contains a generic parameter
    #[must_use]
    pub fn property_sig(&self, signature: &SignatureProperty) -> bool {
        let Some(depth) = self.descend(self.max_depth) else {
            return false;
        };
        self.ty(&signature.base, depth) || self.any(&signature.params, depth)
    }

    /// Returns `true` if a local contains a generic parameter
    #[must_use]
    pub fn local_sig(&self, signature: &SignatureLocalVariables) -> bool {
        let Some(depth) = self.descend(self.max_depth) else {
            return false;
        };
        self.any(&signature.locals, depth)
    }

    /// Returns `true` if a generic argument contains a generic parameter
    #[must_use]
    pub fn method_spec_sig(&self, signature: &SignatureMethodSpec) -> bool {
        self.instantiation(signature, self.max_depth)
    }

    /// Always `true`: a method instantiation is built on a generic method definition, which
    /// declares generic parameters. Use [`Self::method_spec_sig`] to inspect the arguments.
    #[must_use]
    pub fn method_spec(&self, _spec: &MethodSpec) -> bool {
        true
    }

    /// Returns `true` if the signature or the parent of `member` contains a generic parameter
    #[must_use]
    pub fn member_ref(&self, member: &MemberRef) -> bool {
        if member
            .signature()
            .is_some_and(|signature| self.signature(&signature))
        {
            return true;
        }

        match member.class() {
            Some(MemberRefParent::TypeSpec(spec)) => self.type_spec(&spec),
            Some(MemberRefParent::MethodDef(method)) => method
                .signature()
                .is_some_and(|signature| self.method_sig(&signature)),
            _ => false,
        }
    }

    /// Returns `true` if the constraint type contains a generic parameter
    #[must_use]
    pub fn generic_param_constraint(&self, constraint: &GenericParamConstraint) -> bool {
        constraint
            .constraint
            .as_ref()
            .is_some_and(|reference| self.type_def_or_ref(reference))
    }

    /// One level deeper, `None` once the budget is spent
    fn descend(&self, depth: usize) -> Option<usize> {
        let remaining = depth.checked_sub(1);
        if remaining.is_none() {
            tracing::debug!(
                max_depth = self.max_depth,
                "generic containment hit its depth bound, assuming closed"
            );
        }
        remaining
    }

    fn spec(&self, spec: &TypeSpec, depth: usize) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };
        spec.type_sig()
            .is_some_and(|signature| self.ty(&signature, depth))
    }

    fn reference(&self, reference: &TypeDefOrRef, depth: usize) -> bool {
        match reference {
            TypeDefOrRef::TypeSpec(spec) => self.spec(spec, depth),
            TypeDefOrRef::TypeDef(_) | TypeDefOrRef::TypeRef(_) => false,
        }
    }

    fn any(&self, types: &[TypeSignature], depth: usize) -> bool {
        types.iter().any(|ty| self.ty(ty, depth))
    }

    fn field(&self, signature: &SignatureField, depth: usize) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };
        self.ty(&signature.base, depth)
    }

    fn method(&self, signature: &SignatureMethod, depth: usize) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };
        self.ty(&signature.return_type, depth)
            || self.any(&signature.params, depth)
            || self.any(&signature.varargs, depth)
    }

    fn instantiation(&self, signature: &SignatureMethodSpec, depth: usize) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };
        self.any(&signature.generic_args, depth)
    }

    fn ty(&self, signature: &TypeSignature, depth: usize) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };

        match signature {
            TypeSignature::GenericParamType(_) | TypeSignature::GenericParamMethod(_) => true,
            TypeSignature::Class(reference) | TypeSignature::ValueType(reference) => {
                self.reference(reference, depth)
            }
            TypeSignature::Ptr(next)
            | TypeSignature::ByRef(next)
            | TypeSignature::SzArray(next)
            | TypeSignature::Pinned(next)
            | TypeSignature::ValueArray(next, _)
            | TypeSignature::Module(next, _) => self.ty(next, depth),
            TypeSignature::Array(array) => self.ty(&array.base, depth),
            TypeSignature::ModifiedRequired(modifier) | TypeSignature::ModifiedOptional(modifier) => {
                self.reference(&modifier.modifier, depth) || self.ty(&modifier.base, depth)
            }
            TypeSignature::GenericInst(generic, args) => {
                self.ty(generic, depth) || self.any(args, depth)
            }
            TypeSignature::FnPtr(method) => self.method(method, depth),
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
            | TypeSignature::Sentinel => false,
        }
    }
}
