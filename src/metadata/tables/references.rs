//! Tagged unions over the entities a coded index can point to.
//!
//! Equality on every union is identity: two values are equal if they hold the very same entity.
//! Structural comparison by name lives in [`crate::metadata::resolver::SigComparer`].

use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::metadata::{
    entity::MetadataEntity,
    streams::Name,
    tables::{
        AssemblyRefRc, ExportedTypeRc, FieldRc, FileRc, MemberRefRc, MethodDef, MethodDefRc,
        Module, ModuleRc, ModuleRefRc, TypeDef, TypeDefRc, TypeRefRc, TypeSpecRc,
    },
    token::Token,
};

/// Identity equality for a union whose variants all hold an `Arc`
macro_rules! identity_eq {
    ($union:ident { $($variant:ident),+ }) => {
        impl PartialEq for $union {
            fn eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $(($union::$variant(a), $union::$variant(b)) => Arc::ptr_eq(a, b),)+
                    _ => false,
                }
            }
        }
    };
}

/// A `TypeDefOrRef` coded index target
#[derive(Clone)]
pub enum TypeDefOrRef {
    /// A type defined in this module
    TypeDef(TypeDefRc),
    /// A reference to a type defined elsewhere
    TypeRef(TypeRefRc),
    /// A type specification
    TypeSpec(TypeSpecRc),
}

impl TypeDefOrRef {
    /// The token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            TypeDefOrRef::TypeDef(def) => def.token(),
            TypeDefOrRef::TypeRef(reference) => reference.token(),
            TypeDefOrRef::TypeSpec(spec) => spec.token(),
        }
    }

    /// The simple name, empty for specifications
    #[must_use]
    pub fn name(&self) -> Name {
        match self {
            TypeDefOrRef::TypeDef(def) => def.name(),
            TypeDefOrRef::TypeRef(reference) => reference.name(),
            TypeDefOrRef::TypeSpec(_) => Name::empty(),
        }
    }

    /// The namespace, empty for specifications
    #[must_use]
    pub fn namespace(&self) -> Name {
        match self {
            TypeDefOrRef::TypeDef(def) => def.namespace(),
            TypeDefOrRef::TypeRef(reference) => reference.namespace(),
            TypeDefOrRef::TypeSpec(_) => Name::empty(),
        }
    }

    /// The full name, nested types separated by `/`
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeDefOrRef::TypeDef(def) => def.full_name(),
            TypeDefOrRef::TypeRef(reference) => reference.full_name(),
            TypeDefOrRef::TypeSpec(spec) => spec.full_name(),
        }
    }

    /// The definition, if this is one
    #[must_use]
    pub fn as_type_def(&self) -> Option<&TypeDefRc> {
        match self {
            TypeDefOrRef::TypeDef(def) => Some(def),
            _ => None,
        }
    }

    /// The reference, if this is one
    #[must_use]
    pub fn as_type_ref(&self) -> Option<&TypeRefRc> {
        match self {
            TypeDefOrRef::TypeRef(reference) => Some(reference),
            _ => None,
        }
    }

    /// The specification, if this is one
    #[must_use]
    pub fn as_type_spec(&self) -> Option<&TypeSpecRc> {
        match self {
            TypeDefOrRef::TypeSpec(spec) => Some(spec),
            _ => None,
        }
    }
}

identity_eq!(TypeDefOrRef { TypeDef, TypeRef, TypeSpec });

impl fmt::Debug for TypeDefOrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDefOrRef::TypeDef(def) => write!(f, "TypeDef({})", def.full_name()),
            TypeDefOrRef::TypeRef(reference) => write!(f, "TypeRef({})", reference.full_name()),
            TypeDefOrRef::TypeSpec(spec) => write!(f, "TypeSpec({})", spec.token()),
        }
    }
}

impl From<TypeDefRc> for TypeDefOrRef {
    fn from(value: TypeDefRc) -> Self {
        TypeDefOrRef::TypeDef(value)
    }
}

impl From<TypeRefRc> for TypeDefOrRef {
    fn from(value: TypeRefRc) -> Self {
        TypeDefOrRef::TypeRef(value)
    }
}

impl From<TypeSpecRc> for TypeDefOrRef {
    fn from(value: TypeSpecRc) -> Self {
        TypeDefOrRef::TypeSpec(value)
    }
}

/// The scope a type reference is resolved in
#[derive(Clone)]
pub enum ResolutionScope {
    /// A module of the current assembly; held weakly, modules own their references
    Module(Weak<Module>),
    /// A module of the current assembly, by name
    ModuleRef(ModuleRefRc),
    /// Another assembly
    AssemblyRef(AssemblyRefRc),
    /// The enclosing type of a nested type reference
    TypeRef(TypeRefRc),
}

impl ResolutionScope {
    /// Scope a reference to `module`
    #[must_use]
    pub fn module(module: &ModuleRc) -> Self {
        ResolutionScope::Module(Arc::downgrade(module))
    }

    /// The token of the scope
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            ResolutionScope::Module(module) => module
                .upgrade()
                .map_or(Token::new(0), |module| module.token()),
            ResolutionScope::ModuleRef(module_ref) => module_ref.token,
            ResolutionScope::AssemblyRef(assembly_ref) => assembly_ref.token,
            ResolutionScope::TypeRef(reference) => reference.token(),
        }
    }
}

impl PartialEq for ResolutionScope {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResolutionScope::Module(a), ResolutionScope::Module(b)) => Weak::ptr_eq(a, b),
            (ResolutionScope::ModuleRef(a), ResolutionScope::ModuleRef(b)) => Arc::ptr_eq(a, b),
            (ResolutionScope::AssemblyRef(a), ResolutionScope::AssemblyRef(b)) => Arc::ptr_eq(a, b),
            (ResolutionScope::TypeRef(a), ResolutionScope::TypeRef(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ResolutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionScope::Module(module) => match module.upgrade() {
                Some(module) => write!(f, "Module({})", module.name()),
                None => write!(f, "Module(<dropped>)"),
            },
            ResolutionScope::ModuleRef(module_ref) => write!(f, "ModuleRef({})", module_ref.name),
            ResolutionScope::AssemblyRef(assembly_ref) => {
                write!(f, "AssemblyRef({})", assembly_ref.name)
            }
            ResolutionScope::TypeRef(reference) => write!(f, "TypeRef({})", reference.full_name()),
        }
    }
}

/// The parent of a member reference
#[derive(Clone, Debug)]
pub enum MemberRefParent {
    /// A type of this module
    TypeDef(TypeDefRc),
    /// A type defined elsewhere
    TypeRef(TypeRefRc),
    /// A type specification, usually a generic instantiation
    TypeSpec(TypeSpecRc),
    /// The global type of the named module
    ModuleRef(ModuleRefRc),
    /// A vararg method definition, the reference describes a call site
    MethodDef(MethodDefRc),
}

identity_eq!(MemberRefParent { TypeDef, TypeRef, TypeSpec, ModuleRef, MethodDef });

/// A `MethodDefOrRef` coded index target
#[derive(Clone, Debug)]
pub enum MethodDefOrRef {
    /// A method of this module
    MethodDef(MethodDefRc),
    /// A reference to a method
    MemberRef(MemberRefRc),
}

identity_eq!(MethodDefOrRef { MethodDef, MemberRef });

impl MethodDefOrRef {
    /// The token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            MethodDefOrRef::MethodDef(method) => method.token(),
            MethodDefOrRef::MemberRef(member) => member.token(),
        }
    }

    /// The method name
    #[must_use]
    pub fn name(&self) -> Name {
        match self {
            MethodDefOrRef::MethodDef(method) => method.name(),
            MethodDefOrRef::MemberRef(member) => member.name(),
        }
    }
}

/// Where an exported type is implemented
#[derive(Clone, Debug)]
pub enum Implementation {
    /// Another module of this assembly
    File(FileRc),
    /// Another assembly, the type was forwarded
    AssemblyRef(AssemblyRefRc),
    /// The enclosing exported type of a nested exported type
    ExportedType(ExportedTypeRc),
}

identity_eq!(Implementation { File, AssemblyRef, ExportedType });

/// The owner of a generic parameter
#[derive(Clone, Debug)]
pub enum TypeOrMethodDef {
    /// A generic type
    TypeDef(TypeDefRc),
    /// A generic method
    MethodDef(MethodDefRc),
}

impl TypeOrMethodDef {
    /// Downgrade to a weak handle
    #[must_use]
    pub fn downgrade(&self) -> TypeOrMethodDefRef {
        match self {
            TypeOrMethodDef::TypeDef(def) => TypeOrMethodDefRef::TypeDef(Arc::downgrade(def)),
            TypeOrMethodDef::MethodDef(method) => {
                TypeOrMethodDefRef::MethodDef(Arc::downgrade(method))
            }
        }
    }

    /// The token of the owner
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            TypeOrMethodDef::TypeDef(def) => def.token(),
            TypeOrMethodDef::MethodDef(method) => method.token(),
        }
    }
}

identity_eq!(TypeOrMethodDef { TypeDef, MethodDef });

/// Weak handle to the owner of a generic parameter
#[derive(Clone, Debug)]
pub enum TypeOrMethodDefRef {
    /// A generic type
    TypeDef(Weak<TypeDef>),
    /// A generic method
    MethodDef(Weak<MethodDef>),
}

impl TypeOrMethodDefRef {
    /// Upgrade to a strong handle, `None` if the owner was dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeOrMethodDef> {
        match self {
            TypeOrMethodDefRef::TypeDef(def) => def.upgrade().map(TypeOrMethodDef::TypeDef),
            TypeOrMethodDefRef::MethodDef(method) => {
                method.upgrade().map(TypeOrMethodDef::MethodDef)
            }
        }
    }
}

/// A resolved member
#[derive(Clone, Debug)]
pub enum MemberDef {
    /// A method definition
    Method(MethodDefRc),
    /// A field definition
    Field(FieldRc),
}

identity_eq!(MemberDef { Method, Field });

impl MemberDef {
    /// The method, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodDefRc> {
        match self {
            MemberDef::Method(method) => Some(method),
            MemberDef::Field(_) => None,
        }
    }

    /// The field, if this is one
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldRc> {
        match self {
            MemberDef::Field(field) => Some(field),
            MemberDef::Method(_) => None,
        }
    }
}
