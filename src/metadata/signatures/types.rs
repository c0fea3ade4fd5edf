use std::fmt;

use crate::metadata::{entity::MetadataEntity, tables::TypeDefOrRef};

/// A type as it appears inside a signature
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSignature {
    /// A node the backing store could not decode
    #[default]
    Unknown,
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `sbyte`
    I1,
    /// `byte`
    U1,
    /// `short`
    I2,
    /// `ushort`
    U2,
    /// `int`
    I4,
    /// `uint`
    U4,
    /// `long`
    I8,
    /// `ulong`
    U8,
    /// `float`
    R4,
    /// `double`
    R8,
    /// `string`
    String,
    /// `TypedReference`
    TypedByRef,
    /// `nint`
    I,
    /// `nuint`
    U,
    /// `object`
    Object,
    /// An unmanaged pointer to the element type
    Ptr(Box<TypeSignature>),
    /// A managed reference to the element type
    ByRef(Box<TypeSignature>),
    /// A value type
    ValueType(TypeDefOrRef),
    /// A reference type
    Class(TypeDefOrRef),
    /// A generic parameter of the enclosing type (`!n`)
    GenericParamType(u32),
    /// A generic parameter of the enclosing method (`!!n`)
    GenericParamMethod(u32),
    /// A general array
    Array(SignatureArray),
    /// A single-dimensional, zero-based array
    SzArray(Box<TypeSignature>),
    /// A generic instantiation: the generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// A function pointer
    FnPtr(Box<SignatureMethod>),
    /// A required custom modifier applied to the next type
    ModifiedRequired(SignatureModifier),
    /// An optional custom modifier applied to the next type
    ModifiedOptional(SignatureModifier),
    /// A pinned local
    Pinned(Box<TypeSignature>),
    /// A fixed-size inline array of the element type
    ValueArray(Box<TypeSignature>, u32),
    /// A module-scoped type, tagged with the module index
    Module(Box<TypeSignature>, u32),
    /// A runtime-internal type without components
    Internal,
    /// The marker separating fixed from variable arguments at a call site
    Sentinel,
}

/// A custom modifier and the type it applies to
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureModifier {
    /// The modifier type, e.g. `IsVolatile`
    pub modifier: TypeDefOrRef,
    /// The modified type
    pub base: Box<TypeSignature>,
}

/// A general array
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureArray {
    /// Element type
    pub base: Box<TypeSignature>,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes and lower bounds, as far as specified
    pub dimensions: Vec<ArrayDimensions>,
}

/// Size and lower bound of one array dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayDimensions {
    /// Number of elements, if specified
    pub size: Option<u32>,
    /// Lower bound, if specified
    pub lower_bound: Option<i32>,
}

/// A method, or function pointer, signature
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SignatureMethod {
    /// Instance method, `this` is passed implicitly
    pub has_this: bool,
    /// `this` is passed as the first explicit parameter
    pub explicit_this: bool,
    /// Variable argument list
    pub vararg: bool,
    /// Unmanaged C calling convention
    pub cdecl: bool,
    /// Unmanaged standard calling convention
    pub stdcall: bool,
    /// Unmanaged `this` calling convention
    pub thiscall: bool,
    /// Unmanaged fast calling convention
    pub fastcall: bool,
    /// Number of generic parameters, 0 for non-generic methods
    pub param_count_generic: u32,
    /// Return type
    pub return_type: TypeSignature,
    /// Fixed parameters
    pub params: Vec<TypeSignature>,
    /// Parameters after the sentinel, only present on call-site signatures
    pub varargs: Vec<TypeSignature>,
}

/// A field signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureField {
    /// The field type
    pub base: TypeSignature,
}

/// A property signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureProperty {
    /// Instance property
    pub has_this: bool,
    /// The property type
    pub base: TypeSignature,
    /// Indexer parameters
    pub params: Vec<TypeSignature>,
}

/// A local variable signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureLocalVariables {
    /// The locals, in slot order
    pub locals: Vec<TypeSignature>,
}

/// The generic arguments of a method instantiation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureMethodSpec {
    /// The generic arguments
    pub generic_args: Vec<TypeSignature>,
}

/// Any signature stored in the blob heap
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    /// Field signature
    Field(SignatureField),
    /// Method signature
    Method(SignatureMethod),
    /// Property signature
    Property(SignatureProperty),
    /// Local variable signature
    LocalVar(SignatureLocalVariables),
    /// Method instantiation signature
    MethodSpec(SignatureMethodSpec),
}

impl Signature {
    /// The method signature, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&SignatureMethod> {
        match self {
            Signature::Method(method) => Some(method),
            _ => None,
        }
    }

    /// The field signature, if this is one
    #[must_use]
    pub fn as_field(&self) -> Option<&SignatureField> {
        match self {
            Signature::Field(field) => Some(field),
            _ => None,
        }
    }

    /// The property signature, if this is one
    #[must_use]
    pub fn as_property(&self) -> Option<&SignatureProperty> {
        match self {
            Signature::Property(property) => Some(property),
            _ => None,
        }
    }

    /// The method instantiation, if this is one
    #[must_use]
    pub fn as_method_spec(&self) -> Option<&SignatureMethodSpec> {
        match self {
            Signature::MethodSpec(spec) => Some(spec),
            _ => None,
        }
    }
}

impl TypeSignature {
    /// The single nested type of a composite node
    #[must_use]
    pub fn next(&self) -> Option<&TypeSignature> {
        match self {
            TypeSignature::Ptr(next)
            | TypeSignature::ByRef(next)
            | TypeSignature::SzArray(next)
            | TypeSignature::Pinned(next)
            | TypeSignature::ValueArray(next, _)
            | TypeSignature::Module(next, _)
            | TypeSignature::GenericInst(next, _) => Some(next),
            TypeSignature::Array(array) => Some(&array.base),
            TypeSignature::ModifiedRequired(modifier) | TypeSignature::ModifiedOptional(modifier) => {
                Some(&modifier.base)
            }
            _ => None,
        }
    }

    /// The type referenced by a `Class` or `ValueType` node
    #[must_use]
    pub fn type_def_or_ref(&self) -> Option<&TypeDefOrRef> {
        match self {
            TypeSignature::Class(reference) | TypeSignature::ValueType(reference) => Some(reference),
            _ => None,
        }
    }

    /// Returns `true` for `!n` and `!!n`
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        matches!(
            self,
            TypeSignature::GenericParamType(_) | TypeSignature::GenericParamMethod(_)
        )
    }

    /// Returns `true` for nodes without components
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeSignature::Void
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
        )
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Unknown => write!(f, "<unknown>"),
            TypeSignature::Void => write!(f, "System.Void"),
            TypeSignature::Boolean => write!(f, "System.Boolean"),
            TypeSignature::Char => write!(f, "System.Char"),
            TypeSignature::I1 => write!(f, "System.SByte"),
            TypeSignature::U1 => write!(f, "System.Byte"),
            TypeSignature::I2 => write!(f, "System.Int16"),
            TypeSignature::U2 => write!(f, "System.UInt16"),
            TypeSignature::I4 => write!(f, "System.Int32"),
            TypeSignature::U4 => write!(f, "System.UInt32"),
            TypeSignature::I8 => write!(f, "System.Int64"),
            TypeSignature::U8 => write!(f, "System.UInt64"),
            TypeSignature::R4 => write!(f, "System.Single"),
            TypeSignature::R8 => write!(f, "System.Double"),
            TypeSignature::String => write!(f, "System.String"),
            TypeSignature::TypedByRef => write!(f, "System.TypedReference"),
            TypeSignature::I => write!(f, "System.IntPtr"),
            TypeSignature::U => write!(f, "System.UIntPtr"),
            TypeSignature::Object => write!(f, "System.Object"),
            TypeSignature::Ptr(next) => write!(f, "{next}*"),
            TypeSignature::ByRef(next) => write!(f, "{next}&"),
            TypeSignature::ValueType(reference) | TypeSignature::Class(reference) => match reference {
                // specifications may refer back to themselves
                TypeDefOrRef::TypeSpec(spec) => write!(f, "{}", spec.token()),
                _ => write!(f, "{}", reference.full_name()),
            },
            TypeSignature::GenericParamType(index) => write!(f, "!{index}"),
            TypeSignature::GenericParamMethod(index) => write!(f, "!!{index}"),
            TypeSignature::Array(array) => {
                write!(f, "{}[{}]", array.base, ",".repeat(array.rank.saturating_sub(1) as usize))
            }
            TypeSignature::SzArray(next) => write!(f, "{next}[]"),
            TypeSignature::GenericInst(generic, args) => {
                write!(f, "{generic}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeSignature::FnPtr(_) => write!(f, "method*"),
            TypeSignature::ModifiedRequired(modifier) => {
                write!(f, "{} modreq({})", modifier.base, modifier.modifier.full_name())
            }
            TypeSignature::ModifiedOptional(modifier) => {
                write!(f, "{} modopt({})", modifier.base, modifier.modifier.full_name())
            }
            TypeSignature::Pinned(next) => write!(f, "{next} pinned"),
            TypeSignature::ValueArray(next, size) => write!(f, "{next}[{size}]"),
            TypeSignature::Module(next, _) => write!(f, "{next}"),
            TypeSignature::Internal => write!(f, "<internal>"),
            TypeSignature::Sentinel => write!(f, "..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_composites() {
        let sig = TypeSignature::Ptr(Box::new(TypeSignature::SzArray(Box::new(
            TypeSignature::I4,
        ))));

        let inner = sig.next().unwrap();
        assert_eq!(inner, &TypeSignature::SzArray(Box::new(TypeSignature::I4)));
        assert_eq!(inner.next().unwrap(), &TypeSignature::I4);
        assert!(TypeSignature::I4.next().is_none());
    }

    #[test]
    fn display() {
        let sig = TypeSignature::ByRef(Box::new(TypeSignature::Array(SignatureArray {
            base: Box::new(TypeSignature::GenericParamMethod(0)),
            rank: 2,
            dimensions: vec![],
        })));
        assert_eq!(sig.to_string(), "!!0[,]&");
    }

    #[test]
    fn classification() {
        assert!(TypeSignature::GenericParamType(1).is_generic_parameter());
        assert!(!TypeSignature::Object.is_generic_parameter());
        assert!(TypeSignature::Object.is_primitive());
        assert!(!TypeSignature::Sentinel.is_primitive());
    }

    #[test]
    fn signature_accessors() {
        let sig = Signature::Field(SignatureField {
            base: TypeSignature::String,
        });
        assert!(sig.as_field().is_some());
        assert!(sig.as_method().is_none());
        assert!(sig.as_property().is_none());
    }
}
