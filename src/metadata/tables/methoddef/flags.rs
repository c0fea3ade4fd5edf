use bitflags::bitflags;

/// Bitmask for `ACCESS` state extraction
pub const METHOD_ACCESS_MASK: u32 = 0x0007;
/// Bitmask for `VTABLE_LAYOUT` information extraction
pub const METHOD_VTABLE_LAYOUT_MASK: u32 = 0x0100;
/// Bitmask for `CODE_TYPE` extraction
pub const METHOD_IMPL_CODE_TYPE_MASK: u32 = 0x0003;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method access flags
    pub struct MethodAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// Extract access flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method can only be overridden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// The runtime provides special behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
        /// Implementation is forwarded through P/Invoke
        const PINVOKE_IMPL = 0x2000;
        /// Method has security associated with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method implementation code type flags
    pub struct MethodImplCodeType: u32 {
        /// Method impl is IL
        const IL = 0x0000;
        /// Method impl is native
        const NATIVE = 0x0001;
        /// Method impl is OPTIL
        const OPTIL = 0x0002;
        /// Method impl is provided by the runtime
        const RUNTIME = 0x0003;
    }
}

impl MethodImplCodeType {
    /// Extract code type from raw implementation flags
    #[must_use]
    pub fn from_impl_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_IMPL_CODE_TYPE_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_method_flags() {
        let flags = 0x0006 | 0x0010 | 0x0080;
        assert_eq!(
            MethodAccessFlags::from_method_flags(flags),
            MethodAccessFlags::PUBLIC
        );
        let modifiers = MethodModifiers::from_method_flags(flags);
        assert!(modifiers.contains(MethodModifiers::STATIC | MethodModifiers::HIDE_BY_SIG));
        assert!(!modifiers.contains(MethodModifiers::VIRTUAL));
        assert_eq!(
            MethodImplCodeType::from_impl_flags(0x0003),
            MethodImplCodeType::RUNTIME
        );
    }
}
