//! `ImplMap` table: P/Invoke mappings of methods to unmanaged entry points.

use std::sync::Arc;

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A reference to an `ImplMap`
pub type ImplMapRc = Arc<ImplMap>;

#[allow(non_snake_case)]
/// A subset of the P/Invoke attribute flags, ECMA-335 §II.23.1.8
pub mod PInvokeAttributes {
    /// Use the member name as specified
    pub const NO_MANGLE: u32 = 0x0001;
    /// Character set mask
    pub const CHAR_SET_MASK: u32 = 0x0006;
    /// Marshal strings as Unicode
    pub const CHAR_SET_UNICODE: u32 = 0x0004;
    /// The callee sets the last error
    pub const SUPPORTS_LAST_ERROR: u32 = 0x0040;
    /// Calling convention mask
    pub const CALL_CONV_MASK: u32 = 0x0700;
    /// Use the platform default calling convention
    pub const CALL_CONV_WINAPI: u32 = 0x0100;
}
