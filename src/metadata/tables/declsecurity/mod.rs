//! `DeclSecurity` table: declarative security attached to types, methods and assemblies.
//!
//! The permission set blob is kept verbatim, in either the legacy XML or the binary format.

use std::sync::Arc;

use strum::{Display, EnumIter, IntoEnumIterator};

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;

/// A vector that holds a list of `DeclSecurity`
pub type DeclSecurityList = Arc<boxcar::Vec<DeclSecurityRc>>;
/// A reference to a `DeclSecurity`
pub type DeclSecurityRc = Arc<DeclSecurity>;

/// The action a permission set is declared for, ECMA-335 §II.22.11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u16)]
pub enum SecurityAction {
    /// Refuse demands for the permission
    Deny = 0x0001,
    /// Every caller on the stack must hold the permission
    Demand = 0x0002,
    /// Satisfy demands for the permission without further checks
    Assert = 0x0003,
    /// Non-CAS demand against the current assembly
    NonCasDemand = 0x0004,
    /// The immediate caller must hold the permission
    LinkDemand = 0x0005,
    /// Derived types and overriding methods must hold the permission
    InheritanceDemand = 0x0006,
    /// Minimum permissions required to run
    RequestMinimum = 0x0007,
    /// Optional permissions
    RequestOptional = 0x0008,
    /// Permissions that must not be granted
    RequestRefuse = 0x0009,
    /// Reserved, prejitting
    PrejitGrant = 0x000A,
    /// Reserved, prejitting
    PrejitDeny = 0x000B,
    /// Non-CAS link demand
    NonCasLinkDemand = 0x000C,
    /// Non-CAS inheritance demand
    NonCasInheritance = 0x000D,
    /// Grant only the listed permissions
    PermitOnly = 0x000E,
}

impl SecurityAction {
    /// The action encoded as `value`, `None` for values outside the defined range
    #[must_use]
    pub fn from_u16(value: u16) -> Option<SecurityAction> {
        SecurityAction::iter().find(|action| *action as u16 == value)
    }
}
