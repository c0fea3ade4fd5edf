//! Metadata tokens.
//!
//! A [`Token`] addresses one row of one metadata table: the high byte carries the [`TableId`],
//! the low 24 bits the 1-based row id (rid). A rid of 0 means the entity has not been placed in
//! a table yet, which is the case for everything constructed in memory.
//!
//! # Examples
//!
//! ```rust
//! use cilgraph::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::from_parts(TableId::MethodDef, 5);
//! assert_eq!(token.value(), 0x0600_0005);
//! assert_eq!(token.table_id(), Some(TableId::MethodDef));
//! assert_eq!(token.row(), 5);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableId;

/// A metadata token, a (table, rid) pair
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Token(pub u32);

impl Token {
    /// Create a new token from its raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from a table and a rid. Rids above 24 bits are truncated.
    #[must_use]
    pub fn from_parts(table: TableId, rid: u32) -> Self {
        Token(((table as u32) << 24) | (rid & 0x00FF_FFFF))
    }

    /// The raw value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table byte
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table, if the table byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_byte(self.table())
    }

    /// The 1-based row id
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns `true` for the null token
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
