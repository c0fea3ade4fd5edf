use crate::metadata::{
    tables::{MethodDefOrRef, TableId},
    token::Token,
};

/// The body of a method, kept as opaque code bytes.
///
/// Instructions are not decoded; hosts that need them hand `code` to an IL decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Locals are zero-initialized on entry
    pub init_locals: bool,
    /// `StandAloneSig` token of the local variable signature, null when there are no locals
    pub local_var_sig_token: Token,
    /// The IL stream, exception clauses excluded
    pub code: Vec<u8>,
}

impl Default for MethodBody {
    fn default() -> Self {
        MethodBody {
            max_stack: 8,
            init_locals: false,
            local_var_sig_token: Token::from_parts(TableId::StandAloneSig, 0),
            code: Vec::new(),
        }
    }
}

impl MethodBody {
    /// Size of the IL stream in bytes
    #[must_use]
    pub fn code_size(&self) -> usize {
        self.code.len()
    }

    /// Returns `true` if the body declares locals
    #[must_use]
    pub fn has_locals(&self) -> bool {
        self.local_var_sig_token.row() != 0
    }
}

/// An explicit override: `body` implements the virtual method `declaration`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOverride {
    /// The implementing method
    pub body: MethodDefOrRef,
    /// The overridden method
    pub declaration: MethodDefOrRef,
}
