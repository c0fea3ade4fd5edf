use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most lookups in this crate never fail with an error: an unresolved reference is reported as
/// `None`, and guards that bound recursion over malformed input return a safe default. The
/// variants below are reserved for caller misuse and for backing stores that are missing rows
/// the object model cannot do without.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - The backing store lacks mandatory data (e.g. the `Module` row)
/// - [`Error::RowNotFound`] - A typed accessor was asked for a row that does not exist
///
/// ## Caller Errors
/// - [`Error::InvalidOperation`] - An ownership invariant would be violated
/// - [`Error::MissingCollaborator`] - A required collaborator was not supplied at construction
///
/// # Examples
///
/// ```rust
/// use cilgraph::{Error, metadata::tables::{MethodDef, TypeDef}};
///
/// let first = TypeDef::new("Demo", "First", 0);
/// let second = TypeDef::new("Demo", "Second", 0);
/// let method = MethodDef::new("Run", 0, None);
///
/// first.methods().add(method.clone()).unwrap();
/// match second.methods().add(method) {
///     Err(Error::InvalidOperation(message)) => println!("rejected: {message}"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The backing store is damaged and could not be turned into an object graph.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
    /// The requested row does not exist in the backing store.
    ///
    /// The associated [`Token`] identifies the row that was asked for.
    #[error("Row not found - {0}")]
    RowNotFound(Token),
    /// The operation would break the single-owner invariant of an ownership collection.
    ///
    /// Raised when a child that already belongs to a different container is added directly.
    /// Detach the child first (remove it from its current container, or assign `None` as its
    /// owner) and retry.
    #[error("Invalid operation - {0}")]
    InvalidOperation(String),
    /// A collaborator required by the component under construction was not supplied.
    #[error("Missing collaborator - {0}")]
    MissingCollaborator(&'static str),
    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

/// The generic Result type used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;
