//! Table identifiers and coded indices shared by all tables.

mod codedindex;
mod tableid;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tableid::TableId;
