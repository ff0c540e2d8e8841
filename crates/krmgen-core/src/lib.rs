pub mod document;
pub mod error;
pub mod report;

pub use document::{Document, DocumentKey, Metadata};
pub use error::{CoreError, ErrorCategory, Result};
pub use report::{MergeRecord, Outcome, Reporter, Severity};
