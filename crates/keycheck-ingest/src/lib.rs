pub mod enumerate;
pub mod error;
pub mod row_source;

pub use enumerate::{enumerate_submission, list_submission_files};
pub use error::{IngestError, Result};
pub use row_source::{Row, RowReader};
