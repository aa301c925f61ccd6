pub mod index;
pub mod orchestrator;
pub mod report;
pub mod row_keys;
pub(crate) mod validator;

pub use index::{EncounteredForeignKeyIndex, PrimaryKeyIndex, ReferencedKeyIndex};
pub use orchestrator::{CancellationToken, ValidationOptions, ValidationSummary, validate};
pub use report::{ReportPayload, write_report_json};
pub use row_keys::{ForeignKey, RowKeys};
