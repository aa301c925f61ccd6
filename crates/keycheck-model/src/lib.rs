pub mod fault;
pub mod file_type;
pub mod finding;
pub mod key;

pub use fault::{Fault, KeyRole, Result};
pub use file_type::FileType;
pub use finding::{Finding, FindingCounts, FindingKind, MemoryReporter, Reporter};
pub use key::{CompositeKey, IndexOutOfRange, KeyInterner};
