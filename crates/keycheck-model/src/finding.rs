//! Data-quality findings and reporting sinks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file_type::FileType;
use crate::key::CompositeKey;

/// The four data-quality finding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    /// Duplicate primary key within one file type's accumulated files.
    Uniqueness,
    /// Required foreign key with no matching parent primary key.
    Relation,
    /// Non-sentinel optional foreign key with no matching parent primary key.
    OptionalRelation,
    /// Parent primary key never referenced by any expected child row.
    Surjection,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Uniqueness => "UNIQUENESS",
            FindingKind::Relation => "RELATION",
            FindingKind::OptionalRelation => "OPTIONAL_RELATION",
            FindingKind::Surjection => "SURJECTION",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured data-quality finding.
///
/// `line_number` is absent for surjection findings, which are attributed to
/// the parent file that carried the unreferenced key rather than to a row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    pub file_type: FileType,
    pub file_name: String,
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<CompositeKey>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub related_file_type: Option<FileType>,
}

impl Finding {
    pub fn uniqueness(
        file_type: FileType,
        file_name: &str,
        line_number: u64,
        key: CompositeKey,
    ) -> Self {
        Self {
            file_type,
            file_name: file_name.to_string(),
            kind: FindingKind::Uniqueness,
            line_number: Some(line_number),
            key: Some(key),
            related_file_type: None,
        }
    }

    pub fn relation(
        file_type: FileType,
        file_name: &str,
        line_number: u64,
        key: CompositeKey,
        parent: FileType,
    ) -> Self {
        Self {
            file_type,
            file_name: file_name.to_string(),
            kind: FindingKind::Relation,
            line_number: Some(line_number),
            key: Some(key),
            related_file_type: Some(parent),
        }
    }

    pub fn optional_relation(
        file_type: FileType,
        file_name: &str,
        line_number: u64,
        key: CompositeKey,
        parent: FileType,
    ) -> Self {
        Self {
            file_type,
            file_name: file_name.to_string(),
            kind: FindingKind::OptionalRelation,
            line_number: Some(line_number),
            key: Some(key),
            related_file_type: Some(parent),
        }
    }

    pub fn surjection(
        parent_type: FileType,
        file_name: &str,
        key: CompositeKey,
        child_type: FileType,
    ) -> Self {
        Self {
            file_type: parent_type,
            file_name: file_name.to_string(),
            kind: FindingKind::Surjection,
            line_number: None,
            key: Some(key),
            related_file_type: Some(child_type),
        }
    }
}

/// Per-kind finding counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub uniqueness: u64,
    pub relation: u64,
    pub optional_relation: u64,
    pub surjection: u64,
}

impl FindingCounts {
    pub fn record(&mut self, kind: FindingKind) {
        match kind {
            FindingKind::Uniqueness => self.uniqueness += 1,
            FindingKind::Relation => self.relation += 1,
            FindingKind::OptionalRelation => self.optional_relation += 1,
            FindingKind::Surjection => self.surjection += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.uniqueness + self.relation + self.optional_relation + self.surjection
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Write-only sink for findings.
///
/// The engine only appends; whether findings end up in memory, a file, or a
/// downstream service is the sink's concern. Findings form an
/// order-insensitive multiset: identical inputs reproduce identical findings.
pub trait Reporter {
    fn report(&mut self, finding: Finding);
}

/// Reporter that accumulates findings in memory with per-kind counters.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    findings: Vec<Finding>,
    counts: FindingCounts,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn counts(&self) -> FindingCounts {
        self.counts
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, finding: Finding) {
        self.counts.record(finding.kind);
        self.findings.push(finding);
    }
}

#[cfg(test)]
mod tests {
    use super::{Finding, FindingKind, MemoryReporter, Reporter};
    use crate::file_type::FileType;
    use crate::key::{CompositeKey, KeyInterner};

    #[test]
    fn memory_reporter_counts_kinds() {
        let mut interner = KeyInterner::new();
        let key = CompositeKey::from_values(&["D1"], &mut interner);
        let mut reporter = MemoryReporter::new();
        reporter.report(Finding::uniqueness(
            FileType::new("DONOR"),
            "donor.txt",
            3,
            key.clone(),
        ));
        reporter.report(Finding::relation(
            FileType::new("SPECIMEN"),
            "specimen.txt",
            2,
            key,
            FileType::new("DONOR"),
        ));
        assert_eq!(reporter.counts().uniqueness, 1);
        assert_eq!(reporter.counts().relation, 1);
        assert_eq!(reporter.counts().total(), 2);
        assert!(!reporter.is_clean());
    }

    #[test]
    fn finding_serializes_with_kind_codes() {
        let mut interner = KeyInterner::new();
        let key = CompositeKey::from_values(&["S1"], &mut interner);
        let finding = Finding::surjection(
            FileType::new("SPECIMEN"),
            "specimen.txt",
            key,
            FileType::new("SAMPLE"),
        );
        let json = serde_json::to_value(&finding).expect("serialize");
        assert_eq!(json["kind"], "SURJECTION");
        assert_eq!(json["file_type"], "SPECIMEN");
        assert_eq!(json["related_file_type"], "SAMPLE");
        assert!(json.get("line_number").is_none());

        let round: Finding = serde_json::from_value(json).expect("deserialize");
        assert_eq!(round, finding);
    }

    #[test]
    fn kind_display_matches_report_codes() {
        assert_eq!(FindingKind::OptionalRelation.to_string(), "OPTIONAL_RELATION");
        assert_eq!(FindingKind::Uniqueness.to_string(), "UNIQUENESS");
    }
}
