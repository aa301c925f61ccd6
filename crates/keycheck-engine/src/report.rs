//! JSON report payload for a completed run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use keycheck_model::{Finding, FindingCounts};

const REPORT_SCHEMA: &str = "keycheck.key-validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// The persisted report: versioned envelope around the findings multiset.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportPayload {
    pub schema: String,
    pub schema_version: u32,
    pub generated_at: String,
    pub submission: String,
    pub counts: FindingCounts,
    pub findings: Vec<Finding>,
}

/// Writes the findings of one run as a versioned JSON report.
pub fn write_report_json(
    output_path: &Path,
    submission: &str,
    findings: &[Finding],
) -> Result<PathBuf> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }

    let mut counts = FindingCounts::default();
    for finding in findings {
        counts.record(finding.kind);
    }

    let payload = ReportPayload {
        schema: REPORT_SCHEMA.to_string(),
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        submission: submission.to_string(),
        counts,
        findings: findings.to_vec(),
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize report payload")?;
    fs::write(output_path, format!("{json}\n"))
        .with_context(|| format!("write report {}", output_path.display()))?;
    Ok(output_path.to_path_buf())
}
