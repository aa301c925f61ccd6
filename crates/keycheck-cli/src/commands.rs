//! Command implementations.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use keycheck_engine::{
    CancellationToken, ValidationOptions, ValidationSummary, validate, write_report_json,
};
use keycheck_ingest::enumerate_submission;
use keycheck_model::{FileType, MemoryReporter};
use keycheck_schema::{SchemaGraph, load_document};

use crate::cli::{DelimiterArg, TypesArgs, ValidateArgs};

pub struct ValidateOutcome {
    pub summary: ValidationSummary,
    pub reporter: MemoryReporter,
    pub report_path: Option<PathBuf>,
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateOutcome> {
    let document = load_document(&args.schema).context("load schema document")?;
    let graph = SchemaGraph::from_document(&document).context("build schema graph")?;
    let files_by_type =
        enumerate_submission(&args.submission, &graph).context("enumerate submission")?;
    let file_count: usize = files_by_type.values().map(Vec::len).sum();
    info!(
        types = files_by_type.len(),
        files = file_count,
        "submission enumerated"
    );

    let options = ValidationOptions {
        not_applicable: document.not_applicable.clone(),
        row_checks: !args.fast,
        uniqueness_exempt: args
            .skip_uniqueness
            .iter()
            .map(FileType::new)
            .collect::<BTreeSet<_>>(),
        progress_interval: args.progress_interval.max(1),
        delimiter: match args.delimiter {
            DelimiterArg::Tab => b'\t',
            DelimiterArg::Comma => b',',
        },
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").context("progress template")?,
    );
    spinner.set_message(format!("validating {file_count} file(s)"));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let cancel = CancellationToken::new();
    let mut reporter = MemoryReporter::new();
    let summary = validate(&graph, &files_by_type, &options, &cancel, &mut reporter)?;
    spinner.finish_and_clear();

    let report_path = if args.dry_run {
        None
    } else {
        let path = args
            .report
            .clone()
            .unwrap_or_else(|| args.submission.join("keycheck-report.json"));
        let label = args
            .submission
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("submission");
        Some(write_report_json(&path, label, reporter.findings())?)
    };

    Ok(ValidateOutcome {
        summary,
        reporter,
        report_path,
    })
}

pub fn run_types(args: &TypesArgs) -> Result<()> {
    let document = load_document(&args.schema).context("load schema document")?;
    let graph = SchemaGraph::from_document(&document).context("build schema graph")?;
    let order = graph.dependency_order()?;
    crate::summary::print_types(&graph, &order);
    Ok(())
}
