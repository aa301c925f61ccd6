//! Walks file types in dependency order and runs the surjection pass.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use keycheck_model::{Fault, FileType, Finding, KeyInterner, Reporter, Result};
use keycheck_schema::SchemaGraph;

use crate::index::{EncounteredForeignKeyIndex, PrimaryKeyIndex, ReferencedKeyIndex};
use crate::validator::{FileValidator, LevelState};

/// Shared flag checked between rows and between files to stop a run promptly.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Engine configuration, passed explicitly at construction.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Sentinel marking an optional foreign key as not applicable.
    pub not_applicable: String,
    /// Row-level consistency checking: a row missing an expected key becomes
    /// a fault. Disabling trusts upstream shape guarantees and skips the
    /// check.
    pub row_checks: bool,
    /// File types exempt from uniqueness checking.
    pub uniqueness_exempt: BTreeSet<FileType>,
    /// Emit a progress log line every this many rows.
    pub progress_interval: u64,
    /// Column delimiter of the submission files.
    pub delimiter: u8,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            not_applicable: "-888".to_string(),
            row_checks: true,
            uniqueness_exempt: BTreeSet::new(),
            progress_interval: 1_000_000,
            delimiter: b'\t',
        }
    }
}

/// Totals for one completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSummary {
    pub files: u64,
    pub rows: u64,
    /// Distinct key values interned over the run; the memory bound.
    pub distinct_values: usize,
}

/// Validates a whole submission: every file of every declared type, in
/// dependency order, then the surjection pass.
///
/// Data-quality findings flow to `reporter` and never abort the run; only
/// schema/configuration faults (and cancellation) abort, immediately.
/// Identical inputs reproduce an identical multiset of findings.
pub fn validate(
    graph: &SchemaGraph,
    files_by_type: &BTreeMap<FileType, Vec<PathBuf>>,
    options: &ValidationOptions,
    cancel: &CancellationToken,
    reporter: &mut dyn Reporter,
) -> Result<ValidationSummary> {
    let order = graph.dependency_order()?;
    info!(types = order.len(), "dependency order resolved");

    // Types that remain surjection operands after their own level completes.
    let surjective_parents: BTreeSet<FileType> = order
        .iter()
        .flat_map(|file_type| graph.surjective_parents(file_type))
        .collect();

    let mut interner = KeyInterner::new();
    let mut finalized: BTreeMap<FileType, Arc<PrimaryKeyIndex>> = BTreeMap::new();
    let mut pending_surjections: Vec<EncounteredForeignKeyIndex> = Vec::new();
    let mut processed: BTreeSet<FileType> = BTreeSet::new();
    let mut summary = ValidationSummary::default();

    for file_type in &order {
        if cancel.is_cancelled() {
            return Err(Fault::Cancelled);
        }
        let schema = graph.file_type(file_type)?;
        let files = files_by_type
            .get(file_type)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut referenced = BTreeMap::new();
        for parent in graph.parents(file_type) {
            let view = if has_files(files_by_type, &parent) {
                match finalized.get(&parent) {
                    Some(index) => ReferencedKeyIndex::frozen(parent.clone(), Arc::clone(index)),
                    None => ReferencedKeyIndex::absent(parent.clone()),
                }
            } else {
                ReferencedKeyIndex::absent(parent.clone())
            };
            referenced.insert(parent, view);
        }

        let mut encountered = BTreeMap::new();
        for parent in graph.surjective_parents(file_type) {
            encountered.insert(
                parent.clone(),
                EncounteredForeignKeyIndex::new(file_type.clone(), parent),
            );
        }

        let mut state = LevelState {
            primary_keys: PrimaryKeyIndex::new(file_type.clone()),
            referenced,
            encountered,
        };

        if files.is_empty() {
            debug!(file_type = %file_type, "no files for type");
        }
        for path in files {
            if cancel.is_cancelled() {
                return Err(Fault::Cancelled);
            }
            let stats = FileValidator::new(schema, path, options).validate(
                &mut state,
                &mut interner,
                reporter,
                cancel,
            )?;
            summary.files += 1;
            summary.rows += stats.rows;
        }

        // Freeze the level: from here the index is an immutable shared view.
        let frozen = Arc::new(state.primary_keys);
        pending_surjections.extend(state.encountered.into_values());
        processed.insert(file_type.clone());
        if graph.has_children(file_type) {
            finalized.insert(file_type.clone(), frozen);
        }

        // Release finalized indices no later level can need.
        finalized.retain(|parent, _| {
            surjective_parents.contains(parent)
                || graph
                    .children(parent)
                    .iter()
                    .any(|child| !processed.contains(child))
        });
    }

    run_surjection_pass(&pending_surjections, &finalized, cancel, reporter)?;

    summary.distinct_values = interner.len();
    info!(
        files = summary.files,
        rows = summary.rows,
        distinct_values = summary.distinct_values,
        "validation complete"
    );
    Ok(summary)
}

/// One finding per parent key that no child row ever referenced, in sorted
/// key order. Runs once all levels are complete, never per row.
fn run_surjection_pass(
    pending: &[EncounteredForeignKeyIndex],
    finalized: &BTreeMap<FileType, Arc<PrimaryKeyIndex>>,
    cancel: &CancellationToken,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    for encountered in pending {
        if cancel.is_cancelled() {
            return Err(Fault::Cancelled);
        }
        let Some(parent_index) = finalized.get(encountered.parent()) else {
            continue;
        };
        debug!(
            child = %encountered.child(),
            parent = %encountered.parent(),
            referenced = encountered.len(),
            "surjection check"
        );
        for key in parent_index.sorted_keys() {
            if !encountered.contains(key) {
                let file_name = parent_index.file_of(key).unwrap_or_default().to_string();
                reporter.report(Finding::surjection(
                    encountered.parent().clone(),
                    &file_name,
                    (*key).clone(),
                    encountered.child().clone(),
                ));
            }
        }
    }
    Ok(())
}

fn has_files(files_by_type: &BTreeMap<FileType, Vec<PathBuf>>, file_type: &FileType) -> bool {
    files_by_type
        .get(file_type)
        .is_some_and(|files| !files.is_empty())
}
