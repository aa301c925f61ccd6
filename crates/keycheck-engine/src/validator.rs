//! Streams one submission file and applies the per-row key checks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use keycheck_ingest::RowReader;
use keycheck_model::{Fault, FileType, Finding, KeyInterner, KeyRole, Reporter, Result};
use keycheck_schema::FileTypeSchema;

use crate::index::{EncounteredForeignKeyIndex, PrimaryKeyIndex, ReferencedKeyIndex};
use crate::orchestrator::{CancellationToken, ValidationOptions};
use crate::row_keys::{ForeignKey, RowKeys};

/// Mutable state of one dependency level while its files stream through.
#[derive(Debug)]
pub(crate) struct LevelState {
    pub primary_keys: PrimaryKeyIndex,
    pub referenced: BTreeMap<FileType, ReferencedKeyIndex>,
    pub encountered: BTreeMap<FileType, EncounteredForeignKeyIndex>,
}

/// Counters for one processed file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStats {
    pub rows: u64,
}

/// Validates one physical file: opened, streamed row by row, then closed by
/// consuming the validator. Every row runs all applicable checks, so a single
/// row may yield several findings at once.
pub struct FileValidator<'a> {
    schema: &'a FileTypeSchema,
    path: PathBuf,
    file_name: String,
    options: &'a ValidationOptions,
}

impl<'a> FileValidator<'a> {
    pub fn new(schema: &'a FileTypeSchema, path: &Path, options: &'a ValidationOptions) -> Self {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            schema,
            path: path.to_path_buf(),
            file_name,
            options,
        }
    }

    pub(crate) fn validate(
        self,
        state: &mut LevelState,
        interner: &mut KeyInterner,
        reporter: &mut dyn Reporter,
        cancel: &CancellationToken,
    ) -> Result<FileStats> {
        info!(
            file_type = %self.schema.file_type,
            file = %self.file_name,
            "validating file"
        );

        let mut reader = RowReader::open(&self.path, self.options.delimiter)
            .map_err(|error| Fault::row_source(&self.path, &error))?;
        if reader.headers() != self.schema.fields.as_slice() {
            debug!(
                file = %self.file_name,
                "header differs from declared field list"
            );
        }

        let progress_interval = self.options.progress_interval.max(1);
        let mut stats = FileStats::default();
        while let Some(row) = reader.next_row() {
            if cancel.is_cancelled() {
                return Err(Fault::Cancelled);
            }
            let row = row.map_err(|error| Fault::row_source(&self.path, &error))?;
            let keys = RowKeys::extract(
                self.schema,
                &row.values,
                interner,
                &self.file_name,
                row.line_number,
            )?;
            self.check_row(&keys, row.line_number, state, reporter)?;
            self.record_row(&keys, state);

            stats.rows += 1;
            if stats.rows % progress_interval == 0 {
                info!(file = %self.file_name, rows = stats.rows, "progress");
            }
        }

        debug!(file = %self.file_name, rows = stats.rows, "file complete");
        Ok(stats)
    }

    fn check_row(
        &self,
        keys: &RowKeys,
        line_number: u64,
        state: &mut LevelState,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        if let Some(primary_key) = &keys.primary_key {
            self.ensure_present(primary_key.is_blank(), KeyRole::Primary, line_number)?;
            if !self
                .options
                .uniqueness_exempt
                .contains(&self.schema.file_type)
                && state.primary_keys.contains(primary_key)
            {
                reporter.report(Finding::uniqueness(
                    self.schema.file_type.clone(),
                    &self.file_name,
                    line_number,
                    primary_key.clone(),
                ));
            }
        }

        for foreign_key in &keys.foreign_keys {
            self.ensure_present(foreign_key.key.is_blank(), KeyRole::Foreign, line_number)?;
            self.check_reference(foreign_key, line_number, state, reporter, false)?;
        }

        if let Some(optional_key) = &keys.optional_key
            && self.is_checkable(optional_key)
        {
            self.check_reference(optional_key, line_number, state, reporter, true)?;
        }

        Ok(())
    }

    /// An optional reference holding the not-applicable sentinel, or no value
    /// at all, is legitimately absent and skipped, never flagged.
    fn is_checkable(&self, foreign_key: &ForeignKey) -> bool {
        !foreign_key.key.has_component(&self.options.not_applicable)
            && !foreign_key.key.is_blank()
    }

    fn check_reference(
        &self,
        foreign_key: &ForeignKey,
        line_number: u64,
        state: &LevelState,
        reporter: &mut dyn Reporter,
        optional: bool,
    ) -> Result<()> {
        let Some(referenced) = state.referenced.get(&foreign_key.parent) else {
            if self.options.row_checks {
                return Err(Fault::InvalidSchema {
                    message: format!(
                        "no referenced key index wired for {} -> {}",
                        self.schema.file_type, foreign_key.parent
                    ),
                });
            }
            return Ok(());
        };
        if !referenced.contains(&foreign_key.key) {
            let finding = if optional {
                Finding::optional_relation(
                    self.schema.file_type.clone(),
                    &self.file_name,
                    line_number,
                    foreign_key.key.clone(),
                    foreign_key.parent.clone(),
                )
            } else {
                Finding::relation(
                    self.schema.file_type.clone(),
                    &self.file_name,
                    line_number,
                    foreign_key.key.clone(),
                    foreign_key.parent.clone(),
                )
            };
            reporter.report(finding);
        }
        Ok(())
    }

    /// Feeds the level's accumulators: the primary key index for uniqueness
    /// and downstream reference checks, and the encountered set for any
    /// surjective relation.
    fn record_row(&self, keys: &RowKeys, state: &mut LevelState) {
        if let Some(primary_key) = &keys.primary_key {
            state
                .primary_keys
                .add(&self.file_name, primary_key.clone());
        }
        for foreign_key in keys
            .foreign_keys
            .iter()
            .chain(keys.optional_key.as_ref())
        {
            if foreign_key.surjective
                && self.is_checkable(foreign_key)
                && let Some(encountered) = state.encountered.get_mut(&foreign_key.parent)
            {
                encountered.add(foreign_key.key.clone());
            }
        }
    }

    fn ensure_present(&self, is_blank: bool, role: KeyRole, line_number: u64) -> Result<()> {
        if self.options.row_checks && is_blank {
            return Err(Fault::MissingKey {
                file_type: self.schema.file_type.clone(),
                file_name: self.file_name.clone(),
                line_number,
                role,
            });
        }
        Ok(())
    }
}
