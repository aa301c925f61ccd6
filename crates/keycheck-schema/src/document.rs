//! On-disk schema document and its conversion into a [`SchemaGraph`].
//!
//! The document is injectable configuration: which relations exist, which are
//! optional or surjective, and which sentinel marks a not-applicable value
//! all come from here, never from hard-coded tables.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use keycheck_model::{Fault, FileType, Result};

use crate::graph::{FileTypeSchema, KeyFields, KeyLayout, Relation, SchemaGraph};

/// Root of the schema document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub file_types: Vec<FileTypeEntry>,
    /// Sentinel marking an optional foreign key as not applicable.
    #[serde(default = "default_not_applicable")]
    pub not_applicable: String,
}

fn default_not_applicable() -> String {
    "-888".to_string()
}

/// One declared file type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeEntry {
    pub name: String,
    /// Regex matched against submission file names.
    pub pattern: String,
    /// Ordered column names of a data row.
    pub fields: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub relations: Vec<RelationEntry>,
}

/// One declared relation to a parent file type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEntry {
    /// Parent file type name.
    pub other: String,
    /// Child fields referencing the parent primary key, in parent key order.
    pub fields: Vec<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub surjective: bool,
}

/// Reads and parses a schema document.
pub fn load_document(path: &Path) -> Result<SchemaDocument> {
    let text = fs::read_to_string(path).map_err(|error| Fault::InvalidSchema {
        message: format!("read schema document '{}': {error}", path.display()),
    })?;
    serde_json::from_str(&text).map_err(|error| Fault::InvalidSchema {
        message: format!("parse schema document '{}': {error}", path.display()),
    })
}

impl SchemaGraph {
    /// Resolves field names to row indices and builds the validated graph.
    pub fn from_document(document: &SchemaDocument) -> Result<Self> {
        let mut schemas = Vec::with_capacity(document.file_types.len());
        for entry in &document.file_types {
            schemas.push(convert_entry(entry)?);
        }
        Self::from_schemas(schemas)
    }
}

fn convert_entry(entry: &FileTypeEntry) -> Result<FileTypeSchema> {
    let file_type = FileType::new(&entry.name);
    let primary_key = if entry.primary_key.is_empty() {
        None
    } else {
        Some(resolve_fields(&file_type, &entry.fields, &entry.primary_key)?)
    };

    let mut relations = Vec::new();
    let mut optional_relation = None;
    for relation_entry in &entry.relations {
        let relation = Relation {
            parent: FileType::new(&relation_entry.other),
            role: relation_entry.role.clone(),
            fields: resolve_fields(&file_type, &entry.fields, &relation_entry.fields)?,
            surjective: relation_entry.surjective,
        };
        if relation_entry.optional {
            if optional_relation.is_some() {
                return Err(Fault::InvalidSchema {
                    message: format!(
                        "file type {file_type} declares more than one optional relation"
                    ),
                });
            }
            optional_relation = Some(relation);
        } else {
            relations.push(relation);
        }
    }

    Ok(FileTypeSchema {
        file_type,
        pattern: entry.pattern.clone(),
        fields: entry.fields.clone(),
        layout: KeyLayout {
            primary_key,
            relations,
            optional_relation,
        },
    })
}

fn resolve_fields(
    file_type: &FileType,
    declared: &[String],
    names: &[String],
) -> Result<KeyFields> {
    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        let index = declared
            .iter()
            .position(|field| field == name)
            .ok_or_else(|| Fault::InvalidSchema {
                message: format!("file type {file_type} declares no field named '{name}'"),
            })?;
        indices.push(index);
    }
    Ok(KeyFields {
        names: names.to_vec(),
        indices,
    })
}
