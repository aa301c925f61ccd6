//! Per-row key extraction.

use keycheck_model::{CompositeKey, Fault, FileType, KeyInterner, Result};
use keycheck_schema::{FileTypeSchema, KeyFields, Relation};

/// A foreign key bound to its parent relation.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub parent: FileType,
    pub role: Option<String>,
    pub surjective: bool,
    pub key: CompositeKey,
}

/// Keys extracted from one data row. Rebuilt for every row from the current
/// line's raw fields.
#[derive(Debug, Clone)]
pub struct RowKeys {
    pub primary_key: Option<CompositeKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub optional_key: Option<ForeignKey>,
}

impl RowKeys {
    /// Extracts the declared keys from `values`, interning components.
    pub fn extract(
        schema: &FileTypeSchema,
        values: &[String],
        interner: &mut KeyInterner,
        file_name: &str,
        line_number: u64,
    ) -> Result<Self> {
        let primary_key = match &schema.layout.primary_key {
            Some(fields) => Some(extract_key(
                fields, values, interner, schema, file_name, line_number,
            )?),
            None => None,
        };

        let mut foreign_keys = Vec::with_capacity(schema.layout.relations.len());
        for relation in &schema.layout.relations {
            foreign_keys.push(extract_foreign_key(
                relation, values, interner, schema, file_name, line_number,
            )?);
        }

        let optional_key = match &schema.layout.optional_relation {
            Some(relation) => Some(extract_foreign_key(
                relation, values, interner, schema, file_name, line_number,
            )?),
            None => None,
        };

        Ok(Self {
            primary_key,
            foreign_keys,
            optional_key,
        })
    }
}

fn extract_foreign_key(
    relation: &Relation,
    values: &[String],
    interner: &mut KeyInterner,
    schema: &FileTypeSchema,
    file_name: &str,
    line_number: u64,
) -> Result<ForeignKey> {
    Ok(ForeignKey {
        parent: relation.parent.clone(),
        role: relation.role.clone(),
        surjective: relation.surjective,
        key: extract_key(
            &relation.fields,
            values,
            interner,
            schema,
            file_name,
            line_number,
        )?,
    })
}

fn extract_key(
    fields: &KeyFields,
    values: &[String],
    interner: &mut KeyInterner,
    schema: &FileTypeSchema,
    file_name: &str,
    line_number: u64,
) -> Result<CompositeKey> {
    CompositeKey::extract(values, &fields.indices, interner).map_err(|out_of_range| {
        Fault::FieldIndexOutOfRange {
            file_type: schema.file_type.clone(),
            file_name: file_name.to_string(),
            line_number,
            index: out_of_range.index,
            width: out_of_range.width,
        }
    })
}
