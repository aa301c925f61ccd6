//! The declared dependency graph over file types.

use std::collections::{BTreeMap, BTreeSet};

use keycheck_model::{Fault, FileType, Result};

/// Field names plus their resolved positions within a row.
///
/// Positions are fixed at graph construction; the index count per
/// (file type, relation) pair never changes during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFields {
    pub names: Vec<String>,
    pub indices: Vec<usize>,
}

/// One declared child→parent relation.
#[derive(Debug, Clone)]
pub struct Relation {
    pub parent: FileType,
    /// Distinguishes multiple relations to the same parent, e.g. tumour and
    /// control sample references.
    pub role: Option<String>,
    pub fields: KeyFields,
    /// Surjective relations additionally require every parent key to be
    /// referenced by at least one child row.
    pub surjective: bool,
}

/// Resolved key layout for one file type.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    /// Empty for types with no primary key (e.g. secondary data files).
    pub primary_key: Option<KeyFields>,
    pub relations: Vec<Relation>,
    /// At most one relation may legitimately hold a not-applicable value.
    pub optional_relation: Option<Relation>,
}

/// Per-type schema: filename pattern, field list, and key layout.
#[derive(Debug, Clone)]
pub struct FileTypeSchema {
    pub file_type: FileType,
    /// Regex matched against submission file names.
    pub pattern: String,
    pub fields: Vec<String>,
    pub layout: KeyLayout,
}

impl FileTypeSchema {
    /// All relations of this type, the optional one last.
    pub fn all_relations(&self) -> impl Iterator<Item = &Relation> {
        self.layout
            .relations
            .iter()
            .chain(self.layout.optional_relation.as_ref())
    }
}

/// Immutable, shareable view of the declared file types and their relations.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    types: BTreeMap<FileType, FileTypeSchema>,
}

impl SchemaGraph {
    pub(crate) fn from_schemas(schemas: Vec<FileTypeSchema>) -> Result<Self> {
        let mut types = BTreeMap::new();
        for schema in schemas {
            let file_type = schema.file_type.clone();
            if types.insert(file_type.clone(), schema).is_some() {
                return Err(Fault::InvalidSchema {
                    message: format!("file type {file_type} is declared more than once"),
                });
            }
        }
        let graph = Self { types };
        graph.check_relations()?;
        Ok(graph)
    }

    fn check_relations(&self) -> Result<()> {
        for schema in self.types.values() {
            for relation in schema.all_relations() {
                let Some(parent) = self.types.get(&relation.parent) else {
                    return Err(Fault::InvalidSchema {
                        message: format!(
                            "relation {} -> {} references an undeclared file type",
                            schema.file_type, relation.parent
                        ),
                    });
                };
                let Some(parent_key) = &parent.layout.primary_key else {
                    return Err(Fault::InvalidSchema {
                        message: format!(
                            "relation {} -> {} references a file type without a primary key",
                            schema.file_type, relation.parent
                        ),
                    });
                };
                if relation.fields.indices.len() != parent_key.indices.len() {
                    return Err(Fault::InvalidSchema {
                        message: format!(
                            "relation {} -> {} declares {} key fields but the parent primary key has {}",
                            schema.file_type,
                            relation.parent,
                            relation.fields.indices.len(),
                            parent_key.indices.len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, file_type: &FileType) -> Option<&FileTypeSchema> {
        self.types.get(file_type)
    }

    pub fn file_type(&self, file_type: &FileType) -> Result<&FileTypeSchema> {
        self.types
            .get(file_type)
            .ok_or_else(|| Fault::UnknownFileType(file_type.clone()))
    }

    pub fn file_types(&self) -> impl Iterator<Item = &FileType> {
        self.types.keys()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &FileTypeSchema> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Distinct parent types `child` declares a relation to, required and
    /// optional alike.
    pub fn parents(&self, child: &FileType) -> BTreeSet<FileType> {
        self.types
            .get(child)
            .map(|schema| {
                schema
                    .all_relations()
                    .map(|relation| relation.parent.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct child types declaring a relation to `parent`.
    pub fn children(&self, parent: &FileType) -> BTreeSet<FileType> {
        self.types
            .values()
            .filter(|schema| {
                schema
                    .all_relations()
                    .any(|relation| &relation.parent == parent)
            })
            .map(|schema| schema.file_type.clone())
            .collect()
    }

    /// True when some other type declares a relation to `file_type`; such a
    /// type's primary keys must outlive its own processing level.
    pub fn has_children(&self, file_type: &FileType) -> bool {
        self.types.values().any(|schema| {
            schema
                .all_relations()
                .any(|relation| &relation.parent == file_type)
        })
    }

    /// Parent types `child` must reference surjectively.
    pub fn surjective_parents(&self, child: &FileType) -> BTreeSet<FileType> {
        self.types
            .get(child)
            .map(|schema| {
                schema
                    .all_relations()
                    .filter(|relation| relation.surjective)
                    .map(|relation| relation.parent.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Topological order of the declared relation graph: every parent
    /// precedes all of its children. Deterministic for a given schema.
    pub fn dependency_order(&self) -> Result<Vec<FileType>> {
        let mut emitted: BTreeSet<FileType> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.types.len());
        while emitted.len() < self.types.len() {
            let mut progressed = false;
            for file_type in self.types.keys() {
                if emitted.contains(file_type) {
                    continue;
                }
                let ready = self
                    .parents(file_type)
                    .iter()
                    .all(|parent| emitted.contains(parent));
                if ready {
                    order.push(file_type.clone());
                    emitted.insert(file_type.clone());
                    progressed = true;
                }
            }
            if !progressed {
                let types: Vec<FileType> = self
                    .types
                    .keys()
                    .filter(|file_type| !emitted.contains(file_type))
                    .cloned()
                    .collect();
                return Err(Fault::CyclicDependency { types });
            }
        }
        Ok(order)
    }
}
