//! Schema graph construction, dependency ordering, and validation.

use keycheck_model::{Fault, FileType};
use keycheck_schema::{FileTypeEntry, RelationEntry, SchemaDocument, SchemaGraph};

fn entry(name: &str, fields: &[&str], primary_key: &[&str]) -> FileTypeEntry {
    FileTypeEntry {
        name: name.to_string(),
        pattern: format!("^{}.*\\.txt$", name.to_lowercase()),
        fields: fields.iter().map(ToString::to_string).collect(),
        primary_key: primary_key.iter().map(ToString::to_string).collect(),
        relations: Vec::new(),
    }
}

fn relation(other: &str, fields: &[&str]) -> RelationEntry {
    RelationEntry {
        other: other.to_string(),
        fields: fields.iter().map(ToString::to_string).collect(),
        role: None,
        optional: false,
        surjective: false,
    }
}

fn clinical_document() -> SchemaDocument {
    let donor = entry("DONOR", &["donor_id", "sex"], &["donor_id"]);

    let mut specimen = entry("SPECIMEN", &["specimen_id", "donor_id"], &["specimen_id"]);
    let mut specimen_donor = relation("DONOR", &["donor_id"]);
    specimen_donor.surjective = true;
    specimen.relations.push(specimen_donor);

    let mut sample = entry(
        "SAMPLE",
        &["analyzed_sample_id", "specimen_id"],
        &["analyzed_sample_id"],
    );
    sample.relations.push(relation("SPECIMEN", &["specimen_id"]));

    let mut ssm_m = entry(
        "SSM_M",
        &["analysis_id", "analyzed_sample_id", "matched_sample_id"],
        &["analysis_id"],
    );
    let mut tumour = relation("SAMPLE", &["analyzed_sample_id"]);
    tumour.role = Some("tumour".to_string());
    ssm_m.relations.push(tumour);
    let mut control = relation("SAMPLE", &["matched_sample_id"]);
    control.role = Some("control".to_string());
    control.optional = true;
    ssm_m.relations.push(control);

    let mut ssm_p = entry("SSM_P", &["analysis_id", "chromosome"], &[]);
    ssm_p.relations.push(relation("SSM_M", &["analysis_id"]));

    SchemaDocument {
        file_types: vec![donor, specimen, sample, ssm_m, ssm_p],
        not_applicable: "-888".to_string(),
    }
}

#[test]
fn dependency_order_puts_parents_first() {
    let graph = SchemaGraph::from_document(&clinical_document()).expect("graph");
    let order = graph.dependency_order().expect("order");
    let position = |name: &str| {
        order
            .iter()
            .position(|file_type| file_type == &FileType::new(name))
            .expect("type in order")
    };
    assert_eq!(order.len(), 5);
    assert!(position("DONOR") < position("SPECIMEN"));
    assert!(position("SPECIMEN") < position("SAMPLE"));
    assert!(position("SAMPLE") < position("SSM_M"));
    assert!(position("SSM_M") < position("SSM_P"));
}

#[test]
fn cycle_is_a_fault() {
    let mut a = entry("A", &["id", "b_id"], &["id"]);
    a.relations.push(relation("B", &["b_id"]));
    let mut b = entry("B", &["id", "a_id"], &["id"]);
    b.relations.push(relation("A", &["a_id"]));
    let document = SchemaDocument {
        file_types: vec![a, b],
        not_applicable: "-888".to_string(),
    };
    let graph = SchemaGraph::from_document(&document).expect("graph");
    match graph.dependency_order() {
        Err(Fault::CyclicDependency { types }) => {
            assert_eq!(types.len(), 2);
        }
        other => panic!("expected cyclic dependency fault, got {other:?}"),
    }
}

#[test]
fn has_children_follows_declared_relations() {
    let graph = SchemaGraph::from_document(&clinical_document()).expect("graph");
    assert!(graph.has_children(&FileType::new("DONOR")));
    assert!(graph.has_children(&FileType::new("SAMPLE")));
    assert!(graph.has_children(&FileType::new("SSM_M")));
    assert!(!graph.has_children(&FileType::new("SSM_P")));
}

#[test]
fn surjective_parents_are_relation_scoped() {
    let graph = SchemaGraph::from_document(&clinical_document()).expect("graph");
    let specimen_parents = graph.surjective_parents(&FileType::new("SPECIMEN"));
    assert!(specimen_parents.contains(&FileType::new("DONOR")));
    assert!(graph.surjective_parents(&FileType::new("SAMPLE")).is_empty());
}

#[test]
fn parents_include_optional_relations() {
    let graph = SchemaGraph::from_document(&clinical_document()).expect("graph");
    let parents = graph.parents(&FileType::new("SSM_M"));
    assert_eq!(parents.len(), 1);
    assert!(parents.contains(&FileType::new("SAMPLE")));
}

#[test]
fn unknown_key_field_is_a_fault() {
    let document = SchemaDocument {
        file_types: vec![entry("DONOR", &["donor_id"], &["missing_field"])],
        not_applicable: "-888".to_string(),
    };
    match SchemaGraph::from_document(&document) {
        Err(Fault::InvalidSchema { message }) => {
            assert!(message.contains("missing_field"));
        }
        other => panic!("expected invalid schema fault, got {other:?}"),
    }
}

#[test]
fn relation_to_type_without_primary_key_is_a_fault() {
    let keyless = entry("NOTES", &["note_id"], &[]);
    let mut child = entry("CHILD", &["id", "note_id"], &["id"]);
    child.relations.push(relation("NOTES", &["note_id"]));
    let document = SchemaDocument {
        file_types: vec![keyless, child],
        not_applicable: "-888".to_string(),
    };
    assert!(matches!(
        SchemaGraph::from_document(&document),
        Err(Fault::InvalidSchema { .. })
    ));
}

#[test]
fn relation_arity_must_match_parent_key() {
    let parent = entry("PARENT", &["a", "b"], &["a", "b"]);
    let mut child = entry("CHILD", &["id", "a"], &["id"]);
    child.relations.push(relation("PARENT", &["a"]));
    let document = SchemaDocument {
        file_types: vec![parent, child],
        not_applicable: "-888".to_string(),
    };
    assert!(matches!(
        SchemaGraph::from_document(&document),
        Err(Fault::InvalidSchema { .. })
    ));
}

#[test]
fn second_optional_relation_is_a_fault() {
    let parent = entry("PARENT", &["id"], &["id"]);
    let mut child = entry("CHILD", &["id", "first", "second"], &["id"]);
    let mut one = relation("PARENT", &["first"]);
    one.optional = true;
    let mut two = relation("PARENT", &["second"]);
    two.optional = true;
    child.relations.push(one);
    child.relations.push(two);
    let document = SchemaDocument {
        file_types: vec![parent, child],
        not_applicable: "-888".to_string(),
    };
    assert!(matches!(
        SchemaGraph::from_document(&document),
        Err(Fault::InvalidSchema { .. })
    ));
}

#[test]
fn document_parses_from_json() {
    let text = r#"{
        "not_applicable": "-888",
        "file_types": [
            {
                "name": "donor",
                "pattern": "^donor.*\\.txt$",
                "fields": ["donor_id", "sex"],
                "primary_key": ["donor_id"]
            },
            {
                "name": "specimen",
                "pattern": "^specimen.*\\.txt$",
                "fields": ["specimen_id", "donor_id"],
                "primary_key": ["specimen_id"],
                "relations": [
                    {"other": "donor", "fields": ["donor_id"], "surjective": true}
                ]
            }
        ]
    }"#;
    let document: SchemaDocument = serde_json::from_str(text).expect("parse");
    let graph = SchemaGraph::from_document(&document).expect("graph");
    assert_eq!(graph.len(), 2);
    let order = graph.dependency_order().expect("order");
    assert_eq!(order[0], FileType::new("DONOR"));
    let schema = graph.get(&FileType::new("SPECIMEN")).expect("specimen");
    assert_eq!(schema.layout.relations.len(), 1);
    assert!(schema.layout.relations[0].surjective);
    assert_eq!(schema.layout.relations[0].fields.indices, vec![1]);
}
