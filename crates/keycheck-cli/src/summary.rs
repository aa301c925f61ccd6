//! Terminal summary output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use keycheck_model::{FileType, Finding, FindingKind};
use keycheck_schema::SchemaGraph;

use crate::commands::ValidateOutcome;

const MAX_DETAIL_ROWS: usize = 20;

pub fn print_summary(outcome: &ValidateOutcome) {
    println!(
        "Processed {} file(s), {} row(s), {} distinct key value(s)",
        outcome.summary.files, outcome.summary.rows, outcome.summary.distinct_values
    );
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }

    let counts = outcome.reporter.counts();
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Finding"), header_cell("Count")]);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        kind_cell(FindingKind::Uniqueness),
        count_cell(counts.uniqueness),
    ]);
    table.add_row(vec![
        kind_cell(FindingKind::Relation),
        count_cell(counts.relation),
    ]);
    table.add_row(vec![
        kind_cell(FindingKind::OptionalRelation),
        count_cell(counts.optional_relation),
    ]);
    table.add_row(vec![
        kind_cell(FindingKind::Surjection),
        count_cell(counts.surjection),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        count_cell(counts.total()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_detail_table(outcome.reporter.findings());
}

fn print_detail_table(findings: &[Finding]) {
    if findings.is_empty() {
        println!("Submission is referentially consistent.");
        return;
    }

    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Type"),
        header_cell("File"),
        header_cell("Line"),
        header_cell("Key"),
        header_cell("Related"),
    ]);
    align_column(&mut table, 3, CellAlignment::Right);
    for finding in findings.iter().take(MAX_DETAIL_ROWS) {
        table.add_row(vec![
            kind_cell(finding.kind),
            Cell::new(&finding.file_type),
            Cell::new(&finding.file_name),
            Cell::new(
                finding
                    .line_number
                    .map(|line| line.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                finding
                    .key
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                finding
                    .related_file_type
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    println!("{table}");
    if findings.len() > MAX_DETAIL_ROWS {
        println!(
            "... and {} more finding(s); see the JSON report for the full list",
            findings.len() - MAX_DETAIL_ROWS
        );
    }
}

pub fn print_types(graph: &SchemaGraph, order: &[FileType]) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("#"),
        header_cell("Type"),
        header_cell("Primary key"),
        header_cell("Relations"),
        header_cell("Pattern"),
    ]);
    align_column(&mut table, 0, CellAlignment::Right);
    for (position, file_type) in order.iter().enumerate() {
        let Some(schema) = graph.get(file_type) else {
            continue;
        };
        let primary_key = schema
            .layout
            .primary_key
            .as_ref()
            .map(|fields| fields.names.join(", "))
            .unwrap_or_else(|| "-".to_string());
        let relations: Vec<String> = schema
            .all_relations()
            .map(|relation| {
                let mut description = relation.parent.to_string();
                if let Some(role) = &relation.role {
                    description.push_str(&format!(" ({role})"));
                }
                if relation.surjective {
                    description.push_str(" [surjective]");
                }
                description
            })
            .collect();
        let relations = if relations.is_empty() {
            "-".to_string()
        } else {
            relations.join("; ")
        };
        table.add_row(vec![
            Cell::new(position + 1),
            Cell::new(file_type),
            Cell::new(primary_key),
            Cell::new(relations),
            Cell::new(&schema.pattern),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(count: u64) -> Cell {
    if count == 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(Color::Red)
    }
}

fn kind_cell(kind: FindingKind) -> Cell {
    let color = match kind {
        FindingKind::Uniqueness => Color::Yellow,
        FindingKind::Relation => Color::Red,
        FindingKind::OptionalRelation => Color::Magenta,
        FindingKind::Surjection => Color::Cyan,
    };
    Cell::new(kind).fg(color)
}
