use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use evc_model::{Condition, Severity, SubmissionStatus};

use crate::commands::ValidateRun;

pub fn print_summary(run: &ValidateRun) {
    let verdict = &run.report.verdict;
    println!("Dataset: {}", run.dataset);
    println!("Batch: {}", run.batch_id);
    if let Some(path) = &run.accepted {
        println!("Accepted: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Valid"),
        header_cell("Rejected"),
        header_cell("Errors"),
        header_cell("Notices"),
    ]);
    apply_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        status_cell(run.report.status),
        Cell::new(verdict.total_records),
        Cell::new(verdict.valid_records),
        count_cell(verdict.rejected_records, Color::Red),
        count_cell(verdict.error_count(), Color::Red),
        count_cell(verdict.notice_count(), Color::Yellow),
    ]);
    println!("{table}");
    print_condition_table(&verdict.conditions);
}

pub fn print_json(run: &ValidateRun) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(run)?);
    Ok(())
}

fn print_condition_table(conditions: &[Condition]) {
    if conditions.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Severity"),
        header_cell("Column"),
        header_cell("Code"),
        header_cell("Message"),
    ]);
    apply_condition_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Center);
    for condition in conditions {
        table.add_row(vec![
            row_cell(condition.error_row),
            severity_cell(condition.severity),
            Cell::new(&condition.header_name),
            dim_cell(condition.code()),
            Cell::new(&condition.error_description),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_condition_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Fixed(28)),
            ColumnConstraint::UpperBoundary(Width::Percentage(55)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: SubmissionStatus) -> Cell {
    let color = match status {
        SubmissionStatus::Valid => Color::Green,
        SubmissionStatus::Invalid => Color::Red,
    };
    Cell::new(status.as_str())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Notice => Cell::new("NOTICE").fg(Color::Yellow),
    }
}

fn row_cell(row: Option<usize>) -> Cell {
    match row {
        Some(row) => Cell::new(row),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
