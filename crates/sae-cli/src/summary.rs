use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sae_cli::types::{ProjectResult, ProjectStatus, RunReport};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn print_summary(report: &RunReport) {
    println!("Started: {}", report.started_at.format(TIME_FORMAT));
    println!("Finished: {}", report.finished_at.format(TIME_FORMAT));
    if report.dry_run {
        println!("Mode: dry run (nothing imported)");
    }
    if let Some(path) = &report.plan_csv {
        println!("Plan: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Status"),
        header_cell("Reports"),
        header_cell("Participants"),
        header_cell("Numbered"),
        header_cell("New"),
        header_cell("Rejected"),
        header_cell("Imported"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_new = 0usize;
    let mut total_rejected = 0usize;
    for project in &report.projects {
        total_new += project.assignments.len();
        total_rejected += project.rejections.len();
        table.add_row(vec![
            Cell::new(&project.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(&project.status),
            Cell::new(project.fetched),
            Cell::new(project.participants),
            dim_cell(project.already_numbered),
            count_cell(project.assignments.len(), Color::Green),
            count_cell(project.rejections.len(), Color::Red),
            import_cell(project),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(total_new, Color::Green).add_attribute(Attribute::Bold),
        count_cell(total_rejected, Color::Red).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    if report.dry_run {
        print_plan_table(report);
    }
    print_rejection_table(report);
    let failures: Vec<&ProjectResult> = report
        .projects
        .iter()
        .filter(|project| matches!(project.status, ProjectStatus::Failed(_)))
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for project in failures {
            eprintln!("- {}: {}", project.key, project.status);
        }
    }
}

fn print_plan_table(report: &RunReport) {
    let rows: Vec<(&str, &sae_model::Assignment)> = report
        .projects
        .iter()
        .flat_map(|project| project.assignments.iter().map(move |a| (project.key.as_str(), a)))
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Record"),
        header_cell("Instance"),
        header_cell("SAE number"),
        header_cell("Replaces"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (key, assignment) in rows {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(&assignment.record_id),
            Cell::new(assignment.repeat_instance),
            Cell::new(assignment.sae_number.to_string()).fg(Color::Green),
            match &assignment.replaces {
                Some(value) => Cell::new(value).fg(Color::Yellow),
                None => dim_cell("-"),
            },
        ]);
    }
    println!();
    println!("Planned SAE numbers:");
    println!("{table}");
}

fn print_rejection_table(report: &RunReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Record"),
        header_cell("Instance"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut any = false;
    for project in &report.projects {
        for rejected in &project.rejections {
            any = true;
            table.add_row(vec![
                Cell::new(&project.key),
                Cell::new(&rejected.record_id),
                Cell::new(rejected.repeat_instance),
                Cell::new(rejected.reason.to_string()).fg(Color::Red),
            ]);
        }
    }
    if !any {
        return;
    }
    println!();
    println!("Rejected SAE reports:");
    println!("{table}");
}

fn status_cell(status: &ProjectStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        ProjectStatus::Imported => cell.fg(Color::Green),
        ProjectStatus::Planned => cell.fg(Color::Cyan),
        ProjectStatus::NoReports | ProjectStatus::UpToDate => cell.fg(Color::DarkGrey),
        ProjectStatus::Failed(_) => cell.fg(Color::Red).add_attribute(Attribute::Bold),
    }
}

fn import_cell(project: &ProjectResult) -> Cell {
    match project.import {
        Some(outcome) if outcome.is_partial() => Cell::new(outcome.to_string())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Some(outcome) => Cell::new(outcome.imported).fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
