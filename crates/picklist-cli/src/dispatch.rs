use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use picklist_app::App;
use picklist_core::doctor::{CheckState, DoctorReport, run_doctor};
use picklist_core::record::PickingTask;
use picklist_core::title_store::JsonTitleStore;

use crate::cli::{Cli, Command};
use crate::diagnostics::DiagnosticsSession;

pub fn run_with_deps(cli: Cli, diagnostics: &DiagnosticsSession) -> Result<()> {
    match cli.command {
        Some(Command::List) => run_list_command(diagnostics),
        Some(Command::Doctor) => run_doctor_command(diagnostics),
        None => run_root_command(diagnostics),
    }
}

fn run_root_command(diagnostics: &DiagnosticsSession) -> Result<()> {
    let config = picklist_app::ensure_config_ready()?;
    diagnostics.record("config ready, starting ui");

    let _ = picklist_tui::run(&config)?;

    Ok(())
}

fn run_list_command(diagnostics: &DiagnosticsSession) -> Result<()> {
    let config = picklist_app::ensure_config_ready()?;
    let store = JsonTitleStore::new(&config.store.path);
    let app = App::new(&store);

    let tasks = app.load()?;
    diagnostics.record(format!("listed {} tasks", tasks.len()));
    print_task_table(&tasks);
    Ok(())
}

fn run_doctor_command(diagnostics: &DiagnosticsSession) -> Result<()> {
    let report = run_doctor();
    diagnostics.record(format!("doctor: {}", report.summary()));
    print_doctor_report(&report);
    Ok(())
}

fn print_task_table(tasks: &[PickingTask]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Coordinate", "Title", "Barcode", "Copies", "Status"]);

    for task in tasks {
        let status = if task.done { "picked" } else { "pending" };
        table.add_row(vec![
            Cell::new(task.coordinate.as_str()),
            Cell::new(task.title.as_str()),
            Cell::new(task.barcode.as_str()),
            Cell::new(task.copies.to_string()),
            Cell::new(status),
        ]);
    }

    let done = tasks.iter().filter(|task| task.done).count();
    println!("{table}");
    println!("{done} of {} picked", tasks.len());
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        let status = match check.state {
            CheckState::Pass => "PASS",
            CheckState::Fail => "FAIL",
        };

        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(status),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
