//! Sheet extraction tests over in-memory grids
//!
//! Covers normalization, stage attribution, assembly rules and the end-to-end
//! sheet scenario without going through a workbook container.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use royalbit_portfolio::extract::{
    AssemblyContext, SheetExtractor, SheetOutcome, SkipReason, SourceIdentity,
};
use royalbit_portfolio::grid::{Cell, Grid};
use royalbit_portfolio::normalize::{classify_status, parse_currency, parse_date, parse_progress};
use royalbit_portfolio::types::{Status, Timestamp};
use std::collections::BTreeMap;

fn day(y: i32, m: u32, d: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn text_row(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|s| if s.is_empty() { Cell::Empty } else { Cell::from(*s) })
        .collect()
}

fn extract(grid: &Grid, today: NaiveDate) -> SheetOutcome {
    let source = SourceIdentity::new("portfolio.xlsx", "fixture");
    let ctx = AssemblyContext {
        source: &source,
        sheet_name: "Projeto API",
        today,
    };
    SheetExtractor::new().unwrap().extract_sheet(grid, ctx)
}

fn june_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_serial_dates_count_days_from_epoch() {
    assert_eq!(parse_date(&Cell::Number(0.0)), Some(day(1899, 12, 30)));
    assert_eq!(parse_date(&Cell::Number(1.0)), Some(day(1899, 12, 31)));
    assert_eq!(parse_date(&Cell::Number(45382.0)), Some(day(2024, 3, 31)));
    for n in [10u32, 365, 20000, 60000] {
        let expected = NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap()
            .checked_add_days(chrono::Days::new(u64::from(n)))
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date(&Cell::Number(f64::from(n))), Some(expected));
    }
}

#[test]
fn test_currency_formats() {
    assert_eq!(parse_currency(&Cell::from("R$ 1.234,56")), 1234.56);
    assert_eq!(parse_currency(&Cell::from("1,234.56")), 1234.56);
    assert_eq!(parse_currency(&Cell::from("garbage")), 0.0);
}

#[test]
fn test_progress_scales() {
    assert_eq!(parse_progress(&Cell::Number(0.5)), 50.0);
    assert_eq!(parse_progress(&Cell::Number(75.0)), 75.0);
    assert_eq!(parse_progress(&Cell::from("42%")), 42.0);
}

#[test]
fn test_status_label_beats_progress() {
    assert_eq!(classify_status("Bloqueado", 100.0, false), Status::Atrasado);
    assert_eq!(classify_status("", 100.0, true), Status::Concluido);
}

// ═══════════════════════════════════════════════════════════════════════════
// END-TO-END SHEET
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_minimal_sheet_yields_one_project() {
    let grid = Grid::new(vec![
        text_row(&["Saving: R$ 100.000,00"]),
        text_row(&["TAREFA", "INICIO", "FIM", "DIAS", "PROGRESSO"]),
        vec![
            Cell::from("Desenvolvimento API"),
            Cell::from("01/03/2024"),
            Cell::from("31/03/2024"),
            Cell::Number(30.0),
            Cell::from("100%"),
        ],
    ]);

    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };

    let mut stages = BTreeMap::new();
    stages.insert("Desenvolvimento".to_string(), 30);

    assert_eq!(project.saving_amount, 100000.0);
    assert_eq!(project.status, Status::Concluido);
    assert_eq!(project.stage_durations, stages);
    assert_eq!(project.baseline_date, Some(day(2024, 3, 31)));
    assert_eq!(project.start_date, Some(day(2024, 3, 1)));
    assert_eq!(project.name, "Projeto API");
    assert_eq!(project.tasks.len(), 1);
}

#[test]
fn test_rich_header_and_offset_table() {
    let grid = Grid::new(vec![
        text_row(&["", "Nome do Projeto:", "Open Finance"]),
        text_row(&["", "Fábrica: Norte", "", "Squad", "Integrações"]),
        text_row(&["", "Descrição", "Conectores com bancos parceiros"]),
        text_row(&["", "Arquiteto: Ana", "AF", "Bruno", "Dev: Carla"]),
        text_row(&["", "Benefício anual:", "R$ 250.000,00"]),
        text_row(&[]),
        text_row(&["", "Etapa", "Início", "Fim", "Dias", "Fim", "% Concluído"]),
        text_row(&["", "Mapeamento", "01/01/2024", "31/01/2024", "30", "05/02/2024", "100%"]),
        text_row(&["", "Dev conectores", "01/02/2024", "30/04/2024", "89", "", "60%"]),
        text_row(&["", "Rollout", "", "31/05/2024", "31", "", "0%"]),
    ]);

    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };

    assert_eq!(project.name, "Open Finance");
    assert_eq!(
        project.description.as_deref(),
        Some("Conectores com bancos parceiros")
    );
    assert_eq!(project.team.factory.as_deref(), Some("Norte"));
    assert_eq!(project.team.squad.as_deref(), Some("Integrações"));
    assert_eq!(project.team.architect.as_deref(), Some("Ana"));
    assert_eq!(project.team.analyst.as_deref(), Some("Bruno"));
    assert_eq!(project.team.developer.as_deref(), Some("Carla"));
    assert_eq!(project.saving_amount, 250000.0);

    assert_eq!(project.tasks.len(), 3);
    assert_eq!(project.tasks[0].actual_end, Some(day(2024, 2, 5)));
    assert_eq!(project.tasks[2].start_date, Some(day(2024, 4, 30)));
    assert_eq!(project.baseline_date, Some(day(2024, 5, 31)));
    assert_eq!(project.progress_percent, 160.0 / 3.0);
    assert_eq!(project.actual_completion_date, None);
    assert_eq!(project.status, Status::Atrasado);

    assert_eq!(project.stage_durations.get("Discovery"), Some(&30));
    assert_eq!(project.stage_durations.get("Desenvolvimento"), Some(&89));
    assert_eq!(project.stage_durations.get("Implantação"), Some(&31));
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADER REGION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_labels_beside_and_below_task_header_within_first_rows() {
    let mut rows = vec![
        text_row(&["Tarefa", "Inicio", "Fim", "Dias", "", "Saving: R$ 5.000,00"]),
        text_row(&["Discovery", "01/03/2024", "31/03/2024", "30", "", "Squad", "Pagamentos"]),
        text_row(&["", "", "", "", "", "Fábrica: Sul"]),
    ];
    rows.resize(15, Vec::new());
    // Row 16 is past the label region
    rows.push(text_row(&["", "", "", "", "", "Arquiteto: Ana"]));

    let SheetOutcome::Project(project) = extract(&Grid::new(rows), june_2024()) else {
        panic!("expected a project");
    };

    assert_eq!(project.saving_amount, 5000.0);
    assert_eq!(project.team.squad.as_deref(), Some("Pagamentos"));
    assert_eq!(project.team.factory.as_deref(), Some("Sul"));
    assert_eq!(project.team.architect, None);
    assert_eq!(project.tasks.len(), 1);
    assert_eq!(project.baseline_date, Some(day(2024, 3, 31)));
}

#[test]
fn test_saving_beside_header_keeps_dateless_sheet() {
    let grid = Grid::new(vec![
        text_row(&["Etapa", "Fim", "", "Benefício", "R$ 8.000,00"]),
        text_row(&["Levantamento", "", "", "", ""]),
    ]);
    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };
    assert_eq!(project.saving_amount, 8000.0);
    assert!(project.tasks.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// STAGE ATTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_task_matching_two_stage_keywords_counts_once() {
    let grid = Grid::new(vec![
        text_row(&["Tarefa", "Inicio", "Fim", "Dias"]),
        text_row(&["Homologação QA Final", "01/04/2024", "10/04/2024", "9"]),
    ]);
    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };

    let mut expected = BTreeMap::new();
    expected.insert("Homologação".to_string(), 9);
    assert_eq!(project.stage_durations, expected);
}

// ═══════════════════════════════════════════════════════════════════════════
// ASSEMBLY RULES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheet_without_tasks_dates_or_saving_is_rejected() {
    let grid = Grid::new(vec![
        text_row(&["Squad: Dados"]),
        text_row(&["Tarefa", "Fim", "Progresso"]),
        text_row(&["Levantamento", "", "10%"]),
    ]);
    assert_eq!(
        extract(&grid, june_2024()),
        SheetOutcome::Skipped(SkipReason::NoScheduleOrSaving)
    );
}

#[test]
fn test_saving_alone_keeps_a_project() {
    let grid = Grid::new(vec![
        text_row(&["Saving", "R$ 12.500,00"]),
        text_row(&["Tarefa", "Fim"]),
    ]);
    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };
    assert_eq!(project.saving_amount, 12500.0);
    assert_eq!(project.status, Status::NaoIniciado);
    assert!(project.tasks.is_empty());
}

#[test]
fn test_sheet_without_task_header_is_skipped() {
    let grid = Grid::new(vec![
        text_row(&["Feriado", "Data"]),
        text_row(&["Natal", "25/12/2024"]),
    ]);
    assert_eq!(
        extract(&grid, june_2024()),
        SheetOutcome::Skipped(SkipReason::NoTaskHeader)
    );
}

#[test]
fn test_future_deadline_in_progress() {
    let grid = Grid::new(vec![
        text_row(&["Tarefa", "Fim", "Progresso"]),
        text_row(&["Discovery", "31/12/2024", "40%"]),
    ]);
    let SheetOutcome::Project(project) = extract(&grid, june_2024()) else {
        panic!("expected a project");
    };
    assert_eq!(project.status, Status::EmAndamento);
}
