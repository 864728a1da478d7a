use super::OutputFormat;
use crate::analytics::{self, PortfolioReport};
use crate::batch::{import_files, is_portfolio_file, Portfolio};
use crate::error::{PortfolioError, PortfolioResult};
use crate::excel::ImportOptions;
use crate::filter::ProjectFilter;
use crate::types::{Project, Status, Timestamp};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Format an amount as Brazilian reais: `R$ 1.234,56`
fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let digits = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

fn format_date(date: Option<Timestamp>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Status label padded to `width`, colored by status
fn colored_status(status: Status, width: usize) -> ColoredString {
    let label = format!("{:<width$}", status.label());
    let label = label.as_str();
    match status {
        Status::Concluido => label.green(),
        Status::EmAndamento => label.cyan(),
        Status::Atrasado => label.red().bold(),
        Status::Cancelado => label.dimmed(),
        Status::NaoIniciado => label.yellow(),
    }
}

fn print_machine<T: Serialize>(value: &T, format: OutputFormat) -> PortfolioResult<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {}
    }
    Ok(())
}

/// Counts of one gathering pass over the inputs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct InputSummary {
    read: usize,
    failed: usize,
    without_projects: usize,
    found: usize,
    added: usize,
}

/// Merge every input (workbook or saved portfolio) into `portfolio`, in input
/// order. Unreadable inputs are reported and skipped; only all of them failing
/// is an error.
async fn gather(
    portfolio: &mut Portfolio,
    inputs: &[PathBuf],
    options: &ImportOptions,
) -> PortfolioResult<InputSummary> {
    let workbooks: Vec<PathBuf> = inputs
        .iter()
        .filter(|path| !is_portfolio_file(path))
        .cloned()
        .collect();
    let mut imported = import_files(&workbooks, options).await.into_iter();

    let mut summary = InputSummary::default();
    for input in inputs {
        let result = if is_portfolio_file(input) {
            Portfolio::load(input).map(|saved| saved.projects)
        } else {
            match imported.next() {
                Some(outcome) => outcome.result,
                None => continue,
            }
        };

        match result {
            Ok(projects) => {
                summary.read += 1;
                if projects.is_empty() {
                    summary.without_projects += 1;
                    eprintln!(
                        "{} {}",
                        "⚠️  No valid project sheets found in".yellow(),
                        input.display()
                    );
                }
                summary.found += projects.len();
                summary.added += portfolio.merge(projects);
            }
            Err(e) => {
                summary.failed += 1;
                eprintln!(
                    "{} {}: {}",
                    "❌ Could not read".red().bold(),
                    input.display(),
                    e
                );
            }
        }
    }

    if !inputs.is_empty() && summary.failed == inputs.len() {
        return Err(PortfolioError::Workbook(format!(
            "None of the {} input file(s) could be read",
            inputs.len()
        )));
    }
    Ok(summary)
}

/// Execute the import command
pub async fn import(
    files: Vec<PathBuf>,
    output: PathBuf,
    into: Option<PathBuf>,
    options: ImportOptions,
) -> PortfolioResult<()> {
    println!("{}", "📂 Portfolio - Workbook Import".bold().green());
    println!("   Files:  {}", files.len());
    println!("   Output: {}", output.display());
    println!("   As of:  {}\n", options.today);

    let mut portfolio = match &into {
        Some(existing) => {
            let loaded = Portfolio::load(existing)?;
            println!(
                "   Existing portfolio: {} ({} projects)\n",
                existing.display(),
                loaded.len()
            );
            loaded
        }
        None => Portfolio::new(),
    };

    let summary = gather(&mut portfolio, &files, &options).await?;
    portfolio.save(&output)?;
    info!(output = %output.display(), projects = portfolio.len(), "portfolio saved");

    println!("{}", "✅ Import Complete!".bold().green());
    println!("   Files read:        {}", summary.read);
    if summary.failed > 0 {
        println!("   Files failed:      {}", summary.failed.to_string().red());
    }
    if summary.without_projects > 0 {
        println!(
            "   Files w/o projects: {}",
            summary.without_projects.to_string().yellow()
        );
    }
    println!("   Projects found:    {}", summary.found);
    println!("   Projects added:    {}", summary.added.to_string().bold());
    println!(
        "   Duplicates skipped: {}",
        summary.found - summary.added
    );
    println!("   Portfolio total:   {}\n", portfolio.len());

    Ok(())
}

/// Projects of all inputs, merged and filtered
async fn selected_projects(
    inputs: &[PathBuf],
    filter: &ProjectFilter,
    options: &ImportOptions,
) -> PortfolioResult<Vec<Project>> {
    let mut portfolio = Portfolio::new();
    gather(&mut portfolio, inputs, options).await?;
    Ok(filter.select(&portfolio.projects))
}

/// Execute the report command
pub async fn report(
    inputs: Vec<PathBuf>,
    filter: ProjectFilter,
    format: OutputFormat,
    options: ImportOptions,
) -> PortfolioResult<()> {
    let projects = selected_projects(&inputs, &filter, &options).await?;
    let report = analytics::report(&projects, options.today);

    match format {
        OutputFormat::Text => print_report(&report, &filter),
        machine => print_machine(&report, machine)?,
    }
    Ok(())
}

fn print_report(report: &PortfolioReport, filter: &ProjectFilter) {
    println!(
        "{}",
        format!("📊 Portfolio Report (as of {})", report.as_of)
            .bold()
            .green()
    );
    if !filter.is_empty() {
        println!("   {}", "Filtered view".yellow());
    }
    println!();

    let kpis = &report.kpis;
    println!("{}", "📋 KPIs:".bold().cyan());
    println!("   Projects:        {}", kpis.total_projects.to_string().bold());
    println!("   Total saving:    {}", format_currency(kpis.total_saving).bold());
    println!("   Completion rate: {:.1}%", kpis.completion_rate);
    for (status, count) in &kpis.status_distribution {
        println!("      {} {}", colored_status(*status, 14), count);
    }
    println!();

    println!("{}", "⏱️  Average stage duration (days):".bold().cyan());
    if report.stages.is_empty() {
        println!("   -");
    }
    for stage in &report.stages {
        println!(
            "   {} {}",
            format!("{:<16}", stage.stage).bright_blue(),
            stage.average_days
        );
    }
    println!();

    let burnup = &report.burnup;
    println!(
        "{}",
        format!("📈 Burnup (scope: {} tasks):", burnup.total_scope)
            .bold()
            .cyan()
    );
    if burnup.points.is_empty() {
        println!("   No dated tasks\n");
        return;
    }
    println!("   {:<8} {:>8} {:>8} {:>8}", "Month", "Baseline", "Realized", "Forecast");
    let or_dash = |value: Option<usize>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    for point in &burnup.points {
        println!(
            "   {:<8} {:>8} {:>8} {:>8}",
            point.month.format("%Y-%m").to_string(),
            point.baseline,
            or_dash(point.realized),
            or_dash(point.forecast)
        );
    }
    if burnup.is_stalled() {
        println!(
            "\n   {}",
            "⚠️  Realized completions are flat or falling: no forecast shown".yellow()
        );
    }
    println!();
}

/// Execute the list command
pub async fn list(
    inputs: Vec<PathBuf>,
    filter: ProjectFilter,
    format: OutputFormat,
    options: ImportOptions,
) -> PortfolioResult<()> {
    let projects = selected_projects(&inputs, &filter, &options).await?;

    if format != OutputFormat::Text {
        return print_machine(&projects, format);
    }

    println!(
        "{}",
        format!("📁 Portfolio - {} project(s)", projects.len())
            .bold()
            .green()
    );
    for project in &projects {
        println!(
            "   {} {} [{}]",
            colored_status(project.status, 14),
            project.name.bold(),
            project.id.dimmed()
        );
        println!(
            "      Saving: {}  Baseline: {}  Progress: {:.0}%",
            format_currency(project.saving_amount),
            format_date(project.baseline_date),
            project.progress_percent
        );
        if let Some(squad) = &project.team.squad {
            println!("      Squad: {}", squad);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
