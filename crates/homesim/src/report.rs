//! Rendering simulation results for the terminal or a file

use clap::ValueEnum;
use color_eyre::eyre::{Context, Result};
use homesim_core::model::SimulationResult;
use serde::Serialize;

use crate::util::{format_compact_currency, format_currency, format_percentage};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

/// Final position of one individual in one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub scenario: String,
    pub individual: String,
    pub savings: f64,
    pub net_worth: f64,
}

/// One row per individual per scenario, from each final snapshot
pub fn comparison_rows(results: &[SimulationResult]) -> Vec<ComparisonRow> {
    results
        .iter()
        .flat_map(|result| {
            result.final_snapshot().into_iter().flat_map(move |snapshot| {
                snapshot.individuals.iter().map(move |(id, log)| ComparisonRow {
                    scenario: result.name.clone(),
                    individual: id.to_string(),
                    savings: log.savings,
                    net_worth: log.net_worth,
                })
            })
        })
        .collect()
}

fn to_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value).wrap_err("failed to encode JSON")?;
            json.push('\n');
            Ok(json)
        }
        _ => serde_saphyr::to_string(value).wrap_err("failed to encode YAML"),
    }
}

/// Render one scenario run
pub fn render(result: &SimulationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(result_table(result)),
        _ => to_structured(result, format),
    }
}

/// Render the final positions of several runs side by side
pub fn render_comparison(results: &[SimulationResult], format: OutputFormat) -> Result<String> {
    let rows = comparison_rows(results);
    match format {
        OutputFormat::Table => Ok(comparison_table(&rows)),
        _ => to_structured(&rows, format),
    }
}

fn result_table(result: &SimulationResult) -> String {
    let mut out = format!("Scenario: {}\n", result.name);

    let names: Vec<_> = result
        .final_snapshot()
        .map(|s| s.individuals.keys().cloned().collect())
        .unwrap_or_default();

    out.push_str(&format!("{:>6} {:>12}", "Year", "Date"));
    for name in &names {
        out.push_str(&format!(" {:>16}", name.as_str()));
    }
    out.push('\n');

    for snapshot in &result.snapshots {
        let date = snapshot
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:>6} {:>12}", snapshot.year, date));
        for name in &names {
            let cell = snapshot
                .individuals
                .get(name)
                .map(|log| format_compact_currency(log.net_worth))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {:>16}", cell));
        }
        out.push('\n');
    }

    if let Some(last) = result.final_snapshot() {
        out.push_str(&format!(
            "\n{:<16} {:>18} {:>18} {:>8}\n",
            "Home", "Value", "Rent", "Yield"
        ));
        for (id, home) in &last.homes {
            let rent_yield = if home.prop_val > 0.0 {
                home.rent / home.prop_val
            } else {
                0.0
            };
            out.push_str(&format!(
                "{:<16} {:>18} {:>18} {:>8}\n",
                id.as_str(),
                format_currency(home.prop_val),
                format_currency(home.rent),
                format_percentage(rent_yield)
            ));
        }
    }

    for purchase in &result.purchases {
        out.push_str(&format!(
            "\n{} bought {} in year {} with a {} mortgage ({} a month)\n",
            purchase.buyer,
            purchase.home,
            purchase.year,
            format_currency(purchase.principal),
            format_currency(purchase.monthly_payment)
        ));
    }

    out
}

fn comparison_table(rows: &[ComparisonRow]) -> String {
    let header = format!(
        "{:<24} {:<16} {:>18} {:>18}",
        "Scenario", "Individual", "Savings", "Net worth"
    );
    let lines = rows.iter().map(|row| {
        format!(
            "{:<24} {:<16} {:>18} {:>18}",
            row.scenario,
            row.individual,
            format_currency(row.savings),
            format_currency(row.net_worth)
        )
    });

    let mut out = String::new();
    for line in std::iter::once(header).chain(lines) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
