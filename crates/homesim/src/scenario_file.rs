//! Loading scenario definitions from disk
//!
//! `.json` files are read with serde_json; everything else is treated as
//! YAML.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use homesim_core::ScenarioConfig;

/// The sample scenario printed by `homesim example`
pub const EXAMPLE_SCENARIO: &str = include_str!("../scenarios/polymer.yaml");

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse a scenario from text in the given format
pub fn parse_scenario(content: &str, json: bool) -> Result<ScenarioConfig> {
    let scenario = if json {
        serde_json::from_str(content).wrap_err("invalid JSON scenario")?
    } else {
        serde_saphyr::from_str(content).wrap_err("invalid YAML scenario")?
    };
    Ok(scenario)
}

/// Read and validate a scenario file
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = parse_scenario(&content, is_json(path))
        .wrap_err_with(|| format!("failed to parse scenario {}", path.display()))?;
    scenario
        .validate()
        .wrap_err_with(|| format!("scenario {} is invalid", path.display()))?;

    tracing::debug!(
        name = %scenario.name,
        years = scenario.years,
        actions = scenario.actions.len(),
        "loaded scenario"
    );
    Ok(scenario)
}
