//! Command line front end for homesim
//!
//! Loads scenario files (YAML or JSON), runs them with `homesim_core` and
//! renders the results as a table, JSON or YAML.

pub mod logging;
pub mod report;
pub mod scenario_file;
pub mod util;

pub use logging::init_logging;
pub use report::{OutputFormat, render, render_comparison};
pub use scenario_file::{EXAMPLE_SCENARIO, load_scenario};
