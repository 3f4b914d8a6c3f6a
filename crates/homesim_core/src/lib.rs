//! Housing economics simulation library
//!
//! This crate models multi-year outcomes for people who rent, own, or hold
//! fractional equity in homes. It supports:
//! - An equity ledger tracking what fraction of each home every owner holds
//! - Rent split among owners in proportion to their equity
//! - Polymer: renters converting part of their savings into equity in the
//!   home they rent
//! - Amortizing mortgages issued by a bank
//! - Income growth and bracket-based income tax
//! - Deterministic year-by-year runs with a snapshot per year
//!
//! # Builder DSL
//!
//! Use the fluent builder API for ergonomic scenario setup:
//!
//! ```ignore
//! use homesim_core::config::{HomeConfig, IndividualConfig, ScenarioBuilder};
//! use homesim_core::simulation::simulate;
//!
//! let scenario = ScenarioBuilder::new("polymer")
//!     .basic_environment()
//!     .years(10)
//!     .home("house", HomeConfig::basic())
//!     .homeowner("landlord", IndividualConfig::with_savings(800_000.0))
//!     .renter("tenant", IndividualConfig::new_grad().polymer(0.5))
//!     .purchase_home("landlord", "house")
//!     .rent("tenant", "house")
//!     .build();
//!
//! let result = simulate(&scenario)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod environment;
pub mod error;
pub mod simulation;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{
    EnvironmentConfig, HomeConfig, IndividualConfig, ScenarioBuilder, ScenarioConfig, SetupAction,
    TaxBracket,
};
pub use environment::Environment;
pub use error::{ConfigError, LedgerError, ScenarioError};
pub use simulation::{simulate, simulate_batch};
