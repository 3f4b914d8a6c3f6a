//! Simulation results and snapshots
//!
//! A [`Snapshot`] is taken at the end of every simulated year; a
//! [`SimulationResult`] bundles the snapshots of one scenario run.

use std::collections::BTreeMap;

use super::ids::{HomeId, IndividualId};
use super::state_event::LedgerEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLog {
    pub prop_val: f64,
    pub rent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndividualLog {
    pub net_worth: f64,
    pub savings: f64,
}

/// Point-in-time view of every home and individual at the end of a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of completed years (the first snapshot is year 1)
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<jiff::civil::Date>,
    pub homes: BTreeMap<HomeId, HomeLog>,
    pub individuals: BTreeMap<IndividualId, IndividualLog>,
}

/// A deferred mortgage-backed purchase that went through during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Completed years when the purchase happened
    pub year: u32,
    pub buyer: IndividualId,
    pub home: HomeId,
    pub principal: f64,
    pub monthly_payment: f64,
}

/// Complete results from a single scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub name: String,
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,
    /// Journal of state changes; empty when ledger collection is disabled
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
}

impl SimulationResult {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Net worth of one individual at the end of the run
    pub fn final_net_worth(&self, id: &IndividualId) -> Option<f64> {
        self.final_snapshot()?
            .individuals
            .get(id)
            .map(|log| log.net_worth)
    }

    /// Year-by-year net worth of one individual
    pub fn net_worth_series(&self, id: &IndividualId) -> Vec<f64> {
        self.snapshots
            .iter()
            .filter_map(|s| s.individuals.get(id).map(|log| log.net_worth))
            .collect()
    }
}
