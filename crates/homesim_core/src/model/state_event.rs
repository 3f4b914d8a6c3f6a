//! State events - the append-only journal of what the environment did
//!
//! The journal replaces ad-hoc print logging: every payment, equity change
//! and tenancy change is recorded with the simulation year it happened in.
//! Collection can be switched off through `EnvironmentConfig::collect_ledger`.

use super::ids::{HomeId, IndividualId, Party};
use serde::{Deserialize, Serialize};

/// A journal entry recording a state change with the year it happened in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Year the change happened in; 0 for setup before the first year
    pub year: u32,
    pub event: StateEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateEvent {
    Payment {
        from: Party,
        to: Party,
        amount: f64,
        reason: String,
    },

    /// Equity in a home moved between owners. `from: None` means the home
    /// was bought outright from the bank.
    EquityTransfer {
        home: HomeId,
        from: Option<IndividualId>,
        to: IndividualId,
        fraction: f64,
    },

    MortgageIssued {
        borrower: IndividualId,
        principal: f64,
        monthly_payment: f64,
        loan_term_years: u32,
    },

    ExpenseRetired {
        individual: IndividualId,
        name: String,
    },

    TenancyStarted {
        renter: IndividualId,
        home: HomeId,
    },

    TenancyEnded {
        renter: IndividualId,
        home: HomeId,
    },
}
