//! Scenario definitions: the entities of one run and how they start out
//!
//! A [`ScenarioConfig`] is what the CLI deserializes from a scenario file.
//! Homes and individuals are given by id, with any value left out filled in
//! from the [`EnvironmentConfig`] defaults. Setup actions run in order
//! before the first year, except [`SetupAction::MortgagePurchase`], which is
//! re-checked before every year until it goes through.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{EnvironmentConfig, HomeConfig, IndividualConfig};
use crate::error::ConfigError;
use crate::model::{HomeId, IndividualId};

fn default_years() -> u32 {
    10
}

fn default_percent() -> f64 {
    1.0
}

fn default_yearly_payments() -> u32 {
    12
}

fn default_down_payment() -> f64 {
    0.2
}

fn default_loan_term() -> u32 {
    30
}

fn default_interest() -> f64 {
    0.065
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Homeowner,
    Renter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSpec {
    pub id: HomeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_val: Option<f64>,
    /// Defaults to `prop_val * default_rent_rate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
}

impl HomeSpec {
    pub fn new(id: impl Into<HomeId>, config: HomeConfig) -> Self {
        Self {
            id: id.into(),
            prop_val: Some(config.prop_val),
            rent: Some(config.rent),
        }
    }

    pub fn resolve(&self, env: &EnvironmentConfig) -> HomeConfig {
        let prop_val = self.prop_val.unwrap_or(env.default_home_price);
        HomeConfig {
            prop_val,
            rent: self.rent.unwrap_or(prop_val * env.default_rent_rate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualSpec {
    pub id: IndividualId,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub income_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inc_growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_contr: Option<f64>,
    #[serde(default)]
    pub savings: f64,
    #[serde(default)]
    pub with_polymer: bool,
}

impl IndividualSpec {
    pub fn new(id: impl Into<IndividualId>, role: Role, config: IndividualConfig) -> Self {
        Self {
            id: id.into(),
            role,
            income: config.income,
            income_tax: config.income_tax,
            inc_growth_rate: Some(config.inc_growth_rate),
            equity_contr: Some(config.equity_contr),
            savings: config.savings,
            with_polymer: config.with_polymer,
        }
    }

    pub fn resolve(&self, env: &EnvironmentConfig) -> IndividualConfig {
        IndividualConfig {
            income: self.income,
            income_tax: self.income_tax,
            inc_growth_rate: self
                .inc_growth_rate
                .unwrap_or(env.default_income_appr_rate),
            equity_contr: self.equity_contr.unwrap_or(env.default_equity_contr),
            savings: self.savings,
            with_polymer: self.with_polymer,
        }
    }
}

/// Wait until the buyer can cover the down payment, then mortgage the rest
/// and buy the home outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgagePlan {
    pub buyer: IndividualId,
    pub home: HomeId,
    /// Fraction of the price paid from savings
    #[serde(default = "default_down_payment")]
    pub down_payment: f64,
    #[serde(default = "default_loan_term")]
    pub loan_term_years: u32,
    #[serde(default = "default_interest")]
    pub annual_interest: f64,
}

impl MortgagePlan {
    pub fn new(buyer: impl Into<IndividualId>, home: impl Into<HomeId>) -> Self {
        Self {
            buyer: buyer.into(),
            home: home.into(),
            down_payment: default_down_payment(),
            loan_term_years: default_loan_term(),
            annual_interest: default_interest(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SetupAction {
    PurchaseHome {
        buyer: IndividualId,
        home: HomeId,
    },
    PurchaseEquity {
        seller: IndividualId,
        buyer: IndividualId,
        home: HomeId,
        /// Share of the seller's stake to buy
        #[serde(default = "default_percent")]
        percent: f64,
    },
    Rent {
        renter: IndividualId,
        home: HomeId,
    },
    IssueMortgage {
        borrower: IndividualId,
        amount: f64,
        #[serde(default = "default_loan_term")]
        loan_term_years: u32,
        #[serde(default = "default_interest")]
        annual_interest: f64,
    },
    AddExpense {
        individual: IndividualId,
        name: String,
        amount: f64,
        #[serde(default = "default_yearly_payments")]
        yearly_payments: u32,
        /// Years the expense lasts; perpetual when absent
        #[serde(default)]
        remove_after: Option<u32>,
    },
    MortgagePurchase(MortgagePlan),
}

impl SetupAction {
    /// Ids this action refers to, for validation
    fn references(&self) -> (Vec<&IndividualId>, Vec<&HomeId>) {
        match self {
            SetupAction::PurchaseHome { buyer, home } => (vec![buyer], vec![home]),
            SetupAction::PurchaseEquity {
                seller,
                buyer,
                home,
                ..
            } => (vec![seller, buyer], vec![home]),
            SetupAction::Rent { renter, home } => (vec![renter], vec![home]),
            SetupAction::IssueMortgage { borrower, .. } => (vec![borrower], vec![]),
            SetupAction::AddExpense { individual, .. } => (vec![individual], vec![]),
            SetupAction::MortgagePurchase(plan) => (vec![&plan.buyer], vec![&plan.home]),
        }
    }
}

/// Everything needed to run one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub homes: Vec<HomeSpec>,
    #[serde(default)]
    pub individuals: Vec<IndividualSpec>,
    #[serde(default)]
    pub actions: Vec<SetupAction>,
}

impl ScenarioConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            years: default_years(),
            environment: EnvironmentConfig::default(),
            homes: Vec::new(),
            individuals: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Check ranges, id uniqueness and that every action refers to a
    /// defined home or individual.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.environment.validate()?;

        let mut homes = BTreeSet::new();
        for spec in &self.homes {
            spec.resolve(&self.environment).validate()?;
            if !homes.insert(&spec.id) {
                return Err(ConfigError::DuplicateId(spec.id.to_string()));
            }
        }

        let mut individuals = BTreeSet::new();
        for spec in &self.individuals {
            spec.resolve(&self.environment).validate()?;
            if !individuals.insert(&spec.id) {
                return Err(ConfigError::DuplicateId(spec.id.to_string()));
            }
        }

        for action in &self.actions {
            let (people, places) = action.references();
            if let Some(id) = people.into_iter().find(|id| !individuals.contains(id)) {
                return Err(ConfigError::UndefinedId(id.to_string()));
            }
            if let Some(id) = places.into_iter().find(|id| !homes.contains(id)) {
                return Err(ConfigError::UndefinedId(id.to_string()));
            }

            if let SetupAction::MortgagePurchase(plan) = action {
                ConfigError::check(
                    "down_payment",
                    "within [0, 1]",
                    plan.down_payment,
                    (0.0..=1.0).contains(&plan.down_payment),
                )?;
            }
        }

        Ok(())
    }
}
