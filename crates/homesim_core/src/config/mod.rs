//! Simulation configuration
//!
//! Plain, already-parsed configuration structs. Each is validated once when
//! the entity it describes is constructed; nothing downstream re-checks
//! values by key.
//!
//! # Builder DSL
//!
//! Whole scenarios can be assembled with [`ScenarioBuilder`]:
//!
//! ```ignore
//! use homesim_core::config::{EnvironmentConfig, HomeConfig, IndividualConfig, ScenarioBuilder};
//!
//! let scenario = ScenarioBuilder::new("rent-vs-polymer")
//!     .years(10)
//!     .environment(EnvironmentConfig::basic())
//!     .home("house", HomeConfig::basic())
//!     .homeowner("landlord", IndividualConfig::with_savings(800_000.0))
//!     .renter("tenant", IndividualConfig::new_grad().polymer(0.5))
//!     .purchase_home("landlord", "house")
//!     .rent("tenant", "house")
//!     .build();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod builder;
pub mod scenario;

pub use builder::ScenarioBuilder;
pub use scenario::{HomeSpec, IndividualSpec, MortgagePlan, Role, ScenarioConfig, SetupAction};

fn default_home_price() -> f64 {
    800_000.0
}

fn default_rent_rate() -> f64 {
    0.04
}

fn default_income_appr_rate() -> f64 {
    0.04
}

fn default_equity_contr() -> f64 {
    0.5
}

fn default_acquisition_premium() -> f64 {
    1.1
}

fn default_true() -> bool {
    true
}

/// One progressive tax bracket: incomes up to `max_amount` pay `tax`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub max_amount: f64,
    pub tax: f64,
}

/// Macro parameters shared by every entity in an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Yearly growth of every home's value and rent
    pub home_appr_rate: f64,

    /// Ascending by `max_amount`; an income above every bracket uses the last
    #[serde(default)]
    pub tax_brackets: Vec<TaxBracket>,

    /// Price of a home whose value is not given
    #[serde(default = "default_home_price")]
    pub default_home_price: f64,

    /// Yearly rent as a fraction of value, for homes whose rent is not given
    #[serde(default = "default_rent_rate")]
    pub default_rent_rate: f64,

    #[serde(default = "default_income_appr_rate")]
    pub default_income_appr_rate: f64,

    #[serde(default = "default_equity_contr")]
    pub default_equity_contr: f64,

    /// Multiplier on the price of equity bought through polymer
    /// contributions (closing costs and the seller's premium)
    #[serde(default = "default_acquisition_premium")]
    pub acquisition_premium: f64,

    /// Calendar date of year 0; snapshots are dated when set
    #[serde(default)]
    pub start_date: Option<jiff::civil::Date>,

    /// Whether to keep the journal of state changes
    #[serde(default = "default_true")]
    pub collect_ledger: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            home_appr_rate: 0.0,
            tax_brackets: Vec::new(),
            default_home_price: default_home_price(),
            default_rent_rate: default_rent_rate(),
            default_income_appr_rate: default_income_appr_rate(),
            default_equity_contr: default_equity_contr(),
            acquisition_premium: default_acquisition_premium(),
            start_date: None,
            collect_ledger: true,
        }
    }
}

impl EnvironmentConfig {
    /// 6% appreciation and a single 22.6% bracket
    #[must_use]
    pub fn basic() -> Self {
        Self {
            home_appr_rate: 0.06,
            tax_brackets: vec![TaxBracket {
                max_amount: 1_000_000_000.0,
                tax: 0.226,
            }],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_appreciation(mut self, rate: f64) -> Self {
        self.home_appr_rate = rate;
        self
    }

    #[must_use]
    pub fn with_tax_brackets(mut self, brackets: Vec<TaxBracket>) -> Self {
        self.tax_brackets = brackets;
        self
    }

    #[must_use]
    pub fn with_start_date(mut self, date: jiff::civil::Date) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check(
            "home_appr_rate",
            "greater than -1",
            self.home_appr_rate,
            self.home_appr_rate > -1.0,
        )?;
        ConfigError::check(
            "default_home_price",
            "positive",
            self.default_home_price,
            self.default_home_price > 0.0,
        )?;
        ConfigError::check(
            "default_rent_rate",
            "non-negative",
            self.default_rent_rate,
            self.default_rent_rate >= 0.0,
        )?;
        ConfigError::check(
            "default_equity_contr",
            "within [0, 1]",
            self.default_equity_contr,
            (0.0..=1.0).contains(&self.default_equity_contr),
        )?;
        ConfigError::check(
            "acquisition_premium",
            "at least 1",
            self.acquisition_premium,
            self.acquisition_premium >= 1.0,
        )?;

        let mut previous = f64::NEG_INFINITY;
        for (index, bracket) in self.tax_brackets.iter().enumerate() {
            ConfigError::check(
                "tax",
                "within [0, 1]",
                bracket.tax,
                (0.0..=1.0).contains(&bracket.tax),
            )?;
            if bracket.max_amount.is_nan() || bracket.max_amount < previous {
                return Err(ConfigError::UnorderedTaxBrackets { index });
            }
            previous = bracket.max_amount;
        }

        Ok(())
    }
}

/// A home's opening value and yearly rent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    pub prop_val: f64,
    pub rent: f64,
}

impl HomeConfig {
    /// An 800k home renting for 36k a year
    #[must_use]
    pub fn basic() -> Self {
        Self {
            prop_val: 800_000.0,
            rent: 36_000.0,
        }
    }

    /// A home at the environment's default price and rent rate
    #[must_use]
    pub fn from_defaults(env: &EnvironmentConfig) -> Self {
        Self {
            prop_val: env.default_home_price,
            rent: env.default_home_price * env.default_rent_rate,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check("prop_val", "positive", self.prop_val, self.prop_val > 0.0)?;
        ConfigError::check("rent", "non-negative", self.rent, self.rent >= 0.0)
    }
}

/// Opening finances of an individual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndividualConfig {
    pub income: f64,
    pub income_tax: f64,
    pub inc_growth_rate: f64,
    pub equity_contr: f64,
    pub savings: f64,
    #[serde(default)]
    pub with_polymer: bool,
}

impl IndividualConfig {
    /// No income, only savings
    #[must_use]
    pub fn with_savings(savings: f64) -> Self {
        Self {
            income: 0.0,
            income_tax: 0.0,
            inc_growth_rate: 0.0,
            equity_contr: 0.0,
            savings,
            with_polymer: false,
        }
    }

    /// Fresh graduate: 80k income, 10k saved
    #[must_use]
    pub fn new_grad() -> Self {
        Self {
            income: 80_000.0,
            income_tax: 0.226,
            inc_growth_rate: 0.06,
            equity_contr: 0.5,
            savings: 10_000.0,
            with_polymer: false,
        }
    }

    /// Junior engineer: 110k income, 30k saved
    #[must_use]
    pub fn junior_swe() -> Self {
        Self {
            income: 110_000.0,
            income_tax: 0.226,
            inc_growth_rate: 0.05,
            equity_contr: 0.5,
            savings: 30_000.0,
            with_polymer: false,
        }
    }

    /// Income and savings with growth and contribution taken from the
    /// environment defaults
    #[must_use]
    pub fn from_defaults(env: &EnvironmentConfig, income: f64, savings: f64) -> Self {
        Self {
            income,
            income_tax: 0.0,
            inc_growth_rate: env.default_income_appr_rate,
            equity_contr: env.default_equity_contr,
            savings,
            with_polymer: false,
        }
    }

    /// Enroll in polymer, contributing `equity_contr` of savings each year
    #[must_use]
    pub fn polymer(mut self, equity_contr: f64) -> Self {
        self.with_polymer = true;
        self.equity_contr = equity_contr;
        self
    }

    #[must_use]
    pub fn savings(mut self, savings: f64) -> Self {
        self.savings = savings;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check("income", "non-negative", self.income, self.income >= 0.0)?;
        ConfigError::check(
            "income_tax",
            "within [0, 1]",
            self.income_tax,
            (0.0..=1.0).contains(&self.income_tax),
        )?;
        ConfigError::check(
            "inc_growth_rate",
            "greater than -1",
            self.inc_growth_rate,
            self.inc_growth_rate > -1.0,
        )?;
        ConfigError::check(
            "equity_contr",
            "within [0, 1]",
            self.equity_contr,
            (0.0..=1.0).contains(&self.equity_contr),
        )?;
        ConfigError::check("savings", "non-negative", self.savings, self.savings >= 0.0)
    }
}
