//! Scenario Builder
//!
//! Fluent construction of a [`ScenarioConfig`] in code, mirroring what a
//! scenario file describes. Entities and actions are recorded in the order
//! they are added.
//!
//! # Example
//!
//! ```ignore
//! use homesim_core::config::{HomeConfig, IndividualConfig, ScenarioBuilder};
//!
//! let scenario = ScenarioBuilder::new("mortgage")
//!     .basic_environment()
//!     .years(30)
//!     .home("house", HomeConfig::basic())
//!     .homeowner("landlord", IndividualConfig::with_savings(800_000.0))
//!     .renter("andy", IndividualConfig::new_grad())
//!     .purchase_home("landlord", "house")
//!     .rent("andy", "house")
//!     .mortgage_purchase("andy", "house")
//!     .build();
//! ```

use super::scenario::{HomeSpec, IndividualSpec, MortgagePlan, Role, ScenarioConfig, SetupAction};
use super::{EnvironmentConfig, HomeConfig, IndividualConfig};
use crate::model::{HomeId, IndividualId};

/// Builder for [`ScenarioConfig`]
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    config: ScenarioConfig,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: ScenarioConfig::new(name),
        }
    }

    #[must_use]
    pub fn years(mut self, years: u32) -> Self {
        self.config.years = years;
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: EnvironmentConfig) -> Self {
        self.config.environment = environment;
        self
    }

    /// 6% appreciation with a single 22.6% bracket
    #[must_use]
    pub fn basic_environment(self) -> Self {
        self.environment(EnvironmentConfig::basic())
    }

    #[must_use]
    pub fn start(mut self, year: i16, month: i8, day: i8) -> Self {
        self.config.environment.start_date = Some(jiff::civil::date(year, month, day));
        self
    }

    /// Skip journaling individual state changes
    #[must_use]
    pub fn without_ledger(mut self) -> Self {
        self.config.environment.collect_ledger = false;
        self
    }

    // =========================================================================
    // Entities
    // =========================================================================

    #[must_use]
    pub fn home(mut self, id: impl Into<HomeId>, config: HomeConfig) -> Self {
        self.config.homes.push(HomeSpec::new(id, config));
        self
    }

    /// A home priced and rented at the environment defaults
    #[must_use]
    pub fn default_home(mut self, id: impl Into<HomeId>) -> Self {
        self.config.homes.push(HomeSpec {
            id: id.into(),
            prop_val: None,
            rent: None,
        });
        self
    }

    #[must_use]
    pub fn homeowner(self, id: impl Into<IndividualId>, config: IndividualConfig) -> Self {
        self.individual(id, Role::Homeowner, config)
    }

    #[must_use]
    pub fn renter(self, id: impl Into<IndividualId>, config: IndividualConfig) -> Self {
        self.individual(id, Role::Renter, config)
    }

    #[must_use]
    pub fn individual(
        mut self,
        id: impl Into<IndividualId>,
        role: Role,
        config: IndividualConfig,
    ) -> Self {
        self.config
            .individuals
            .push(IndividualSpec::new(id, role, config));
        self
    }

    // =========================================================================
    // Setup actions
    // =========================================================================

    #[must_use]
    pub fn action(mut self, action: SetupAction) -> Self {
        self.config.actions.push(action);
        self
    }

    #[must_use]
    pub fn purchase_home(self, buyer: impl Into<IndividualId>, home: impl Into<HomeId>) -> Self {
        self.action(SetupAction::PurchaseHome {
            buyer: buyer.into(),
            home: home.into(),
        })
    }

    #[must_use]
    pub fn purchase_equity(
        self,
        seller: impl Into<IndividualId>,
        buyer: impl Into<IndividualId>,
        home: impl Into<HomeId>,
        percent: f64,
    ) -> Self {
        self.action(SetupAction::PurchaseEquity {
            seller: seller.into(),
            buyer: buyer.into(),
            home: home.into(),
            percent,
        })
    }

    #[must_use]
    pub fn rent(self, renter: impl Into<IndividualId>, home: impl Into<HomeId>) -> Self {
        self.action(SetupAction::Rent {
            renter: renter.into(),
            home: home.into(),
        })
    }

    #[must_use]
    pub fn mortgage(
        self,
        borrower: impl Into<IndividualId>,
        amount: f64,
        loan_term_years: u32,
        annual_interest: f64,
    ) -> Self {
        self.action(SetupAction::IssueMortgage {
            borrower: borrower.into(),
            amount,
            loan_term_years,
            annual_interest,
        })
    }

    /// A monthly expense lasting `years`, or forever when `None`
    #[must_use]
    pub fn monthly_expense(
        self,
        individual: impl Into<IndividualId>,
        name: impl Into<String>,
        amount: f64,
        years: Option<u32>,
    ) -> Self {
        self.action(SetupAction::AddExpense {
            individual: individual.into(),
            name: name.into(),
            amount,
            yearly_payments: 12,
            remove_after: years,
        })
    }

    /// Buy `home` with a 20% down, 30-year mortgage at 6.5% once affordable
    #[must_use]
    pub fn mortgage_purchase(
        self,
        buyer: impl Into<IndividualId>,
        home: impl Into<HomeId>,
    ) -> Self {
        self.action(SetupAction::MortgagePurchase(MortgagePlan::new(buyer, home)))
    }

    #[must_use]
    pub fn mortgage_plan(self, plan: MortgagePlan) -> Self {
        self.action(SetupAction::MortgagePurchase(plan))
    }

    pub fn build(self) -> ScenarioConfig {
        self.config
    }
}
