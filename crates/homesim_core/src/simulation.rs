//! The yearly tick and the scenario runner
//!
//! [`Environment::progress_one_year`] advances every entity through one
//! year in a fixed order:
//!
//! 1. income
//! 2. expenses, paid to the bank
//! 3. rent collection
//! 4. polymer equity contributions
//! 5. income growth and tax bracket recompute
//! 6. home appreciation
//! 7. snapshot
//!
//! Later stages read what earlier ones leave behind, so the order matters.
//! [`simulate`] builds an environment from a [`ScenarioConfig`], applies its
//! setup actions and runs it for the configured number of years.

use std::collections::BTreeMap;

use crate::config::{MortgagePlan, Role, ScenarioConfig, SetupAction};
use crate::environment::{EQUITY_TOLERANCE, Environment};
use crate::error::{ConfigError, LedgerError, Result, ScenarioError};
use crate::model::{
    Home, HomeId, HomeLog, Individual, IndividualId, IndividualLog, Party, PurchaseRecord,
    SimulationResult, Snapshot, StateEvent, truncate_to_cents,
};
use crate::taxes::bracket_rate;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

impl Environment {
    /// Advance the whole environment by one year and return its snapshot.
    ///
    /// The year runs against a working copy and is committed only if every
    /// stage succeeds; on error the environment is left as it was.
    pub fn progress_one_year(&mut self) -> Result<&Snapshot> {
        self.transaction(Self::run_year)?;
        self.logs
            .last()
            .ok_or_else(|| LedgerError::InvariantViolation("no snapshot recorded".to_owned()))
    }

    /// Run `f` on a copy of the environment and keep the copy only if `f`
    /// succeeds. The journal and logs are moved aside rather than cloned.
    fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mut ledger = std::mem::take(&mut self.ledger);
        let mut logs = std::mem::take(&mut self.logs);

        let mut next = self.clone();
        match f(&mut next) {
            Ok(value) => {
                ledger.append(&mut next.ledger);
                logs.append(&mut next.logs);
                next.ledger = ledger;
                next.logs = logs;
                *self = next;
                Ok(value)
            }
            Err(err) => {
                self.ledger = ledger;
                self.logs = logs;
                Err(err)
            }
        }
    }

    fn run_year(&mut self) -> Result<()> {
        self.year += 1;
        let _span = tracing::debug_span!("year", year = self.year).entered();

        self.collect_incomes();
        self.charge_expenses()?;
        let rent = self.collect_all_rent()?;
        let contributed = self.contribute_equity()?;
        self.grow_incomes();
        self.appreciate_homes();

        let snapshot = self.snapshot();
        tracing::debug!(rent, contributed, "year complete");
        self.logs.push(snapshot);
        Ok(())
    }

    fn collect_incomes(&mut self) {
        for individual in self.individuals.values_mut() {
            individual.get_income();
        }
    }

    fn charge_expenses(&mut self) -> Result<()> {
        let mut events = Vec::new();
        for individual in self.individuals.values_mut() {
            for charge in individual.service_expenses(&mut self.bank)? {
                if charge.amount > 0.0 {
                    events.push(StateEvent::Payment {
                        from: Party::individual(&individual.id),
                        to: Party::Bank,
                        amount: charge.amount,
                        reason: charge.name.clone(),
                    });
                }
                if charge.retired {
                    events.push(StateEvent::ExpenseRetired {
                        individual: individual.id.clone(),
                        name: charge.name,
                    });
                }
            }
        }

        for event in events {
            self.record(event);
        }
        Ok(())
    }

    fn collect_all_rent(&mut self) -> Result<f64> {
        let mut total = 0.0;
        for (home, renter) in self.rentals_map.clone() {
            total += self.collect_rent(&renter, &home)?;
        }
        Ok(total)
    }

    fn contribute_equity(&mut self) -> Result<f64> {
        let mut total = 0.0;
        for (home, renter) in self.rentals_map.clone() {
            let enrolled = self
                .individuals
                .get(&renter)
                .is_some_and(|i| i.with_polymer);
            if enrolled {
                total += self.buy_polymer_equity(&renter, &home)?;
            }
        }
        Ok(total)
    }

    /// Convert `equity_contr` of the renter's savings into equity in the
    /// home they rent, bought from every other owner in proportion to their
    /// stake at the premium price. Returns the amount spent.
    fn buy_polymer_equity(&mut self, renter: &IndividualId, home: &HomeId) -> Result<f64> {
        let tenant = self.require_individual(renter)?;
        let budget = tenant.equity_contr * tenant.savings;
        let price = self.require_home(home)?.prop_val * self.config.acquisition_premium;

        let outstanding = 1.0 - self.get_equity_in_home(renter, home);
        let sellers = self.co_owners(home, renter);
        if budget <= 0.0 || outstanding <= EQUITY_TOLERANCE || sellers.is_empty() {
            return Ok(0.0);
        }

        let equity = (budget / price).min(outstanding);
        let mut spent = 0.0;
        for (owner, stake) in sellers {
            let ceded = equity * stake / outstanding;
            spent += self.transfer(
                &Party::individual(renter),
                &Party::individual(&owner),
                ceded * price,
                &format!("polymer equity in home {home}"),
            )?;
            self.move_equity(home, Some(&owner), renter, ceded);
        }

        tracing::debug!(%renter, %home, equity, spent, "polymer contribution");
        Ok(spent)
    }

    fn grow_incomes(&mut self) {
        for individual in self.individuals.values_mut() {
            individual.income *= 1.0 + individual.inc_growth_rate;
            if let Some(rate) = bracket_rate(individual.income, &self.config.tax_brackets) {
                individual.income_tax = rate;
            }
        }
    }

    fn appreciate_homes(&mut self) {
        for home in self.homes.values_mut() {
            home.appreciate(self.config.home_appr_rate);
        }
    }

    fn snapshot(&self) -> Snapshot {
        let date = self.config.start_date.and_then(|start| {
            let span = jiff::Span::new().try_years(i64::from(self.year)).ok()?;
            start.checked_add(span).ok()
        });

        Snapshot {
            year: self.year,
            date,
            homes: self
                .homes
                .values()
                .map(|home| {
                    let log = HomeLog {
                        prop_val: home.prop_val,
                        rent: home.rent,
                    };
                    (home.id.clone(), log)
                })
                .collect(),
            individuals: self
                .individuals
                .values()
                .map(|individual| {
                    let log = IndividualLog {
                        net_worth: individual.savings + self.equity_value(&individual.id),
                        savings: individual.savings,
                    };
                    (individual.id.clone(), log)
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    // =========================================================================
    // Setup actions
    // =========================================================================

    /// Apply one immediate setup action. Deferred mortgage purchases are
    /// attempted once; use [`simulate`] to retry them every year.
    pub fn apply(&mut self, action: &SetupAction) -> Result<()> {
        match action {
            SetupAction::PurchaseHome { buyer, home } => self.purchase_home(buyer, home),
            SetupAction::PurchaseEquity {
                seller,
                buyer,
                home,
                percent,
            } => self
                .purchase_home_equity(seller, buyer, home, *percent)
                .map(|_| ()),
            SetupAction::Rent { renter, home } => self.rent(renter, home),
            SetupAction::IssueMortgage {
                borrower,
                amount,
                loan_term_years,
                annual_interest,
            } => self
                .issue_mortgage(borrower, *amount, *loan_term_years, *annual_interest)
                .map(|_| ()),
            SetupAction::AddExpense {
                individual,
                name,
                amount,
                yearly_payments,
                remove_after,
            } => self.add_expense(individual, name.clone(), *amount, *yearly_payments, *remove_after),
            SetupAction::MortgagePurchase(plan) => self.try_mortgage_purchase(plan).map(|_| ()),
        }
    }

    /// Buy the planned home if the buyer can now cover the down payment.
    ///
    /// The remainder of the price is borrowed from the bank and the buyer
    /// moves out of any other home they rent. Returns `None` while the buyer
    /// is still saving.
    pub fn try_mortgage_purchase(&mut self, plan: &MortgagePlan) -> Result<Option<PurchaseRecord>> {
        let prop_val = self.require_home(&plan.home)?.prop_val;
        let savings = self.require_individual(&plan.buyer)?.savings;

        let cost = (1.0 - self.get_equity_in_home(&plan.buyer, &plan.home)) * prop_val;
        let principal = truncate_to_cents((1.0 - plan.down_payment) * cost);
        if savings + principal < cost {
            return Ok(None);
        }

        let record = self.transaction(|env| {
            let monthly_payment = if principal > 0.0 {
                env.issue_mortgage(
                    &plan.buyer,
                    principal,
                    plan.loan_term_years,
                    plan.annual_interest,
                )?
                .monthly_payment
            } else {
                0.0
            };
            env.purchase_home(&plan.buyer, &plan.home)?;

            let residence = env
                .individual(&plan.buyer)
                .and_then(|i| i.residence.clone());
            if residence.is_some_and(|r| r != plan.home) {
                env.end_tenancy(&plan.buyer)?;
            }

            Ok(PurchaseRecord {
                year: env.year,
                buyer: plan.buyer.clone(),
                home: plan.home.clone(),
                principal,
                monthly_payment,
            })
        })?;

        tracing::info!(
            buyer = %plan.buyer,
            home = %plan.home,
            principal,
            year = self.year,
            "mortgage purchase completed"
        );
        Ok(Some(record))
    }
}

/// Build the environment a scenario describes, before any setup action
pub fn build_environment(scenario: &ScenarioConfig) -> std::result::Result<Environment, ScenarioError> {
    let name = &scenario.name;
    let config_err = |source: ConfigError| ScenarioError::Config {
        scenario: name.clone(),
        source,
    };
    scenario.validate().map_err(config_err)?;

    let mut env = Environment::new(scenario.environment.clone()).map_err(config_err)?;
    let setup_err = |index| {
        move |source: LedgerError| ScenarioError::Setup {
            scenario: name.clone(),
            index,
            source,
        }
    };

    for (index, spec) in scenario.homes.iter().enumerate() {
        let home = Home::from_config(spec.id.clone(), &spec.resolve(&scenario.environment))
            .map_err(config_err)?;
        env.add_home(home).map_err(setup_err(index))?;
    }
    for (index, spec) in scenario.individuals.iter().enumerate() {
        let individual =
            Individual::from_config(spec.id.clone(), &spec.resolve(&scenario.environment))
                .map_err(config_err)?;
        let added = match spec.role {
            Role::Homeowner => env.add_homeowner(individual),
            Role::Renter => env.add_renter(individual),
        };
        added.map_err(setup_err(index))?;
    }

    Ok(env)
}

/// Run one scenario to completion.
///
/// Setup actions run in order before the first year. Mortgage purchases are
/// deferred: each is retried before every year until the buyer can afford
/// the down payment.
pub fn simulate(scenario: &ScenarioConfig) -> std::result::Result<SimulationResult, ScenarioError> {
    let name = scenario.name.clone();
    tracing::info!(scenario = %name, years = scenario.years, "starting scenario");

    let mut env = build_environment(scenario)?;
    let mut pending = Vec::new();
    for (index, action) in scenario.actions.iter().enumerate() {
        match action {
            SetupAction::MortgagePurchase(plan) => pending.push(plan),
            action => env.apply(action).map_err(|source| ScenarioError::Setup {
                scenario: name.clone(),
                index,
                source,
            })?,
        }
    }

    let mut purchases = Vec::new();
    for year in 1..=scenario.years {
        let tick_err = |source: LedgerError| ScenarioError::Tick {
            scenario: name.clone(),
            year,
            source,
        };

        let mut waiting = Vec::with_capacity(pending.len());
        for plan in pending {
            match env.try_mortgage_purchase(plan).map_err(tick_err)? {
                Some(record) => purchases.push(record),
                None => waiting.push(plan),
            }
        }
        pending = waiting;

        env.progress_one_year().map_err(tick_err)?;
    }

    env.check_invariants().map_err(|source| ScenarioError::Tick {
        scenario: name.clone(),
        year: scenario.years,
        source,
    })?;

    if !pending.is_empty() {
        tracing::info!(scenario = %name, unmet = pending.len(), "mortgage purchases never became affordable");
    }
    tracing::info!(scenario = %name, purchases = purchases.len(), "scenario finished");

    Ok(SimulationResult {
        name,
        snapshots: std::mem::take(&mut env.logs),
        purchases,
        ledger: std::mem::take(&mut env.ledger),
    })
}

/// Run independent scenarios, in parallel when the `parallel` feature is on.
/// Results are returned in input order.
pub fn simulate_batch(
    scenarios: &[ScenarioConfig],
) -> Vec<std::result::Result<SimulationResult, ScenarioError>> {
    #[cfg(feature = "parallel")]
    let results = scenarios.par_iter().map(simulate).collect();

    #[cfg(not(feature = "parallel"))]
    let results = scenarios.iter().map(simulate).collect();

    results
}

impl ScenarioConfig {
    pub fn run(&self) -> std::result::Result<SimulationResult, ScenarioError> {
        simulate(self)
    }
}
