//! The environment: registration, the equity ledger and rent
//!
//! Homes and individuals live in id-keyed registries owned by the
//! [`Environment`]. Who owns what fraction of each home is recorded in the
//! equity ledger (`home_map`), and who rents what in `rentals_map`. Every
//! public operation validates first and mutates second, so a failed call
//! leaves the environment untouched.
//!
//! The yearly tick lives in [`crate::simulation`].

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::config::EnvironmentConfig;
use crate::error::{ConfigError, EntityKind, LedgerError, Result};
use crate::model::{
    Bank, Entity, Expense, Home, HomeId, Individual, IndividualId, LedgerEntry, Mortgage, Party, Snapshot,
    StateEvent, check_payment, truncate_to_cents,
};

/// Allowed drift of a home's equity total away from exactly 1
pub const EQUITY_TOLERANCE: f64 = 1e-6;

/// Stakes at or below this are treated as fully sold
const EQUITY_DUST: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Environment {
    pub(crate) config: EnvironmentConfig,
    pub(crate) homes: BTreeMap<HomeId, Home>,
    pub(crate) individuals: BTreeMap<IndividualId, Individual>,
    pub(crate) homeowners: BTreeSet<IndividualId>,
    pub(crate) renters: BTreeSet<IndividualId>,
    pub(crate) bank: Bank,
    /// home -> (owner -> equity fraction); empty for an unowned home
    pub(crate) home_map: BTreeMap<HomeId, FxHashMap<IndividualId, f64>>,
    /// home -> its single renter
    pub(crate) rentals_map: BTreeMap<HomeId, IndividualId>,
    pub(crate) logs: Vec<Snapshot>,
    pub(crate) ledger: Vec<LedgerEntry>,
    pub(crate) year: u32,
}

impl Environment {
    pub fn new(config: EnvironmentConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            homes: BTreeMap::new(),
            individuals: BTreeMap::new(),
            homeowners: BTreeSet::new(),
            renters: BTreeSet::new(),
            bank: Bank::new("bank"),
            home_map: BTreeMap::new(),
            rentals_map: BTreeMap::new(),
            logs: Vec::new(),
            ledger: Vec::new(),
            year: 0,
        })
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn add_home(&mut self, home: Home) -> Result<()> {
        if self.homes.contains_key(&home.id) {
            return Err(LedgerError::duplicate(EntityKind::Home, &home.id));
        }
        self.home_map.insert(home.id.clone(), FxHashMap::default());
        self.homes.insert(home.id.clone(), home);
        Ok(())
    }

    pub fn add_homeowner(&mut self, owner: Individual) -> Result<()> {
        self.register_individual(owner, false)
    }

    /// Register a renter. Renters enrolled in polymer accrue equity, so they
    /// are listed as homeowners as well.
    pub fn add_renter(&mut self, renter: Individual) -> Result<()> {
        self.register_individual(renter, true)
    }

    fn register_individual(&mut self, individual: Individual, renter: bool) -> Result<()> {
        if self.individuals.contains_key(&individual.id) {
            let kind = if renter {
                EntityKind::Renter
            } else {
                EntityKind::Individual
            };
            return Err(LedgerError::duplicate(kind, &individual.id));
        }

        let id = individual.id.clone();
        if !renter || individual.with_polymer {
            self.homeowners.insert(id.clone());
        }
        if renter {
            self.renters.insert(id.clone());
        }
        self.individuals.insert(id, individual);
        Ok(())
    }

    // =========================================================================
    // Equity ledger
    // =========================================================================

    /// Buy a whole home.
    ///
    /// An unowned home is bought from the bank at its full value. An owned
    /// home is bought out from every current owner, each paid directly for
    /// their whole stake.
    pub fn purchase_home(&mut self, purchaser: &IndividualId, home: &HomeId) -> Result<()> {
        let buyer_savings = self.require_individual(purchaser)?.savings;
        let prop_val = self.require_home(home)?.prop_val;
        let sellers = self.co_owners(home, purchaser);

        if self.owners_of(home).is_empty() {
            let reason = format!("purchase of home {home}");
            let buyer = self
                .individuals
                .get_mut(purchaser)
                .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, purchaser))?;
            let amount = buyer.pay(prop_val, &mut self.bank, &reason)?;

            self.record(StateEvent::Payment {
                from: Party::individual(purchaser),
                to: Party::Bank,
                amount,
                reason,
            });
            self.move_equity(home, None, purchaser, 1.0);
            tracing::debug!(%purchaser, %home, amount, "home purchased from bank");
            return Ok(());
        }

        // Check the whole buyout up front so no seller is paid unless all are
        let total: f64 = sellers
            .iter()
            .map(|(_, stake)| truncate_to_cents(stake * prop_val))
            .sum();
        check_payment(
            purchaser.as_str(),
            buyer_savings,
            "current owners",
            total,
            &format!("buyout of home {home}"),
        )?;

        for (seller, _) in sellers {
            self.purchase_home_equity(&seller, purchaser, home, 1.0)?;
        }
        tracing::debug!(%purchaser, %home, total, "home bought out from owners");
        Ok(())
    }

    /// Buy `percent_of_equity` of the seller's current stake, paying the
    /// seller that share of the home's value. Returns the amount paid.
    pub fn purchase_home_equity(
        &mut self,
        seller: &IndividualId,
        purchaser: &IndividualId,
        home: &HomeId,
        percent_of_equity: f64,
    ) -> Result<f64> {
        self.require_individual(seller)?;
        self.require_individual(purchaser)?;
        let prop_val = self.require_home(home)?.prop_val;

        let held = self.get_equity_in_home(seller, home);
        let overdraw = || LedgerError::EquityOverdraw {
            seller: seller.to_string(),
            home: home.to_string(),
            percent: percent_of_equity,
            held,
        };
        if held <= 0.0
            || percent_of_equity.is_nan()
            || percent_of_equity < 0.0
            || percent_of_equity > 1.0 + EQUITY_TOLERANCE
        {
            return Err(overdraw());
        }
        if seller == purchaser {
            return Ok(0.0);
        }

        let delta = percent_of_equity.min(1.0) * held;
        let amount = self.transfer(
            &Party::individual(purchaser),
            &Party::individual(seller),
            delta * prop_val,
            &format!("{delta} equity in home {home}"),
        )?;
        self.move_equity(home, Some(seller), purchaser, delta);
        Ok(amount)
    }

    /// Move `delta` equity from `from` (or from nobody, for a purchase from
    /// the bank) to `to`. Callers have already validated the stake.
    pub(crate) fn move_equity(
        &mut self,
        home: &HomeId,
        from: Option<&IndividualId>,
        to: &IndividualId,
        delta: f64,
    ) {
        let Some(stakes) = self.home_map.get_mut(home) else {
            return;
        };

        if let Some(seller) = from {
            let remaining = stakes.get(seller).copied().unwrap_or(0.0) - delta;
            if remaining <= EQUITY_DUST {
                stakes.remove(seller);
            } else {
                stakes.insert(seller.clone(), remaining);
            }
        }

        let stake = stakes.entry(to.clone()).or_insert(0.0);
        *stake = (*stake + delta).min(1.0);

        self.record(StateEvent::EquityTransfer {
            home: home.clone(),
            from: from.cloned(),
            to: to.clone(),
            fraction: delta,
        });
    }

    // =========================================================================
    // Renting
    // =========================================================================

    /// Move a renter into a home.
    ///
    /// A previous renter of the home is displaced and the renter's previous
    /// home, if any, is released. Equity is unaffected.
    pub fn rent(&mut self, renter: &IndividualId, home: &HomeId) -> Result<()> {
        if !self.renters.contains(renter) {
            return Err(LedgerError::unknown(EntityKind::Renter, renter));
        }
        self.require_home(home)?;

        let previous = self.require_individual(renter)?.residence.clone();
        if let Some(previous) = previous.filter(|p| p != home) {
            self.release(renter, &previous);
        }

        if let Some(displaced) = self.rentals_map.get(home).cloned() {
            if displaced != *renter {
                self.release(&displaced, home);
            }
        }

        self.rentals_map.insert(home.clone(), renter.clone());
        if let Some(tenant) = self.individuals.get_mut(renter) {
            tenant.residence = Some(home.clone());
        }
        self.record(StateEvent::TenancyStarted {
            renter: renter.clone(),
            home: home.clone(),
        });
        Ok(())
    }

    /// Move a renter out of wherever they live. Returns the home vacated.
    pub fn end_tenancy(&mut self, renter: &IndividualId) -> Result<Option<HomeId>> {
        let residence = self.require_individual(renter)?.residence.clone();
        if let Some(home) = &residence {
            self.release(renter, home);
        }
        Ok(residence)
    }

    fn release(&mut self, renter: &IndividualId, home: &HomeId) {
        if self.rentals_map.get(home) == Some(renter) {
            self.rentals_map.remove(home);
        }
        if let Some(tenant) = self.individuals.get_mut(renter) {
            if tenant.residence.as_ref() == Some(home) {
                tenant.residence = None;
            }
        }
        self.record(StateEvent::TenancyEnded {
            renter: renter.clone(),
            home: home.clone(),
        });
    }

    /// Pay one year of rent to the home's owners, in proportion to their
    /// equity. The renter's own share is forgiven. Does nothing unless the
    /// renter lives in `home`. Returns the total paid.
    pub fn collect_rent(&mut self, renter: &IndividualId, home: &HomeId) -> Result<f64> {
        let tenant = self.require_individual(renter)?;
        if tenant.residence.as_ref() != Some(home) {
            return Ok(0.0);
        }
        let available = tenant.savings;
        let rent = self.require_home(home)?.rent;
        let owners = self.co_owners(home, renter);

        let due: f64 = owners
            .iter()
            .map(|(_, equity)| truncate_to_cents(equity * rent))
            .sum();
        check_payment(renter.as_str(), available, "owners", due, "rent")?;

        let mut total = 0.0;
        for (owner, equity) in owners {
            total += self.transfer(
                &Party::individual(renter),
                &Party::Individual(owner),
                equity * rent,
                "rent",
            )?;
        }
        Ok(total)
    }

    // =========================================================================
    // Lending
    // =========================================================================

    /// Issue a mortgage from this environment's bank
    pub fn issue_mortgage(
        &mut self,
        borrower: &IndividualId,
        amount: f64,
        loan_term_years: u32,
        annual_interest: f64,
    ) -> Result<Mortgage> {
        let recipient = self
            .individuals
            .get_mut(borrower)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, borrower))?;
        let mortgage =
            self.bank
                .issue_mortgage(amount, loan_term_years, annual_interest, recipient)?;

        self.record(StateEvent::Payment {
            from: Party::Bank,
            to: Party::individual(borrower),
            amount: mortgage.principal,
            reason: "mortgage principal".to_owned(),
        });
        self.record(StateEvent::MortgageIssued {
            borrower: borrower.clone(),
            principal: mortgage.principal,
            monthly_payment: mortgage.monthly_payment,
            loan_term_years,
        });
        Ok(mortgage)
    }

    // =========================================================================
    // Payments between registered parties
    // =========================================================================

    /// Move money between two parties held by this environment. Same
    /// contract as [`Entity::pay`].
    pub(crate) fn transfer(
        &mut self,
        from: &Party,
        to: &Party,
        amount: f64,
        reason: &str,
    ) -> Result<f64> {
        let amount = {
            let (payer, available) = self.party_account(from)?;
            let (payee, _) = self.party_account(to)?;
            check_payment(payer, available, payee, amount, reason)?
        };

        if from != to {
            *self.party_savings_mut(from)? -= amount;
            *self.party_savings_mut(to)? += amount;
        }

        tracing::trace!(payer = %from, payee = %to, amount, reason, "payment");
        self.record(StateEvent::Payment {
            from: from.clone(),
            to: to.clone(),
            amount,
            reason: reason.to_owned(),
        });
        Ok(amount)
    }

    fn party_account(&self, party: &Party) -> Result<(&str, f64)> {
        match party {
            Party::Bank => Ok((self.bank.id(), self.bank.savings())),
            Party::Individual(id) => self
                .individuals
                .get(id)
                .map(|i| (i.id(), i.savings()))
                .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, id)),
        }
    }

    fn party_savings_mut(&mut self, party: &Party) -> Result<&mut f64> {
        match party {
            Party::Bank => Ok(self.bank.savings_mut()),
            Party::Individual(id) => self
                .individuals
                .get_mut(id)
                .map(|i| i.savings_mut())
                .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, id)),
        }
    }

    pub(crate) fn record(&mut self, event: StateEvent) {
        if self.config.collect_ledger {
            self.ledger.push(LedgerEntry {
                year: self.year,
                event,
            });
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fraction of `home` held by `owner`; 0 when they hold no stake
    pub fn get_equity_in_home(&self, owner: &IndividualId, home: &HomeId) -> f64 {
        self.home_map
            .get(home)
            .and_then(|stakes| stakes.get(owner))
            .copied()
            .unwrap_or(0.0)
    }

    /// Savings plus the market value of every equity stake held
    pub fn get_net_worth(&self, individual: &IndividualId) -> Result<f64> {
        let savings = self.require_individual(individual)?.savings;
        Ok(savings + self.equity_value(individual))
    }

    pub(crate) fn equity_value(&self, individual: &IndividualId) -> f64 {
        self.home_map
            .iter()
            .filter_map(|(home_id, stakes)| {
                let stake = stakes.get(individual)?;
                let home = self.homes.get(home_id)?;
                Some(stake * home.prop_val)
            })
            .sum()
    }

    /// Owners of a home and their stakes, ordered by id
    pub fn owners_of(&self, home: &HomeId) -> BTreeMap<IndividualId, f64> {
        self.home_map
            .get(home)
            .map(|stakes| stakes.iter().map(|(id, s)| (id.clone(), *s)).collect())
            .unwrap_or_default()
    }

    /// Owners other than `excluded`, ordered by id
    pub(crate) fn co_owners(
        &self,
        home: &HomeId,
        excluded: &IndividualId,
    ) -> Vec<(IndividualId, f64)> {
        self.owners_of(home)
            .into_iter()
            .filter(|(id, _)| id != excluded)
            .collect()
    }

    pub fn renter_of(&self, home: &HomeId) -> Option<&IndividualId> {
        self.rentals_map.get(home)
    }

    /// Savings across every individual and the bank
    pub fn total_money_supply(&self) -> f64 {
        self.bank.savings + self.individuals.values().map(|i| i.savings).sum::<f64>()
    }

    /// Verify the ledger invariants: equity sums, stake bounds, non-negative
    /// savings and renter/residence agreement.
    pub fn check_invariants(&self) -> Result<()> {
        for (home, stakes) in &self.home_map {
            let total: f64 = stakes.values().sum();
            if !stakes.is_empty() && (total - 1.0).abs() > EQUITY_TOLERANCE {
                return Err(LedgerError::InvariantViolation(format!(
                    "equity in home {home} sums to {total}"
                )));
            }
            if let Some((owner, stake)) = stakes
                .iter()
                .find(|(_, s)| !(0.0..=1.0).contains(*s))
            {
                return Err(LedgerError::InvariantViolation(format!(
                    "{owner} holds {stake} of home {home}"
                )));
            }
        }

        if let Some(individual) = self.individuals.values().find(|i| i.savings < 0.0) {
            return Err(LedgerError::InvariantViolation(format!(
                "{} has negative savings {}",
                individual.id, individual.savings
            )));
        }
        if self.bank.savings < 0.0 {
            return Err(LedgerError::InvariantViolation(
                "bank has negative savings".to_owned(),
            ));
        }

        for (home, renter) in &self.rentals_map {
            let residence = self.individuals.get(renter).and_then(|i| i.residence.as_ref());
            if residence != Some(home) {
                return Err(LedgerError::InvariantViolation(format!(
                    "{renter} rents home {home} but does not live there"
                )));
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn home(&self, id: &HomeId) -> Option<&Home> {
        self.homes.get(id)
    }

    pub fn homes(&self) -> impl Iterator<Item = &Home> {
        self.homes.values()
    }

    pub fn individual(&self, id: &IndividualId) -> Option<&Individual> {
        self.individuals.get(id)
    }

    pub(crate) fn individual_mut(&mut self, id: &IndividualId) -> Option<&mut Individual> {
        self.individuals.get_mut(id)
    }

    /// Register or overwrite a recurring expense of `individual`
    pub fn add_expense(
        &mut self,
        individual: &IndividualId,
        name: impl Into<String>,
        amount: f64,
        yearly_payments: u32,
        remove_after: Option<u32>,
    ) -> Result<()> {
        self.individual_mut(individual)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, individual))?
            .add_expense(name, amount, yearly_payments, remove_after)
    }

    pub fn remove_expense(&mut self, individual: &IndividualId, name: &str) -> Result<Expense> {
        self.individual_mut(individual)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, individual))?
            .remove_expense(name)
    }

    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    pub fn is_homeowner(&self, id: &IndividualId) -> bool {
        self.homeowners.contains(id)
    }

    pub fn is_renter(&self, id: &IndividualId) -> bool {
        self.renters.contains(id)
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn logs(&self) -> &[Snapshot] {
        &self.logs
    }

    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    /// Completed years
    pub fn year(&self) -> u32 {
        self.year
    }

    pub(crate) fn require_home(&self, id: &HomeId) -> Result<&Home> {
        self.homes
            .get(id)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Home, id))
    }

    pub(crate) fn require_individual(&self, id: &IndividualId) -> Result<&Individual> {
        self.individuals
            .get(id)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Individual, id))
    }
}
