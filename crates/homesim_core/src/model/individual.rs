//! Individuals: income earners who rent, own, or co-own homes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, check_payment, truncate_to_cents};
use super::ids::{HomeId, IndividualId};
use crate::config::IndividualConfig;
use crate::error::{ConfigError, LedgerError, Result};

/// A recurring charge serviced once per simulated year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Amount of each payment
    pub amount: f64,
    /// Payments made per year (12 for a monthly bill)
    pub yearly_payments: u32,
    /// Remaining years before the expense retires. `None` never retires.
    pub remove_after: Option<u32>,
}

impl Expense {
    pub fn yearly_cost(&self) -> f64 {
        self.amount * f64::from(self.yearly_payments)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remove_after == Some(0)
    }
}

/// What servicing one expense did this year
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCharge {
    pub name: String,
    pub amount: f64,
    pub retired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: IndividualId,
    /// Changed only through payments and income; read with [`Entity::savings`]
    pub(crate) savings: f64,
    pub income: f64,
    /// Flat effective rate applied to income, in [0, 1]
    pub income_tax: f64,
    pub inc_growth_rate: f64,
    /// Fraction of savings put toward equity in a rented home each year
    pub equity_contr: f64,
    /// Whether this individual accrues equity in the home they rent
    pub with_polymer: bool,
    pub residence: Option<HomeId>,
    pub expenses: BTreeMap<String, Expense>,
}

impl Individual {
    pub fn from_config(
        id: impl Into<IndividualId>,
        config: &IndividualConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            savings: config.savings,
            income: config.income,
            income_tax: config.income_tax,
            inc_growth_rate: config.inc_growth_rate,
            equity_contr: config.equity_contr,
            with_polymer: config.with_polymer,
            residence: None,
            expenses: BTreeMap::new(),
        })
    }

    /// Collect one year of after-tax income
    pub fn get_income(&mut self) {
        self.savings += (1.0 - self.income_tax) * self.income;
    }

    /// Register or overwrite a recurring expense
    pub fn add_expense(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        yearly_payments: u32,
        remove_after: Option<u32>,
    ) -> Result<()> {
        let name = name.into();
        if yearly_payments < 1 {
            return Err(LedgerError::InvalidExpense {
                name,
                reason: "at least one payment per year is required",
            });
        }
        if amount.is_nan() || amount < 0.0 {
            return Err(LedgerError::InvalidExpense {
                name,
                reason: "amount must be non-negative",
            });
        }

        self.expenses.insert(
            name,
            Expense {
                amount,
                yearly_payments,
                remove_after,
            },
        );
        Ok(())
    }

    pub fn remove_expense(&mut self, name: &str) -> Result<Expense> {
        self.expenses
            .remove(name)
            .ok_or_else(|| LedgerError::UnknownExpense {
                individual: self.id.to_string(),
                name: name.to_owned(),
            })
    }

    pub fn expense(&self, name: &str) -> Option<&Expense> {
        self.expenses.get(name)
    }

    /// Total due this year across expenses that are still active
    pub fn total_yearly_expenses(&self) -> f64 {
        self.expenses
            .values()
            .filter(|e| !e.is_exhausted())
            .map(|e| truncate_to_cents(e.yearly_cost()))
            .sum()
    }

    /// Pay one year of every expense to `sink`.
    ///
    /// Each active expense is charged and its countdown decremented. One
    /// that reaches zero is retired right after its final charge, a tick
    /// earlier than waiting for the next pass to find it exhausted; the
    /// number of charges is the same. An expense registered with no years
    /// left is dropped without a charge. Either every charge goes through
    /// or none does.
    pub fn service_expenses<S: Entity>(&mut self, sink: &mut S) -> Result<Vec<ExpenseCharge>> {
        check_payment(
            self.id.as_str(),
            self.savings,
            sink.id(),
            self.total_yearly_expenses(),
            "yearly expenses",
        )?;

        let names: Vec<String> = self.expenses.keys().cloned().collect();
        let mut charges = Vec::with_capacity(names.len());

        for name in names {
            let Some(expense) = self.expenses.get(&name).copied() else {
                continue;
            };

            if expense.is_exhausted() {
                self.expenses.remove(&name);
                charges.push(ExpenseCharge {
                    name,
                    amount: 0.0,
                    retired: true,
                });
                continue;
            }

            let amount = self.pay(expense.yearly_cost(), sink, &name)?;
            let left = expense.remove_after.map(|n| n.saturating_sub(1));
            let retired = left == Some(0);
            if retired {
                self.expenses.remove(&name);
            } else if let Some(entry) = self.expenses.get_mut(&name) {
                entry.remove_after = left;
            }
            charges.push(ExpenseCharge {
                name,
                amount,
                retired,
            });
        }

        Ok(charges)
    }
}

impl Entity for Individual {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn savings(&self) -> f64 {
        self.savings
    }

    fn savings_mut(&mut self) -> &mut f64 {
        &mut self.savings
    }
}
