//! The lender of last resort: near-infinite savings and amortizing mortgages

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::individual::Individual;
use crate::error::{LedgerError, Result};

/// Opening savings of every bank
pub const BANK_RESERVES: f64 = 10_000_000_000.0;

/// Expense name under which mortgage payments are registered
pub const MORTGAGE_EXPENSE: &str = "mortgage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    pub savings: f64,
}

/// Terms of an issued mortgage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mortgage {
    pub principal: f64,
    pub annual_interest: f64,
    pub loan_term_years: u32,
    pub monthly_payment: f64,
}

impl Mortgage {
    pub fn yearly_payment(&self) -> f64 {
        self.monthly_payment * 12.0
    }

    /// Everything paid over the life of the loan beyond the principal
    pub fn total_interest(&self) -> f64 {
        self.yearly_payment() * f64::from(self.loan_term_years) - self.principal
    }
}

/// Fixed monthly payment of a standard amortizing loan.
///
/// `amount * r / (1 - (1 + r)^-n)` with `r` the monthly rate and `n` the
/// number of monthly payments; a zero rate spreads the principal evenly.
pub fn monthly_payment(amount: f64, loan_term_years: u32, annual_interest: f64) -> f64 {
    let monthly_rate = annual_interest / 12.0;
    let months = f64::from(loan_term_years) * 12.0;

    if monthly_rate == 0.0 {
        return amount / months;
    }

    amount * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months))
}

impl Bank {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            savings: BANK_RESERVES,
        }
    }

    /// Lend `amount` to `recipient` and register the repayment schedule as
    /// a monthly expense lasting `loan_term_years`.
    pub fn issue_mortgage(
        &mut self,
        amount: f64,
        loan_term_years: u32,
        annual_interest: f64,
        recipient: &mut Individual,
    ) -> Result<Mortgage> {
        if loan_term_years == 0 {
            return Err(LedgerError::InvalidMortgage(
                "loan term must be at least one year",
            ));
        }
        if annual_interest.is_nan() || annual_interest < 0.0 {
            return Err(LedgerError::InvalidMortgage(
                "interest rate must be non-negative",
            ));
        }

        let payment = monthly_payment(amount, loan_term_years, annual_interest);
        let reason = format!(
            "{amount:.2} loan over {loan_term_years} years with {annual_interest} interest"
        );
        let principal = self.pay(amount, recipient, &reason)?;

        // Cannot fail: the name is fixed and 12 payments a year is valid
        recipient.add_expense(MORTGAGE_EXPENSE, payment, 12, Some(loan_term_years))?;

        tracing::debug!(
            borrower = %recipient.id,
            principal,
            monthly_payment = payment,
            loan_term_years,
            "mortgage issued"
        );

        Ok(Mortgage {
            principal,
            annual_interest,
            loan_term_years,
            monthly_payment: payment,
        })
    }
}

impl Entity for Bank {
    fn id(&self) -> &str {
        &self.id
    }

    fn savings(&self) -> f64 {
        self.savings
    }

    fn savings_mut(&mut self) -> &mut f64 {
        &mut self.savings
    }
}
