//! The money-holding primitive shared by individuals and the bank
//!
//! All money movement goes through [`Entity::pay`] (or the environment's
//! equivalent for two entities stored in the same registry), which truncates
//! to whole cents and never lets a payer go below zero.

use crate::error::{LedgerError, Result};

/// Slack allowed when comparing a payment to the payer's savings.
/// Chained fractional computations leave sub-cent noise behind.
pub const PAYMENT_TOLERANCE: f64 = 1e-4;

/// Relative distance from a whole cent treated as representation error
const CENT_SNAP: f64 = 1e-9;

/// Truncate an amount down to whole cents.
///
/// Floors rather than rounds so a payment can never be worth more than what
/// was asked for. A product that lands a hair off a whole cent, such as
/// `0.29 * 100.0 == 28.999999999999996`, is snapped to that cent, but only
/// when the snapped value does not exceed `amount`.
pub fn truncate_to_cents(amount: f64) -> f64 {
    let cents = amount * 100.0;
    let nearest = cents.round();
    if (cents - nearest).abs() <= CENT_SNAP * nearest.abs().max(1.0) {
        let snapped = nearest / 100.0;
        if snapped <= amount {
            return snapped;
        }
    }
    cents.floor() / 100.0
}

/// Validate a payment and return the amount that will move.
///
/// That is `amount` truncated to cents, or the payer's whole balance when
/// the truncated amount exceeds it by no more than [`PAYMENT_TOLERANCE`].
/// The payer is debited and the payee credited with exactly this value.
pub fn check_payment(
    payer: &str,
    available: f64,
    payee: &str,
    amount: f64,
    reason: &str,
) -> Result<f64> {
    if amount.is_nan() || amount < 0.0 {
        return Err(LedgerError::NegativeAmount {
            payer: payer.to_owned(),
            amount,
        });
    }
    let amount = truncate_to_cents(amount);
    if amount > available + PAYMENT_TOLERANCE {
        return Err(LedgerError::InsufficientFunds {
            payer: payer.to_owned(),
            payee: payee.to_owned(),
            amount,
            available,
            reason: reason.to_owned(),
        });
    }
    Ok(amount.min(available.max(0.0)))
}

/// Anything that holds savings and can pay other entities
pub trait Entity {
    fn id(&self) -> &str;

    fn savings(&self) -> f64;

    fn savings_mut(&mut self) -> &mut f64;

    /// Pay `amount` (truncated to cents) to `recipient`.
    ///
    /// Either the whole amount moves or nothing does, and the recipient is
    /// credited exactly what the payer is debited. Returns that amount.
    fn pay<R: Entity + ?Sized>(&mut self, amount: f64, recipient: &mut R, reason: &str) -> Result<f64>
    where
        Self: Sized,
    {
        let amount = check_payment(self.id(), self.savings(), recipient.id(), amount, reason)?;
        *self.savings_mut() -= amount;
        *recipient.savings_mut() += amount;

        tracing::trace!(
            payer = self.id(),
            payee = recipient.id(),
            amount,
            reason,
            "payment"
        );
        Ok(amount)
    }
}
