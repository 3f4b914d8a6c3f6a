//! Income tax bracket lookup

use crate::config::TaxBracket;

/// Effective tax rate for `income`.
///
/// Brackets are ascending by `max_amount`; the first one that covers the
/// income applies. An income above every bracket uses the top bracket.
/// Returns `None` only when there are no brackets at all.
pub fn bracket_rate(income: f64, brackets: &[TaxBracket]) -> Option<f64> {
    brackets
        .iter()
        .find(|bracket| bracket.max_amount >= income)
        .or_else(|| brackets.last())
        .map(|bracket| bracket.tax)
}
