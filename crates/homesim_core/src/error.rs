use std::fmt;

use thiserror::Error;

/// Which registry an id was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Home,
    Individual,
    Renter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Home => f.write_str("home"),
            EntityKind::Individual => f.write_str("individual"),
            EntityKind::Renter => f.write_str("renter"),
        }
    }
}

/// Errors raised by ledger, registration and equity operations.
///
/// Every operation that returns one of these has left the environment
/// exactly as it found it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("{payer} cannot pay a negative amount ({amount:.2})")]
    NegativeAmount { payer: String, amount: f64 },

    #[error(
        "{payer} only has {available:.2}, not enough to pay {payee} {amount:.2} for {reason}"
    )]
    InsufficientFunds {
        payer: String,
        payee: String,
        amount: f64,
        available: f64,
        reason: String,
    },

    #[error("{kind} {id} is already part of this environment")]
    DuplicateRegistration { kind: EntityKind, id: String },

    #[error("{kind} {id} is not part of this environment")]
    UnknownEntity { kind: EntityKind, id: String },

    #[error("{seller} cannot sell {percent} of their equity ({held}) in home {home}")]
    EquityOverdraw {
        seller: String,
        home: String,
        percent: f64,
        held: f64,
    },

    #[error("{individual} does not currently pay for expense {name}")]
    UnknownExpense { individual: String, name: String },

    #[error("invalid expense {name}: {reason}")]
    InvalidExpense { name: String, reason: &'static str },

    #[error("invalid mortgage: {0}")]
    InvalidMortgage(&'static str),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl LedgerError {
    pub(crate) fn unknown(kind: EntityKind, id: impl fmt::Display) -> Self {
        LedgerError::UnknownEntity {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: EntityKind, id: impl fmt::Display) -> Self {
        LedgerError::DuplicateRegistration {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Configuration rejected during validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("tax bracket {index} is out of ascending max_amount order")]
    UnorderedTaxBrackets { index: usize },

    #[error("id {0} is defined more than once")]
    DuplicateId(String),

    #[error("{0} is not defined in this scenario")]
    UndefinedId(String),
}

impl ConfigError {
    pub(crate) fn check(
        field: &'static str,
        expected: &'static str,
        value: f64,
        ok: bool,
    ) -> std::result::Result<(), ConfigError> {
        if ok && !value.is_nan() {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field,
                expected,
                value,
            })
        }
    }
}

/// Errors from building or running a whole scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario {scenario}: {source}")]
    Config {
        scenario: String,
        #[source]
        source: ConfigError,
    },

    #[error("scenario {scenario}: setup action {index} failed: {source}")]
    Setup {
        scenario: String,
        index: usize,
        #[source]
        source: LedgerError,
    },

    #[error("scenario {scenario}: year {year} failed: {source}")]
    Tick {
        scenario: String,
        year: u32,
        #[source]
        source: LedgerError,
    },
}
