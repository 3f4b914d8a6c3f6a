mod bank;
mod entity;
mod home;
mod ids;
mod individual;
mod results;
mod state_event;

pub use bank::{BANK_RESERVES, Bank, MORTGAGE_EXPENSE, Mortgage, monthly_payment};
pub use entity::{Entity, PAYMENT_TOLERANCE, check_payment, truncate_to_cents};
pub use home::Home;
pub use ids::{HomeId, IndividualId, Party};
pub use individual::{Expense, ExpenseCharge, Individual};
pub use results::{HomeLog, IndividualLog, PurchaseRecord, SimulationResult, Snapshot};
pub use state_event::{LedgerEntry, StateEvent};
