//! Integration tests for the homesim engine
//!
//! Tests are organized by topic:
//! - `payments` - Cent truncation and all-or-nothing payments
//! - `individual` - Income and recurring expenses
//! - `mortgage` - Mortgage issuance, repayment and deferred purchases
//! - `equity` - Buying homes and equity stakes
//! - `rent` - Tenancies and rent distribution
//! - `simulation` - Multi-year runs through the yearly tick
//! - `scenario` - Scenario configs, the builder and batch runs
//! - `properties` - Property tests for equity and money conservation

mod equity;
mod rent;

use crate::config::{EnvironmentConfig, HomeConfig, IndividualConfig};
use crate::environment::Environment;
use crate::model::{Home, HomeId, Individual, IndividualId};

const HOME: &str = "home";

fn ind(id: &str) -> IndividualId {
    IndividualId::from(id)
}

fn home_id(id: &str) -> HomeId {
    HomeId::from(id)
}

fn new_grad(id: &str) -> Individual {
    Individual::from_config(id, &IndividualConfig::new_grad()).unwrap()
}

fn junior_swe(id: &str) -> Individual {
    Individual::from_config(id, &IndividualConfig::junior_swe()).unwrap()
}

fn savings(env: &Environment, id: &str) -> f64 {
    env.individual(&ind(id)).unwrap().savings
}

fn set_savings(env: &mut Environment, id: &str, amount: f64) {
    env.individual_mut(&ind(id)).unwrap().savings = amount;
}

fn equity(env: &Environment, owner: &str) -> f64 {
    env.get_equity_in_home(&ind(owner), &home_id(HOME))
}

/// A basic environment with an 800k home renting for 36k, a new grad
/// (`ind`) and a junior engineer (`owner`), both registered as homeowners
fn equity_env() -> Environment {
    let mut env = Environment::new(EnvironmentConfig::basic()).unwrap();
    env.add_home(Home::from_config(HOME, &HomeConfig::basic()).unwrap())
        .unwrap();
    env.add_homeowner(new_grad("ind")).unwrap();
    env.add_homeowner(junior_swe("owner")).unwrap();
    env
}

/// `owner` holds the whole home; `renter` is registered with 100k saved
fn rental_env() -> Environment {
    let mut env = Environment::new(EnvironmentConfig::basic()).unwrap();
    env.add_home(Home::from_config(HOME, &HomeConfig::basic()).unwrap())
        .unwrap();
    env.add_homeowner(junior_swe("owner")).unwrap();
    env.add_renter(new_grad("renter")).unwrap();

    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();
    set_savings(&mut env, "renter", 100_000.0);
    env
}
