//! Tests for tenancies and rent distribution

use super::{HOME, equity, home_id, ind, junior_swe, new_grad, rental_env, savings, set_savings};
use crate::config::{HomeConfig, IndividualConfig};
use crate::error::{EntityKind, LedgerError};
use crate::model::{Home, Individual};

#[test]
fn test_basic_rent() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();

    assert_eq!(
        env.individual(&ind("renter")).unwrap().residence,
        Some(home_id(HOME))
    );
    assert_eq!(env.renter_of(&home_id(HOME)), Some(&ind("renter")));

    let before = savings(&env, "renter");
    let paid = env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    assert_eq!(paid, 36_000.0);
    assert_eq!(before - savings(&env, "renter"), 36_000.0);
    assert_eq!(savings(&env, "owner"), 36_000.0);
}

#[test]
fn test_unregistered_renter_is_rejected() {
    let mut env = rental_env();

    let err = env.rent(&ind("renter-2"), &home_id(HOME)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::UnknownEntity {
            kind: EntityKind::Renter,
            id: "renter-2".to_owned(),
        }
    );

    // Homeowners are not renters
    let err = env.rent(&ind("owner"), &home_id(HOME)).unwrap_err();
    assert!(matches!(err, LedgerError::UnknownEntity { .. }));
}

#[test]
fn test_new_renter_displaces_previous() {
    let mut env = rental_env();
    env.add_renter(new_grad("renter-2")).unwrap();
    env.rent(&ind("renter-2"), &home_id(HOME)).unwrap();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();

    assert_eq!(
        env.individual(&ind("renter")).unwrap().residence,
        Some(home_id(HOME))
    );
    assert_eq!(env.individual(&ind("renter-2")).unwrap().residence, None);

    let renter_before = savings(&env, "renter");
    let renter2_before = savings(&env, "renter-2");
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();
    let paid = env.collect_rent(&ind("renter-2"), &home_id(HOME)).unwrap();

    assert_eq!(paid, 0.0);
    assert_eq!(renter_before - savings(&env, "renter"), 36_000.0);
    assert_eq!(savings(&env, "renter-2"), renter2_before);
    env.check_invariants().unwrap();
}

#[test]
fn test_moving_releases_previous_home() {
    let mut env = rental_env();
    env.add_home(Home::from_config("flat", &HomeConfig::basic()).unwrap())
        .unwrap();

    env.rent(&ind("renter"), &home_id(HOME)).unwrap();
    env.rent(&ind("renter"), &home_id("flat")).unwrap();

    assert_eq!(env.renter_of(&home_id(HOME)), None);
    assert_eq!(env.renter_of(&home_id("flat")), Some(&ind("renter")));
    env.check_invariants().unwrap();
}

#[test]
fn test_end_tenancy() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();

    let vacated = env.end_tenancy(&ind("renter")).unwrap();

    assert_eq!(vacated, Some(home_id(HOME)));
    assert_eq!(env.renter_of(&home_id(HOME)), None);
    assert_eq!(env.individual(&ind("renter")).unwrap().residence, None);
    assert_eq!(env.end_tenancy(&ind("renter")).unwrap(), None);
}

#[test]
fn test_renter_buys_equity() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();
    set_savings(&mut env, "renter", 800_000.0);

    env.purchase_home_equity(&ind("owner"), &ind("renter"), &home_id(HOME), 0.1)
        .unwrap();
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    assert_eq!(equity(&env, "renter"), 0.1);
    assert!((equity(&env, "owner") - 0.9).abs() < 1e-12);
    let spent = 800_000.0 - savings(&env, "renter");
    assert!((spent - (0.1 * 800_000.0 + 0.9 * 36_000.0)).abs() < 1e-6);
}

#[test]
fn test_renter_buys_home() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();

    let before = savings(&env, "renter");
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();
    assert_eq!(before - savings(&env, "renter"), 36_000.0);

    set_savings(&mut env, "renter", 900_000.0);
    env.purchase_home(&ind("renter"), &home_id(HOME)).unwrap();
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    assert_eq!(savings(&env, "renter"), 100_000.0);
}

#[test]
fn test_rent_is_atomic() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();
    set_savings(&mut env, "renter", 100.0);

    let err = env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(savings(&env, "renter"), 100.0);
    assert_eq!(savings(&env, "owner"), 0.0);
}

#[test]
fn test_robust_renting() {
    let mut env = rental_env();
    env.rent(&ind("renter"), &home_id(HOME)).unwrap();

    let percentages = [0.13, 0.71, 0.05, 0.42, 0.99, 0.27, 0.5, 0.08, 0.64, 0.33];
    let owners: Vec<String> = (0..10).map(|i| format!("owner-{i}")).collect();
    let mut owner_savings = Vec::new();
    for (id, percentage) in owners.iter().zip(percentages) {
        let mut owner = junior_swe(id);
        owner.savings = 800_000.0;
        env.add_homeowner(owner).unwrap();
        env.purchase_home_equity(&ind("owner"), &ind(id), &home_id(HOME), percentage)
            .unwrap();
        owner_savings.push(savings(&env, id));
    }
    env.check_invariants().unwrap();

    let rent = env.home(&home_id(HOME)).unwrap().rent;
    let renter_before = savings(&env, "renter");
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    for (i, id) in owners.iter().enumerate() {
        let received = savings(&env, id) - owner_savings[i];
        assert!((received - equity(&env, id) * rent).abs() < 0.01);
        owner_savings[i] = savings(&env, id);
    }
    assert!((renter_before - savings(&env, "renter") - rent).abs() < 0.001 * rent);

    // The renter buys out the first three co-owners
    set_savings(&mut env, "renter", 1_000_000.0);
    for (i, id) in owners.iter().take(3).enumerate() {
        env.purchase_home_equity(&ind(id), &ind("renter"), &home_id(HOME), 1.0)
            .unwrap();
        owner_savings[i] = savings(&env, id);
    }
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    for (i, id) in owners.iter().enumerate() {
        let received = savings(&env, id) - owner_savings[i];
        if i < 3 {
            assert!(received.abs() < 0.001);
        } else {
            assert!((received - equity(&env, id) * rent).abs() < 0.01);
        }
        owner_savings[i] = savings(&env, id);
    }

    // Once the renter owns everything, rent goes nowhere
    env.purchase_home(&ind("renter"), &home_id(HOME)).unwrap();
    for (i, id) in owners.iter().enumerate() {
        owner_savings[i] = savings(&env, id);
    }
    env.collect_rent(&ind("renter"), &home_id(HOME)).unwrap();

    for (i, id) in owners.iter().enumerate() {
        assert!((savings(&env, id) - owner_savings[i]).abs() < 0.005);
    }
    assert!((equity(&env, "renter") - 1.0).abs() < 1e-9);
    env.check_invariants().unwrap();
}

#[test]
fn test_polymer_renter_is_also_homeowner() {
    let mut env = rental_env();
    let config = IndividualConfig::new_grad().polymer(0.5);
    env.add_renter(Individual::from_config("member", &config).unwrap())
        .unwrap();

    assert!(env.is_renter(&ind("member")));
    assert!(env.is_homeowner(&ind("member")));
    assert!(!env.is_homeowner(&ind("renter")));
}
