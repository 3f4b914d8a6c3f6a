//! Tests for buying homes and equity stakes

use super::{HOME, equity, equity_env, home_id, ind, junior_swe, savings, set_savings};
use crate::error::{EntityKind, LedgerError};
use crate::model::{BANK_RESERVES, StateEvent};

#[test]
fn test_single_purchase() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);

    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    assert_eq!(savings(&env, "owner"), 0.0);
    assert_eq!(equity(&env, "owner"), 1.0);
    assert_eq!(env.bank().savings, BANK_RESERVES + 800_000.0);
    env.check_invariants().unwrap();
}

#[test]
fn test_purchase_without_funds_fails() {
    let mut env = equity_env();

    let err = env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(savings(&env, "owner"), 30_000.0);
    assert!(env.owners_of(&home_id(HOME)).is_empty());
}

#[test]
fn test_purchase_unknown_home_fails() {
    let mut env = equity_env();

    let err = env.purchase_home(&ind("owner"), &home_id("nowhere")).unwrap_err();

    assert_eq!(
        err,
        LedgerError::UnknownEntity {
            kind: EntityKind::Home,
            id: "nowhere".to_owned(),
        }
    );
}

#[test]
fn test_sell_whole_stake() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    set_savings(&mut env, "ind", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    env.purchase_home_equity(&ind("owner"), &ind("ind"), &home_id(HOME), 1.0)
        .unwrap();

    assert_eq!(savings(&env, "owner"), 800_000.0);
    assert_eq!(savings(&env, "ind"), 0.0);
    assert_eq!(equity(&env, "owner"), 0.0);
    assert_eq!(equity(&env, "ind"), 1.0);
    assert!(!env.owners_of(&home_id(HOME)).contains_key(&ind("owner")));
}

#[test]
fn test_sell_stake_without_buyer_funds_fails() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let err = env
        .purchase_home_equity(&ind("owner"), &ind("ind"), &home_id(HOME), 1.0)
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(equity(&env, "owner"), 1.0);
    assert_eq!(equity(&env, "ind"), 0.0);
}

#[test]
fn test_buy_out_single_owner() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    set_savings(&mut env, "ind", 800_000.0);
    env.purchase_home(&ind("ind"), &home_id(HOME)).unwrap();

    assert_eq!(savings(&env, "owner"), 800_000.0);
    assert_eq!(savings(&env, "ind"), 0.0);
    assert_eq!(equity(&env, "owner"), 0.0);
    assert_eq!(equity(&env, "ind"), 1.0);
}

#[test]
fn test_sell_partial_equity() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    set_savings(&mut env, "ind", 400_000.0);
    let paid = env
        .purchase_home_equity(&ind("owner"), &ind("ind"), &home_id(HOME), 0.5)
        .unwrap();

    assert_eq!(paid, 400_000.0);
    assert_eq!(savings(&env, "owner"), 400_000.0);
    assert_eq!(savings(&env, "ind"), 0.0);
    assert_eq!(equity(&env, "owner"), 0.5);
    assert_eq!(equity(&env, "ind"), 0.5);
    env.check_invariants().unwrap();
}

#[test]
fn test_buy_out_multiple_owners() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let mut owner2 = junior_swe("owner-2");
    owner2.savings = 400_000.0;
    env.add_homeowner(owner2).unwrap();
    env.purchase_home_equity(&ind("owner"), &ind("owner-2"), &home_id(HOME), 0.5)
        .unwrap();
    assert_eq!(equity(&env, "owner"), 0.5);
    assert_eq!(equity(&env, "owner-2"), 0.5);

    let owner_savings = savings(&env, "owner");
    let owner2_savings = savings(&env, "owner-2");

    set_savings(&mut env, "ind", 800_000.0);
    env.purchase_home(&ind("ind"), &home_id(HOME)).unwrap();

    assert_eq!(savings(&env, "owner") - owner_savings, 400_000.0);
    assert_eq!(savings(&env, "owner-2") - owner2_savings, 400_000.0);
    assert_eq!(savings(&env, "ind"), 0.0);
    assert_eq!(equity(&env, "owner"), 0.0);
    assert_eq!(equity(&env, "owner-2"), 0.0);
    assert_eq!(equity(&env, "ind"), 1.0);
}

#[test]
fn test_buyout_is_atomic() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let mut owner2 = junior_swe("owner-2");
    owner2.savings = 400_000.0;
    env.add_homeowner(owner2).unwrap();
    env.purchase_home_equity(&ind("owner"), &ind("owner-2"), &home_id(HOME), 0.5)
        .unwrap();

    // Enough for one half but not both
    set_savings(&mut env, "ind", 500_000.0);
    let err = env.purchase_home(&ind("ind"), &home_id(HOME)).unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(savings(&env, "ind"), 500_000.0);
    assert_eq!(equity(&env, "owner"), 0.5);
    assert_eq!(equity(&env, "owner-2"), 0.5);
    assert_eq!(equity(&env, "ind"), 0.0);
}

#[test]
fn test_buy_out_100_owners() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    for i in 0..100 {
        let percentage = 0.01 / equity(&env, "owner");
        let id = format!("owner-{i}");
        env.add_homeowner(junior_swe(&id)).unwrap();
        env.purchase_home_equity(&ind("owner"), &ind(&id), &home_id(HOME), percentage)
            .unwrap();
    }
    env.check_invariants().unwrap();
    assert_eq!(equity(&env, "owner"), 0.0);

    set_savings(&mut env, "ind", 800_000.0);
    for i in 0..50 {
        env.purchase_home_equity(&ind(&format!("owner-{i}")), &ind("ind"), &home_id(HOME), 1.0)
            .unwrap();
    }
    assert!((0.5 - equity(&env, "ind")).abs() < 0.001);

    env.purchase_home(&ind("ind"), &home_id(HOME)).unwrap();

    assert!((1.0 - equity(&env, "ind")).abs() < 0.001);
    assert_eq!(equity(&env, "owner"), 0.0);
    for i in 0..100 {
        assert_eq!(equity(&env, &format!("owner-{i}")), 0.0);
    }
    env.check_invariants().unwrap();
}

#[test]
fn test_overdraw_is_rejected() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    set_savings(&mut env, "ind", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    for percent in [-0.1, 1.5, f64::NAN] {
        let err = env
            .purchase_home_equity(&ind("owner"), &ind("ind"), &home_id(HOME), percent)
            .unwrap_err();
        assert!(matches!(err, LedgerError::EquityOverdraw { .. }));
    }

    // Selling what one does not hold
    let err = env
        .purchase_home_equity(&ind("ind"), &ind("owner"), &home_id(HOME), 0.5)
        .unwrap_err();
    assert!(matches!(err, LedgerError::EquityOverdraw { .. }));
    assert_eq!(equity(&env, "owner"), 1.0);
}

#[test]
fn test_unknown_seller_is_rejected() {
    let mut env = equity_env();
    let err = env
        .purchase_home_equity(&ind("ghost"), &ind("ind"), &home_id(HOME), 1.0)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::UnknownEntity {
            kind: EntityKind::Individual,
            ..
        }
    ));
}

#[test]
fn test_selling_to_self_is_a_no_op() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let paid = env
        .purchase_home_equity(&ind("owner"), &ind("owner"), &home_id(HOME), 0.5)
        .unwrap();

    assert_eq!(paid, 0.0);
    assert_eq!(equity(&env, "owner"), 1.0);
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut env = equity_env();

    assert!(matches!(
        env.add_homeowner(junior_swe("owner")),
        Err(LedgerError::DuplicateRegistration { .. })
    ));
    assert!(matches!(
        env.add_renter(junior_swe("ind")),
        Err(LedgerError::DuplicateRegistration { .. })
    ));
    assert!(!env.is_renter(&ind("ind")));
}

#[test]
fn test_net_worth_counts_equity() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 900_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let net_worth = env.get_net_worth(&ind("owner")).unwrap();
    assert!((net_worth - 900_000.0).abs() < 1e-6);
}

#[test]
fn test_equity_transfers_are_journaled() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();

    let transfers: Vec<_> = env
        .ledger()
        .iter()
        .filter(|entry| matches!(entry.event, StateEvent::EquityTransfer { .. }))
        .collect();
    assert_eq!(transfers.len(), 1);
    assert_eq!(
        transfers[0].event,
        StateEvent::EquityTransfer {
            home: home_id(HOME),
            from: None,
            to: ind("owner"),
            fraction: 1.0,
        }
    );
}

#[test]
fn test_sale_within_payment_tolerance_conserves_money() {
    let mut env = equity_env();
    set_savings(&mut env, "owner", 800_000.0);
    env.purchase_home(&ind("owner"), &home_id(HOME)).unwrap();
    set_savings(&mut env, "ind", 399_999.99995);
    let money = env.total_money_supply();

    let paid = env
        .purchase_home_equity(&ind("owner"), &ind("ind"), &home_id(HOME), 0.5)
        .unwrap();

    assert_eq!(paid, 399_999.99995);
    assert_eq!(savings(&env, "ind"), 0.0);
    assert_eq!(savings(&env, "owner"), 399_999.99995);
    assert_eq!(equity(&env, "ind"), 0.5);
    assert!((env.total_money_supply() - money).abs() < 1e-9);
    env.check_invariants().unwrap();
}
