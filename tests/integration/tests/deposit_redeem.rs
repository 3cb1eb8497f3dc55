//! Integration test: vault deposit, accrual over time, and full redemption.

use rebase_core::{Amount, InterestRate};
use rebase_integration_tests::{clock, id, Domain};
use rebase_ledger::LedgerError;
use rebase_vault::VaultError;

// =========================================================================
// Deposit -> time passes -> redeem everything
// =========================================================================

#[test]
fn test_deposit_warp_and_full_redeem() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    let alice = id("alice");

    domain
        .vault
        .deposit(&mut domain.ledger, &alice, 100_000)
        .expect("deposit should succeed");
    assert_eq!(domain.ledger.balance_of(&alice).unwrap(), 100_000);

    clock.advance(3_600);
    let after_one = domain.ledger.balance_of(&alice).unwrap();
    assert!(after_one > 100_000);

    clock.advance(3_600);
    let after_two = domain.ledger.balance_of(&alice).unwrap();
    let first = after_one - 100_000;
    let second = after_two - after_one;
    assert!(first.abs_diff(second) <= 2, "{first} vs {second}");

    // Interest is paid out of rewards, not out of other depositors.
    domain
        .vault
        .fund_rewards(&id("owner"), after_two - 100_000)
        .unwrap();
    let receipt = domain
        .vault
        .redeem(&mut domain.ledger, &alice, Amount::All)
        .expect("redeem should succeed");

    assert_eq!(receipt.amount, after_two);
    assert_eq!(domain.ledger.balance_of(&alice).unwrap(), 0);
    assert_eq!(domain.ledger.total_principal(), 0);
    assert_eq!(domain.vault.reserves(), 0);
}

#[test]
fn test_accrual_is_linear_over_equal_intervals() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    domain
        .vault
        .deposit(&mut domain.ledger, &id("alice"), 1_000_000_000_000)
        .unwrap();

    let mut previous = 1_000_000_000_000u128;
    let mut steps = Vec::new();
    for _ in 0..5 {
        clock.advance(86_400);
        let now = domain.ledger.balance_of(&id("alice")).unwrap();
        steps.push(now - previous);
        previous = now;
    }
    for pair in steps.windows(2) {
        assert!(pair[0].abs_diff(pair[1]) <= 2, "{:?}", steps);
    }
}

// =========================================================================
// Rate changes only affect new positions
// =========================================================================

#[test]
fn test_lowered_rate_applies_to_new_deposits_only() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    let original = domain.ledger.interest_rate();
    let lower = InterestRate(original.raw() / 2);

    domain
        .vault
        .deposit(&mut domain.ledger, &id("early"), 100_000)
        .unwrap();
    domain
        .ledger
        .set_interest_rate(&id("owner"), lower)
        .unwrap();
    domain
        .vault
        .deposit(&mut domain.ledger, &id("late"), 100_000)
        .unwrap();

    clock.advance(3_600);
    assert_eq!(domain.ledger.user_interest_rate(&id("early")), original);
    assert_eq!(domain.ledger.user_interest_rate(&id("late")), lower);
    assert_eq!(domain.ledger.balance_of(&id("early")).unwrap(), 100_018);
    assert_eq!(domain.ledger.balance_of(&id("late")).unwrap(), 100_009);

    let err = domain
        .ledger
        .set_interest_rate(&id("owner"), original)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::RateCanOnlyDecrease {
            current: lower,
            requested: original,
        }
    );
}

#[test]
fn test_redeem_beyond_reserves_leaves_state_untouched() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    domain
        .vault
        .deposit(&mut domain.ledger, &id("alice"), 100_000)
        .unwrap();
    clock.advance(3_600);

    let before = domain.ledger.snapshot();
    let err = domain
        .vault
        .redeem(&mut domain.ledger, &id("alice"), Amount::All)
        .unwrap_err();
    assert!(matches!(err, VaultError::InsufficientReserves { .. }));
    assert_eq!(domain.ledger.snapshot(), before);
    assert_eq!(domain.vault.reserves(), 100_000);
}
