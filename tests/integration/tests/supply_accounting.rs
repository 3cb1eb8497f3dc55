//! Integration test: supply bookkeeping and authorization across a mixed
//! sequence of operations.

use rebase_core::{Amount, InterestRate};
use rebase_integration_tests::{clock, id, Domain};
use rebase_ledger::{Capability, LedgerError, RebaseLedger};

fn event_supply(ledger: &RebaseLedger) -> i128 {
    ledger.events().iter().map(|r| r.event.supply_delta()).sum()
}

#[test]
fn test_principal_and_events_agree_after_mixed_operations() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    let holders = ["alice", "bob", "carol", "dave"];

    for (i, name) in holders.iter().enumerate() {
        domain
            .vault
            .deposit(&mut domain.ledger, &id(name), 10_000 * (i as u128 + 1))
            .unwrap();
        clock.advance(600);
    }
    domain
        .ledger
        .set_interest_rate(&id("owner"), InterestRate(10_000_000_000_000_000_000_000_000_000))
        .unwrap();
    domain.vault.fund_rewards(&id("owner"), 1_000_000).unwrap();

    for round in 0..20u64 {
        clock.advance(97 + round * 13);
        let from = id(holders[(round % 4) as usize]);
        let to = id(holders[((round + 1) % 4) as usize]);

        let supply_before = domain.ledger.total_supply().unwrap();
        let amount = Amount::Exact(domain.ledger.balance_of(&from).unwrap() / 3);
        domain.ledger.transfer(&from, &to, amount).unwrap();
        assert_eq!(domain.ledger.total_supply().unwrap(), supply_before);

        if round % 5 == 4 {
            domain
                .vault
                .redeem(&mut domain.ledger, &to, Amount::Exact(1_000))
                .unwrap();
        }
    }

    // Tracked principal, the holder table and the event log all agree.
    let snapshot = domain.ledger.snapshot();
    assert_eq!(snapshot.summed_principal(), Some(domain.ledger.total_principal()));
    assert_eq!(
        event_supply(&domain.ledger),
        domain.ledger.total_principal() as i128
    );
    assert_eq!(
        domain.ledger.total_supply().unwrap(),
        domain.summed_balances()
    );
}

#[test]
fn test_zero_balance_recipient_inherits_sender_rate() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    let original = domain.ledger.interest_rate();

    domain
        .vault
        .deposit(&mut domain.ledger, &id("alice"), 50_000)
        .unwrap();
    domain
        .ledger
        .set_interest_rate(&id("owner"), InterestRate(original.raw() / 5))
        .unwrap();
    domain
        .vault
        .deposit(&mut domain.ledger, &id("bob"), 50_000)
        .unwrap();

    // Fresh recipient takes the sender's rate.
    domain
        .ledger
        .transfer(&id("alice"), &id("carol"), Amount::Exact(10_000))
        .unwrap();
    assert_eq!(domain.ledger.user_interest_rate(&id("carol")), original);

    // A recipient with a balance keeps its own.
    let bob_rate = domain.ledger.user_interest_rate(&id("bob"));
    domain
        .ledger
        .transfer(&id("alice"), &id("bob"), Amount::Exact(10_000))
        .unwrap();
    assert_eq!(domain.ledger.user_interest_rate(&id("bob")), bob_rate);
}

#[test]
fn test_unauthorized_calls_change_nothing() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    domain
        .vault
        .deposit(&mut domain.ledger, &id("alice"), 1_000)
        .unwrap();
    let before = domain.ledger.snapshot();
    let rate = domain.ledger.interest_rate();

    let err = domain
        .ledger
        .mint(&id("mallory"), &id("mallory"), 1_000_000, rate)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Unauthorized {
            caller: id("mallory"),
            required: Capability::MintAndBurn,
        }
    );
    assert!(domain
        .ledger
        .burn(&id("mallory"), &id("alice"), Amount::All)
        .is_err());
    assert!(domain
        .ledger
        .set_interest_rate(&id("vault"), InterestRate(1))
        .is_err());
    assert!(domain
        .ledger
        .grant_mint_and_burn(&id("vault"), id("mallory"))
        .is_err());

    assert_eq!(domain.ledger.snapshot(), before);
}

#[test]
fn test_snapshot_restores_accrual() {
    let clock = clock();
    let mut domain = Domain::new(clock.clone());
    domain
        .vault
        .deposit(&mut domain.ledger, &id("alice"), 100_000)
        .unwrap();
    clock.advance(1_800);

    let json = domain.ledger.snapshot().to_json().unwrap();
    let restored = RebaseLedger::from_snapshot(
        rebase_ledger::LedgerSnapshot::from_json(&json).unwrap(),
        clock.clone(),
    )
    .unwrap();

    clock.advance(1_800);
    assert_eq!(
        restored.balance_of(&id("alice")).unwrap(),
        domain.ledger.balance_of(&id("alice")).unwrap()
    );
    assert_eq!(restored.balance_of(&id("alice")).unwrap(), 100_018);
}
