//! Integration test: moving balance between two domains over the channel
//! transport keeps the holder's locked rate.

use std::sync::Arc;

use rebase_bridge::{BridgeError, BridgeMessage, ChannelTransport, Gateway, PeerConfig};
use rebase_core::{Amount, DomainId, InterestRate};
use rebase_integration_tests::{clock, id, Domain};

const HOME: DomainId = DomainId(1);
const AWAY: DomainId = DomainId(2);

fn gateway(domain: DomainId, peer: DomainId, transport: Arc<ChannelTransport>) -> Gateway {
    let gw = Gateway::new(domain, id("gateway"), transport);
    gw.add_peer(PeerConfig {
        domain: peer,
        remote_gateway: id("gateway"),
        enabled: true,
    });
    gw
}

#[tokio::test]
async fn test_round_trip_preserves_locked_rate() {
    let clock = clock();
    let transport = Arc::new(ChannelTransport::default());
    let mut home_inbox = transport.register(HOME);
    let mut away_inbox = transport.register(AWAY);

    let mut home = Domain::new(clock.clone());
    let mut away = Domain::new(clock.clone());
    let home_gw = gateway(HOME, AWAY, transport.clone());
    let away_gw = gateway(AWAY, HOME, transport.clone());

    // Alice locks the original rate at home, then the home rate drops.
    home.vault
        .deposit(&mut home.ledger, &id("alice"), 500_000)
        .unwrap();
    let locked = home.ledger.user_interest_rate(&id("alice"));
    home.ledger
        .set_interest_rate(&id("owner"), InterestRate(locked.raw() / 10))
        .unwrap();

    // Out to the away domain.
    home_gw
        .send(&mut home.ledger, &id("alice"), AWAY, &id("alice"), Amount::All)
        .await
        .unwrap();
    assert_eq!(home.ledger.balance_of(&id("alice")).unwrap(), 0);

    let received = away_gw
        .receive_next(&mut away.ledger, &mut away_inbox)
        .await
        .expect("inbox open")
        .unwrap();
    assert_eq!(received.payload.rate, locked);
    assert_eq!(away.ledger.balance_of(&id("alice")).unwrap(), 500_000);
    assert_eq!(away.ledger.user_interest_rate(&id("alice")), locked);

    // Accrue away, then come back home.
    clock.advance(7_200);
    let grown = away.ledger.balance_of(&id("alice")).unwrap();
    assert!(grown > 500_000);

    away_gw
        .send(&mut away.ledger, &id("alice"), HOME, &id("alice"), Amount::All)
        .await
        .unwrap();
    home_gw
        .receive_next(&mut home.ledger, &mut home_inbox)
        .await
        .expect("inbox open")
        .unwrap();

    assert_eq!(away.ledger.balance_of(&id("alice")).unwrap(), 0);
    assert_eq!(home.ledger.balance_of(&id("alice")).unwrap(), grown);
    assert_eq!(home.ledger.user_interest_rate(&id("alice")), locked);
    assert_ne!(home.ledger.interest_rate(), locked);
}

#[tokio::test]
async fn test_send_to_unregistered_inbox_restores_sender() {
    let clock = clock();
    let transport = Arc::new(ChannelTransport::default());
    let mut home = Domain::new(clock.clone());
    let home_gw = gateway(HOME, AWAY, transport);

    home.vault
        .deposit(&mut home.ledger, &id("alice"), 1_000)
        .unwrap();
    let rate = home.ledger.user_interest_rate(&id("alice"));

    let err = home_gw
        .send(&mut home.ledger, &id("alice"), AWAY, &id("bob"), Amount::Exact(400))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Transport(_)));
    assert_eq!(home.ledger.balance_of(&id("alice")).unwrap(), 1_000);
    assert_eq!(home.ledger.user_interest_rate(&id("alice")), rate);
    assert_eq!(home.ledger.total_principal(), 1_000);
}

#[tokio::test]
async fn test_message_for_other_domain_is_rejected() {
    let clock = clock();
    let transport = Arc::new(ChannelTransport::default());
    let mut away_inbox = transport.register(AWAY);
    let mut home = Domain::new(clock.clone());
    let mut third = Domain::new(clock.clone());
    let home_gw = gateway(HOME, AWAY, transport.clone());
    let third_gw = gateway(DomainId(3), HOME, transport.clone());

    home.vault
        .deposit(&mut home.ledger, &id("alice"), 1_000)
        .unwrap();
    home_gw
        .send(&mut home.ledger, &id("alice"), AWAY, &id("alice"), Amount::All)
        .await
        .unwrap();

    let bytes = away_inbox.recv().await.unwrap();
    let err = third_gw.receive(&mut third.ledger, &bytes).unwrap_err();
    assert!(matches!(err, BridgeError::WrongDestination { .. }));
    assert_eq!(third.ledger.total_principal(), 0);
}

#[tokio::test]
async fn test_tampered_message_is_rejected_by_receiver() {
    let clock = clock();
    let transport = Arc::new(ChannelTransport::default());
    let mut away_inbox = transport.register(AWAY);
    let mut home = Domain::new(clock.clone());
    let mut away = Domain::new(clock.clone());
    let home_gw = gateway(HOME, AWAY, transport.clone());
    let away_gw = gateway(AWAY, HOME, transport.clone());

    home.vault
        .deposit(&mut home.ledger, &id("alice"), 1_000)
        .unwrap();
    home_gw
        .send(&mut home.ledger, &id("alice"), AWAY, &id("alice"), Amount::All)
        .await
        .unwrap();

    let bytes = away_inbox.recv().await.unwrap();
    let mut message = BridgeMessage::decode(&bytes).unwrap();
    message.payload.amount = 1_000_000;
    message.payload.recipient = id("mallory");

    let err = away_gw
        .receive_message(&mut away.ledger, message)
        .unwrap_err();
    assert!(matches!(err, BridgeError::IdMismatch { .. }));
    assert_eq!(away.ledger.total_principal(), 0);
    assert!(away.ledger.account(&id("mallory")).is_none());

    // The untouched bytes still apply.
    away_gw.receive(&mut away.ledger, &bytes).unwrap();
    assert_eq!(away.ledger.balance_of(&id("alice")).unwrap(), 1_000);
}
