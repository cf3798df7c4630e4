//! Loading gate configuration from serialized policy tables and the environment.

use abuse_guard::infrastructure::mocks::MockClock;
use abuse_guard::{ActorId, Decision, PolicyTable, SecurityGate, ADMIN_IDS_ENV};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_gate_from_json_policies() {
    let json = r#"{
        "actions": {
            "export": { "limit": 1, "window_ms": 60000 }
        },
        "default_action": { "limit": 2, "window_ms": 60000 },
        "spam": {
            "max_similar_messages": 2,
            "max_messages_per_window": 100,
            "window_ms": 10000,
            "block_duration_ms": 1000
        }
    }"#;
    let policies: PolicyTable = serde_json::from_str(json).unwrap();
    let clock = Arc::new(MockClock::new(Instant::now()));
    let gate = SecurityGate::builder()
        .with_clock(clock.clone())
        .with_policies(policies)
        .build()
        .unwrap();

    let actor = Some(ActorId::new(1));
    assert!(gate.evaluate(actor, Some("export"), None).is_admitted());
    assert!(gate.evaluate(actor, Some("export"), None).is_rejected());

    // Actions dropped from the table fall back to the default limit
    assert!(gate.evaluate(actor, Some("upgrade"), None).is_admitted());
    assert!(gate.evaluate(actor, Some("upgrade"), None).is_admitted());
    assert!(gate.evaluate(actor, Some("upgrade"), None).is_rejected());

    let other = Some(ActorId::new(2));
    assert!(gate.evaluate(other, None, Some("hey")).is_admitted());
    assert_eq!(
        gate.evaluate(other, None, Some("hey")),
        Decision::RejectSpam {
            reason: abuse_guard::SpamReason::RepeatedMessage,
            blocked_for: Duration::from_secs(1),
        }
    );
    clock.advance(Duration::from_millis(1001));
    assert!(!gate.is_blocked(ActorId::new(2)));
}

#[test]
fn test_invalid_json_policies_are_rejected() {
    let json = r#"{ "spam": {
        "max_similar_messages": 5,
        "max_messages_per_window": 30,
        "window_ms": 60000,
        "block_duration_ms": 0
    } }"#;
    let err = serde_json::from_str::<PolicyTable>(json).unwrap_err();
    assert!(err.to_string().contains("block duration must be greater than 0"));
}

#[test]
fn test_policy_table_round_trips_through_json() {
    let table = PolicyTable::default();
    let json = serde_json::to_string(&table).unwrap();
    let parsed: PolicyTable = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, table);
}

#[test]
fn test_admins_from_environment() {
    // The only test in this binary touching the variable
    std::env::set_var(ADMIN_IDS_ENV, "100, 200, not-a-number");

    let gate = SecurityGate::builder()
        .with_admins_from_env()
        .build()
        .unwrap();

    assert!(gate.is_admin(ActorId::new(100)));
    assert!(gate.is_admin(ActorId::new(200)));
    assert!(!gate.is_admin(ActorId::new(300)));

    for _ in 0..100 {
        assert!(gate
            .evaluate(Some(ActorId::new(100)), Some("upgrade"), None)
            .is_admitted());
    }
}
