use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_qos_levels() {
    assert_eq!(QoS::AtMostOnce.level(), 0);
    assert_eq!(QoS::AtLeastOnce.level(), 1);
    assert_eq!(QoS::ExactlyOnce.level(), 2);
    assert_eq!(QoS::default(), QoS::ExactlyOnce);
}

#[test]
fn test_retain_mode_display() {
    assert_eq!(RetainMode::Retain.to_string(), "Retain");
    assert_eq!(RetainMode::DoNotRetain.to_string(), "DoNotRetain");
}

#[test]
fn test_retain_mode_from_bool() {
    assert_eq!(RetainMode::from(true), RetainMode::Retain);
    assert_eq!(RetainMode::from(false), RetainMode::DoNotRetain);
    assert!(RetainMode::Retain.is_retain());
    assert!(!RetainMode::DoNotRetain.is_retain());
}

#[test]
fn test_message_accessors() {
    let msg = Message::new("a/b", "payload", QoS::AtLeastOnce, true);
    assert_eq!(msg.topic(), "a/b");
    assert_eq!(msg.payload().as_ref(), b"payload");
    assert_eq!(msg.qos(), QoS::AtLeastOnce);
    assert!(msg.retained());
}

#[test]
fn test_message_ack_without_callback() {
    let msg = Message::new("a", Bytes::new(), QoS::AtMostOnce, false);
    msg.ack();
}

#[test]
fn test_message_ack_invokes_callback() {
    let acks = Arc::new(AtomicUsize::new(0));
    let counter = acks.clone();
    let msg = Message::new("a", "1", QoS::ExactlyOnce, true).with_ack(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    msg.ack();
    assert_eq!(acks.load(Ordering::SeqCst), 1);

    // Clones share the same acknowledgement.
    msg.clone().ack();
    assert_eq!(acks.load(Ordering::SeqCst), 2);
}

#[test]
fn test_message_debug_shows_payload_text() {
    let msg = Message::new("t", "hello", QoS::ExactlyOnce, false);
    let debug = format!("{:?}", msg);
    assert!(debug.contains("hello"));
    assert!(debug.contains("\"t\""));
}

#[test]
fn test_sweep_outcome_completeness() {
    assert!(SweepOutcome::Quiescent.is_complete());
    assert!(!SweepOutcome::Cancelled.is_complete());
    assert!(!SweepOutcome::TimedOut.is_complete());
    assert!(!SweepOutcome::SubscriptionClosed.is_complete());
}
