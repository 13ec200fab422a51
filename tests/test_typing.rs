//! Tests for the typing debouncer and the peer typing set
//!
//! All timer-dependent tests run on a paused tokio clock so the idle timeout
//! and the expiry window are exact.

mod common;

use std::time::Duration;

use common::settle;
use doctorq_inbox::{ParticipantId, PeerTypingSet, TypingDebouncer, TypingSignal};
use tokio::time::advance;

const IDLE: Duration = Duration::from_secs(2);

// ============================================================================
// Debouncer
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_keystroke_emits_start() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("h");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Start));
    assert!(debouncer.is_typing());

    // Further edits while typing emit nothing.
    debouncer.on_input_changed("he");
    debouncer.on_input_changed("hel");
    assert!(signals.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_emits_stop() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("h");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Start));

    settle().await;
    advance(IDLE + Duration::from_millis(1)).await;
    settle().await;

    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Stop));
    assert!(!debouncer.is_typing());
}

#[tokio::test(start_paused = true)]
async fn test_continued_typing_extends_the_idle_window() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("h");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Start));

    // Keep editing just inside the window.
    for text in ["he", "hel", "hell", "hello"] {
        settle().await;
        advance(Duration::from_millis(1500)).await;
        settle().await;
        debouncer.on_input_changed(text);
    }
    assert!(signals.try_recv().is_err());
    assert!(debouncer.is_typing());

    settle().await;
    advance(IDLE + Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Stop));
}

#[tokio::test(start_paused = true)]
async fn test_cleared_input_emits_immediate_stop() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("h");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Start));

    debouncer.on_input_changed("");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Stop));

    // The aborted idle timer must not fire a second stop.
    settle().await;
    advance(IDLE + Duration::from_millis(1)).await;
    settle().await;
    assert!(signals.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_send_emits_stop_and_cancels_the_timer() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("hello");
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Start));

    debouncer.on_send();
    assert_eq!(signals.try_recv().ok(), Some(TypingSignal::Stop));

    settle().await;
    advance(IDLE + Duration::from_millis(1)).await;
    settle().await;
    assert!(signals.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_while_idle_emits_nothing() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    debouncer.on_input_changed("");
    debouncer.on_send();
    debouncer.flush();
    assert!(signals.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_signals_alternate_strictly() {
    let (debouncer, mut signals) = TypingDebouncer::new(IDLE);

    // A noisy sequence of edits, pauses, clears, and sends.
    debouncer.on_input_changed("a");
    debouncer.on_input_changed("ab");
    settle().await;
    advance(IDLE + Duration::from_millis(1)).await;
    settle().await;
    debouncer.on_input_changed("abc");
    debouncer.on_input_changed("");
    debouncer.on_input_changed("x");
    debouncer.on_send();
    debouncer.on_send();

    let mut received = Vec::new();
    while let Ok(signal) = signals.try_recv() {
        received.push(signal);
    }
    assert_eq!(
        received,
        vec![
            TypingSignal::Start,
            TypingSignal::Stop,
            TypingSignal::Start,
            TypingSignal::Stop,
            TypingSignal::Start,
            TypingSignal::Stop,
        ]
    );
}

// ============================================================================
// Peer typing set
// ============================================================================

#[test]
fn test_peer_start_and_stop() {
    let mut peers = PeerTypingSet::new(None);

    assert!(peers.apply_signal(
        ParticipantId::new("p1"),
        Some("Alice".to_string()),
        true
    ));
    assert_eq!(peers.names(), vec!["Alice"]);

    // Renewal without a name change is invisible.
    assert!(!peers.apply_signal(
        ParticipantId::new("p1"),
        Some("Alice".to_string()),
        true
    ));

    assert!(peers.apply_signal(ParticipantId::new("p1"), None, false));
    assert!(peers.is_empty());

    // A stop for an unknown participant changes nothing.
    assert!(!peers.apply_signal(ParticipantId::new("p2"), None, false));
}

#[test]
fn test_peer_names_sorted_with_id_fallback() {
    let mut peers = PeerTypingSet::new(None);
    peers.apply_signal(ParticipantId::new("p-zz"), None, true);
    peers.apply_signal(ParticipantId::new("p2"), Some("Bob".to_string()), true);
    peers.apply_signal(ParticipantId::new("p3"), Some("Alice".to_string()), true);

    assert_eq!(peers.names(), vec!["Alice", "Bob", "p-zz"]);
}

#[test]
fn test_clear_reports_whether_populated() {
    let mut peers = PeerTypingSet::new(None);
    assert!(!peers.clear());

    peers.apply_signal(ParticipantId::new("p1"), None, true);
    assert!(peers.clear());
    assert!(peers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_peer_entry_expires_without_renewal() {
    let mut peers = PeerTypingSet::new(Some(Duration::from_secs(5)));
    peers.apply_signal(ParticipantId::new("p1"), Some("Alice".to_string()), true);

    advance(Duration::from_secs(3)).await;
    assert!(!peers.prune());
    assert_eq!(peers.names(), vec!["Alice"]);

    advance(Duration::from_secs(3)).await;
    assert!(peers.prune());
    assert!(peers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_peer_renewal_resets_expiry() {
    let mut peers = PeerTypingSet::new(Some(Duration::from_secs(5)));
    peers.apply_signal(ParticipantId::new("p1"), None, true);

    advance(Duration::from_secs(3)).await;
    peers.apply_signal(ParticipantId::new("p1"), None, true);

    advance(Duration::from_secs(3)).await;
    assert!(!peers.prune());
    assert!(!peers.is_empty());

    advance(Duration::from_secs(3)).await;
    assert!(peers.prune());
    assert!(peers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_prune_is_noop_without_expiry() {
    let mut peers = PeerTypingSet::new(None);
    peers.apply_signal(ParticipantId::new("p1"), None, true);

    advance(Duration::from_secs(3600)).await;
    assert!(!peers.prune());
    assert_eq!(peers.names().len(), 1);
}
