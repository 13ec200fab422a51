//! Tests for frame parsing and transcript reconciliation

mod common;

use common::message;
use doctorq_inbox::{
    DeliveryStatus, Direction, Frame, InboxError, Transcript, parse_frame_str,
};
use serde_json::json;

// ============================================================================
// Frame parsing
// ============================================================================

#[test]
fn test_parse_message_frame() {
    let payload = json!({
        "type": "message",
        "message": {
            "id": "m1",
            "direction": "inbound",
            "kind": "text",
            "content": "hola",
            "created_at": "2025-06-01T12:00:00Z",
            "status": "delivered"
        }
    })
    .to_string();

    let frame = parse_frame_str(&payload).unwrap();
    match frame {
        Frame::Message { message } => {
            assert_eq!(message.content, "hola");
            assert!(message.is_inbound());
            assert_eq!(message.status, DeliveryStatus::Delivered);
        }
        other => panic!("expected message frame, got {other:?}"),
    }
}

#[test]
fn test_parse_typing_frame() {
    let payload = json!({
        "type": "typing",
        "participant": "p1",
        "display_name": "Alice",
        "started": true
    })
    .to_string();

    let frame = parse_frame_str(&payload).unwrap();
    match frame {
        Frame::Typing {
            participant,
            display_name,
            started,
        } => {
            assert_eq!(participant.unwrap().as_str(), "p1");
            assert_eq!(display_name.as_deref(), Some("Alice"));
            assert!(started);
        }
        other => panic!("expected typing frame, got {other:?}"),
    }
}

#[test]
fn test_parse_typing_frame_without_participant() {
    let frame = parse_frame_str(r#"{"type":"typing","started":false}"#).unwrap();
    match frame {
        Frame::Typing {
            participant,
            started,
            ..
        } => {
            assert!(participant.is_none());
            assert!(!started);
        }
        other => panic!("expected typing frame, got {other:?}"),
    }
}

#[test]
fn test_parse_unknown_frame_kind() {
    let result = parse_frame_str(r#"{"type":"presence","online":true}"#);
    assert!(matches!(result, Err(InboxError::FrameParse { .. })));
}

#[test]
fn test_parse_invalid_json() {
    let result = parse_frame_str("not json at all");
    assert!(matches!(result, Err(InboxError::FrameParse { .. })));
}

#[test]
fn test_outbound_typing_frame_omits_participant() {
    let serialized = serde_json::to_string(&Frame::typing(true)).unwrap();
    assert_eq!(serialized, r#"{"type":"typing","started":true}"#);
}

// ============================================================================
// Transcript reconciliation
// ============================================================================

#[test]
fn test_merge_full_orders_by_timestamp() {
    let mut transcript = Transcript::new();
    let outcome = transcript.merge_full(vec![
        message("m3", Direction::Outbound, 30),
        message("m1", Direction::Inbound, 10),
        message("m2", Direction::Inbound, 20),
    ]);

    let ids: Vec<&str> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(outcome.added, 3);
    assert_eq!(outcome.added_inbound, 2);
    assert!(outcome.length_changed);
    assert!(outcome.needs_scroll());
    assert!(outcome.needs_summary_refresh());
}

#[test]
fn test_merge_full_deduplicates_by_id() {
    let mut transcript = Transcript::new();
    transcript.merge_full(vec![
        message("m1", Direction::Inbound, 10),
        message("m1", Direction::Inbound, 10),
        message("m2", Direction::Outbound, 20),
    ]);
    assert_eq!(transcript.len(), 2);
}

#[test]
fn test_merge_full_identical_list_is_idempotent() {
    let mut transcript = Transcript::new();
    let batch = vec![
        message("m1", Direction::Inbound, 10),
        message("m2", Direction::Outbound, 20),
    ];
    transcript.merge_full(batch.clone());
    let outcome = transcript.merge_full(batch);

    assert_eq!(outcome.added, 0);
    assert!(!outcome.length_changed);
    assert!(!outcome.status_changed);
    assert!(!outcome.needs_scroll());
    assert!(!outcome.needs_summary_refresh());
}

#[test]
fn test_merge_push_inserts_in_timestamp_order() {
    let mut transcript = Transcript::new();
    transcript.merge_full(vec![
        message("m1", Direction::Inbound, 10),
        message("m3", Direction::Inbound, 30),
    ]);

    let outcome = transcript.merge_push(message("m2", Direction::Outbound, 20));

    let ids: Vec<&str> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.added_inbound, 0);
    assert!(outcome.needs_scroll());
    assert!(!outcome.needs_summary_refresh());
}

#[test]
fn test_merge_push_equal_timestamps_keep_arrival_order() {
    let mut transcript = Transcript::new();
    transcript.merge_push(message("m1", Direction::Inbound, 10));
    transcript.merge_push(message("m2", Direction::Inbound, 10));

    let ids: Vec<&str> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[test]
fn test_merge_push_duplicate_is_discarded() {
    let mut transcript = Transcript::new();
    transcript.merge_push(message("m1", Direction::Inbound, 10));
    let outcome = transcript.merge_push(message("m1", Direction::Inbound, 10));

    assert_eq!(transcript.len(), 1);
    assert_eq!(outcome.added, 0);
    assert!(!outcome.length_changed);
}

#[test]
fn test_push_then_refetch_does_not_duplicate() {
    // The push event and the send-triggered refetch both deliver m2.
    let mut transcript = Transcript::new();
    transcript.merge_full(vec![message("m1", Direction::Inbound, 10)]);
    transcript.merge_push(message("m2", Direction::Outbound, 20));

    let outcome = transcript.merge_full(vec![
        message("m1", Direction::Inbound, 10),
        message("m2", Direction::Outbound, 20),
    ]);

    assert_eq!(transcript.len(), 2);
    assert_eq!(outcome.added, 0);
    assert!(!outcome.length_changed);
}

#[test]
fn test_status_update_does_not_scroll() {
    let mut transcript = Transcript::new();
    transcript.merge_full(vec![message("m1", Direction::Outbound, 10)]);

    let mut updated = message("m1", Direction::Outbound, 10);
    updated.status = DeliveryStatus::Read;
    let outcome = transcript.merge_full(vec![updated]);

    assert!(outcome.status_changed);
    assert!(!outcome.length_changed);
    assert!(!outcome.needs_scroll());
    assert_eq!(transcript.messages()[0].status, DeliveryStatus::Read);
}

#[test]
fn test_clear_resets_dedup_state() {
    let mut transcript = Transcript::new();
    transcript.merge_push(message("m1", Direction::Inbound, 10));
    transcript.clear();
    assert!(transcript.is_empty());

    // The same id merges again after a clear.
    let outcome = transcript.merge_push(message("m1", Direction::Inbound, 10));
    assert_eq!(outcome.added, 1);
}

#[test]
fn test_from_cache_seeds_sorted() {
    let transcript = Transcript::from_cache(vec![
        message("m2", Direction::Inbound, 20),
        message("m1", Direction::Inbound, 10),
    ]);
    let ids: Vec<&str> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}
