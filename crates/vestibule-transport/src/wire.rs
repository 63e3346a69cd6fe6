// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON frame codec for the socket protocol.
//!
//! Frames are JSON objects of the form `{"event": "<name>", "data": {...}}`
//! in both directions, matching the backend's socket contract.

use vestibule_core::{ClientEvent, ServerEvent, VestibuleError};

/// Encodes an outbound client event as a JSON frame.
pub fn encode(event: &ClientEvent) -> Result<String, VestibuleError> {
    serde_json::to_string(event).map_err(|e| VestibuleError::Transport {
        message: format!("failed to encode outbound frame: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Decodes an inbound JSON frame into a server event.
///
/// Frames with an unknown `event` name decode to an error; callers log and
/// drop them rather than tearing down the connection.
pub fn decode(text: &str) -> Result<ServerEvent, VestibuleError> {
    serde_json::from_str(text).map_err(|e| VestibuleError::Transport {
        message: format!("failed to decode inbound frame: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestibule_core::{ChatId, UserId};

    #[test]
    fn encode_room_join_frame() {
        let frame = encode(&ClientEvent::JoinChatRoom {
            chat_id: ChatId("c1".to_string()),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "join_chat_room");
        assert_eq!(value["data"]["chat_id"], "c1");
    }

    #[test]
    fn encode_presence_query_has_no_data_payload() {
        let frame = encode(&ClientEvent::GetOnlineUsers).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "get_online_users");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn decode_message_received_frame() {
        let frame = r#"{
            "event": "message_received",
            "data": {
                "message": {
                    "id": "m1",
                    "chat_id": "c1",
                    "sender_id": "u2",
                    "text": "hello",
                    "created_at": "2026-03-01T12:00:00Z"
                },
                "sender": {"id": "u2", "name": "Ravi Patel"}
            }
        }"#;
        match decode(frame).unwrap() {
            ServerEvent::MessageReceived { message, sender } => {
                assert_eq!(message.chat_id, ChatId("c1".to_string()));
                assert_eq!(sender.id, UserId("u2".to_string()));
            }
            other => panic!("expected MessageReceived, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_unknown_event_name() {
        let frame = r#"{"event": "totally_new_event", "data": {}}"#;
        let err = decode(frame).unwrap_err();
        assert!(matches!(err, VestibuleError::Transport { .. }));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(decode("{not json").is_err());
    }
}
