use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundEvent {
    #[serde(rename_all = "camelCase")]
    Message {
        event_id: String,
        sender_identity: String,
        #[serde(default)]
        channel_context: Value,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Decision {
        #[serde(default)]
        event_id: Option<String>,
        decision_token: String,
        decider_identity: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Processed,
    Duplicate,
    Ignored(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_envelope_round_trips_camel_case() {
        let raw = r#"{
            "type": "message",
            "eventId": "evt-1",
            "senderIdentity": "a@x.com",
            "channelContext": {"channel": "C1", "thread": "171.2"},
            "text": "add a@x.com to Sales"
        }"#;
        let event: InboundEvent = serde_json::from_str(raw).expect("parse");
        match &event {
            InboundEvent::Message {
                event_id, text, ..
            } => {
                assert_eq!(event_id, "evt-1");
                assert!(text.contains("Sales"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        let encoded = serde_json::to_string(&event).expect("serialize");
        assert!(encoded.contains("\"eventId\""));
    }

    #[test]
    fn decision_envelope_tolerates_missing_event_id() {
        let raw = r#"{
            "type": "decision",
            "decisionToken": "approve-req-1",
            "deciderIdentity": "alice"
        }"#;
        let event: InboundEvent = serde_json::from_str(raw).expect("parse");
        match event {
            InboundEvent::Decision { event_id, .. } => assert!(event_id.is_none()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
