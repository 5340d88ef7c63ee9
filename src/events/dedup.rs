use super::message::InboundEvent;
use crate::store::{RequestStore, StoreError};
use rusqlite::params;
use sha2::{Digest, Sha256};

pub fn dedup_key(event: &InboundEvent) -> String {
    match event {
        InboundEvent::Message { event_id, .. } => format!("msg-{event_id}"),
        InboundEvent::Decision {
            event_id: Some(event_id),
            ..
        } => format!("dec-{event_id}"),
        InboundEvent::Decision {
            event_id: None,
            decision_token,
            decider_identity,
        } => {
            let mut hasher = Sha256::new();
            hasher.update(decision_token.as_bytes());
            hasher.update([0]);
            hasher.update(decider_identity.as_bytes());
            format!("dec-{}", to_hex(&hasher.finalize()))
        }
    }
}

pub fn seen(
    store: &RequestStore,
    dedup_key: &str,
    now: i64,
    ttl_secs: i64,
) -> Result<bool, StoreError> {
    let connection = store.connect()?;
    // One statement: the insert wins, or the update reclaims an expired key.
    let changed = connection
        .execute(
            "
            INSERT INTO seen_events (dedup_key, expires_at)
            VALUES (?1, ?2)
            ON CONFLICT(dedup_key) DO UPDATE SET expires_at = excluded.expires_at
            WHERE seen_events.expires_at <= ?3
            ",
            params![dedup_key, now + ttl_secs, now],
        )
        .map_err(|source| StoreError::Sql { source })?;
    Ok(changed == 0)
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_keys_without_event_id_are_stable_per_click_content() {
        let first = InboundEvent::Decision {
            event_id: None,
            decision_token: "approve-req-1".to_string(),
            decider_identity: "alice".to_string(),
        };
        let second = first.clone();
        assert_eq!(dedup_key(&first), dedup_key(&second));

        let other_decider = InboundEvent::Decision {
            event_id: None,
            decision_token: "approve-req-1".to_string(),
            decider_identity: "bob".to_string(),
        };
        assert_ne!(dedup_key(&first), dedup_key(&other_decider));
    }

    #[test]
    fn message_keys_use_the_transport_event_id() {
        let event = InboundEvent::Message {
            event_id: "evt-9".to_string(),
            sender_identity: "a@x.com".to_string(),
            channel_context: json!({}),
            text: "hello".to_string(),
        };
        assert_eq!(dedup_key(&event), "msg-evt-9");
    }
}
