//! Inbound webhook envelope parsing and normalization.
//!
//! The telephony provider delivers events as `{type, data: {object}}`.
//! Only `call.completed` and `message.received` are interesting; every
//! other type is acknowledged as a no-op so the provider does not retry
//! deliveries we will never handle. Nested fields are extracted
//! defensively — the formatter substitutes markers for anything optional
//! that is absent.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::EventError;

/// Wire type tag for completed calls.
const TYPE_CALL_COMPLETED: &str = "call.completed";
/// Wire type tag for received messages.
const TYPE_MESSAGE_RECEIVED: &str = "message.received";

// ── Wire shapes ─────────────────────────────────────────────────────

/// Raw webhook body: `{type, data: {object: {...}}}`.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
pub struct EnvelopeData {
    #[serde(default)]
    pub object: Option<EventObject>,
}

/// The provider's event object, every field optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub voicemail: Option<VoicemailRaw>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub media: Option<Vec<MediaRaw>>,
}

#[derive(Debug, Deserialize)]
pub struct VoicemailRaw {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MediaRaw {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
}

// ── Normalized event ────────────────────────────────────────────────

/// Recognized event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CallCompleted,
    MessageReceived,
}

/// A voicemail attachment on a completed call.
#[derive(Debug, Clone)]
pub struct Voicemail {
    pub url: String,
    pub duration_secs: u64,
}

/// A media attachment on a text message.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub url: String,
    pub media_type: String,
}

/// A validated inbound event, one per webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub from: String,
    pub to: String,
    pub created_at: Option<DateTime<Utc>>,
    pub voicemail: Option<Voicemail>,
    pub body: Option<String>,
    pub media: Vec<MediaItem>,
}

/// Outcome of normalizing an envelope: a routable event, or an
/// acknowledged no-op.
#[derive(Debug)]
pub enum NormalizedEvent {
    Event(InboundEvent),
    /// Unknown type or non-incoming direction — handled, nothing to do.
    Ignored { reason: String },
}

/// Validate and normalize a webhook envelope.
///
/// Unknown event types and non-incoming directions are not errors; they
/// come back as [`NormalizedEvent::Ignored`] so the HTTP layer can
/// acknowledge them with a 200. Missing `from`/`to` (or a missing
/// `data.object` altogether) cannot be defaulted and are rejected.
pub fn normalize(envelope: WebhookEnvelope) -> Result<NormalizedEvent, EventError> {
    let kind = match envelope.event_type.as_str() {
        TYPE_CALL_COMPLETED => EventKind::CallCompleted,
        TYPE_MESSAGE_RECEIVED => EventKind::MessageReceived,
        other => {
            return Ok(NormalizedEvent::Ignored {
                reason: format!("unrecognized event type: {other}"),
            });
        }
    };

    let object = envelope
        .data
        .and_then(|d| d.object)
        .ok_or(EventError::MissingObject)?;

    // Outgoing calls and messages also arrive on the webhook; only
    // incoming traffic creates tasks.
    if let Some(direction) = object.direction.as_deref()
        && direction != "incoming"
    {
        return Ok(NormalizedEvent::Ignored {
            reason: format!("non-incoming direction: {direction}"),
        });
    }

    let from = object.from.ok_or(EventError::MissingField("from"))?;
    let to = object.to.ok_or(EventError::MissingField("to"))?;

    let created_at = object
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    // A voicemail object without a URL is as good as no voicemail.
    let voicemail = object.voicemail.and_then(|v| {
        v.url.map(|url| Voicemail {
            url,
            duration_secs: v.duration.unwrap_or(0),
        })
    });

    let media = object
        .media
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| {
            m.url.map(|url| MediaItem {
                url,
                media_type: m.media_type.unwrap_or_else(|| "media".to_string()),
            })
        })
        .collect();

    Ok(NormalizedEvent::Event(InboundEvent {
        kind,
        from,
        to,
        created_at,
        voicemail,
        body: object.body,
        media,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: serde_json::Value) -> WebhookEnvelope {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn voicemail_event_normalizes() {
        let env = envelope(serde_json::json!({
            "type": "call.completed",
            "data": {"object": {
                "from": "3605551234",
                "to": "+13605486904",
                "direction": "incoming",
                "createdAt": "2024-01-01T12:00:00Z",
                "voicemail": {"url": "http://x/voicemail.mp3", "duration": 12}
            }}
        }));
        let NormalizedEvent::Event(event) = normalize(env).unwrap() else {
            panic!("expected a routable event");
        };
        assert_eq!(event.kind, EventKind::CallCompleted);
        assert_eq!(event.from, "3605551234");
        let vm = event.voicemail.unwrap();
        assert_eq!(vm.url, "http://x/voicemail.mp3");
        assert_eq!(vm.duration_secs, 12);
        assert!(event.created_at.is_some());
    }

    #[test]
    fn text_event_collects_media() {
        let env = envelope(serde_json::json!({
            "type": "message.received",
            "data": {"object": {
                "from": "+15550001111",
                "to": "+13605486904",
                "body": "hello",
                "media": [
                    {"url": "http://x/img.png", "type": "image"},
                    {"type": "video"}
                ]
            }}
        }));
        let NormalizedEvent::Event(event) = normalize(env).unwrap() else {
            panic!("expected a routable event");
        };
        assert_eq!(event.kind, EventKind::MessageReceived);
        assert_eq!(event.body.as_deref(), Some("hello"));
        // The url-less media item is dropped.
        assert_eq!(event.media.len(), 1);
        assert_eq!(event.media[0].media_type, "image");
    }

    #[test]
    fn unknown_type_is_ignored_not_rejected() {
        let env = envelope(serde_json::json!({
            "type": "call.ringing",
            "data": {"object": {"from": "+15550001111", "to": "+13605486904"}}
        }));
        match normalize(env).unwrap() {
            NormalizedEvent::Ignored { reason } => assert!(reason.contains("call.ringing")),
            other => panic!("expected Ignored, got {other:?}"),
        }
    }

    #[test]
    fn outgoing_direction_is_ignored() {
        let env = envelope(serde_json::json!({
            "type": "message.received",
            "data": {"object": {
                "from": "+15550001111",
                "to": "+13605486904",
                "direction": "outgoing"
            }}
        }));
        assert!(matches!(
            normalize(env).unwrap(),
            NormalizedEvent::Ignored { .. }
        ));
    }

    #[test]
    fn missing_object_is_rejected() {
        let env = envelope(serde_json::json!({"type": "call.completed", "data": {}}));
        assert!(matches!(normalize(env), Err(EventError::MissingObject)));
    }

    #[test]
    fn missing_from_is_rejected() {
        let env = envelope(serde_json::json!({
            "type": "call.completed",
            "data": {"object": {"to": "+13605486904"}}
        }));
        assert!(matches!(
            normalize(env),
            Err(EventError::MissingField("from"))
        ));
    }

    #[test]
    fn optional_fields_default_safely() {
        let env = envelope(serde_json::json!({
            "type": "call.completed",
            "data": {"object": {
                "from": "+15550001111",
                "to": "+13605486904",
                "createdAt": "not-a-timestamp",
                "voicemail": {"duration": 5}
            }}
        }));
        let NormalizedEvent::Event(event) = normalize(env).unwrap() else {
            panic!("expected a routable event");
        };
        assert!(event.created_at.is_none());
        // Voicemail without a url counts as no voicemail.
        assert!(event.voicemail.is_none());
        assert!(event.body.is_none());
        assert!(event.media.is_empty());
    }
}
