//! Task construction — turns a routed event into a task payload.
//!
//! Pure string building, no I/O. The formatter never loses the original
//! `from`/`to` numbers: the caller's number always appears in the From
//! line (alongside the resolved contact name when one exists) and the
//! dialed number rides along with the team name in the To line.

use chrono::{DateTime, Utc};
use chrono_tz::America::Los_Angeles;

use crate::directory::TeamInfo;
use crate::event::{EventKind, InboundEvent};

/// Marker used when a completed call carries no voicemail object.
const NO_VOICEMAIL: &str = "No voicemail available";
/// Marker used when a text message carries no body.
const NO_BODY: &str = "No message body";
/// Marker used when the provider omitted or mangled the timestamp.
const NO_TIME: &str = "time unavailable";

/// Destination list ids, one per event category.
#[derive(Debug, Clone)]
pub struct ListIds {
    /// List receiving text-derived tasks.
    pub text: String,
    /// List receiving voicemail-derived tasks.
    pub voicemail: String,
}

/// A task ready for the sink. Built once per event, never persisted.
#[derive(Debug, Clone)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub list_id: String,
    pub assignee_ids: Vec<u64>,
}

/// Build the task payload for a routed event.
///
/// Assignees are the team's resolved members in registration order —
/// duplicates in the configuration are preserved, not deduplicated.
pub fn build_task(
    event: &InboundEvent,
    team: &TeamInfo,
    caller_name: Option<&str>,
    lists: &ListIds,
) -> TaskPayload {
    let (noun, list_id) = match event.kind {
        EventKind::CallCompleted => ("Voicemail", lists.voicemail.clone()),
        EventKind::MessageReceived => ("Text", lists.text.clone()),
    };

    let from_line = match caller_name {
        Some(name) => format!("From: {name} ({})", event.from),
        None => format!("From: {}", event.from),
    };
    let time = event
        .created_at
        .map(format_display_time)
        .unwrap_or_else(|| NO_TIME.to_string());

    let mut lines = vec![
        format!("New {noun}"),
        from_line,
        format!("To: {} ({})", team.name, event.to),
        format!("Time: {time}"),
    ];

    match event.kind {
        EventKind::CallCompleted => match &event.voicemail {
            Some(vm) => lines.push(format!(
                "Voicemail link: {} (Duration: {}s)",
                vm.url, vm.duration_secs
            )),
            None => lines.push(NO_VOICEMAIL.to_string()),
        },
        EventKind::MessageReceived => {
            let body = event.body.as_deref().unwrap_or(NO_BODY);
            lines.push(format!("Message: {body}"));
            for item in &event.media {
                lines.push(format!("{} link: {}", item.media_type, item.url));
            }
        }
    }

    TaskPayload {
        title: format!("New {noun} to {}", team.name),
        description: lines.join("\n"),
        list_id,
        assignee_ids: team.employees.iter().map(|e| e.id).collect(),
    }
}

/// Render a timestamp in the fixed display timezone.
///
/// Proper IANA-zone conversion (handles DST), replacing the fixed -7h
/// offset the system historically used.
fn format_display_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Los_Angeles)
        .format("%B %-d, %Y, %-I:%M:%S %p %Z")
        .to_string()
}
