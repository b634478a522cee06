//! The relay pipeline: envelope → normalize → route → format → sink.
//!
//! One pass per webhook delivery, no shared mutable state — the only
//! awaits are the outbound contacts and task-creation calls.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clickup::TaskSink;
use crate::contacts::ContactLookup;
use crate::directory::TeamDirectory;
use crate::error::Error;
use crate::event::{self, NormalizedEvent, WebhookEnvelope};
use crate::phone;
use crate::task::{self, ListIds};

/// What processing an envelope produced.
#[derive(Debug)]
pub enum RelayOutcome {
    /// A task was created in the sink.
    TaskCreated { team: String, task_id: String },
    /// The event was acknowledged without action (unknown type,
    /// non-incoming direction).
    Ignored { reason: String },
}

/// The wired-up pipeline. Cheap to share behind an `Arc`; the directory
/// is immutable and the sink/contacts clients are internally pooled.
pub struct Relay {
    directory: Arc<TeamDirectory>,
    sink: Arc<dyn TaskSink>,
    contacts: Option<Arc<dyn ContactLookup>>,
    lists: ListIds,
}

impl Relay {
    pub fn new(
        directory: Arc<TeamDirectory>,
        sink: Arc<dyn TaskSink>,
        contacts: Option<Arc<dyn ContactLookup>>,
        lists: ListIds,
    ) -> Self {
        Self {
            directory,
            sink,
            contacts,
            lists,
        }
    }

    /// Process one webhook envelope end to end.
    ///
    /// Errors map onto the HTTP surface: event validation and routing
    /// misses are client errors, sink failures are server errors. There
    /// is no retry here — the provider's own webhook retry is the only
    /// retry mechanism.
    pub async fn process(&self, envelope: WebhookEnvelope) -> Result<RelayOutcome, Error> {
        let event = match event::normalize(envelope)? {
            NormalizedEvent::Event(event) => event,
            NormalizedEvent::Ignored { reason } => {
                info!(%reason, "event acknowledged without action");
                return Ok(RelayOutcome::Ignored { reason });
            }
        };

        let dialed = phone::normalize(&event.to);
        let team = self
            .directory
            .lookup(&dialed)
            .ok_or_else(|| Error::NoTeam {
                number: dialed.clone(),
            })?;

        let caller_name = self.resolve_caller(&event.from).await;
        let payload = task::build_task(&event, &team, caller_name.as_deref(), &self.lists);

        let created = self.sink.create_task(&payload).await?;
        info!(
            team = %team.name,
            task_id = %created.id,
            from = %event.from,
            to = %event.to,
            "event relayed to task"
        );

        Ok(RelayOutcome::TaskCreated {
            team: team.name,
            task_id: created.id,
        })
    }

    /// Best-effort contact lookup. Failures degrade to the raw number.
    async fn resolve_caller(&self, from: &str) -> Option<String> {
        let contacts = self.contacts.as_ref()?;
        match contacts.display_name(&phone::normalize(from)).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, from = %from, "contact lookup failed; using raw number");
                None
            }
        }
    }
}
