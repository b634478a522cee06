//! ClickUp task sink — the one outbound write of the pipeline.
//!
//! The sink owns a single `reqwest::Client` with a bounded timeout so a
//! stalled ClickUp never holds a webhook response open indefinitely. A
//! timeout surfaces as an ordinary sink failure.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SinkError;
use crate::task::TaskPayload;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";

/// Fixed ClickUp priority for relay-created tasks (3 = normal).
const TASK_PRIORITY: u8 = 3;

/// Destination for formatted task payloads.
///
/// The pipeline's responsibility ends at payload construction; it
/// propagates whatever this reports.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create_task(&self, payload: &TaskPayload) -> Result<CreatedTask, SinkError>;
}

/// The sink's acknowledgement of a created task.
#[derive(Debug, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CreateTaskBody<'a> {
    name: &'a str,
    description: &'a str,
    status: &'a str,
    priority: u8,
    assignees: &'a [u64],
}

#[derive(Debug, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct WorkspacesResponse {
    teams: Vec<Workspace>,
}

#[derive(Debug, Deserialize)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListsResponse {
    lists: Vec<ListSummary>,
}

/// ClickUp REST client.
pub struct ClickUpSink {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl ClickUpSink {
    pub fn new(token: SecretString, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
            client,
        })
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// List the workspaces visible to the configured token.
    ///
    /// Operator helper for discovering where lists live; not part of the
    /// webhook path.
    pub async fn workspaces(&self) -> Result<Vec<Workspace>, SinkError> {
        let resp = self
            .client
            .get(format!("{}/team", self.base_url))
            .header("Authorization", self.token.expose_secret())
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let parsed: WorkspacesResponse = resp
            .json()
            .await
            .map_err(|e| SinkError::InvalidResponse(e.to_string()))?;
        Ok(parsed.teams)
    }

    /// List the lists in a space. Operator helper, as above.
    pub async fn lists(&self, space_id: &str) -> Result<Vec<ListSummary>, SinkError> {
        let resp = self
            .client
            .get(format!("{}/space/{space_id}/list", self.base_url))
            .header("Authorization", self.token.expose_secret())
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let parsed: ListsResponse = resp
            .json()
            .await
            .map_err(|e| SinkError::InvalidResponse(e.to_string()))?;
        Ok(parsed.lists)
    }
}

#[async_trait]
impl TaskSink for ClickUpSink {
    async fn create_task(&self, payload: &TaskPayload) -> Result<CreatedTask, SinkError> {
        let body = CreateTaskBody {
            name: &payload.title,
            description: &payload.description,
            status: "to do",
            priority: TASK_PRIORITY,
            assignees: &payload.assignee_ids,
        };

        let resp = self
            .client
            .post(format!(
                "{}/list/{}/task",
                self.base_url, payload.list_id
            ))
            .header("Authorization", self.token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let created: CreatedTask = resp
            .json()
            .await
            .map_err(|e| SinkError::InvalidResponse(e.to_string()))?;

        info!(task_id = %created.id, list_id = %payload.list_id, "ClickUp task created");
        Ok(created)
    }
}

/// Map a non-2xx response to `SinkError::Status` with a body excerpt.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    Err(SinkError::Status {
        status: status.as_u16(),
        body: excerpt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sink(base: &str) -> ClickUpSink {
        ClickUpSink::new(
            SecretString::from("pk_test_token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(base)
    }

    fn payload() -> TaskPayload {
        TaskPayload {
            title: "New Voicemail to Intake".to_string(),
            description: "New Voicemail\nFrom: +15550001111".to_string(),
            list_id: "vm-list".to_string(),
            assignee_ids: vec![75363521],
        }
    }

    #[tokio::test]
    async fn create_task_posts_to_list_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/list/vm-list/task"))
            .and(header("Authorization", "pk_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = sink(&server.uri()).create_task(&payload()).await.unwrap();
        assert_eq!(created.id, "abc123");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["name"], "New Voicemail to Intake");
        assert_eq!(body["status"], "to do");
        assert_eq!(body["priority"], 3);
        assert_eq!(body["assignees"], serde_json::json!([75363521]));
    }

    #[tokio::test]
    async fn non_2xx_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Token invalid"))
            .mount(&server)
            .await;

        let err = sink(&server.uri()).create_task(&payload()).await.unwrap_err();
        match err {
            SinkError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Token invalid"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = sink(&server.uri()).create_task(&payload()).await.unwrap_err();
        assert!(matches!(err, SinkError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn workspaces_and_lists_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "9011", "name": "Pacific"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/space/25601327/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lists": [{"id": "901105262068", "name": "Voicemails"}]
            })))
            .mount(&server)
            .await;

        let sink = sink(&server.uri());
        let workspaces = sink.workspaces().await.unwrap();
        assert_eq!(workspaces[0].name, "Pacific");
        let lists = sink.lists("25601327").await.unwrap();
        assert_eq!(lists[0].id, "901105262068");
    }
}
