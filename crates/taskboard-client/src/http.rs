use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use taskboard_core::{RemoteError, Task, TaskDraft, TaskId};
use taskboard_settings::ApiSettings;

use crate::envelope::Page;
use crate::gateway::TaskGateway;

/// [`TaskGateway`] over the REST resource (`GET/POST /tarefas`,
/// `PUT/DELETE /tarefas/{id}`).
pub struct HttpTaskGateway {
    client: Client,
    resource_url: String,
    timeout: Duration,
}

impl HttpTaskGateway {
    pub fn new(settings: &ApiSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, settings.resource_url(), settings.timeout()))
    }

    /// Use a preconfigured client. `resource_url` is the collection URL.
    pub fn with_client(client: Client, resource_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            resource_url: resource_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    /// Collection URL plus the id as one escaped path segment.
    fn item_url(&self, id: &TaskId) -> Result<Url, RemoteError> {
        let invalid = || RemoteError::Network(format!("invalid resource URL {}", self.resource_url));
        let mut url = Url::parse(&self.resource_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> Result<Response, RemoteError> {
        let started = Instant::now();
        let resp = req.send().await.map_err(|e| {
            let err = self.classify(e);
            warn!(op, error = %err, kind = err.error_kind(), "task api request failed");
            err
        })?;

        let status = resp.status();
        debug!(
            op,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "task api response"
        );

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(op, status = status.as_u16(), body = %body, "task api returned error status");
            return Err(RemoteError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(&self, resp: Response) -> Result<T, RemoteError> {
        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn classify(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    #[instrument(skip(self), fields(url = %self.resource_url))]
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let resp = self.send("list", self.client.get(&self.resource_url)).await?;
        let page: Page<Task> = self.decode(resp).await?;
        Ok(page.into_content())
    }

    #[instrument(skip(self, draft), fields(url = %self.resource_url))]
    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let req = self.client.post(&self.resource_url).json(draft);
        let resp = self.send("create", req).await?;
        self.decode(resp).await
    }

    #[instrument(skip(self, id, draft), fields(task_id = %id))]
    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let req = self.client.put(self.item_url(id)?).json(draft);
        let resp = self.send("update", req).await?;
        self.decode(resp).await
    }

    #[instrument(skip(self, id), fields(task_id = %id))]
    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        self.send("delete", self.client.delete(self.item_url(id)?))
            .await
            .map(|_| ())
    }
}
