//! REST backend client

use async_trait::async_trait;
use reqwest::Response;
use tracing::debug;

use super::backend::{Backend, BackendError};
use crate::state::{NewTask, Task, TimerSettings};

/// Backend reached over HTTP with JSON bodies
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the API rooted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn non-2xx responses into errors, keeping the body for the log
    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_settings(&self) -> Result<TimerSettings, BackendError> {
        debug!("Fetching timer settings from {}", self.base_url);
        let response = self.client.get(self.url("/timer/settings")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn save_settings(&self, settings: &TimerSettings) -> Result<(), BackendError> {
        debug!("Saving timer settings to {}", self.base_url);
        let response = self
            .client
            .put(self.url("/timer/settings"))
            .json(settings)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError> {
        debug!("Creating task '{}'", task.title);
        let response = self.client.post(self.url("/tasks")).json(task).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn complete_pomodoro(&self, task_id: &str) -> Result<(), BackendError> {
        debug!("Marking pomodoro complete for task {}", task_id);
        let response = self
            .client
            .post(self.url(&format!("/tasks/{}/complete-pomodoro", task_id)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
