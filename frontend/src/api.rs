//! Task repository over the browser `fetch` API.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use taskflow_client::{RepositoryError, TaskRepository};
use taskflow_shared::{CreatedTask, NewTask, Task, TaskId, TaskPatch, UserId};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

pub const API_BASE: &str = "/api";

#[derive(Debug, Clone)]
pub struct FetchRepository {
    base: String,
}

impl Default for FetchRepository {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl FetchRepository {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// The user id is free text, so it is form-encoded into the query.
    fn list_url(&self, user: &UserId) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("userId", user.as_str())
            .finish();
        self.url(&format!("/tasks?{}", query))
    }
}

#[async_trait(?Send)]
impl TaskRepository for FetchRepository {
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, RepositoryError> {
        let text = send(&self.list_url(user), "GET", None).await?;
        decode(&text)
    }

    async fn create(&self, task: &NewTask) -> Result<CreatedTask, RepositoryError> {
        let text = send(&self.url("/tasks"), "POST", Some(encode(task)?)).await?;
        decode(&text)
    }

    async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), RepositoryError> {
        let url = self.url(&format!("/tasks/{}", id));
        send(&url, "PUT", Some(encode(patch)?)).await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError> {
        let url = self.url(&format!("/tasks/{}", id));
        send(&url, "DELETE", None).await?;
        Ok(())
    }
}

fn encode<T: Serialize>(body: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(body).map_err(|e| RepositoryError::Transport(format!("Failed to serialize request: {}", e)))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(text).map_err(|e| RepositoryError::Decode(format!("Failed to parse JSON: {}", e)))
}

/// Sends a request and returns the response body. Non-2xx responses become
/// [`RepositoryError::Rejected`] carrying the server's error message.
async fn send(url: &str, method: &str, body: Option<String>) -> Result<String, RepositoryError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|_| transport("Failed to create request"))?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|_| transport("Failed to set header"))?;
    }

    let window = web_sys::window().ok_or_else(|| transport("No browser window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| transport("Failed to send request"))?
        .into();

    let text_promise = response.text().map_err(|_| transport("Failed to read response"))?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|_| transport("Failed to get text"))?
        .as_string()
        .ok_or_else(|| RepositoryError::Decode("Failed to convert to string".into()))?;

    if !response.ok() {
        return Err(RepositoryError::Rejected {
            status: response.status(),
            message: server_message(&text),
        });
    }
    Ok(text)
}

fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn transport(message: &str) -> RepositoryError {
    RepositoryError::Transport(message.to_string())
}
