//! Assistants API client
//!
//! HTTP implementation of [`AssistantService`] for the Assistants v2 protocol
//! (files, threads, messages, runs).
//!
//! # API Reference
//! - `POST /files` (multipart) → file id
//! - `POST /threads` → conversation id
//! - `POST /threads/{id}/messages` → message id
//! - `POST /threads/{id}/runs` → run id
//! - `GET /threads/{id}/runs/{run_id}` → run status
//! - `GET /threads/{id}/messages?order=desc&limit=1` → newest message

use crate::error::ServiceError;
use crate::service::AssistantService;
use crate::types::RunStatus;
use async_trait::async_trait;
use phyto_common::config::AssistantConfig;
use reqwest::{header, multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("phyto-id/", env!("CARGO_PKG_VERSION"));

/// Beta header required by the Assistants v2 endpoints
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    status: RunStatus,
}

/// `GET /threads/{id}/messages` response
#[derive(Debug, Deserialize)]
pub struct MessageList {
    pub data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// One content part of a message; only text parts are read
#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    pub value: String,
}

impl MessageList {
    /// First text part of the first (newest) message
    pub fn first_text(&self) -> Option<String> {
        self.data.first()?.content.iter().find_map(|part| {
            if part.kind == "text" {
                part.text.as_ref().map(|t| t.value.clone())
            } else {
                None
            }
        })
    }
}

/// Request body for posting the identification message
pub fn message_body(text: &str, file_ids: &[String]) -> Value {
    let mut content = vec![json!({ "type": "text", "text": text })];
    content.extend(file_ids.iter().map(|file_id| {
        json!({
            "type": "image_file",
            "image_file": { "file_id": file_id, "detail": "auto" }
        })
    }));

    json!({ "role": "user", "content": content })
}

/// Assistants API client
pub struct AssistantClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl AssistantClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create from the `[assistant]` section and a resolved API key
    pub fn from_config(config: &AssistantConfig, api_key: String) -> Result<Self, ServiceError> {
        Self::new(&config.base_url, api_key, config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    /// Send a request and decode a JSON body, mapping non-2xx to `ServiceError::Api`
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api(status.as_u16(), error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AssistantService for AssistantClient {
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        purpose: &str,
    ) -> Result<String, ServiceError> {
        debug!(file = %file_name, size = bytes.len(), "Uploading file");

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            )
            .text("purpose", purpose.to_string());

        let response: IdResponse = self
            .send_json(self.http_client.post(self.url("files")).multipart(form))
            .await?;
        Ok(response.id)
    }

    async fn create_conversation(&self) -> Result<String, ServiceError> {
        let response: IdResponse = self
            .send_json(self.http_client.post(self.url("threads")).json(&json!({})))
            .await?;
        Ok(response.id)
    }

    async fn post_message(
        &self,
        conversation_id: &str,
        text: &str,
        file_ids: &[String],
    ) -> Result<String, ServiceError> {
        let url = self.url(&format!("threads/{}/messages", conversation_id));
        let response: IdResponse = self
            .send_json(self.http_client.post(url).json(&message_body(text, file_ids)))
            .await?;
        Ok(response.id)
    }

    async fn start_run(
        &self,
        conversation_id: &str,
        assistant_id: &str,
    ) -> Result<String, ServiceError> {
        let url = self.url(&format!("threads/{}/runs", conversation_id));
        let response: IdResponse = self
            .send_json(
                self.http_client
                    .post(url)
                    .json(&json!({ "assistant_id": assistant_id })),
            )
            .await?;
        Ok(response.id)
    }

    async fn run_status(
        &self,
        conversation_id: &str,
        run_id: &str,
    ) -> Result<RunStatus, ServiceError> {
        let url = self.url(&format!("threads/{}/runs/{}", conversation_id, run_id));
        let response: RunResponse = self.send_json(self.http_client.get(url)).await?;
        Ok(response.status)
    }

    async fn latest_message(&self, conversation_id: &str) -> Result<Option<String>, ServiceError> {
        let url = self.url(&format!("threads/{}/messages", conversation_id));
        let list: MessageList = self
            .send_json(
                self.http_client
                    .get(url)
                    .query(&[("order", "desc"), ("limit", "1")]),
            )
            .await?;
        Ok(list.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AssistantClient::new("https://example.test/v1/", "key", Duration::from_secs(5));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().url("files"), "https://example.test/v1/files");
    }

    #[test]
    fn test_message_body_keeps_file_order() {
        let body = message_body(
            "Please identify this plant from these three photos.",
            &["file-a".to_string(), "file-b".to_string(), "file-c".to_string()],
        );

        assert_eq!(body["role"], "user");
        let content = body["content"].as_array().unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(
            content[0]["text"],
            "Please identify this plant from these three photos."
        );
        let ids: Vec<&str> = content[1..]
            .iter()
            .map(|part| part["image_file"]["file_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["file-a", "file-b", "file-c"]);
        assert_eq!(content[1]["image_file"]["detail"], "auto");
    }

    #[test]
    fn test_first_text_skips_non_text_parts() {
        let list: MessageList = serde_json::from_str(
            r#"{
                "object": "list",
                "data": [{
                    "id": "msg_1",
                    "role": "assistant",
                    "content": [
                        {"type": "image_file", "image_file": {"file_id": "file-x"}},
                        {"type": "text", "text": {"value": "Rosa rugosa", "annotations": []}},
                        {"type": "text", "text": {"value": "second part", "annotations": []}}
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(list.first_text().as_deref(), Some("Rosa rugosa"));
    }

    #[test]
    fn test_first_text_empty_conversation() {
        let list: MessageList = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(list.first_text(), None);

        let list: MessageList =
            serde_json::from_str(r#"{"data": [{"content": [{"type": "image_file"}]}]}"#).unwrap();
        assert_eq!(list.first_text(), None);
    }

    #[test]
    fn test_run_response_decoding() {
        let run: RunResponse =
            serde_json::from_str(r#"{"id": "run_1", "status": "expired"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Expired);
    }
}
