//! HTTP implementation of [`RecordApi`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use super::{NewPrompt, PromptPatch, RecordApi, RemoteError, RemotePrompt, RemoteResult};
use crate::config::{RemoteConfig, TimestampUnit, UpdateMethod};
use crate::models::PromptId;
use crate::util::compact_text;

/// Record API client speaking JSON over HTTP.
///
/// Endpoints are `{base}/{records_path}/{collection}` for list/create and
/// `.../{id}` for update/delete.
#[derive(Clone)]
pub struct HttpRecordApi {
    client: reqwest::Client,
    collection_url: String,
    auth_token: Option<String>,
    update_method: Method,
    timestamp_unit: TimestampUnit,
}

impl std::fmt::Debug for HttpRecordApi {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRecordApi")
            .field("collection_url", &self.collection_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("update_method", &self.update_method)
            .field("timestamp_unit", &self.timestamp_unit)
            .finish_non_exhaustive()
    }
}

impl HttpRecordApi {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        if config.collection.trim().is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "collection name must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let update_method = match config.update_method {
            UpdateMethod::Patch => Method::PATCH,
            UpdateMethod::Put => Method::PUT,
        };

        Ok(Self {
            client,
            collection_url: config.collection_url(),
            auth_token: config.auth_token.clone(),
            update_method,
            timestamp_unit: config.timestamp_unit,
        })
    }

    fn record_url(&self, id: &PromptId) -> String {
        format!(
            "{}/{}",
            self.collection_url,
            urlencoding::encode(id.as_str())
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Api(parse_api_error(status, &body)))
    }

    fn decode_record(&self, record: WireRecord) -> RemoteResult<RemotePrompt> {
        Ok(RemotePrompt {
            id: record.id.into_prompt_id()?,
            name: record.name,
            text: record.text,
            created_at: record.created_at.map(|value| self.timestamp_unit.decode_millis(value)),
            updated_at: record.updated_at.map(|value| self.timestamp_unit.decode_millis(value)),
        })
    }
}

#[async_trait]
impl RecordApi for HttpRecordApi {
    async fn list(&self) -> RemoteResult<Vec<RemotePrompt>> {
        let response = self
            .send(self.request(Method::GET, &self.collection_url))
            .await?;
        let payload = response.json::<ListResponse>().await?;
        payload
            .records
            .into_iter()
            .map(|record| self.decode_record(record))
            .collect()
    }

    async fn create(&self, prompt: &NewPrompt) -> RemoteResult<PromptId> {
        let body = WireNewRecord {
            name: &prompt.name,
            text: &prompt.text,
            created_at: self.timestamp_unit.encode_millis(prompt.created_at),
            updated_at: self.timestamp_unit.encode_millis(prompt.updated_at),
        };
        let response = self
            .send(self.request(Method::POST, &self.collection_url).json(&body))
            .await?;

        let raw = response.text().await?;
        parse_created_id(&raw)
    }

    async fn update(&self, id: &PromptId, patch: &PromptPatch) -> RemoteResult<()> {
        let body = WirePatch {
            name: patch.name.as_deref(),
            text: patch.text.as_deref(),
            updated_at: self.timestamp_unit.encode_millis(patch.updated_at),
        };
        self.send(
            self.request(self.update_method.clone(), &self.record_url(id))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &PromptId) -> RemoteResult<()> {
        self.send(self.request(Method::DELETE, &self.record_url(id)))
            .await?;
        Ok(())
    }
}

/// Record identifiers may be strings or integers depending on the table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_prompt_id(self) -> RemoteResult<PromptId> {
        let raw = match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        };
        PromptId::parse(raw)
            .map_err(|_| RemoteError::InvalidPayload("record id must not be empty".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: WireId,
    name: String,
    text: String,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    updated_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateResponse {
    Ids { ids: Vec<WireId> },
    Record { id: WireId },
    Bare(WireId),
}

#[derive(Debug, Serialize)]
struct WireNewRecord<'a> {
    name: &'a str,
    text: &'a str,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Serialize)]
struct WirePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    updated_at: i64,
}

fn parse_created_id(body: &str) -> RemoteResult<PromptId> {
    let payload = serde_json::from_str::<CreateResponse>(body).map_err(|_| {
        RemoteError::InvalidPayload(format!(
            "create response did not include a record id: {}",
            compact_text(body)
        ))
    })?;

    let id = match payload {
        CreateResponse::Ids { ids } => ids.into_iter().next().ok_or_else(|| {
            RemoteError::InvalidPayload("create response returned an empty id list".to_string())
        })?,
        CreateResponse::Record { id } | CreateResponse::Bare(id) => id,
    };
    id.into_prompt_id()
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::{Method as AxumMethod, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Recorded {
        method: String,
        path: String,
        auth: Option<String>,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct FakeServer {
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl FakeServer {
        async fn record(
            &self,
            method: &AxumMethod,
            path: String,
            headers: &axum::http::HeaderMap,
            body: &str,
        ) {
            let auth = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string);
            let body = serde_json::from_str(body).unwrap_or(Value::Null);
            self.requests.lock().await.push(Recorded {
                method: method.to_string(),
                path,
                auth,
                body,
            });
        }
    }

    async fn list_records(State(server): State<FakeServer>) -> Json<Value> {
        server
            .record(
                &AxumMethod::GET,
                "/api/records/v1/prompts".to_string(),
                &axum::http::HeaderMap::new(),
                "",
            )
            .await;
        Json(json!({
            "records": [
                { "id": "srv-1", "name": "Alpha", "text": "x", "created_at": 1_700_000_000, "updated_at": 1_700_000_100 },
                { "id": 42, "name": "Beta", "text": "alpha code", "created_at": 1_700_000_050 }
            ]
        }))
    }

    async fn create_record(
        State(server): State<FakeServer>,
        headers: axum::http::HeaderMap,
        body: String,
    ) -> (AxumStatus, Json<Value>) {
        server
            .record(
                &AxumMethod::POST,
                "/api/records/v1/prompts".to_string(),
                &headers,
                &body,
            )
            .await;
        (AxumStatus::OK, Json(json!({ "ids": ["srv-new"] })))
    }

    async fn write_record(
        State(server): State<FakeServer>,
        method: AxumMethod,
        Path(id): Path<String>,
        headers: axum::http::HeaderMap,
        body: String,
    ) -> (AxumStatus, Json<Value>) {
        server
            .record(
                &method,
                format!("/api/records/v1/prompts/{id}"),
                &headers,
                &body,
            )
            .await;
        if id == "missing" {
            return (
                AxumStatus::NOT_FOUND,
                Json(json!({ "error": "Prompt not found" })),
            );
        }
        (AxumStatus::OK, Json(Value::Null))
    }

    async fn spawn_server() -> (String, FakeServer) {
        let server = FakeServer::default();
        let router = Router::new()
            .route(
                "/api/records/v1/prompts",
                get(list_records).post(create_record),
            )
            .route(
                "/api/records/v1/prompts/{id}",
                axum::routing::patch(write_record)
                    .put(write_record)
                    .delete(write_record),
            )
            .with_state(server.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), server)
    }

    fn client(base_url: &str) -> HttpRecordApi {
        let config = RemoteConfig::new(base_url)
            .unwrap()
            .with_auth_token("token-1");
        HttpRecordApi::new(&config).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_converts_ids_and_timestamps() {
        let (base_url, _server) = spawn_server().await;
        let records = client(&base_url).list().await.unwrap();

        assert_eq!(
            records,
            vec![
                RemotePrompt {
                    id: PromptId::parse("srv-1").unwrap(),
                    name: "Alpha".to_string(),
                    text: "x".to_string(),
                    created_at: Some(1_700_000_000_000),
                    updated_at: Some(1_700_000_100_000),
                },
                RemotePrompt {
                    id: PromptId::parse("42").unwrap(),
                    name: "Beta".to_string(),
                    text: "alpha code".to_string(),
                    created_at: Some(1_700_000_050_000),
                    updated_at: None,
                },
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_withholds_local_id_and_reads_back_server_id() {
        let (base_url, server) = spawn_server().await;
        let new_prompt = NewPrompt {
            name: "Greeting".to_string(),
            text: "Say hi".to_string(),
            created_at: 1_700_000_000_123,
            updated_at: 1_700_000_000_456,
        };

        let id = client(&base_url).create(&new_prompt).await.unwrap();
        assert_eq!(id.as_str(), "srv-new");

        let requests = server.requests.lock().await;
        assert_eq!(
            requests[0],
            Recorded {
                method: "POST".to_string(),
                path: "/api/records/v1/prompts".to_string(),
                auth: Some("Bearer token-1".to_string()),
                body: json!({
                    "name": "Greeting",
                    "text": "Say hi",
                    "created_at": 1_700_000_000,
                    "updated_at": 1_700_000_000,
                }),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn record_ids_are_percent_encoded_in_the_path() {
        let (base_url, server) = spawn_server().await;
        let id = PromptId::parse("team/a?b#c").unwrap();

        client(&base_url).delete(&id).await.unwrap();

        let requests = server.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/api/records/v1/prompts/team/a?b#c");
        assert_eq!(
            client(&base_url).record_url(&id),
            format!("{base_url}/api/records/v1/prompts/team%2Fa%3Fb%23c")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_sends_only_changed_fields() {
        let (base_url, server) = spawn_server().await;
        let patch = PromptPatch {
            name: None,
            text: Some("new body".to_string()),
            updated_at: 2_000_000,
        };

        client(&base_url)
            .update(&PromptId::parse("srv-1").unwrap(), &patch)
            .await
            .unwrap();

        let requests = server.requests.lock().await;
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/records/v1/prompts/srv-1");
        assert_eq!(
            requests[0].body,
            json!({ "text": "new body", "updated_at": 2_000 })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_can_use_put() {
        let (base_url, server) = spawn_server().await;
        let config = RemoteConfig::new(&base_url)
            .unwrap()
            .with_update_method(UpdateMethod::Put)
            .with_timestamp_unit(TimestampUnit::Millis);
        let api = HttpRecordApi::new(&config).unwrap();

        api.update(
            &PromptId::parse("srv-1").unwrap(),
            &PromptPatch {
                name: Some("n".to_string()),
                text: None,
                updated_at: 5,
            },
        )
        .await
        .unwrap();

        let requests = server.requests.lock().await;
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].auth, None);
        assert_eq!(requests[0].body, json!({ "name": "n", "updated_at": 5 }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn error_status_becomes_message() {
        let (base_url, _server) = spawn_server().await;
        let error = client(&base_url)
            .delete(&PromptId::parse("missing").unwrap())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Prompt not found (404)");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_server_is_transport_error() {
        let config = RemoteConfig::new("http://127.0.0.1:9")
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(2));
        let error = HttpRecordApi::new(&config).unwrap().list().await.unwrap_err();
        assert!(matches!(error, RemoteError::Http(_)));
    }

    #[test]
    fn parse_created_id_accepts_known_shapes() {
        assert_eq!(parse_created_id(r#"{"ids":["a"]}"#).unwrap().as_str(), "a");
        assert_eq!(
            parse_created_id(r#"{"id":"b","name":"n","text":"t"}"#)
                .unwrap()
                .as_str(),
            "b"
        );
        assert_eq!(parse_created_id("17").unwrap().as_str(), "17");
        assert_eq!(parse_created_id(r#""c""#).unwrap().as_str(), "c");
        assert!(parse_created_id(r#"{"ids":[]}"#).is_err());
        assert!(parse_created_id("").is_err());
        assert!(parse_created_id(r#"{"ok":true}"#).is_err());
    }

    #[test]
    fn parse_api_error_prefers_message_fields() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_REQUEST, r#"{"message":" bad input "}"#),
            "bad input (400)"
        );
        assert_eq!(
            parse_api_error(StatusCode::METHOD_NOT_ALLOWED, ""),
            "HTTP 405"
        );
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down (502)"
        );
    }
}
