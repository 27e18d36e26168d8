use std::fmt;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::roadmap::RoadmapDocument;

/// Roadmap-service failures. Each one renders as a single user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Failed to reach roadmap service")]
    Transport(#[source] reqwest::Error),
    #[error("Roadmap service returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("Roadmap generation failed: {0}")]
    Service(String),
    #[error("Malformed response from roadmap service: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        })
    }
}

/// Body of `POST /api/generate-roadmap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadmapRequest {
    pub research_topic: String,
    pub user_goal: String,
    pub user_current_state: KnowledgeLevel,
}

impl RoadmapRequest {
    /// Validate inputs before anything goes over the wire.
    pub fn new(topic: &str, goal: &str, level: KnowledgeLevel) -> Result<Self, ServiceError> {
        let (topic, goal) = (topic.trim(), goal.trim());
        if topic.is_empty() || goal.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Please provide both a research topic and goal".to_string(),
            ));
        }
        Ok(Self {
            research_topic: topic.to_string(),
            user_goal: goal.to_string(),
            user_current_state: level,
        })
    }
}

/// Success payload. `topic`/`goal`/`current_state` echoes are ignored.
#[derive(Debug, Deserialize)]
struct RoadmapPayload {
    roadmap: String,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    references: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// `null`, `false`, `0` and `""` carry no error.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Error text carried in a response body: `error`, or `message` under `status: "error"`.
fn error_message(value: &Value) -> Option<String> {
    if let Some(err) = value.get("error").filter(|e| !is_blank(e)) {
        return Some(err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string()));
    }
    if value.get("status").and_then(Value::as_str) == Some("error") {
        return Some(
            value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        );
    }
    None
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Turn an HTTP status plus body into a document, or the failure it represents.
///
/// Accepts both the backend's `{status, data: {...}}` envelope and a bare
/// payload. An `error` field fails the call regardless of status.
pub fn decode_response(status: StatusCode, body: &str) -> Result<RoadmapDocument, ServiceError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ServiceError::Status {
                status,
                message: snippet(body),
            })
        }
        Err(e) => return Err(ServiceError::Malformed(format!("invalid JSON: {}", e))),
    };

    if !status.is_success() {
        return Err(ServiceError::Status {
            status,
            message: error_message(&value).unwrap_or_else(|| snippet(body)),
        });
    }
    if let Some(message) = error_message(&value) {
        return Err(ServiceError::Service(message));
    }

    let payload = match value.get("data") {
        Some(data) if data.is_object() => data,
        _ => &value,
    };
    if let Some(message) = error_message(payload) {
        return Err(ServiceError::Service(message));
    }

    let payload = RoadmapPayload::deserialize(payload)
        .map_err(|e| ServiceError::Malformed(e.to_string()))?;

    Ok(RoadmapDocument {
        roadmap_text: payload.roadmap,
        keywords: payload.keywords.unwrap_or_default(),
        references_text: payload.references.unwrap_or_default(),
    })
}

/// Turn a health-check status plus body into a [`HealthStatus`].
pub fn decode_health(status: StatusCode, body: &str) -> Result<HealthStatus, ServiceError> {
    if !status.is_success() {
        return Err(ServiceError::Status {
            status,
            message: snippet(body),
        });
    }
    serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

pub struct RoadmapClient {
    client: reqwest::Client,
    base_url: String,
}

impl RoadmapClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    /// Resolve an `/api/<path>` endpoint. The base may be the service root, its
    /// `/api` prefix, or a full generate-roadmap URL.
    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let root = base
            .strip_suffix("/api/generate-roadmap")
            .or_else(|| base.strip_suffix("/api"))
            .unwrap_or(base);
        format!("{}/api/{}", root, path)
    }

    pub async fn generate(&self, request: &RoadmapRequest) -> Result<RoadmapDocument, ServiceError> {
        let url = self.endpoint("generate-roadmap");
        info!(
            url = %url,
            topic = %request.research_topic,
            level = %request.user_current_state,
            "requesting roadmap"
        );

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ServiceError::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(ServiceError::Transport)?;
        debug!(%status, body_len = body.len(), "roadmap response received");

        let doc = decode_response(status, &body)?;
        info!(
            roadmap_len = doc.roadmap_text.len(),
            keywords = doc.keywords.len(),
            "roadmap generated"
        );
        Ok(doc)
    }

    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let url = self.endpoint("health");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ServiceError::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(ServiceError::Transport)?;
        debug!(%status, body_len = body.len(), "health response received");
        decode_health(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RoadmapClient {
        let config = Config {
            backend_url: base.to_string(),
            ..Config::default()
        };
        RoadmapClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_resolution() {
        let expected = "http://localhost:5000/api/generate-roadmap";
        for base in [
            "http://localhost:5000",
            "http://localhost:5000/",
            "http://localhost:5000/api",
            "http://localhost:5000/api/generate-roadmap",
        ] {
            assert_eq!(client(base).endpoint("generate-roadmap"), expected);
        }
        assert_eq!(
            client("http://localhost:5000/api/generate-roadmap").endpoint("health"),
            "http://localhost:5000/api/health"
        );
    }

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            RoadmapRequest::new("  ", "goal", KnowledgeLevel::Beginner),
            Err(ServiceError::InvalidRequest(_))
        ));
        let req = RoadmapRequest::new(" AI in food ", "survey", KnowledgeLevel::Advanced).unwrap();
        assert_eq!(req.research_topic, "AI in food");

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["user_current_state"], "advanced");
        assert_eq!(json["user_goal"], "survey");
    }

    #[test]
    fn test_decode_enveloped_success() {
        let body = r#"{"status":"success","data":{"roadmap":"**Stage 1: A**","keywords":["x","y"],
            "references":"REFERENCE 1: x","topic":"t","goal":"g","current_state":"beginner"}}"#;
        let doc = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(doc.roadmap_text, "**Stage 1: A**");
        assert_eq!(doc.keywords, vec!["x", "y"]);
        assert_eq!(doc.references_text, "REFERENCE 1: x");
    }

    #[test]
    fn test_decode_bare_payload_with_missing_optionals() {
        let doc = decode_response(StatusCode::OK, r#"{"roadmap":"text","references":null}"#).unwrap();
        assert_eq!(doc.roadmap_text, "text");
        assert!(doc.keywords.is_empty());
        assert!(doc.references_text.is_empty());
    }

    #[test]
    fn test_error_field_fails_despite_ok_status() {
        let err = decode_response(StatusCode::OK, r#"{"roadmap":"x","error":"quota exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Service(ref m) if m == "quota exceeded"));
        assert_eq!(err.to_string(), "Roadmap generation failed: quota exceeded");
    }

    #[test]
    fn test_blank_error_field_is_not_a_failure() {
        for body in [
            r#"{"roadmap":"x","error":""}"#,
            r#"{"roadmap":"x","error":false}"#,
            r#"{"roadmap":"x","error":0}"#,
            r#"{"status":"success","data":{"roadmap":"x","error":null}}"#,
        ] {
            let doc = decode_response(StatusCode::OK, body).unwrap();
            assert_eq!(doc.roadmap_text, "x", "body {}", body);
        }

        let err = decode_response(StatusCode::OK, r#"{"roadmap":"x","error":true}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Service(ref m) if m == "true"));
    }

    #[test]
    fn test_status_error_envelope() {
        let err = decode_response(
            StatusCode::OK,
            r#"{"status":"error","message":"Failed to generate research roadmap: boom"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Service(ref m) if m.ends_with("boom")));
    }

    #[test]
    fn test_non_success_status() {
        let err = decode_response(
            StatusCode::BAD_REQUEST,
            r#"{"status":"error","message":"Missing required parameters"}"#,
        )
        .unwrap_err();
        match err {
            ServiceError::Status { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Missing required parameters");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = decode_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ServiceError::Status { ref message, .. } if message.contains("bad gateway")));
    }

    #[test]
    fn test_malformed_bodies() {
        for body in [
            "not json",
            r#"{"keywords":[]}"#,
            r#"{"roadmap":42}"#,
            r#"{"roadmap":"x","keywords":[1,2]}"#,
        ] {
            let err = decode_response(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, ServiceError::Malformed(_)), "body {}: {:?}", body, err);
        }
    }

    #[test]
    fn test_decode_health() {
        let health = decode_health(
            StatusCode::OK,
            r#"{"status":"healthy","message":"Research Roadmap API is running"}"#,
        )
        .unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.message, "Research Roadmap API is running");

        let bare = decode_health(StatusCode::OK, r#"{"status":"healthy"}"#).unwrap();
        assert!(bare.message.is_empty());

        let err = decode_health(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Status { status, ref message }
                if status == StatusCode::SERVICE_UNAVAILABLE && message == "down for maintenance"
        ));

        for body in ["<html>ok</html>", r#"{"message":"no status"}"#] {
            let err = decode_health(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, ServiceError::Malformed(_)), "body {}: {:?}", body, err);
        }
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 203);
    }
}
