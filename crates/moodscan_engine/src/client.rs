use std::collections::BTreeMap;
use std::time::Duration;

use moodscan_core::{AnalysisMeta, SubmissionRequest, SubmissionResult, SubmitError};
use moodscan_logging::{moodscan_debug, moodscan_info, moodscan_warn};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ANALYSIS_PATH: &str = "predict-any";
pub const PLAN_HEADER: &str = "x-plan";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub analysis_path: String,
    pub connect_timeout: Duration,
    /// Analysis runs server-side before the response arrives, so this is long.
    pub request_timeout: Duration,
    /// Extra boolean fields merged into the request body next to `src`.
    pub feature_flags: BTreeMap<String, bool>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_path: DEFAULT_ANALYSIS_PATH.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(600),
            feature_flags: BTreeMap::new(),
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.analysis_path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmissionClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestSubmissionClient {
    pub fn new(settings: ClientSettings) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::Transport {
                message: err.to_string(),
            })?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn request_body(&self, request: &SubmissionRequest) -> Value {
        let mut body = Map::new();
        body.insert("src".to_string(), Value::String(request.source_url.clone()));
        for (name, enabled) in &self.settings.feature_flags {
            body.entry(name.clone()).or_insert(Value::Bool(*enabled));
        }
        Value::Object(body)
    }
}

#[async_trait::async_trait]
impl SubmissionClient for ReqwestSubmissionClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, SubmitError> {
        let endpoint = self.settings.endpoint();
        let body = self.request_body(request);
        moodscan_info!(
            "POST {} plan={} src={}",
            endpoint,
            request.plan,
            request.source_url
        );

        let response = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(PLAN_HEADER, request.plan.id())
            .body(body.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        moodscan_debug!("response status={} body_len={}", status, bytes.len());

        if !status.is_success() {
            let message = server_detail(&bytes);
            moodscan_warn!("analysis request failed: status={} detail={:?}", status, message);
            return Err(SubmitError::Server {
                status: status.as_u16(),
                message,
            });
        }

        parse_success(&bytes)
    }
}

/// Only a non-empty `download.link` is required. Optional fields of an
/// unexpected type read as absent.
fn parse_success(bytes: &[u8]) -> Result<SubmissionResult, SubmitError> {
    let body: Value =
        serde_json::from_slice(bytes).map_err(|err| SubmitError::MalformedResponse {
            message: err.to_string(),
        })?;

    let download = body.get("download");
    let link = download
        .and_then(|download| download.get("link"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .ok_or_else(|| SubmitError::MalformedResponse {
            message: "missing download.link".to_string(),
        })?;

    Ok(SubmissionResult {
        download_link: link.to_string(),
        filename: download
            .and_then(|download| text_field(download, "filename"))
            .filter(|name| !name.is_empty()),
        message: text_field(&body, "message"),
        meta: body
            .get("meta")
            .filter(|meta| meta.is_object())
            .map(|meta| AnalysisMeta {
                timestamp: scalar_field(meta, "timestamp"),
                language: scalar_field(meta, "language"),
                input: scalar_field(meta, "input"),
            }),
    })
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Strings are taken as-is and numbers or booleans are rendered; anything else is empty.
fn scalar_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(other @ (Value::Number(_) | Value::Bool(_))) => other.to_string(),
        _ => String::new(),
    }
}

/// Extracts a human-readable message from an error body.
///
/// `detail` may be a string or a list of field-level entries; a top-level
/// `message` string is the fallback.
fn server_detail(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    match value.get("detail") {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(detail_item).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => value
            .get("message")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_owned),
    }
}

fn detail_item(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => {
            let msg = fields.get("msg").and_then(Value::as_str)?;
            let location = fields.get("loc").and_then(Value::as_array).map(|loc| {
                loc.iter()
                    .map(|part| match part {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".")
            });
            match location {
                Some(loc) if !loc.is_empty() => Some(format!("{loc}: {msg}")),
                _ => Some(msg.to_string()),
            }
        }
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    };
    SubmitError::Transport { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let settings = ClientSettings {
            base_url: "http://host:8000/".into(),
            analysis_path: "/predict-any".into(),
            ..ClientSettings::default()
        };
        assert_eq!(settings.endpoint(), "http://host:8000/predict-any");
    }

    #[test]
    fn detail_list_is_joined() {
        let body = br#"{"detail":[{"loc":["body","src"],"msg":"field required"},"bad plan"]}"#;
        assert_eq!(
            server_detail(body).as_deref(),
            Some("body.src: field required; bad plan")
        );
    }

    #[test]
    fn detail_falls_back_to_message() {
        assert_eq!(
            server_detail(br#"{"message":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(server_detail(b"<html>oops</html>"), None);
    }

    #[test]
    fn empty_link_is_malformed() {
        let err = parse_success(br#"{"download":{"link":"  "}}"#).unwrap_err();
        assert!(matches!(err, SubmitError::MalformedResponse { .. }));
    }

    #[test]
    fn mistyped_optional_fields_read_as_absent() {
        let result = parse_success(
            br#"{"download":{"link":"https://x/y.csv","filename":7},"message":{"text":"ok"},"meta":{"timestamp":1715336634,"language":null}}"#,
        )
        .unwrap();
        assert_eq!(result.download_link, "https://x/y.csv");
        assert_eq!(result.filename, None);
        assert_eq!(result.message, None);
        let meta = result.meta.unwrap();
        assert_eq!(meta.timestamp, "1715336634");
        assert_eq!(meta.language, "");
    }

    #[test]
    fn flags_do_not_override_src() {
        let mut settings = ClientSettings::default();
        settings.feature_flags.insert("src".into(), true);
        settings.feature_flags.insert("diarize".into(), false);
        let client = ReqwestSubmissionClient::new(settings).unwrap();
        let body = client.request_body(&SubmissionRequest::new(
            "youtu.be/x",
            moodscan_core::Plan::Basic,
        ));
        assert_eq!(body["src"], "youtu.be/x");
        assert_eq!(body["diarize"], false);
    }
}
