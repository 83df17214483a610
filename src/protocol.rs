/// Wire types for the message bus and the backend
///
/// Everything crossing a context or network boundary is narrowed here.
/// Backend output is untrusted: unknown classifications become
/// `Classification::Other` and mistyped optional fields are dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AnalysisError;

pub const GENERATE_AD: &str = "GENERATE_AD";

/// Shown when a failed response carries no error text
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Content script -> relay request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusRequest {
    #[serde(rename = "GENERATE_AD")]
    GenerateAd {
        text: String,
        #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestRejection {
    /// Not ours; another listener may answer it
    #[error("unrecognized message")]
    Unrecognized,
    #[error("{0}")]
    Malformed(String),
}

impl BusRequest {
    /// Build a request tagged with a fresh correlation id
    pub fn generate_ad(text: impl Into<String>) -> Self {
        BusRequest::GenerateAd {
            text: text.into(),
            request_id: Some(Uuid::new_v4().to_string()),
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            BusRequest::GenerateAd { request_id, .. } => request_id.as_deref(),
        }
    }

    /// Narrow an untyped bus message
    pub fn parse(raw: Value) -> Result<BusRequest, RequestRejection> {
        match raw.get("type").and_then(Value::as_str) {
            Some(GENERATE_AD) => serde_json::from_value(raw)
                .map_err(|e| RequestRejection::Malformed(e.to_string())),
            _ => Err(RequestRejection::Unrecognized),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Spam,
    NotSpam,
    Other(String),
}

impl Classification {
    pub fn from_label(label: &str) -> Self {
        match label {
            "spam" => Classification::Spam,
            "not_spam" => Classification::NotSpam,
            other => Classification::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Classification::Spam => "spam",
            Classification::NotSpam => "not_spam",
            Classification::Other(label) => label,
        }
    }

    pub fn is_spam(&self) -> bool {
        matches!(self, Classification::Spam)
    }
}

impl Default for Classification {
    fn default() -> Self {
        Classification::Other(String::new())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Classification::from_label(&label),
            Value::Null => Classification::default(),
            other => Classification::Other(other.to_string()),
        })
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    })
}

/// Backend `/analyze` output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub classification: Classification,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub ad: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub ad_generation_error: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Relay -> content script response. Exactly one per request.
///
/// On the wire this is `{ ok: true, result }` or `{ ok: false, error }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", from = "WireResponse")]
pub enum BusResponse {
    Ok {
        result: AnalyzeResult,
        request_id: Option<String>,
    },
    Err {
        error: String,
        request_id: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<AnalyzeResult>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl From<BusResponse> for WireResponse {
    fn from(response: BusResponse) -> Self {
        match response {
            BusResponse::Ok { result, request_id } => WireResponse {
                ok: true,
                result: Some(result),
                error: None,
                request_id,
            },
            BusResponse::Err { error, request_id } => WireResponse {
                ok: false,
                result: None,
                error: Some(error),
                request_id,
            },
        }
    }
}

impl From<WireResponse> for BusResponse {
    fn from(wire: WireResponse) -> Self {
        if wire.ok {
            BusResponse::Ok {
                result: wire.result.unwrap_or_default(),
                request_id: wire.request_id,
            }
        } else {
            BusResponse::Err {
                error: wire
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                request_id: wire.request_id,
            }
        }
    }
}

impl BusResponse {
    pub fn success(result: AnalyzeResult) -> Self {
        BusResponse::Ok {
            result,
            request_id: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        BusResponse::Err {
            error: error.into(),
            request_id: None,
        }
    }

    pub fn from_outcome(outcome: Result<AnalyzeResult, AnalysisError>) -> Self {
        match outcome {
            Ok(result) => BusResponse::success(result),
            Err(e) => BusResponse::failure(e.to_string()),
        }
    }

    pub fn with_request_id(self, id: Option<String>) -> Self {
        match self {
            BusResponse::Ok { result, .. } => BusResponse::Ok {
                result,
                request_id: id,
            },
            BusResponse::Err { error, .. } => BusResponse::Err {
                error,
                request_id: id,
            },
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            BusResponse::Ok { request_id, .. } | BusResponse::Err { request_id, .. } => {
                request_id.as_deref()
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, BusResponse::Ok { .. })
    }

    pub fn into_result(self) -> Result<AnalyzeResult, AnalysisError> {
        match self {
            BusResponse::Ok { result, .. } => Ok(result),
            BusResponse::Err { error, .. } => Err(AnalysisError::Relayed(error)),
        }
    }
}

/// Body for `POST /analyze`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzePayload {
    pub text: String,
}

/// Body for `POST /translate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub ad_text: String,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

/// Error body of a non-2xx backend reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub detail: Value,
}

impl BackendErrorBody {
    /// The detail as display text, if it says anything
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
