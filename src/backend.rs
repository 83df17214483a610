/// HTTP client for the classification/translation backend

use std::future::Future;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{AnalysisError, TransportError};
use crate::protocol::{AnalyzePayload, AnalyzeResult, BackendErrorBody, TranslateRequest, TranslateResponse};

/// Used when a failed reply carries no `detail`
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpReply {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single JSON POST. Implementations never retry.
pub trait HttpTransport {
    fn post_json(&self, url: Url, body: Value) -> impl Future<Output = Result<HttpReply, TransportError>>;
}

impl<T: HttpTransport> HttpTransport for &T {
    fn post_json(&self, url: Url, body: Value) -> impl Future<Output = Result<HttpReply, TransportError>> {
        (**self).post_json(url, body)
    }
}

/// `reqwest` transport; on wasm32 this goes through `fetch`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: Url, body: Value) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}

/// Join a base URL and a path with exactly one slash
pub fn endpoint(base: &str, path: &str) -> Result<Url, TransportError> {
    let joined = format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    Url::parse(&joined).map_err(|e| TransportError::InvalidUrl {
        url: joined,
        reason: e.to_string(),
    })
}

/// Interpret a backend reply as `T` or a typed failure
pub fn decode_reply<T: DeserializeOwned>(reply: &HttpReply) -> Result<T, AnalysisError> {
    if !reply.is_success() {
        return Err(AnalysisError::Backend(failure_message(&reply.body)));
    }

    serde_json::from_str(&reply.body).map_err(|e| AnalysisError::Protocol(e.to_string()))
}

fn failure_message(body: &str) -> String {
    serde_json::from_str::<BackendErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[derive(Debug, Clone)]
pub struct BackendClient<T> {
    base_url: String,
    transport: T,
}

impl<T: HttpTransport> BackendClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        BackendClient {
            base_url: base_url.into(),
            transport,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalyzeResult, AnalysisError> {
        let payload = AnalyzePayload {
            text: text.to_string(),
        };
        self.post("analyze", &payload).await
    }

    pub async fn translate(&self, ad_text: &str, languages: &[String]) -> Result<TranslateResponse, AnalysisError> {
        let payload = TranslateRequest {
            ad_text: ad_text.to_string(),
            languages: languages.to_vec(),
        };
        self.post("translate", &payload).await
    }

    async fn post<P, R>(&self, path: &str, payload: &P) -> Result<R, AnalysisError>
    where
        P: serde::Serialize,
        R: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path)?;
        let body = serde_json::to_value(payload).map_err(|e| AnalysisError::Protocol(e.to_string()))?;

        debug!("POST {}", url);
        let reply = self.transport.post_json(url, body).await?;
        debug!("{} replied {}", path, reply.status);

        decode_reply(&reply)
    }
}
