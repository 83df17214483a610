/// Background relay: the only context allowed to reach the backend
///
/// Every recognised bus message gets exactly one `BusResponse`. Messages
/// of other types are left unanswered so other listeners can take them.

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::backend::{BackendClient, HttpTransport, ReqwestTransport};
use crate::config::{seed_default, BackendConfig};
use crate::error::{AnalysisError, ExtractionError};
use crate::protocol::{AnalyzeResult, BusRequest, BusResponse, RequestRejection};
use crate::settings::{ChromeSyncStore, SettingsStore};

/// A message the relay has committed to answer
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    request: Result<BusRequest, String>,
    request_id: Option<String>,
}

impl Inbound {
    /// `None` when the message is not ours
    pub fn accept(raw: Value) -> Option<Inbound> {
        let request_id = raw
            .get("requestId")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match BusRequest::parse(raw) {
            Ok(request) => Some(Inbound {
                request: Ok(request),
                request_id,
            }),
            Err(RequestRejection::Unrecognized) => None,
            Err(RequestRejection::Malformed(reason)) => Some(Inbound {
                request: Err(reason),
                request_id,
            }),
        }
    }
}

pub struct Relay<S, T> {
    store: S,
    transport: T,
}

impl<S: SettingsStore, T: HttpTransport> Relay<S, T> {
    pub fn new(store: S, transport: T) -> Self {
        Relay { store, transport }
    }

    /// Route one raw bus message
    pub fn handle(&self, raw: Value) -> Option<impl Future<Output = BusResponse>> {
        let inbound = Inbound::accept(raw)?;
        Some(self.respond(inbound))
    }

    pub async fn respond(&self, inbound: Inbound) -> BusResponse {
        let outcome = match inbound.request {
            Ok(BusRequest::GenerateAd { text, .. }) => self.generate_ad(&text).await,
            Err(reason) => Err(AnalysisError::Protocol(reason)),
        };

        if let Err(e) = &outcome {
            warn!("GENERATE_AD failed: {}", e);
        }

        BusResponse::from_outcome(outcome).with_request_id(inbound.request_id)
    }

    /// One attempt, no retries. Config is re-read on every call.
    pub async fn generate_ad(&self, text: &str) -> Result<AnalyzeResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText.into());
        }

        let config = BackendConfig::load(&self.store).await?;
        debug!("GENERATE_AD via {} ({} chars)", config.base_url, text.len());

        BackendClient::new(config.base_url, &self.transport)
            .analyze(text)
            .await
    }

    /// Wire reply for one raw message, `None` when it is not ours
    pub async fn answer(&self, raw: Value) -> Option<Value> {
        let response = self.handle(raw)?.await;
        debug!("Responding to GENERATE_AD (ok: {})", response.is_ok());

        match serde_json::to_value(&response) {
            Ok(wire) => Some(wire),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                Some(serde_json::json!({ "ok": false, "error": e.to_string() }))
            }
        }
    }
}

/// Answer one `chrome.runtime.onMessage` message. The worker script
/// registers its listeners synchronously and awaits this from them.
pub async fn handle_message(message: JsValue) -> Result<JsValue, JsValue> {
    let Ok(raw) = serde_wasm_bindgen::from_value::<Value>(message) else {
        return Ok(JsValue::UNDEFINED);
    };

    let relay = Relay::new(ChromeSyncStore, ReqwestTransport::new());
    match relay.answer(raw).await {
        Some(wire) => wire
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// `chrome.runtime.onInstalled`: seed the default backend URL
pub async fn seed_settings() -> Result<JsValue, JsValue> {
    match seed_default(&ChromeSyncStore).await {
        Ok(seeded) => {
            if seeded {
                info!("Backend URL initialised to default");
            }
            Ok(JsValue::from_bool(seeded))
        }
        Err(e) => {
            warn!("Could not seed settings: {}", e);
            Err(JsValue::from_str(&e.to_string()))
        }
    }
}
