/// Sender side of the message bus
///
/// `request` turns one bus round trip into exactly one `BusResponse`:
/// disconnects, timeouts, malformed replies and stale replies all resolve
/// to a failure, so the caller always gets control back.

use std::future::Future;

use futures_util::future::{select, Either};
use futures_util::pin_mut;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::{AnalysisError, BusError};
use crate::protocol::{BusRequest, BusResponse};

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/runtime.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendRuntimeMessage(message: JsValue) -> Result<JsValue, JsValue>;
}

pub const STALE_RESPONSE: &str = "Discarded a response for a different request";

pub trait MessageBus {
    fn dispatch(&self, request: &BusRequest) -> impl Future<Output = Result<Value, BusError>>;
}

impl<B: MessageBus> MessageBus for &B {
    fn dispatch(&self, request: &BusRequest) -> impl Future<Output = Result<Value, BusError>> {
        (**self).dispatch(request)
    }
}

/// `chrome.runtime.sendMessage`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeRuntimeBus;

impl MessageBus for ChromeRuntimeBus {
    async fn dispatch(&self, request: &BusRequest) -> Result<Value, BusError> {
        let message = request
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| BusError::Encode(e.to_string()))?;

        let reply = sendRuntimeMessage(message)
            .await
            .map_err(|e| BusError::Disconnected(js_error_message(&e)))?;

        if reply.is_undefined() || reply.is_null() {
            return Err(BusError::NoResponse);
        }

        serde_wasm_bindgen::from_value(reply).map_err(|e| BusError::Decode(e.to_string()))
    }
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Send one request and wait for its response or the deadline, whichever
/// comes first
pub async fn request<B, D>(bus: &B, request: BusRequest, deadline: D) -> BusResponse
where
    B: MessageBus,
    D: Future<Output = ()>,
{
    let expected = request.request_id().map(str::to_owned);

    let dispatch = bus.dispatch(&request);
    pin_mut!(dispatch);
    pin_mut!(deadline);

    match select(dispatch, deadline).await {
        Either::Left((outcome, _)) => reconcile(expected.as_deref(), outcome),
        Either::Right(((), _)) => {
            warn!("Bus request timed out");
            BusResponse::failure(AnalysisError::Timeout.to_string()).with_request_id(expected)
        }
    }
}

/// Narrow a raw reply to a response for the request we sent
pub fn reconcile(expected: Option<&str>, outcome: Result<Value, BusError>) -> BusResponse {
    let raw = match outcome {
        Ok(raw) => raw,
        Err(e) => return BusResponse::failure(e.to_string()),
    };

    let response: BusResponse = match serde_json::from_value(raw) {
        Ok(response) => response,
        Err(e) => return BusResponse::failure(AnalysisError::Protocol(e.to_string()).to_string()),
    };

    match (expected, response.request_id()) {
        (Some(expected), Some(actual)) if expected != actual => {
            warn!("Stale response {} (expected {})", actual, expected);
            BusResponse::failure(STALE_RESPONSE)
        }
        _ => response,
    }
}
