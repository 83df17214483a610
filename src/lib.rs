/// CyberAd - Gmail spam analysis and ad generation extension
/// Built with Rust + WASM + Yew

mod backend;
mod bus;
mod config;
mod error;
mod history;
pub mod observer;
mod protocol;
mod relay;
mod settings;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Background service worker: the worker script owns the listeners and
// forwards each GENERATE_AD here once the module has loaded
#[wasm_bindgen]
pub async fn handle_message(message: JsValue) -> Result<JsValue, JsValue> {
    relay::handle_message(message).await
}

#[wasm_bindgen]
pub async fn seed_settings() -> Result<JsValue, JsValue> {
    relay::seed_settings().await
}

// Content script: watch the mail view and inject the trigger
#[wasm_bindgen]
pub fn start_content_observer() -> Result<(), JsValue> {
    observer::page::start()
}

// Start the Yew app for the settings popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::Popup>::new().render();
}

// Start the Yew app for the dashboard page
#[wasm_bindgen]
pub fn start_dashboard() {
    yew::Renderer::<ui::dashboard::Dashboard>::new().render();
}
