/// Popup UI: backend URL setting

use gloo_timers::future::sleep;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::config::{BackendConfig, DEFAULT_BACKEND_URL, SAVED_ACK_DELAY};
use crate::settings::ChromeSyncStore;

#[derive(Clone, PartialEq, Debug)]
enum SaveState {
    Idle,
    Saving,
    Saved,
    Error(String),
}

impl SaveState {
    fn button_label(&self) -> &'static str {
        match self {
            SaveState::Saved => "Saved!",
            _ => "Save",
        }
    }
}

/// Counts saves so only the newest one may clear its acknowledgment
#[derive(Debug, Default)]
struct SaveGenerations {
    latest: u32,
}

impl SaveGenerations {
    fn begin(&mut self) -> u32 {
        self.latest = self.latest.wrapping_add(1);
        self.latest
    }

    fn is_latest(&self, generation: u32) -> bool {
        self.latest == generation
    }
}

#[function_component(Popup)]
pub fn popup() -> Html {
    let backend = use_state(String::new);
    let save_state = use_state(|| SaveState::Idle);
    let generations = use_mut_ref(SaveGenerations::default);

    // Load the stored URL on mount
    {
        let backend = backend.clone();
        let save_state = save_state.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match BackendConfig::load(&ChromeSyncStore).await {
                    Ok(config) => backend.set(config.base_url),
                    Err(e) => {
                        backend.set(DEFAULT_BACKEND_URL.to_string());
                        save_state.set(SaveState::Error(e.to_string()));
                    }
                }
            });
            || ()
        });
    }

    let on_input = {
        let backend = backend.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                backend.set(input.value());
            }
        })
    };

    // Whatever was typed is stored; a bad URL shows up on the next analysis
    let on_save = {
        let backend = backend.clone();
        let save_state = save_state.clone();
        let generations = generations.clone();

        Callback::from(move |_: MouseEvent| {
            let config = BackendConfig::new(backend.trim());
            let save_state = save_state.clone();
            let generations = generations.clone();
            let generation = generations.borrow_mut().begin();

            save_state.set(SaveState::Saving);
            spawn_local(async move {
                match config.save(&ChromeSyncStore).await {
                    Ok(()) => {
                        save_state.set(SaveState::Saved);
                        sleep(SAVED_ACK_DELAY).await;
                        if generations.borrow().is_latest(generation) {
                            save_state.set(SaveState::Idle);
                        }
                    }
                    Err(e) => save_state.set(SaveState::Error(e.to_string())),
                }
            });
        })
    };

    let is_saving = *save_state == SaveState::Saving;

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"CyberAd"}</h1>

            <label class="popup-label" for="backend">{"Backend URL"}</label>
            <input
                id="backend"
                class="pf-v5-c-form-control"
                type="text"
                value={(*backend).clone()}
                placeholder={DEFAULT_BACKEND_URL}
                oninput={on_input}
            />

            <div class="message-top-margin">
                <Button onclick={on_save} disabled={is_saving} variant={ButtonVariant::Primary} block={true}>
                    {save_state.button_label()}
                </Button>
            </div>

            if let SaveState::Error(err) = &*save_state {
                <div class="message-top-margin">
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_button_label() {
        assert_eq!(SaveState::Idle.button_label(), "Save");
        assert_eq!(SaveState::Saving.button_label(), "Save");
        assert_eq!(SaveState::Saved.button_label(), "Saved!");
        assert_eq!(SaveState::Error("x".to_string()).button_label(), "Save");
    }

    #[test]
    fn test_only_newest_save_clears_acknowledgment() {
        let mut generations = SaveGenerations::default();

        let first = generations.begin();
        let second = generations.begin();

        assert!(!generations.is_latest(first));
        assert!(generations.is_latest(second));
    }
}
