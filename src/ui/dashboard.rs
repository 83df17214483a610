/// Companion dashboard: classify pasted text, translate ads, review history
///
/// Talks to its own backend deployment directly, without the relay.

use std::collections::BTreeMap;

use patternfly_yew::prelude::*;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::backend::{BackendClient, ReqwestTransport};
use crate::config::DASHBOARD_BACKEND_URL;
use crate::history::{ClassificationHistory, HistoryAction, HistoryEntry, HistoryFilter, Verdict};
use crate::observer::panel::ResultView;
use crate::protocol::AnalyzeResult;
use crate::ui::components::{HistoryList, ResultCard};

pub const LANGUAGES: [&str; 16] = [
    "Hindi",
    "Marathi",
    "Bengali",
    "Telugu",
    "Tamil",
    "Gujarati",
    "Kannada",
    "Malayalam",
    "Punjabi",
    "Urdu",
    "French",
    "Spanish",
    "German",
    "Arabic",
    "Chinese (Simplified)",
    "Japanese",
];

#[derive(Clone, PartialEq)]
enum DashboardState {
    Idle,
    Loading(String),
    Error(String),
}

/// The latest analysis and whatever translations were fetched for it
#[derive(Clone, PartialEq)]
struct Analysis {
    result: AnalyzeResult,
    view: ResultView,
    translations: BTreeMap<String, String>,
}

impl Analysis {
    fn new(result: AnalyzeResult) -> Self {
        Analysis {
            view: ResultView::from_result(&result),
            result,
            translations: BTreeMap::new(),
        }
    }
}

fn history_entry(message: &str, result: &AnalyzeResult) -> HistoryEntry {
    let verdict = Verdict::from_classification(&result.classification);
    HistoryEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: js_sys::Date::now(),
        message: message.to_string(),
        verdict,
        ad: result.ad.clone().filter(|_| verdict == Verdict::Spam),
    }
}

fn client() -> BackendClient<ReqwestTransport> {
    BackendClient::new(DASHBOARD_BACKEND_URL, ReqwestTransport::new())
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let state = use_state(|| DashboardState::Idle);
    let input = use_state(String::new);
    let analysis = use_state(|| None::<Analysis>);
    let language = use_state(String::new);
    let history = use_reducer(ClassificationHistory::new);
    let filter = use_state(HistoryFilter::default);

    let on_input = {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
                input.set(area.value());
            }
        })
    };

    // Analyze handler
    let on_analyze = {
        let state = state.clone();
        let input = input.clone();
        let analysis = analysis.clone();
        let history = history.clone();

        Callback::from(move |_: MouseEvent| {
            let message = input.trim().to_string();
            if message.is_empty() {
                state.set(DashboardState::Error("Please enter a message to analyze".to_string()));
                return;
            }

            let state = state.clone();
            let analysis = analysis.clone();
            let history = history.clone();

            state.set(DashboardState::Loading("Analyzing message...".to_string()));
            analysis.set(None);

            spawn_local(async move {
                match client().analyze(&message).await {
                    Ok(result) => {
                        history.dispatch(HistoryAction::Record(history_entry(&message, &result)));

                        analysis.set(Some(Analysis::new(result)));
                        state.set(DashboardState::Idle);
                    }
                    Err(e) => {
                        state.set(DashboardState::Error(format!("Analysis failed: {}", e)));
                    }
                }
            });
        })
    };

    let on_language = {
        let language = language.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                language.set(select.value());
            }
        })
    };

    // Translate handler; only real ads are translated
    let on_translate = {
        let state = state.clone();
        let analysis = analysis.clone();
        let language = language.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(current) = (*analysis).clone() else {
                return;
            };
            let Some(ad) = current.view.ad.clone() else {
                return;
            };
            let target = (*language).clone();
            if target.is_empty() {
                return;
            }

            let state = state.clone();
            let analysis = analysis.clone();

            state.set(DashboardState::Loading(format!("Translating to {}...", target)));

            spawn_local(async move {
                match client().translate(&ad, &[target.clone()]).await {
                    Ok(response) => {
                        if let Some(text) = response.translations.get(&target) {
                            let mut updated = current;
                            updated.translations.insert(target, text.clone());
                            analysis.set(Some(updated));
                        }
                        state.set(DashboardState::Idle);
                    }
                    Err(e) => {
                        state.set(DashboardState::Error(format!("Translation failed: {}", e)));
                    }
                }
            });
        })
    };

    let on_clear_history = {
        let history = history.clone();
        Callback::from(move |_: MouseEvent| history.dispatch(HistoryAction::Clear))
    };

    let filter_button = |target: HistoryFilter, label: &str| {
        let filter = filter.clone();
        let count = history.count(target);
        let variant = if *filter == target {
            ButtonVariant::Primary
        } else {
            ButtonVariant::Secondary
        };
        let onclick = Callback::from(move |_: MouseEvent| filter.set(target));

        html! {
            <Button {onclick} {variant}>
                {format!("{} ({})", label, count)}
            </Button>
        }
    };

    let is_busy = !matches!(*state, DashboardState::Idle | DashboardState::Error(_));
    let visible: Vec<HistoryEntry> = history.filtered(*filter).into_iter().cloned().collect();

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"CyberAd Dashboard"}</h1>

            <textarea
                class="pf-v5-c-form-control message-input"
                rows="8"
                placeholder="Paste a message to analyze"
                value={(*input).clone()}
                oninput={on_input}
            />

            <Button onclick={on_analyze} disabled={is_busy} variant={ButtonVariant::Primary}>
                {"Analyze"}
            </Button>

            // Status display
            {match &*state {
                DashboardState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                DashboardState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                DashboardState::Idle => html! {},
            }}

            if let Some(current) = &*analysis {
                <ResultCard
                    view={current.view.clone()}
                    confidence={current.result.confidence}
                    translations={current.translations.clone()}
                />

                if current.view.ad.is_some() {
                    <div class="translate-row">
                        <select class="pf-v5-c-form-control" onchange={on_language}>
                            <option value="" selected={language.is_empty()}>{"Select a language"}</option>
                            {for LANGUAGES.iter().map(|name| html! {
                                <option value={*name} selected={*language == *name}>{*name}</option>
                            })}
                        </select>
                        <Button onclick={on_translate} disabled={is_busy || language.is_empty()} variant={ButtonVariant::Secondary}>
                            {"Translate Ad"}
                        </Button>
                    </div>
                }
            }

            <div class="stats-container">
                <h2 class="stats-title">{"History"}</h2>
                <div class="flex-row-gap">
                    {filter_button(HistoryFilter::All, "All")}
                    {filter_button(HistoryFilter::Only(Verdict::Spam), "Spam")}
                    {filter_button(HistoryFilter::Only(Verdict::NotSpam), "Not Spam")}
                    <Button onclick={on_clear_history} disabled={is_busy || history.is_empty()} variant={ButtonVariant::Danger}>
                        {"Clear"}
                    </Button>
                </div>
                <HistoryList entries={visible} />
            </div>
        </div>
    }
}
