/// Reusable dashboard components

use std::collections::BTreeMap;

use log::warn;
use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};
use yew::prelude::*;

use crate::history::HistoryEntry;
use crate::observer::panel::ResultView;

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", (confidence * 100.0).clamp(0.0, 100.0))
}

/// `cyber_awareness_ad[_<language>]_<millis>.txt`
pub fn ad_filename(language: Option<&str>, timestamp: f64) -> String {
    let millis = timestamp.max(0.0) as u64;
    match language {
        Some(language) => format!("cyber_awareness_ad_{}_{}.txt", language, millis),
        None => format!("cyber_awareness_ad_{}.txt", millis),
    }
}

/// Save text through a temporary object URL and anchor
pub fn download_text(content: &str, filename: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let options = BlobPropertyBag::new();
    options.set_type("text/plain");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("Page has no body"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Created element is not an anchor"))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();

    Url::revoke_object_url(&url)
}

fn download_button(content: String, language: Option<String>) -> Html {
    let label = match &language {
        Some(language) => format!("Download {} Version", language),
        None => "Download Ad Content".to_string(),
    };
    let onclick = Callback::from(move |_: MouseEvent| {
        let filename = ad_filename(language.as_deref(), js_sys::Date::now());
        if let Err(e) = download_text(&content, &filename) {
            warn!("Download failed: {:?}", e);
        }
    });

    html! {
        <Button {onclick} variant={ButtonVariant::Link}>{label}</Button>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultCardProps {
    pub view: ResultView,
    #[prop_or_default]
    pub confidence: Option<f64>,
    #[prop_or_default]
    pub translations: BTreeMap<String, String>,
}

#[function_component(ResultCard)]
pub fn result_card(props: &ResultCardProps) -> Html {
    let view = &props.view;

    html! {
        <div class="result-card">
            <div style={view.status_style()}>{view.status}</div>

            if let Some(confidence) = props.confidence {
                <p class="confidence">{format!("Confidence: {}", format_confidence(confidence))}</p>
            }

            if let Some(ad) = &view.ad {
                <pre class="ad-content">{ad.clone()}</pre>
                {download_button(ad.clone(), None)}
            }

            if let Some(note) = &view.note {
                <p class="ad-note">{note.clone()}</p>
            }

            {for props.translations.iter().map(|(language, text)| html! {
                <div class="translation">
                    <h3 class="translation-language">{language.clone()}</h3>
                    <pre class="ad-content">{text.clone()}</pre>
                    {download_button(text.clone(), Some(language.clone()))}
                </div>
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HistoryListProps {
    pub entries: Vec<HistoryEntry>,
}

#[function_component(HistoryList)]
pub fn history_list(props: &HistoryListProps) -> Html {
    if props.entries.is_empty() {
        return html! {
            <p class="history-empty">{"No classification history yet. Analyze some messages to populate history."}</p>
        };
    }

    html! {
        <div class="history-list">
            {for props.entries.iter().map(|entry| html! {
                <div class="history-item" key={entry.id.clone()}>
                    <span class="history-verdict">{entry.verdict.label()}</span>
                    <span class="history-time">{format_timestamp(entry.timestamp)}</span>
                    <p class="history-message">{entry.message.clone()}</p>
                    if let Some(ad) = &entry.ad {
                        <pre class="ad-content">{ad.clone()}</pre>
                    }
                </div>
            })}
        </div>
    }
}

fn format_timestamp(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.934), "93.4%");
        assert_eq!(format_confidence(0.0), "0.0%");
        assert_eq!(format_confidence(1.7), "100.0%");
    }

    #[test]
    fn test_ad_filename() {
        assert_eq!(ad_filename(None, 1698508200000.0), "cyber_awareness_ad_1698508200000.txt");
        assert_eq!(
            ad_filename(Some("Hindi"), 1698508200000.0),
            "cyber_awareness_ad_Hindi_1698508200000.txt"
        );
    }
}
