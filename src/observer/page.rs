/// Live Gmail page: `HostDocument` over `web_sys` and the mutation watcher

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, MouseEvent, MutationObserver, MutationObserverInit, Node};

use super::extract::QUOTED_REPLY_SELECTOR;
use super::panel::{ResultView, AD_STYLE, PANEL_ID, PANEL_STYLE};
use super::trigger::{IDLE_LABEL, TRIGGER_ID, TRIGGER_STYLE};
use super::{alert_message, reconcile, run_trigger, HostDocument};
use crate::bus::ChromeRuntimeBus;
use crate::config::REQUEST_TIMEOUT;
use crate::error::DomError;

fn dom_error(e: JsValue) -> DomError {
    DomError(format!("{:?}", e))
}

#[derive(Clone)]
pub struct PageDocument {
    document: Document,
}

impl PageDocument {
    pub fn current() -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| DomError("No document available".to_string()))?;

        Ok(PageDocument { document })
    }

    fn create(&self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn build_trigger(&self) -> Result<HtmlButtonElement, DomError> {
        let button: HtmlButtonElement = self
            .create("button")?
            .dyn_into()
            .map_err(|_| DomError("Created element is not a button".to_string()))?;
        button.set_id(TRIGGER_ID);
        button.set_text_content(Some(IDLE_LABEL));
        button.set_attribute("style", TRIGGER_STYLE).map_err(dom_error)?;

        let page = self.clone();
        let control = button.clone();
        let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            let page = page.clone();
            let control = control.clone();

            spawn_local(async move {
                let deadline = gloo_timers::future::sleep(REQUEST_TIMEOUT);
                match run_trigger(&control, &page, &ChromeRuntimeBus, deadline).await {
                    None => debug!("Analysis already in flight"),
                    Some(Ok(Some(view))) => debug!("Analysis finished: {}", view.status),
                    Some(Ok(None)) => debug!("Analysis dropped: another message is open"),
                    Some(Err(e)) => {
                        warn!("Analysis failed: {}", e);
                        page.alert(&alert_message(&e));
                    }
                }
            });
        });
        button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        on_click.forget();

        Ok(button)
    }

    fn build_panel(&self, view: &ResultView) -> Result<Element, DomError> {
        let panel = self.create("div")?;
        panel.set_id(PANEL_ID);
        panel.set_attribute("style", PANEL_STYLE).map_err(dom_error)?;

        let status = self.create("div")?;
        status.set_attribute("style", &view.status_style()).map_err(dom_error)?;
        status.set_text_content(Some(view.status));
        panel.append_child(&status).map_err(dom_error)?;

        for text in view.ad.iter().chain(view.note.iter()) {
            let pre = self.create("pre")?;
            pre.set_attribute("style", AD_STYLE).map_err(dom_error)?;
            pre.set_text_content(Some(text));
            panel.append_child(&pre).map_err(dom_error)?;
        }

        Ok(panel)
    }
}

impl HostDocument for PageDocument {
    type Element = Element;

    fn query_first(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn visible_text(&self, body: &Element) -> String {
        // Work on a detached copy so the live message is untouched
        let copy = match body
            .clone_node_with_deep(true)
            .ok()
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        {
            Some(copy) => copy,
            None => return String::new(),
        };

        if let Ok(quotes) = copy.query_selector_all(QUOTED_REPLY_SELECTOR) {
            for index in 0..quotes.length() {
                if let Some(quote) = quotes.item(index).and_then(|node| node.dyn_into::<Element>().ok()) {
                    quote.remove();
                }
            }
        }

        copy.inner_text()
    }

    fn insert_trigger_before(&self, body: &Element) -> Result<(), DomError> {
        let parent = body
            .parent_node()
            .ok_or_else(|| DomError("Message body has no parent".to_string()))?;
        let trigger = self.build_trigger()?;
        let anchor: &Node = body;

        parent.insert_before(&trigger, Some(anchor)).map_err(dom_error)?;
        Ok(())
    }

    fn show_panel(&self, body: Option<&Element>, view: &ResultView) -> Result<(), DomError> {
        if let Some(previous) = self.document.get_element_by_id(PANEL_ID) {
            previous.remove();
        }

        let panel = self.build_panel(view)?;
        match body.and_then(|body| body.parent_node().map(|parent| (body, parent))) {
            Some((body, parent)) => {
                parent
                    .insert_before(&panel, body.next_sibling().as_ref())
                    .map_err(dom_error)?;
            }
            None => {
                let root = self
                    .document
                    .body()
                    .ok_or_else(|| DomError("Page has no body".to_string()))?;
                root.append_child(&panel).map_err(dom_error)?;
            }
        }

        Ok(())
    }
}

fn reconcile_page(page: &PageDocument) {
    if let Err(e) = reconcile(page) {
        warn!("Reconcile failed: {}", e);
    }
}

/// Content script entry point: one pass now, then one per mutation
pub fn start() -> Result<(), JsValue> {
    let page = PageDocument::current().map_err(|e| JsValue::from_str(&e.to_string()))?;
    reconcile_page(&page);

    let root: Node = match page.document.body() {
        Some(body) => body.into(),
        None => page
            .document
            .document_element()
            .ok_or_else(|| JsValue::from_str("Page has no root element"))?
            .into(),
    };

    let observed = page.clone();
    let on_mutation = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |_records: js_sys::Array, _observer: MutationObserver| {
            reconcile_page(&observed);
        },
    );
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;

    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&root, &options)?;
    on_mutation.forget();

    debug!("Watching for message bodies");
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount_body(page: &PageDocument, html: &str) -> Element {
        let container = page.create("div").unwrap();
        let body = page.create("div").unwrap();
        body.set_class_name("a3s aiL");
        body.set_inner_html(html);
        container.append_child(&body).unwrap();
        page.document.body().unwrap().append_child(&container).unwrap();
        body
    }

    #[wasm_bindgen_test]
    fn test_reconcile_injects_one_trigger_before_body() {
        let page = PageDocument::current().unwrap();
        let body = mount_body(&page, "<p>Hello</p>");

        reconcile(&page).unwrap();
        reconcile(&page).unwrap();

        let trigger = page.document.get_element_by_id(TRIGGER_ID).unwrap();
        assert_eq!(trigger.next_element_sibling(), Some(body.clone()));
        assert_eq!(page.document.query_selector_all(&format!("#{}", TRIGGER_ID)).unwrap().length(), 1);

        trigger.remove();
        body.remove();
    }

    #[wasm_bindgen_test]
    fn test_visible_text_skips_quoted_replies() {
        let page = PageDocument::current().unwrap();
        let body = mount_body(&page, "<p>New message</p><blockquote>Old reply</blockquote>");

        let text = page.visible_text(&body);

        assert!(text.contains("New message"));
        assert!(!text.contains("Old reply"));
        assert!(body.inner_html().contains("Old reply"));

        body.remove();
    }
}
