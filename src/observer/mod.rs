/// Content observer: keeps one analyze control attached to the open
/// message in a page the host app rewrites at will.
///
/// Reconciliation is level-triggered. Every mutation notification
/// re-derives the state from the current DOM instead of diffing against
/// what was seen before, so missed or reordered notifications are harmless.

pub mod extract;
pub mod page;
pub mod panel;
pub mod trigger;

use std::future::Future;

use log::debug;

use crate::bus::{self, MessageBus};
use crate::error::{AnalysisError, DomError, ExtractionError};
use crate::protocol::BusRequest;
use self::extract::normalize_text;
use self::panel::{ResultView, PANEL_ID};
use self::trigger::{BusyGuard, TriggerControl, TRIGGER_ID};

/// Message body candidates, most specific first
pub const MESSAGE_BODY_SELECTORS: [&str; 2] = ["div.a3s.aiL", "div.a3s"];

/// The host page as the observer sees it
pub trait HostDocument {
    /// Equality is element identity
    type Element: PartialEq;

    fn query_first(&self, selector: &str) -> Option<Self::Element>;

    fn contains_id(&self, id: &str) -> bool;

    /// Rendered text of a detached copy with quoted replies removed
    fn visible_text(&self, body: &Self::Element) -> String;

    fn insert_trigger_before(&self, body: &Self::Element) -> Result<(), DomError>;

    /// Replace any existing panel. Without a body the panel goes at the
    /// end of the document.
    fn show_panel(&self, body: Option<&Self::Element>, view: &ResultView) -> Result<(), DomError>;
}

/// First selector that matches wins
pub fn find_message_body<D: HostDocument>(doc: &D) -> Option<D::Element> {
    MESSAGE_BODY_SELECTORS
        .iter()
        .find_map(|selector| doc.query_first(selector))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomSnapshot {
    pub body_present: bool,
    pub trigger_present: bool,
    pub panel_present: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    Absent,
    PresentUninjected,
    PresentInjected,
}

impl InjectionState {
    pub fn derive(snapshot: &DomSnapshot) -> Self {
        match (snapshot.body_present, snapshot.trigger_present) {
            (false, _) => InjectionState::Absent,
            (true, false) => InjectionState::PresentUninjected,
            (true, true) => InjectionState::PresentInjected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredUi {
    pub has_trigger: bool,
    pub has_panel: bool,
}

/// A trigger belongs wherever a body is. Panels are only ever created by
/// an analysis, so an existing one is kept and a missing one stays missing.
pub fn desired_ui(snapshot: &DomSnapshot) -> DesiredUi {
    DesiredUi {
        has_trigger: snapshot.body_present,
        has_panel: snapshot.panel_present,
    }
}

/// Bring the page in line with `desired_ui`. Safe to call any number of times.
pub fn reconcile<D: HostDocument>(doc: &D) -> Result<InjectionState, DomError> {
    let body = find_message_body(doc);
    let snapshot = DomSnapshot {
        body_present: body.is_some(),
        trigger_present: doc.contains_id(TRIGGER_ID),
        panel_present: doc.contains_id(PANEL_ID),
    };

    if let Some(body) = &body {
        if desired_ui(&snapshot).has_trigger && !snapshot.trigger_present {
            doc.insert_trigger_before(body)?;
            debug!("Injected analyze control");
        }
    }

    Ok(InjectionState::derive(&snapshot))
}

/// One click: `None` if an analysis is already in flight on this control
pub async fn run_trigger<C, D, B, F>(
    control: &C,
    doc: &D,
    bus: &B,
    deadline: F,
) -> Option<Result<Option<ResultView>, AnalysisError>>
where
    C: TriggerControl,
    D: HostDocument,
    B: MessageBus,
    F: Future<Output = ()>,
{
    let _guard = BusyGuard::acquire(control)?;
    Some(analyze_message(doc, bus, deadline).await)
}

/// Extract, relay, render. `Ok(None)` when another message was opened
/// while waiting; that result belongs to a message no longer shown.
pub async fn analyze_message<D, B, F>(doc: &D, bus: &B, deadline: F) -> Result<Option<ResultView>, AnalysisError>
where
    D: HostDocument,
    B: MessageBus,
    F: Future<Output = ()>,
{
    let body = find_message_body(doc).ok_or(ExtractionError::BodyNotFound)?;
    let text = normalize_text(&doc.visible_text(&body))?;

    let response = bus::request(bus, BusRequest::generate_ad(text), deadline).await;
    let view = ResultView::from_result(&response.into_result()?);

    match find_message_body(doc) {
        Some(current) if current != body => {
            debug!("Dropped result for a message that is no longer open");
            Ok(None)
        }
        current => {
            doc.show_panel(current.as_ref(), &view)?;
            Ok(Some(view))
        }
    }
}

/// Alert text for a failed analysis
pub fn alert_message(err: &AnalysisError) -> String {
    match err {
        AnalysisError::Extraction(e) => e.to_string(),
        other => format!("Error: {}", other),
    }
}
