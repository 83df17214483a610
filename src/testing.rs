/// Test doubles for the extension's seams

use std::cell::{Cell, RefCell};

use serde_json::Value;
use url::Url;

use crate::backend::{HttpReply, HttpTransport};
use crate::bus::MessageBus;
use crate::error::{BusError, DomError, TransportError};
use crate::observer::panel::ResultView;
use crate::observer::trigger::{label_for, TriggerControl, TRIGGER_ID};
use crate::observer::HostDocument;
use crate::observer::panel::PANEL_ID;
use crate::protocol::BusRequest;

/// Answers every POST with the same scripted reply
pub struct ScriptedTransport {
    reply: Result<HttpReply, TransportError>,
    calls: RefCell<Vec<(Url, Value)>>,
}

impl ScriptedTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        ScriptedTransport {
            reply: Ok(HttpReply::new(status, body)),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        ScriptedTransport {
            reply: Err(TransportError::Network(message.to_string())),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Url, Value)> {
        self.calls.borrow().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn post_json(&self, url: Url, body: Value) -> Result<HttpReply, TransportError> {
        self.calls.borrow_mut().push((url, body));
        self.reply.clone()
    }
}

enum BusReply {
    Value(Value),
    Disconnect(String),
    Silent,
}

pub struct FakeBus {
    reply: BusReply,
    sent: RefCell<Vec<BusRequest>>,
}

impl FakeBus {
    fn with(reply: BusReply) -> Self {
        FakeBus {
            reply,
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn replying(value: Value) -> Self {
        Self::with(BusReply::Value(value))
    }

    pub fn disconnected(message: &str) -> Self {
        Self::with(BusReply::Disconnect(message.to_string()))
    }

    /// Never answers
    pub fn silent() -> Self {
        Self::with(BusReply::Silent)
    }

    pub fn sent(&self) -> Vec<BusRequest> {
        self.sent.borrow().clone()
    }
}

impl MessageBus for FakeBus {
    async fn dispatch(&self, request: &BusRequest) -> Result<Value, BusError> {
        self.sent.borrow_mut().push(request.clone());
        match &self.reply {
            BusReply::Value(value) => Ok(value.clone()),
            BusReply::Disconnect(message) => Err(BusError::Disconnected(message.clone())),
            BusReply::Silent => futures::future::pending().await,
        }
    }
}

/// Replies like `FakeBus`, after the host has swapped the open message
pub struct NavigatingBus<'a> {
    doc: &'a FakeDocument,
    next: Option<String>,
    inner: FakeBus,
}

impl<'a> NavigatingBus<'a> {
    pub fn opening(doc: &'a FakeDocument, text: &str, reply: Value) -> Self {
        NavigatingBus {
            doc,
            next: Some(text.to_string()),
            inner: FakeBus::replying(reply),
        }
    }

    /// Leaves no message open
    pub fn closing(doc: &'a FakeDocument, reply: Value) -> Self {
        NavigatingBus {
            doc,
            next: None,
            inner: FakeBus::replying(reply),
        }
    }
}

impl MessageBus for NavigatingBus<'_> {
    async fn dispatch(&self, request: &BusRequest) -> Result<Value, BusError> {
        if let Some(open) = self.doc.query_first("div.a3s") {
            self.doc.remove_view(open);
        }
        if let Some(text) = &self.next {
            self.doc.add_body("a3s aiL", text);
        }
        self.inner.dispatch(request).await
    }
}

pub struct FakeControl {
    busy: Cell<bool>,
    label: Cell<&'static str>,
    transitions: RefCell<Vec<bool>>,
}

impl FakeControl {
    pub fn new() -> Self {
        FakeControl {
            busy: Cell::new(false),
            label: Cell::new(label_for(false)),
            transitions: RefCell::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label.get()
    }

    pub fn transitions(&self) -> Vec<bool> {
        self.transitions.borrow().clone()
    }
}

impl TriggerControl for FakeControl {
    fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
        self.label.set(label_for(busy));
        self.transitions.borrow_mut().push(busy);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FakeNode {
    Body { id: u32, classes: String, text: String },
    Trigger,
    Panel(ResultView),
    Unrelated,
}

/// Flat stand-in for the host page: nodes in document order
pub struct FakeDocument {
    nodes: RefCell<Vec<FakeNode>>,
    next_id: Cell<u32>,
    injections: Cell<usize>,
}

impl FakeDocument {
    pub fn new() -> Self {
        FakeDocument {
            nodes: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            injections: Cell::new(0),
        }
    }

    pub fn add_body(&self, classes: &str, text: &str) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.nodes.borrow_mut().push(FakeNode::Body {
            id,
            classes: classes.to_string(),
            text: text.to_string(),
        });
        id
    }

    pub fn add_unrelated(&self) {
        self.nodes.borrow_mut().push(FakeNode::Unrelated);
    }

    /// The host app swaps out the whole message view
    pub fn remove_view(&self, body: u32) {
        self.nodes.borrow_mut().retain(|node| match node {
            FakeNode::Body { id, .. } => *id != body,
            FakeNode::Trigger | FakeNode::Panel(_) => false,
            FakeNode::Unrelated => true,
        });
    }

    pub fn position_of(&self, body: u32) -> Option<usize> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| matches!(node, FakeNode::Body { id, .. } if *id == body))
    }

    pub fn trigger_position(&self) -> Option<usize> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| matches!(node, FakeNode::Trigger))
    }

    pub fn trigger_count(&self) -> usize {
        self.nodes
            .borrow()
            .iter()
            .filter(|node| matches!(node, FakeNode::Trigger))
            .count()
    }

    pub fn panel_position(&self) -> Option<usize> {
        self.nodes
            .borrow()
            .iter()
            .position(|node| matches!(node, FakeNode::Panel(_)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn injections(&self) -> usize {
        self.injections.get()
    }

    pub fn panels(&self) -> Vec<ResultView> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|node| match node {
                FakeNode::Panel(view) => Some(view.clone()),
                _ => None,
            })
            .collect()
    }
}

impl HostDocument for FakeDocument {
    type Element = u32;

    // Understands `tag.class.class` selectors only
    fn query_first(&self, selector: &str) -> Option<u32> {
        let required: Vec<&str> = selector.split('.').skip(1).collect();

        self.nodes.borrow().iter().find_map(|node| match node {
            FakeNode::Body { id, classes, .. } => {
                let present: Vec<&str> = classes.split_whitespace().collect();
                required
                    .iter()
                    .all(|class| present.contains(class))
                    .then_some(*id)
            }
            _ => None,
        })
    }

    fn contains_id(&self, id: &str) -> bool {
        self.nodes.borrow().iter().any(|node| match node {
            FakeNode::Trigger => id == TRIGGER_ID,
            FakeNode::Panel(_) => id == PANEL_ID,
            _ => false,
        })
    }

    fn visible_text(&self, body: &u32) -> String {
        self.nodes
            .borrow()
            .iter()
            .find_map(|node| match node {
                FakeNode::Body { id, text, .. } if id == body => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn insert_trigger_before(&self, body: &u32) -> Result<(), DomError> {
        let index = self
            .position_of(*body)
            .ok_or_else(|| DomError("body detached".to_string()))?;
        self.nodes.borrow_mut().insert(index, FakeNode::Trigger);
        self.injections.set(self.injections.get() + 1);
        Ok(())
    }

    fn show_panel(&self, body: Option<&u32>, view: &ResultView) -> Result<(), DomError> {
        self.nodes
            .borrow_mut()
            .retain(|node| !matches!(node, FakeNode::Panel(_)));

        let panel = FakeNode::Panel(view.clone());
        match body.and_then(|body| self.position_of(*body)) {
            Some(index) => self.nodes.borrow_mut().insert(index + 1, panel),
            None => self.nodes.borrow_mut().push(panel),
        }
        Ok(())
    }
}
