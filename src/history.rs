/// Dashboard classification history

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use yew::functional::Reducible;

use crate::protocol::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Spam,
    NotSpam,
}

impl Verdict {
    /// The dashboard only distinguishes spam from everything else
    pub fn from_classification(classification: &Classification) -> Self {
        if classification.is_spam() {
            Verdict::Spam
        } else {
            Verdict::NotSpam
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Spam => "Spam",
            Verdict::NotSpam => "Not Spam",
        }
    }
}

/// One analyzed message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: f64,
    pub message: String,
    pub verdict: Verdict,
    pub ad: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(Verdict),
}

impl HistoryFilter {
    pub fn matches(self, entry: &HistoryEntry) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Only(verdict) => entry.verdict == verdict,
        }
    }
}

/// Newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClassificationHistory {
    pub entries: Vec<HistoryEntry>,
}

impl ClassificationHistory {
    pub fn new() -> Self {
        ClassificationHistory {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    pub fn filtered(&self, filter: HistoryFilter) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn count(&self, filter: HistoryFilter) -> usize {
        self.entries.iter().filter(|e| filter.matches(e)).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub enum HistoryAction {
    Record(HistoryEntry),
    Clear,
}

/// Applied to the latest state, so a late result cannot undo a clear
impl Reducible for ClassificationHistory {
    type Action = HistoryAction;

    fn reduce(self: Rc<Self>, action: HistoryAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            HistoryAction::Record(entry) => next.record(entry),
            HistoryAction::Clear => next.clear(),
        }
        Rc::new(next)
    }
}
