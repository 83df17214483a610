/// Result panel shown after the message body

use crate::protocol::{AnalyzeResult, Classification};

/// Reserved id; a new analysis replaces the panel in place
pub const PANEL_ID: &str = "cyber-ad-panel";

pub const PANEL_STYLE: &str = "white-space:pre-wrap;background:#f3f4f6;border:1px solid #e5e7eb;padding:12px;border-radius:8px;margin-top:8px;";
pub const STATUS_STYLE: &str = "font-weight:600;margin-bottom:8px;";
pub const AD_STYLE: &str = "white-space:pre-wrap;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Alarm,
    Clear,
    Neutral,
}

impl Tone {
    pub fn color(self) -> Option<&'static str> {
        match self {
            Tone::Alarm => Some("#B00020"),
            Tone::Clear => Some("#0F9D58"),
            Tone::Neutral => None,
        }
    }
}

/// What the panel shows for one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub status: &'static str,
    pub tone: Tone,
    /// Only for spam, verbatim
    pub ad: Option<String>,
    pub note: Option<String>,
}

impl ResultView {
    pub fn from_result(result: &AnalyzeResult) -> Self {
        let (status, tone) = match &result.classification {
            Classification::Spam => ("SPAM DETECTED", Tone::Alarm),
            Classification::NotSpam => ("NOT SPAM", Tone::Clear),
            Classification::Other(_) => ("ANALYZED", Tone::Neutral),
        };

        let is_spam = result.classification.is_spam();
        let ad = result.ad.clone().filter(|ad| is_spam && !ad.is_empty());
        let note = match (&ad, &result.ad_generation_error) {
            (None, Some(reason)) if is_spam => Some(format!("Ad generation unavailable: {}", reason)),
            _ => None,
        };

        ResultView {
            status,
            tone,
            ad,
            note,
        }
    }

    pub fn status_style(&self) -> String {
        match self.tone.color() {
            Some(color) => format!("{}color:{};", STATUS_STYLE, color),
            None => STATUS_STYLE.to_string(),
        }
    }
}
