/// The injected "Analyze & Generate" control

use web_sys::HtmlButtonElement;

/// Reserved id; at most one element with it exists in the page
pub const TRIGGER_ID: &str = "cyber-ad-btn";

pub const IDLE_LABEL: &str = "Analyze & Generate";
pub const BUSY_LABEL: &str = "Generating...";

pub const TRIGGER_STYLE: &str = "margin:8px 0;padding:8px 12px;background:#0b5fff;color:#fff;border:none;border-radius:6px;cursor:pointer;";

pub fn label_for(busy: bool) -> &'static str {
    if busy { BUSY_LABEL } else { IDLE_LABEL }
}

pub trait TriggerControl {
    fn is_busy(&self) -> bool;

    fn set_busy(&self, busy: bool);
}

impl TriggerControl for HtmlButtonElement {
    fn is_busy(&self) -> bool {
        self.disabled()
    }

    fn set_busy(&self, busy: bool) {
        self.set_disabled(busy);
        self.set_text_content(Some(label_for(busy)));
    }
}

/// Holds the control disabled for one analysis. Dropping the guard
/// restores it, whichever way the analysis ends.
pub struct BusyGuard<'a, C: TriggerControl> {
    control: &'a C,
}

impl<'a, C: TriggerControl> BusyGuard<'a, C> {
    /// `None` while another analysis holds the control
    pub fn acquire(control: &'a C) -> Option<Self> {
        if control.is_busy() {
            return None;
        }

        control.set_busy(true);
        Some(BusyGuard { control })
    }
}

impl<C: TriggerControl> Drop for BusyGuard<'_, C> {
    fn drop(&mut self) {
        self.control.set_busy(false);
    }
}
