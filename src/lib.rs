//! Form validation and page interaction layer for a doctor-appointment web
//! application.
//!
//! The pure half ([`validation`], [`forms`]) never touches a document. The
//! [`Page`] half loads server-rendered HTML into an in-memory DOM, wires the
//! behaviors to events the way the page script does at load time, and drives
//! them deterministically with a fake clock.

mod bindings;
mod dom;
mod events;
mod html;
mod page;
mod selector;
mod timers;

pub mod alert;
pub mod dialogs;
pub mod forms;
pub mod hooks;
pub mod options;
pub mod validation;

pub use alert::Severity;
pub use dialogs::{ConfirmDialog, ConfirmGate, ScriptedConfirm};
pub use forms::{FormFields, FormKind, Rejection};
pub use hooks::{
    Availability, PlaceholderBackend, SlotProvider, TimeSlot, TimeSlotQuery, UsernameDirectory,
    UsernameQuery,
};
pub use options::PageOptions;
pub use page::{Navigation, Page, ScrollBehavior, ScrollRequest, Submission};
pub use timers::PendingTimer;
pub use validation::StrengthLevel;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("timer error: {0}")]
    Timer(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
