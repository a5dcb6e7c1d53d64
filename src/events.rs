use std::collections::HashMap;

use crate::dialogs::ConfirmGate;
use crate::dom::NodeId;
use crate::forms::FormKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventTarget {
    Window,
    Node(NodeId),
}

/// A page behavior attached to an event target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Binding {
    ToggleDoctorFields,
    ShowPasswordStrength,
    FormatPhone,
    SearchDoctors,
    ScrollToTop,
    BackToTopVisibility,
    /// Delegated handler for every `[data-bs-dismiss="alert"]` control.
    DismissAlert,
    CharacterCount { counter_id: String },
    ValidateForm(FormKind),
    Confirm(ConfirmGate),
    FilterAppointments { status: String },
}

impl Binding {
    pub(crate) fn name(&self) -> String {
        match self {
            Self::ToggleDoctorFields => "toggle_doctor_fields".into(),
            Self::ShowPasswordStrength => "show_password_strength".into(),
            Self::FormatPhone => "format_phone".into(),
            Self::SearchDoctors => "search_doctors".into(),
            Self::ScrollToTop => "scroll_to_top".into(),
            Self::BackToTopVisibility => "back_to_top_visibility".into(),
            Self::DismissAlert => "dismiss_alert".into(),
            Self::CharacterCount { counter_id } => format!("character_count({counter_id})"),
            Self::ValidateForm(kind) => format!("validate_form({})", kind.as_str()),
            Self::Confirm(ConfirmGate::Cancellation) => "confirm(cancellation)".into(),
            Self::Confirm(ConfirmGate::Action(_)) => "confirm(action)".into(),
            Self::FilterAppointments { status } => format!("filter_appointments({status})"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<EventTarget, HashMap<String, Vec<Binding>>>,
}

impl ListenerStore {
    /// Registering the same binding twice for one target and event type is a no-op.
    pub(crate) fn add(&mut self, target: EventTarget, event: &str, binding: Binding) -> bool {
        let listeners = self
            .map
            .entry(target)
            .or_default()
            .entry(event.to_string())
            .or_default();

        if listeners.contains(&binding) {
            return false;
        }
        listeners.push(binding);
        true
    }

    pub(crate) fn get(&self, target: EventTarget, event: &str) -> Vec<Binding> {
        self.map
            .get(&target)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: EventTarget,
    pub(crate) current_target: EventTarget,
    pub(crate) time_stamp_ms: i64,
    pub(crate) default_prevented: bool,
    pub(crate) bubbles: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: EventTarget, time_stamp_ms: i64) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            time_stamp_ms,
            default_prevented: false,
            bubbles: event_type != "scroll",
        }
    }

    pub(crate) fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(node) => Some(node),
            EventTarget::Window => None,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
