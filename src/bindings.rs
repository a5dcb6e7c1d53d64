//! Page behaviors and the load-time wiring that attaches them to events.

use unicode_normalization::UnicodeNormalization;

use crate::alert::{ALERT_SELECTOR, CLOSE_CONTROL_SELECTOR, DISMISS_TRIGGER_SELECTOR, Severity};
use crate::dialogs::ConfirmGate;
use crate::dom::{Dom, NodeId};
use crate::events::{Binding, EventState, EventTarget};
use crate::forms::{self, FormFields, FormKind};
use crate::page::{Page, ScrollBehavior, ScrollRequest};
use crate::timers::TimerAction;
use crate::validation::{assess_password, character_count_label, format_phone_digits};
use crate::{Error, Result};

const APPOINTMENT_DATE_ID: &str = "appointment_date";
const USER_TYPE_ID: &str = "user_type";
const DOCTOR_FIELDS_ID: &str = "doctor-fields";
const DOCTOR_FIELD_IDS: [&str; 3] = ["specialization", "qualification", "consultation_fee"];
const PASSWORD_ID: &str = "password";
const PASSWORD_STRENGTH_ID: &str = "password-strength";
const PHONE_INPUT_SELECTOR: &str = "input[type=\"tel\"]";
const DOCTOR_SEARCH_ID: &str = "doctor-search";
const DOCTOR_CARD_SELECTOR: &str = ".doctor-card";
const DOCTOR_NAME_SELECTOR: &str = "h4";
const DOCTOR_SPECIALIZATION_SELECTOR: &str = ".doctor-specialization";
const APPOINTMENT_ROW_SELECTOR: &str = ".appointment-row";
const ALL_STATUSES: &str = "all";
const BACK_TO_TOP_ID: &str = "back-to-top";

/// Reads form fields by element id from the live document.
struct DomFields<'a> {
    dom: &'a Dom,
}

impl FormFields for DomFields<'_> {
    fn field(&self, name: &str) -> Option<String> {
        let node = self.dom.by_id(name)?;
        self.dom.value(node).ok()
    }
}

impl Page {
    pub(crate) fn bootstrap(&mut self) -> Result<()> {
        self.set_minimum_date()?;
        self.auto_dismiss_alerts()?;
        self.listeners.add(
            EventTarget::Node(self.dom.root),
            "click",
            Binding::DismissAlert,
        );
        self.toggle_doctor_fields()?;

        self.listen_by_id(USER_TYPE_ID, "change", Binding::ToggleDoctorFields);
        self.listen_by_id(PASSWORD_ID, "input", Binding::ShowPasswordStrength);
        for input in self.dom.query_selector_all(PHONE_INPUT_SELECTOR)? {
            self.listeners
                .add(EventTarget::Node(input), "input", Binding::FormatPhone);
        }
        self.listen_by_id(DOCTOR_SEARCH_ID, "input", Binding::SearchDoctors);
        if self.listen_by_id(BACK_TO_TOP_ID, "click", Binding::ScrollToTop) {
            self.listeners
                .add(EventTarget::Window, "scroll", Binding::BackToTopVisibility);
        }
        Ok(())
    }

    fn listen_by_id(&mut self, id: &str, event: &str, binding: Binding) -> bool {
        let Some(node) = self.dom.by_id(id) else {
            return false;
        };
        self.listeners.add(EventTarget::Node(node), event, binding);
        true
    }

    pub(crate) fn run_binding(&mut self, binding: &Binding, event: &mut EventState) -> Result<()> {
        let current = match event.current_target {
            EventTarget::Node(node) => Some(node),
            EventTarget::Window => None,
        };

        match binding {
            Binding::ToggleDoctorFields => self.toggle_doctor_fields(),
            Binding::ShowPasswordStrength => {
                let Some(input) = current else {
                    return Ok(());
                };
                let password = self.dom.value(input)?;
                self.show_password_strength(&password)
            }
            Binding::FormatPhone => match current {
                Some(input) => self.format_phone_node(input),
                None => Ok(()),
            },
            Binding::SearchDoctors => self.search_doctors(),
            Binding::ScrollToTop => self.scroll_to_top(),
            Binding::BackToTopVisibility => self.update_back_to_top_visibility(),
            Binding::DismissAlert => self.handle_dismiss_click(event),
            Binding::CharacterCount { counter_id } => match current {
                Some(textarea) => self.update_character_count_for(textarea, counter_id),
                None => Ok(()),
            },
            Binding::ValidateForm(kind) => {
                if !self.validate_form(*kind)? {
                    event.prevent_default();
                }
                Ok(())
            }
            Binding::Confirm(gate) => {
                if !self.ask_confirm(gate.message()) {
                    event.prevent_default();
                }
                Ok(())
            }
            Binding::FilterAppointments { status } => self.filter_appointments(status),
        }
    }

    pub(crate) fn run_timer_action(&mut self, action: TimerAction) -> Result<()> {
        match action {
            TimerAction::DismissAlert(alert) => self.dismiss_alert(alert),
        }
    }

    // Validators

    /// Runs the validator for `kind` against the document and shows an alert
    /// on the first failed check. Returns whether the form passed.
    pub fn validate_form(&mut self, kind: FormKind) -> Result<bool> {
        let today = self.today();
        let outcome = forms::validate(kind, &DomFields { dom: &self.dom }, today);
        match outcome {
            Ok(()) => Ok(true),
            Err(rejection) => {
                self.trace_event_line(format!(
                    "[validate] {} rejected={:?}",
                    kind.as_str(),
                    rejection
                ));
                self.show_alert(rejection.message(), rejection.severity())?;
                Ok(false)
            }
        }
    }

    pub fn validate_registration_form(&mut self) -> Result<bool> {
        self.validate_form(FormKind::Registration)
    }

    pub fn validate_login_form(&mut self) -> Result<bool> {
        self.validate_form(FormKind::Login)
    }

    pub fn validate_appointment_form(&mut self) -> Result<bool> {
        self.validate_form(FormKind::Appointment)
    }

    pub fn validate_profile_form(&mut self) -> Result<bool> {
        self.validate_form(FormKind::Profile)
    }

    /// Runs `kind`'s validator on every submit of the form matching
    /// `form_selector`, cancelling the submission when it fails.
    pub fn bind_form_validator(&mut self, form_selector: &str, kind: FormKind) -> Result<()> {
        let form = self.select_one(form_selector)?;
        if !self.dom.is_tag(form, "form") {
            return Err(Error::TypeMismatch {
                selector: form_selector.to_string(),
                expected: "form".into(),
                actual: self.dom.tag_name(form).unwrap_or("non-element").to_string(),
            });
        }
        self.listeners
            .add(EventTarget::Node(form), "submit", Binding::ValidateForm(kind));
        Ok(())
    }

    // Alerts

    /// Inserts a dismissible alert at the top of the main container and
    /// schedules its removal. Without a container nothing is shown.
    pub fn show_alert(&mut self, message: &str, severity: Severity) -> Result<()> {
        let Some(container) = self.dom.query_selector(&self.options.container_selector)? else {
            log::warn!("no alert container; dropped alert: {message}");
            self.trace_line(format!(
                "[alert] skipped severity={severity} reason=no_container"
            ));
            return Ok(());
        };

        let class_name = severity.alert_class();
        let alert = self
            .dom
            .create_detached_element("div", &[("class", class_name.as_str()), ("role", "alert")]);
        let text = self.dom.create_detached_text(message);
        self.dom.append_child(alert, text)?;
        let close = self.dom.create_detached_element(
            "button",
            &[
                ("type", "button"),
                ("class", "btn-close"),
                ("data-bs-dismiss", "alert"),
                ("aria-label", "Close"),
            ],
        );
        self.dom.append_child(alert, close)?;
        self.dom.prepend_child(container, alert)?;

        let timer_id = self.scheduler.schedule(
            self.options.alert_dismiss_ms,
            TimerAction::DismissAlert(alert),
        );
        self.trace_line(format!(
            "[alert] show severity={severity} timer_id={timer_id} message={message:?}"
        ));
        Ok(())
    }

    /// Schedules dismissal of every alert currently in the document.
    pub fn auto_dismiss_alerts(&mut self) -> Result<()> {
        for alert in self.dom.query_selector_all(ALERT_SELECTOR)? {
            let timer_id = self.scheduler.schedule(
                self.options.alert_dismiss_ms,
                TimerAction::DismissAlert(alert),
            );
            self.trace_timer_line(format!(
                "[timer] schedule id={timer_id} alert={}",
                self.node_label(alert)
            ));
        }
        Ok(())
    }

    fn dismiss_alert(&mut self, alert: NodeId) -> Result<()> {
        if !self.dom.is_connected(alert) {
            self.trace_timer_line("[alert] dismiss skipped reason=already_removed".into());
            return Ok(());
        }
        if let Some(close) = self.dom.query_selector_from(alert, CLOSE_CONTROL_SELECTOR)? {
            self.click_node(close)?;
        }
        // Close controls without a dismiss trigger leave the alert in place.
        if self.dom.is_connected(alert) {
            self.remove_alert(alert)?;
        }
        Ok(())
    }

    fn handle_dismiss_click(&mut self, event: &mut EventState) -> Result<()> {
        let Some(target) = event.target_node() else {
            return Ok(());
        };
        let Some(trigger) = self.dom.closest(target, DISMISS_TRIGGER_SELECTOR)? else {
            return Ok(());
        };
        if self.dom.is_tag(trigger, "a") {
            event.prevent_default();
        }
        match self.dom.closest(trigger, ALERT_SELECTOR)? {
            Some(alert) => self.remove_alert(alert),
            None => Ok(()),
        }
    }

    fn remove_alert(&mut self, alert: NodeId) -> Result<()> {
        self.dom.remove_node(alert)?;
        self.trace_line(format!("[alert] removed {}", self.node_label(alert)));
        Ok(())
    }

    // Confirmation

    pub fn confirm_action(&mut self, message: &str) -> bool {
        self.ask_confirm(message)
    }

    pub fn confirm_cancellation(&mut self) -> bool {
        self.ask_confirm(ConfirmGate::Cancellation.message())
    }

    /// Asks `gate`'s question on every click of the matching elements and
    /// cancels the click's default action when the answer is no.
    pub fn bind_confirmation(&mut self, selector: &str, gate: ConfirmGate) -> Result<()> {
        let targets = self.select_all(selector)?;
        for target in targets {
            self.listeners
                .add(EventTarget::Node(target), "click", Binding::Confirm(gate.clone()));
        }
        Ok(())
    }

    // Registration helpers

    pub fn toggle_doctor_fields(&mut self) -> Result<()> {
        let Some(group) = self.dom.by_id(DOCTOR_FIELDS_ID) else {
            return Ok(());
        };
        let is_doctor = match self.dom.by_id(USER_TYPE_ID) {
            Some(select) => self.dom.value(select)? == "doctor",
            None => false,
        };

        self.dom
            .style_set(group, "display", if is_doctor { "block" } else { "none" })?;
        for id in DOCTOR_FIELD_IDS {
            if let Some(field) = self.dom.by_id(id) {
                self.dom.set_required(field, is_doctor)?;
            }
        }
        Ok(())
    }

    pub fn show_password_strength(&mut self, password: &str) -> Result<()> {
        let Some(bar) = self.dom.by_id(PASSWORD_STRENGTH_ID) else {
            return Ok(());
        };
        let level = assess_password(password);
        self.dom.style_set(bar, "width", &level.width())?;
        self.dom.style_set(bar, "backgroundColor", level.color)?;
        self.dom.set_text_content(bar, level.label)
    }

    // Input utilities

    pub fn set_minimum_date(&mut self) -> Result<()> {
        let Some(input) = self.dom.by_id(APPOINTMENT_DATE_ID) else {
            return Ok(());
        };
        let today = self.today().format("%Y-%m-%d").to_string();
        self.dom.set_attr(input, "min", &today)
    }

    pub fn format_phone_number(&mut self, selector: &str) -> Result<()> {
        let input = self.select_one(selector)?;
        self.format_phone_node(input)
    }

    fn format_phone_node(&mut self, input: NodeId) -> Result<()> {
        let formatted = format_phone_digits(&self.dom.value(input)?);
        self.dom.set_value(input, &formatted)
    }

    pub fn update_character_count(&mut self, textarea_selector: &str, counter_id: &str) -> Result<()> {
        let textarea = self.select_one(textarea_selector)?;
        self.update_character_count_for(textarea, counter_id)
    }

    fn update_character_count_for(&mut self, textarea: NodeId, counter_id: &str) -> Result<()> {
        let Some(counter) = self.dom.by_id(counter_id) else {
            return Ok(());
        };
        let label = character_count_label(&self.dom.value(textarea)?);
        self.dom.set_text_content(counter, &label)
    }

    pub fn bind_character_counter(&mut self, textarea_selector: &str, counter_id: &str) -> Result<()> {
        let textarea = self.select_one(textarea_selector)?;
        self.listeners.add(
            EventTarget::Node(textarea),
            "input",
            Binding::CharacterCount {
                counter_id: counter_id.to_string(),
            },
        );
        Ok(())
    }

    // Scrolling

    pub fn scroll_to_top(&mut self) -> Result<()> {
        let moved = self.scroll_y != 0;
        self.record_scroll_request(ScrollRequest {
            top: 0,
            behavior: ScrollBehavior::Smooth,
        });
        if moved {
            self.dispatch_on(EventTarget::Window, "scroll")?;
        }
        Ok(())
    }

    fn update_back_to_top_visibility(&mut self) -> Result<()> {
        let Some(button) = self.dom.by_id(BACK_TO_TOP_ID) else {
            return Ok(());
        };
        let display = if self.scroll_y > self.options.back_to_top_threshold {
            "block"
        } else {
            "none"
        };
        self.dom.style_set(button, "display", display)
    }

    // Search and filter

    /// Shows the doctor cards whose name or specialization contains the
    /// search box text. An empty search box leaves the cards untouched.
    pub fn search_doctors(&mut self) -> Result<()> {
        let Some(search) = self.dom.by_id(DOCTOR_SEARCH_ID) else {
            return Ok(());
        };
        let query = normalize_for_search(&self.dom.value(search)?);
        if query.is_empty() {
            return Ok(());
        }

        let mut shown = 0usize;
        let cards = self.dom.query_selector_all(DOCTOR_CARD_SELECTOR)?;
        for card in &cards {
            let name = self.scoped_text(*card, DOCTOR_NAME_SELECTOR)?;
            let specialization = self.scoped_text(*card, DOCTOR_SPECIALIZATION_SELECTOR)?;
            let matched = normalize_for_search(&name).contains(&query)
                || normalize_for_search(&specialization).contains(&query);
            if matched {
                shown += 1;
            }
            self.dom
                .style_set(*card, "display", if matched { "block" } else { "none" })?;
        }
        self.trace_event_line(format!(
            "[search] query={query:?} shown={shown} total={}",
            cards.len()
        ));
        Ok(())
    }

    fn scoped_text(&self, root: NodeId, selector: &str) -> Result<String> {
        Ok(self
            .dom
            .query_selector_from(root, selector)?
            .map(|node| self.dom.text_content(node))
            .unwrap_or_default())
    }

    /// Shows appointment rows whose status matches `status`, or every row for
    /// `"all"`.
    pub fn filter_appointments(&mut self, status: &str) -> Result<()> {
        let wanted = status.to_lowercase();
        for row in self.dom.query_selector_all(APPOINTMENT_ROW_SELECTOR)? {
            let row_status = self
                .dom
                .dataset_get(row, "status")
                .map(|value| value.to_lowercase());
            let visible = status == ALL_STATUSES || row_status.as_deref() == Some(wanted.as_str());
            self.dom
                .style_set(row, "display", if visible { "table-row" } else { "none" })?;
        }
        Ok(())
    }

    /// Filters appointments by `status` whenever a matching control is clicked.
    pub fn bind_appointment_filter(&mut self, selector: &str, status: &str) -> Result<()> {
        let targets = self.select_all(selector)?;
        for target in targets {
            self.listeners.add(
                EventTarget::Node(target),
                "click",
                Binding::FilterAppointments {
                    status: status.to_string(),
                },
            );
        }
        Ok(())
    }

    fn select_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let targets = self.dom.query_selector_all(selector)?;
        if targets.is_empty() {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        Ok(targets)
    }
}

fn normalize_for_search(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PageOptions;

    const REGISTER_PAGE: &str = r#"
        <div class="container">
          <form id="register" novalidate>
            <input id="username" value="jane_doe">
            <input id="email" value="jane@example.com">
            <input id="password" type="password" value="Secret123">
            <input id="confirm_password" type="password" value="Secret123">
            <input id="full_name" value="Jane Doe">
            <select id="user_type">
              <option value="patient">Patient</option>
              <option value="doctor">Doctor</option>
            </select>
            <div id="doctor-fields">
              <input id="specialization">
              <input id="qualification">
              <input id="consultation_fee">
            </div>
            <div id="password-strength"></div>
          </form>
        </div>
    "#;

    #[test]
    fn bootstrap_hides_doctor_fields_for_patients() -> Result<()> {
        let page = Page::from_html(REGISTER_PAGE)?;
        page.assert_style("#doctor-fields", "display", "none")?;
        assert!(!page.is_required("#specialization")?);
        Ok(())
    }

    #[test]
    fn choosing_doctor_marks_fields_required() -> Result<()> {
        let mut page = Page::from_html(REGISTER_PAGE)?;
        page.select_option("#user_type", "doctor")?;
        page.assert_style("#doctor-fields", "display", "block")?;
        for id in DOCTOR_FIELD_IDS {
            assert!(page.is_required(&format!("#{id}"))?);
        }

        page.select_option("#user_type", "patient")?;
        page.assert_style("#doctor-fields", "display", "none")?;
        assert!(!page.is_required("#consultation_fee")?);
        Ok(())
    }

    #[test]
    fn doctor_fee_must_be_positive() -> Result<()> {
        let mut page = Page::from_html(REGISTER_PAGE)?;
        page.select_option("#user_type", "doctor")?;
        page.type_text("#specialization", "Cardiology")?;
        page.type_text("#qualification", "MD")?;
        page.type_text("#consultation_fee", "0")?;

        assert!(!page.validate_registration_form()?);
        page.assert_text(".alert", "Consultation fee must be greater than 0!")?;

        page.type_text("#consultation_fee", "150.50")?;
        assert!(page.validate_registration_form()?);
        Ok(())
    }

    #[test]
    fn password_strength_bar_tracks_input() -> Result<()> {
        let mut page = Page::from_html(REGISTER_PAGE)?;
        page.type_text("#password", "abcdefgh")?;
        page.assert_text("#password-strength", "Weak")?;
        page.assert_style("#password-strength", "width", "40%")?;
        page.assert_style("#password-strength", "background-color", "#f59e0b")?;

        page.type_text("#password", "Abcdefg1!")?;
        page.assert_text("#password-strength", "Strong")?;
        page.assert_style("#password-strength", "width", "100%")?;

        page.type_text("#password", "")?;
        page.assert_text("#password-strength", "Very Weak")?;
        page.assert_style("#password-strength", "width", "0%")?;
        page.assert_style("#password-strength", "background-color", "#ef4444")?;
        Ok(())
    }

    #[test]
    fn alert_markup_is_text_only() -> Result<()> {
        let mut page = Page::from_html("<main class='container'><p>body</p></main>")?;
        page.show_alert("<b>Saved</b>", Severity::Success)?;
        assert_eq!(
            page.dump_dom(".alert")?,
            "<div class=\"alert alert-success alert-dismissible fade show\" role=\"alert\">\
             <b>Saved</b>\
             <button aria-label=\"Close\" class=\"btn-close\" data-bs-dismiss=\"alert\" type=\"button\"></button>\
             </div>"
        );
        assert_eq!(page.count("b")?, 0);
        Ok(())
    }

    #[test]
    fn alert_without_container_is_dropped() -> Result<()> {
        let mut page = Page::from_html("<main></main>")?;
        page.enable_trace(true);
        page.show_alert("Hello", Severity::Info)?;
        assert_eq!(page.count(".alert")?, 0);
        assert!(page.pending_timers().is_empty());
        assert_eq!(
            page.take_trace_logs(),
            vec!["[alert] skipped severity=info reason=no_container".to_string()]
        );
        Ok(())
    }

    #[test]
    fn minimum_date_uses_local_today() -> Result<()> {
        let options = PageOptions::default()
            .with_utc_offset_minutes(-300)
            // 2024-06-15T02:00:00Z, still the 14th five hours west.
            .with_start_ms(1_718_416_800_000);
        let page = Page::with_options("<input id='appointment_date' type='date'>", options)?;
        assert_eq!(
            page.attr("#appointment_date", "min")?.as_deref(),
            Some("2024-06-14")
        );
        Ok(())
    }

    #[test]
    fn search_matches_composed_and_decomposed_names() -> Result<()> {
        let mut page = Page::from_html(
            "<input id='doctor-search'>\
             <div class='doctor-card' id='a'><h4>Dr. Jos\u{e9} Ruiz</h4><p class='doctor-specialization'>Dermatology</p></div>\
             <div class='doctor-card' id='b'><h4>Dr. Amy Chen</h4><p class='doctor-specialization'>Cardiology</p></div>",
        )?;
        page.type_text("#doctor-search", "JOSE\u{301}")?;
        page.assert_style("#a", "display", "block")?;
        page.assert_style("#b", "display", "none")?;
        Ok(())
    }
}
