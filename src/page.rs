use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate};

use crate::dialogs::{ConfirmDialog, ScriptedConfirm};
use crate::dom::{Dom, NodeId, NodeType};
use crate::events::{EventState, EventTarget, ListenerStore};
use crate::hooks::{
    Availability, PlaceholderBackend, SlotProvider, TimeSlot, TimeSlotQuery, UsernameDirectory,
    UsernameQuery,
};
use crate::html::parse_html;
use crate::options::PageOptions;
use crate::timers::{PendingTimer, ScheduledTask, Scheduler};
use crate::{Error, Result, truncate_chars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// A `window.scrollTo` call made by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: i64,
    pub behavior: ScrollBehavior,
}

/// A form submission that no listener cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub form_id: Option<String>,
    pub action: Option<String>,
    pub method: String,
}

/// A link activation that no listener cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub href: String,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
}

impl TraceState {
    fn new(log_limit: usize) -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            logs: VecDeque::new(),
            log_limit: log_limit.max(1),
        }
    }
}

/// A loaded document together with its listeners, fake clock and dialogs.
///
/// Loading runs the page's ready handler, so behaviors are wired before the
/// first user action.
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) options: PageOptions,
    pub(crate) trace_state: TraceState,
    pub(crate) scroll_y: i64,
    scroll_requests: Vec<ScrollRequest>,
    submissions: Vec<Submission>,
    navigations: Vec<Navigation>,
    scripted_confirm: ScriptedConfirm,
    custom_confirm: Option<Box<dyn ConfirmDialog>>,
    username_directory: Box<dyn UsernameDirectory>,
    slot_provider: Box<dyn SlotProvider>,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_options(html, PageOptions::default())
    }

    pub fn with_options(html: &str, options: PageOptions) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: Scheduler::new(options.start_ms, options.timer_step_limit),
            trace_state: TraceState::new(options.trace_log_limit),
            options,
            scroll_y: 0,
            scroll_requests: Vec::new(),
            submissions: Vec::new(),
            navigations: Vec::new(),
            scripted_confirm: ScriptedConfirm::new(),
            custom_confirm: None,
            username_directory: Box::new(PlaceholderBackend),
            slot_provider: Box::new(PlaceholderBackend),
        };
        page.bootstrap()?;
        Ok(page)
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    // User actions

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) || self.dom.attr(target, "readonly").is_some() {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    /// Picks the option whose value is `value`, as a user would.
    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.dom.is_tag(target, "select") {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: self.dom.tag_name(target).unwrap_or("non-element").to_string(),
            });
        }
        if self.dom.disabled(target) {
            return Ok(());
        }

        self.dom.set_value(target, value)?;
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub(crate) fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }

        let click_outcome = self.dispatch_event(target, "click")?;
        if click_outcome.default_prevented {
            return Ok(());
        }

        if is_submit_control(&self.dom, target) {
            return self.request_form_submit(target);
        }

        if let Some(anchor) = self.dom.closest(target, "a[href]")? {
            if !self.dom.is_connected(anchor) {
                return Ok(());
            }
            let href = self.dom.attr(anchor, "href").unwrap_or_default();
            self.trace_event_line(format!("[navigation] href={href}"));
            self.navigations.push(Navigation { href });
        }
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.request_form_submit(target)
    }

    pub(crate) fn request_form_submit(&mut self, target: NodeId) -> Result<()> {
        let Some(form) = self.dom.closest(target, "form")? else {
            return Ok(());
        };

        if !self.form_is_valid_for_submit(form)? {
            self.trace_event_line(format!(
                "[event] submit blocked target={} reason=required_field_missing",
                self.node_label(form)
            ));
            return Ok(());
        }

        let submit_outcome = self.dispatch_event(form, "submit")?;
        if !submit_outcome.default_prevented {
            self.submissions.push(Submission {
                form_id: self.dom.attr(form, "id"),
                action: self.dom.attr(form, "action"),
                method: self
                    .dom
                    .attr(form, "method")
                    .map(|method| method.to_ascii_lowercase())
                    .unwrap_or_else(|| "get".into()),
            });
        }
        Ok(())
    }

    fn form_is_valid_for_submit(&self, form: NodeId) -> Result<bool> {
        if self.dom.attr(form, "novalidate").is_some() {
            return Ok(true);
        }

        for control in self.form_controls(form)? {
            if !self.dom.required(control) || self.dom.disabled(control) {
                continue;
            }
            let kind = self
                .dom
                .attr(control, "type")
                .unwrap_or_default()
                .to_ascii_lowercase();
            if matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset" | "image") {
                continue;
            }
            if self.dom.value(control)?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn form_controls(&self, form: NodeId) -> Result<Vec<NodeId>> {
        let controls = self.dom.query_selector_all("input, select, textarea")?;
        Ok(controls
            .into_iter()
            .filter(|control| {
                self.dom
                    .closest(*control, "form")
                    .ok()
                    .flatten()
                    .is_some_and(|owner| owner == form)
            })
            .collect())
    }

    /// Fires a bubbling event of `event_type` at the first element matching `selector`.
    pub fn dispatch(&mut self, selector: &str, event_type: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event_type)?;
        Ok(())
    }

    /// Moves the viewport to vertical offset `y` and fires `scroll` on the window.
    pub fn scroll_to(&mut self, y: i64) -> Result<()> {
        self.scroll_y = y.max(0);
        self.dispatch_on(EventTarget::Window, "scroll")?;
        Ok(())
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub(crate) fn record_scroll_request(&mut self, request: ScrollRequest) {
        self.trace_event_line(format!(
            "[scroll] to top={} behavior={:?}",
            request.top, request.behavior
        ));
        self.scroll_y = request.top;
        self.scroll_requests.push(request);
    }

    pub fn take_scroll_requests(&mut self) -> Vec<ScrollRequest> {
        std::mem::take(&mut self.scroll_requests)
    }

    pub fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    pub fn take_navigations(&mut self) -> Vec<Navigation> {
        std::mem::take(&mut self.navigations)
    }

    // Events

    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        self.dispatch_on(EventTarget::Node(target), event_type)
    }

    pub(crate) fn dispatch_on(
        &mut self,
        target: EventTarget,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target, self.scheduler.now_ms);
        let path = self.propagation_path(target, event.bubbles);

        for current in path {
            let bindings = self.listeners.get(current, event_type);
            if bindings.is_empty() {
                continue;
            }
            event.current_target = current;
            for binding in bindings {
                self.trace_event_line(format!(
                    "[event] {} target={} current={} binding={}",
                    event.event_type,
                    self.target_label(event.target),
                    self.target_label(current),
                    binding.name()
                ));
                self.run_binding(&binding, &mut event)?;
            }
        }

        self.trace_event_line(format!(
            "[event] done {} target={} at={} default_prevented={}",
            event.event_type,
            self.target_label(event.target),
            event.time_stamp_ms,
            event.default_prevented
        ));
        Ok(event)
    }

    fn propagation_path(&self, target: EventTarget, bubbles: bool) -> Vec<EventTarget> {
        let EventTarget::Node(node) = target else {
            return vec![EventTarget::Window];
        };

        let mut path = vec![target];
        if !bubbles {
            return path;
        }
        let mut cursor = self.dom.parent(node);
        while let Some(ancestor) = cursor {
            path.push(EventTarget::Node(ancestor));
            cursor = self.dom.parent(ancestor);
        }
        if self.dom.is_connected(node) {
            path.push(EventTarget::Window);
        }
        path
    }

    fn target_label(&self, target: EventTarget) -> String {
        match target {
            EventTarget::Window => "window".into(),
            EventTarget::Node(node) => self.node_label(node),
        }
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        match &self.dom.nodes[node.0].node_type {
            NodeType::Document => "document".into(),
            NodeType::Text(_) => "#text".into(),
            NodeType::Element(element) => match element.attrs.get("id") {
                Some(id) if !id.is_empty() => format!("#{id}"),
                _ => element.tag_name.clone(),
            },
        }
    }

    // Clock and timers

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    /// Today's calendar date in the page's local time zone.
    pub fn today(&self) -> NaiveDate {
        let offset_ms = i64::from(self.options.utc_offset_minutes) * 60_000;
        DateTime::from_timestamp_millis(self.scheduler.now_ms.saturating_add(offset_ms))
            .map(|local| local.date_naive())
            .unwrap_or_default()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending()
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    /// Runs every queued timer, moving the clock forward to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(task) = self.scheduler.pop_next(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };

        if task.due_at > self.scheduler.now_ms {
            self.scheduler.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while self.scheduler.next_task_index(due_limit).is_some() {
            steps += 1;
            if steps > self.scheduler.timer_step_limit {
                return Err(self.scheduler.step_limit_error(steps, due_limit));
            }
            let Some(task) = self.scheduler.pop_next(due_limit) else {
                break;
            };
            if advance_clock && task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} now_ms={}",
            task.id, task.due_at, self.scheduler.now_ms
        ));
        self.run_timer_action(task.action)
    }

    // Tracing

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_state.timers = enabled;
    }

    /// Caps the retained trace lines, dropping the oldest. The cap is at least 1.
    pub fn set_trace_log_limit(&mut self, max_entries: usize) {
        self.trace_state.log_limit = max_entries.max(1);
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if self.trace_state.enabled {
            log::debug!("{line}");
            if self.trace_state.logs.len() >= self.trace_state.log_limit {
                self.trace_state.logs.pop_front();
            }
            self.trace_state.logs.push_back(line);
        }
    }

    // Dialogs

    /// Replaces the scripted confirmation dialog with `dialog`.
    pub fn set_confirm_dialog<D>(&mut self, dialog: D)
    where
        D: ConfirmDialog + 'static,
    {
        self.custom_confirm = Some(Box::new(dialog));
    }

    pub fn enqueue_confirm_response(&mut self, accepted: bool) {
        self.scripted_confirm.enqueue_response(accepted);
    }

    pub fn set_default_confirm_response(&mut self, accepted: bool) {
        self.scripted_confirm.set_default_response(accepted);
    }

    /// Messages shown by the scripted dialog since the last call.
    pub fn take_confirm_prompts(&mut self) -> Vec<String> {
        self.scripted_confirm.take_prompts()
    }

    pub(crate) fn ask_confirm(&mut self, message: &str) -> bool {
        let accepted = match self.custom_confirm.as_mut() {
            Some(dialog) => dialog.confirm(message),
            None => self.scripted_confirm.confirm(message),
        };
        self.trace_line(format!("[dialog] confirm message={message:?} accepted={accepted}"));
        accepted
    }

    // Extension hooks

    pub fn set_username_directory<D>(&mut self, directory: D)
    where
        D: UsernameDirectory + 'static,
    {
        self.username_directory = Box::new(directory);
    }

    pub fn set_slot_provider<P>(&mut self, provider: P)
    where
        P: SlotProvider + 'static,
    {
        self.slot_provider = Box::new(provider);
    }

    pub fn check_username_availability(&self, username: &str) -> Option<Availability> {
        self.username_directory.check_username(&UsernameQuery {
            username: username.to_string(),
        })
    }

    pub fn load_available_time_slots(
        &self,
        doctor_id: u64,
        date: NaiveDate,
    ) -> Option<Vec<TimeSlot>> {
        self.slot_provider
            .available_slots(&TimeSlotQuery { doctor_id, date })
    }

    // Inspection and assertions

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    /// Inline style property, empty when unset.
    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn is_required(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.required(target))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: format!("{selector} {{{property}}}"),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}

fn is_submit_control(dom: &Dom, node: NodeId) -> bool {
    let kind = dom.attr(node, "type").map(|kind| kind.to_ascii_lowercase());
    if dom.is_tag(node, "button") {
        return matches!(kind.as_deref(), None | Some("submit"));
    }
    dom.is_tag(node, "input") && matches!(kind.as_deref(), Some("submit" | "image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_follows_utc_offset() -> Result<()> {
        // 2024-06-14T23:30:00Z
        let options = PageOptions::default().with_start_ms(1_718_407_800_000);
        let page = Page::with_options("<main></main>", options.clone())?;
        assert_eq!(page.today().to_string(), "2024-06-14");

        let east = Page::with_options("<main></main>", options.with_utc_offset_minutes(60))?;
        assert_eq!(east.today().to_string(), "2024-06-15");
        Ok(())
    }

    #[test]
    fn type_text_rejects_non_text_controls() -> Result<()> {
        let mut page = Page::from_html("<div id='box'></div><input id='name' disabled>")?;
        match page.type_text("#box", "x") {
            Err(Error::TypeMismatch { actual, .. }) => assert_eq!(actual, "div"),
            other => panic!("unexpected: {other:?}"),
        }
        page.type_text("#name", "ignored")?;
        page.assert_value("#name", "")?;
        assert!(matches!(
            page.type_text("#missing", "x"),
            Err(Error::SelectorNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn required_controls_block_native_submission() -> Result<()> {
        let mut page = Page::from_html(
            r#"
            <form id="f" action="/book" method="POST">
              <input id="reason" required>
              <button id="go">Book</button>
            </form>
            "#,
        )?;
        page.click("#go")?;
        assert!(page.take_submissions().is_empty());

        page.type_text("#reason", "Follow-up")?;
        page.click("#go")?;
        assert_eq!(
            page.take_submissions(),
            vec![Submission {
                form_id: Some("f".into()),
                action: Some("/book".into()),
                method: "post".into(),
            }]
        );
        Ok(())
    }

    #[test]
    fn links_record_navigations() -> Result<()> {
        let mut page = Page::from_html("<a id='home' href='/dashboard'><span id='label'>Home</span></a>")?;
        page.click("#label")?;
        assert_eq!(
            page.take_navigations(),
            vec![Navigation {
                href: "/dashboard".into()
            }]
        );
        Ok(())
    }

    #[test]
    fn timer_controls_validate_arguments() -> Result<()> {
        let mut page = Page::with_options("<main></main>", PageOptions::default().with_start_ms(100))?;
        assert!(matches!(page.advance_time(-1), Err(Error::Timer(_))));
        assert!(matches!(page.advance_time_to(50), Err(Error::Timer(_))));
        assert!(!page.run_next_timer()?);
        assert_eq!(page.run_due_timers()?, 0);
        page.advance_time(25)?;
        assert_eq!(page.now_ms(), 125);
        Ok(())
    }

    #[test]
    fn trace_log_respects_limit_and_toggles() -> Result<()> {
        let mut page = Page::from_html("<div class='container'></div>")?;
        page.enable_trace(true);
        page.set_trace_log_limit(2);
        page.clear_all_timers();
        page.advance_time(1)?;
        page.advance_time(1)?;
        let logs = page.take_trace_logs();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|line| line.starts_with("[timer] advance")));

        page.set_trace_timers(false);
        page.advance_time(1)?;
        assert!(page.take_trace_logs().is_empty());
        Ok(())
    }

    #[test]
    fn custom_dialog_overrides_scripted_answers() -> Result<()> {
        let mut page = Page::from_html("<main></main>")?;
        page.enqueue_confirm_response(false);
        assert!(!page.ask_confirm("first?"));
        assert_eq!(page.take_confirm_prompts(), vec!["first?".to_string()]);

        page.set_confirm_dialog(|message: &str| message.ends_with('!'));
        assert!(page.ask_confirm("go!"));
        assert!(!page.ask_confirm("go?"));
        assert!(page.take_confirm_prompts().is_empty());
        Ok(())
    }
}
