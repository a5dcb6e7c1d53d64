use chrono::NaiveDate;

use crate::alert::DEFAULT_DISMISS_MS;

pub const DEFAULT_BACK_TO_TOP_THRESHOLD: i64 = 300;
pub const DEFAULT_TIMER_STEP_LIMIT: usize = 10_000;
pub const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;

/// Load-time settings for a [`Page`](crate::Page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Delay before an alert dismisses itself.
    pub alert_dismiss_ms: i64,
    /// Vertical offset above which the back-to-top control is shown.
    pub back_to_top_threshold: i64,
    /// Offset of local time from UTC, used for "today".
    pub utc_offset_minutes: i32,
    /// Clock value (epoch milliseconds) at load.
    pub start_ms: i64,
    pub timer_step_limit: usize,
    pub trace_log_limit: usize,
    /// Element that receives new alerts as its first child.
    pub container_selector: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            alert_dismiss_ms: DEFAULT_DISMISS_MS,
            back_to_top_threshold: DEFAULT_BACK_TO_TOP_THRESHOLD,
            utc_offset_minutes: 0,
            start_ms: 0,
            timer_step_limit: DEFAULT_TIMER_STEP_LIMIT,
            trace_log_limit: DEFAULT_TRACE_LOG_LIMIT,
            container_selector: ".container".to_string(),
        }
    }
}

impl PageOptions {
    pub fn with_alert_dismiss_ms(mut self, delay_ms: i64) -> Self {
        self.alert_dismiss_ms = delay_ms.max(0);
        self
    }

    pub fn with_back_to_top_threshold(mut self, threshold: i64) -> Self {
        self.back_to_top_threshold = threshold;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_start_ms(mut self, epoch_ms: i64) -> Self {
        self.start_ms = epoch_ms;
        self
    }

    /// Starts the clock at local midnight of `date`.
    pub fn with_start_date(self, date: NaiveDate) -> Self {
        let utc_midnight_ms = date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis())
            .unwrap_or_default();
        let offset_ms = i64::from(self.utc_offset_minutes) * 60_000;
        self.with_start_ms(utc_midnight_ms - offset_ms)
    }

    pub fn with_timer_step_limit(mut self, max_steps: usize) -> Self {
        self.timer_step_limit = max_steps.max(1);
        self
    }

    pub fn with_trace_log_limit(mut self, max_entries: usize) -> Self {
        self.trace_log_limit = max_entries.max(1);
        self
    }

    pub fn with_container_selector(mut self, selector: &str) -> Self {
        self.container_selector = selector.to_string();
        self
    }
}
