use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DISMISS_MS: i64 = 5_000;

pub(crate) const ALERT_SELECTOR: &str = ".alert";
pub(crate) const CLOSE_CONTROL_SELECTOR: &str = ".btn-close";
pub(crate) const DISMISS_TRIGGER_SELECTOR: &str = "[data-bs-dismiss=\"alert\"]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Class list of a dismissible alert of this severity.
    pub fn alert_class(self) -> String {
        format!("alert alert-{} alert-dismissible fade show", self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "danger" => Ok(Self::Danger),
            other => Err(format!("unknown alert severity: {other}")),
        }
    }
}
