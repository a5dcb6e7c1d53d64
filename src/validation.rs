//! Pure predicates shared by the form validators and the live indicators.
//!
//! String handling follows what the page sees in a browser: trimming strips the
//! ECMAScript whitespace set, and lengths are counted in UTF-16 code units.

use std::sync::LazyLock;

use chrono::NaiveDate;
use fancy_regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PHONE_DIGITS: usize = 10;

// ECMAScript `\s`: WhiteSpace plus LineTerminator. Differs from Unicode
// White_Space (no U+0085, adds U+FEFF).
const JS_WHITESPACE_CLASS: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let part = format!("[^{JS_WHITESPACE_CLASS}@]+");
    Regex::new(&format!("^{part}@{part}\\.{part}$")).expect("email pattern compiles")
});

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("username pattern compiles"));

static FLOAT_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern compiles")
});

const STRENGTH_TABLE: [(&str, &str); 5] = [
    ("Very Weak", "#ef4444"),
    ("Weak", "#f59e0b"),
    ("Fair", "#eab308"),
    ("Good", "#10b981"),
    ("Strong", "#059669"),
];

/// Feedback shown by the live password-strength bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthLevel {
    pub score: u8,
    pub label: &'static str,
    pub color: &'static str,
}

impl StrengthLevel {
    pub fn from_score(score: u8) -> Self {
        let score = score.min(5);
        let idx = usize::from(score.saturating_sub(1));
        let (label, color) = STRENGTH_TABLE[idx];
        Self {
            score,
            label,
            color,
        }
    }

    /// Bar width as a CSS percentage, 20% per point.
    pub fn width(&self) -> String {
        format!("{}%", u32::from(self.score) * 20)
    }
}

pub fn is_js_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub fn trim_form_value(value: &str) -> &str {
    value.trim_matches(is_js_whitespace)
}

pub fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email).unwrap_or(false)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username).unwrap_or(false)
}

/// Registration rule: one ASCII uppercase letter, one lowercase letter and one
/// digit. Length is checked separately.
pub fn has_password_strength(password: &str) -> bool {
    let has_upper = password.chars().any(|ch| ch.is_ascii_uppercase());
    let has_lower = password.chars().any(|ch| ch.is_ascii_lowercase());
    let has_digit = password.chars().any(|ch| ch.is_ascii_digit());
    has_upper && has_lower && has_digit
}

pub fn password_strength_score(password: &str) -> u8 {
    let checks = [
        utf16_len(password) >= MIN_PASSWORD_LEN,
        password.chars().any(|ch| ch.is_ascii_lowercase()),
        password.chars().any(|ch| ch.is_ascii_uppercase()),
        password.chars().any(|ch| ch.is_ascii_digit()),
        password.chars().any(|ch| !ch.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

pub fn assess_password(password: &str) -> StrengthLevel {
    StrengthLevel::from_score(password_strength_score(password))
}

/// Keeps the ASCII digits of `raw`, at most [`MAX_PHONE_DIGITS`] of them.
pub fn format_phone_digits(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_DIGITS)
        .collect()
}

/// Parses the longest numeric prefix, the way a browser's `parseFloat` does.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let src = raw.trim_start_matches(is_js_whitespace);
    let matched = FLOAT_PREFIX_PATTERN.find(src).ok().flatten()?;
    matched.as_str().parse::<f64>().ok()
}

pub fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Same-day dates are allowed; only earlier calendar days are rejected.
pub fn is_on_or_after(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

pub fn character_count_label(text: &str) -> String {
    format!("{} characters", utf16_len(text))
}
