use std::collections::HashMap;

use appointment_ui::forms::validate_login;
use appointment_ui::validation::{
    format_phone_digits, is_valid_email, is_valid_username, password_strength_score, utf16_len,
};
use appointment_ui::{Rejection, StrengthLevel};
use proptest::prelude::*;
use proptest::test_runner::FileFailurePersistence;

const VALIDATION_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/validation_property_test.txt";
const DEFAULT_VALIDATION_PROPTEST_CASES: u32 = 256;

fn validation_proptest_cases() -> u32 {
    std::env::var("APPOINTMENT_UI_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_VALIDATION_PROPTEST_CASES)
}

fn username_char() -> impl Strategy<Value = char> {
    prop_oneof![
        proptest::char::range('a', 'z'),
        proptest::char::range('A', 'Z'),
        proptest::char::range('0', '9'),
        Just('_'),
    ]
}

fn login_fields(username: &str, password: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        ("username", username.to_string()),
        ("password", password.to_string()),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: validation_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(VALIDATION_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn usernames_of_word_chars_within_bounds_are_accepted(
        name in proptest::collection::vec(username_char(), 3..=20)
    ) {
        let name: String = name.into_iter().collect();
        prop_assert!(is_valid_username(&name));
    }

    #[test]
    fn usernames_outside_length_bounds_are_rejected(
        name in prop_oneof![
            proptest::collection::vec(username_char(), 0..3),
            proptest::collection::vec(username_char(), 21..40),
        ]
    ) {
        let name: String = name.into_iter().collect();
        prop_assert!(!is_valid_username(&name));
    }

    #[test]
    fn usernames_with_other_characters_are_rejected(
        prefix in "[A-Za-z0-9_]{1,9}",
        bad in "[^A-Za-z0-9_]",
        suffix in "[A-Za-z0-9_]{1,9}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert!(!is_valid_username(&name));
    }

    #[test]
    fn emails_with_whitespace_are_rejected(
        local in "[a-z]{1,8}",
        domain in "[a-z]{1,8}",
        ws in prop_oneof![Just(' '), Just('\t'), Just('\u{00A0}'), Just('\u{FEFF}'), Just('\u{3000}')],
    ) {
        let clean = format!("{local}@{domain}.com");
        let spaced = format!("{local}{ws}x@{domain}.com");
        prop_assert!(is_valid_email(&clean));
        prop_assert!(!is_valid_email(&spaced));
    }

    #[test]
    fn strength_score_stays_in_table_range(password in ".{0,32}") {
        let score = password_strength_score(&password);
        prop_assert!(score <= 5);
        let level = StrengthLevel::from_score(score);
        prop_assert_eq!(level.width(), format!("{}%", u32::from(score) * 20));
    }

    #[test]
    fn formatted_phone_is_at_most_ten_digits(raw in ".{0,40}") {
        let formatted = format_phone_digits(&raw);
        prop_assert!(formatted.len() <= 10);
        prop_assert!(formatted.chars().all(|ch| ch.is_ascii_digit()));
        prop_assert_eq!(format_phone_digits(&formatted), formatted.clone());
    }

    #[test]
    fn login_password_length_counts_utf16_units(password in "\\PC{1,12}") {
        let outcome = validate_login(&login_fields("valid_user", &password));
        if utf16_len(&password) >= 8 {
            prop_assert_eq!(outcome, Ok(()));
        } else {
            prop_assert_eq!(outcome, Err(Rejection::LoginPasswordTooShort));
        }
    }
}
