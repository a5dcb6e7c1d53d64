//! Form validators.
//!
//! Each validator reads its fields from a [`FormFields`] source, runs its
//! checks in a fixed order and stops at the first failure. Values are trimmed
//! before emptiness checks, except passwords.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;

use crate::alert::Severity;
use crate::validation::{
    MIN_PASSWORD_LEN, has_password_strength, is_on_or_after, is_valid_email, is_valid_username,
    parse_float_prefix, parse_form_date, trim_form_value, utf16_len,
};

const DOCTOR_USER_TYPE: &str = "doctor";
const MIN_LOGIN_USERNAME_LEN: usize = 3;
const MIN_REASON_LEN: usize = 10;
const MIN_PHONE_LEN: usize = 10;

/// Read access to named form controls. A missing control reads as `None`.
pub trait FormFields {
    fn field(&self, name: &str) -> Option<String>;

    fn raw(&self, name: &str) -> String {
        self.field(name).unwrap_or_default()
    }

    fn trimmed(&self, name: &str) -> String {
        trim_form_value(&self.raw(name)).to_string()
    }
}

impl<K, V> FormFields for HashMap<K, V>
where
    K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
    V: AsRef<str>,
{
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_string())
    }
}

impl<K, V> FormFields for BTreeMap<K, V>
where
    K: std::borrow::Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Registration,
    Login,
    Appointment,
    Profile,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Login => "login",
            Self::Appointment => "appointment",
            Self::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingRegistrationFields,
    InvalidUsername,
    InvalidEmail,
    PasswordTooShort,
    WeakPassword,
    PasswordMismatch,
    MissingDoctorFields,
    NonPositiveFee,
    MissingCredentials,
    LoginUsernameTooShort,
    LoginPasswordTooShort,
    MissingAppointmentFields,
    PastAppointmentDate,
    ReasonTooShort,
    MissingProfileFields,
    InvalidPhone,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingRegistrationFields => "Please fill in all required fields!",
            Self::InvalidUsername => {
                "Username must be 3-20 characters and contain only letters, numbers, and underscores!"
            }
            Self::InvalidEmail => "Please enter a valid email address!",
            Self::PasswordTooShort => "Password must be at least 8 characters long!",
            Self::WeakPassword => {
                "Password must contain at least one uppercase letter, one lowercase letter, and one number!"
            }
            Self::PasswordMismatch => "Passwords do not match!",
            Self::MissingDoctorFields => "Please fill in all doctor-specific fields!",
            Self::NonPositiveFee => "Consultation fee must be greater than 0!",
            Self::MissingCredentials => "Please enter both username and password!",
            Self::LoginUsernameTooShort => "Please enter a valid username!",
            Self::LoginPasswordTooShort => "Please enter a valid password!",
            Self::MissingAppointmentFields => "Please fill in all fields!",
            Self::PastAppointmentDate => "Please select a future date!",
            Self::ReasonTooShort => "Please provide a detailed reason (at least 10 characters)!",
            Self::MissingProfileFields => "Full name and email are required!",
            Self::InvalidPhone => "Please enter a valid phone number!",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::WeakPassword | Self::ReasonTooShort => Severity::Warning,
            _ => Severity::Danger,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn validate(
    kind: FormKind,
    fields: &impl FormFields,
    today: NaiveDate,
) -> Result<(), Rejection> {
    match kind {
        FormKind::Registration => validate_registration(fields),
        FormKind::Login => validate_login(fields),
        FormKind::Appointment => validate_appointment(fields, today),
        FormKind::Profile => validate_profile(fields),
    }
}

pub fn validate_registration(fields: &impl FormFields) -> Result<(), Rejection> {
    let username = fields.trimmed("username");
    let email = fields.trimmed("email");
    let password = fields.raw("password");
    let confirm_password = fields.raw("confirm_password");
    let full_name = fields.trimmed("full_name");

    if [&username, &email, &password, &confirm_password, &full_name]
        .iter()
        .any(|value| value.is_empty())
    {
        return Err(Rejection::MissingRegistrationFields);
    }
    if !is_valid_username(&username) {
        return Err(Rejection::InvalidUsername);
    }
    if !is_valid_email(&email) {
        return Err(Rejection::InvalidEmail);
    }
    if utf16_len(&password) < MIN_PASSWORD_LEN {
        return Err(Rejection::PasswordTooShort);
    }
    if !has_password_strength(&password) {
        return Err(Rejection::WeakPassword);
    }
    if password != confirm_password {
        return Err(Rejection::PasswordMismatch);
    }

    if fields.raw("user_type") == DOCTOR_USER_TYPE {
        let specialization = fields.trimmed("specialization");
        let qualification = fields.trimmed("qualification");
        let fee = fields.trimmed("consultation_fee");
        if specialization.is_empty() || qualification.is_empty() || fee.is_empty() {
            return Err(Rejection::MissingDoctorFields);
        }
        // A fee with no numeric prefix is not a positive amount either.
        if !parse_float_prefix(&fee).is_some_and(|amount| amount > 0.0) {
            return Err(Rejection::NonPositiveFee);
        }
    }

    Ok(())
}

pub fn validate_login(fields: &impl FormFields) -> Result<(), Rejection> {
    let username = fields.trimmed("username");
    let password = fields.raw("password");

    if username.is_empty() || password.is_empty() {
        return Err(Rejection::MissingCredentials);
    }
    if utf16_len(&username) < MIN_LOGIN_USERNAME_LEN {
        return Err(Rejection::LoginUsernameTooShort);
    }
    if utf16_len(&password) < MIN_PASSWORD_LEN {
        return Err(Rejection::LoginPasswordTooShort);
    }
    Ok(())
}

pub fn validate_appointment(fields: &impl FormFields, today: NaiveDate) -> Result<(), Rejection> {
    let date = fields.trimmed("appointment_date");
    let time = fields.trimmed("appointment_time");
    let reason = fields.trimmed("reason");

    if date.is_empty() || time.is_empty() || reason.is_empty() {
        return Err(Rejection::MissingAppointmentFields);
    }
    match parse_form_date(&date) {
        Some(selected) if is_on_or_after(selected, today) => {}
        _ => return Err(Rejection::PastAppointmentDate),
    }
    if utf16_len(&reason) < MIN_REASON_LEN {
        return Err(Rejection::ReasonTooShort);
    }
    Ok(())
}

pub fn validate_profile(fields: &impl FormFields) -> Result<(), Rejection> {
    let full_name = fields.trimmed("full_name");
    let email = fields.trimmed("email");
    let phone = fields.trimmed("phone");

    if full_name.is_empty() || email.is_empty() {
        return Err(Rejection::MissingProfileFields);
    }
    if !is_valid_email(&email) {
        return Err(Rejection::InvalidEmail);
    }
    if !phone.is_empty() && utf16_len(&phone) < MIN_PHONE_LEN {
        return Err(Rejection::InvalidPhone);
    }
    Ok(())
}
