//! Input validation for the registration and login payloads
//!
//! Validators return `Result<Input, ValidationErrors>` instead of raising; the
//! handler decides how to respond. Each field reports only its first failing
//! rule, checked in declaration order. Lengths are counted in UTF-16 code
//! units, so a character outside the BMP counts as two.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

const REQUIRED: &str = "Required";
const EXPECTED_STRING: &str = "Expected string";
const INVALID_EMAIL: &str = "Invalid email address";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(
        r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$"
    )
    .unwrap();
}

/// Field name -> message, one entry per failing field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Record a failure unless the field already has one
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Validated registration payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated login payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Validate a registration body
pub fn validate_register(body: &Map<String, Value>) -> Result<RegisterInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = string_field(body, "username", &mut errors)
        .and_then(|v| min_length(v, MIN_USERNAME_LENGTH, "username", "Username", &mut errors));
    let email = string_field(body, "email", &mut errors).and_then(|v| email_field(v, &mut errors));
    let password = string_field(body, "password", &mut errors)
        .and_then(|v| min_length(v, MIN_PASSWORD_LENGTH, "password", "Password", &mut errors));

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validate a login body
pub fn validate_login(body: &Map<String, Value>) -> Result<LoginInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = string_field(body, "email", &mut errors).and_then(|v| email_field(v, &mut errors));
    let password = string_field(body, "password", &mut errors)
        .and_then(|v| min_length(v, MIN_PASSWORD_LENGTH, "password", "Password", &mut errors));

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Standard address syntax: dot-atom local part, dotted domain, alphabetic TLD
pub fn is_valid_email(email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

fn string_field<'a>(
    body: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match body.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::String(value)) => Some(value.as_str()),
        Some(_) => {
            errors.add(field, EXPECTED_STRING);
            None
        }
    }
}

fn min_length<'a>(
    value: &'a str,
    min: usize,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    if value.encode_utf16().count() < min {
        errors.add(field, format!("{} must be at least {} characters", label, min));
        return None;
    }
    Some(value)
}

fn email_field<'a>(value: &'a str, errors: &mut ValidationErrors) -> Option<&'a str> {
    if !is_valid_email(value) {
        errors.add("email", INVALID_EMAIL);
        return None;
    }
    Some(value)
}
