// Declarative form validation: every submitted field is checked, the first
// failing rule per field is the one reported. Dropdown-backed fields are
// validated against a choice set fetched at request time, never a static
// list.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;

/// Field name -> error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// An allowed value for a dropdown-backed field, fetched from the store at
/// request time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Presence check. Returns true when the field holds a non-blank value so
/// callers can skip dependent rules on empty input.
pub fn required(field: &str, value: &str, errors: &mut FormErrors) -> bool {
    if value.trim().is_empty() {
        if !errors.has(field) {
            errors.add(field, "This field is required.");
        }
        return false;
    }
    true
}

pub fn email_format(field: &str, value: &str, errors: &mut FormErrors) {
    if errors.has(field) || value.trim().is_empty() {
        return;
    }
    // Same looseness the page layer applies: local@domain.tld, no spaces.
    let pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern");
    if !pattern.is_match(value.trim()) {
        errors.add(field, "Invalid email address.");
    }
}

pub fn length_between(field: &str, value: &str, min: usize, max: usize, errors: &mut FormErrors) {
    if errors.has(field) || value.trim().is_empty() {
        return;
    }
    let len = value.trim().chars().count();
    if len < min || len > max {
        errors.add(
            field,
            format!("Field must be between {} and {} characters long.", min, max),
        );
    }
}

pub fn min_length(field: &str, value: &str, min: usize, message: &str, errors: &mut FormErrors) {
    if errors.has(field) || value.is_empty() {
        return;
    }
    if value.chars().count() < min {
        errors.add(field, message);
    }
}

/// Cross-field equality (password confirmation).
pub fn equals(field: &str, value: &str, other: &str, message: &str, errors: &mut FormErrors) {
    if errors.has(field) {
        return;
    }
    if value != other {
        errors.add(field, message);
    }
}

/// Membership in a static enumeration (status, role, department, ...).
pub fn one_of(field: &str, value: &str, allowed: &[&str], errors: &mut FormErrors) {
    if errors.has(field) || value.is_empty() {
        return;
    }
    if !allowed.contains(&value) {
        errors.add(field, "Not a valid choice.");
    }
}

/// Membership in a freshly fetched choice set (doctor/patient dropdowns).
pub fn member_of(field: &str, value: &str, choices: &[Choice], errors: &mut FormErrors) {
    if errors.has(field) || value.is_empty() {
        return;
    }
    if !choices.iter().any(|c| c.id == value) {
        errors.add(field, "Not a valid choice.");
    }
}

/// Canonical date input, `%Y-%m-%d`.
pub fn parse_date(field: &str, value: &str, errors: &mut FormErrors) -> Option<NaiveDate> {
    if errors.has(field) || value.trim().is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Not a valid date value.");
            None
        }
    }
}

/// Time input. The store hands back either `HH:MM:SS` or `HH:MM`
/// depending on the column state, so reads accept both.
pub fn parse_time(field: &str, value: &str, errors: &mut FormErrors) -> Option<NaiveTime> {
    if errors.has(field) || value.trim().is_empty() {
        return None;
    }
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_or_else(
            |_| {
                errors.add(field, "Not a valid time value.");
                None
            },
            Some,
        )
}

/// Currency amount: parsed as a decimal, bounded below, stored to 2 places.
pub fn parse_amount(field: &str, value: &str, min: f64, errors: &mut FormErrors) -> Option<f64> {
    if errors.has(field) || value.trim().is_empty() {
        return None;
    }
    match value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => {
            let rounded = (amount * 100.0).round() / 100.0;
            if rounded < min {
                errors.add(field, format!("Number must be at least {}.", min));
                None
            } else {
                Some(rounded)
            }
        }
        _ => {
            errors.add(field, "Not a valid decimal value.");
            None
        }
    }
}

/// Attachment extension allow-list.
pub fn allowed_extension(
    field: &str,
    filename: &str,
    allowed: &[&str],
    message: &str,
    errors: &mut FormErrors,
) {
    if errors.has(field) || filename.is_empty() {
        return;
    }
    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if filename.contains('.') && allowed.contains(&ext.as_str()) {
        return;
    }
    errors.add(field, message);
}

/// Normalize an optional free-text field: trimmed, empty collapsed to None.
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_reports_blank_fields() {
        let mut errors = FormErrors::new();
        assert!(!required("name", "   ", &mut errors));
        assert!(errors.has("name"));
        assert!(required("phone", "555-0100", &mut errors));
        assert!(!errors.has("phone"));
    }

    #[test]
    fn first_failing_rule_wins() {
        let mut errors = FormErrors::new();
        required("email", "", &mut errors);
        email_format("email", "", &mut errors);
        assert_eq!(errors.field("email").unwrap().len(), 1);
        assert_eq!(errors.field("email").unwrap()[0], "This field is required.");
    }

    #[test]
    fn email_format_accepts_and_rejects() {
        let mut errors = FormErrors::new();
        email_format("email", "staff@hospital.example", &mut errors);
        assert!(errors.is_empty());
        email_format("email", "not-an-email", &mut errors);
        assert!(errors.has("email"));
    }

    #[test]
    fn time_accepts_both_stored_formats() {
        let mut errors = FormErrors::new();
        let short = parse_time("time", "14:30", &mut errors).unwrap();
        let long = parse_time("time", "14:30:00", &mut errors).unwrap();
        assert_eq!(short, long);
        assert!(errors.is_empty());

        assert!(parse_time("time", "25:99", &mut errors).is_none());
        assert!(errors.has("time"));
    }

    #[test]
    fn amount_bounds_and_rounding() {
        let mut errors = FormErrors::new();
        assert!(parse_amount("amount", "0", 0.01, &mut errors).is_none());
        assert!(errors.has("amount"));

        let mut errors = FormErrors::new();
        assert!(parse_amount("amount", "-5", 0.01, &mut errors).is_none());
        assert!(errors.has("amount"));

        let mut errors = FormErrors::new();
        assert_eq!(parse_amount("amount", "0.01", 0.01, &mut errors), Some(0.01));
        assert_eq!(
            parse_amount("amount", "19.999", 0.01, &mut errors),
            Some(20.0)
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn cross_field_equality() {
        let mut errors = FormErrors::new();
        equals(
            "confirm_password",
            "hunter22",
            "hunter2",
            "Passwords must match",
            &mut errors,
        );
        assert!(errors.has("confirm_password"));
    }

    #[test]
    fn member_of_checks_fetched_choices() {
        let choices = vec![
            Choice::new("d1", "Dr. Adams"),
            Choice::new("d2", "Dr. Baker"),
        ];
        let mut errors = FormErrors::new();
        member_of("doctor_id", "d2", &choices, &mut errors);
        assert!(errors.is_empty());
        member_of("doctor_id", "d9", &choices, &mut errors);
        assert!(errors.has("doctor_id"));
    }

    #[test]
    fn extension_allow_list() {
        let allowed = ["jpg", "png", "pdf", "doc", "docx"];
        let mut errors = FormErrors::new();
        allowed_extension("attachments", "scan.PDF", &allowed, "Images and documents only!", &mut errors);
        assert!(errors.is_empty());
        allowed_extension("attachments", "payload.exe", &allowed, "Images and documents only!", &mut errors);
        assert!(errors.has("attachments"));
    }

    #[test]
    fn optional_text_collapses_blank() {
        assert_eq!(optional_text("  "), None);
        assert_eq!(optional_text(" note "), Some("note".to_string()));
    }
}
