use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use crate::models::ContactForm;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .expect("email pattern compiles");
    static ref USERNAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,37}[A-Za-z0-9])?$")
            .expect("username pattern compiles");
}

// One failed field in a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Parses and validates a raw contact body, reporting every failing field.
pub fn validate_contact(body: &[u8]) -> Result<ContactForm, Vec<FieldError>> {
    let submission = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => return Err(vec![FieldError::new("body", "Request body must be a JSON object")]),
    };

    let mut errors = Vec::new();

    let name = text_field(&mut errors, "name", submission.get("name")).and_then(|name| {
        length_check(&mut errors, "name", name, 2, 50, "Name must be at least 2 characters")
    });
    let email = text_field(&mut errors, "email", submission.get("email")).and_then(|email| {
        if is_valid_email(email) {
            Some(email)
        } else {
            errors.push(FieldError::new("email", "Invalid email address"));
            None
        }
    });
    let subject = text_field(&mut errors, "subject", submission.get("subject")).and_then(|subject| {
        length_check(&mut errors, "subject", subject, 3, 100, "Subject must be at least 3 characters")
    });
    let message = text_field(&mut errors, "message", submission.get("message")).and_then(|message| {
        length_check(&mut errors, "message", message, 10, 1000, "Message must be at least 10 characters")
    });

    match (name, email, subject, message) {
        (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => Ok(ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Same rule as the front-end's form schema. The pattern can't express "no
/// leading dot" or "no consecutive dots", so those are checked separately.
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

/// GitHub logins: alphanumeric or single hyphens, max 39 chars, no leading or
/// trailing hyphen.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username) && !username.contains("--")
}

fn text_field<'a>(errors: &mut Vec<FieldError>, field: &str, value: Option<&'a Value>) -> Option<&'a str> {
    match value {
        None => {
            errors.push(FieldError::new(field, "Required"));
            None
        }
        Some(Value::String(text)) => Some(text.as_str()),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("Expected string, received {}", json_type(other)),
            ));
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn length_check<'a>(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &'a str,
    min: usize,
    max: usize,
    too_short: &str,
) -> Option<&'a str> {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, too_short));
        return None;
    }
    if len > max {
        errors.push(FieldError::new(
            field,
            format!("String must contain at most {} character(s)", max),
        ));
        return None;
    }
    Some(value)
}
