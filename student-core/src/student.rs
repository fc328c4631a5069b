//! Student - The record type and its validation rules
//!
//! TigerStyle: Explicit types, validation at the boundary.
//!
//! Inbound payloads arrive as [`StudentRequest`] / [`UpdateStudentRequest`]
//! with every field optional, so a missing field is reported as a field error
//! instead of a decode error. [`StudentRequest::validate`] turns a request into
//! a [`NewStudent`], the only shape the storage contract accepts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    STUDENT_AGE_MAX, STUDENT_AGE_MIN, STUDENT_EMAIL_BYTES_MAX, STUDENT_NAME_BYTES_MAX,
};

/// Email shape: `local@domain.tld`, no whitespace, exactly one `@`.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

// =============================================================================
// Student
// =============================================================================

/// A stored student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Backend-assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Age in years
    pub age: i32,
}

/// The mutable fields of a student, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Age in years
    pub age: i32,
}

impl NewStudent {
    /// Create fields without running validation.
    ///
    /// Storage accepts whatever it is given; use [`StudentRequest::validate`]
    /// for untrusted input.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Attach an id, producing the stored shape.
    #[must_use]
    pub fn with_id(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Create payload: `{"name": .., "email": .., "age": ..}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentRequest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Age in years; wide so out-of-range numbers reach validation
    #[serde(default)]
    pub age: Option<i64>,
}

impl StudentRequest {
    /// Check every field and collect all failures.
    ///
    /// # Errors
    /// Returns [`ValidationErrors`] listing each failing field.
    pub fn validate(self) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let fields = self.check(&mut errors);
        match fields {
            Some(fields) if errors.is_empty() => Ok(fields),
            _ => Err(errors),
        }
    }

    fn check(self, errors: &mut ValidationErrors) -> Option<NewStudent> {
        let name = match self.name.as_deref().map(str::trim) {
            None => {
                errors.push("name", "name is required");
                None
            }
            Some("") => {
                errors.push("name", "name must not be empty");
                None
            }
            Some(name) if name.len() > STUDENT_NAME_BYTES_MAX => {
                errors.push(
                    "name",
                    format!("name must be at most {STUDENT_NAME_BYTES_MAX} bytes"),
                );
                None
            }
            Some(name) => Some(name.to_string()),
        };

        let email = match self.email.as_deref().map(str::trim) {
            None => {
                errors.push("email", "email is required");
                None
            }
            Some(email) if email.len() > STUDENT_EMAIL_BYTES_MAX => {
                errors.push(
                    "email",
                    format!("email must be at most {STUDENT_EMAIL_BYTES_MAX} bytes"),
                );
                None
            }
            Some(email) if !EMAIL_PATTERN.is_match(email) => {
                errors.push("email", "email must be a valid email address");
                None
            }
            Some(email) => Some(email.to_string()),
        };

        let age = match self.age {
            None => {
                errors.push("age", "age is required");
                None
            }
            Some(age) if !(STUDENT_AGE_MIN..=STUDENT_AGE_MAX).contains(&age) => {
                errors.push(
                    "age",
                    format!("age must be between {STUDENT_AGE_MIN} and {STUDENT_AGE_MAX}"),
                );
                None
            }
            // In range, so it fits.
            Some(age) => i32::try_from(age).ok(),
        };

        Some(NewStudent {
            name: name?,
            email: email?,
            age: age?,
        })
    }
}

/// Update payload: the create payload plus the target `id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentRequest {
    /// Row to overwrite
    #[serde(default)]
    pub id: Option<i64>,
    /// Replacement field values
    #[serde(flatten)]
    pub fields: StudentRequest,
}

impl UpdateStudentRequest {
    /// Check the id and every field, collecting all failures.
    ///
    /// # Errors
    /// Returns [`ValidationErrors`] listing each failing field.
    pub fn validate(self) -> Result<(i64, NewStudent), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let id = match self.id {
            None => {
                errors.push("id", "id is required");
                None
            }
            Some(id) if id < 1 => {
                errors.push("id", "id must be a positive integer");
                None
            }
            Some(id) => Some(id),
        };
        let fields = self.fields.check(&mut errors);

        match (id, fields) {
            (Some(id), Some(fields)) if errors.is_empty() => Ok((id, fields)),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON field name
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

/// Every field failure found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join_messages(.fields))]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// No failures recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Failures in field order.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }

    /// Consume into the failure list.
    #[must_use]
    pub fn into_fields(self) -> Vec<FieldError> {
        self.fields
    }
}

fn join_messages(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, age: i64) -> StudentRequest {
        StudentRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            age: Some(age),
        }
    }

    #[test]
    fn test_valid_request() {
        let fields = request("Ann", "ann@x.com", 21).validate().unwrap();
        assert_eq!(fields, NewStudent::new("Ann", "ann@x.com", 21));
    }

    #[test]
    fn test_trims_name_and_email() {
        let fields = request("  Ann  ", " ann@x.com ", 21).validate().unwrap();
        assert_eq!(fields.name, "Ann");
        assert_eq!(fields.email, "ann@x.com");
    }

    #[test]
    fn test_empty_name_rejected() {
        let errors = request("   ", "ann@x.com", 21).validate().unwrap_err();
        assert!(errors.has_field("name"));
        assert_eq!(errors.fields().len(), 1);
    }

    #[test]
    fn test_malformed_email_rejected() {
        for email in ["ann", "ann@", "@x.com", "ann@x", "ann x@x.com", "a@@x.com"] {
            let errors = request("Ann", email, 21).validate().unwrap_err();
            assert!(errors.has_field("email"), "{email} should be rejected");
        }
    }

    #[test]
    fn test_age_bounds() {
        for age in [-5, 0, STUDENT_AGE_MAX + 1, i64::MAX] {
            let errors = request("Ann", "ann@x.com", age).validate().unwrap_err();
            assert!(errors.has_field("age"), "{age} should be rejected");
        }
        assert!(request("Ann", "ann@x.com", STUDENT_AGE_MIN).validate().is_ok());
        assert!(request("Ann", "ann@x.com", STUDENT_AGE_MAX).validate().is_ok());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = StudentRequest::default().validate().unwrap_err();
        let names: Vec<_> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "age"]);
        assert!(errors.to_string().starts_with("validation failed: name is required"));
    }

    #[test]
    fn test_name_too_long() {
        let long_name = "x".repeat(STUDENT_NAME_BYTES_MAX + 1);
        let errors = request(&long_name, "ann@x.com", 21).validate().unwrap_err();
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_update_request_from_json() {
        let json = r#"{"id": 3, "name": "Ann B", "email": "ann@x.com", "age": 22}"#;
        let request: UpdateStudentRequest = serde_json::from_str(json).unwrap();
        let (id, fields) = request.validate().unwrap();
        assert_eq!(id, 3);
        assert_eq!(fields, NewStudent::new("Ann B", "ann@x.com", 22));
    }

    #[test]
    fn test_update_request_requires_id() {
        let json = r#"{"name": "Ann", "email": "ann@x.com", "age": 22}"#;
        let request: UpdateStudentRequest = serde_json::from_str(json).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.has_field("id"));
        assert_eq!(errors.fields().len(), 1);
    }

    #[test]
    fn test_update_request_collects_id_and_field_errors() {
        let json = r#"{"id": 0, "name": "", "email": "ann@x.com", "age": 22}"#;
        let request: UpdateStudentRequest = serde_json::from_str(json).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.has_field("id"));
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_student_json_shape() {
        let student = NewStudent::new("Ann", "ann@x.com", 21).with_id(1);
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "Ann", "email": "ann@x.com", "age": 21})
        );
    }
}
