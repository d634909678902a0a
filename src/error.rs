//! Error types for the geofence user service
//!
//! Store and codec failures share one enum so the HTTP layer can map them to
//! status codes in a single place. Configuration errors are separate because
//! they only occur at startup and are always fatal.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GeofenceError>;

/// Main error type for user and fence operations
#[derive(Error, Debug)]
pub enum GeofenceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid geometry format '{text}': {reason}")]
    Format { text: String, reason: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl GeofenceError {
    pub fn format(text: impl Into<String>, reason: impl Into<String>) -> Self {
        GeofenceError::Format {
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        GeofenceError::Persistence {
            message: message.into(),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for GeofenceError {
    fn from(error: sqlx::Error) -> Self {
        GeofenceError::Persistence {
            message: error.to_string(),
        }
    }
}

/// A single failed validation rule on an inbound field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub rule: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field '{}' failed on the '{}' tag", self.field, self.rule)
    }
}

/// Inbound request validation failure, listing every offending field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, rule: &'static str) -> Self {
        let mut error = Self::new();
        error.push(field, rule);
        error
    }

    pub fn push(&mut self, field: impl Into<String>, rule: &'static str) {
        self.fields.push(FieldError {
            field: field.into(),
            rule,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the fields that failed, in the order they were checked
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }

    /// Ok when nothing was recorded, otherwise the collected error
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.fields.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Startup configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
