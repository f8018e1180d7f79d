use std::{fmt::Display, time::Duration};

/// Why a retrieved forecast was rejected. Field names are qualified, e.g. `hourly.humidity`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("forecast payload is null or not an object")]
    NullPayload,

    #[error("required field `{0}` is missing")]
    MissingField(String),

    #[error("field `{0}` is not an object")]
    NotObject(String),

    #[error("field `{0}` is not a sequence")]
    NotSequence(String),

    #[error("field `{0}` is empty")]
    EmptyField(String),

    #[error("field `{field}` has an invalid element at index {index}")]
    InvalidElement { field: String, index: usize },
}

impl ValidationError {
    /// The offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NullPayload => None,
            ValidationError::MissingField(f)
            | ValidationError::NotObject(f)
            | ValidationError::NotSequence(f)
            | ValidationError::EmptyField(f)
            | ValidationError::InvalidElement { field: f, .. } => Some(f),
        }
    }
}

/// Failure of any acquisition stage. The orchestrator turns every variant into a
/// degraded session; none of them reaches the presentation layer as a fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("no match found for '{0}'")]
    NotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("forecast validation failed: {0}")]
    Validation(#[from] ValidationError),
}

const EMPTY_QUERY: &str = "Please enter a location to search for. Showing sample data.";
const UNREACHABLE: &str = "Weather service is unreachable right now. Showing sample data.";
const INCOMPLETE: &str = "Weather service returned incomplete data. Showing sample data.";

impl LookupError {
    pub fn upstream(context: &str, err: impl Display) -> Self {
        LookupError::Upstream(format!("{context}: {err}"))
    }

    pub fn timed_out(what: &str, after: Duration) -> Self {
        let secs = after.as_secs_f32();
        LookupError::Upstream(format!("{what} timed out after {secs}s"))
    }

    /// Message suitable for the session's `error_message`.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::NotFound(query) if query.trim().is_empty() => EMPTY_QUERY.to_string(),
            LookupError::NotFound(query) => {
                format!("Location \"{query}\" not found. Showing sample data.")
            }
            LookupError::Upstream(_) => UNREACHABLE.to_string(),
            LookupError::Validation(_) => INCOMPLETE.to_string(),
        }
    }
}

/// Geolocation source failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_reports_field() {
        let err = ValidationError::MissingField("hourly.humidity".into());
        assert_eq!(err.field(), Some("hourly.humidity"));
        assert!(err.to_string().contains("hourly.humidity"));
        assert_eq!(ValidationError::NullPayload.field(), None);
    }

    #[test]
    fn user_messages_are_never_empty() {
        let errors = [
            LookupError::NotFound("Zzyzx123".into()),
            LookupError::NotFound("  ".into()),
            LookupError::Upstream("boom".into()),
            LookupError::Validation(ValidationError::NullPayload),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn not_found_message_names_query() {
        let msg = LookupError::NotFound("Zzyzx123".into()).user_message();
        assert!(msg.contains("Zzyzx123"));
    }

    #[test]
    fn timed_out_is_upstream() {
        let err = LookupError::timed_out("Geocoding", Duration::from_secs(10));
        assert!(matches!(err, LookupError::Upstream(ref m) if m.contains("timed out")));
    }
}
