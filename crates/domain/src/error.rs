//! Unified error type for the calendar core
//!
//! Only hard failures live here. Soft data inconsistencies (an intercalary
//! entry naming an unknown month, a stale intercalary name on a date) are
//! normalized where they are found and never surface as errors.

use thiserror::Error;

/// Error type for calendar construction and date validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The calendar definition breaks a structural invariant
    #[error("Calendar '{calendar}' is invalid: {reason}")]
    Validation { calendar: String, reason: String },

    /// Invalid calendar identifier
    #[error("Invalid calendar ID: {0}")]
    InvalidId(String),

    /// A date does not exist in the calendar
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Requested variant is not defined on the calendar
    #[error("Calendar '{calendar}' has no variant '{variant}'")]
    UnknownVariant { calendar: String, variant: String },
}

impl CalendarError {
    /// Creates a validation error for a definition that cannot be activated.
    ///
    /// # Example
    /// ```ignore
    /// if def.weekdays().is_empty() {
    ///     return Err(CalendarError::validation(def.id(), "at least one weekday is required"));
    /// }
    /// ```
    pub fn validation(calendar: impl ToString, reason: impl Into<String>) -> Self {
        Self::Validation {
            calendar: calendar.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create an invalid date error
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }

    /// Create an unknown variant error
    pub fn unknown_variant(calendar: impl ToString, variant: impl Into<String>) -> Self {
        Self::UnknownVariant {
            calendar: calendar.to_string(),
            variant: variant.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = CalendarError::validation("harptos", "at least one month is required");
        assert!(matches!(err, CalendarError::Validation { .. }));
        assert_eq!(
            err.to_string(),
            "Calendar 'harptos' is invalid: at least one month is required"
        );
    }

    #[test]
    fn test_invalid_date_error() {
        let err = CalendarError::invalid_date("day 31 is out of range for month 2");
        assert!(matches!(err, CalendarError::InvalidDate(_)));
        assert!(err.to_string().contains("day 31"));
    }

    #[test]
    fn test_unknown_variant_error() {
        let err = CalendarError::unknown_variant("gregorian", "imperial");
        assert_eq!(
            err.to_string(),
            "Calendar 'gregorian' has no variant 'imperial'"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<CalendarError>();
    }
}
