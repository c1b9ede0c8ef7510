//! Error taxonomy for the booking flow.
//!
//! None of these errors end a session: the controller leaves its state
//! untouched (or parks on a safe screen) and the presentation layer shows
//! the message as a notice.

use crate::models::{Action, Screen};
use thiserror::Error;

/// A required field is missing or a value cannot be accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid gestational week: '{0}'. Must be a number between 1 and 40")]
    InvalidWeek(String),

    #[error(
        "Invalid appointment type: '{0}'. Must be one of: Control regular, Alto riesgo, Ecografía"
    )]
    InvalidType(String),

    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// The availability query failed or produced nothing to choose from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Availability service unavailable: {0}")]
    Unavailable(String),

    #[error("No availability found for the selected week and appointment type")]
    NoAvailability,
}

impl ProviderError {
    /// Every provider failure can be retried by searching again.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{integration} unavailable: {reason}")]
    IntegrationUnavailable {
        integration: &'static str,
        reason: String,
    },

    #[error("'{}' is not available on the {} screen", .action.name(), .screen.name())]
    InvalidTransition { screen: Screen, action: Action },

    #[error("Slot {0} is not part of the current availability results")]
    UnknownSlot(u32),

    #[error("An availability search is already in progress")]
    QueryInFlight,

    #[error("No availability search is pending")]
    NoPendingQuery,
}

impl BookingError {
    /// Whether repeating the same operation may succeed without other changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Provider(e) => e.is_retryable(),
            BookingError::IntegrationUnavailable { .. } => true,
            _ => false,
        }
    }
}
