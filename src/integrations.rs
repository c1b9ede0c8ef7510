//! Hand-offs to outside apps offered once an appointment is confirmed.
//!
//! Neither integration is wired to a real service yet. The stubs only log
//! the request, or report that the target app cannot be reached.

use crate::models::Appointment;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct IntegrationError(pub String);

pub trait CalendarExporter {
    fn export_to_calendar(&self, appointment: &Appointment) -> Result<(), IntegrationError>;
}

pub trait MapOpener {
    fn open_map(&self, appointment: &Appointment) -> Result<(), IntegrationError>;
}

/// Accepts every hand-off and does nothing beyond logging it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertIntegration;

impl CalendarExporter for InertIntegration {
    fn export_to_calendar(&self, appointment: &Appointment) -> Result<(), IntegrationError> {
        info!(
            appointment_id = %appointment.id,
            when = %appointment.when(),
            "calendar export requested"
        );
        Ok(())
    }
}

impl MapOpener for InertIntegration {
    fn open_map(&self, appointment: &Appointment) -> Result<(), IntegrationError> {
        info!(
            appointment_id = %appointment.id,
            center = %appointment.center,
            "map requested"
        );
        Ok(())
    }
}

/// Reports the target app as unreachable on every call.
#[derive(Debug, Clone, Default)]
pub struct UnavailableIntegration {
    pub reason: String,
}

impl UnavailableIntegration {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableIntegration {
            reason: reason.into(),
        }
    }
}

impl CalendarExporter for UnavailableIntegration {
    fn export_to_calendar(&self, _appointment: &Appointment) -> Result<(), IntegrationError> {
        Err(IntegrationError(self.reason.clone()))
    }
}

impl MapOpener for UnavailableIntegration {
    fn open_map(&self, _appointment: &Appointment) -> Result<(), IntegrationError> {
        Err(IntegrationError(self.reason.clone()))
    }
}
