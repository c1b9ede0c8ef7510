//! Prenatal appointment booking flow.
//!
//! The [`controller::BookingFlowController`] owns one booking session and
//! moves it through the home, form, availability, confirmation and
//! appointment-list screens. Availability lookups, calendar export and map
//! hand-off sit behind traits so front ends can plug in real services.

pub mod availability;
pub mod config;
pub mod controller;
pub mod error;
pub mod integrations;
pub mod models;
pub mod render;

pub use availability::{AvailabilityProvider, StaticAvailability};
pub use config::AppConfig;
pub use controller::{BookingFlowController, Notice, NoticeKind};
pub use error::{BookingError, ProviderError, ValidationError};
pub use models::{
    Action, Appointment, AppointmentDraft, AppointmentType, AvailabilitySlot, GestationalWeek,
    Screen,
};
