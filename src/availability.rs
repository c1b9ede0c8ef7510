//! Availability lookup for the booking flow.
//!
//! This module provides the AvailabilityProvider seam the controller queries
//! when the user searches for slots, and StaticAvailability, the fixed demo
//! set served while there is no real scheduling backend.

use crate::error::ProviderError;
use crate::models::{AppointmentType, AvailabilitySlot, GestationalWeek};
use tracing::debug;

/// Health facilities offered as suggestions on the schedule form.
pub const CENTERS: &[&str] = &[
    "Hospital Rebagliati",
    "Hospital Almenara",
    "Centro de Salud Milagros",
    "R Castilla",
    "Grau",
];

pub const DOCTORS: &[&str] = &["Garay, P.", "Mendoza, L.", "Sánchez, R."];

/// Source of candidate slots for a (week, type) query.
///
/// Each call is a fresh query. Implementations should return
/// `ProviderError::Unavailable` when the backing service cannot answer; an
/// empty vector is treated by the controller as "nothing to book".
pub trait AvailabilityProvider {
    fn fetch_availability(
        &self,
        week: Option<GestationalWeek>,
        appointment_type: AppointmentType,
    ) -> Result<Vec<AvailabilitySlot>, ProviderError>;
}

impl<F> AvailabilityProvider for F
where
    F: Fn(Option<GestationalWeek>, AppointmentType) -> Result<Vec<AvailabilitySlot>, ProviderError>,
{
    fn fetch_availability(
        &self,
        week: Option<GestationalWeek>,
        appointment_type: AppointmentType,
    ) -> Result<Vec<AvailabilitySlot>, ProviderError> {
        self(week, appointment_type)
    }
}

/// Serves the same slot list for every query.
#[derive(Debug, Clone)]
pub struct StaticAvailability {
    slots: Vec<AvailabilitySlot>,
}

impl StaticAvailability {
    pub fn new(slots: Vec<AvailabilitySlot>) -> Self {
        StaticAvailability { slots }
    }

    /// The two demo slots shown by the availability screen.
    pub fn demo() -> Self {
        StaticAvailability::new(vec![
            AvailabilitySlot::new(1, "25 de Enero", "16:00 PM", "Garay, P.", "Hospital Rebagliati"),
            AvailabilitySlot::new(2, "26 de Enero", "09:00 AM", "Mendoza, L.", "Hospital Almenara"),
        ])
    }

    pub fn slots(&self) -> &[AvailabilitySlot] {
        &self.slots
    }
}

impl Default for StaticAvailability {
    fn default() -> Self {
        StaticAvailability::demo()
    }
}

impl AvailabilityProvider for StaticAvailability {
    fn fetch_availability(
        &self,
        week: Option<GestationalWeek>,
        appointment_type: AppointmentType,
    ) -> Result<Vec<AvailabilitySlot>, ProviderError> {
        debug!(
            week = ?week.map(|w| w.get()),
            appointment_type = %appointment_type,
            slots = self.slots.len(),
            "serving static availability"
        );
        Ok(self.slots.clone())
    }
}

/// Find a slot by id within one result set.
pub fn find_slot(slots: &[AvailabilitySlot], slot_id: u32) -> Option<&AvailabilitySlot> {
    slots.iter().find(|slot| slot.id == slot_id)
}

/// Centers whose name contains the query, ignoring case.
///
/// An empty query returns the whole catalogue.
pub fn suggest_centers(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    CENTERS
        .iter()
        .copied()
        .filter(|center| center.to_lowercase().contains(&needle))
        .collect()
}
