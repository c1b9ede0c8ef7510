// tests/booking_flow.rs
//
// End-to-end booking sessions driven through the public controller API.

use assert_matches::assert_matches;
use std::cell::Cell;
use std::collections::HashSet;

use vida_materna::integrations::{CalendarExporter, IntegrationError, MapOpener};
use vida_materna::{
    Action, Appointment, AppointmentType, AvailabilityProvider, AvailabilitySlot, BookingError,
    BookingFlowController, GestationalWeek, ProviderError, Screen, StaticAvailability,
    ValidationError,
};

// ==============================================================================
// TEST FIXTURES
// ==============================================================================

/// Counts queries and remembers the last (week, type) it was asked for.
#[derive(Default)]
struct RecordingProvider {
    calls: Cell<usize>,
    last_query: Cell<Option<(Option<GestationalWeek>, AppointmentType)>>,
}

impl AvailabilityProvider for RecordingProvider {
    fn fetch_availability(
        &self,
        week: Option<GestationalWeek>,
        appointment_type: AppointmentType,
    ) -> Result<Vec<AvailabilitySlot>, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        self.last_query.set(Some((week, appointment_type)));
        Ok(StaticAvailability::demo().slots().to_vec())
    }
}

/// Fails the first `failures` queries, then serves the demo set.
struct FlakyProvider {
    failures: Cell<usize>,
}

impl AvailabilityProvider for FlakyProvider {
    fn fetch_availability(
        &self,
        _week: Option<GestationalWeek>,
        _appointment_type: AppointmentType,
    ) -> Result<Vec<AvailabilitySlot>, ProviderError> {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(ProviderError::Unavailable("connection reset".to_string()));
        }
        Ok(StaticAvailability::demo().slots().to_vec())
    }
}

#[derive(Default)]
struct RecordingIntegration {
    exported: Cell<usize>,
    mapped: Cell<usize>,
}

impl CalendarExporter for RecordingIntegration {
    fn export_to_calendar(&self, _appointment: &Appointment) -> Result<(), IntegrationError> {
        self.exported.set(self.exported.get() + 1);
        Ok(())
    }
}

impl MapOpener for RecordingIntegration {
    fn open_map(&self, _appointment: &Appointment) -> Result<(), IntegrationError> {
        self.mapped.set(self.mapped.get() + 1);
        Ok(())
    }
}

struct NoCalendarApp;

impl CalendarExporter for NoCalendarApp {
    fn export_to_calendar(&self, _appointment: &Appointment) -> Result<(), IntegrationError> {
        Err(IntegrationError("calendar app not reachable".to_string()))
    }
}

fn book(flow: &mut BookingFlowController, week: &str, slot_id: u32) -> Appointment {
    flow.start_booking().unwrap();
    flow.set_week(week).unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.choose_slot(slot_id).unwrap();
    flow.confirm_choice().unwrap();
    let appointment = flow.confirm_appointment().unwrap();
    flow.go_home().unwrap();
    appointment
}

// ==============================================================================
// SCENARIOS
// ==============================================================================

#[test]
fn ultrasound_booking_scenario() {
    let mut flow = BookingFlowController::default();

    flow.start_booking().unwrap();
    flow.set_week("12").unwrap();
    flow.set_type(AppointmentType::Ecografia).unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    assert_eq!(flow.results().len(), 2);

    flow.choose_slot(1).unwrap();
    flow.confirm_choice().unwrap();
    assert_eq!(flow.screen(), Screen::Confirmation);
    flow.confirm_appointment().unwrap();

    assert_eq!(flow.screen(), Screen::Confirmed);
    let appointments = flow.appointments();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].appointment_type, AppointmentType::Ecografia);
    assert_eq!(appointments[0].date, "25 de Enero");
    assert_eq!(appointments[0].time, "16:00 PM");
    assert_eq!(appointments[0].doctor, "Garay, P.");
    assert_eq!(appointments[0].center, "Hospital Rebagliati");
    assert_eq!(appointments[0].week.get(), 12);
}

#[test]
fn empty_appointment_list_leads_back_into_booking() {
    let mut flow = BookingFlowController::default();
    flow.view_appointments().unwrap();

    let view = flow.view();
    assert_eq!(view.screen, Screen::MyAppointments);
    assert!(view.empty_state);
    assert!(view.appointments.is_empty());
    assert!(view.actions.contains(&Action::StartBooking));

    flow.start_booking().unwrap();
    assert_eq!(flow.screen(), Screen::ScheduleForm);
    assert!(flow.draft().is_pristine());
}

#[test]
fn search_queries_provider_with_draft_week_and_type() {
    let provider = RecordingProvider::default();
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.set_week("28").unwrap();
    flow.set_type(AppointmentType::AltoRiesgo).unwrap();

    flow.search_availability(&provider).unwrap();

    assert_eq!(provider.calls.get(), 1);
    assert_eq!(
        provider.last_query.get(),
        Some((GestationalWeek::new(28).ok(), AppointmentType::AltoRiesgo))
    );
}

#[test]
fn search_needs_no_filled_fields() {
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    assert_eq!(flow.screen(), Screen::Availability);
}

// ==============================================================================
// PROPERTIES
// ==============================================================================

#[test]
fn type_stays_within_closed_set_under_any_edit_sequence() {
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();

    let inputs = [
        "Alto riesgo",
        "Cardiología",
        "",
        "ECOGRAFIA",
        "control regular",
        "Ecografía ",
        "Alto  riesgo",
    ];
    for input in inputs {
        let _ = flow.set_type_label(input);
        let _ = flow.set_week(input);
        let _ = flow.set_center(input);
        let _ = flow.set_date(input);
        assert!(AppointmentType::ALL.contains(&flow.draft().appointment_type));
    }
    assert_eq!(flow.draft().appointment_type, AppointmentType::Ecografia);
}

#[test]
fn start_booking_always_resets_draft() {
    let mut flow = BookingFlowController::default();

    flow.start_booking().unwrap();
    flow.set_week("33").unwrap();
    flow.set_type(AppointmentType::AltoRiesgo).unwrap();
    flow.set_center("R Castilla").unwrap();
    flow.set_date("2026-02-14").unwrap();
    flow.go_back();
    flow.start_booking().unwrap();
    assert!(flow.draft().is_pristine());
    flow.go_back();

    // Via the appointment list, after a booking.
    book(&mut flow, "20", 2);
    flow.view_appointments().unwrap();
    flow.start_booking().unwrap();
    assert!(flow.draft().is_pristine());
    assert!(flow.results().is_empty());
}

#[test]
fn confirm_appointment_needs_a_fixed_slot() {
    let mut flow = BookingFlowController::default();

    assert_matches!(
        flow.confirm_appointment(),
        Err(BookingError::InvalidTransition {
            screen: Screen::Home,
            action: Action::ConfirmAppointment
        })
    );

    flow.start_booking().unwrap();
    flow.set_week("12").unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.choose_slot(2).unwrap();
    assert_matches!(
        flow.confirm_appointment(),
        Err(BookingError::InvalidTransition {
            screen: Screen::Availability,
            ..
        })
    );
    assert!(flow.appointments().is_empty());
}

#[test]
fn each_confirmation_appends_one_uniquely_identified_appointment() {
    let mut flow = BookingFlowController::default();
    let mut ids = HashSet::new();

    for round in 1..=25u32 {
        let appointment = book(&mut flow, "16", 1 + round % 2);
        assert_eq!(flow.appointments().len(), round as usize);
        assert_eq!(flow.appointments().last(), Some(&appointment));
        assert!(ids.insert(appointment.id), "duplicate id in round {round}");
    }
}

#[test]
fn appointments_keep_booking_order() {
    let mut flow = BookingFlowController::default();
    book(&mut flow, "10", 2);
    book(&mut flow, "14", 1);

    let doctors: Vec<&str> = flow
        .appointments()
        .iter()
        .map(|a| a.doctor.as_str())
        .collect();
    assert_eq!(doctors, vec!["Mendoza, L.", "Garay, P."]);
}

#[test]
fn edit_details_keeps_draft_and_drops_selection() {
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.set_week("22").unwrap();
    flow.set_type(AppointmentType::AltoRiesgo).unwrap();
    flow.set_center("Grau").unwrap();
    flow.set_date("2026-01-26").unwrap();
    let draft_before = flow.draft().clone();

    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.choose_slot(2).unwrap();
    flow.confirm_choice().unwrap();
    flow.edit_details().unwrap();

    assert_eq!(flow.screen(), Screen::ScheduleForm);
    assert_eq!(flow.draft(), &draft_before);
    assert!(flow.selected_slot().is_none());
    assert!(flow.chosen_slot().is_none());

    // The selection must be made again; without a pick the first slot is used.
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.confirm_choice().unwrap();
    assert_eq!(flow.selected_slot().map(|s| s.id), Some(1));

    // Back from the form returns home, not to the abandoned confirmation.
    flow.edit_details().unwrap();
    assert_eq!(flow.go_back(), Screen::Home);
}

// ==============================================================================
// NAVIGATION
// ==============================================================================

#[test]
fn back_walks_the_navigation_history() {
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.set_week("12").unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.choose_slot(2).unwrap();
    flow.confirm_choice().unwrap();

    assert_eq!(flow.go_back(), Screen::Availability);
    assert_eq!(flow.chosen_slot().map(|s| s.id), Some(2));
    assert_eq!(flow.go_back(), Screen::ScheduleForm);
    assert_eq!(flow.draft().week.map(|w| w.get()), Some(12));
    assert_eq!(flow.go_back(), Screen::Home);
    assert_eq!(flow.go_back(), Screen::Home);
}

#[test]
fn confirmed_booking_cannot_be_confirmed_twice() {
    let mut flow = BookingFlowController::default();
    book(&mut flow, "12", 1);
    assert_eq!(flow.screen(), Screen::Home);
    assert_eq!(flow.go_back(), Screen::Home);
    assert_matches!(
        flow.confirm_appointment(),
        Err(BookingError::InvalidTransition { .. })
    );
    assert_eq!(flow.appointments().len(), 1);
}

// ==============================================================================
// FAILURES
// ==============================================================================

#[test]
fn provider_failure_is_retryable_from_the_form() {
    let provider = FlakyProvider {
        failures: Cell::new(2),
    };
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();

    for _ in 0..2 {
        let err = flow.search_availability(&provider).unwrap_err();
        assert_matches!(err, BookingError::Provider(ProviderError::Unavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(flow.screen(), Screen::ScheduleForm);
        assert!(flow.notice().is_some_and(|n| n.retryable));
    }

    flow.search_availability(&provider).unwrap();
    assert_eq!(flow.screen(), Screen::Availability);
}

#[test]
fn missing_week_blocks_confirmation_in_strict_mode() {
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.confirm_choice().unwrap();

    assert_matches!(
        flow.confirm_appointment(),
        Err(BookingError::Validation(ValidationError::MissingField("week")))
    );

    // Fix it through the edit path and book.
    flow.edit_details().unwrap();
    flow.set_week("12").unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.confirm_choice().unwrap();
    assert!(flow.confirm_appointment().is_ok());
}

#[test]
fn integrations_act_on_the_confirmed_appointment() {
    let integration = RecordingIntegration::default();
    let mut flow = BookingFlowController::default();
    flow.start_booking().unwrap();
    flow.set_week("12").unwrap();
    flow.search_availability(&StaticAvailability::demo()).unwrap();
    flow.confirm_choice().unwrap();

    assert_matches!(
        flow.export_to_calendar(&integration),
        Err(BookingError::InvalidTransition { .. })
    );

    flow.confirm_appointment().unwrap();
    flow.export_to_calendar(&integration).unwrap();
    flow.open_map(&integration).unwrap();
    assert_eq!(integration.exported.get(), 1);
    assert_eq!(integration.mapped.get(), 1);

    let err = flow.export_to_calendar(&NoCalendarApp).unwrap_err();
    assert_matches!(
        err,
        BookingError::IntegrationUnavailable {
            integration: "Calendar",
            ..
        }
    );
    assert_eq!(flow.screen(), Screen::Confirmed);
    assert_eq!(flow.appointments().len(), 1);
}
