//! Screen flow and booking state for one session.
//!
//! This module provides the BookingFlowController struct which owns the
//! current screen, the draft being filled in, the availability results, the
//! slot fixed for confirmation and the list of confirmed appointments. Every
//! user action goes through one of its methods, which checks that the action
//! is valid on the current screen before touching any state.

use crate::availability::{find_slot, AvailabilityProvider};
use crate::config::AppConfig;
use crate::error::{BookingError, ProviderError, ValidationError};
use crate::integrations::{CalendarExporter, MapOpener};
use crate::models::{
    Action, Appointment, AppointmentDraft, AppointmentType, AvailabilitySlot, GestationalWeek,
    Screen,
};
use crate::render::ScreenView;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Provider,
    Integration,
}

/// Non-fatal message shown on top of the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub retryable: bool,
}

/// Parameters of an availability search, taken from the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub week: Option<GestationalWeek>,
    pub appointment_type: AppointmentType,
}

/// State machine driving the booking screens.
///
/// One instance per session; it is passed explicitly to whatever renders or
/// drives it. The appointments list only ever grows, in booking order.
#[derive(Debug, Clone)]
pub struct BookingFlowController {
    config: AppConfig,
    screen: Screen,
    history: Vec<Screen>,
    draft: AppointmentDraft,
    results: Vec<AvailabilitySlot>,
    chosen_slot: Option<u32>,
    selected_slot: Option<AvailabilitySlot>,
    appointments: Vec<Appointment>,
    last_confirmed: Option<Appointment>,
    loading: bool,
    notice: Option<Notice>,
}

impl Default for BookingFlowController {
    fn default() -> Self {
        BookingFlowController::new(AppConfig::default())
    }
}

impl BookingFlowController {
    /// Start a session on the home screen.
    pub fn new(config: AppConfig) -> Self {
        BookingFlowController {
            config,
            screen: Screen::Home,
            history: Vec::new(),
            draft: AppointmentDraft::default(),
            results: Vec::new(),
            chosen_slot: None,
            selected_slot: None,
            appointments: Vec::new(),
            last_confirmed: None,
            loading: false,
            notice: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn draft(&self) -> &AppointmentDraft {
        &self.draft
    }

    /// Slots returned by the last successful search.
    pub fn results(&self) -> &[AvailabilitySlot] {
        &self.results
    }

    /// Slot picked on the availability screen but not yet confirmed.
    pub fn chosen_slot(&self) -> Option<&AvailabilitySlot> {
        self.chosen_slot
            .and_then(|slot_id| find_slot(&self.results, slot_id))
    }

    /// Slot fixed for the booking shown on the confirmation screen.
    pub fn selected_slot(&self) -> Option<&AvailabilitySlot> {
        self.selected_slot.as_ref()
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn last_confirmed(&self) -> Option<&Appointment> {
        self.last_confirmed.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn available_actions(&self) -> &'static [Action] {
        self.screen.actions()
    }

    pub fn view(&self) -> ScreenView<'_> {
        ScreenView::from_controller(self)
    }

    // --- Home / list ---

    /// Begin a new booking with a fresh draft.
    pub fn start_booking(&mut self) -> Result<(), BookingError> {
        self.guard(Action::StartBooking)?;
        self.draft = AppointmentDraft::default();
        self.discard_results();
        self.navigate(Screen::ScheduleForm);
        Ok(())
    }

    pub fn view_appointments(&mut self) -> Result<(), BookingError> {
        self.guard(Action::ViewAppointments)?;
        self.navigate(Screen::MyAppointments);
        Ok(())
    }

    // --- Schedule form ---

    pub fn set_week(&mut self, value: &str) -> Result<(), BookingError> {
        self.guard(Action::SetWeek)?;
        let result = self.draft.set_week(value);
        self.check_field(result)?;
        debug!(week = ?self.draft.week.map(|w| w.get()), "draft week set");
        Ok(())
    }

    pub fn set_type(&mut self, appointment_type: AppointmentType) -> Result<(), BookingError> {
        self.guard(Action::SetType)?;
        self.draft.set_type(appointment_type);
        self.notice = None;
        debug!(appointment_type = %appointment_type, "draft type set");
        Ok(())
    }

    /// Set the type from its label; unknown labels leave the draft as is.
    pub fn set_type_label(&mut self, label: &str) -> Result<(), BookingError> {
        self.guard(Action::SetType)?;
        let appointment_type = self.check_field(AppointmentType::from_label(label))?;
        self.set_type(appointment_type)
    }

    pub fn set_center(&mut self, value: &str) -> Result<(), BookingError> {
        self.guard(Action::SetCenter)?;
        self.draft.set_center(value);
        self.notice = None;
        debug!(center = %self.draft.center, "draft center set");
        Ok(())
    }

    pub fn set_date(&mut self, value: &str) -> Result<(), BookingError> {
        self.guard(Action::SetDate)?;
        let result = self.draft.set_date(value);
        self.check_field(result)?;
        debug!(date = ?self.draft.date, "draft date set");
        Ok(())
    }

    // --- Availability search ---

    /// Mark a search as in flight and hand back what to ask the provider.
    pub fn begin_availability_query(&mut self) -> Result<AvailabilityQuery, BookingError> {
        self.guard(Action::SearchAvailability)?;
        if self.loading {
            return Err(BookingError::QueryInFlight);
        }
        self.loading = true;
        let query = AvailabilityQuery {
            week: self.draft.week,
            appointment_type: self.draft.appointment_type,
        };
        debug!(?query, "availability query started");
        Ok(query)
    }

    /// Apply the outcome of the search started by `begin_availability_query`.
    ///
    /// A failed or empty result keeps the user on the schedule form with a
    /// retryable notice.
    pub fn resolve_availability_query(
        &mut self,
        result: Result<Vec<AvailabilitySlot>, ProviderError>,
    ) -> Result<(), BookingError> {
        if !self.loading {
            debug!("availability result arrived with no pending query");
            return Err(BookingError::NoPendingQuery);
        }
        self.loading = false;

        let slots = match result {
            Ok(slots) if slots.is_empty() => Err(ProviderError::NoAvailability),
            other => other,
        };

        match slots {
            Ok(slots) => {
                info!(slots = slots.len(), "availability loaded");
                self.results = slots;
                self.chosen_slot = None;
                self.selected_slot = None;
                self.navigate(Screen::Availability);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "availability search failed");
                Err(self.record(e.into()))
            }
        }
    }

    /// Query the provider and move to the availability screen.
    pub fn search_availability<P>(&mut self, provider: &P) -> Result<(), BookingError>
    where
        P: AvailabilityProvider + ?Sized,
    {
        let query = self.begin_availability_query()?;
        let result = provider.fetch_availability(query.week, query.appointment_type);
        self.resolve_availability_query(result)
    }

    // --- Availability / confirmation ---

    pub fn choose_slot(&mut self, slot_id: u32) -> Result<(), BookingError> {
        self.guard(Action::ChooseSlot)?;
        if find_slot(&self.results, slot_id).is_none() {
            return Err(self.record(BookingError::UnknownSlot(slot_id)));
        }
        self.chosen_slot = Some(slot_id);
        self.notice = None;
        debug!(slot_id, "slot chosen");
        Ok(())
    }

    /// Fix the chosen slot, or the first result when none was picked.
    pub fn confirm_choice(&mut self) -> Result<(), BookingError> {
        self.guard(Action::ConfirmChoice)?;
        let fallback = self.chosen_slot().or_else(|| self.results.first()).cloned();
        let Some(slot) = fallback else {
            return Err(self.record(ValidationError::MissingField("slot").into()));
        };
        debug!(slot_id = slot.id, "slot fixed for confirmation");
        self.selected_slot = Some(slot);
        self.navigate(Screen::Confirmation);
        Ok(())
    }

    /// Book the selected slot with the current draft.
    ///
    /// Appends exactly one appointment, clears the draft and lands on the
    /// confirmed screen with a history that leads only back home.
    pub fn confirm_appointment(&mut self) -> Result<Appointment, BookingError> {
        self.guard(Action::ConfirmAppointment)?;

        let appointment = match self.build_appointment() {
            Ok(appointment) => appointment,
            Err(e) => return Err(self.record(e.into())),
        };

        info!(
            appointment_id = %appointment.id,
            week = %appointment.week,
            appointment_type = %appointment.appointment_type,
            when = %appointment.when(),
            doctor = %appointment.doctor,
            "appointment confirmed"
        );

        self.appointments.push(appointment.clone());
        self.last_confirmed = Some(appointment.clone());
        self.draft = AppointmentDraft::default();
        self.discard_results();
        self.history = vec![Screen::Home];
        self.show(Screen::Confirmed);

        Ok(appointment)
    }

    fn build_appointment(&self) -> Result<Appointment, ValidationError> {
        let slot = self
            .selected_slot
            .as_ref()
            .ok_or(ValidationError::MissingField("slot"))?;

        let week = match self.draft.week {
            Some(week) => week,
            None if self.config.strict_validation => {
                return Err(ValidationError::MissingField("week"));
            }
            None => self.config.default_week,
        };

        let center = if !slot.center.is_empty() {
            slot.center.clone()
        } else if !self.draft.center.is_empty() {
            self.draft.center.clone()
        } else if self.config.strict_validation {
            return Err(ValidationError::MissingField("center"));
        } else {
            self.config.default_center.clone()
        };

        Ok(Appointment::book(
            week,
            self.draft.appointment_type,
            center,
            slot,
        ))
    }

    /// Return to the form keeping every field entered so far.
    pub fn edit_details(&mut self) -> Result<(), BookingError> {
        self.guard(Action::EditDetails)?;
        self.chosen_slot = None;
        self.selected_slot = None;
        match self
            .history
            .iter()
            .rposition(|screen| *screen == Screen::ScheduleForm)
        {
            Some(index) => self.history.truncate(index),
            None => self.history = vec![Screen::Home],
        }
        self.show(Screen::ScheduleForm);
        Ok(())
    }

    // --- Confirmed ---

    pub fn export_to_calendar<E>(&mut self, exporter: &E) -> Result<(), BookingError>
    where
        E: CalendarExporter + ?Sized,
    {
        self.guard(Action::ExportToCalendar)?;
        let appointment = self.confirmed_appointment()?;
        if let Err(e) = exporter.export_to_calendar(&appointment) {
            warn!(appointment_id = %appointment.id, error = %e, "calendar export failed");
            return Err(self.record(BookingError::IntegrationUnavailable {
                integration: "Calendar",
                reason: e.to_string(),
            }));
        }
        self.notice = None;
        Ok(())
    }

    pub fn open_map<M>(&mut self, opener: &M) -> Result<(), BookingError>
    where
        M: MapOpener + ?Sized,
    {
        self.guard(Action::OpenMap)?;
        let appointment = self.confirmed_appointment()?;
        if let Err(e) = opener.open_map(&appointment) {
            warn!(appointment_id = %appointment.id, error = %e, "map hand-off failed");
            return Err(self.record(BookingError::IntegrationUnavailable {
                integration: "Map",
                reason: e.to_string(),
            }));
        }
        self.notice = None;
        Ok(())
    }

    fn confirmed_appointment(&mut self) -> Result<Appointment, BookingError> {
        match self.last_confirmed.clone() {
            Some(appointment) => Ok(appointment),
            None => Err(self.record(ValidationError::MissingField("appointment").into())),
        }
    }

    pub fn go_home(&mut self) -> Result<(), BookingError> {
        self.guard(Action::GoHome)?;
        self.history.clear();
        self.show(Screen::Home);
        Ok(())
    }

    // --- Navigation ---

    /// Return to the previous screen. Draft, results and selection are kept;
    /// a pending availability search is abandoned.
    pub fn go_back(&mut self) -> Screen {
        let Some(previous) = self.history.pop() else {
            debug!(screen = %self.screen, "no screen to go back to");
            return self.screen;
        };
        if self.loading {
            debug!("abandoning pending availability query");
            self.loading = false;
        }
        info!(from = %self.screen, to = %previous, "navigating back");
        self.show(previous);
        previous
    }

    fn guard(&self, action: Action) -> Result<(), BookingError> {
        if self.screen.allows(action) {
            Ok(())
        } else {
            debug!(screen = %self.screen, action = action.name(), "action rejected");
            Err(BookingError::InvalidTransition {
                screen: self.screen,
                action,
            })
        }
    }

    fn navigate(&mut self, to: Screen) {
        info!(from = %self.screen, to = %to, "screen transition");
        self.history.push(self.screen);
        self.show(to);
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.notice = None;
    }

    fn discard_results(&mut self) {
        self.results.clear();
        self.chosen_slot = None;
        self.selected_slot = None;
    }

    fn check_field<T>(&mut self, result: Result<T, ValidationError>) -> Result<T, BookingError> {
        match result {
            Ok(value) => {
                self.notice = None;
                Ok(value)
            }
            Err(e) => Err(self.record(e.into())),
        }
    }

    /// Keep a notice for user-facing failures and hand the error back.
    fn record(&mut self, error: BookingError) -> BookingError {
        let kind = match &error {
            BookingError::Validation(_) | BookingError::UnknownSlot(_) => {
                Some(NoticeKind::Validation)
            }
            BookingError::Provider(_) => Some(NoticeKind::Provider),
            BookingError::IntegrationUnavailable { .. } => Some(NoticeKind::Integration),
            _ => None,
        };
        if let Some(kind) = kind {
            self.notice = Some(Notice {
                kind,
                message: error.to_string(),
                retryable: error.is_retryable(),
            });
        }
        error
    }
}
