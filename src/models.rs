//! Data models for the prenatal booking flow.
//!
//! This module defines the core data structures used throughout the system:
//! - AppointmentType: closed set of prenatal appointment kinds
//! - GestationalWeek: pregnancy week, 1 through 40
//! - AppointmentDraft: form data collected before a slot is booked
//! - AvailabilitySlot: one bookable option returned by an availability search
//! - Appointment: confirmed appointment details
//! - Screen / Action: the screens of the flow and what a user can do on each

use crate::error::ValidationError;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Kind of prenatal appointment.
///
/// The set is closed: a draft can only ever hold one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum AppointmentType {
    #[default]
    #[serde(rename = "Control regular")]
    ControlRegular,
    #[serde(rename = "Alto riesgo")]
    AltoRiesgo,
    #[serde(rename = "Ecografía")]
    Ecografia,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 3] = [
        AppointmentType::ControlRegular,
        AppointmentType::AltoRiesgo,
        AppointmentType::Ecografia,
    ];

    /// Convert a label to an AppointmentType value.
    pub fn from_label(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_lowercase().as_str() {
            "control regular" => Ok(AppointmentType::ControlRegular),
            "alto riesgo" => Ok(AppointmentType::AltoRiesgo),
            "ecografía" | "ecografia" => Ok(AppointmentType::Ecografia),
            _ => Err(ValidationError::InvalidType(value.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::ControlRegular => "Control regular",
            AppointmentType::AltoRiesgo => "Alto riesgo",
            AppointmentType::Ecografia => "Ecografía",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AppointmentType::ControlRegular => "Seguimiento estándar del embarazo",
            AppointmentType::AltoRiesgo => "Control especializado con mayor duración",
            AppointmentType::Ecografia => "Examen de ultrasonido obstétrico",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Week of pregnancy used to prioritise the kind of control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GestationalWeek(u8);

impl GestationalWeek {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 40;

    pub fn new(week: u8) -> Result<Self, ValidationError> {
        if !(Self::FIRST..=Self::LAST).contains(&week) {
            return Err(ValidationError::InvalidWeek(week.to_string()));
        }
        Ok(GestationalWeek(week))
    }

    /// Clamp into the valid range; for compile-time defaults.
    pub const fn saturating(week: u8) -> Self {
        if week < Self::FIRST {
            GestationalWeek(Self::FIRST)
        } else if week > Self::LAST {
            GestationalWeek(Self::LAST)
        } else {
            GestationalWeek(week)
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let week = trimmed
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidWeek(trimmed.to_string()))?;
        Self::new(week)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Every selectable week, in order.
    pub fn all() -> impl Iterator<Item = GestationalWeek> {
        (Self::FIRST..=Self::LAST).map(GestationalWeek)
    }
}

impl fmt::Display for GestationalWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Weeks travel as strings ("12"), the way the form submits them.
impl Serialize for GestationalWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// In-progress booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentDraft {
    pub week: Option<GestationalWeek>,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub center: String,
    pub date: Option<NaiveDate>,
}

impl AppointmentDraft {
    /// Set the week from form input. An empty value clears the choice.
    pub fn set_week(&mut self, value: &str) -> Result<(), ValidationError> {
        self.week = if value.trim().is_empty() {
            None
        } else {
            Some(GestationalWeek::parse(value)?)
        };
        Ok(())
    }

    pub fn set_type(&mut self, appointment_type: AppointmentType) {
        self.appointment_type = appointment_type;
    }

    pub fn set_center(&mut self, value: &str) {
        self.center = value.trim().to_string();
    }

    /// Set the tentative date (YYYY-MM-DD). An empty value clears it.
    pub fn set_date(&mut self, value: &str) -> Result<(), ValidationError> {
        let trimmed = value.trim();
        self.date = if trimmed.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))?;
            Some(date)
        };
        Ok(())
    }

    /// True when nothing has been entered since the draft was reset.
    pub fn is_pristine(&self) -> bool {
        self == &AppointmentDraft::default()
    }
}

/// One bookable (date, time, doctor, center) option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AvailabilitySlot {
    pub id: u32,
    pub date: String,
    pub time: String,
    pub doctor: String,
    pub center: String,
}

impl AvailabilitySlot {
    pub fn new(
        id: u32,
        date: impl Into<String>,
        time: impl Into<String>,
        doctor: impl Into<String>,
        center: impl Into<String>,
    ) -> Self {
        AvailabilitySlot {
            id,
            date: date.into(),
            time: time.into(),
            doctor: doctor.into(),
            center: center.into(),
        }
    }
}

/// Represents a confirmed appointment.
///
/// Only the booking controller creates these, from a draft and the slot
/// fixed on the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Appointment {
    pub id: String,
    pub week: GestationalWeek,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub center: String,
    pub date: String,
    pub time: String,
    pub doctor: String,
    pub booked_at: DateTime<Local>,
}

impl Appointment {
    pub(crate) fn book(
        week: GestationalWeek,
        appointment_type: AppointmentType,
        center: String,
        slot: &AvailabilitySlot,
    ) -> Self {
        Appointment {
            id: Uuid::new_v4().to_string(),
            week,
            appointment_type,
            center,
            date: slot.date.clone(),
            time: slot.time.clone(),
            doctor: slot.doctor.clone(),
            booked_at: Local::now(),
        }
    }

    /// "25 de Enero - 16:00 PM"
    pub fn when(&self) -> String {
        format!("{} - {}", self.date, self.time)
    }
}

/// Screens of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    ScheduleForm,
    Availability,
    Confirmation,
    Confirmed,
    MyAppointments,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::ScheduleForm => "schedule_form",
            Screen::Availability => "availability",
            Screen::Confirmation => "confirmation",
            Screen::Confirmed => "confirmed",
            Screen::MyAppointments => "my_appointments",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Citas Prenatales",
            Screen::ScheduleForm => "Agendar Cita",
            Screen::Availability => "Disponibilidad",
            Screen::Confirmation => "Confirmación de Cita",
            Screen::Confirmed => "Cita Confirmada",
            Screen::MyAppointments => "Mis Citas",
        }
    }

    /// Operations a user may trigger while this screen is shown.
    pub fn actions(&self) -> &'static [Action] {
        use Action::*;
        match self {
            Screen::Home => &[StartBooking, ViewAppointments],
            Screen::ScheduleForm => &[
                SetWeek,
                SetType,
                SetCenter,
                SetDate,
                SearchAvailability,
                GoBack,
            ],
            Screen::Availability => &[ChooseSlot, ConfirmChoice, GoBack],
            Screen::Confirmation => &[ConfirmAppointment, EditDetails, GoBack],
            Screen::Confirmed => &[OpenMap, ExportToCalendar, GoHome, GoBack],
            Screen::MyAppointments => &[StartBooking, GoBack],
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        self.actions().contains(&action)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-triggered operations on the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    StartBooking,
    ViewAppointments,
    SetWeek,
    SetType,
    SetCenter,
    SetDate,
    SearchAvailability,
    ChooseSlot,
    ConfirmChoice,
    ConfirmAppointment,
    EditDetails,
    OpenMap,
    ExportToCalendar,
    GoHome,
    GoBack,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartBooking => "start_booking",
            Action::ViewAppointments => "view_appointments",
            Action::SetWeek => "set_week",
            Action::SetType => "set_type",
            Action::SetCenter => "set_center",
            Action::SetDate => "set_date",
            Action::SearchAvailability => "search_availability",
            Action::ChooseSlot => "choose_slot",
            Action::ConfirmChoice => "confirm_choice",
            Action::ConfirmAppointment => "confirm_appointment",
            Action::EditDetails => "edit_details",
            Action::OpenMap => "open_map",
            Action::ExportToCalendar => "export_to_calendar",
            Action::GoHome => "go_home",
            Action::GoBack => "go_back",
        }
    }

    /// Button caption shown by the presentation layer.
    pub fn label(&self) -> &'static str {
        match self {
            Action::StartBooking => "Agendar nueva cita",
            Action::ViewAppointments => "Ver mis citas programadas",
            Action::SetWeek => "Semana de embarazo",
            Action::SetType => "Tipo de cita",
            Action::SetCenter => "Establecimiento de salud",
            Action::SetDate => "Fecha tentativa",
            Action::SearchAvailability => "Buscar disponibilidad",
            Action::ChooseSlot => "Elegir horario",
            Action::ConfirmChoice => "Confirmar elección",
            Action::ConfirmAppointment => "Confirmar cita",
            Action::EditDetails => "Regresar y cambiar datos",
            Action::OpenMap => "Abrir mapa",
            Action::ExportToCalendar => "Añadir al calendario",
            Action::GoHome => "Volver al inicio",
            Action::GoBack => "Atrás",
        }
    }
}
