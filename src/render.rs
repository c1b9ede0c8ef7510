//! Render boundary between the booking controller and a presentation layer.
//!
//! ScreenView is a read-only snapshot of everything a screen needs; a
//! Renderer turns it into output. The text renderer draws the screens the
//! way the terminal front end shows them, the JSON renderer emits one
//! document per frame for other front ends.

use crate::availability::suggest_centers;
use crate::controller::{BookingFlowController, Notice};
use crate::models::{
    Action, Appointment, AppointmentDraft, AppointmentType, AvailabilitySlot, Screen,
};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Serialize)]
pub struct ScreenView<'a> {
    pub screen: Screen,
    pub title: &'static str,
    pub draft: &'a AppointmentDraft,
    pub results: &'a [AvailabilitySlot],
    pub chosen_slot: Option<&'a AvailabilitySlot>,
    pub selected_slot: Option<&'a AvailabilitySlot>,
    pub last_confirmed: Option<&'a Appointment>,
    pub appointments: &'a [Appointment],
    /// The appointment list has nothing to show.
    pub empty_state: bool,
    pub loading: bool,
    pub notice: Option<&'a Notice>,
    pub actions: &'static [Action],
}

impl<'a> ScreenView<'a> {
    pub fn from_controller(controller: &'a BookingFlowController) -> Self {
        let screen = controller.screen();
        ScreenView {
            screen,
            title: screen.title(),
            draft: controller.draft(),
            results: controller.results(),
            chosen_slot: controller.chosen_slot(),
            selected_slot: controller.selected_slot(),
            last_confirmed: controller.last_confirmed(),
            appointments: controller.appointments(),
            empty_state: controller.appointments().is_empty(),
            loading: controller.is_loading(),
            notice: controller.notice(),
            actions: controller.available_actions(),
        }
    }
}

pub trait Renderer {
    fn render(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *out, view)?;
        writeln!(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    fn header(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\n{}", "=".repeat(60))?;
        writeln!(out, "       {}", view.title.to_uppercase())?;
        writeln!(out, "{}", "=".repeat(60))
    }

    fn home(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Vida Materna")?;
        writeln!(out, "Gestiona tus controles prenatales de manera rápida y segura.")?;
        writeln!(out, "Agenda nuevas citas o revisa las que ya tienes programadas.")
    }

    fn schedule_form(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        let draft = view.draft;
        let week = draft
            .week
            .map(|w| format!("Semana {}", w))
            .unwrap_or_else(|| "Selecciona la semana".to_string());
        writeln!(out, "Semana de embarazo: {}", week)?;
        writeln!(out, "Tipo de cita:")?;
        for kind in AppointmentType::ALL {
            let mark = if kind == draft.appointment_type { "(x)" } else { "( )" };
            writeln!(out, "  {} {} - {}", mark, kind.label(), kind.description())?;
        }
        if draft.center.is_empty() {
            writeln!(out, "Establecimiento de salud: -")?;
        } else {
            writeln!(out, "Establecimiento de salud: {}", draft.center)?;
            let suggestions = suggest_centers(&draft.center);
            if !suggestions.is_empty() && !suggestions.iter().any(|s| *s == draft.center) {
                writeln!(out, "  Sugerencias: {}", suggestions.join(", "))?;
            }
        }
        match draft.date {
            Some(date) => writeln!(out, "Fecha tentativa: {}", date.format("%Y-%m-%d"))?,
            None => writeln!(out, "Fecha tentativa: -")?,
        }
        if view.loading {
            writeln!(out, "\nBuscando disponibilidad...")?;
        }
        Ok(())
    }

    fn availability(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Resultados de disponibilidad:")?;
        for slot in view.results {
            let mark = if view.chosen_slot.map(|s| s.id) == Some(slot.id) { "*" } else { " " };
            writeln!(
                out,
                " {} [{}] {} {} | {} | {}",
                mark, slot.id, slot.date, slot.time, slot.doctor, slot.center
            )?;
        }
        Ok(())
    }

    fn confirmation(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Por favor, revisa los detalles de tu cita")?;
        if let Some(slot) = view.selected_slot {
            writeln!(out, "  Fecha y Hora: {} - {}", slot.date, slot.time)?;
            writeln!(out, "  Centro de salud: {}", slot.center)?;
            writeln!(out, "  Tipo de cita: {}", view.draft.appointment_type)?;
            writeln!(out, "  Obstetra a cargo: {}", slot.doctor)?;
        }
        Ok(())
    }

    fn confirmed(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Tu cita ha sido programada con éxito")?;
        if let Some(appointment) = view.last_confirmed {
            writeln!(out, "  Fecha y Hora: {}", appointment.when())?;
            writeln!(out, "  Obstetra: {}", appointment.doctor)?;
            writeln!(out, "  Ubicación: {}", appointment.center)?;
        }
        writeln!(out, "\n\"Recuerda llegar 15 min antes\"")?;
        writeln!(out, "\"Traer DNI y carnet\"")
    }

    fn my_appointments(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        if view.empty_state {
            return writeln!(out, "No tienes citas programadas aún.");
        }
        for appointment in view.appointments {
            writeln!(
                out,
                "\n{} | Semana {}",
                appointment.when(),
                appointment.week
            )?;
            writeln!(out, "  {}", appointment.center)?;
            writeln!(out, "  {}", appointment.doctor)?;
            writeln!(out, "  {}", appointment.appointment_type)?;
            let short_id = appointment.id.get(..8).unwrap_or(&appointment.id);
            writeln!(out, "  ID: {}...", short_id)?;
        }
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, view: &ScreenView<'_>, out: &mut dyn Write) -> io::Result<()> {
        self.header(view, out)?;
        match view.screen {
            Screen::Home => self.home(out)?,
            Screen::ScheduleForm => self.schedule_form(view, out)?,
            Screen::Availability => self.availability(view, out)?,
            Screen::Confirmation => self.confirmation(view, out)?,
            Screen::Confirmed => self.confirmed(view, out)?,
            Screen::MyAppointments => self.my_appointments(view, out)?,
        }
        if let Some(notice) = view.notice {
            let hint = if notice.retryable { " (puedes reintentar)" } else { "" };
            writeln!(out, "\n! {}{}", notice.message, hint)?;
        }
        writeln!(out, "\n--- Opciones ---")?;
        for (i, action) in view.actions.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, action.label())?;
        }
        writeln!(out, "{}", "-".repeat(20))
    }
}
