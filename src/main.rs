//! Interactive terminal front end for the prenatal booking flow.
//!
//! Renders the current screen, lists the numbered options for it and hands
//! each choice to the booking controller. Errors are shown as notices; the
//! session only ends on "Salir" or end of input.
//!
//! With `VIDA_OUTPUT=json` stdout carries nothing but one JSON frame per
//! render. The numbered menu, prompts and messages go to stderr.

use anyhow::Result;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vida_materna::availability::{StaticAvailability, CENTERS};
use vida_materna::config::{AppConfig, OutputFormat};
use vida_materna::integrations::InertIntegration;
use vida_materna::render::{JsonRenderer, Renderer, TextRenderer};
use vida_materna::{
    Action, AppointmentType, BookingError, BookingFlowController, Notice, Screen,
};

/// Options offered on top of the controller's own actions.
enum MenuChoice {
    Flow(Action),
    Demo,
    Exit,
}

impl MenuChoice {
    fn label(&self) -> &'static str {
        match self {
            MenuChoice::Flow(action) => action.label(),
            MenuChoice::Demo => "Ver demostración",
            MenuChoice::Exit => "Salir",
        }
    }
}

/// True when the controller already turned `error` into the current notice,
/// so the next frame shows it.
fn reported_by_notice(notice: Option<&Notice>, error: &BookingError) -> bool {
    notice.is_some_and(|notice| notice.message == error.to_string())
}

struct BookingCli {
    controller: BookingFlowController,
    renderer: Box<dyn Renderer>,
    provider: StaticAvailability,
    integrations: InertIntegration,
    /// Frames are JSON documents; everything else goes to stderr.
    json: bool,
    running: bool,
}

impl BookingCli {
    fn new(config: AppConfig) -> Self {
        let renderer: Box<dyn Renderer> = match config.output {
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        };
        let json = config.output == OutputFormat::Json;
        BookingCli {
            controller: BookingFlowController::new(config),
            renderer,
            provider: StaticAvailability::demo(),
            integrations: InertIntegration,
            json,
            running: true,
        }
    }

    /// Read one trimmed line. `None` means input is exhausted.
    fn get_input(&self, prompt: &str) -> io::Result<Option<String>> {
        if self.json {
            eprint!("{}: ", prompt);
            io::stderr().flush()?;
        } else {
            print!("{}: ", prompt);
            io::stdout().flush()?;
        }

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }

    fn menu(&self) -> Vec<MenuChoice> {
        let mut choices: Vec<MenuChoice> = self
            .controller
            .available_actions()
            .iter()
            .copied()
            .map(MenuChoice::Flow)
            .collect();
        if self.controller.screen() == Screen::Home {
            choices.push(MenuChoice::Demo);
        }
        choices.push(MenuChoice::Exit);
        choices
    }

    fn notify(&self, message: impl Display) {
        if self.json {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }

    /// Write the current frame to `out` and the numbered menu where it
    /// belongs: the text renderer already numbers the flow actions, so only
    /// the extra choices follow it; in JSON mode the whole menu goes to `side`.
    fn write_frame(&self, out: &mut dyn Write, side: &mut dyn Write) -> io::Result<()> {
        self.renderer.render(&self.controller.view(), out)?;

        let menu = self.menu();
        if self.json {
            for (i, choice) in menu.iter().enumerate() {
                writeln!(side, "{}. {}", i + 1, choice.label())?;
            }
            side.flush()?;
        } else {
            let shown = self.controller.available_actions().len();
            for (i, choice) in menu.iter().enumerate().skip(shown) {
                writeln!(out, "{}. {}", i + 1, choice.label())?;
            }
        }
        out.flush()
    }

    fn render(&self) -> io::Result<()> {
        self.write_frame(&mut io::stdout().lock(), &mut io::stderr().lock())
    }

    fn run(&mut self) -> Result<()> {
        while self.running {
            self.render()?;

            let Some(input) = self.get_input("Elige una opción")? else {
                break;
            };
            let mut menu = self.menu();
            let choice = match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= menu.len() => menu.swap_remove(n - 1),
                _ => {
                    self.notify("Opción no válida");
                    continue;
                }
            };

            let outcome = match choice {
                MenuChoice::Flow(action) => self.dispatch(action),
                MenuChoice::Demo => self.run_demo(),
                MenuChoice::Exit => {
                    self.running = false;
                    self.notify("\n¡Hasta pronto!");
                    Ok(())
                }
            };

            if let Err(e) = outcome {
                match e.downcast_ref::<BookingError>() {
                    // Notices are shown by the renderer on the next frame.
                    Some(booking_error)
                        if reported_by_notice(self.controller.notice(), booking_error) => {}
                    Some(booking_error) => self.notify(format!("\n! {}", booking_error)),
                    None => return Err(e),
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::StartBooking => self.controller.start_booking()?,
            Action::ViewAppointments => self.controller.view_appointments()?,
            Action::SetWeek => {
                if let Some(week) = self.get_input("Semana de embarazo (1-40, vacío para borrar)")? {
                    self.controller.set_week(&week)?;
                }
            }
            Action::SetType => {
                for (i, kind) in AppointmentType::ALL.iter().enumerate() {
                    self.notify(format!("  {}. {} - {}", i + 1, kind.label(), kind.description()));
                }
                if let Some(input) = self.get_input("Tipo de cita")? {
                    match input.parse::<usize>() {
                        Ok(n) if n >= 1 && n <= AppointmentType::ALL.len() => {
                            self.controller.set_type(AppointmentType::ALL[n - 1])?
                        }
                        _ => self.controller.set_type_label(&input)?,
                    }
                }
            }
            Action::SetCenter => {
                for (i, center) in CENTERS.iter().enumerate() {
                    self.notify(format!("  {}. {}", i + 1, center));
                }
                if let Some(input) = self.get_input("Establecimiento (número o nombre)")? {
                    let center = match input.parse::<usize>() {
                        Ok(n) if n >= 1 && n <= CENTERS.len() => CENTERS[n - 1].to_string(),
                        _ => input,
                    };
                    self.controller.set_center(&center)?;
                }
            }
            Action::SetDate => {
                if let Some(date) = self.get_input("Fecha tentativa (AAAA-MM-DD)")? {
                    self.controller.set_date(&date)?;
                }
            }
            Action::SearchAvailability => self.controller.search_availability(&self.provider)?,
            Action::ChooseSlot => {
                if let Some(input) = self.get_input("Número de horario")? {
                    match input.parse::<u32>() {
                        Ok(slot_id) => self.controller.choose_slot(slot_id)?,
                        Err(_) => self.notify("Ingresa el número que aparece entre corchetes"),
                    }
                }
            }
            Action::ConfirmChoice => self.controller.confirm_choice()?,
            Action::ConfirmAppointment => {
                let appointment = self.controller.confirm_appointment()?;
                info!(appointment_id = %appointment.id, "booked from terminal");
            }
            Action::EditDetails => self.controller.edit_details()?,
            Action::OpenMap => self.controller.open_map(&self.integrations)?,
            Action::ExportToCalendar => {
                self.controller.export_to_calendar(&self.integrations)?;
                self.notify("\nCita añadida al calendario");
            }
            Action::GoHome => self.controller.go_home()?,
            Action::GoBack => {
                self.controller.go_back();
            }
        }
        Ok(())
    }

    /// Book an ultrasound for week 12 in the first demo slot.
    fn run_demo(&mut self) -> Result<()> {
        self.notify("\n--- Running Demo ---");
        self.notify("  Semana 12, Ecografía, primer horario disponible");

        self.controller.start_booking()?;
        self.controller.set_week("12")?;
        self.controller.set_type(AppointmentType::Ecografia)?;
        self.controller.search_availability(&self.provider)?;
        self.controller.choose_slot(1)?;
        self.controller.confirm_choice()?;
        let appointment = self.controller.confirm_appointment()?;

        self.notify(format!(
            "  Reservado: {} con {} en {}",
            appointment.when(),
            appointment.doctor,
            appointment.center
        ));
        Ok(())
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AppConfig::from_env();
    if !config.strict_validation {
        warn!("strict validation disabled, missing fields will be filled with defaults");
    }
    info!(?config, "starting Vida Materna");

    let mut cli = BookingCli::new(config);
    cli.run()
}
