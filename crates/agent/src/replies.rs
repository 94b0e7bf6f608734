use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use jarvis_core::errors::InterfaceError;

use crate::agenda::AgendaDigest;

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// The single outward answer to one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssistantReply {
    AskDate { title: String },
    AskTime { title: String, date: NaiveDate },
    EventCreated { title: String, start: NaiveDateTime, link: Option<String> },
    TaskCreated { title: String, due: Option<NaiveDate> },
    Agenda(AgendaDigest),
    Cancelled { had_pending: bool },
    Failure(InterfaceError),
}

impl AssistantReply {
    pub fn render(&self) -> String {
        match self {
            Self::AskDate { title } => format!("¿Qué día quieres agendar «{title}»?"),
            Self::AskTime { title, date } => {
                format!("¿A qué hora es «{title}» el {}?", spanish_day(*date))
            }
            Self::EventCreated { title, start, link } => {
                let mut text = format!(
                    "Listo, agendé «{title}» el {} a las {}.",
                    spanish_day(start.date()),
                    start.format("%H:%M")
                );
                if let Some(link) = link {
                    text.push('\n');
                    text.push_str(link);
                }
                text
            }
            Self::TaskCreated { title, due: Some(due) } => {
                format!("Tarea creada: «{title}» para el {}.", spanish_day(*due))
            }
            Self::TaskCreated { title, due: None } => format!("Tarea creada: «{title}»."),
            Self::Agenda(digest) => render_agenda(digest),
            Self::Cancelled { had_pending: true } => {
                "Listo, olvidé la reunión pendiente.".to_owned()
            }
            Self::Cancelled { had_pending: false } => "No había nada pendiente.".to_owned(),
            Self::Failure(error) => error.user_message().to_owned(),
        }
    }
}

/// `"jueves 5 de marzo"`.
pub fn spanish_day(date: NaiveDate) -> String {
    let weekday = match date.weekday() {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    };
    let month = MONTH_NAMES[date.month0() as usize];
    format!("{weekday} {} de {month}", date.day())
}

fn render_agenda(digest: &AgendaDigest) -> String {
    let day = spanish_day(digest.day);
    if digest.is_empty() {
        return format!("No tienes nada para el {day}.");
    }

    let mut lines = vec![format!("Agenda del {day}:")];
    if !digest.events.is_empty() {
        lines.push("Eventos:".to_owned());
        lines.extend(digest.events.iter().map(|event| match event.start {
            Some(start) => format!("- {} {}", start.format("%H:%M"), event.title),
            None => format!("- (todo el día) {}", event.title),
        }));
    }
    if !digest.due_tasks.is_empty() {
        lines.push("Tareas para ese día:".to_owned());
        lines.extend(digest.due_tasks.iter().map(|task| format!("- {}", task.title)));
    }
    if !digest.undated_tasks.is_empty() {
        lines.push("Pendientes sin fecha:".to_owned());
        lines.extend(digest.undated_tasks.iter().map(|task| format!("- {}", task.title)));
    }
    lines.join("\n")
}
