use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use jarvis_core::datetime::HourMinute;
use jarvis_core::domain::conversation::Awaiting;

/// What an inbound message asks the assistant to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    AgendaQuery,
    PendingContinuation,
    Meeting,
    ExplicitTask,
    Default,
}

/// Everything the classifier may look at for one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageFacts {
    /// Lowercased text without combining marks.
    pub normalized: String,
    pub date: Option<NaiveDate>,
    pub time: Option<HourMinute>,
    pub awaiting: Option<Awaiting>,
}

impl MessageFacts {
    /// True when the message carries the piece a pending meeting waits for.
    /// A bare date does not answer a pending time question.
    pub fn supplies_awaited_piece(&self) -> bool {
        match self.awaiting {
            Some(Awaiting::Date) => self.date.is_some(),
            Some(Awaiting::Time) => self.time.is_some(),
            None => false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Matcher {
    Keywords(Regex),
    SuppliesAwaitedPiece,
}

impl Matcher {
    pub fn matches(&self, facts: &MessageFacts) -> bool {
        match self {
            Self::Keywords(pattern) => pattern.is_match(&facts.normalized),
            Self::SuppliesAwaitedPiece => facts.supplies_awaited_piece(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct IntentRule {
    pub kind: IntentKind,
    pub matcher: Matcher,
}

impl IntentRule {
    pub fn keywords(kind: IntentKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { kind, matcher: Matcher::Keywords(Regex::new(pattern)?) })
    }
}

const AGENDA_PATTERN: &str = concat!(
    r"^\W*(y\s+)?que\s+(\w+\s+)?(tengo|hay|me\s+toca)\b",
    r"|\bmi\s+agenda\s+(de|para)\b",
    r"|\bagenda\s+(de\s+)?(hoy|manana|pasado\s+manana)\b",
    r"|\bmuestrame\s+(mi\s+)?agenda\b",
);
const MEETING_PATTERN: &str = concat!(
    r"\b(reunion(es)?|junta|cita|llamada|videollamada|meet(ing)?|call",
    r"|agendar|agendame|programar|programame|bloquear|bloqueame)\b",
);
const TASK_PATTERN: &str =
    r"\b(tareas?|pendientes?|recuerdame|recordar(me)?|recordatorio|todo)\b";

/// Ordered rule list; the first matching rule decides the intent.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// agenda-query > pending-continuation > meeting > explicit-task.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self::with_rules(Self::default_rules()?))
    }

    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    pub fn default_rules() -> Result<Vec<IntentRule>, regex::Error> {
        Ok(vec![
            IntentRule::keywords(IntentKind::AgendaQuery, AGENDA_PATTERN)?,
            IntentRule {
                kind: IntentKind::PendingContinuation,
                matcher: Matcher::SuppliesAwaitedPiece,
            },
            IntentRule::keywords(IntentKind::Meeting, MEETING_PATTERN)?,
            IntentRule::keywords(IntentKind::ExplicitTask, TASK_PATTERN)?,
        ])
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, facts: &MessageFacts) -> IntentKind {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(facts))
            .map_or(IntentKind::Default, |rule| rule.kind)
    }
}

/// Title for a task or meeting: the message with a leading task keyword and
/// repeated whitespace removed.
pub fn derive_title(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = collapsed.to_lowercase();
    if lowered.len() != collapsed.len() {
        return collapsed;
    }
    let prefixes = [
        "recuérdame", "recuerdame", "recordatorio", "tareas", "tarea", "pendientes", "pendiente",
        "todo",
    ];

    for prefix in prefixes {
        let Some(rest) = lowered.strip_prefix(prefix) else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with([' ', ':', ',', '-']) {
            continue;
        }
        let offset = collapsed.len() - rest.len();
        let stripped = collapsed.get(offset..).unwrap_or_default();
        let stripped = stripped.trim_start_matches([' ', ':', ',', '-']).trim();
        if !stripped.is_empty() {
            return stripped.to_owned();
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use jarvis_core::datetime::HourMinute;
    use jarvis_core::domain::conversation::Awaiting;
    use jarvis_core::text::normalize;

    use super::{derive_title, IntentClassifier, IntentKind, IntentRule, MessageFacts};

    fn facts(text: &str) -> MessageFacts {
        MessageFacts { normalized: normalize(text), date: None, time: None, awaiting: None }
    }

    fn classifier() -> IntentClassifier {
        IntentClassifier::new().expect("default rules compile")
    }

    #[test]
    fn recognizes_agenda_questions() {
        let classifier = classifier();
        for phrase in [
            "¿Qué tengo hoy?",
            "que hay para mañana",
            "Y qué me toca el viernes?",
            "mi agenda de mañana",
            "agenda de hoy",
            "Muéstrame mi agenda",
        ] {
            assert_eq!(classifier.classify(&facts(phrase)), IntentKind::AgendaQuery, "{phrase}");
        }
    }

    #[test]
    fn recognizes_meeting_requests() {
        let classifier = classifier();
        for phrase in [
            "Reunión con Ana mañana a las 3 pm",
            "junta de equipo el lunes",
            "cita con el dentista",
            "videollamada con soporte",
            "agéndame una llamada",
            "prográmame algo con Pedro",
            "bloquéame la tarde del jueves",
            "meeting with Bob",
        ] {
            assert_eq!(classifier.classify(&facts(phrase)), IntentKind::Meeting, "{phrase}");
        }
    }

    #[test]
    fn recognizes_explicit_tasks_and_defaults() {
        let classifier = classifier();
        for phrase in ["recuérdame pagar la luz", "tarea: comprar pan", "pendiente revisar correo"] {
            assert_eq!(classifier.classify(&facts(phrase)), IntentKind::ExplicitTask, "{phrase}");
        }
        for phrase in ["comprar leche", "hola", "revisar la agenda del equipo"] {
            assert_eq!(classifier.classify(&facts(phrase)), IntentKind::Default, "{phrase}");
        }
    }

    #[test]
    fn agenda_takes_precedence_over_meeting_keywords() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(&facts("¿qué reuniones tengo mañana?")),
            IntentKind::AgendaQuery
        );
        assert_eq!(
            classifier.classify(&facts("qué tengo mañana, alguna reunión?")),
            IntentKind::AgendaQuery
        );
    }

    #[test]
    fn continuation_requires_the_awaited_piece() {
        let classifier = classifier();
        let date = NaiveDate::from_ymd_opt(2026, 3, 6);
        let time = HourMinute::new(15, 0);

        let mut awaiting_date = facts("el viernes");
        awaiting_date.awaiting = Some(Awaiting::Date);
        awaiting_date.date = date;
        assert_eq!(classifier.classify(&awaiting_date), IntentKind::PendingContinuation);

        let mut time_while_awaiting_date = facts("a las 3");
        time_while_awaiting_date.awaiting = Some(Awaiting::Date);
        time_while_awaiting_date.time = time;
        assert_eq!(classifier.classify(&time_while_awaiting_date), IntentKind::Default);

        let mut awaiting_time = facts("15:00");
        awaiting_time.awaiting = Some(Awaiting::Time);
        awaiting_time.time = time;
        assert_eq!(classifier.classify(&awaiting_time), IntentKind::PendingContinuation);

        let mut new_meeting = facts("reunión con Ana el viernes");
        new_meeting.awaiting = Some(Awaiting::Time);
        new_meeting.date = date;
        assert_eq!(classifier.classify(&new_meeting), IntentKind::Meeting);

        let mut dated_task = facts("tarea pagar la luz el viernes");
        dated_task.awaiting = Some(Awaiting::Time);
        dated_task.date = date;
        assert_eq!(classifier.classify(&dated_task), IntentKind::ExplicitTask);

        let mut moved_with_time = facts("el viernes a las 3");
        moved_with_time.awaiting = Some(Awaiting::Time);
        moved_with_time.date = date;
        moved_with_time.time = time;
        assert_eq!(classifier.classify(&moved_with_time), IntentKind::PendingContinuation);
    }

    #[test]
    fn custom_rule_order_changes_precedence() {
        let mut rules = IntentClassifier::default_rules().expect("rules");
        let meeting = rules.remove(2);
        rules.insert(0, meeting);
        let classifier = IntentClassifier::with_rules(rules);

        assert_eq!(
            classifier.classify(&facts("qué tengo mañana, alguna reunión?")),
            IntentKind::Meeting
        );
    }

    #[test]
    fn empty_rule_list_always_defaults() {
        let classifier = IntentClassifier::with_rules(Vec::<IntentRule>::new());
        assert_eq!(classifier.classify(&facts("reunión mañana")), IntentKind::Default);
    }

    #[test]
    fn derive_title_strips_task_keywords() {
        assert_eq!(derive_title("  tarea:   comprar pan "), "comprar pan");
        assert_eq!(derive_title("Recuérdame pagar la luz"), "pagar la luz");
        assert_eq!(derive_title("todos los martes basura"), "todos los martes basura");
        assert_eq!(derive_title("Reunión con Ana mañana"), "Reunión con Ana mañana");
        assert_eq!(derive_title("tarea"), "tarea");
    }
}
