//! Dry run of the message pipeline's pure half: date/time resolution and
//! intent classification, without touching any store or Google API.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use jarvis_agent::conversation::{derive_title, IntentClassifier, IntentKind, MessageFacts};
use jarvis_core::config::{AppConfig, LoadOptions};
use jarvis_core::datetime::{DateTimeResolver, Resolution};
use jarvis_core::domain::conversation::Awaiting;
use jarvis_core::text::normalize;

use crate::commands::CommandResult;

const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Default, Clone)]
pub struct ResolveArgs {
    pub text: String,
    /// Local wall-clock reference, `YYYY-MM-DDTHH:MM`.
    pub now: Option<String>,
    pub timezone: Option<String>,
    /// `date` or `time`, simulating a pending meeting.
    pub awaiting: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub command: &'static str,
    pub status: &'static str,
    pub input: String,
    pub timezone: String,
    pub now: String,
    pub resolution: Resolution,
    pub time: Option<String>,
    pub awaiting: Option<&'static str>,
    pub intent: IntentKind,
    pub title: String,
}

pub fn run(args: ResolveArgs) -> CommandResult {
    let timezone = match args.timezone.as_deref() {
        Some(raw) => match raw.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                return CommandResult::failure(
                    "resolve",
                    "invalid_argument",
                    format!("unknown IANA timezone `{raw}`"),
                    2,
                );
            }
        },
        None => configured_timezone(),
    };

    let now = match args.now.as_deref() {
        Some(raw) => match NaiveDateTime::parse_from_str(raw, NOW_FORMAT) {
            Ok(now) => now,
            Err(error) => {
                return CommandResult::failure(
                    "resolve",
                    "invalid_argument",
                    format!("--now must look like 2026-03-04T09:15: {error}"),
                    2,
                );
            }
        },
        None => Utc::now().with_timezone(&timezone).naive_local(),
    };

    let awaiting = match args.awaiting.as_deref() {
        Some(raw) => match Awaiting::parse(raw) {
            Some(awaiting) => Some(awaiting),
            None => {
                return CommandResult::failure(
                    "resolve",
                    "invalid_argument",
                    format!("--awaiting must be `date` or `time`, got `{raw}`"),
                    2,
                );
            }
        },
        None => None,
    };

    let (resolver, classifier) = match (DateTimeResolver::new(), IntentClassifier::new()) {
        (Ok(resolver), Ok(classifier)) => (resolver, classifier),
        (Err(error), _) | (_, Err(error)) => {
            return CommandResult::failure("resolve", "pattern_compile", error.to_string(), 3);
        }
    };

    let resolution = resolver.resolve(&args.text, now);
    let time = resolver.extract_hour_minute(&args.text);
    let facts = MessageFacts {
        normalized: normalize(&args.text),
        date: resolution.date(),
        time,
        awaiting,
    };

    let report = ResolveReport {
        command: "resolve",
        status: "ok",
        input: args.text.clone(),
        timezone: timezone.name().to_string(),
        now: now.format(NOW_FORMAT).to_string(),
        resolution,
        time: time.map(|time| format!("{:02}:{:02}", time.hour(), time.minute())),
        awaiting: awaiting.map(Awaiting::as_str),
        intent: classifier.classify(&facts),
        title: derive_title(&args.text),
    };
    CommandResult::report("resolve", &report)
}

/// Falls back to the built-in default when the full config does not load.
fn configured_timezone() -> Tz {
    AppConfig::load(LoadOptions::default())
        .map(|config| config.assistant.timezone)
        .unwrap_or_else(|_| AppConfig::default().assistant.timezone)
}
