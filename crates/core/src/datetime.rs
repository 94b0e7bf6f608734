//! Spanish natural-language date and time-of-day resolution.
//!
//! All matching happens on [`normalize`]d text, so accents and case never
//! matter. Date forms are tried from most to least explicit: numeric
//! `dd/mm[/yy]`, verbose `"<dia> de <mes> [de] [año]"`, the relative words
//! (`pasado mañana`, `mañana`, `hoy`) and finally weekday names.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

const MONTHS: [(&str, u32); 13] = [
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("lunes", Weekday::Mon),
    ("martes", Weekday::Tue),
    ("miercoles", Weekday::Wed),
    ("jueves", Weekday::Thu),
    ("viernes", Weekday::Fri),
    ("sabado", Weekday::Sat),
    ("domingo", Weekday::Sun),
];

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn local_now(&self, timezone: Tz) -> NaiveDateTime {
        self.now().with_timezone(&timezone).naive_local()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A validated time-of-day (hour 0..=23, minute 0..=59).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourMinute(NaiveTime);

impl HourMinute {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(self) -> u32 {
        chrono::Timelike::hour(&self.0)
    }

    pub fn minute(self) -> u32 {
        chrono::Timelike::minute(&self.0)
    }

    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
    /// "de la noche": evening hours, but 12 is midnight and 1 to 5 are small hours.
    Night,
}

impl Meridiem {
    fn from_token(token: &str) -> Option<Self> {
        if token.contains("manana") || token.contains("madrugada") {
            return Some(Self::Am);
        }
        if token.contains("noche") {
            return Some(Self::Night);
        }
        if token.contains("tarde") {
            return Some(Self::Pm);
        }
        match token.trim_start().chars().next() {
            Some('a') => Some(Self::Am),
            Some('p') => Some(Self::Pm),
            _ => None,
        }
    }

    fn apply(self, hour: u32) -> u32 {
        match self {
            Self::Am if hour == 12 => 0,
            Self::Am => hour,
            Self::Pm if hour >= 12 => hour,
            Self::Pm => hour + 12,
            Self::Night => match hour {
                12 => 0,
                1..=5 => hour,
                6..=11 => hour + 12,
                _ => hour,
            },
        }
    }
}

/// Outcome of resolving free text against a reference "now".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    NotFound,
    DateOnly(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Resolution {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::NotFound => None,
            Self::DateOnly(date) => Some(*date),
            Self::DateTime(instant) => Some(instant.date()),
        }
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(instant) => Some(*instant),
            _ => None,
        }
    }
}

pub struct DateTimeResolver {
    numeric_date: Regex,
    verbose_date: Regex,
    day_after_tomorrow: Regex,
    tomorrow: Regex,
    today: Regex,
    weekday: Regex,
    clock_time: Regex,
    meridiem_hour: Regex,
    spoken_hour: Regex,
    suffixed_hour: Regex,
    bare_hour: Regex,
}

impl DateTimeResolver {
    pub fn new() -> Result<Self, regex::Error> {
        let months = MONTHS.iter().map(|(name, _)| *name).collect::<Vec<_>>().join("|");
        let weekdays = WEEKDAYS.iter().map(|(name, _)| *name).collect::<Vec<_>>().join("|");
        let meridiem = r"a\.?\s?m\b\.?|p\.?\s?m\b\.?";
        let period = r"(?:de|en|por)\s+la\s+(?:manana|madrugada|tarde|noche)\b";

        Ok(Self {
            numeric_date: Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}|\d{2}))?\b")?,
            verbose_date: Regex::new(&format!(
                r"\b(\d{{1,2}})\s+de\s+({months})\b(?:\s+(?:del?\s+)?(\d{{4}})\b|\s+del?\s+(\d{{2}})\b)?"
            ))?,
            day_after_tomorrow: Regex::new(r"\bpasado\s+manana\b")?,
            tomorrow: Regex::new(r"\b(la\s+)?manana\b")?,
            today: Regex::new(r"\bhoy\b")?,
            weekday: Regex::new(&format!(r"\b({weekdays})\b"))?,
            clock_time: Regex::new(&format!(r"\b(\d{{1,2}}):(\d{{2}})\b(?:\s*({meridiem}|{period}))?"))?,
            meridiem_hour: Regex::new(r"\b(\d{1,2})\s*(a\.?\s?m|p\.?\s?m)\b")?,
            spoken_hour: Regex::new(&format!(
                r"\b(?:a\s+)?las?\s+(\d{{1,2}})\b(?:\s*(?:hrs?|horas?)\b)?(?:\s*({meridiem})|\s+({period}))?"
            ))?,
            suffixed_hour: Regex::new(r"\b(\d{1,2})\s*(?:hrs?|h)\b")?,
            bare_hour: Regex::new(r"^\W*(\d{1,2})(?::(\d{2}))?\s*(?:hrs?|h)?\W*$")?,
        })
    }

    /// Resolves `text` against the local wall-clock `now`.
    ///
    /// Finding no date is reported as [`Resolution::NotFound`] even when a
    /// time-of-day is present; use [`Self::extract_hour_minute`] for that.
    pub fn resolve(&self, text: &str, now: NaiveDateTime) -> Resolution {
        let normalized = normalize(text);
        let Some(date) = self.find_date(&normalized, now.date()) else {
            return Resolution::NotFound;
        };
        match self.find_time(&normalized) {
            Some(time) => Resolution::DateTime(time.on(date)),
            None => Resolution::DateOnly(date),
        }
    }

    pub fn resolve_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.find_date(&normalize(text), today)
    }

    pub fn extract_hour_minute(&self, text: &str) -> Option<HourMinute> {
        self.find_time(&normalize(text))
    }

    pub fn has_time_hint(&self, text: &str) -> bool {
        self.extract_hour_minute(text).is_some()
    }

    fn find_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.numeric_form(text, today)
            .or_else(|| self.verbose_form(text, today))
            .or_else(|| self.relative_date(text, today))
            .or_else(|| self.next_weekday(text, today))
    }

    fn numeric_form(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.numeric_date.captures_iter(text).find_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = expand_year(caps.get(3).map(|m| m.as_str()), today)?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    }

    fn verbose_form(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        self.verbose_date.captures_iter(text).find_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = MONTHS.iter().find(|(name, _)| *name == &caps[2]).map(|(_, n)| *n)?;
            let full = caps.get(0)?;
            // "de 10:30" or "de 10 a 11" carries an hour, not a two-digit year.
            let raw_year = match (caps.get(3), caps.get(4)) {
                (Some(year), _) => Some(year.as_str()),
                (None, Some(short)) if !reads_as_hour(&text[full.end()..]) => {
                    Some(short.as_str()).filter(|raw| {
                        expand_year(Some(*raw), today).is_some_and(|year| year >= today.year())
                    })
                }
                _ => None,
            };
            let year = expand_year(raw_year, today)?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    }

    fn relative_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        if self.day_after_tomorrow.is_match(text) {
            return Some(today + Duration::days(2));
        }
        // "la mañana" is the morning, not tomorrow.
        let tomorrow = self.tomorrow.captures_iter(text).any(|caps| caps.get(1).is_none());
        if tomorrow {
            return Some(today + Duration::days(1));
        }
        self.today.is_match(text).then_some(today)
    }

    fn next_weekday(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let caps = self.weekday.captures(text)?;
        let target = WEEKDAYS.iter().find(|(name, _)| *name == &caps[1]).map(|(_, day)| *day)?;
        let ahead = (7 + target.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
        let ahead = if ahead == 0 { 7 } else { ahead };
        Some(today + Duration::days(i64::from(ahead)))
    }

    fn find_time(&self, text: &str) -> Option<HourMinute> {
        let all = |pattern: &Regex, minute: Option<usize>, meridiem: &[usize]| {
            pattern.captures_iter(text).find_map(|caps| hour_minute(&caps, minute, meridiem))
        };

        all(&self.clock_time, Some(2), &[3])
            .or_else(|| all(&self.meridiem_hour, None, &[2]))
            .or_else(|| all(&self.spoken_hour, None, &[2, 3]))
            .or_else(|| all(&self.suffixed_hour, None, &[]))
            .or_else(|| {
                let caps = self.bare_hour.captures(text.trim())?;
                hour_minute(&caps, Some(2), &[])
            })
    }
}

fn hour_minute(
    caps: &Captures<'_>,
    minute_group: Option<usize>,
    meridiem_groups: &[usize],
) -> Option<HourMinute> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match minute_group.and_then(|group| caps.get(group)) {
        Some(raw) => raw.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = meridiem_groups
        .iter()
        .filter_map(|group| caps.get(*group))
        .find_map(|token| Meridiem::from_token(token.as_str()));
    let hour = match meridiem {
        Some(meridiem) => meridiem.apply(hour),
        None => hour,
    };
    HourMinute::new(hour, minute)
}

fn reads_as_hour(rest: &str) -> bool {
    if rest.starts_with(':') {
        return true;
    }
    let next = rest.split_whitespace().next().unwrap_or_default().trim_end_matches('.');
    matches!(next, "a" | "am" | "pm" | "a.m" | "p.m" | "h" | "hr" | "hrs" | "hora" | "horas")
}

fn expand_year(raw: Option<&str>, today: NaiveDate) -> Option<i32> {
    let Some(raw) = raw else {
        return Some(today.year());
    };
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() <= 2 { 2000 + year } else { year })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

    use super::{Clock, DateTimeResolver, FixedClock, HourMinute, Resolution};

    // Wednesday.
    fn now() -> NaiveDateTime {
        date(2026, 3, 4).and_hms_opt(9, 15, 0).expect("valid time")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn resolver() -> DateTimeResolver {
        DateTimeResolver::new().expect("patterns compile")
    }

    fn hm(hour: u32, minute: u32) -> Option<HourMinute> {
        HourMinute::new(hour, minute)
    }

    #[test]
    fn manana_resolves_to_following_day_without_time() {
        let resolver = resolver();
        for text in ["mañana", "Reunión mañana con Pedro", "MANANA", "llamar al banco mañana"] {
            assert_eq!(resolver.resolve(text, now()), Resolution::DateOnly(date(2026, 3, 5)));
        }
    }

    #[test]
    fn la_manana_is_a_time_of_day_not_a_date() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("el lunes en la mañana", now()),
            Resolution::DateOnly(date(2026, 3, 9))
        );
        assert_eq!(resolver.resolve("por la mañana", now()), Resolution::NotFound);
    }

    #[test]
    fn pasado_manana_wins_over_manana() {
        assert_eq!(
            resolver().resolve("junta pasado mañana", now()),
            Resolution::DateOnly(date(2026, 3, 6))
        );
    }

    #[test]
    fn hoy_resolves_to_today() {
        assert_eq!(resolver().resolve_date("¿qué tengo hoy?", now().date()), Some(now().date()));
    }

    #[test]
    fn weekdays_resolve_to_next_occurrence_never_today() {
        let resolver = resolver();
        let today = now().date();
        for name in ["lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo"] {
            let resolved = resolver
                .resolve_date(&format!("cita el {name}"), today)
                .unwrap_or_else(|| panic!("{name} should resolve"));
            let ahead = (resolved - today).num_days();
            assert!((1..=7).contains(&ahead), "{name} resolved {ahead} days ahead");
        }

        assert_eq!(resolver.resolve_date("el miercoles", today), Some(date(2026, 3, 11)));
        assert_eq!(
            resolver.resolve_date("el viernes", today).map(|day| day.weekday()),
            Some(chrono::Weekday::Fri)
        );
    }

    #[test]
    fn numeric_dates_fill_missing_and_short_years() {
        let resolver = resolver();
        let today = now().date();
        assert_eq!(resolver.resolve_date("15/03", today), Some(date(2026, 3, 15)));
        assert_eq!(resolver.resolve_date("el 15-03-27", today), Some(date(2027, 3, 15)));
        assert_eq!(resolver.resolve_date("1/12/2028", today), Some(date(2028, 12, 1)));
        assert_eq!(resolver.resolve_date("31/02", today), None);
    }

    #[test]
    fn verbose_dates_are_accent_insensitive() {
        let resolver = resolver();
        let today = now().date();
        assert_eq!(resolver.resolve_date("20 de septiembre", today), Some(date(2026, 9, 20)));
        assert_eq!(resolver.resolve_date("5 de Setiembre del 2027", today), Some(date(2027, 9, 5)));
        assert_eq!(resolver.resolve_date("1 de MARZO de 28", today), Some(date(2028, 3, 1)));
        assert_eq!(
            resolver.resolve("15 de marzo de 10:30", now()),
            Resolution::DateTime(date(2026, 3, 15).and_hms_opt(10, 30, 0).expect("valid"))
        );
    }

    #[test]
    fn short_year_is_not_read_from_an_hour_range() {
        let resolver = resolver();
        let today = now().date();
        assert_eq!(resolver.resolve_date("15 de marzo de 10 a 11", today), Some(date(2026, 3, 15)));
        assert_eq!(resolver.resolve_date("15 de marzo de 10 hrs", today), Some(date(2026, 3, 15)));
        assert_eq!(resolver.resolve_date("15 de marzo del 24", today), Some(date(2026, 3, 15)));
        assert_eq!(resolver.resolve_date("15 de marzo del 27", today), Some(date(2027, 3, 15)));
    }

    #[test]
    fn explicit_dates_take_precedence_over_relative_words() {
        assert_eq!(
            resolver().resolve_date("mañana no, el 20/03", now().date()),
            Some(date(2026, 3, 20))
        );
    }

    #[test]
    fn extract_hour_minute_handles_clock_and_meridiem_forms() {
        let resolver = resolver();
        assert_eq!(resolver.extract_hour_minute("14:30"), hm(14, 30));
        assert_eq!(resolver.extract_hour_minute("2 pm"), hm(14, 0));
        assert_eq!(resolver.extract_hour_minute("2pm"), hm(14, 0));
        assert_eq!(resolver.extract_hour_minute("9:15 a.m."), hm(9, 15));
        assert_eq!(resolver.extract_hour_minute("12 am"), hm(0, 0));
        assert_eq!(resolver.extract_hour_minute("12 pm"), hm(12, 0));
        assert_eq!(resolver.extract_hour_minute("3:45 p.m."), hm(15, 45));
    }

    #[test]
    fn extract_hour_minute_handles_spanish_forms() {
        let resolver = resolver();
        assert_eq!(resolver.extract_hour_minute("a las 5 de la tarde"), hm(17, 0));
        assert_eq!(resolver.extract_hour_minute("a la 1"), hm(1, 0));
        assert_eq!(resolver.extract_hour_minute("mañana a las 9"), hm(9, 0));
        assert_eq!(resolver.extract_hour_minute("a las 8 de la noche"), hm(20, 0));
        assert_eq!(resolver.extract_hour_minute("a las 12 de la noche"), hm(0, 0));
        assert_eq!(resolver.extract_hour_minute("a las 2 de la noche"), hm(2, 0));
        assert_eq!(resolver.extract_hour_minute("a las 12 de la tarde"), hm(12, 0));
        assert_eq!(resolver.extract_hour_minute("15 hrs"), hm(15, 0));
        assert_eq!(resolver.extract_hour_minute("10"), hm(10, 0));
    }

    #[test]
    fn extract_hour_minute_rejects_out_of_range_values() {
        let resolver = resolver();
        assert_eq!(resolver.extract_hour_minute("25:00"), None);
        assert_eq!(resolver.extract_hour_minute("7:61"), None);
        assert_eq!(resolver.extract_hour_minute("a las 30"), None);
        assert_eq!(resolver.extract_hour_minute("comprar pan"), None);
        assert!(!resolver.has_time_hint("reunión con ventas"));
        assert!(resolver.has_time_hint("reunión a las 4 pm"));
    }

    #[test]
    fn full_date_and_time_resolve_to_an_instant() {
        let resolved = resolver().resolve("Reunión con Ana mañana a las 10:30", now());
        assert_eq!(
            resolved,
            Resolution::DateTime(date(2026, 3, 5).and_hms_opt(10, 30, 0).expect("valid"))
        );
        assert_eq!(resolved.date(), Some(date(2026, 3, 5)));
    }

    #[test]
    fn time_without_date_is_not_found() {
        assert_eq!(resolver().resolve("a las 3 pm", now()), Resolution::NotFound);
    }

    #[test]
    fn clock_reports_local_wall_time() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid instant");
        let local = FixedClock(instant).local_now(chrono_tz::America::Santiago);
        assert_eq!(local, date(2026, 3, 4).and_hms_opt(9, 0, 0).expect("valid"));
    }
}
