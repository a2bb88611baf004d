use std::sync::OnceLock;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Weekday,
};
use regex::Regex;

/// How to read phrases that could point at more than one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreference {
    /// Bare clock times and weekdays resolve to their next occurrence.
    #[default]
    Future,
    /// Bare clock times and weekdays resolve within the current day/week.
    Current,
}

/// Converts a natural-language phrase into an absolute instant relative to
/// `now`. `None` means the phrase could not be resolved.
pub trait DateResolver: Send + Sync {
    fn resolve(
        &self,
        phrase: &str,
        now: DateTime<FixedOffset>,
        preference: DatePreference,
    ) -> Option<DateTime<FixedOffset>>;
}

/// Rule-based resolver for the phrasings people use when asking for a
/// meeting: day words, weekdays, calendar dates, clock times and
/// `in N units` offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseDateResolver;

impl DateResolver for PhraseDateResolver {
    fn resolve(
        &self,
        phrase: &str,
        now: DateTime<FixedOffset>,
        preference: DatePreference,
    ) -> Option<DateTime<FixedOffset>> {
        let text = phrase.to_lowercase();

        if let Some(offset) = parse_relative_offset(&text) {
            return now
                .checked_add_signed(offset)?
                .with_second(0)?
                .with_nanosecond(0);
        }

        let time = match parse_clock_time(&text) {
            Parsed::Found(t) => Some(t),
            Parsed::Missing => None,
            Parsed::Invalid => return None,
        };
        let today = now.date_naive();
        let anchor = match parse_day_anchor(&text, today) {
            Parsed::Found(a) => Some(a),
            Parsed::Missing => None,
            Parsed::Invalid => return None,
        };

        let future = preference == DatePreference::Future;
        let local_now = now.naive_local();

        let naive = match (anchor, time) {
            (None, None) => return None,
            (None, Some(t)) => {
                let candidate = today.and_time(t);
                if future && candidate <= local_now {
                    candidate + Duration::days(1)
                } else {
                    candidate
                }
            }
            (Some(anchor), t) => {
                let candidate = anchor
                    .date
                    .and_time(t.unwrap_or_else(|| anchor.default_time()));
                if future && candidate <= local_now {
                    anchor.roll_forward(candidate)?
                } else {
                    candidate
                }
            }
        };

        now.offset().from_local_datetime(&naive).single()
    }
}

enum Parsed<T> {
    Found(T),
    Missing,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorKind {
    /// today, tomorrow, ISO dates, dates with a year, `next <weekday>`
    Fixed,
    Tonight,
    Weekday,
    MonthDayNoYear,
}

#[derive(Debug, Clone, Copy)]
struct DayAnchor {
    date: NaiveDate,
    kind: AnchorKind,
}

impl DayAnchor {
    fn fixed(date: NaiveDate) -> Self {
        Self {
            date,
            kind: AnchorKind::Fixed,
        }
    }

    fn default_time(&self) -> NaiveTime {
        let hour = if self.kind == AnchorKind::Tonight { 20 } else { 9 };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
    }

    /// Next occurrence of an ambiguous anchor that has already passed.
    /// Explicit anchors are kept as written.
    fn roll_forward(&self, candidate: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.kind {
            AnchorKind::Weekday => Some(candidate + Duration::days(7)),
            AnchorKind::MonthDayNoYear => {
                let date = candidate.date().with_year(candidate.year() + 1)?;
                Some(date.and_time(candidate.time()))
            }
            AnchorKind::Fixed | AnchorKind::Tonight => Some(candidate),
        }
    }
}

const MONTH_ALTERNATION: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

fn relative_offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bin\s+(\d{1,6})\s+(minutes?|mins?|hours?|hrs?|days?|weeks?|wks?)\b")
            .expect("relative offset regex must compile")
    })
}

fn meridiem_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b\.?")
            .expect("meridiem time regex must compile")
    })
}

fn clock_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("clock time regex must compile"))
}

fn at_hour_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bat\s+(\d{1,2})\b").expect("at-hour regex must compile"))
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex must compile")
    })
}

fn month_day_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b{MONTH_ALTERNATION}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}}))?"
        ))
        .expect("month-day regex must compile")
    })
}

fn day_month_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH_ALTERNATION}\b(?:,?\s+(\d{{4}}))?"
        ))
        .expect("day-month regex must compile")
    })
}

fn weekday_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:(next|this)\s+)?(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thu|friday|fri|saturday|sat|sunday|sun)\b",
        )
        .expect("weekday regex must compile")
    })
}

fn parse_relative_offset(text: &str) -> Option<Duration> {
    let caps = relative_offset_regex().captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    let unit = &caps[2];

    let offset = if unit.starts_with("mi") {
        Duration::minutes(amount)
    } else if unit.starts_with('h') {
        Duration::hours(amount)
    } else if unit.starts_with('d') {
        Duration::days(amount)
    } else {
        Duration::weeks(amount)
    };
    Some(offset)
}

fn parse_clock_time(text: &str) -> Parsed<NaiveTime> {
    if let Some(caps) = meridiem_time_regex().captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let minute: u32 = caps
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse().ok())
            .unwrap_or(u32::MAX);
        if !(1..=12).contains(&hour) {
            return Parsed::Invalid;
        }
        let hour = match (&caps[3], hour) {
            ("a", 12) => 0,
            ("a", h) => h,
            ("p", 12) => 12,
            (_, h) => h + 12,
        };
        return to_time(hour, minute);
    }

    if let Some(caps) = clock_time_regex().captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let minute: u32 = caps[2].parse().unwrap_or(u32::MAX);
        return to_time(hour, minute);
    }

    if has_word(text, "noon") || has_word(text, "midday") {
        return to_time(12, 0);
    }
    if has_word(text, "midnight") {
        return to_time(0, 0);
    }

    if let Some(caps) = at_hour_regex().captures(text) {
        let hour: u32 = caps[1].parse().unwrap_or(u32::MAX);
        return to_time(hour, 0);
    }

    Parsed::Missing
}

fn to_time(hour: u32, minute: u32) -> Parsed<NaiveTime> {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => Parsed::Found(t),
        None => Parsed::Invalid,
    }
}

fn parse_day_anchor(text: &str, today: NaiveDate) -> Parsed<DayAnchor> {
    if text.contains("day after tomorrow") {
        return Parsed::Found(DayAnchor::fixed(today + Duration::days(2)));
    }
    if has_word(text, "tomorrow") {
        return Parsed::Found(DayAnchor::fixed(today + Duration::days(1)));
    }
    if has_word(text, "tonight") {
        return Parsed::Found(DayAnchor {
            date: today,
            kind: AnchorKind::Tonight,
        });
    }
    if has_word(text, "today") {
        return Parsed::Found(DayAnchor::fixed(today));
    }

    if let Some(caps) = iso_date_regex().captures(text) {
        let parts = (caps[1].parse(), caps[2].parse(), caps[3].parse());
        return match parts {
            (Ok(y), Ok(m), Ok(d)) => date_anchor(y, m, d, AnchorKind::Fixed),
            _ => Parsed::Invalid,
        };
    }

    let month_day = month_day_regex()
        .captures(text)
        .map(|c| (c.get(1), c.get(2), c.get(3)))
        .or_else(|| {
            day_month_regex()
                .captures(text)
                .map(|c| (c.get(2), c.get(1), c.get(3)))
        });
    if let Some((Some(month), Some(day), year)) = month_day {
        let Some(month) = month_number(month.as_str()) else {
            return Parsed::Invalid;
        };
        let Ok(day) = day.as_str().parse() else {
            return Parsed::Invalid;
        };
        return match year.map(|y| y.as_str().parse::<i32>()) {
            Some(Ok(year)) => date_anchor(year, month, day, AnchorKind::Fixed),
            Some(Err(_)) => Parsed::Invalid,
            None => date_anchor(today.year(), month, day, AnchorKind::MonthDayNoYear),
        };
    }

    if let Some(caps) = weekday_regex().captures(text) {
        let Some(target) = weekday_from_name(&caps[2]) else {
            return Parsed::Invalid;
        };
        let days_ahead = (target.num_days_from_monday() + 7
            - today.weekday().num_days_from_monday())
            % 7;
        let is_next = caps.get(1).is_some_and(|m| m.as_str() == "next");

        return if is_next {
            let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
            Parsed::Found(DayAnchor::fixed(today + Duration::days(days_ahead.into())))
        } else {
            Parsed::Found(DayAnchor {
                date: today + Duration::days(days_ahead.into()),
                kind: AnchorKind::Weekday,
            })
        };
    }

    Parsed::Missing
}

fn date_anchor(year: i32, month: u32, day: u32, kind: AnchorKind) -> Parsed<DayAnchor> {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Parsed::Found(DayAnchor { date, kind }),
        None => Parsed::Invalid,
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wednesday 2025-06-25 10:00 IST
    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-06-25T10:00:00+05:30").unwrap()
    }

    fn resolve(phrase: &str) -> Option<String> {
        PhraseDateResolver
            .resolve(phrase, now(), DatePreference::Future)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
    }

    fn at(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_tomorrow_with_meridiem() {
        assert_eq!(resolve("tomorrow at 3 PM"), at("2025-06-26 15:00"));
        assert_eq!(resolve("Tomorrow at 11 PM"), at("2025-06-26 23:00"));
        assert_eq!(resolve("tomorrow at 12 am"), at("2025-06-26 00:00"));
        assert_eq!(resolve("tomorrow 9:30 a.m."), at("2025-06-26 09:30"));
    }

    #[test]
    fn test_bare_time_prefers_future() {
        assert_eq!(resolve("3 PM"), at("2025-06-25 15:00"));
        assert_eq!(resolve("9 AM"), at("2025-06-26 09:00"));
        assert_eq!(resolve("at 10"), at("2025-06-26 10:00"));
    }

    #[test]
    fn test_current_preference_keeps_today() {
        let resolved = PhraseDateResolver
            .resolve("9 AM", now(), DatePreference::Current)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string());
        assert_eq!(resolved, at("2025-06-25 09:00"));
    }

    #[test]
    fn test_explicit_today_is_kept_even_if_past() {
        assert_eq!(resolve("today at 9 AM"), at("2025-06-25 09:00"));
        assert_eq!(resolve("today around 10:45am"), at("2025-06-25 10:45"));
    }

    #[test]
    fn test_tonight_and_day_after_tomorrow() {
        assert_eq!(resolve("tonight"), at("2025-06-25 20:00"));
        assert_eq!(resolve("day after tomorrow at 10:15"), at("2025-06-27 10:15"));
        assert_eq!(resolve("tomorrow at noon"), at("2025-06-26 12:00"));
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(resolve("friday"), at("2025-06-27 09:00"));
        assert_eq!(resolve("on Friday at 4 PM"), at("2025-06-27 16:00"));
        assert_eq!(resolve("wednesday at 11am"), at("2025-06-25 11:00"));
        assert_eq!(resolve("wednesday at 9am"), at("2025-07-02 09:00"));
        assert_eq!(resolve("next wednesday"), at("2025-07-02 09:00"));
        assert_eq!(resolve("next fri at 2pm"), at("2025-06-27 14:00"));
    }

    #[test]
    fn test_calendar_dates() {
        assert_eq!(resolve("2025-07-01 at 14:30"), at("2025-07-01 14:30"));
        assert_eq!(resolve("on July 4th at 5 pm"), at("2025-07-04 17:00"));
        assert_eq!(resolve("June 20 at 10am"), at("2026-06-20 10:00"));
        assert_eq!(resolve("20th June 2025 at 10am"), at("2025-06-20 10:00"));
        assert_eq!(resolve("3rd of August"), at("2025-08-03 09:00"));
    }

    #[test]
    fn test_relative_offsets() {
        assert_eq!(resolve("in 2 hours"), at("2025-06-25 12:00"));
        assert_eq!(resolve("in 45 mins"), at("2025-06-25 10:45"));
        assert_eq!(resolve("in 3 days"), at("2025-06-28 10:00"));
    }

    #[test]
    fn test_offset_is_preserved() {
        let resolved = PhraseDateResolver
            .resolve("tomorrow at 3 PM", now(), DatePreference::Future)
            .unwrap();
        assert_eq!(resolved.to_rfc3339(), "2025-06-26T15:00:00+05:30");
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve("Book something"), None);
        assert_eq!(resolve("Book my project"), None);
        assert_eq!(resolve("tomorrow at 25 PM"), None);
        assert_eq!(resolve("February 30"), None);
        assert_eq!(resolve("at 27:00"), None);
    }
}
