use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A busy interval on the calendar, or a date-only marker for all-day events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeSlot {
    Timed {
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
    },
    AllDay {
        date: NaiveDate,
    },
}

impl TimeSlot {
    /// Machine-readable start: RFC 3339 for timed slots, `YYYY-MM-DD` for all-day ones.
    pub fn start_marker(&self) -> String {
        match self {
            TimeSlot::Timed { start, .. } => start.to_rfc3339(),
            TimeSlot::AllDay { date } => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn to_human_readable(&self) -> String {
        match self {
            TimeSlot::Timed { start, .. } => start.format("%a %d %b at %I:%M %p").to_string(),
            TimeSlot::AllDay { date } => format!("{} (all day)", date.format("%a %d %b")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_slot_rendering() {
        let slot = TimeSlot::Timed {
            start: DateTime::parse_from_rfc3339("2025-06-27T15:00:00+05:30").unwrap(),
            end: None,
        };
        assert_eq!(slot.start_marker(), "2025-06-27T15:00:00+05:30");
        assert_eq!(slot.to_human_readable(), "Fri 27 Jun at 03:00 PM");
    }

    #[test]
    fn test_all_day_slot_rendering() {
        let slot = TimeSlot::AllDay {
            date: NaiveDate::from_ymd_opt(2025, 6, 28).unwrap(),
        };
        assert_eq!(slot.start_marker(), "2025-06-28");
        assert_eq!(slot.to_human_readable(), "Sat 28 Jun (all day)");
    }
}
