use std::sync::OnceLock;

use regex::Regex;

// Anchor, then the shortest run of text up to a clock time. Tried in order;
// the first anchor that matches anywhere wins.
const PHRASE_PATTERNS: &[&str] = &[
    r"(?i)tomorrow.*?\d{1,2}(?::\d{2})?\s?(?:AM|PM)?",
    r"(?i)today.*?\d{1,2}(?::\d{2})?\s?(?:AM|PM)?",
    r"(?i)on\s.*?\d{1,2}(?::\d{2})?\s?(?:AM|PM)?",
];

fn phrase_regexes() -> &'static [Regex] {
    static PHRASE_RES: OnceLock<Vec<Regex>> = OnceLock::new();
    PHRASE_RES.get_or_init(|| {
        PHRASE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("date phrase regex must compile"))
            .collect()
    })
}

/// Returns the part of `utterance` most likely to hold a date/time
/// expression, or the whole utterance when no anchored phrase is found.
pub fn extract_datetime_phrase(utterance: &str) -> &str {
    phrase_regexes()
        .iter()
        .find_map(|re| re.find(utterance))
        .map(|m| m.as_str())
        .unwrap_or(utterance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tomorrow_phrase() {
        let phrase = extract_datetime_phrase("Book tomorrow at 3 PM please");
        assert_eq!(phrase, "tomorrow at 3 PM");
    }

    #[test]
    fn test_today_phrase_with_minutes() {
        let phrase = extract_datetime_phrase("can we do Today around 10:45am");
        assert_eq!(phrase, "Today around 10:45am");
    }

    #[test]
    fn test_on_phrase() {
        let phrase = extract_datetime_phrase("Schedule a call on Friday at 4 PM");
        assert_eq!(phrase, "on Friday at 4 PM");
    }

    #[test]
    fn test_tomorrow_beats_today() {
        let phrase = extract_datetime_phrase("not today, tomorrow at 9 AM");
        assert_eq!(phrase, "tomorrow at 9 AM");
    }

    #[test]
    fn test_no_match_returns_input() {
        let input = "Book my project";
        assert_eq!(extract_datetime_phrase(input), input);
    }

    #[test]
    fn test_anchor_without_time_returns_input() {
        let input = "book something tomorrow";
        assert_eq!(extract_datetime_phrase(input), input);
    }
}
