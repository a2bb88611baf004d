use crate::models::Intent;

const BOOK_KEYWORDS: &[&str] = &["book", "schedule"];
const CHECK_KEYWORDS: &[&str] = &["free", "available", "meeting"];

/// Keyword intent classification. Booking keywords win over availability
/// keywords, so "book a time to discuss availability" is a booking.
pub fn classify(utterance: &str) -> Intent {
    let text = utterance.to_lowercase();

    if BOOK_KEYWORDS.iter().any(|k| text.contains(k)) {
        Intent::Book
    } else if CHECK_KEYWORDS.iter().any(|k| text.contains(k)) {
        Intent::Check
    } else {
        Intent::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_keywords() {
        assert_eq!(classify("Book a slot"), Intent::Book);
        assert_eq!(classify("please SCHEDULE a call"), Intent::Book);
        assert_eq!(classify("rebooking needed"), Intent::Book);
    }

    #[test]
    fn test_book_wins_over_check() {
        assert_eq!(classify("Book a meeting tomorrow at 11 PM"), Intent::Book);
        assert_eq!(
            classify("book a time to discuss availability"),
            Intent::Book
        );
        assert_eq!(classify("Am I free? If so schedule it"), Intent::Book);
    }

    #[test]
    fn test_check_keywords() {
        assert_eq!(classify("Is there any meeting today?"), Intent::Check);
        assert_eq!(classify("Am I FREE on Friday"), Intent::Check);
        assert_eq!(classify("are you available"), Intent::Check);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("hello there"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
    }
}
