use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::Instrument;

use crate::models::{
    BookingRequest, BookingResult, ConversationRequest, ConversationState, Intent, IntentContext,
    TimeSlot,
};
use crate::services::nlp::{classify, extract_datetime_phrase, DatePreference};
use crate::state::AppState;

pub const FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't process that. Try asking about your availability or booking a meeting.";
pub const UNRESOLVED_TIME_MESSAGE: &str =
    "I couldn't understand the date/time. Please say something like 'Book tomorrow at 3 PM'.";
pub const UNEXPECTED_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong on my side. Please try again in a moment.";

/// Runs one conversational turn and returns the reply text. Never fails:
/// every error is turned into a message for the user.
pub async fn process_message(state: &Arc<AppState>, request: ConversationRequest) -> String {
    let now = Utc::now().with_timezone(&state.config.utc_offset());
    let turn_id = uuid::Uuid::new_v4();

    run_turn(state, request, now)
        .instrument(tracing::info_span!("turn", %turn_id))
        .await
}

/// Drives the state machine from `Start` to `Terminal` with a fixed clock.
pub async fn run_turn(
    state: &Arc<AppState>,
    request: ConversationRequest,
    now: DateTime<FixedOffset>,
) -> String {
    let mut current = ConversationState::Start(request);
    loop {
        tracing::debug!(state = current.as_str(), "advancing turn");
        current = match current {
            ConversationState::Start(request) => {
                ConversationState::Classified(classify_request(request, now))
            }
            ConversationState::Classified(ctx) => {
                let response = dispatch(state, &ctx).await;
                ConversationState::Terminal {
                    intent: ctx.intent,
                    response,
                }
            }
            ConversationState::Terminal { intent, response } => {
                tracing::info!(intent = intent.as_str(), "turn complete");
                return response;
            }
        };
    }
}

fn classify_request(request: ConversationRequest, now: DateTime<FixedOffset>) -> IntentContext {
    let intent = classify(&request.utterance);
    tracing::info!(intent = ?intent, utterance = %request.utterance, "classified message");

    IntentContext {
        utterance: request.utterance,
        summary: request.summary,
        intent,
        now,
    }
}

/// Routes to exactly one handler. The handler runs as its own task so a
/// panic inside it still ends the turn with a reply.
async fn dispatch(state: &Arc<AppState>, ctx: &IntentContext) -> String {
    let state = Arc::clone(state);
    let ctx = ctx.clone();
    let handler = tokio::spawn(async move {
        match ctx.intent {
            Intent::Book => handle_book(&state, &ctx).await,
            Intent::Check => handle_check(&state, &ctx).await,
            Intent::Unknown => handle_fallback(&ctx),
        }
    });

    match handler.await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "intent handler aborted");
            UNEXPECTED_FAILURE_MESSAGE.to_string()
        }
    }
}

pub async fn handle_book(state: &AppState, ctx: &IntentContext) -> String {
    let phrase = extract_datetime_phrase(&ctx.utterance);
    let Some(start) = state
        .resolver
        .resolve(phrase, ctx.now, DatePreference::Future)
    else {
        tracing::info!(phrase, "could not resolve a date/time");
        return UNRESOLVED_TIME_MESSAGE.to_string();
    };

    let booking = BookingRequest::new(
        ctx.summary.as_deref(),
        &state.config.default_meeting_summary,
        start,
        state.config.meeting_duration_minutes,
    );

    let result = match state.calendar.create_event(&booking).await {
        Ok(link) => BookingResult::Booked { link },
        Err(e) => {
            tracing::error!(error = %e, "failed to create calendar event");
            BookingResult::Failed {
                reason: e.to_string(),
            }
        }
    };

    render_booking(&booking, &result)
}

pub fn render_booking(booking: &BookingRequest, result: &BookingResult) -> String {
    match result {
        BookingResult::Booked { link } => format!(
            "Booked for {} ({}).\nLink: {link}",
            booking.start.format("%A at %I:%M %p"),
            booking.summary,
        ),
        BookingResult::Failed { reason } => format!(
            "Booking for {} failed: {reason}",
            booking.start.format("%A at %I:%M %p"),
        ),
    }
}

pub async fn handle_check(state: &AppState, ctx: &IntentContext) -> String {
    let days = state.config.lookahead_days;
    let window_end = ctx.now + Duration::days(days);

    match state.calendar.list_busy(ctx.now, window_end).await {
        Ok(slots) => render_availability(&slots, days),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch busy slots");
            format!("Failed to fetch calendar: {e}")
        }
    }
}

pub fn render_availability(slots: &[TimeSlot], days: i64) -> String {
    if slots.is_empty() {
        let unit = if days == 1 { "day" } else { "days" };
        return format!("You're fully available in the next {days} {unit}!");
    }

    let lines: Vec<String> = slots
        .iter()
        .map(|slot| format!("• {}", slot.to_human_readable()))
        .collect();
    format!("You are busy at:\n{}", lines.join("\n"))
}

pub fn handle_fallback(_ctx: &IntentContext) -> String {
    FALLBACK_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-06-27T15:00:00+05:30").unwrap()
    }

    #[test]
    fn test_render_booked() {
        let booking = BookingRequest::new(None, "Meeting with Agenda", start(), 30);
        let text = render_booking(
            &booking,
            &BookingResult::Booked {
                link: "https://calendar.example/e/1".to_string(),
            },
        );
        assert_eq!(
            text,
            "Booked for Friday at 03:00 PM (Meeting with Agenda).\nLink: https://calendar.example/e/1"
        );
    }

    #[test]
    fn test_render_failed() {
        let booking = BookingRequest::new(None, "Meeting", start(), 30);
        let text = render_booking(
            &booking,
            &BookingResult::Failed {
                reason: "quota exceeded".to_string(),
            },
        );
        assert_eq!(text, "Booking for Friday at 03:00 PM failed: quota exceeded");
    }

    #[test]
    fn test_render_availability_empty() {
        assert_eq!(
            render_availability(&[], 2),
            "You're fully available in the next 2 days!"
        );
        assert_eq!(
            render_availability(&[], 1),
            "You're fully available in the next 1 day!"
        );
    }

    #[test]
    fn test_render_availability_lists_slots() {
        let slots = vec![
            TimeSlot::Timed {
                start: start(),
                end: None,
            },
            TimeSlot::AllDay {
                date: NaiveDate::from_ymd_opt(2025, 6, 28).unwrap(),
            },
        ];
        assert_eq!(
            render_availability(&slots, 2),
            "You are busy at:\n• Fri 27 Jun at 03:00 PM\n• Sat 28 Jun (all day)"
        );
    }

    #[test]
    fn test_fallback_is_static() {
        let ctx = IntentContext {
            utterance: "hello".to_string(),
            summary: None,
            intent: Intent::Unknown,
            now: start(),
        };
        assert_eq!(handle_fallback(&ctx), FALLBACK_MESSAGE);
    }
}
