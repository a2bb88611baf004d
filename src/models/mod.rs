pub mod availability;
pub mod booking;
pub mod conversation;
pub mod intent;

pub use availability::TimeSlot;
pub use booking::{BookingRequest, BookingResult};
pub use conversation::{ConversationRequest, ConversationState, IntentContext};
pub use intent::Intent;
