pub mod calendar;
pub mod conversation;
pub mod nlp;
