pub mod extract;
pub mod intent;
pub mod resolver;

pub use extract::extract_datetime_phrase;
pub use intent::classify;
pub use resolver::{DatePreference, DateResolver, PhraseDateResolver};
