mod fallback;
mod fetcher;
mod question_source;

pub use fallback::fallback_bank;
pub use fetcher::{Fetcher, HttpFetcher, parse_bank};
pub use question_source::{BankOrigin, QuestionSource, ResolvedBank};
