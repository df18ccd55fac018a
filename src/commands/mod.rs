pub mod search;

pub use search::{collect_matches, run_search, SearchOutcome};
