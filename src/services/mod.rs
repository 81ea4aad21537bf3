pub mod aggregator;
pub mod feed_session;
pub mod synthetic;

pub use aggregator::{AnsweredBy, FallbackAggregator, FetchOutcome};
pub use feed_session::{FeedIntent, FeedSession, FeedUpdate};
pub use synthetic::SyntheticNewsGenerator;
