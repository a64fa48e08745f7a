pub mod block;
pub mod normalizer;
pub mod processor;
pub mod truncate;

pub use block::{Confidence, ParsedBlock, ReviewBlock, collect_source_urls, parse_review_block};
pub use normalizer::normalize_agent_output;
pub use truncate::{MAX_COMMENT_LENGTH, truncate_text};
