pub mod dto;
pub mod feed_client;

pub use dto::{FeedMessage, parse_feed_message};
pub use feed_client::{FeedHandle, MarketFeedClient};
