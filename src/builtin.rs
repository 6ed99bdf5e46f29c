pub const FEED_CSS: &str = include_str!("feed.css");
