//! Vendor GPS feed adapter (Traccar-compatible REST API).

mod dto;
mod http_feed;

pub use http_feed::HttpGpsFeed;
