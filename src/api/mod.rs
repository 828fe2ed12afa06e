mod client;
mod error;

pub use client::{ApiClient, MarketSnapshot};
pub use error::ApiError;
