mod controller;
mod policy;
mod session;

pub use controller::{SuggestionController, UiInput};
pub use policy::{EnterPolicy, Key, SelectAction};
pub use session::{ListView, Suggestion, SuggestionSession};

use async_trait::async_trait;

use crate::api::ApiError;

/// Anything that can answer "which companies match this text".
#[async_trait]
pub trait SuggestionSource: Send + Sync + 'static {
    /// Ordered, best match first. An empty list is a normal answer.
    async fn lookup(&self, query: &str) -> Result<Vec<Suggestion>, ApiError>;
}
