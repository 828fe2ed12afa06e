mod clock;
mod indicator;
mod poller;
mod session;

#[cfg(test)]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use indicator::{IndexMove, Indicator, IndicatorSource};
pub use poller::{poll_once, Evaluation, StatusPoller, TimerId};
pub use session::{exchange_time, session_state, SessionState, IST_OFFSET_SECS};

use async_trait::async_trait;

use crate::api::{ApiError, MarketSnapshot};

/// Remote market status, e.g. the snapshot endpoint.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn snapshot(&self) -> Result<MarketSnapshot, ApiError>;
}
