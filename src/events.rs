use std::time::Duration;

use crate::market::{Indicator, SessionState};
use crate::suggest::{ListView, SelectAction};

// Everything the two components tell their owner goes through this enum.
// The owner (page glue, or the terminal host in main.rs) decides what to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Suggestion list must be redrawn (shown, replaced or hidden)
    SuggestionsRendered(ListView),

    // Highlight moved without the list itself changing
    ActiveChanged(Option<usize>),

    // User picked a suggestion by keyboard or pointer
    SelectionMade { symbol: String, action: SelectAction },

    // Enter with nothing highlighted, under the submit-raw policy
    RawSubmitted { text: String },

    // List closed by Escape or a click outside, nothing selected
    Dismissed,

    // New market status for the header indicator
    MarketStatus(Indicator),

    // Poller re-armed its inner timer after a session transition
    CadenceChanged {
        state: SessionState,
        interval: Duration,
    },

    // Ctrl+C or end of input
    Shutdown,
}
