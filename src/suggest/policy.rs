use serde::Deserialize;

/// Keys the suggestion input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Other,
}

/// What Enter does when no suggestion is highlighted.
///
/// Search pages disagree: the dashboard analyzes whatever was typed,
/// the detail-page search navigates with it, the plain search box ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterPolicy {
    /// Hide the list and emit the trimmed text as a raw submission
    SubmitRaw,
    Ignore,
}

/// What the owner should do with a selected symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAction {
    /// Put the symbol in the input and stop
    Fill,
    /// Put the symbol in the input and run the analysis
    FillAndSubmit,
    /// Go to the stock detail page for the symbol
    Navigate,
}
