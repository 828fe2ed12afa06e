use thiserror::Error;

/// Why a call to the analysis server produced no usable data.
///
/// An empty suggestion list is not an error; it comes back as `Ok(vec![])`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connect, DNS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    BadStatus { status: u16, url: String },

    /// Body was not the JSON shape we expect
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}
