use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum CcassError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The document received did not have the expected structure or was
    /// missing a required field.
    #[error("Document format unexpected or missing field: {0}")]
    Parse(String),

    /// The exchange has no shareholding listing for this ticker and date,
    /// including after the temporary-counter retry.
    #[error("No shareholding data for ticker {ticker} on {date}")]
    NoData {
        /// The stock code that was queried.
        ticker: u32,
        /// The requested shareholding date.
        date: chrono::NaiveDate,
    },

    /// A shareholding date in the future (or otherwise unusable) was requested.
    #[error("invalid shareholding date: {0}")]
    InvalidDate(String),

    /// A builder was run with invalid or missing parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// An I/O error while reading or writing a persisted table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV encode/decode error while reading or writing a persisted table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
