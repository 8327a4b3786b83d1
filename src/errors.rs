use thiserror::Error;

/// Everything that can go wrong while talking to the catalog.
///
/// Every variant is fatal for the aggregation that hit it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or protocol failure reported by the HTTP client.
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog answered with a non-2xx status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The body did not match the expected record shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A product task died or its result never reached the collector.
    #[error("product fetch task failed: {0}")]
    Task(String),
}
