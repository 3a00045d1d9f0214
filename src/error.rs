use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodError {
    #[error("Invalid barcode: {0:?}")]
    InvalidBarcode(String),

    #[error("Invalid response from upstream: {0}")]
    InvalidResponse(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("API request failed with HTTP status {0}")]
    ApiError(u16),

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    DecodingError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
}

impl FoodError {
    /// Whether repeating the same call later has a chance of succeeding.
    ///
    /// Transport failures, unreadable bodies and non-404 HTTP errors are
    /// transient; a missing product or a bad barcode will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FoodError::InvalidResponse(_) | FoodError::ApiError(_) | FoodError::NetworkError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FoodError>;
