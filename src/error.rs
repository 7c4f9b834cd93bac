/// Error types shared by the fetcher, site parsers and metadata store

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types for catalog operations
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not find {what} in {url}")]
    Parse { what: String, url: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn parse(what: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            url: url.into(),
        }
    }

    /// Whether the failure came from the network rather than the page content
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Io(_))
    }
}
