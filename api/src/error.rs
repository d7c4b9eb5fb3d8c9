use thiserror::Error;

/// User-facing failures of workspace operations. `Display` is the notice
/// shown to the user.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Failed to parse JSON file.")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("Nothing to import: the file has no collections or history.")]
    NothingImported,
    #[error("Please create a collection first!")]
    NoCollections,
    #[error("Name must not be empty.")]
    InvalidName,
    #[error("Collection {0} does not exist.")]
    UnknownCollection(String),
    #[error("Tab {0} is not open.")]
    UnknownTab(String),
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkspaceError {
    /// Whether the notice should send the user to create a collection.
    pub fn suggests_new_collection(&self) -> bool {
        matches!(self, WorkspaceError::NoCollections)
    }
}

/// Transport-level failures. A non-2xx status is a response, not one of these.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0} requests are not supported yet")]
    Unsupported(String),
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}
