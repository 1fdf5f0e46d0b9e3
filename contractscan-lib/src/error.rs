//! Errors that might be returned when using this crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // HTTP Errors
    #[error("Failed to initialize HTTP client; {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to send HTTP request; {0}")]
    HttpRequest(#[source] reqwest::Error),

    #[error("Request to '{1}' failed with status code {0}")]
    HttpStatus(u16, String),

    #[error("Failed to read response body from '{0}'; {1}")]
    HttpBody(String, #[source] reqwest::Error),

    #[error("Invalid explorer URL '{0}'; {1}")]
    ExplorerUrl(String, #[source] url::ParseError),

    #[error("Failed to deserialize JSON input; {0}")]
    DeserializeError(#[from] serde_json::Error),

    #[error("Unexpected explorer result '{0}', expected a JSON object")]
    UnexpectedResult(String),

    // Output Errors
    #[error("Failed to write '{0}'; {1}")]
    OutputWrite(String, #[source] std::io::Error),

    #[error("Failed to serialize results; {0}")]
    OutputSerialize(#[source] serde_json::Error),
}
