//! Error types for feed fetching and XMLTV parsing

use thiserror::Error;

/// Failure to obtain the raw feed bytes.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Failure to turn feed bytes into a guide.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected root element <{0}>, expected <tv>")]
    UnexpectedRoot(String),

    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

/// Anything that can make a refresh cycle come back empty-handed.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("refresh worker panicked")]
    Panicked,
}
