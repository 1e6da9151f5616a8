use std::path::PathBuf;
use thiserror::Error;

/// Error types for DLsite fetching and work organization.
///
/// Optional metadata that cannot be found on a page is never reported
/// through this type; the corresponding [`Work`](crate::Work) field is simply
/// left as `None`.
///
/// # Error Handling Examples
///
/// ```rust
/// use dlsite_org::{code, DlsiteError};
///
/// match code::extract("no code in here") {
///     Ok(code) => println!("found {code}"),
///     Err(DlsiteError::CodeNotFound(text)) => eprintln!("skipping {text:?}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DlsiteError {
    /// No product code was found in a piece of text.
    ///
    /// This is recoverable: callers scanning arbitrary input skip the line
    /// or directory and continue.
    #[error("No product code found in {0:?}")]
    CodeNotFound(String),

    /// A string that must be exactly one product code was not.
    #[error("Invalid product code: {0:?}")]
    InvalidCode(String),

    /// A product page is missing a required landmark (title or maker).
    ///
    /// This usually means DLsite changed their page structure. It is fatal
    /// for the code being fetched and is not retried.
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    /// HTTP/network related errors.
    ///
    /// This includes connection failures, DNS errors, body decoding errors
    /// and other low-level transport issues.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a status other than success.
    ///
    /// A 404 from the work page is handled by falling back to the announce
    /// page; every other status (and a 404 from the announce page) ends up
    /// here.
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// An API was used in the wrong lifecycle state, such as a cache that
    /// has not been opened.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The on-disk cache store could not be read or written.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Two work directories resolve to the same organized path.
    #[error(
        "Both {} and {} would be moved to {}",
        .first.display(),
        .second.display(),
        .destination.display()
    )]
    DuplicateDestination {
        /// The shared destination path
        destination: PathBuf,
        /// The first candidate directory mapping to it
        first: PathBuf,
        /// The second candidate directory mapping to it
        second: PathBuf,
    },

    /// Unknown locale tag.
    #[error("Unknown locale: {0:?}")]
    InvalidLocale(String),

    /// Configuration could not be determined.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    ///
    /// Rename, mkdir, rmdir and sidecar file failures. These abort whatever
    /// part of the plan has not been applied yet.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
