use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A violation of the minimal XML grammar.
///
/// Parsing is not resumable; the first violation aborts the whole
/// `parse()` call. Offsets are byte offsets into the part buffer.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("offset {offset}: xml header must begin with `<?xml` and end with `?>`")]
    BadHeader { offset: usize },

    #[error("offset {offset}: input ended while reading {what}")]
    UnexpectedEof { what: &'static str, offset: usize },

    #[error("offset {offset}: name must begin with an ascii letter, found `{found}`")]
    BadName { found: char, offset: usize },

    #[error("offset {offset}: {what}")]
    BadAttribute { what: &'static str, offset: usize },

    #[error("offset {offset}: {what}")]
    BadTag { what: &'static str, offset: usize },

    #[error("offset {offset}: close tag with no matching open element")]
    UnbalancedClose { offset: usize },

    #[error("offset {offset}: text is not valid utf-8")]
    NonUtf8Text { offset: usize },
}

/// Package-level failures surfaced to the caller of a top-level read.
///
/// `FailedToParsePart` carries the owning part path; the walker decides
/// whether the surrounding walk continues (nested parts) or aborts
/// (the root manifests).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open package {path}: {source}")]
    FailedToOpenFile { path: PathBuf, source: io::Error },

    #[error("not a valid zip container: {source}")]
    InvalidArchive { source: zip::result::ZipError },

    #[error("entry `{path}` not found in package")]
    EntryNotFound { path: String },

    #[error("failed to read entry `{path}`: {source}")]
    FailedToReadEntry { path: String, source: io::Error },

    #[error("failed to parse part `{path}`: {source}")]
    FailedToParsePart { path: String, source: ParseError },
}
