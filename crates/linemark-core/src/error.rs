use std::io;

use thiserror::Error;

use crate::diagnostic::E_LINK_MALFORMED;

/// Failure converting a single line. The line produces no output.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConvertError {
    /// A link marker arrived while the other half of the link was still open:
    /// `(` inside `[...` or `[` inside `(...`.
    #[error("malformed link at column {column}: '{found}' while {open} is still open")]
    MalformedLink {
        /// 1-based character column of the offending marker.
        column: usize,
        found: char,
        open: OpenSpan,
    },
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::MalformedLink { .. } => E_LINK_MALFORMED,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ConvertError::MalformedLink { column, .. } => *column,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenSpan {
    LinkText,
    Href,
}

impl std::fmt::Display for OpenSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenSpan::LinkText => f.write_str("link text '['"),
            OpenSpan::Href => f.write_str("link target '('"),
        }
    }
}

/// I/O failure on either end of a stream conversion.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}
