//! Line-oriented Markdown to HTML conversion.
//!
//! Each non-blank line becomes exactly one line of HTML: `# Title` is a
//! header, anything else is a paragraph, and `[text](href)` becomes an anchor.

mod diagnostic;
mod error;
pub mod markers;
mod options;
mod scan;
mod stream;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, E_LINK_MALFORMED, W_INVALID_UTF8};
pub use error::{ConvertError, OpenSpan, StreamError};
pub use options::{ConvertOptions, LinkPolicy};
pub use scan::{convert_line, convert_line_with_options};
pub use stream::{
    ConvertReport, ConvertedDocument, LineSink, NonBlankLines, SourceLine, WriteSink,
    convert_stream, convert_str, non_blank_lines,
};
