//! Line-by-line driver around the scanner.
//!
//! A [`non_blank_lines`] source feeds [`convert_stream`], which converts each
//! line in order and hands the HTML to a [`LineSink`]. A malformed line is
//! recorded as a [`Diagnostic`] and skipped; it never aborts the run. The
//! sink is finished (flushed) on every exit path.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::diagnostic::{Diagnostic, DiagnosticSeverity, W_INVALID_UTF8};
use crate::error::StreamError;
use crate::options::ConvertOptions;
use crate::scan::convert_line_with_options;

/// A non-blank line handed out by [`non_blank_lines`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceLine {
    /// 1-based, counting the skipped blank lines too.
    pub number: usize,
    pub text: String,
    /// Invalid UTF-8 in the source was replaced with U+FFFD.
    pub lossy: bool,
}

/// Yields every non-empty line of `reader`, with `\n` or `\r\n` stripped.
///
/// Line numbers point back into the source. Whitespace-only lines are not
/// blank. Bytes that are not UTF-8 are decoded lossily instead of failing the
/// whole stream.
pub fn non_blank_lines<R: BufRead>(reader: R) -> NonBlankLines<R> {
    NonBlankLines {
        reader,
        line: 0,
        buf: Vec::new(),
    }
}

pub struct NonBlankLines<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for NonBlankLines<R> {
    type Item = Result<SourceLine, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(source) => {
                    return Some(Err(StreamError::Read {
                        line: self.line + 1,
                        source,
                    }));
                }
            }
            strip_line_ending(&mut self.buf);
            if self.buf.is_empty() {
                continue;
            }
            let (text, lossy) = match String::from_utf8_lossy(&self.buf) {
                Cow::Borrowed(text) => (text.to_string(), false),
                Cow::Owned(text) => (text, true),
            };
            return Some(Ok(SourceLine {
                number: self.line,
                text,
                lossy,
            }));
        }
    }
}

fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Destination for converted lines, written in the order received.
pub trait LineSink {
    fn write_line(&mut self, html: &str) -> io::Result<()>;

    /// Called once after the last line, whether or not conversion succeeded.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any [`Write`] into a [`LineSink`]; `finish` flushes the writer.
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LineSink for WriteSink<W> {
    fn write_line(&mut self, html: &str) -> io::Result<()> {
        self.inner.write_all(html.as_bytes())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl LineSink for Vec<String> {
    fn write_line(&mut self, html: &str) -> io::Result<()> {
        self.push(html.to_string());
        Ok(())
    }
}

impl LineSink for String {
    fn write_line(&mut self, html: &str) -> io::Result<()> {
        self.push_str(html);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ConvertReport {
    /// Non-blank lines handed to the converter.
    pub lines_read: usize,
    pub lines_written: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConvertReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub fn convert_stream<R, S>(
    reader: R,
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConvertReport, StreamError>
where
    R: BufRead,
    S: LineSink + ?Sized,
{
    let result = drive(reader, sink, options);
    let finished = sink
        .finish()
        .map_err(|source| StreamError::Write { source });
    let report = result?;
    finished?;
    info!(
        "Converted {} of {} lines ({} skipped)",
        report.lines_written,
        report.lines_read,
        report.lines_read - report.lines_written
    );
    Ok(report)
}

fn drive<R, S>(
    reader: R,
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConvertReport, StreamError>
where
    R: BufRead,
    S: LineSink + ?Sized,
{
    let mut report = ConvertReport::default();
    let mut last_line = 0;
    for item in non_blank_lines(reader) {
        let SourceLine {
            number: line_no,
            text,
            lossy,
        } = item?;
        if line_no > last_line + 1 {
            debug!(
                "Skipped {} blank line(s) before line {}",
                line_no - last_line - 1,
                line_no
            );
        }
        last_line = line_no;
        report.lines_read += 1;

        if lossy {
            warn!("Line {} is not valid UTF-8; replaced undecodable bytes", line_no);
            let column = text
                .chars()
                .position(|ch| ch == char::REPLACEMENT_CHARACTER)
                .map_or(1, |idx| idx + 1);
            report.diagnostics.push(Diagnostic::new(
                line_no,
                column,
                DiagnosticSeverity::Warning,
                W_INVALID_UTF8,
                "invalid UTF-8 replaced with U+FFFD",
            ));
        }

        match convert_line_with_options(&text, options) {
            Ok(html) => {
                sink.write_line(&html)
                    .map_err(|source| StreamError::Write { source })?;
                report.lines_written += 1;
            }
            Err(err) => {
                warn!("Skipping line {}: {}", line_no, err);
                report
                    .diagnostics
                    .push(Diagnostic::from_convert_error(line_no, &err));
            }
        }
    }
    Ok(report)
}

/// Whole-document conversion held in memory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConvertedDocument {
    pub html: String,
    pub report: ConvertReport,
}

pub fn convert_str(source: &str, options: &ConvertOptions) -> ConvertedDocument {
    let mut html = String::with_capacity(source.len() + source.len() / 4);
    // Reading from a byte slice and writing to a String cannot fail.
    let report = match convert_stream(source.as_bytes(), &mut html, options) {
        Ok(report) => report,
        Err(err) => {
            warn!("In-memory conversion failed: {}", err);
            ConvertReport::default()
        }
    };
    ConvertedDocument { html, report }
}
