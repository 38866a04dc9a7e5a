use std::mem;

use crate::error::{ConvertError, OpenSpan};
use crate::markers::{
    ANCHOR_CLOSE_TAG, ANCHOR_HREF_END, ANCHOR_OPEN_TAG, HEADER_CLOSE_TAG, HEADER_MARKER,
    HEADER_OPEN_TAG, HREF_CLOSE, HREF_OPEN, LINE_END, LINK_TEXT_CLOSE, LINK_TEXT_OPEN,
    PARAGRAPH_CLOSE_TAG, PARAGRAPH_OPEN_TAG, SPACE, TAG_END,
};
use crate::options::{ConvertOptions, LinkPolicy};

/// Converts one line of Markdown into one line of HTML, rejecting
/// out-of-order link markers.
///
/// The returned string always ends with `\n`. Callers are expected to skip
/// zero-length lines before calling this.
pub fn convert_line(line: &str) -> Result<String, ConvertError> {
    convert_line_with_options(line, &ConvertOptions::default())
}

/// [`convert_line`] with the link policy taken from `options`.
pub fn convert_line_with_options(
    line: &str,
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    let state = line
        .chars()
        .enumerate()
        .try_fold(ScanState::new(line.len()), |state, (idx, ch)| {
            state.step(ch, idx + 1, options.link_policy)
        })?;
    Ok(state.finish())
}

/// Block wrapper for the line. A line is never both a header and a paragraph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Block {
    None,
    HeaderPending(usize),
    Header(usize),
    Paragraph,
}

#[derive(Debug)]
enum Link {
    /// Not inside a link span. `text` holds the last closed `[...]` text
    /// until a `(...)` consumes it.
    Idle { text: String },
    Text(String),
    Href { text: String, href: String },
}

#[derive(Debug)]
struct ScanState {
    block: Block,
    link: Link,
    out: String,
}

impl ScanState {
    fn new(capacity: usize) -> Self {
        Self {
            block: Block::None,
            link: Link::Idle {
                text: String::new(),
            },
            out: String::with_capacity(capacity + 16),
        }
    }

    fn step(mut self, ch: char, column: usize, policy: LinkPolicy) -> Result<Self, ConvertError> {
        match ch {
            HEADER_MARKER => self.header_marker(),
            LINK_TEXT_OPEN => self.open_link_text(column, policy)?,
            LINK_TEXT_CLOSE => self.close_link_text(policy),
            HREF_OPEN => self.open_href(column, policy)?,
            HREF_CLOSE => self.close_href(),
            SPACE if self.is_header_pending() && self.is_link_idle() => self.open_header(),
            _ => self.text(ch),
        }
        Ok(self)
    }

    fn is_header_pending(&self) -> bool {
        matches!(self.block, Block::HeaderPending(_))
    }

    fn is_link_idle(&self) -> bool {
        matches!(self.link, Link::Idle { .. })
    }

    fn header_marker(&mut self) {
        match &mut self.link {
            Link::Text(text) => text.push(HEADER_MARKER),
            Link::Href { href, .. } => href.push(HEADER_MARKER),
            Link::Idle { .. } => match self.block {
                Block::None => self.block = Block::HeaderPending(1),
                Block::HeaderPending(level) => self.block = Block::HeaderPending(level + 1),
                Block::Header(_) | Block::Paragraph => self.out.push(HEADER_MARKER),
            },
        }
    }

    fn open_link_text(&mut self, column: usize, policy: LinkPolicy) -> Result<(), ConvertError> {
        if let Link::Href { href, .. } = &mut self.link {
            return match policy {
                LinkPolicy::Validate => Err(ConvertError::MalformedLink {
                    column,
                    found: LINK_TEXT_OPEN,
                    open: OpenSpan::Href,
                }),
                LinkPolicy::Lenient => {
                    href.push(LINK_TEXT_OPEN);
                    Ok(())
                }
            };
        }
        self.link = Link::Text(String::new());
        Ok(())
    }

    fn close_link_text(&mut self, policy: LinkPolicy) {
        match &mut self.link {
            Link::Text(text) => {
                let text = mem::take(text);
                self.link = Link::Idle { text };
            }
            Link::Href { href, .. } if policy == LinkPolicy::Lenient => {
                href.push(LINK_TEXT_CLOSE);
            }
            _ => {}
        }
    }

    fn open_href(&mut self, column: usize, policy: LinkPolicy) -> Result<(), ConvertError> {
        match &mut self.link {
            Link::Text(text) => match policy {
                LinkPolicy::Validate => Err(ConvertError::MalformedLink {
                    column,
                    found: HREF_OPEN,
                    open: OpenSpan::LinkText,
                }),
                LinkPolicy::Lenient => {
                    text.push(HREF_OPEN);
                    Ok(())
                }
            },
            Link::Idle { text } => {
                let text = mem::take(text);
                self.link = Link::Href {
                    text,
                    href: String::new(),
                };
                Ok(())
            }
            Link::Href { .. } => Ok(()),
        }
    }

    fn close_href(&mut self) {
        let Link::Href { text, href } = &self.link else {
            self.text(HREF_CLOSE);
            return;
        };
        self.out.push_str(ANCHOR_OPEN_TAG);
        self.out.push_str(href);
        self.out.push_str(ANCHOR_HREF_END);
        self.out.push_str(text);
        self.out.push_str(ANCHOR_CLOSE_TAG);
        self.link = Link::Idle {
            text: String::new(),
        };
    }

    fn open_header(&mut self) {
        if let Block::HeaderPending(level) = self.block {
            push_header_tag(&mut self.out, HEADER_OPEN_TAG, level);
            self.block = Block::Header(level);
        }
    }

    fn text(&mut self, ch: char) {
        match &mut self.link {
            Link::Text(text) => text.push(ch),
            Link::Href { href, .. } => href.push(ch),
            Link::Idle { .. } => match self.block {
                // A pending header level is dropped once a paragraph opens.
                Block::None | Block::HeaderPending(_) if ch != SPACE => {
                    self.out.push_str(PARAGRAPH_OPEN_TAG);
                    self.out.push(ch);
                    self.block = Block::Paragraph;
                }
                _ => self.out.push(ch),
            },
        }
    }

    fn finish(mut self) -> String {
        match self.block {
            Block::Header(level) => push_header_tag(&mut self.out, HEADER_CLOSE_TAG, level),
            Block::Paragraph => self.out.push_str(PARAGRAPH_CLOSE_TAG),
            Block::None | Block::HeaderPending(_) => {}
        }
        self.out.push(LINE_END);
        self.out
    }
}

fn push_header_tag(out: &mut String, tag: &str, level: usize) {
    out.push_str(tag);
    out.push_str(&level.to_string());
    out.push_str(TAG_END);
}
