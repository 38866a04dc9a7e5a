//! Marker characters recognised by the scanner and the HTML fragments it emits.

pub const HEADER_MARKER: char = '#';
pub const LINK_TEXT_OPEN: char = '[';
pub const LINK_TEXT_CLOSE: char = ']';
pub const HREF_OPEN: char = '(';
pub const HREF_CLOSE: char = ')';
pub const SPACE: char = ' ';

pub const HEADER_OPEN_TAG: &str = "<h";
pub const HEADER_CLOSE_TAG: &str = "</h";
pub const TAG_END: &str = ">";
pub const PARAGRAPH_OPEN_TAG: &str = "<p>";
pub const PARAGRAPH_CLOSE_TAG: &str = "</p>";
pub const ANCHOR_OPEN_TAG: &str = "<a href=\"";
pub const ANCHOR_HREF_END: &str = "\">";
pub const ANCHOR_CLOSE_TAG: &str = "</a>";
pub const LINE_END: char = '\n';
