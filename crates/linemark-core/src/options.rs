use std::fmt;
use std::str::FromStr;

/// How the scanner reacts to link markers that arrive out of order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LinkPolicy {
    /// `(` inside an open `[...` span, or `[` inside an open `(...` span,
    /// fails the line with [`crate::ConvertError::MalformedLink`].
    #[default]
    Validate,
    /// The out-of-order marker is kept as ordinary text of the open span.
    Lenient,
}

impl LinkPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkPolicy::Validate => "validate",
            LinkPolicy::Lenient => "lenient",
        }
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "validate" | "strict" => Ok(LinkPolicy::Validate),
            "lenient" | "loose" => Ok(LinkPolicy::Lenient),
            other => Err(format!(
                "unknown link policy '{}' (expected validate | lenient)",
                other
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConvertOptions {
    pub link_policy: LinkPolicy,
}

impl ConvertOptions {
    pub fn lenient() -> Self {
        Self {
            link_policy: LinkPolicy::Lenient,
        }
    }
}
