use serde::{Deserialize, Serialize};

/// A play request sent by the browser extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Page or media URL to play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Extra player flags, in the order the user configured them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Request {
    pub fn new(url: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            url: Some(url.into()),
            options: Some(options),
        }
    }

    /// The options to pass through, empty when none were sent.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Whether neither a URL nor options were supplied.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.options.is_none()
    }
}
