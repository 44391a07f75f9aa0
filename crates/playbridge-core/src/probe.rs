//! Live-broadcast check for a page URL.
//!
//! The probe never fails: timeouts, connection errors, bad statuses and
//! unreadable bodies all come back as [`Liveness::NotLive`], since playing
//! the URL directly is always a working fallback.

use std::io::Read;

use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::ProbeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Live,
    NotLive,
}

impl Liveness {
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

pub trait LiveProbe {
    fn probe(&self, url: &str) -> Liveness;
}

#[derive(Debug, Error)]
enum ProbeFailure {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("body read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Fetches the page prefix and looks for the live marker.
pub struct HttpLiveProbe {
    config: ProbeConfig,
}

impl HttpLiveProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    fn fetch_prefix(&self, url: &str) -> Result<String, ProbeFailure> {
        let mut builder = Client::builder()
            .timeout(self.config.timeout())
            .user_agent(self.config.user_agent.as_str());
        if !self.config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        let resp = client
            .get(url)
            .header(COOKIE, self.config.consent_cookie.as_str())
            .send()?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ProbeFailure::Status(status));
        }

        let mut body = Vec::new();
        resp.take(self.config.max_body_bytes).read_to_end(&mut body)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl LiveProbe for HttpLiveProbe {
    fn probe(&self, url: &str) -> Liveness {
        match self.fetch_prefix(url) {
            Ok(text) if text.contains(&self.config.live_marker) => Liveness::Live,
            Ok(_) => Liveness::NotLive,
            Err(e) => {
                debug!(url, error = %e, "Live probe failed, treating as not live");
                Liveness::NotLive
            }
        }
    }
}
