//! HTTP transport boundary.
//!
//! Network association and credential handling live outside this crate;
//! pollers only see an already-connected [`Transport`] they can issue
//! single GETs through.

use std::time::Duration;

use url::Url;

use crate::error::{PollError, SetupError};

/// Static header pair attached to a request.
pub type Header = (&'static str, &'static str);

/// Per-request timeout. A check attempt blocks the whole tick loop for
/// at most this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The network a polling timer talks through.
pub trait Transport {
    /// Whether the underlying link is up. Checked before any I/O so a
    /// dead link fails fast.
    fn is_connected(&self) -> bool;

    /// Issue a single GET and return the response body.
    ///
    /// Any status other than 200 is an error; the body of such a
    /// response is never inspected.
    fn get(&self, url: &Url, headers: &[Header]) -> Result<String, PollError>;
}

/// reqwest-backed transport matching the device's TLS posture: server
/// certificates are not validated.
pub struct InsecureHttp {
    client: reqwest::blocking::Client,
}

impl InsecureHttp {
    pub fn new() -> Result<Self, SetupError> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for InsecureHttp {
    fn is_connected(&self) -> bool {
        true
    }

    fn get(&self, url: &Url, headers: &[Header]) -> Result<String, PollError> {
        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(PollError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}
