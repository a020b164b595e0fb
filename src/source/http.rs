//! HTTP data source.
//!
//! Fetches the rows document from an HTTP endpoint (for example a small
//! service or script that exports the production spreadsheet as JSON).
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use prodwatch::{DataSource, HttpSource};
//!
//! let mut source = HttpSource::builder()
//!     .endpoint("http://localhost:8080/rows")
//!     .bearer_token("secret")
//!     .timeout(Duration::from_secs(5))
//!     .build()?;
//!
//! let rows = source.read_rows()?;
//! println!("{} rows", rows.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use super::{DataSource, ProductionRecord, RowsPayload, SourceUnavailable};

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/rows";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A data source that GETs the rows document over HTTP.
///
/// Credentials are fixed at construction; the session is never
/// re-established per cycle. An expired token surfaces as
/// [`SourceUnavailable::Auth`].
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    token: Option<String>,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the endpoint being polled.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn fetch(&self) -> Result<Vec<ProductionRecord>, SourceUnavailable> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceUnavailable::Auth(format!("endpoint returned {status}")));
        }
        if !status.is_success() {
            return Err(SourceUnavailable::Http(format!("endpoint returned {status}")));
        }

        let payload: RowsPayload = response
            .json()
            .map_err(|e| SourceUnavailable::Parse(e.to_string()))?;
        Ok(payload.into_rows())
    }
}

impl DataSource for HttpSource {
    fn read_rows(&mut self) -> Result<Vec<ProductionRecord>, SourceUnavailable> {
        self.fetch()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the rows endpoint (e.g., "http://localhost:8080/rows").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Send this bearer token with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, SourceUnavailable> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SourceUnavailable::Connection(e.to_string()))?;

        let endpoint = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let description = format!("http: {}", endpoint);

        Ok(HttpSource {
            client,
            endpoint,
            token: self.token,
            description,
        })
    }
}
