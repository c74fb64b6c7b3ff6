//! Feed fetching over HTTP(S)

use std::io::Read;
use std::time::Duration;

use super::error::FetchError;

/// Anything that can hand over the raw bytes of an XMLTV document.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    /// Where the bytes come from, for logs
    fn describe(&self) -> String;
}

/// Download configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: String,
    /// User agent string
    pub user_agent: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per fetch (1 = no retry)
    pub max_attempts: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: "https://xmltv.net/xml_files/Melbourne.xml".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 10,
            max_attempts: 1,
            retry_delay_ms: 2000,
        }
    }
}

/// XMLTV feed served over HTTP or HTTPS
pub struct HttpFeed {
    agent: ureq::Agent,
    config: FetchConfig,
}

impl HttpFeed {
    pub fn new(config: FetchConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .max_idle_connections(2)
            .max_idle_connections_per_host(1)
            .build()
            .new_agent();

        Self { agent, config }
    }

    fn try_fetch(&self) -> Result<Vec<u8>, FetchError> {
        let url = &self.config.url;

        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", &self.config.user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => FetchError::Status {
                    url: url.clone(),
                    status,
                },
                ureq::Error::Timeout(_) => FetchError::Timeout {
                    url: url.clone(),
                    secs: self.config.timeout_secs,
                },
                source => FetchError::Request {
                    url: url.clone(),
                    source,
                },
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let mut body = Vec::with_capacity(64 * 1024);
        response.into_body().into_reader().read_to_end(&mut body)?;
        Ok(body)
    }
}

impl FeedSource for HttpFeed {
    /// GET the feed, retrying up to `max_attempts` times
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(url = %self.config.url, attempt, "fetching XMLTV feed");

            match self.try_fetch() {
                Ok(body) => {
                    tracing::info!(url = %self.config.url, bytes = body.len(), "feed downloaded");
                    return Ok(body);
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "feed download failed, retrying");
                    std::thread::sleep(Duration::from_millis(self.config.retry_delay_ms));
                }
            }
        }
    }

    fn describe(&self) -> String {
        self.config.url.clone()
    }
}
