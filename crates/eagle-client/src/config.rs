//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use eagle_codec::DEFAULT_MAX_LINE_LENGTH;
use url::Url;

use crate::error::{Error, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://galaxy-catalogue.dur.ac.uk:8080/Eagle";

/// Default database schema used for documentation pages.
pub const DEFAULT_SCHEMA: &str = "Eagle";

/// Default cookie file, relative to the working directory.
pub const DEFAULT_COOKIE_FILE: &str = "sql_cookies.txt";

/// Client configuration.
///
/// Use [`Config::new()`] and the builder methods, or
/// [`Config::from_connection_string()`], to construct instances.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Base URL of the query service.
    pub base_url: String,

    /// Schema part of documentation page names.
    pub schema: String,

    /// Cookie file. `None` keeps cookies in memory only.
    pub cookie_file: Option<PathBuf>,

    /// Timeout for a whole request, body included. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,

    /// `User-Agent` header value.
    pub user_agent: String,

    /// Longest response line accepted, in bytes.
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            cookie_file: Some(PathBuf::from(DEFAULT_COOKIE_FILE)),
            request_timeout: None,
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("eagle-sql/", env!("CARGO_PKG_VERSION")).to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a connection string into configuration.
    ///
    /// Keys are case-insensitive:
    /// ```text
    /// Url=http://localhost:8080/Eagle;Schema=Eagle;CookieFile=none;Timeout=60;
    /// ```
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let mut config = Self::default();

        for part in conn_str.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("invalid key-value: {part}")))?;

            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "url" | "server" | "base url" => {
                    config.base_url = value.to_string();
                }
                "schema" | "database" => {
                    config.schema = value.to_string();
                }
                "cookie file" | "cookiefile" | "cookies" => {
                    config.cookie_file = if value.is_empty() || value.eq_ignore_ascii_case("none")
                    {
                        None
                    } else {
                        Some(PathBuf::from(value))
                    };
                }
                "timeout" | "request timeout" => {
                    let secs = parse_number(&key, value)?;
                    config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
                }
                "connect timeout" | "connection timeout" => {
                    config.connect_timeout = Duration::from_secs(parse_number(&key, value)?);
                }
                "user agent" | "useragent" => {
                    config.user_agent = value.to_string();
                }
                "max line length" => {
                    let max = parse_number(&key, value)?;
                    config.max_line_length = usize::try_from(max)
                        .map_err(|_| Error::Config(format!("invalid {key}: {value}")))?;
                }
                _ => {
                    // Ignore unknown options for forward compatibility
                    tracing::debug!(key = %key, "ignoring unknown connection string option");
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is not an absolute http(s)
    /// URL, or a limit is zero.
    pub fn validate(&self) -> Result<()> {
        self.service_url()?;
        if self.max_line_length == 0 {
            return Err(Error::Config("max line length must be positive".into()));
        }
        if self.schema.is_empty() {
            return Err(Error::Config("schema must not be empty".into()));
        }
        Ok(())
    }

    /// The parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is malformed.
    pub fn service_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "unsupported url scheme: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(Error::Config(format!("url has no host: {}", self.base_url)));
        }
        Ok(url)
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the cookie file.
    #[must_use]
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Keep cookies in memory only.
    #[must_use]
    pub fn no_cookie_file(mut self) -> Self {
        self.cookie_file = None;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the maximum accepted response line length.
    #[must_use]
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("invalid {key}: {value}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.schema, "Eagle");
        assert_eq!(config.cookie_file, Some(PathBuf::from("sql_cookies.txt")));
        assert_eq!(config.request_timeout, None);
        assert!(config.user_agent.starts_with("eagle-sql/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_string_parsing() {
        let config = Config::from_connection_string(
            "Url=http://localhost:8080/Eagle;Schema=Test;CookieFile=/tmp/c.txt;Timeout=60;",
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/Eagle");
        assert_eq!(config.schema, "Test");
        assert_eq!(config.cookie_file, Some(PathBuf::from("/tmp/c.txt")));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_cookie_file_none() {
        let config = Config::from_connection_string("Cookies=NONE").unwrap();
        assert_eq!(config.cookie_file, None);
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .base_url("https://example.org/db")
            .no_cookie_file()
            .connect_timeout(Duration::from_secs(5))
            .max_line_length(4096);
        assert_eq!(config.cookie_file, None);
        assert_eq!(config.max_line_length, 4096);
        assert_eq!(config.service_url().unwrap().host_str(), Some("example.org"));
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(Config::new().base_url("not a url").validate().is_err());
        assert!(Config::new().base_url("ftp://host/x").validate().is_err());
        assert!(Config::new().base_url("mailto:a@b").validate().is_err());
    }
}
