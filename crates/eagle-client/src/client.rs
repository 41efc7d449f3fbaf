//! Query client façade.

use std::time::Instant;

use eagle_auth::PasswordProvider;
use eagle_codec::{LineCodec, ResponseReader};
use eagle_protocol::{DocPage, ResultSet};
use url::Url;
use url::form_urlencoded;

use crate::config::Config;
use crate::error::{Error, PersistenceWarning, Result};
use crate::session::Session;
use crate::transport::{Method, ResponseBody};

/// The value of a successful call plus any non-fatal persistence warnings.
#[derive(Debug)]
#[non_exhaustive]
pub struct Completed<T> {
    /// The call's result.
    pub value: T,
    /// Cookie persistence failures observed during the call.
    pub warnings: Vec<PersistenceWarning>,
}

impl<T> Completed<T> {
    fn new(value: T, warning: Option<PersistenceWarning>) -> Self {
        Self {
            value,
            warnings: warning.into_iter().collect(),
        }
    }

    /// Discard the warnings and return the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Check if any warnings were raised.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Client for the EAGLE query service.
///
/// Each call performs one HTTP round trip. Calls are independent; the only
/// state carried between them is the session cookie.
#[derive(Debug, Clone)]
pub struct Client {
    session: Session,
}

impl Client {
    /// Wrap an authenticated session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The request URL for a query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is malformed.
    pub fn query_url(&self, sql: &str) -> Result<Url> {
        let mut url = self.session.config().service_url()?;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "doQuery")
            .append_pair("SQL", sql)
            .finish();
        url.set_query(Some(&query));
        Ok(url)
    }

    /// The request URL for a table's documentation page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is malformed.
    pub fn docs_url(&self, table: &str) -> Result<Url> {
        let config = self.session.config();
        let mut url = config.service_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("url cannot be a base: {}", config.base_url)))?
            .pop_if_empty()
            .push("Help");

        let page = format!("databases/{}/{table}", config.schema);
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page)
            .finish();
        url.set_query(Some(&query));
        Ok(url)
    }

    /// Run a query and return its result set.
    ///
    /// The SQL text is sent verbatim. The body is parsed as it streams in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the service rejected the query or
    /// answered outside the protocol, and the session errors for transport
    /// and authentication failures.
    pub async fn execute_query(&self, sql: &str) -> Result<Completed<ResultSet>> {
        let url = self.query_url(sql)?;
        tracing::debug!(sql = sql, "executing query");
        let started = Instant::now();

        let request = self.session.build_authenticated_request(Method::Get, url);
        let (response, warning) = self.session.send(request).await?;
        let result = self.reader(response.into_body()).parse_result_set().await?;

        tracing::info!(
            columns = result.columns().len(),
            rows = result.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );
        Ok(Completed::new(result, warning))
    }

    /// Fetch the documentation page for `table`.
    ///
    /// Lines are returned without interpretation.
    ///
    /// # Errors
    ///
    /// Returns the session errors for transport and authentication failures.
    pub async fn fetch_docs(&self, table: &str) -> Result<Completed<DocPage>> {
        let url = self.docs_url(table)?;
        tracing::debug!(table = table, "fetching documentation");

        let request = self.session.build_authenticated_request(Method::Get, url);
        let (response, warning) = self.session.send(request).await?;
        let lines = self.reader(response.into_body()).collect_lines().await?;

        tracing::debug!(lines = lines.len(), "documentation received");
        Ok(Completed::new(DocPage::new(lines), warning))
    }

    fn reader(&self, body: ResponseBody) -> ResponseReader<ResponseBody> {
        let codec = LineCodec::new().with_max_line_length(self.session.config().max_line_length);
        ResponseReader::with_codec(body, codec)
    }
}

/// Create a client for `username` with the default transport.
///
/// # Errors
///
/// See [`Session::connect`].
pub fn connect(
    config: Config,
    username: impl Into<String>,
    password: Option<String>,
    provider: &dyn PasswordProvider,
) -> Result<Client> {
    Session::connect(config, username, password, provider).map(Client::new)
}

/// Run a query on `client`.
///
/// # Errors
///
/// See [`Client::execute_query`].
pub async fn execute_query(client: &Client, sql: &str) -> Result<Completed<ResultSet>> {
    client.execute_query(sql).await
}

/// Fetch documentation for `table` on `client`.
///
/// # Errors
///
/// See [`Client::fetch_docs`].
pub async fn fetch_docs(client: &Client, table: &str) -> Result<Completed<DocPage>> {
    client.fetch_docs(table).await
}
