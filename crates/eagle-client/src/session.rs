//! Authenticated sessions.
//!
//! A [`Session`] binds credentials, a transport, and the shared cookie store.
//! Every request carries the Basic `Authorization` header and whatever
//! cookies the store holds for the URL; every response's `Set-Cookie`
//! headers are recorded and the store is saved before the status is checked.

use std::sync::Arc;

use eagle_auth::{AuthError, Credentials, PasswordProvider};
use url::Url;

use crate::config::Config;
use crate::cookie_store::CookieStore;
use crate::error::{Error, PersistenceWarning, Result};
use crate::transport::{
    AUTHORIZATION, COOKIE, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport,
};

/// An authenticated connection context for the query service.
///
/// Sessions are cheap to clone and may be shared between tasks.
#[derive(Clone)]
pub struct Session {
    config: Arc<Config>,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    cookies: Arc<CookieStore>,
}

impl Session {
    /// Create a session with the default transport and cookie file.
    ///
    /// If `password` is `None`, `provider` is asked for one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if no password is available or the
    /// username is invalid, and [`Error::Config`] for an unusable config.
    pub fn connect(
        config: Config,
        username: impl Into<String>,
        password: Option<String>,
        provider: &dyn PasswordProvider,
    ) -> Result<Self> {
        let credentials = Credentials::resolve(username.into(), password, provider)?;
        Self::builder(config, credentials).build()
    }

    /// Start building a session with injected parts.
    #[must_use]
    pub fn builder(config: Config, credentials: Credentials) -> SessionBuilder {
        SessionBuilder {
            config,
            credentials,
            transport: None,
            cookies: None,
        }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The user this session authenticates as.
    #[must_use]
    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// The shared cookie store.
    #[must_use]
    pub fn cookie_store(&self) -> &Arc<CookieStore> {
        &self.cookies
    }

    /// Build a request carrying credentials and stored cookies.
    #[must_use]
    pub fn build_authenticated_request(&self, method: Method, url: Url) -> HttpRequest {
        let cookie_header = self.cookies.apply(&url);
        let mut request = HttpRequest::new(method, url)
            .header(AUTHORIZATION, self.credentials.basic_authorization());
        if let Some(cookie_header) = cookie_header {
            request = request.header(COOKIE, cookie_header);
        }
        request
    }

    /// Send one request.
    ///
    /// Cookies from the response are recorded and saved whatever the
    /// status. A failed save is returned alongside the response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the exchange fails,
    /// [`Error::Authentication`] for 401 and 403, and [`Error::HttpStatus`]
    /// for any other status of 400 or above.
    pub async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<(HttpResponse, Option<PersistenceWarning>)> {
        let url = request.url.clone();
        tracing::debug!(
            method = %request.method,
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            username = self.credentials.username(),
            "sending request"
        );

        let response = self.transport.send(request).await?;

        self.cookies.update(&url, response.set_cookies());
        let warning = self.cookies.save().err();
        if let Some(warning) = &warning {
            tracing::warn!(error = %warning, "cookie store not saved");
        }

        match response.status() {
            status @ (401 | 403) => {
                tracing::debug!(status, "credentials rejected");
                Err(AuthError::Rejected { status }.into())
            }
            status if status >= 400 => Err(Error::HttpStatus { status }),
            status => {
                tracing::debug!(status, "response received");
                Ok((response, warning))
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .field("credentials", &self.credentials)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    config: Config,
    credentials: Credentials,
    transport: Option<Arc<dyn Transport>>,
    cookies: Option<Arc<CookieStore>>,
}

impl SessionBuilder {
    /// Use `transport` instead of the default HTTP client.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `cookies` instead of the process-wide store for `config.cookie_file`.
    #[must_use]
    pub fn cookie_store(mut self, cookies: Arc<CookieStore>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Build the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid and
    /// [`Error::Transport`] if the default transport cannot be created.
    pub fn build(self) -> Result<Session> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let cookies = match (self.cookies, &self.config.cookie_file) {
            (Some(cookies), _) => cookies,
            (None, Some(path)) => CookieStore::shared(path),
            (None, None) => Arc::new(CookieStore::in_memory()),
        };

        tracing::debug!(
            base_url = %self.config.base_url,
            username = self.credentials.username(),
            "session created"
        );

        Ok(Session {
            config: Arc::new(self.config),
            credentials: self.credentials,
            transport,
            cookies,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eagle_auth::{NoPassword, StaticPassword};

    fn config() -> Config {
        Config::new()
            .base_url("http://h.example.org:8080/Eagle")
            .no_cookie_file()
    }

    #[test]
    fn test_connect_requires_password() {
        let err = Session::connect(config(), "jdoe", None, &NoPassword).unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthError::MissingPassword { .. })
        ));
    }

    #[test]
    fn test_connect_with_provider() {
        let session = Session::connect(config(), "jdoe", None, &StaticPassword::new("pw")).unwrap();
        assert_eq!(session.username(), "jdoe");
        assert!(session.cookie_store().path().is_none());
    }

    #[test]
    fn test_connect_rejects_bad_config() {
        let err = Session::connect(
            Config::new().base_url("nope"),
            "jdoe",
            Some("pw".into()),
            &NoPassword,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_authenticated_request_headers() {
        let session = Session::connect(config(), "jdoe", Some("pw".into()), &NoPassword).unwrap();
        let url = Url::parse("http://h.example.org:8080/Eagle?action=doQuery").unwrap();
        session
            .cookie_store()
            .update(&url, ["JSESSIONID=abc; Path=/Eagle"]);

        let request = session.build_authenticated_request(Method::Get, url);
        assert_eq!(request.header_value(AUTHORIZATION), Some("Basic amRvZTpwdw=="));
        assert_eq!(request.header_value(COOKIE), Some("JSESSIONID=abc"));
    }

    #[test]
    fn test_debug_hides_password() {
        let session =
            Session::connect(config(), "jdoe", Some("hunter2".into()), &NoPassword).unwrap();
        assert!(!format!("{session:?}").contains("hunter2"));
    }
}
