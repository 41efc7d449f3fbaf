//! Persistent cookie jar.
//!
//! The service keeps a server-side session per cookie, so the jar is shared
//! by every session in the process and written back after each request.
//! The on-disk format is the libwww-perl `Set-Cookie3` format:
//!
//! ```text
//! #LWP-Cookies-2.0
//! Set-Cookie3: JSESSIONID=ABC123; path="/Eagle"; domain=example.org; path_spec; discard; version=0
//! ```
//!
//! Domain cookies are written with a leading dot and a `domain_dot` flag.
//! Cookies without an expiry are session cookies and carry `discard`; they
//! are persisted anyway so a later process can reuse the server session.
//!
//! [`CookieStore::shared`] hands out one store per cookie file, so every
//! session in the process reads and writes the same jar under one lock.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use std::sync::{Arc, Weak};

use cookie::Cookie;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use url::Url;

use crate::error::{PersistenceKind, PersistenceWarning};

/// First line of a cookie file.
pub const FILE_HEADER: &str = "#LWP-Cookies-2.0";

const FILE_MAGIC: &str = "#LWP-Cookies-";
const ENTRY_PREFIX: &str = "Set-Cookie3:";

// Live file-backed stores, keyed by absolute path
static SHARED_STORES: Lazy<Mutex<HashMap<PathBuf, Weak<CookieStore>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CookieKey {
    domain: String,
    path: String,
    name: String,
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    host_only: bool,
    path: String,
    path_specified: bool,
    secure: bool,
    expires: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn from_set_cookie(
        cookie: &Cookie<'_>,
        host: &str,
        request_path: &str,
        now: OffsetDateTime,
    ) -> Result<Self, &'static str> {
        let domain = cookie
            .domain()
            .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty());

        let (domain, host_only) = match domain {
            Some(domain) => {
                if !domain_match(host, &domain) {
                    return Err("domain does not match request host");
                }
                if domain != host && !domain.contains('.') {
                    return Err("domain is a top-level domain");
                }
                (domain, false)
            }
            None => (host.to_string(), true),
        };

        let (path, path_specified) = match cookie.path().filter(|p| p.starts_with('/')) {
            Some(path) => (path.to_string(), true),
            None => (default_path(request_path), false),
        };

        // Max-Age takes precedence over Expires
        let expires = match cookie.max_age() {
            Some(max_age) => now.checked_add(max_age),
            None => cookie.expires_datetime(),
        };

        Ok(Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain,
            host_only,
            path,
            path_specified,
            secure: cookie.secure().unwrap_or(false),
            expires,
        })
    }

    fn key(&self) -> CookieKey {
        CookieKey {
            domain: self.domain.clone(),
            path: self.path.clone(),
            name: self.name.clone(),
        }
    }

    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    fn matches(&self, host: &str, path: &str, secure: bool) -> bool {
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_match(host, &self.domain)
        };
        domain_ok && path_match(path, &self.path) && (secure || !self.secure)
    }

    fn write_lwp(&self, out: &mut String) {
        let domain = if self.host_only {
            self.domain.clone()
        } else {
            format!(".{}", self.domain)
        };

        let _ = write!(
            out,
            "{ENTRY_PREFIX} {}={}; path={}; domain={}",
            self.name,
            quote(&self.value),
            quote(&self.path),
            quote(&domain)
        );
        if self.path_specified {
            out.push_str("; path_spec");
        }
        if !self.host_only {
            out.push_str("; domain_dot");
        }
        if self.secure {
            out.push_str("; secure");
        }
        match self.expires {
            Some(expires) => {
                let _ = write!(out, "; expires={}", quote(&format_lwp_time(expires)));
            }
            None => out.push_str("; discard"),
        }
        out.push_str("; version=0\n");
    }

    fn parse_lwp(entry: &str) -> Option<Self> {
        let mut attributes = split_attributes(entry).into_iter();
        let (name, value) = attributes.next()?;
        if name.is_empty() {
            return None;
        }

        let mut cookie = Self {
            name,
            value: value.unwrap_or_default(),
            domain: String::new(),
            host_only: true,
            path: "/".to_string(),
            path_specified: false,
            secure: false,
            expires: None,
        };

        for (key, value) in attributes {
            match key.to_ascii_lowercase().as_str() {
                "path" => cookie.path = value.unwrap_or_else(|| "/".to_string()),
                "domain" => {
                    let domain = value.unwrap_or_default().to_ascii_lowercase();
                    cookie.host_only = !domain.starts_with('.');
                    cookie.domain = domain.trim_start_matches('.').to_string();
                }
                "path_spec" => cookie.path_specified = true,
                "secure" => cookie.secure = true,
                "expires" => cookie.expires = value.as_deref().and_then(parse_lwp_time),
                _ => {}
            }
        }

        (!cookie.domain.is_empty()).then_some(cookie)
    }
}

/// A thread-safe cookie jar with optional file persistence.
///
/// Every operation takes the internal lock once; `save` writes the file
/// while holding it, so concurrent saves never interleave.
pub struct CookieStore {
    path: Option<PathBuf>,
    cookies: Mutex<BTreeMap<CookieKey, StoredCookie>>,
}

impl CookieStore {
    /// Create a store with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cookies: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load cookies from `path`, starting empty if that fails.
    ///
    /// A missing file is normal on first use. Other failures are logged
    /// and absorbed; use [`CookieStore::try_load`] to observe them.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let (store, warning) = Self::try_load(path);
        if let Some(warning) = warning {
            tracing::debug!(error = %warning, "starting with an empty cookie store");
        }
        store
    }

    /// Load cookies from `path`, reporting why the store started empty.
    ///
    /// The store is always returned and always saves back to `path`.
    pub fn try_load(path: impl Into<PathBuf>) -> (Self, Option<PersistenceWarning>) {
        let path = path.into();
        let now = OffsetDateTime::now_utc();

        let (cookies, warning) = match fs::read_to_string(&path) {
            Ok(contents) => match parse_file(&contents, now) {
                Ok(cookies) => (cookies, None),
                Err(e) => (
                    BTreeMap::new(),
                    Some(PersistenceWarning::new(&path, PersistenceKind::Load, e)),
                ),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => (BTreeMap::new(), None),
            Err(e) => (
                BTreeMap::new(),
                Some(PersistenceWarning::new(&path, PersistenceKind::Load, e)),
            ),
        };

        tracing::debug!(
            count = cookies.len(),
            path = %path.display(),
            "cookie store loaded"
        );

        let store = Self {
            path: Some(path),
            cookies: Mutex::new(cookies),
        };
        (store, warning)
    }

    /// The process-wide store for the cookie file at `path`.
    ///
    /// Every call naming the same file returns the same store while any
    /// handle to it is alive; the file is loaded only when none is.
    /// Relative paths are resolved against the working directory.
    pub fn shared(path: impl Into<PathBuf>) -> Arc<Self> {
        let path = path.into();
        let key = std::path::absolute(&path).unwrap_or_else(|_| path.clone());

        let mut stores = SHARED_STORES.lock();
        if let Some(store) = stores.get(&key).and_then(Weak::upgrade) {
            return store;
        }

        stores.retain(|_, store| store.strong_count() > 0);
        let store = Arc::new(Self::load(path));
        stores.insert(key, Arc::downgrade(&store));
        store
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored cookies, expired ones included until the next pass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.lock().len()
    }

    /// Check if the store holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.lock().is_empty()
    }

    /// Remove every cookie.
    pub fn clear(&self) {
        self.cookies.lock().clear();
    }

    /// The `Cookie` header value for a request to `url`.
    ///
    /// Cookies with longer paths come first.
    #[must_use]
    pub fn apply(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?.to_ascii_lowercase();
        let secure = url.scheme() == "https";
        let now = OffsetDateTime::now_utc();

        let mut cookies = self.cookies.lock();
        cookies.retain(|_, cookie| !cookie.is_expired(now));

        let mut matching: Vec<&StoredCookie> = cookies
            .values()
            .filter(|cookie| cookie.matches(&host, url.path(), secure))
            .collect();
        if matching.is_empty() {
            return None;
        }
        matching.sort_by(|a, b| b.path.len().cmp(&a.path.len()));

        let header = matching
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }

    /// Record the `Set-Cookie` values of a response to `url`.
    ///
    /// Invalid directives are logged and skipped. A directive whose expiry
    /// has passed removes the matching cookie.
    pub fn update<I, S>(&self, url: &Url, set_cookie_values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };
        let now = OffsetDateTime::now_utc();
        let mut cookies = self.cookies.lock();

        for raw in set_cookie_values {
            let parsed = match Cookie::parse(raw.as_ref()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "rejected malformed Set-Cookie header");
                    continue;
                }
            };

            match StoredCookie::from_set_cookie(&parsed, &host, url.path(), now) {
                Ok(cookie) if cookie.is_expired(now) => {
                    tracing::trace!(name = %cookie.name, "cookie expired by server");
                    cookies.remove(&cookie.key());
                }
                Ok(cookie) => {
                    tracing::trace!(name = %cookie.name, domain = %cookie.domain, "cookie stored");
                    cookies.insert(cookie.key(), cookie);
                }
                Err(reason) => {
                    tracing::warn!(name = %parsed.name(), host = %host, reason, "rejected cookie");
                }
            }
        }
    }

    /// Write all unexpired cookies to the backing file.
    ///
    /// Does nothing for an in-memory store. The file is replaced by
    /// renaming a sibling temporary file over it.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceWarning`] if the file cannot be written.
    pub fn save(&self) -> Result<(), PersistenceWarning> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let now = OffsetDateTime::now_utc();

        let mut cookies = self.cookies.lock();
        cookies.retain(|_, cookie| !cookie.is_expired(now));

        let mut contents = String::with_capacity(64 + cookies.len() * 128);
        contents.push_str(FILE_HEADER);
        contents.push('\n');
        for cookie in cookies.values() {
            cookie.write_lwp(&mut contents);
        }

        write_replacing(path, &contents)
            .map_err(|e| PersistenceWarning::new(path, PersistenceKind::Save, e))?;

        tracing::debug!(
            count = cookies.len(),
            path = %path.display(),
            "cookie store saved"
        );
        Ok(())
    }
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Cookie values are session secrets
        f.debug_struct("CookieStore")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

fn parse_file(
    contents: &str,
    now: OffsetDateTime,
) -> io::Result<BTreeMap<CookieKey, StoredCookie>> {
    let mut lines = contents.lines();
    let header = lines.next().unwrap_or_default();
    if !header.starts_with(FILE_MAGIC) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "not an LWP cookie file",
        ));
    }

    let mut cookies = BTreeMap::new();
    for line in lines {
        let Some(entry) = line.trim().strip_prefix(ENTRY_PREFIX) else {
            continue;
        };
        match StoredCookie::parse_lwp(entry) {
            Some(cookie) if cookie.is_expired(now) => {}
            Some(cookie) => {
                cookies.insert(cookie.key(), cookie);
            }
            None => tracing::debug!("skipping malformed cookie file entry"),
        }
    }
    Ok(cookies)
}

fn write_replacing(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "cookie path has no file name"))?
        .to_os_string();
    // Distinct per process so concurrent writers never share a temp file
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

/// Split `key=value; key; key="quoted"` attribute lists.
fn split_attributes(input: &str) -> Vec<(String, Option<String>)> {
    let mut attributes = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ';').is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && *c != ';') {
            key.push(c);
        }

        let value = if chars.next_if_eq(&'=').is_some() {
            while chars.next_if_eq(&' ').is_some() {}
            Some(read_value(&mut chars))
        } else {
            None
        };
        attributes.push((key.trim().to_string(), value));
    }
    attributes
}

fn read_value(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut value = String::new();
    if chars.next_if_eq(&'"').is_some() {
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                }
                '"' => break,
                _ => value.push(c),
            }
        }
        while chars.next_if(|c| *c != ';').is_some() {}
    } else {
        while let Some(c) = chars.next_if(|c| *c != ';') {
            value.push(c);
        }
        value.truncate(value.trim_end().len());
    }
    value
}

fn quote(value: &str) -> String {
    let is_token = |c: char| c.is_alphanumeric() || "_!#$%&'*+-.^`|~".contains(c);
    if value.chars().all(is_token) {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn format_lwp_time(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

fn parse_lwp_time(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim().strip_suffix('Z')?;
    let (date, clock) = text.split_once(' ')?;

    let mut date = date.splitn(3, '-');
    let year: i32 = date.next()?.parse().ok()?;
    let month: u8 = date.next()?.parse().ok()?;
    let day: u8 = date.next()?.parse().ok()?;

    let mut clock = clock.splitn(3, ':');
    let hour: u8 = clock.next()?.parse().ok()?;
    let minute: u8 = clock.next()?.parse().ok()?;
    let second: u8 = clock.next()?.parse().ok()?;

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

fn domain_match(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

fn path_match(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
