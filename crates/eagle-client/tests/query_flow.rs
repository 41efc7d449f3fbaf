//! Query and documentation flows over a scripted transport.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use eagle_client::{
    AuthError, Client, Config, CookieStore, Credentials, Error, ProtocolError, Session,
    TransportError, Value,
};
use eagle_testing::{MockResponse, MockTransport, fixtures};

const BASE_URL: &str = "http://db.example.org:8080/Eagle";

fn client_with(transport: &Arc<MockTransport>) -> Client {
    let config = Config::new().base_url(BASE_URL).no_cookie_file();
    let session = Session::builder(config, Credentials::new("jdoe", "secret").unwrap())
        .transport(Arc::clone(transport) as Arc<dyn eagle_client::Transport>)
        .build()
        .unwrap();
    Client::new(session)
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_query_returns_typed_rows() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::SELECT_SMALL).chunked(7));
    let client = client_with(&transport);

    let done = client
        .execute_query("SELECT TOP 2 * FROM RefL0012N0188_Subhalo")
        .await
        .unwrap();
    assert!(!done.has_warnings());

    let result = done.into_value();
    assert_eq!(result.len(), 2);
    assert_eq!(result.columns().len(), 5);

    let first = &result.rows()[0];
    assert_eq!(first.get_by_name("GalaxyID"), Some(&Value::BigInt(8_253_667)));
    assert_eq!(first.get_by_name("SnapNum"), Some(&Value::Int(28)));
    assert_eq!(first.get_by_name("Redshift"), Some(&Value::Real(0.0)));
    assert_eq!(first.get_by_name("Mass"), Some(&Value::Float(1.5e10)));
    assert_eq!(
        first.get_by_name("Name").and_then(Value::as_str),
        Some("first")
    );
}

#[tokio::test]
async fn test_query_request_shape() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::EMPTY_RESULT));
    let client = client_with(&transport);

    let result = client
        .execute_query("SELECT a, b FROM t WHERE x = 'y'")
        .await
        .unwrap()
        .into_value();
    assert!(result.is_empty());
    assert_eq!(result.columns().len(), 1);

    let request = transport.last_request().unwrap();
    assert_eq!(request.url.path(), "/Eagle");
    let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("action".to_string(), "doQuery".to_string()),
            ("SQL".to_string(), "SELECT a, b FROM t WHERE x = 'y'".to_string()),
        ]
    );
    assert_eq!(
        request.header_value("authorization"),
        Some("Basic amRvZTpzZWNyZXQ=")
    );
    assert_eq!(request.header_value("cookie"), None);
}

#[tokio::test]
async fn test_rejected_query_carries_diagnostic() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::REJECTED));
    let client = client_with(&transport);

    let err = client.execute_query("SELECT FROM").await.unwrap_err();
    assert!(err.is_protocol_error());
    match err {
        Error::Protocol(e @ ProtocolError::NotOk { .. }) => {
            assert!(e.diagnostic().contains("Incorrect syntax"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_truncated_header() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::TRUNCATED_HEADER));
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::UnrecognizedHeader { ref line }) if line.is_empty()
    ));
}

#[tokio::test]
async fn test_bad_column_line() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::BAD_COLUMN));
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::UnrecognizedColumn { .. })
    ));
}

#[tokio::test]
async fn test_line_limit_from_config() {
    let transport = Arc::new(MockTransport::new());
    let body = fixtures::result_body(&[("s", "nvarchar")], &[vec!["q".repeat(500)]]);
    transport.respond(MockResponse::ok(body));

    let config = Config::new()
        .base_url(BASE_URL)
        .no_cookie_file()
        .max_line_length(128);
    let session = Session::builder(config, Credentials::new("jdoe", "secret").unwrap())
        .transport(Arc::clone(&transport) as Arc<dyn eagle_client::Transport>)
        .build()
        .unwrap();

    let err = Client::new(session).execute_query("SELECT s").await.unwrap_err();
    assert!(matches!(err, Error::Codec(_)));
    assert!(err.is_protocol_error());
}

// ============================================================================
// Failures outside the protocol
// ============================================================================

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::unauthorized());
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(err.is_authentication());
    assert!(matches!(
        err,
        Error::Authentication(AuthError::Rejected { status: 401 })
    ));
}

#[tokio::test]
async fn test_forbidden_is_authentication_error() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::with_status(403, "Forbidden"));
    let client = client_with(&transport);

    let err = client.fetch_docs("T").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Authentication(AuthError::Rejected { status: 403 })
    ));
}

#[tokio::test]
async fn test_server_error_status() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::with_status(503, "busy"));
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503 }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_transport_failures() {
    let transport = Arc::new(MockTransport::new());
    transport.fail("connection refused").time_out();
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Connect(_))));
    assert!(err.is_transient());

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout)));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_body_reset_is_transport_error() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::SELECT_SMALL).fail_after(40));
    let client = client_with(&transport);

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Io(_))));
    assert!(!err.is_protocol_error());
}

// ============================================================================
// Documentation pages
// ============================================================================

#[tokio::test]
async fn test_fetch_docs() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::DOCS_PAGE));
    let client = client_with(&transport);

    let page = eagle_client::fetch_docs(&client, "RefL0012N0188_Subhalo")
        .await
        .unwrap()
        .into_value();
    assert_eq!(page.lines().len(), 4);
    assert_eq!(page.lines()[1], "<h1>RefL0012N0188_Subhalo</h1>");

    let request = transport.last_request().unwrap();
    assert_eq!(request.url.path(), "/Eagle/Help");
    let page_param = request
        .url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned());
    assert_eq!(
        page_param.as_deref(),
        Some("databases/Eagle/RefL0012N0188_Subhalo")
    );
}

#[tokio::test]
async fn test_docs_do_not_parse_protocol() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::ok(fixtures::REJECTED));
    let client = client_with(&transport);

    let page = client.fetch_docs("Anything").await.unwrap().into_value();
    assert_eq!(page.lines().len(), 2);
}

// ============================================================================
// Shared cookie store
// ============================================================================

#[tokio::test]
async fn test_sessions_share_cookie_store() {
    let cookies = Arc::new(CookieStore::in_memory());
    let transport = Arc::new(MockTransport::new());
    transport
        .respond(MockResponse::ok(fixtures::EMPTY_RESULT).with_cookie(fixtures::SESSION_COOKIE))
        .respond(MockResponse::ok(fixtures::EMPTY_RESULT));

    let build = || {
        let config = Config::new().base_url(BASE_URL).no_cookie_file();
        let session = Session::builder(config, Credentials::new("jdoe", "secret").unwrap())
            .transport(Arc::clone(&transport) as Arc<dyn eagle_client::Transport>)
            .cookie_store(Arc::clone(&cookies))
            .build()
            .unwrap();
        Client::new(session)
    };

    build().execute_query("SELECT 1").await.unwrap();
    build().execute_query("SELECT 2").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].header_value("cookie"), None);
    assert_eq!(
        requests[1].header_value("cookie"),
        Some("JSESSIONID=mock-session-1")
    );
}

#[tokio::test]
async fn test_cookies_recorded_on_error_status() {
    let cookies = Arc::new(CookieStore::in_memory());
    let transport = Arc::new(MockTransport::new());
    transport.respond(MockResponse::unauthorized().with_cookie(fixtures::SESSION_COOKIE));

    let config = Config::new().base_url(BASE_URL).no_cookie_file();
    let session = Session::builder(config, Credentials::new("jdoe", "wrong").unwrap())
        .transport(Arc::clone(&transport) as Arc<dyn eagle_client::Transport>)
        .cookie_store(Arc::clone(&cookies))
        .build()
        .unwrap();

    assert!(Client::new(session).execute_query("SELECT 1").await.is_err());
    assert_eq!(cookies.len(), 1);
}
