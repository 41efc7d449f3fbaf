//! End-to-end tests over the reqwest transport against a local mock service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use eagle_client::{AuthError, Config, Error, NoPassword, StaticPassword, Value, connect};
use eagle_testing::{MockQueryServer, MockResponse, fixtures};

const AUTHORIZATION: &str = "Basic amRvZTpzZWNyZXQ=";

async fn server() -> MockQueryServer {
    MockQueryServer::builder()
        .require_authorization(AUTHORIZATION)
        .with_session_cookie(fixtures::SESSION_COOKIE)
        .with_query("SELECT TOP 2 * FROM t", MockResponse::ok(fixtures::SELECT_SMALL))
        .with_docs(
            "databases/Eagle/RefL0012N0188_Subhalo",
            MockResponse::ok(fixtures::DOCS_PAGE),
        )
        .with_default_response(MockResponse::ok(fixtures::REJECTED))
        .build()
        .await
        .expect("mock server should start")
}

#[tokio::test]
async fn test_query_over_http() {
    let server = server().await;
    let config = Config::new().base_url(server.base_url()).no_cookie_file();
    let client = connect(config, "jdoe", Some("secret".into()), &NoPassword).unwrap();

    let result = eagle_client::execute_query(&client, "SELECT TOP 2 * FROM t")
        .await
        .unwrap()
        .into_value();
    assert_eq!(result.len(), 2);
    assert_eq!(
        result.rows()[1].get_by_name("GalaxyID"),
        Some(&Value::BigInt(8_253_668))
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path(), "/Eagle");
    assert_eq!(
        requests[0].query_param("SQL").as_deref(),
        Some("SELECT TOP 2 * FROM t")
    );
    assert!(
        requests[0]
            .header("user-agent")
            .is_some_and(|agent| agent.starts_with("eagle-sql/"))
    );
}

#[tokio::test]
async fn test_session_cookie_returned_over_http() {
    let server = server().await;
    let config = Config::new().base_url(server.base_url()).no_cookie_file();
    let client = connect(config, "jdoe", None, &StaticPassword::new("secret")).unwrap();

    client.execute_query("SELECT TOP 2 * FROM t").await.unwrap();
    client.fetch_docs("RefL0012N0188_Subhalo").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].header("cookie"), None);
    assert_eq!(requests[1].header("cookie"), Some("JSESSIONID=mock-session-1"));
    assert_eq!(requests[1].path(), "/Eagle/Help");
}

#[tokio::test]
async fn test_docs_over_http() {
    let server = server().await;
    let config = Config::new().base_url(server.base_url()).no_cookie_file();
    let client = connect(config, "jdoe", Some("secret".into()), &NoPassword).unwrap();

    let page = client
        .fetch_docs("RefL0012N0188_Subhalo")
        .await
        .unwrap()
        .into_value();
    assert_eq!(page.lines()[0], "<html>");
    assert_eq!(page.lines().len(), 4);
}

#[tokio::test]
async fn test_wrong_password_over_http() {
    let server = server().await;
    let config = Config::new().base_url(server.base_url()).no_cookie_file();
    let client = connect(config, "jdoe", Some("wrong".into()), &NoPassword).unwrap();

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Authentication(AuthError::Rejected { status: 401 })
    ));
}

#[tokio::test]
async fn test_unknown_query_rejected_over_http() {
    let server = server().await;
    let config = Config::new().base_url(server.base_url()).no_cookie_file();
    let client = connect(config, "jdoe", Some("secret".into()), &NoPassword).unwrap();

    let err = client.execute_query("SELECT nonsense").await.unwrap_err();
    assert!(err.is_protocol_error());
}

#[tokio::test]
async fn test_connection_refused_over_http() {
    // Bind then drop to find a port nobody listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = Config::new()
        .base_url(format!("http://{addr}/Eagle"))
        .no_cookie_file()
        .connect_timeout(Duration::from_secs(2));
    let client = connect(config, "jdoe", Some("secret".into()), &NoPassword).unwrap();

    let err = client.execute_query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_transient());
}
