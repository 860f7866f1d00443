use super::*;
use mockito::Matcher;

const REGISTRY: &str = "https://registry.example";

#[test]
fn test_bearer_token_none() {
    let token = BearerToken::none();
    assert!(token.is_empty());
    assert_eq!(token.to_header_value(), None);
    assert_eq!(token, BearerToken::default());
}

#[test]
fn test_bearer_token_header_value() {
    let token = BearerToken::new("my_token");
    assert_eq!(token.as_str(), "my_token");
    assert_eq!(token.to_header_value().unwrap(), "Bearer my_token");
}

#[test]
fn test_bearer_token_debug_hides_value() {
    let token = BearerToken::new("secret-value");
    let debug = format!("{:?}", token);
    assert!(!debug.contains("secret-value"));
    assert!(debug.contains("12 bytes"));
}

#[test]
fn test_auth_challenge_parse_bearer() {
    let header = r#"Bearer realm="https://auth.example/token",service="registry.example""#;

    let challenge = AuthChallenge::parse(REGISTRY, header).unwrap();
    assert_eq!(challenge.scheme, "Bearer");
    assert_eq!(challenge.realm, "https://auth.example/token");
    assert_eq!(challenge.service, "registry.example");
    assert_eq!(challenge.scope, None);
}

#[test]
fn test_auth_challenge_parse_ignores_key_order_and_unknown_keys() {
    let header = r#"Bearer error="insufficient_scope",service="registry.example",scope="repository:alpine:pull",realm="https://auth.example/token""#;

    let challenge = AuthChallenge::parse(REGISTRY, header).unwrap();
    assert_eq!(challenge.realm, "https://auth.example/token");
    assert_eq!(challenge.service, "registry.example");
    assert_eq!(challenge.scope.as_deref(), Some("repository:alpine:pull"));
}

#[test]
fn test_auth_challenge_parse_tolerates_spaces_after_commas() {
    let header = r#"Bearer realm="https://auth.example/token", service="registry.example""#;

    let challenge = AuthChallenge::parse(REGISTRY, header).unwrap();
    assert_eq!(challenge.service, "registry.example");
}

#[test]
fn test_auth_challenge_parse_missing_service() {
    let header = r#"Bearer realm="https://auth.example/token""#;

    let result = AuthChallenge::parse(REGISTRY, header);
    match result.unwrap_err() {
        KlippyError::AuthChallenge { registry, .. } => assert_eq!(registry, REGISTRY),
        other => panic!("Expected AuthChallenge error, got {:?}", other),
    }
}

#[test]
fn test_auth_challenge_parse_missing_realm() {
    let header = r#"Bearer service="registry.example""#;

    let result = AuthChallenge::parse(REGISTRY, header);
    assert!(matches!(
        result.unwrap_err(),
        KlippyError::AuthChallenge { .. }
    ));
}

#[test]
fn test_auth_challenge_parse_empty_realm() {
    let header = r#"Bearer realm="",service="registry.example""#;

    assert!(AuthChallenge::parse(REGISTRY, header).is_err());
}

#[test]
fn test_auth_challenge_parse_invalid_format() {
    let result = AuthChallenge::parse(REGISTRY, "InvalidHeader");
    assert!(matches!(
        result.unwrap_err(),
        KlippyError::AuthChallenge { .. }
    ));
}

#[test]
fn test_token_url_requests_pull_scope() {
    let header = r#"Bearer realm="https://auth.example/token",service="registry.example""#;
    let challenge = AuthChallenge::parse(REGISTRY, header).unwrap();

    assert_eq!(
        challenge.token_url("team/app"),
        "https://auth.example/token?service=registry.example&scope=repository:team/app:pull"
    );
}

// Mock-based tests of the full exchange

fn negotiator() -> Negotiator {
    Negotiator::new(Client::new().unwrap())
}

#[tokio::test]
async fn test_negotiate_without_challenge_returns_empty_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/")
        .with_status(200)
        .with_header("Docker-Distribution-API-Version", "registry/2.0")
        .expect(2)
        .create_async()
        .await;

    let negotiator = negotiator();
    let first = negotiator.negotiate(&server.url(), "team/app").await.unwrap();
    let second = negotiator.negotiate(&server.url(), "team/app").await.unwrap();

    mock.assert_async().await;
    assert!(first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_negotiate_fetches_token_from_realm() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(
        r#"Bearer realm="{}/token",service="registry.example""#,
        server.url()
    );
    let v2 = server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    let token = server
        .mock("GET", "/token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("service".into(), "registry.example".into()),
            Matcher::UrlEncoded("scope".into(), "repository:team/app:pull".into()),
        ]))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"token":"abc123","expires_in":300}"#)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await.unwrap();

    v2.assert_async().await;
    token.assert_async().await;
    assert_eq!(result.as_str(), "abc123");
}

#[tokio::test]
async fn test_negotiate_accepts_access_token_field() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token",service="svc""#, server.url());
    server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"access_token":"xyz"}"#)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await.unwrap();
    assert_eq!(result.as_str(), "xyz");
}

#[tokio::test]
async fn test_negotiate_keeps_non_ascii_challenge() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token",service="régistry""#, server.url());
    server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    let token = server
        .mock("GET", "/token")
        .match_query(Matcher::UrlEncoded("service".into(), "régistry".into()))
        .with_status(200)
        .with_body(r#"{"token":"utf8-token"}"#)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await.unwrap();

    token.assert_async().await;
    assert_eq!(result.as_str(), "utf8-token");
}

#[tokio::test]
async fn test_negotiate_missing_service_is_challenge_error() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token""#, server.url());
    server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await;
    assert!(matches!(
        result.unwrap_err(),
        KlippyError::AuthChallenge { .. }
    ));
}

#[tokio::test]
async fn test_negotiate_empty_token_is_token_error() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token",service="svc""#, server.url());
    server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"token":""}"#)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await;
    assert!(matches!(
        result.unwrap_err(),
        KlippyError::TokenResponse { .. }
    ));
}

#[tokio::test]
async fn test_negotiate_issuer_error_status_is_token_error() {
    let mut server = mockito::Server::new_async().await;
    let challenge = format!(r#"Bearer realm="{}/token",service="svc""#, server.url());
    server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &challenge)
        .create_async()
        .await;
    server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let result = negotiator().negotiate(&server.url(), "team/app").await;
    match result.unwrap_err() {
        KlippyError::TokenResponse { status_code, .. } => assert_eq!(status_code, Some(403)),
        other => panic!("Expected TokenResponse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_negotiate_unreachable_registry_is_network_error() {
    // Port 9 (discard) is not expected to have an HTTP server listening.
    let result = negotiator()
        .negotiate("http://127.0.0.1:9", "team/app")
        .await;

    assert!(matches!(result.unwrap_err(), KlippyError::Network { .. }));
}
