use bitrix24_sdk::{
    fetch_all_pages, AccessToken, ApplicationProfile, Bitrix24, Bitrix24Error, Config,
    Credentials, Scope,
};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

const WEBHOOK_PATH: &str = "/rest/1/abc123";

fn webhook_client(server: &Server) -> Bitrix24 {
    Bitrix24::from_webhook(&format!("{}{}/", server.url(), WEBHOOK_PATH)).unwrap()
}

fn oauth_client(server: &Server, refresh_token: &str, client_secret: &str) -> Bitrix24 {
    let config = Config::default()
        .with_scheme("http")
        .with_oauth_server(server.url());
    let token = AccessToken::new("old-token".to_string(), refresh_token.to_string(), None);
    let profile = ApplicationProfile::new("app.123", client_secret, Scope::default());
    let credentials = Credentials::oauth(server.host_with_port(), token, profile);
    Bitrix24::with_config(credentials, config).unwrap()
}

fn token_reply(server: &Server) -> String {
    json!({
        "access_token": "new-token",
        "refresh_token": "new-refresh",
        "expires": 1893456000,
        "expires_in": 3600,
        "scope": "crm",
        "domain": "oauth.bitrix.info",
        "server_endpoint": "https://oauth.bitrix.info/rest/",
        "client_endpoint": format!("{}/rest/", server.url()),
        "member_id": "member1",
        "user_id": 1,
        "status": "L"
    })
    .to_string()
}

#[test]
fn test_webhook_call() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/rest/1/abc123/app.info.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": {"ID": 7, "CODE": "local.app", "STATUS": "L"}, "time": {"start": 1.0, "finish": 1.1, "duration": 0.1, "processing": 0.05, "date_start": "2024-03-01T10:00:00+03:00", "date_finish": "2024-03-01T10:00:01+03:00"}}"#)
        .create();

    let b24 = webhook_client(&server);
    let response = b24.core().call("app.info", ()).unwrap();

    mock.assert();
    assert_eq!(response.get_string("CODE").as_deref(), Some("local.app"));
    assert!(response.time.is_some());
}

#[test]
fn test_webhook_expired_token_is_not_renewed() {
    let mut server = Server::new();
    let call = server
        .mock("POST", "/rest/1/abc123/profile.json")
        .with_status(401)
        .with_body(r#"{"error": "expired_token", "error_description": "The access token provided has expired."}"#)
        .expect(1)
        .create();
    let renewal = server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::Any)
        .expect(0)
        .create();

    let b24 = webhook_client(&server);
    let error = b24.core().call("profile", ()).unwrap_err();

    call.assert();
    renewal.assert();
    assert!(matches!(error, Bitrix24Error::ExpiredToken));
}

#[test]
fn test_expired_token_renewed_and_retried() {
    let mut server = Server::new();
    let expired = server
        .mock("POST", "/rest/crm.deal.get.json")
        .match_body(Matcher::PartialJson(json!({"id": 5, "auth": "old-token"})))
        .with_status(401)
        .with_body(r#"{"error": "expired_token", "error_description": "The access token provided has expired."}"#)
        .expect(1)
        .create();
    let renewal = server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("client_id".into(), "app.123".into()),
            Matcher::UrlEncoded("client_secret".into(), "app-secret".into()),
            Matcher::UrlEncoded("refresh_token".into(), "old-refresh".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_reply(&server))
        .expect(1)
        .create();
    let retried = server
        .mock("POST", "/rest/crm.deal.get.json")
        .match_body(Matcher::PartialJson(json!({"id": 5, "auth": "new-token"})))
        .with_status(200)
        .with_body(r#"{"result": {"ID": "5", "TITLE": "Renewed"}}"#)
        .expect(1)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    let renewed_tokens = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&renewed_tokens);
    b24.on_token_renewed(move |renewed| {
        captured.lock().unwrap().push(renewed.access_token.clone());
    });

    let deal = b24.crm().deal().get(5).unwrap();

    expired.assert();
    renewal.assert();
    retried.assert();
    assert_eq!(deal.title.as_deref(), Some("Renewed"));
    assert_eq!(*renewed_tokens.lock().unwrap(), vec!["new-token".to_string()]);

    let credentials = b24.core().credentials();
    let token = credentials.access_token().unwrap();
    assert_eq!(token.access_token, "new-token");
    assert_eq!(token.refresh_token, "new-refresh");
    assert_eq!(b24.core().domain(), server.host_with_port());
}

#[test]
fn test_retry_happens_only_once() {
    let mut server = Server::new();
    let calls = server
        .mock("POST", "/rest/profile.json")
        .with_status(401)
        .with_body(r#"{"error": "expired_token", "error_description": "The access token provided has expired."}"#)
        .expect(2)
        .create();
    let renewal = server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(token_reply(&server))
        .expect(1)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    let error = b24.main().current_user_profile().unwrap_err();

    calls.assert();
    renewal.assert();
    assert!(matches!(error, Bitrix24Error::ExpiredToken));
}

#[test]
fn test_concurrent_expiry_renews_once() {
    const THREADS: usize = 8;

    let mut server = Server::new();
    let expired = server
        .mock("POST", "/rest/profile.json")
        .match_body(Matcher::PartialJson(json!({"auth": "old-token"})))
        .with_status(401)
        .with_body(r#"{"error": "expired_token", "error_description": "The access token provided has expired."}"#)
        .expect_at_least(1)
        .create();
    let renewal = server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(token_reply(&server))
        .expect(1)
        .create();
    let retried = server
        .mock("POST", "/rest/profile.json")
        .match_body(Matcher::PartialJson(json!({"auth": "new-token"})))
        .with_status(200)
        .with_body(r#"{"result": {"ID": "1", "ADMIN": true}}"#)
        .expect(THREADS)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let b24 = b24.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                b24.core().call("profile", ())
            })
        })
        .collect();

    for handle in handles {
        let response = handle.join().unwrap().unwrap();
        assert_eq!(response.get_string("ID").as_deref(), Some("1"));
    }

    expired.assert();
    renewal.assert();
    retried.assert();
}

#[test]
fn test_forced_renewal() {
    let mut server = Server::new();
    let renewal = server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::UrlEncoded("refresh_token".into(), "old-refresh".into()))
        .with_status(200)
        .with_body(token_reply(&server))
        .expect(1)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    let renewed = b24.core().renew_access_token().unwrap();

    renewal.assert();
    assert_eq!(renewed.access_token, "new-token");
    assert_eq!(renewed.member_id, "member1");
    let credentials = b24.core().credentials();
    assert_eq!(credentials.access_token().unwrap().refresh_token, "new-refresh");

    let webhook = webhook_client(&server);
    assert!(matches!(
        webhook.core().renew_access_token(),
        Err(Bitrix24Error::InvalidArgument(_))
    ));
}

#[test]
fn test_listener_can_register_listener() {
    let mut server = Server::new();
    server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(token_reply(&server))
        .expect(2)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    let seen = Arc::new(Mutex::new(Vec::new()));

    let inner = b24.clone();
    let outer_seen = Arc::clone(&seen);
    b24.on_token_renewed(move |_| {
        outer_seen.lock().unwrap().push("outer");
        let inner_seen = Arc::clone(&outer_seen);
        inner.on_token_renewed(move |_| inner_seen.lock().unwrap().push("inner"));
    });

    b24.core().renew_access_token().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["outer"]);

    b24.core().renew_access_token().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["outer", "outer", "inner"]);
}

#[test]
fn test_list_all_follows_next() {
    let mut server = Server::new();
    let first = server
        .mock("POST", "/rest/1/abc123/sale.order.list.json")
        .match_body(Matcher::PartialJson(json!({"start": 0, "select": ["ID"]})))
        .with_status(200)
        .with_body(r#"{"result": {"items": [1, 2]}, "total": 3, "next": 2}"#)
        .expect(1)
        .create();
    let second = server
        .mock("POST", "/rest/1/abc123/sale.order.list.json")
        .match_body(Matcher::PartialJson(json!({"start": 2})))
        .with_status(200)
        .with_body(r#"{"result": {"items": [3]}, "total": 3}"#)
        .expect(1)
        .create();

    let b24 = webhook_client(&server);
    let items: Vec<i64> = b24
        .core()
        .list_all("sale.order.list", json!({"select": ["ID"]}))
        .unwrap();

    first.assert();
    second.assert();
    assert_eq!(items, vec![1, 2, 3]);
}

#[test]
fn test_fetch_all_pages_without_total() {
    let mut server = Server::new();
    let first = server
        .mock("POST", "/rest/1/abc123/crm.item.list.json")
        .match_body(Matcher::PartialJson(json!({"start": 0})))
        .with_status(200)
        .with_body(r#"{"result": [{"ID": 1}, {"ID": 2}], "next": 2}"#)
        .expect(1)
        .create();
    let second = server
        .mock("POST", "/rest/1/abc123/crm.item.list.json")
        .match_body(Matcher::PartialJson(json!({"start": 2})))
        .with_status(200)
        .with_body(r#"{"result": [{"ID": 3}]}"#)
        .expect(1)
        .create();
    let batch = server
        .mock("POST", "/rest/1/abc123/batch.json")
        .expect(0)
        .create();

    let b24 = webhook_client(&server);
    let items: Vec<Value> = fetch_all_pages(b24.core(), "crm.item.list", json!({})).unwrap();

    first.assert();
    second.assert();
    batch.assert();
    let ids: Vec<i64> = items.iter().filter_map(|item| item["ID"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_renewal_failure() {
    let mut server = Server::new();
    server
        .mock("POST", "/rest/profile.json")
        .with_status(401)
        .with_body(r#"{"error": "expired_token", "error_description": ""}"#)
        .expect(1)
        .create();
    server
        .mock("GET", "/oauth/token/")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid refresh token"}"#)
        .create();

    let b24 = oauth_client(&server, "old-refresh", "app-secret");
    match b24.main().current_user_profile().unwrap_err() {
        Bitrix24Error::TokenRenewal { code, description } => {
            assert_eq!(code, "invalid_grant");
            assert_eq!(description, "Invalid refresh token");
        }
        other => panic!("expected TokenRenewal, got {:?}", other),
    }
}

#[test]
fn test_renewal_requires_refresh_token_and_secret() {
    let mut server = Server::new();
    server
        .mock("POST", "/rest/profile.json")
        .with_status(401)
        .with_body(r#"{"error": "expired_token"}"#)
        .create();

    let without_refresh = oauth_client(&server, "", "app-secret");
    assert!(matches!(
        without_refresh.main().current_user_profile(),
        Err(Bitrix24Error::NoRefreshToken)
    ));

    let without_secret = oauth_client(&server, "old-refresh", "");
    assert!(matches!(
        without_secret.main().current_user_profile(),
        Err(Bitrix24Error::NoClientSecret)
    ));
}

#[test]
fn test_api_error_mapping() {
    let mut server = Server::new();
    server
        .mock("POST", "/rest/1/abc123/crm.deal.get.json")
        .with_status(400)
        .with_body(r#"{"error": "", "error_description": "Not found"}"#)
        .create();
    server
        .mock("POST", "/rest/1/abc123/crm.deal.list.json")
        .with_status(503)
        .with_body(r#"{"error": "QUERY_LIMIT_EXCEEDED", "error_description": "Too many requests"}"#)
        .create();
    server
        .mock("POST", "/rest/1/abc123/crm.unknown.json")
        .with_status(404)
        .with_body(r#"{"error": "ERROR_METHOD_NOT_FOUND", "error_description": "Method not found!"}"#)
        .create();

    let b24 = webhook_client(&server);

    let not_found = b24.crm().deal().get(999).unwrap_err();
    assert!(not_found.is_not_found());

    let limited = b24.core().call("crm.deal.list", ()).unwrap_err();
    assert!(limited.is_query_limit_exceeded());
    assert_eq!(limited.status_code(), Some(503));

    match b24.core().call("crm.unknown", ()).unwrap_err() {
        Bitrix24Error::MethodNotFound(method) => assert_eq!(method, "crm.unknown"),
        other => panic!("expected MethodNotFound, got {:?}", other),
    }
}

#[test]
fn test_batch_is_split_in_chunks() {
    let mut server = Server::new();

    let first_results: serde_json::Map<String, Value> = (0..50)
        .map(|i| (format!("c{}", i), json!({"ID": i.to_string()})))
        .collect();
    let first = server
        .mock("POST", "/rest/1/abc123/batch.json")
        .match_body(Matcher::PartialJson(json!({"halt": 0, "cmd": {"c0": "crm.deal.get?id=0"}})))
        .with_status(200)
        .with_body(
            json!({"result": {"result": first_results, "result_error": [], "result_total": [], "result_next": [], "result_time": []}})
                .to_string(),
        )
        .expect(1)
        .create();
    let second = server
        .mock("POST", "/rest/1/abc123/batch.json")
        .match_body(Matcher::PartialJson(json!({"cmd": {"c50": "crm.deal.get?id=50"}})))
        .with_status(200)
        .with_body(
            json!({"result": {
                "result": [],
                "result_error": {"c50": {"error": "", "error_description": "Not found"}},
                "result_total": [],
                "result_next": [],
                "result_time": []
            }})
            .to_string(),
        )
        .expect(1)
        .create();

    let b24 = webhook_client(&server);
    let mut batch = b24.batch();
    for i in 0..51 {
        batch
            .add_named(&format!("c{}", i), "crm.deal.get", json!({"id": i}))
            .unwrap();
    }
    assert_eq!(batch.len(), 51);

    let result = batch.execute().unwrap();

    first.assert();
    second.assert();
    assert_eq!(result.raw("c7"), Some(&json!({"ID": "7"})));
    assert!(result.has_errors());
    assert!(result.get::<Value>("c50").unwrap_err().is_not_found());
    assert_eq!(result.results().count(), 50);
    assert!(result.into_result().is_err());
}

#[test]
fn test_batch_rejects_duplicate_ids() {
    let server = Server::new();
    let b24 = webhook_client(&server);
    let mut batch = b24.batch();

    batch.add_named("deal", "crm.deal.get", json!({"id": 1})).unwrap();
    assert!(batch.add_named("deal", "crm.deal.get", json!({"id": 2})).is_err());
    assert!(batch.add_named("", "crm.deal.get", json!({"id": 3})).is_err());
}
