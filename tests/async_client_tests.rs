mod common;

use clash_capi::models::ProxyType;
use clash_capi::{AsyncClient, DelayTest, Error};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fixture_json, init_tracing, TOKEN};

async fn setup() -> (MockServer, AsyncClient) {
    init_tracing();
    let server = MockServer::start().await;
    let client = AsyncClient::new(server.uri(), TOKEN).unwrap();
    (server, client)
}

async fn mount_json(server: &MockServer, http_method: &str, at: &str, body: serde_json::Value) {
    Mock::given(method(http_method))
        .and(path(at))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_version() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "GET",
        "/version",
        json!({ "meta": true, "version": "alpha-g3a9fc39" }),
    )
    .await;

    let version = client.get_version().await.unwrap();
    assert!(version.meta);
    assert_eq!(version.version, "alpha-g3a9fc39");
}

#[tokio::test]
async fn test_get_proxies() {
    let (server, client) = setup().await;
    mount_json(&server, "GET", "/proxies", fixture_json("proxies.json")).await;

    let proxies = client.get_proxies().await.unwrap();
    assert_eq!(proxies.len(), 7);
    assert!(proxies.iter().any(|p| p.name == "GLOBAL"));
}

#[tokio::test]
async fn test_get_providers() {
    let (server, client) = setup().await;
    mount_json(&server, "GET", "/proxies", fixture_json("proxies.json")).await;
    mount_json(
        &server,
        "GET",
        "/providers/proxies",
        fixture_json("providers.json"),
    )
    .await;

    let providers = client.get_providers().await.unwrap();
    assert!(!providers.is_empty());
    assert!(!providers[0].proxies.is_empty());
}

#[tokio::test]
async fn test_get_providers_fails_fast_on_second_call() {
    let (server, client) = setup().await;
    mount_json(&server, "GET", "/proxies", fixture_json("proxies.json")).await;
    Mock::given(method("GET"))
        .and(path("/providers/proxies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.get_providers().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_get_selectors() {
    let (server, client) = setup().await;
    mount_json(&server, "GET", "/proxies", fixture_json("proxies.json")).await;
    mount_json(
        &server,
        "GET",
        "/providers/proxies",
        fixture_json("providers.json"),
    )
    .await;

    let selectors = client.get_selectors().await.unwrap();
    assert!(!selectors.is_empty());
    assert!(selectors[0].test_url().is_empty());
    assert!(selectors
        .iter()
        .all(|s| s.proxy().proxy_type == ProxyType::Selector));
}

#[tokio::test]
async fn test_select_proxy_for_provider() {
    let (server, client) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/proxies/test_provider"))
        .and(body_json(json!({ "name": "test_proxy" })))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/proxies/test_provider"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    assert!(client
        .select_proxy_for_provider("test_provider", "test_proxy")
        .await
        .unwrap());
    assert!(!client
        .select_proxy_for_provider("test_provider", "test_proxy")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_get_delay() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/proxies/test_provider/delay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 120 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxies/test_provider/delay"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "delay": 120 })))
        .mount(&server)
        .await;

    assert_eq!(client.get_delay("test_provider").await.unwrap(), 120);
    assert_eq!(client.get_delay("test_provider").await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_delay_with_test_url() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/proxies/HK%2001/delay"))
        .and(query_param("timeout", "3000"))
        .and(query_param("url", "https://cp.cloudflare.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "delay": 87 })))
        .mount(&server)
        .await;

    let test = DelayTest::new("https://cp.cloudflare.com", 3000);
    assert_eq!(client.get_delay_with("HK 01", &test).await.unwrap(), 87);
}

#[tokio::test]
async fn test_get_connections() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "GET",
        "/connections",
        fixture_json("connections.json"),
    )
    .await;

    let snapshot = client.get_connections().await.unwrap();
    assert!(!snapshot.connections.is_empty());
    assert_eq!(snapshot.download_total, 9316438);
}

#[tokio::test]
async fn test_search_connections_by_host() {
    let (server, client) = setup().await;
    mount_json(
        &server,
        "GET",
        "/connections",
        fixture_json("connections.json"),
    )
    .await;

    let keyword = "qq.com";
    let connections = client.search_connections_by_host(keyword).await.unwrap();
    assert!(connections[0].metadata.host.contains(keyword));
    assert!(client
        .search_connections_by_host("example.org")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_close_connection() {
    let (server, client) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/connections/id"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/connections/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.close_connection("id").await.unwrap());
    assert!(!client.close_connection("gone").await.unwrap());
}

#[tokio::test]
async fn test_close_connection_never_reaches_close_all() {
    let (server, client) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/connections"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    for id in ["..", ".", ""] {
        let err = client.close_connection(id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }), "{id:?}: {err:?}");
    }
    assert!(matches!(
        client
            .select_proxy_for_provider("..", "DIRECT")
            .await
            .unwrap_err(),
        Error::InvalidUrl { .. }
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_close_all_connections() {
    let (server, client) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/connections"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.close_all_connections().await.unwrap());
}

#[tokio::test]
async fn test_dns_query() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/dns/query"))
        .and(query_param("name", "baidu.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_json("dns_query.json")))
        .mount(&server)
        .await;

    let query = client.dns_query("baidu.com").await.unwrap();
    assert!(!query.question.is_empty());
    assert_eq!(query.answer[0].data, "39.156.66.10");
    assert_eq!(query.answer[0].rr_type, 1);
}

#[tokio::test]
async fn test_dns_query_type() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/dns/query"))
        .and(query_param("name", "baidu.com"))
        .and(query_param("type", "AAAA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": 0,
            "Question": [{ "Name": "baidu.com.", "Qtype": 28, "Qclass": 1 }]
        })))
        .mount(&server)
        .await;

    let query = client.dns_query_type("baidu.com", "AAAA").await.unwrap();
    assert_eq!(query.question[0].qtype, 28);
    assert!(query.answer.is_empty());
}

#[tokio::test]
async fn test_read_error_status_propagates() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&server)
        .await;

    match client.get_version().await.unwrap_err() {
        Error::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_incomplete_body_is_decode_error() {
    let (server, client) = setup().await;
    mount_json(&server, "GET", "/version", json!({ "meta": true })).await;

    assert!(matches!(
        client.get_version().await.unwrap_err(),
        Error::Decode(_)
    ));
}

#[tokio::test]
async fn test_unreachable_controller_is_transport_error() {
    init_tracing();
    let client = AsyncClient::new("http://127.0.0.1:1", TOKEN).unwrap();
    assert!(matches!(
        client.get_version().await.unwrap_err(),
        Error::Http(_)
    ));
    // sentinel operations still surface transport failures
    assert!(client.close_connection("id").await.is_err());
}

#[tokio::test]
async fn test_bad_base_url_surfaces_on_call() {
    let client = AsyncClient::new("not a url", TOKEN).unwrap();
    assert!(matches!(
        client.get_version().await.unwrap_err(),
        Error::InvalidUrl { .. }
    ));
}
