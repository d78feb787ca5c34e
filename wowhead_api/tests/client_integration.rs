use std::time::Duration;

use wowhead_api::{Client, Error, Resource};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_spell_page_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tbc/spell=3915"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Requires Tailoring</html>"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let body = client.fetch_text(&Resource::Spell(3915)).await.unwrap();
    assert!(body.contains("Requires Tailoring"));
}

#[tokio::test]
async fn fetch_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tbc/item=2589"))
        .and(header("user-agent", "forge-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        Client::with_base_urls(&mock_server.uri(), &mock_server.uri(), "forge-test/1.0").unwrap();
    let body = client.fetch_text(&Resource::Item(2589)).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn fetch_item_xml_uses_query_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tbc/item=2589"))
        .and(query_param("xml", ""))
        .respond_with(ResponseTemplate::new(200).set_body_string("<wowhead/>"))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tbc/item=2589"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html/>"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    assert_eq!(
        client.fetch_text(&Resource::ItemXml(2589)).await.unwrap(),
        "<wowhead/>"
    );
    assert_eq!(
        client.fetch_text(&Resource::Item(2589)).await.unwrap(),
        "<html/>"
    );
}

#[tokio::test]
async fn rate_limited_response_carries_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tbc/spell=1"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_string("slow down"),
        )
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let err = client.fetch_text(&Resource::Spell(1)).await.unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    match err {
        Error::HttpStatus { body, .. } => assert_eq!(body, "slow down"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_without_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/db2/SkillLineAbility/csv"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri()).unwrap();
    let err = client
        .fetch_text(&Resource::skill_line_ability())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.retry_after(), None);
}

#[tokio::test]
async fn unreachable_host_is_request_failure() {
    let client = Client::with_base_url("http://127.0.0.1:1").unwrap();
    let err = client.fetch_text(&Resource::Spell(1)).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed));
}
