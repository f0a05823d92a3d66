//! Wire-level tests for the client against a mock API server.
//!
//! The client is blocking, so every call runs under `spawn_blocking` while
//! the mock server serves on the test runtime.

use floorlink_client::{
    AreaFilter, ClientConfig, DispatchRequest, FloorLinkClient, FloorLinkError, LineRef,
    MachineFilter, Params, PitchCounts,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::new("sandbox", "test-auth-key", 25)
        .with_username("selftest-user")
        .with_base_url(base_url)
}

/// Mount a sites endpoint that verification will accept.
async fn mount_verification(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"site": "25", "description": "Sandbox plant"}]
        })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> FloorLinkClient {
    let config = test_config(&server.uri());
    tokio::task::spawn_blocking(move || FloorLinkClient::connect(config))
        .await
        .expect("join connect task")
        .expect("connect should succeed")
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_verifies_site_access() {
    let server = MockServer::start().await;
    mount_verification(&server).await;

    let client = connect(&server).await;
    assert_eq!(client.config().site, 25);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(query.contains(&("site".to_string(), "25".to_string())));
    assert!(query.contains(&("auth".to_string(), "test-auth-key".to_string())));
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_fails_on_empty_result_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let result = tokio::task::spawn_blocking(move || FloorLinkClient::connect(config))
        .await
        .unwrap();

    assert!(matches!(result.unwrap_err(), FloorLinkError::Connection(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_fails_when_returned_site_differs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"site": "26"}]
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let result = tokio::task::spawn_blocking(move || FloorLinkClient::connect(config))
        .await
        .unwrap();

    match result.unwrap_err() {
        FloorLinkError::Connection(message) => assert!(message.contains("26")),
        other => panic!("expected Connection error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_fails_on_rejected_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "bad auth"
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let result = tokio::task::spawn_blocking(move || FloorLinkClient::connect(config))
        .await
        .unwrap();

    match result.unwrap_err() {
        FloorLinkError::Connection(message) => assert!(message.contains("bad auth")),
        other => panic!("expected Connection error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_envelope_surfaces_as_request_error() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("GET"))
        .and(path("/machines/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "bad auth"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let result = tokio::task::spawn_blocking(move || client.get_machines(Default::default()))
        .await
        .unwrap();

    match result.unwrap_err() {
        FloorLinkError::Request(message) => assert!(message.contains("bad auth")),
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unset_optional_filters_are_absent_from_the_query() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("GET"))
        .and(path("/machines/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let filter = MachineFilter { machinecode: Some("1032920".to_string()), ..Default::default() };
    tokio::task::spawn_blocking(move || client.get_machines(filter))
        .await
        .unwrap()
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = requests.iter().find(|r| r.url.path() == "/machines/").unwrap();
    let keys: Vec<String> = request.url.query_pairs().map(|(k, _)| k.into_owned()).collect();

    assert!(keys.contains(&"code".to_string()));
    assert!(keys.contains(&"site".to_string()));
    assert!(keys.contains(&"auth".to_string()));
    for absent in ["areacode", "linecode", "externalid"] {
        assert!(!keys.contains(&absent.to_string()), "{absent} should be omitted");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn caller_supplied_site_filter_wins_over_the_default() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("GET"))
        .and(path("/areas/"))
        .and(query_param("site", "7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let filter =
        AreaFilter { extra: [("site", "7")].into_iter().collect::<Params>(), ..Default::default() };
    tokio::task::spawn_blocking(move || client.get_areas(filter))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn increment_cycle_count_posts_the_fixed_form_shape() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("POST"))
        .and(path("/machines/increment_cycle_count/"))
        .and(query_param("auth", "test-auth-key"))
        .and(body_string_contains("code=M1"))
        .and(body_string_contains("cyclecount=4"))
        .and(body_string_contains("skip_lastupdated=1"))
        .and(body_string_contains("site=25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "machine": {"code": "M1", "cyclecount": 21}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let envelope = tokio::task::spawn_blocking(move || client.increment_cycle_count("M1", 4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.field("machine").unwrap()["cyclecount"], 21);

    // The auth key travels in the query string only, never in the body.
    let requests = server.received_requests().await.unwrap();
    let request =
        requests.iter().find(|r| r.url.path() == "/machines/increment_cycle_count/").unwrap();
    let body = String::from_utf8(request.body.clone()).unwrap();
    assert!(!body.contains("auth"));
}

#[tokio::test(flavor = "multi_thread")]
async fn pitch_details_with_no_counts_is_a_local_no_op() {
    let server = MockServer::start().await;
    mount_verification(&server).await;

    let client = connect(&server).await;
    let result = tokio::task::spawn_blocking(move || {
        client.record_pitch_details(
            LineRef::code("Press 1"),
            "2021-04-24 15:30:05",
            "2021-04-24 15:30:06",
            "Flange01",
            PitchCounts::default(),
        )
    })
    .await
    .unwrap()
    .unwrap();

    assert!(result.is_none());
    // Only the verification call reached the server.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/sites/");
}

#[tokio::test(flavor = "multi_thread")]
async fn pitch_details_rejects_inverted_interval_before_sending() {
    let server = MockServer::start().await;
    mount_verification(&server).await;

    let client = connect(&server).await;
    let result = tokio::task::spawn_blocking(move || {
        client.record_pitch_details(
            LineRef::code("Press 1"),
            "2021-04-24 15:30:05",
            "2021-04-24 15:30:04",
            "Flange01",
            PitchCounts { actual: Some(3.0), ..Default::default() },
        )
    })
    .await
    .unwrap();

    assert!(matches!(result.unwrap_err(), FloorLinkError::Validation(_)));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "no pitch request may be sent");
}

#[tokio::test(flavor = "multi_thread")]
async fn pitch_details_sends_normalized_interval_and_set_counts_only() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("GET"))
        .and(path("/pitchdetails/record_details/"))
        .and(query_param("start", "2021-04-24 15:30:05"))
        .and(query_param("end", "2021-04-24 15:30:06"))
        .and(query_param("productcode", "Flange01"))
        .and(query_param("line_externalid", "EXT-9"))
        .and(query_param("actual", "3"))
        .and(query_param("scrap", "1.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 4711}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let envelope = tokio::task::spawn_blocking(move || {
        client.record_pitch_details(
            LineRef::external_id("EXT-9"),
            "2021-04-24T15:30:05",
            "2021-04-24T15:30:06",
            "Flange01",
            PitchCounts { actual: Some(3.0), scrap: Some(1.5), operator_count: None },
        )
    })
    .await
    .unwrap()
    .unwrap()
    .expect("counts were supplied, a record must come back");

    assert_eq!(envelope.field("data").unwrap()["id"], 4711);

    let requests = server.received_requests().await.unwrap();
    let request =
        requests.iter().find(|r| r.url.path() == "/pitchdetails/record_details/").unwrap();
    let keys: Vec<String> = request.url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert!(!keys.contains(&"operator_count".to_string()));
    assert!(!keys.contains(&"linecode".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn open_dispatch_posts_defaults_and_omits_unset_trade() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("POST"))
        .and(path("/dispatches/open/"))
        .and(body_string_contains("dispatchtypecode=CodeRed"))
        .and(body_string_contains("machinecode=1032920"))
        .and(body_string_contains("trade_required=false"))
        .and(body_string_contains("user=selftest-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 99, "description": "Jam on outfeed"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let request = DispatchRequest::new("CodeRed", "Jam on outfeed", "1032920");
    let envelope = tokio::task::spawn_blocking(move || client.open_dispatch(request))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(envelope.field("data").unwrap()["id"], 99);

    let requests = server.received_requests().await.unwrap();
    let sent = requests.iter().find(|r| r.url.path() == "/dispatches/open/").unwrap();
    let body = String::from_utf8(sent.body.clone()).unwrap();
    assert!(!body.contains("tradecode"), "unset tradecode must be omitted");
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_dispatch_rejection_carries_the_server_message() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("POST"))
        .and(path("/dispatches/open/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "This Machine already has an open critical Dispatch."
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let request = DispatchRequest::new("CodeRed", "Jam on outfeed", "1032920");
    let result = tokio::task::spawn_blocking(move || client.open_dispatch(request))
        .await
        .unwrap();

    match result.unwrap_err() {
        FloorLinkError::Request(message) => {
            assert!(message.contains("This Machine already has an open critical Dispatch."));
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn non_envelope_body_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_verification(&server).await;
    Mock::given(method("GET"))
        .and(path("/lines/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy says hi</html>"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let result = tokio::task::spawn_blocking(move || client.get_lines(Default::default()))
        .await
        .unwrap();

    assert!(matches!(result.unwrap_err(), FloorLinkError::Decode(_)));
}
