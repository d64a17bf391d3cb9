//! Integration tests for node execution against a mocked correction service.
//!
//! These tests use wiremock to simulate the correction service and verify
//! request construction, result pass-through, and the failure paths.

use std::time::Duration;

use fuelmcp_node::client::{ClientConfig, CorrectionClient};
use fuelmcp_node::{
    API_URL_INPUT, CorrectionNode, DEFAULT_API_URL, Error, ErrorKind, InvocationRequest, Node,
    NodeService, QUERY_INPUT, ServiceStatus, TEXT_PARAM, node_declaration, resolve,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "calculate VCF for diesel at 25°C";

fn invocation(server: &MockServer) -> InvocationRequest {
    InvocationRequest::new()
        .with_input(QUERY_INPUT, QUERY)
        .with_input(API_URL_INPUT, format!("{}/query", server.uri()))
}

#[tokio::test]
async fn test_missing_query_issues_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let node = CorrectionNode::new();
    let api_url = format!("{}/query", mock_server.uri());

    for query in [None, Some(json!(null)), Some(json!(""))] {
        let mut request = InvocationRequest::new().with_input(API_URL_INPUT, api_url.as_str());
        if let Some(query) = query {
            request = request.with_input(QUERY_INPUT, query);
        }

        let error = node.execute(&request).await.unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_successful_query_passes_result_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param(TEXT_PARAM, QUERY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vcf": 0.9821 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = CorrectionNode::new()
        .execute(&invocation(&mock_server))
        .await
        .unwrap();

    assert_eq!(result.result, json!({ "vcf": 0.9821 }));
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "result": { "vcf": 0.9821 } }));
}

#[tokio::test]
async fn test_request_url_decodes_to_original_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&mock_server)
        .await;

    CorrectionNode::new()
        .execute(&invocation(&mock_server))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let url = &requests[0].url;
    assert_eq!(url.path(), "/query");
    assert!(url.query().unwrap().contains("%C2%B0C"));

    let text: Vec<_> = url
        .query_pairs()
        .filter(|(key, _)| key == TEXT_PARAM)
        .map(|(_, value)| value.into_owned())
        .collect();
    assert_eq!(text, vec![QUERY.to_owned()]);
}

#[test]
fn test_default_api_url_when_absent() {
    let request = InvocationRequest::new().with_input(QUERY_INPUT, QUERY);
    let resolved = resolve(node_declaration(), &request).unwrap();
    let url = resolved.request_url();

    assert_eq!(resolved.api_url.as_str(), DEFAULT_API_URL);
    assert!(url.as_str().starts_with("http://127.0.0.1:8000/query?text="));
    assert_eq!(url.query_pairs().next().unwrap().1, QUERY);
}

#[tokio::test]
async fn test_supplied_api_url_overrides_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/corrections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "density_15c": 991.2 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = InvocationRequest::new()
        .with_input(QUERY_INPUT, "density of HFO at 15°C")
        .with_input(API_URL_INPUT, format!("{}/v2/corrections", mock_server.uri()));

    let result = CorrectionNode::new().execute(&request).await.unwrap();
    assert_eq!(result.result["density_15c"], json!(991.2));
}

#[tokio::test]
async fn test_server_error_is_upstream_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "unknown product"
        })))
        .mount(&mock_server)
        .await;

    let error = CorrectionNode::new()
        .execute(&invocation(&mock_server))
        .await
        .unwrap_err();

    match error {
        Error::UpstreamStatus { status } => assert_eq!(status, 500),
        other => panic!("Expected upstream status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let error = CorrectionNode::new()
        .execute(&invocation(&mock_server))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::MalformedBody(_)));
    assert_eq!(error.kind(), ErrorKind::Serialization);
    assert_eq!(error.status(), None);
}

#[tokio::test]
async fn test_identical_invocations_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vcf": 0.9821 })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vcf": 0.9817 })))
        .mount(&mock_server)
        .await;

    let node = CorrectionNode::new();
    let request = invocation(&mock_server);

    let first = node.execute(&request).await.unwrap();
    let second = node.execute(&request).await.unwrap();

    assert_eq!(first.result, json!({ "vcf": 0.9821 }));
    assert_eq!(second.result, json!({ "vcf": 0.9817 }));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let request = InvocationRequest::new()
        .with_input(QUERY_INPUT, QUERY)
        .with_input(API_URL_INPUT, format!("http://127.0.0.1:{port}/query"));

    let error = CorrectionNode::new().execute(&request).await.unwrap_err();
    assert!(matches!(error, Error::Transport(_)));
    assert_eq!(error.kind(), ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_invocation_timeout_overrides_client_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "vcf": 0.9821 }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let request = invocation(&mock_server).with_timeout(Duration::from_millis(100));
    let error = CorrectionNode::new().execute(&request).await.unwrap_err();

    assert!(matches!(error, Error::Transport(_)));
    assert_eq!(error.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "vcf": 0.9821 }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let service = NodeService::new(CorrectionNode::new());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started_at = std::time::Instant::now();
    let error = service
        .execute_with_cancellation(&invocation(&mock_server), cancel)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Cancelled));
    assert!(started_at.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let mock_server = MockServer::start().await;

    for (product, vcf) in [("diesel", 0.9821), ("hfo", 0.9874)] {
        Mock::given(method("GET"))
            .and(query_param(TEXT_PARAM, format!("vcf {product} 25C")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vcf": vcf })))
            .mount(&mock_server)
            .await;
    }

    let service = NodeService::new(CorrectionNode::new());
    let api_url = format!("{}/query", mock_server.uri());
    let diesel = InvocationRequest::new()
        .with_input(QUERY_INPUT, "vcf diesel 25C")
        .with_input(API_URL_INPUT, api_url.as_str());
    let hfo = InvocationRequest::new()
        .with_input(QUERY_INPUT, "vcf hfo 25C")
        .with_input(API_URL_INPUT, api_url.as_str());

    let (diesel, hfo) = tokio::join!(service.execute(&diesel), service.execute(&hfo));
    assert_eq!(diesel.unwrap().result, json!({ "vcf": 0.9821 }));
    assert_eq!(hfo.unwrap().result, json!({ "vcf": 0.9874 }));
}

#[tokio::test]
async fn test_status_probe() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "mode": "offline"
        })))
        .mount(&mock_server)
        .await;

    let client = CorrectionClient::new(ClientConfig::default().with_timeout(5));
    let api_url = url::Url::parse(&format!("{}/query", mock_server.uri())).unwrap();

    let health = client.status(&api_url).await;
    assert_eq!(health.status, ServiceStatus::Healthy);
    assert_eq!(health.details["mode"], "offline");
    assert!(health.response.is_some());
}

#[tokio::test]
async fn test_status_probe_reports_degraded_and_unhealthy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/degraded/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "tables not loaded"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/down/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = CorrectionClient::default();

    let degraded = url::Url::parse(&format!("{}/degraded/query", mock_server.uri())).unwrap();
    assert_eq!(client.status(&degraded).await.status, ServiceStatus::Degraded);

    let down = url::Url::parse(&format!("{}/down/query", mock_server.uri())).unwrap();
    assert_eq!(client.status(&down).await.status, ServiceStatus::Unhealthy);
}
