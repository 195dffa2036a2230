//! Failover prober behavior against mock HTTP endpoints.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statewatch_client::probe_candidates;
use statewatch_core::cycle::AttemptOutcome;
use statewatch_core::resolver::CandidateEndpoint;

const PATH: &str = "/api/state";
const TIMEOUT: Duration = Duration::from_millis(500);

fn endpoint(server: &MockServer) -> CandidateEndpoint {
    CandidateEndpoint::new(server.uri(), false)
}

async fn server_with(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PATH))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn ok_body() -> serde_json::Value {
    json!({
        "system": { "cpu_load": 0.2, "uptime_secs": 120 },
        "device": { "media_present": false }
    })
}

#[tokio::test]
async fn first_success_wins_and_later_candidates_untouched() {
    let a = server_with(ResponseTemplate::new(500)).await;
    let b = server_with(ResponseTemplate::new(500)).await;
    let c = server_with(ResponseTemplate::new(200).set_body_json(ok_body())).await;

    // D would succeed, but must never be contacted.
    let d = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&d)
        .await;

    let candidates = vec![endpoint(&a), endpoint(&b), endpoint(&c), endpoint(&d)];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    assert_eq!(result.resolved.as_ref().map(|e| e.base.clone()), Some(c.uri()));
    assert!(result.state.is_some());
    assert_eq!(result.attempts.len(), 3, "probing stopped at first ok");
    assert_eq!(result.attempts[0].outcome, AttemptOutcome::Error);
    assert_eq!(result.attempts[1].outcome, AttemptOutcome::Error);
    assert_eq!(result.attempts[2].outcome, AttemptOutcome::Ok);
    // d.expect(0) is verified when the server drops.
}

#[tokio::test]
async fn all_candidates_failing_is_reported_not_fatal() {
    let a = server_with(ResponseTemplate::new(500).set_body_string("boom")).await;
    let b = server_with(ResponseTemplate::new(404)).await;
    // Nothing listens on port 9: transport error.
    let dead = CandidateEndpoint::new("http://127.0.0.1:9", false);

    let candidates = vec![endpoint(&a), endpoint(&b), dead];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    assert!(result.all_failed());
    assert!(result.state.is_none());
    assert_eq!(result.attempts.len(), 3, "one record per candidate");
    assert!(result.attempts[0].detail.contains("status 500"));
    assert!(result.attempts[0].detail.contains("boom"));
    assert!(result.attempts[1].detail.contains("status 404"));
    assert!(result.attempts[2].detail.contains("transport"));
    // Attempt order equals candidate order.
    assert_eq!(result.attempts[0].endpoint.base, a.uri());
    assert_eq!(result.attempts[1].endpoint.base, b.uri());
}

#[tokio::test]
async fn slow_candidate_times_out_and_next_is_tried() {
    let slow = server_with(
        ResponseTemplate::new(200)
            .set_body_json(ok_body())
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    let fast = server_with(ResponseTemplate::new(200).set_body_json(ok_body())).await;

    let candidates = vec![endpoint(&slow), endpoint(&fast)];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result =
        probe_candidates(&http, &candidates, PATH, Duration::from_millis(100), &cancel, 1).await;

    assert_eq!(result.attempts.len(), 2);
    assert_eq!(result.attempts[0].outcome, AttemptOutcome::Error);
    assert!(
        result.attempts[0].detail.contains("timeout after 100ms"),
        "got: {}",
        result.attempts[0].detail
    );
    assert_eq!(result.resolved.as_ref().map(|e| e.base.clone()), Some(fast.uri()));
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let bad = server_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>")).await;
    let good = server_with(ResponseTemplate::new(200).set_body_json(ok_body())).await;

    let candidates = vec![endpoint(&bad), endpoint(&good)];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    assert!(result.attempts[0].detail.contains("decode"));
    assert_eq!(result.attempts[1].outcome, AttemptOutcome::Ok);
    assert!(result.state.is_some());
}

#[tokio::test]
async fn ok_attempt_detail_reports_actual_status_line() {
    // Any 2xx counts as success; the record must carry the real status.
    let server = server_with(ResponseTemplate::new(201).set_body_json(ok_body())).await;

    let candidates = vec![endpoint(&server)];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    assert_eq!(result.attempts[0].outcome, AttemptOutcome::Ok);
    assert_eq!(result.attempts[0].detail, "201 Created");
}

#[tokio::test]
async fn protocol_failure_detail_has_status_and_snippet() {
    let server =
        server_with(ResponseTemplate::new(503).set_body_string("maintenance in progress")).await;

    let candidates = vec![endpoint(&server)];
    let http = reqwest::Client::new();
    let cancel = CancellationToken::new();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    let detail = &result.attempts[0].detail;
    assert!(detail.contains("503"), "got: {detail}");
    assert!(detail.contains("maintenance in progress"), "got: {detail}");
}

#[tokio::test]
async fn cancelled_probe_returns_without_attempting() {
    let server = server_with(ResponseTemplate::new(200).set_body_json(ok_body())).await;
    let candidates = vec![endpoint(&server)];
    let http = reqwest::Client::new();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = probe_candidates(&http, &candidates, PATH, TIMEOUT, &cancel, 1).await;

    assert!(result.all_failed());
    assert!(result.attempts.is_empty(), "no attempt after cancellation");
}
