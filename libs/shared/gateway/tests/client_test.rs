use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_gateway::{AppointmentQuery, BackendClient};
use shared_models::{ApiError, AppointmentStatus};
use shared_utils::test_utils::{Fixtures, MockBackendResponses};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&AppConfig::with_base_url(server.uri()))
}

#[tokio::test]
async fn test_backend_message_surfaced_verbatim_on_error() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            MockBackendResponses::ack_err("you already have a pending booking in this department"),
        ))
        .mount(&mock_server)
        .await;

    let appointment = Fixtures::appointment("APT1", Some("P001"), None);
    let err = client
        .create_appointment(&appointment, None)
        .await
        .expect_err("400 must fail");

    assert_matches!(err, ApiError::Api { status: 400, ref message }
        if message == "you already have a pending booking in this department");
}

#[tokio::test]
async fn test_every_request_is_cache_busted() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    client.list_doctors(None).await.expect("empty list decodes");

    let requests = mock_server
        .received_requests()
        .await
        .expect("requests recorded");
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].url.query_pairs().any(|(k, _)| k == "_t"),
        "expected a _t cache-bust param, got {}",
        requests[0].url
    );
}

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/medicines"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    client
        .list_medicines(Some("session-token"))
        .await
        .expect("authorized fetch succeeds");
}

#[tokio::test]
async fn test_bounded_timeout_is_a_transport_error() {
    let mock_server = MockServer::start().await;
    let mut config = AppConfig::with_base_url(mock_server.uri());
    config.request_timeout_secs = 1;
    let client = BackendClient::new(&config);

    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let err = client
        .list_departments(None)
        .await
        .expect_err("slow response must time out");
    assert_matches!(err, ApiError::Transport(ref msg) if msg.contains("timed out"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected_not_trusted() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "unexpected": "shape" })),
        )
        .mount(&mock_server)
        .await;

    let err = client
        .list_doctors(None)
        .await
        .expect_err("object is not a doctor list");
    assert_matches!(err, ApiError::Decode(_));
}

#[tokio::test]
async fn test_find_patient_prefers_exact_match_over_first_row() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    let fuzzy = Fixtures::patient("P001", "13911112222");
    let exact = Fixtures::patient("P002", "13933334444");

    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(query_param("query", "13933334444"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::patient(&fuzzy),
            MockBackendResponses::patient(&exact),
        ])))
        .mount(&mock_server)
        .await;

    let found = client
        .find_patient("13933334444", None)
        .await
        .expect("patient exists");
    assert_eq!(found.id, "P002");
}

#[tokio::test]
async fn test_find_patient_empty_result_is_not_found() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let err = client
        .find_patient("P404", None)
        .await
        .expect_err("no rows means not found");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_status_sends_terminal_status_body() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("PUT"))
        .and(path("/appointments/APT1"))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::ack_ok("status updated")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    client
        .update_appointment_status("APT1", AppointmentStatus::Completed, None)
        .await
        .expect("update succeeds");
}

#[tokio::test]
async fn test_ack_with_success_false_is_an_error() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::ack_err("medicine MED01 is out of stock"),
        ))
        .mount(&mock_server)
        .await;

    let record = Fixtures::record("R1", "P001", "2026-08-06");
    let err = client
        .save_medical_record(&record, &[], None)
        .await
        .expect_err("unsuccessful ack must fail");
    assert_matches!(err, ApiError::Api { ref message, .. }
        if message == "medicine MED01 is out of stock");
}

#[tokio::test]
async fn test_doctor_query_parameters_are_sent() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", "DOC01"))
        .and(query_param("role", "doctor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = AppointmentQuery::for_doctor("DOC01");
    client
        .list_appointments(&query, None)
        .await
        .expect("doctor-scoped fetch succeeds");
}
