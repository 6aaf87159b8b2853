#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::ConsultationSession;
use shared_config::AppConfig;
use shared_gateway::BackendClient;
use shared_models::{Appointment, Patient};
use shared_utils::test_utils::doctor_session;

pub const DOCTOR_ID: &str = "DOC01";

pub fn session_for(server: &MockServer) -> ConsultationSession {
    let config = AppConfig::with_base_url(server.uri());
    let gateway = Arc::new(BackendClient::new(&config));
    ConsultationSession::new(gateway, doctor_session(DOCTOR_ID, "Zhang Wei"))
        .expect("doctor role is accepted")
}

pub async fn mount_queue(server: &MockServer, rows: &[Appointment]) {
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(rows).expect("rows serialize")),
        )
        .mount(server)
        .await;
}

/// Serve `rows` exactly once; mount a later catch-all for subsequent fetches.
pub async fn mount_queue_once(server: &MockServer, rows: &[Appointment]) {
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(rows).expect("rows serialize")),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
}

pub async fn mount_patient(server: &MockServer, query: &str, patient: &Patient) {
    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(query_param("query", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            serde_json::to_value(patient).expect("patient serializes")
        ])))
        .mount(server)
        .await;
}

pub async fn mount_no_patient(server: &MockServer, query: &str) {
    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(query_param("query", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// The history load that follows a successful patient resolution: no prior
/// records, empty medicine list.
pub async fn mount_empty_history(server: &MockServer, patient_id: &str) {
    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("patient_id", patient_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/medicines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}
