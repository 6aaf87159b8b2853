use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use analytics_cell::StatsService;
use shared_config::AppConfig;
use shared_gateway::BackendClient;
use shared_models::{AppointmentStatus, Gender};
use shared_utils::test_utils::Fixtures;

fn service_for(server: &MockServer) -> StatsService {
    let config = AppConfig::with_base_url(server.uri());
    StatsService::with_client(Arc::new(BackendClient::new(&config)))
}

#[tokio::test]
async fn test_day_board_counts_statuses_and_department_load() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    let mut rows = vec![
        Fixtures::appointment("A1", Some("P001"), Some("DOC01")),
        Fixtures::appointment("A2", Some("P002"), Some("DOC01")),
        Fixtures::appointment("A3", Some("P003"), Some("DOC02")),
    ];
    rows[1].status = AppointmentStatus::Completed;
    rows[2].department_name = "Orthopedics".to_string();
    rows[2].department_id = "D02".to_string();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("role", "admin"))
        .and(query_param("date", "2026-08-06"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::to_value(&rows).unwrap()),
        )
        .mount(&mock_server)
        .await;

    let board = service
        .day_board("2026-08-06", None)
        .await
        .expect("board loads");

    assert_eq!(board.total, 3);
    assert_eq!(board.pending, 2);
    assert_eq!(board.completed, 1);
    assert_eq!(board.department_load.len(), 2);
    assert_eq!(board.department_load[0].name, "Cardiology");
    assert_eq!(board.department_load[0].value, 2);
    assert_eq!(board.department_load[1].name, "Orthopedics");
    assert_eq!(board.department_load[1].value, 1);
}

#[tokio::test]
async fn test_dashboard_stats_aggregates_the_resource_lists() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    let mut vip = Fixtures::patient("P001", "13911112222");
    vip.is_vip = Some(true);
    let patients = vec![
        serde_json::to_value(&vip).unwrap(),
        serde_json::to_value(Fixtures::patient("P002", "13933334444")).unwrap(),
    ];

    let mut flu_one = Fixtures::record("R1", "P001", "2026-08-01");
    flu_one.diagnosis = "flu".to_string();
    let mut flu_two = Fixtures::record("R2", "P002", "2026-08-03");
    flu_two.diagnosis = "flu".to_string();
    let mut fracture = Fixtures::record("R3", "P001", "2026-08-02");
    fracture.diagnosis = "fracture".to_string();
    fracture.doctor_id = "DOC02".to_string();
    let records = vec![
        serde_json::to_value(&flu_one).unwrap(),
        serde_json::to_value(&flu_two).unwrap(),
        serde_json::to_value(&fracture).unwrap(),
    ];

    let doctors = vec![
        serde_json::to_value(Fixtures::doctor("DOC01", "D01")).unwrap(),
        serde_json::to_value(Fixtures::doctor("DOC02", "D02")).unwrap(),
    ];
    let departments = vec![
        serde_json::to_value(Fixtures::department("D01", "Cardiology")).unwrap(),
        serde_json::to_value(Fixtures::department("D02", "Orthopedics")).unwrap(),
    ];
    let medicines = vec![
        serde_json::to_value(Fixtures::medicine("MED01", "aspirin", 500)).unwrap(),
        serde_json::to_value(Fixtures::medicine("MED02", "amoxicillin", 40)).unwrap(),
    ];

    for (route, body) in [
        ("/patients", json!(patients)),
        ("/records", json!(records)),
        ("/doctors", json!(doctors)),
        ("/departments", json!(departments)),
        ("/medicines", json!(medicines)),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;
    }

    let stats = service.dashboard_stats(None).await.expect("stats load");

    assert_eq!(stats.total_patients, 2);
    assert_eq!(stats.total_visits, 3);
    assert_eq!(stats.total_doctors, 2);
    assert_eq!(stats.total_medicines, 2);

    assert_eq!(stats.diagnosis_distribution[0].name, "flu");
    assert_eq!(stats.diagnosis_distribution[0].value, 2);

    // Visits land on the department of the treating doctor.
    assert!(stats
        .visits_by_department
        .iter()
        .any(|c| c.name == "Cardiology" && c.value == 2));
    assert!(stats
        .visits_by_department
        .iter()
        .any(|c| c.name == "Orthopedics" && c.value == 1));

    assert_eq!(stats.low_stock_medicines.len(), 1);
    assert_eq!(stats.low_stock_medicines[0].id, "MED02");

    // Most recent visit first.
    assert_eq!(stats.recent_records[0].id, "R2");

    assert_eq!(stats.vip_patients.len(), 1);
    assert_eq!(stats.vip_patients[0].id, "P001");
}

#[tokio::test]
async fn test_demographics_buckets_ages_and_genders() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    let mut child = Fixtures::patient("P001", "1");
    child.age = 10;
    let mut young = Fixtures::patient("P002", "2");
    young.age = 25;
    young.gender = Gender::Female;
    let mut middle = Fixtures::patient("P003", "3");
    middle.age = 45;
    let mut senior = Fixtures::patient("P004", "4");
    senior.age = 70;
    senior.gender = Gender::Female;

    let patients = vec![
        serde_json::to_value(&child).unwrap(),
        serde_json::to_value(&young).unwrap(),
        serde_json::to_value(&middle).unwrap(),
        serde_json::to_value(&senior).unwrap(),
    ];

    for (route, body) in [
        ("/patients", json!(patients)),
        ("/records", json!([])),
        ("/doctors", json!([])),
        ("/departments", json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;
    }

    let demographics = service
        .patient_demographics(None)
        .await
        .expect("demographics load");

    assert_eq!(demographics.total_patients, 4);
    let buckets: Vec<_> = demographics
        .age_distribution
        .iter()
        .map(|c| (c.name.as_str(), c.value))
        .collect();
    assert_eq!(
        buckets,
        vec![("0-18", 1), ("19-35", 1), ("36-60", 1), ("60+", 1)]
    );

    assert!(demographics
        .gender_distribution
        .iter()
        .any(|c| c.name == "male" && c.value == 2));
    assert!(demographics
        .gender_distribution
        .iter()
        .any(|c| c.name == "female" && c.value == 2));
}

#[tokio::test]
async fn test_hourly_trend_passes_through_typed() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/appointments/statistics"))
        .and(query_param("role", "admin"))
        .and(query_param("date", "2026-08-06"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hour": 9, "count": 12 },
            { "hour": 14, "count": 8 },
        ])))
        .mount(&mock_server)
        .await;

    let trend = service
        .hourly_trend(Some("2026-08-06"), None)
        .await
        .expect("trend loads");

    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].hour, 9);
    assert_eq!(trend[0].count, 12);
}
