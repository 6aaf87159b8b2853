use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentStatus, Department, Doctor, Gender, MedicalRecord, Medicine, Patient,
    PrescriptionDetail, UserRole, UserSession,
};

pub struct TestConfig {
    pub api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            api_bearer_token: None,
            request_timeout_secs: 3,
            queue_poll_interval_secs: 10,
        }
    }
}

pub fn doctor_session(id: &str, name: &str) -> UserSession {
    UserSession {
        id: id.to_string(),
        name: name.to_string(),
        role: UserRole::Doctor,
        token: Some(format!("test-token-{}", Uuid::new_v4())),
    }
}

pub fn patient_session(id: &str, name: &str) -> UserSession {
    UserSession {
        id: id.to_string(),
        name: name.to_string(),
        role: UserRole::Patient,
        token: Some(format!("test-token-{}", Uuid::new_v4())),
    }
}

pub fn admin_session() -> UserSession {
    UserSession {
        id: "admin".to_string(),
        name: "Administrator".to_string(),
        role: UserRole::Admin,
        token: Some(format!("test-token-{}", Uuid::new_v4())),
    }
}

/// Typed entity fixtures. Fields are public; tests adjust what they need.
pub struct Fixtures;

impl Fixtures {
    pub fn appointment(id: &str, patient_id: Option<&str>, doctor_id: Option<&str>) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_id: patient_id.map(str::to_string),
            patient_name: "Liu Yang".to_string(),
            patient_phone: "13911112222".to_string(),
            gender: Gender::Male,
            age: 45,
            department_id: "D01".to_string(),
            department_name: "Cardiology".to_string(),
            doctor_id: doctor_id.map(str::to_string),
            doctor_name: doctor_id.map(|_| "Zhang Wei".to_string()),
            description: "chest tightness for two days".to_string(),
            status: AppointmentStatus::Pending,
            create_time: "2026-08-06 08:30:00".to_string(),
        }
    }

    pub fn patient(id: &str, phone: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: "Liu Yang".to_string(),
            gender: Gender::Male,
            age: 45,
            phone: phone.to_string(),
            address: "Zhongguancun, Haidian".to_string(),
            create_time: "2023-01-10".to_string(),
            is_vip: Some(false),
            password: None,
        }
    }

    pub fn doctor(id: &str, department_id: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: "Zhang Wei".to_string(),
            department_id: department_id.to_string(),
            specialty: "hypertension".to_string(),
            phone: "13800001111".to_string(),
            title: "chief physician".to_string(),
            pending_count: Some(0),
        }
    }

    pub fn department(id: &str, name: &str) -> Department {
        Department {
            id: id.to_string(),
            name: name.to_string(),
            location: "Outpatient building 2F".to_string(),
        }
    }

    pub fn medicine(id: &str, name: &str, stock: i64) -> Medicine {
        Medicine {
            id: id.to_string(),
            name: name.to_string(),
            price: 15.5,
            stock,
            specification: "100mg x 30".to_string(),
        }
    }

    pub fn record(id: &str, patient_id: &str, visit_date: &str) -> MedicalRecord {
        MedicalRecord {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            patient_name: "Liu Yang".to_string(),
            doctor_id: "DOC01".to_string(),
            doctor_name: "Zhang Wei".to_string(),
            diagnosis: "primary hypertension".to_string(),
            treatment_plan: "medication, low-salt diet".to_string(),
            visit_date: visit_date.to_string(),
        }
    }

    pub fn detail(id: &str, record_id: &str, medicine_id: &str, days: u32) -> PrescriptionDetail {
        PrescriptionDetail {
            id: id.to_string(),
            record_id: record_id.to_string(),
            medicine_id: medicine_id.to_string(),
            dosage: "100mg".to_string(),
            usage: "orally, once daily".to_string(),
            days,
        }
    }
}

/// JSON bodies in the backend's dialect, for mounting on a wiremock server.
pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn list(items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    pub fn appointment(appointment: &Appointment) -> Value {
        serde_json::to_value(appointment).expect("appointment fixture serializes")
    }

    pub fn patient(patient: &Patient) -> Value {
        serde_json::to_value(patient).expect("patient fixture serializes")
    }

    pub fn ack_ok(message: &str) -> Value {
        json!({ "success": true, "message": message })
    }

    pub fn ack_err(message: &str) -> Value {
        json!({ "success": false, "message": message })
    }

    pub fn login_ok(id: &str, name: &str, role: &str) -> Value {
        json!({
            "success": true,
            "user": { "id": id, "name": name, "role": role },
            "token": format!("issued-token-{id}")
        })
    }

    pub fn login_err(message: &str) -> Value {
        json!({ "success": false, "message": message })
    }

    pub fn hourly(buckets: &[(u32, u64)]) -> Value {
        Value::Array(
            buckets
                .iter()
                .map(|(hour, count)| json!({ "hour": hour, "count": count }))
                .collect(),
        )
    }
}
