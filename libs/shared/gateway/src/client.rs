use std::time::Duration;

use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::{
    ApiAck, ApiError, Appointment, AppointmentStatus, Department, Doctor, HourlyCount,
    LoginResponse, MedicalRecord, Medicine, Patient, PrescriptionDetail, RecordSubmission,
    UserRole,
};

/// Filter set for `GET /api/appointments`. The backend widens a doctor-scoped
/// query to the doctor's whole department; the client re-partitions.
#[derive(Debug, Clone, Default)]
pub struct AppointmentQuery {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub role: Option<UserRole>,
    pub date: Option<String>,
}

impl AppointmentQuery {
    pub fn for_doctor(doctor_id: &str) -> Self {
        Self {
            doctor_id: Some(doctor_id.to_string()),
            role: Some(UserRole::Doctor),
            ..Self::default()
        }
    }

    pub fn for_patient(patient_id: &str) -> Self {
        Self {
            patient_id: Some(patient_id.to_string()),
            role: Some(UserRole::Patient),
            ..Self::default()
        }
    }

    pub fn admin_day(date: &str) -> Self {
        Self {
            role: Some(UserRole::Admin),
            date: Some(date.to_string()),
            ..Self::default()
        }
    }

    fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(doctor_id) = &self.doctor_id {
            params.push(format!("doctor_id={}", urlencoding::encode(doctor_id)));
        }
        if let Some(patient_id) = &self.patient_id {
            params.push(format!("patient_id={}", urlencoding::encode(patient_id)));
        }
        if let Some(role) = &self.role {
            params.push(format!("role={role}"));
        }
        if let Some(date) = &self.date {
            params.push(format!("date={}", urlencoding::encode(date)));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

pub struct BackendClient {
    client: Client,
    base_url: String,
    static_token: Option<String>,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            static_token: config.api_bearer_token.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let token = auth_token.or(self.static_token.as_deref());
        if let Some(token) = token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    /// Cache-bust every URL with a `_t` millisecond stamp; the backend sits
    /// behind proxies that would otherwise serve 304s against live data.
    fn url_for(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}_t={}",
            self.base_url,
            path,
            separator,
            Utc::now().timestamp_millis()
        )
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(path);
        debug!("Making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(auth_token))
            .timeout(self.timeout);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Transport(format!(
                    "request to {path} timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = extract_message(&text)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!("API error ({}): {}", status, message);

            return Err(match status.as_u16() {
                404 => ApiError::NotFound(message),
                code => ApiError::Api { status: code, message },
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn mutate(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<ApiAck, ApiError> {
        let ack: ApiAck = self.request(method, path, auth_token, Some(body)).await?;
        if !ack.success {
            let message = ack
                .message
                .unwrap_or_else(|| "operation failed".to_string());
            return Err(ApiError::Api { status: 200, message });
        }
        Ok(ack)
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn list_appointments(
        &self,
        query: &AppointmentQuery,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, ApiError> {
        let path = format!("/appointments{}", query.to_query_string());
        self.request(Method::GET, &path, auth_token, None).await
    }

    pub async fn create_appointment(
        &self,
        appointment: &Appointment,
        auth_token: Option<&str>,
    ) -> Result<ApiAck, ApiError> {
        let body =
            serde_json::to_value(appointment).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.mutate(Method::POST, "/appointments", auth_token, body)
            .await
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
        auth_token: Option<&str>,
    ) -> Result<ApiAck, ApiError> {
        // Only terminal transitions exist; pending is the creation state.
        debug_assert!(status.is_terminal());
        let path = format!("/appointments/{appointment_id}");
        self.mutate(
            Method::PUT,
            &path,
            auth_token,
            json!({ "status": status }),
        )
        .await
    }

    pub async fn appointment_statistics(
        &self,
        date: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<HourlyCount>, ApiError> {
        let mut path = "/appointments/statistics?role=admin".to_string();
        if let Some(date) = date {
            path.push_str(&format!("&date={}", urlencoding::encode(date)));
        }
        self.request(Method::GET, &path, auth_token, None).await
    }

    // ==========================================================================
    // PATIENTS
    // ==========================================================================

    pub async fn list_patients(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Patient>, ApiError> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(offset) = offset {
            params.push(format!("offset={offset}"));
        }
        let path = if params.is_empty() {
            "/patients".to_string()
        } else {
            format!("/patients?{}", params.join("&"))
        };
        self.request(Method::GET, &path, auth_token, None).await
    }

    /// Look up one patient by id or phone. The backend filters on the query
    /// param; of the returned rows the exact id/phone match wins, then the
    /// first row. No match is a `NotFound`, never a fabricated patient.
    pub async fn find_patient(
        &self,
        query: &str,
        auth_token: Option<&str>,
    ) -> Result<Patient, ApiError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ApiError::NotFound("empty patient query".to_string()));
        }

        let path = format!("/patients?query={}", urlencoding::encode(trimmed));
        let mut candidates: Vec<Patient> =
            self.request(Method::GET, &path, auth_token, None).await?;

        if let Some(idx) = candidates
            .iter()
            .position(|p| p.id.eq_ignore_ascii_case(trimmed) || p.phone == trimmed)
        {
            return Ok(candidates.swap_remove(idx));
        }

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("no patient matches '{trimmed}'")))
    }

    pub async fn create_patient(
        &self,
        patient: &Patient,
        auth_token: Option<&str>,
    ) -> Result<ApiAck, ApiError> {
        let body = serde_json::to_value(patient).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.mutate(Method::POST, "/patients", auth_token, body).await
    }

    // ==========================================================================
    // RECORDS & PRESCRIPTIONS
    // ==========================================================================

    pub async fn list_records(
        &self,
        patient_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<MedicalRecord>, ApiError> {
        let path = match patient_id {
            Some(id) => format!("/records?patient_id={}", urlencoding::encode(id)),
            None => "/records".to_string(),
        };
        self.request(Method::GET, &path, auth_token, None).await
    }

    pub async fn list_prescription_details(
        &self,
        record_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<PrescriptionDetail>, ApiError> {
        let path = match record_id {
            Some(id) => format!("/prescription_details?record_id={}", urlencoding::encode(id)),
            None => "/prescription_details".to_string(),
        };
        self.request(Method::GET, &path, auth_token, None).await
    }

    /// `POST /api/records` persists the record and its prescription lines in
    /// one backend transaction (stock is deducted there as well).
    pub async fn save_medical_record(
        &self,
        record: &MedicalRecord,
        details: &[PrescriptionDetail],
        auth_token: Option<&str>,
    ) -> Result<ApiAck, ApiError> {
        let submission = RecordSubmission {
            record: record.clone(),
            details: details.to_vec(),
        };
        let body = serde_json::to_value(&submission).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.mutate(Method::POST, "/records", auth_token, body).await
    }

    // ==========================================================================
    // RESOURCE LISTS
    // ==========================================================================

    pub async fn list_doctors(&self, auth_token: Option<&str>) -> Result<Vec<Doctor>, ApiError> {
        self.request(Method::GET, "/doctors", auth_token, None).await
    }

    pub async fn list_departments(
        &self,
        auth_token: Option<&str>,
    ) -> Result<Vec<Department>, ApiError> {
        self.request(Method::GET, "/departments", auth_token, None)
            .await
    }

    pub async fn list_medicines(
        &self,
        auth_token: Option<&str>,
    ) -> Result<Vec<Medicine>, ApiError> {
        self.request(Method::GET, "/medicines", auth_token, None)
            .await
    }

    // ==========================================================================
    // SESSION
    // ==========================================================================

    pub async fn login(
        &self,
        role: UserRole,
        user_id: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "role": role, "id": user_id, "password": password })),
        )
        .await
    }
}

/// Pull the human-readable `message` (or `error`) field out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)?;
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
