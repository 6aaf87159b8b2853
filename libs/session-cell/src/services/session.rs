use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_gateway::BackendClient;
use shared_models::{Patient, UserRole, UserSession};
use shared_utils::time::{local_date, time_based_id};

use crate::error::SessionError;
use crate::models::RegisterPatientRequest;

pub struct SessionService {
    gateway: Arc<BackendClient>,
}

impl SessionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(BackendClient::new(config)),
        }
    }

    pub fn with_client(gateway: Arc<BackendClient>) -> Self {
        Self { gateway }
    }

    /// Authenticate against the backend and produce the session carrying the
    /// bearer token every subsequent call uses. Backend failure messages are
    /// surfaced verbatim.
    pub async fn login(
        &self,
        role: UserRole,
        user_id: &str,
        password: &str,
    ) -> Result<UserSession, SessionError> {
        if user_id.trim().is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "user id and password are required".to_string(),
            ));
        }

        debug!("Authenticating {} as {}", user_id, role);
        let response = self.gateway.login(role, user_id, password).await?;

        match (response.success, response.user) {
            (true, Some(user)) => {
                info!("Login succeeded for {} ({})", user.name, user.role);
                Ok(UserSession {
                    id: user.id,
                    name: user.name,
                    role: user.role,
                    token: response.token,
                })
            }
            _ => {
                let message = response
                    .message
                    .unwrap_or_else(|| "login failed".to_string());
                warn!("Login rejected for {}: {}", user_id, message);
                Err(SessionError::AuthFailed(message))
            }
        }
    }

    /// Patient self-registration. Refuses an already-registered phone number
    /// instead of creating a second account for it.
    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<Patient, SessionError> {
        if request.name.trim().is_empty()
            || request.phone.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(SessionError::Validation(
                "name, phone and password are required".to_string(),
            ));
        }

        match self.gateway.find_patient(&request.phone, None).await {
            Ok(existing) => {
                warn!(
                    "Registration blocked: phone {} already belongs to {}",
                    request.phone, existing.id
                );
                return Err(SessionError::Validation(
                    "this phone number is already registered".to_string(),
                ));
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let patient = Patient {
            id: time_based_id("P"),
            name: request.name,
            gender: request.gender,
            age: request.age,
            phone: request.phone,
            address: request.address.unwrap_or_else(|| "not provided".to_string()),
            create_time: local_date(),
            is_vip: None,
            password: Some(request.password),
        };

        self.gateway.create_patient(&patient, None).await?;
        info!("Registered new patient {}", patient.id);

        // The stored credential stays with the backend.
        let mut created = patient;
        created.password = None;
        Ok(created)
    }
}
