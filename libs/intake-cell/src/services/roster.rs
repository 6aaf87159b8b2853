use std::sync::Arc;

use tracing::info;

use shared_config::AppConfig;
use shared_gateway::{AppointmentQuery, BackendClient};
use shared_models::{ApiAck, Appointment, AppointmentStatus, UserSession};

use crate::error::IntakeError;

/// The patient's own bookings: list them newest-first, cancel a pending one.
pub struct RosterService {
    gateway: Arc<BackendClient>,
}

impl RosterService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(BackendClient::new(config)),
        }
    }

    pub fn with_client(gateway: Arc<BackendClient>) -> Self {
        Self { gateway }
    }

    pub async fn my_appointments(
        &self,
        session: &UserSession,
    ) -> Result<Vec<Appointment>, IntakeError> {
        let query = AppointmentQuery::for_patient(&session.id);
        let mut appointments = self
            .gateway
            .list_appointments(&query, session.bearer_token())
            .await?;

        // Newest first; create times are zero-padded local datetimes.
        appointments.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(appointments)
    }

    /// pending -> cancelled, the one status transition a patient may drive.
    pub async fn cancel(
        &self,
        session: &UserSession,
        appointment: &Appointment,
    ) -> Result<ApiAck, IntakeError> {
        if appointment.status != AppointmentStatus::Pending {
            return Err(IntakeError::Validation(format!(
                "appointment {} is already {}",
                appointment.id, appointment.status
            )));
        }

        let ack = self
            .gateway
            .update_appointment_status(
                &appointment.id,
                AppointmentStatus::Cancelled,
                session.bearer_token(),
            )
            .await?;

        info!("Appointment {} cancelled by patient", appointment.id);
        Ok(ack)
    }
}
