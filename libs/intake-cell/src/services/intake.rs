// libs/intake-cell/src/services/intake.rs
use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;
use shared_gateway::BackendClient;
use shared_models::{Appointment, AppointmentStatus, UserRole, UserSession};
use shared_utils::time::{local_datetime, time_based_id};

use crate::error::IntakeError;
use crate::models::{IntakeContext, IntakeForm, IntakeReceipt};

pub struct IntakeService {
    gateway: Arc<BackendClient>,
}

impl IntakeService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(BackendClient::new(config)),
        }
    }

    pub fn with_client(gateway: Arc<BackendClient>) -> Self {
        Self { gateway }
    }

    /// Fetch the selectable resources and build the form. Department defaults
    /// to the first available; a logged-in patient gets their identity fields
    /// prefilled from their own record and locked.
    pub async fn load_context(
        &self,
        session: Option<&UserSession>,
    ) -> Result<IntakeContext, IntakeError> {
        let token = session.and_then(|s| s.bearer_token());

        let (departments, doctors) = futures::try_join!(
            self.gateway.list_departments(token),
            self.gateway.list_doctors(token),
        )?;

        let mut form = IntakeForm::default();
        if let Some(first) = departments.first() {
            form.department_id = first.id.clone();
        }

        let mut identity_locked = false;
        if let Some(user) = session.filter(|s| s.role == UserRole::Patient) {
            match self.gateway.find_patient(&user.id, token).await {
                Ok(patient) => {
                    form.patient_name = patient.name;
                    form.patient_phone = patient.phone;
                    form.age = patient.age;
                    form.gender = patient.gender;
                    identity_locked = true;
                }
                Err(err) if err.is_not_found() => {
                    warn!("No patient record for logged-in user {}", user.id);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(IntakeContext {
            departments,
            doctors,
            form,
            identity_locked,
        })
    }

    /// Create a pending appointment from the form. Validation failures block
    /// locally; backend rejections (duplicate pending booking, department
    /// with no doctors on duty) surface their message verbatim. On success
    /// the description and doctor choice are cleared; identity fields are
    /// retained for the patient role only, for quick repeat bookings.
    pub async fn submit(
        &self,
        context: &mut IntakeContext,
        session: Option<&UserSession>,
    ) -> Result<IntakeReceipt, IntakeError> {
        let form = &context.form;
        if form.patient_name.trim().is_empty()
            || form.patient_phone.trim().is_empty()
            || form.description.trim().is_empty()
        {
            return Err(IntakeError::Validation(
                "name, phone and a symptom description are required".to_string(),
            ));
        }

        let department_name = context
            .departments
            .iter()
            .find(|d| d.id == form.department_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let doctor_name = form.doctor_id.as_deref().and_then(|id| {
            context
                .doctors
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.name.clone())
        });

        let patient = session.filter(|s| s.role == UserRole::Patient);
        let appointment = Appointment {
            id: time_based_id("APT"),
            patient_id: patient.map(|p| p.id.clone()),
            patient_name: form.patient_name.trim().to_string(),
            patient_phone: form.patient_phone.trim().to_string(),
            gender: form.gender,
            age: form.age,
            department_id: form.department_id.clone(),
            department_name,
            doctor_id: form.doctor_id.clone(),
            doctor_name,
            description: form.description.trim().to_string(),
            status: AppointmentStatus::Pending,
            create_time: local_datetime(),
        };

        let token = session.and_then(|s| s.bearer_token());
        let ack = self.gateway.create_appointment(&appointment, token).await?;

        info!(
            "Appointment {} created for {} in {}",
            appointment.id, appointment.patient_name, appointment.department_name
        );

        context.form.description.clear();
        context.form.doctor_id = None;
        if !context.identity_locked {
            context.form.patient_name.clear();
            context.form.patient_phone.clear();
            context.form.age = 0;
        }

        let ticket = appointment.id[appointment.id.len().saturating_sub(4)..].to_string();

        Ok(IntakeReceipt {
            appointment_id: appointment.id,
            ticket,
            message: ack.message,
        })
    }
}
