use serde::{Deserialize, Serialize};

use shared_models::Gender;

/// Self-registration form for a new patient account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub phone: String,
    pub password: String,
    pub gender: Gender,
    pub age: u32,
    pub address: Option<String>,
}
