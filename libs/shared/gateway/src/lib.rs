pub mod client;

pub use client::{AppointmentQuery, BackendClient};
