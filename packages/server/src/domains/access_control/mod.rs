//! Facility access through the access-control platform.

pub mod models;
pub mod provider;

pub use models::{AccessAction, AccessControlSettings, AccessState};
pub use provider::{AccessControlGroup, MOBILE_CREDENTIAL_NAME};
