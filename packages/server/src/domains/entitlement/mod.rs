//! Access entitlement, derived fresh from an account and its membership terms.

pub mod evaluator;
pub mod models;

pub use evaluator::{evaluate, SENTINEL_EPOCH};
pub use models::{AccountEntitlement, EntitlementError, EntitlementPolicy, TierFlags};
