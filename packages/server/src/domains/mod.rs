// Business domains
pub mod access_control;
pub mod entitlement;
pub mod forum;
pub mod marketing;
pub mod membership;
pub mod reconciliation;
