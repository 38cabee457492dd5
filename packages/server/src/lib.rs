// Membership Access Reconciler - Core
//
// Computes each member's facility entitlement from the CRM and converges the
// access-control platform, the forum and the marketing segments onto it.
//
// Provider clients live in their own crates; domains/ holds the rules and
// kernel/ the provider traits, adapters and retry discipline.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
