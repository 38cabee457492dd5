//! Membership source records, decoded into typed accounts and terms.

pub mod errors;
pub mod fields;
pub mod models;

pub use errors::DecodeError;
pub use models::{
    decode_terms, Account, AccountCategory, AccountId, MembershipTerm, PaymentStatus, Tier,
};
