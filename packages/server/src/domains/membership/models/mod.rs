pub mod account;
pub mod term;

pub use account::{Account, AccountCategory, AccountId};
pub use term::{decode_terms, MembershipTerm, PaymentStatus, Tier};
