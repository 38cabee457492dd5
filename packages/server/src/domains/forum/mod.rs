//! Community forum group membership.

pub mod provider;

pub use provider::{ForumGroup, ForumSettings};
