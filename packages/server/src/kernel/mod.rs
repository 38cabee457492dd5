//! Kernel module - provider traits, adapters and call discipline.

pub mod deps;
pub mod error;
pub mod retry;
pub mod test_dependencies;
pub mod traits;

pub use deps::{AccessControlApi, CrmApi, ForumApi, MarketingApi, ServerDeps};
pub use error::{ProviderError, ProviderResult};
pub use retry::RetryPolicy;
pub use test_dependencies::TestDependencies;
pub use traits::*;
