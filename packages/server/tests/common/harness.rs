//! Test harness wiring a reconciler to in-memory providers.

use std::sync::Arc;

use server_core::config::SyncSettings;
use server_core::domains::reconciliation::Reconciler;
use server_core::kernel::TestDependencies;
use test_context::AsyncTestContext;

use super::test_settings;

pub struct TestHarness {
    pub deps: TestDependencies,
    pub reconciler: Arc<Reconciler>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Harness with empty providers and the default test settings.
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        Self::with_settings(deps, test_settings())
    }

    pub fn with_settings(deps: TestDependencies, settings: SyncSettings) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let reconciler = Arc::new(Reconciler::new(deps.server_deps(), settings));
        Self { deps, reconciler }
    }
}
