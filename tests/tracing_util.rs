use tracing_subscriber::EnvFilter;

/// Installs a thread-default fmt subscriber for the duration of a test so
/// instrumentation in the pipeline is exercised (and visible with
/// `RUST_LOG=debug cargo test -- --nocapture`).
pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { _guard: guard }
    }
}
