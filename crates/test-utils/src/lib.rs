//! Test fakes for lumen.
//!
//! - [`RecordingConsumer`] records a scene traversal as [`ConsumerEvent`]s.
//! - [`RecordingShader`] records the calls a verifier forwards to it.
//! - [`FakeTargetFactory`] hands out numbered targets and counts lifecycle calls.
//!
//! Use these from integration tests under a crate's `tests/` directory.

mod consumer;
mod factory;
mod shader;

pub use consumer::{ConsumerEvent, RecordingConsumer};
pub use factory::{FakeFactoryError, FakeTarget, FakeTargetFactory};
pub use shader::{RecordingShader, ShaderCall, TestMaterial};

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`, defaulting to `warn`. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn crate_info() -> &'static str {
    "lumen-test-utils v0.1.0"
}
