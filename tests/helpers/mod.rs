pub mod data;
pub mod harness;
pub mod replay;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
static INIT: Once = Once::new();

/// Installs a test subscriber once per binary. `RUST_LOG` picks the level;
/// catalog events stay quiet by default.
#[allow(dead_code)]
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
