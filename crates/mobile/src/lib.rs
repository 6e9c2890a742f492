pub mod app;
pub mod error;
pub(crate) mod logging;
pub mod platform;
pub mod types;

uniffi::setup_scaffolding!();

/// Initialize logging and panic reporting.
/// Call this once at startup from Kotlin/Swift
#[uniffi::export]
pub fn init_panic_handler() {
    logging::setup_logging();
}
