use std::panic::PanicHookInfo;
use std::sync::Once;

use tracing_subscriber::{filter::FilterFn, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(target_os = "android")]
const LOG_TAG: &str = "Larder-Rust";

fn ours(module_path: Option<&str>) -> bool {
    module_path.unwrap_or_default().starts_with("larder")
}

/// Install the tracing subscriber and panic hook. Safe to call repeatedly.
pub(crate) fn setup_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        let filter = FilterFn::new(|meta| ours(meta.module_path()));
        let registry = tracing_subscriber::registry().with(filter);

        #[cfg(target_os = "android")]
        {
            use tracing_logcat::{LogcatMakeWriter, LogcatTag};
            use tracing_subscriber::fmt::format::Format;

            match LogcatMakeWriter::new(LogcatTag::Fixed(LOG_TAG.to_owned())) {
                Ok(writer) => {
                    let layer = tracing_subscriber::fmt::layer()
                        .event_format(Format::default().with_level(false).without_time())
                        .with_writer(writer)
                        .with_ansi(false);
                    let _ = registry.with(layer).try_init();
                }
                Err(e) => eprintln!("{LOG_TAG}: logcat unavailable: {e}"),
            }
        }

        #[cfg(not(target_os = "android"))]
        {
            let layer = tracing_subscriber::fmt::layer().with_target(true);
            let _ = registry.with(layer).try_init();
        }

        std::panic::set_hook(Box::new(panic_hook));
    })
}

fn panic_hook(info: &PanicHookInfo) {
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("{info}\n{backtrace}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_our_crates_pass() {
        assert!(ours(Some("larder_core::proximity::watch")));
        assert!(ours(Some("larder_mobile")));
        assert!(!ours(Some("reqwest::connect")));
        assert!(!ours(None));
    }
}
