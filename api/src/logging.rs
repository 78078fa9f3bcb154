use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "deepfake_api=info,deepfake_detector=info,tower_http=info";

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. `log` records from the detector crate are
/// bridged in. Filter with `RUST_LOG`.
pub fn init() {
    LOGGER_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed (tests); keep it
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}
