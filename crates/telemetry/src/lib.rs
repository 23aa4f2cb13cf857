//! Tracing subscriber bootstrap shared by the server and CLI binaries.

use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `settings.filter`.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))?;

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    tracing::debug!(target: "libris-telemetry", format = ?settings.log_format, "telemetry initialized");
    Ok(())
}
