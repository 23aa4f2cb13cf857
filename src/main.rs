use anyhow::Context;
use libris_app::Application;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "libris-app bootstrap starting"
    );

    Application::build(settings).await?.run().await
}
