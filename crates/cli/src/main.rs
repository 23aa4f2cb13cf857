use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_accounts::CreateUser;
use libris_app::Application;
use libris_kernel::settings::Settings;

/// Libris book catalog service
#[derive(Debug, Parser)]
#[command(name = "libris", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Register a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "libris cli starting");

    let app = Application::build(settings).await?;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => app.run().await,
        Command::Migrate => {
            let applied = app.migrate().await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::CreateUser { username, password } => {
            app.migrate().await?;
            let user = app
                .users()
                .create_user(&CreateUser::new(username, password))
                .await
                .context("failed to create user")?;
            println!("created user {} with id {}", user, user.id);
            Ok(())
        }
    }
}
