use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use miette::{IntoDiagnostic, Result};
use perihelion::{settings, storage};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "perihelion",
    version,
    about = "OpenID Connect provider storage"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Print registered clients as JSON lines
    Clients,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let settings = settings::Settings::load(&cli.config)?;
    tracing::debug!(?settings, "Loaded configuration");

    let db = storage::init(&settings.database).await?;

    match cli.command {
        Command::Migrate => {
            Migrator::up(&db, None).await.into_diagnostic()?;
            tracing::info!("Database schema is up to date");
        }
        Command::Clients => {
            for client in storage::list_clients(&db).await? {
                println!("{}", serde_json::to_string(&client).into_diagnostic()?);
            }
        }
    }

    Ok(())
}
