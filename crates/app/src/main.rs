use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use server::{ServerState, TokenSigner};
use settings::{Database, Settings};

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "spendbook")]
#[command(about = "Personal expense tracker HTTP API")]
struct Cli {
    /// Configuration file (TOML). Defaults to `settings.toml` when present.
    #[arg(long, env = "SPENDBOOK_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Manage the database schema.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateAction {
    /// Apply all pending migrations.
    Up,
    /// Roll back the most recent migrations.
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and reapply all migrations.
    Fresh,
    /// Show applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendbook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Migrate { action } => migrate(&settings.server.database, action).await,
    }
}

async fn serve(settings: Settings) -> Result<(), BoxError> {
    let timezone: chrono_tz::Tz = settings.app.timezone.parse().map_err(|err| {
        let message = format!("invalid time zone `{}`: {err}", settings.app.timezone);
        tracing::error!("{message}");
        BoxError::from(message)
    })?;
    let tokens = TokenSigner::new(
        settings.auth.secret,
        chrono::Duration::days(settings.auth.token_ttl_days),
    )
    .map_err(|err| {
        tracing::error!("auth.secret must be configured: {err}");
        err
    })?;

    let db = connect(&settings.server.database).await.map_err(|err| {
        tracing::error!("failed to initialize database: {err}");
        err
    })?;
    Migrator::up(&db, None).await?;

    let engine = engine::Engine::builder()
        .database(db)
        .timezone(timezone)
        .password_memory_kib(settings.auth.password_memory_kib)
        .password_iterations(settings.auth.password_iterations)
        .build()
        .await?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
        err
    })?;

    server::run_with_listener(ServerState::new(engine, tokens), listener).await?;
    Ok(())
}

async fn migrate(database: &Database, action: MigrateAction) -> Result<(), BoxError> {
    let db = connect(database).await?;
    match &action {
        MigrateAction::Up => Migrator::up(&db, None).await?,
        MigrateAction::Down { steps } => Migrator::down(&db, Some(*steps)).await?,
        MigrateAction::Fresh => Migrator::fresh(&db).await?,
        MigrateAction::Status => Migrator::status(&db).await?,
    }
    tracing::info!("migration {action:?} done");
    Ok(())
}

async fn connect(config: &Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    Ok(sea_orm::Database::connect(url).await?)
}
