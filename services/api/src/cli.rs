use crate::infra::{self, Services};
use crate::server;
use clap::{Args, Parser, Subcommand};
use travel_desk::accounts::AccountError;
use travel_desk::config::AppConfig;
use travel_desk::error::AppError;
use travel_desk::{storage, telemetry};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Travel Desk",
    about = "Trip request intake and lead tracking for Greater & Better Travel",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Apply pending database migrations and exit
    Migrate,
    /// Manage dashboard accounts
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an admin account; does nothing if the email is already registered
    Create(CreateAdminArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CreateAdminArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    /// Read from ADMIN_PASSWORD when omitted
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Migrate => migrate().await,
        Command::Admin {
            command: AdminCommand::Create(args),
        } => create_admin(args).await,
    }
}

async fn migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let pool = storage::connect(&config.database)?;
    storage::migrate(&pool).await?;
    Ok(())
}

async fn create_admin(args: CreateAdminArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let pool = storage::connect(&config.database)?;
    storage::migrate(&pool).await?;

    let Services { accounts, .. } = infra::build_services(&config, pool);
    match accounts
        .bootstrap_admin(&args.name, &args.email, &args.password)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "admin account ready");
            Ok(())
        }
        Err(AccountError::EmailTaken) => {
            info!(email = %args.email, "an account with this email already exists; nothing to do");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
