use crate::demo::{run_demo, DemoArgs};
use crate::maintenance::{run_backfill_expiry, run_migrate_profiles, SnapshotArgs};
use crate::server;
use alumni_registry::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Alumni Registry",
    about = "Run the alumni association membership registry and its maintenance tasks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the registry API (the default when no command is given)
    Serve(ServeArgs),
    /// Walk an application, payment and declaration through approval in memory
    Demo(DemoArgs),
    /// Maintenance tasks over exported member data
    Members {
        #[command(subcommand)]
        command: MembersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MembersCommand {
    /// Store the derived expiry on GENERAL and ASSOCIATE members missing one
    BackfillExpiry(SnapshotArgs),
    /// Create member profiles for members approved before profiles existed
    MigrateProfiles(SnapshotArgs),
}

/// Listen address overrides; unset flags keep `APP_HOST` / `APP_PORT`.
#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Bind to this IP address or `localhost`
    #[arg(long, value_name = "ADDR")]
    pub(crate) host: Option<String>,
    /// Listen on this TCP port
    #[arg(long, short = 'p')]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    match Cli::parse().command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Members {
            command: MembersCommand::BackfillExpiry(args),
        } => run_backfill_expiry(args),
        Command::Members {
            command: MembersCommand::MigrateProfiles(args),
        } => run_migrate_profiles(args),
    }
}
