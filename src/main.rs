use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pgalign::config::merge::Merge;
use pgalign::{commands, config, constants};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = constants::CONFIG_FILENAME.to_string(), global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct PlanArgs {
    /// Emit the statements as a SQL script instead of the JSON plan artifact
    #[arg(long)]
    sql: bool,

    #[command(flatten)]
    database_args: config::DatabaseArgs,

    #[command(flatten)]
    object_filter_args: config::ObjectFilterArgs,
}

#[derive(Parser)]
struct ApplyArgs {
    /// Path to a plan JSON file; reads from stdin when omitted
    plan_file: Option<String>,

    #[command(flatten)]
    database_args: config::DatabaseArgs,
}

#[derive(Parser)]
struct SyncArgs {
    /// Apply without asking for confirmation
    #[arg(long)]
    yes: bool,

    #[command(flatten)]
    database_args: config::DatabaseArgs,

    #[command(flatten)]
    object_filter_args: config::ObjectFilterArgs,
}

#[derive(Parser)]
struct DeclarativeApplyArgs {
    /// Directory of .sql files to apply round-robin
    dir: String,

    /// Database URL to apply against (falls back to TARGET_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Give up after this many passes if files are still failing
    #[arg(long, default_value = "5")]
    max_passes: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the ordered SQL script that reconciles source with target
    Plan(PlanArgs),

    /// Apply a previously computed plan to its source cluster
    Apply(ApplyArgs),

    /// Plan, confirm, then apply in one step
    Sync(SyncArgs),

    /// Apply a directory of SQL files round-robin until convergence
    DeclarativeApply(DeclarativeApplyArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    let exit_code = tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            info!("Received shutdown signal, cleaning up...");
            Ok(1)
        }
    };

    match exit_code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_main(cli: Cli) -> Result<i32> {
    let (file_config, _root_dir) = config::load_config(&cli.config_file)?;

    match &cli.command {
        Commands::Plan(args) => {
            let cli_config = config::ConfigInput::from(args.database_args.clone())
                .merge(args.object_filter_args.clone().into());
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            info!("Computing plan");
            commands::cmd_plan(&config, args.sql).await
        }
        Commands::Apply(args) => {
            let cli_config = config::ConfigInput::from(args.database_args.clone());
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            info!("Applying plan");
            commands::cmd_apply(&config, args.plan_file.as_deref()).await
        }
        Commands::Sync(args) => {
            let cli_config = config::ConfigInput::from(args.database_args.clone())
                .merge(args.object_filter_args.clone().into());
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            info!("Syncing target to source");
            commands::cmd_sync(&config, args.yes).await
        }
        Commands::DeclarativeApply(args) => {
            let database_url = args
                .database_url
                .clone()
                .or_else(|| std::env::var("TARGET_DATABASE_URL").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "no database URL given (use --database-url or TARGET_DATABASE_URL)"
                    )
                })?;

            info!("Applying SQL files from {}", args.dir);
            commands::cmd_declarative_apply(
                &database_url,
                std::path::Path::new(&args.dir),
                args.max_passes,
            )
            .await
        }
    }
}
