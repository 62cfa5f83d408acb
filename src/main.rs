use anyhow::bail;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use txtrack::args::{Args, Command};
use txtrack::{commands, Config, Result, StorageUnavailable};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<StorageUnavailable>() {
                Some(unavailable) => error!("{unavailable}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().txtrack_home().path();

    match args.command() {
        Command::Init => commands::init(home).await?.print(),
        command => {
            let config = Config::load(home).await?;
            run(&config, command).await?
        }
    }
    Ok(())
}

/// Routes every command that works on an existing ledger.
async fn run(config: &Config, command: &Command) -> Result<()> {
    let mut session = commands::open_session(config).await?;

    // Route to appropriate command handler
    let _: () = match command {
        Command::Init => bail!("txtrack is already initialized at {}", config.root().display()),
        Command::Log(log_args) => commands::log(&mut session, log_args).await?.print(),
        Command::List => commands::list(&session).await?.print(),
        Command::Approve(process_args) => {
            commands::approve(&mut session, process_args)
                .await?
                .print()
        }
        Command::Deny(id_args) => commands::deny(&mut session, id_args).await?.print(),
        Command::Categorize(process_args) => {
            commands::categorize(&mut session, process_args)
                .await?
                .print()
        }
        Command::Summary => commands::summary(&session).await?.print(),
        Command::Reset(reset_args) => commands::reset(&mut session, reset_args.yes())
            .await?
            .print(),
        Command::Theme(theme_args) => commands::theme(&mut session, theme_args.mode())
            .await?
            .print(),
        Command::Watch(watch_args) => {
            let period = watch_args
                .tick_millis()
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.tick());
            commands::watch(Arc::new(Mutex::new(session)), period, watch_args.seconds())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
