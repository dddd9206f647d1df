pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stayquote_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use stayquote_core::ApplicationError;

#[derive(Debug, Parser)]
#[command(
    name = "stayquote",
    about = "Stayquote quote configuration CLI",
    long_about = "Validate stay snapshots, replay and price quote sessions, build submissions.",
    after_help = concat!(
        "Examples:\n",
        "  stayquote validate --stay stay.json\n",
        "  stayquote price --stay stay.json --session session.json\n",
        "  stayquote config"
    )
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a stayquote.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level override (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Log format override (compact|pretty|json)")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Check a stay snapshot for structural violations")]
    Validate {
        #[arg(long, help = "Stay snapshot JSON file")]
        stay: PathBuf,
    },
    #[command(about = "Replay a quote session and print its summary and exact price")]
    Price {
        #[arg(long, help = "Stay snapshot JSON file")]
        stay: PathBuf,
        #[arg(long, help = "Quote session JSON file")]
        session: PathBuf,
    },
    #[command(about = "Replay a quote session and print the averaged price estimate")]
    Estimate {
        #[arg(long, help = "Stay snapshot JSON file")]
        stay: PathBuf,
        #[arg(long, help = "Quote session JSON file")]
        session: PathBuf,
    },
    #[command(about = "Replay a completed quote session and build its submission payload")]
    Submit {
        #[arg(long, help = "Stay snapshot JSON file")]
        stay: PathBuf,
        #[arg(long, help = "Quote session JSON file")]
        session: PathBuf,
        #[arg(long, help = "Contact details and dates JSON file")]
        request: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format,
            ..ConfigOverrides::default()
        },
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandFailure::from_application(ApplicationError::from(error))
                .into_result("startup");
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Validate { stay } => commands::validate::run(&stay),
        Command::Price { stay, session } => commands::price::run(&config, &stay, &session),
        Command::Estimate { stay, session } => commands::estimate::run(&config, &stay, &session),
        Command::Submit { stay, session, request } => {
            commands::submit::run(&config, &stay, &session, &request)
        }
        Command::Config => commands::config::run(&config, cli.config.as_deref()),
    };

    tracing::debug!(
        event_name = "cli.command.finished",
        exit_code = result.exit_code,
        "command finished"
    );
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
