//! panelctl
//!
//! Loads a panel data directory through the data manager and prints
//! collections or a consistency report as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use panel_data::DataManager;
use panel_entity::{EntityId, EntityKind};
use panel_resource::FsResourceLoader;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod settings;

use commands::Action;

fn cli() -> Command {
    Command::new("panelctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect factory panel data resources")
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Directory resource paths are resolved against"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Per-collection load timeout in milliseconds"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("list")
                .about("Print every record of a collection")
                .arg(kind_arg()),
        )
        .subcommand(
            Command::new("get")
                .about("Print one record")
                .arg(kind_arg())
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(u64))
                        .help("Record id"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report per-collection load results and dangling schedule references"),
        )
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .required(true)
        .value_parser(value_parser!(EntityKind))
        .help("schedules, kpis or machines")
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn action(matches: &ArgMatches) -> Result<Action> {
    let kind = |args: &ArgMatches| {
        args.get_one::<EntityKind>("kind")
            .copied()
            .context("missing entity kind")
    };

    match matches.subcommand() {
        Some(("list", args)) => Ok(Action::List(kind(args)?)),
        Some(("get", args)) => {
            let id = args.get_one::<u64>("id").copied().context("missing id")?;
            Ok(Action::Get(kind(args)?, EntityId::new(id)))
        }
        Some(("check", _)) => Ok(Action::Check),
        _ => anyhow::bail!("unknown command"),
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let action = action(matches)?;
    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let config = settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)).await?;
    let config = settings::apply_overrides(config, matches.get_one::<u64>("timeout-ms").copied());
    tracing::debug!(data_dir = %data_dir.display(), ?config, "starting");

    let manager = DataManager::new(config, FsResourceLoader::new(data_dir));
    let output = commands::run(&manager, &action).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "panelctl failed");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
