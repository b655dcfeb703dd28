use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

mod platform;

#[derive(Debug, Parser)]
#[command(name = "grabber", version, about = "Bulk image downloader with proxy fallback")]
struct Cli {
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogArg::Terminal, global = true)]
    log: LogArg,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogArg {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download every image URL in a CSV/TSV column into one zip archive.
    Fetch(FetchArgs),
    /// Serve the relay endpoint (`POST /proxy`).
    Relay(RelayArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct FetchArgs {
    /// CSV or TSV file holding the image URLs.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Column holding the URLs; detected from headers and values when omitted.
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Directory the archive is written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// RON engine configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sliding concurrency ceiling.
    #[arg(long, value_name = "K", conflicts_with = "window")]
    pub concurrency: Option<usize>,

    /// Fixed window size; each window completes before the next starts.
    #[arg(long, value_name = "N")]
    pub window: Option<usize>,

    /// Disable the decode and re-encode fallback.
    #[arg(long, default_value_t = false)]
    pub no_render: bool,

    /// Extra relay endpoint joining the proxy race (repeatable).
    #[arg(long = "relay", value_name = "URL")]
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct RelayArgs {
    /// Address the relay listens on.
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8787")]
    pub listen: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match cli.log {
        LogArg::Terminal => engine_logging::LogDestination::Terminal,
        LogArg::File => engine_logging::LogDestination::File,
        LogArg::Both => engine_logging::LogDestination::Both,
    };
    platform::logging::initialize(destination, cli.verbose);

    let result = match cli.command {
        Command::Fetch(args) => platform::app::run_fetch(&args),
        Command::Relay(args) => platform::relay_server::run(&args.listen).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
