mod runner;

use anyhow::Result;
use clap::Parser;
use runner::RunnerApp;
use runner::core::RunnerConfig;
use std::path::PathBuf;

/// Turn a physics problem description into a validated simulation.
#[derive(Debug, Parser)]
#[command(name = "newton-run", version, about)]
struct Cli {
    /// Problem input (`.ron` or `.json`)
    input: PathBuf,

    /// Pipeline configuration (`.ron`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,

    /// The input is an already assembled IR
    #[arg(long)]
    ir: bool,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = RunnerConfig {
        config: cli.config,
        output: cli.output,
        compact: cli.compact,
        ir: cli.ir,
        ..RunnerConfig::new(cli.input)
    };
    let mut app = RunnerApp::new(config);
    app.run()
}

fn init_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
