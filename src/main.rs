use anyhow::Result;
use changescan::cli::Cli;
use changescan::output::OutputMode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.output_mode());
    cli.run()
}

/// Log to stderr; `RUST_LOG` wins over the -v/-q flags
fn init_tracing(mode: OutputMode) {
    let default_level = match mode {
        OutputMode::Quiet => "error",
        OutputMode::Normal => "warn",
        OutputMode::Verbose => "debug",
        OutputMode::VeryVerbose => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
