//! gle binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gle_cli::cli::Cli;
use gle_cli::output::OutputFormat;
use gle_cli::CliError;
use gle_query::{Completion, LogSearch, ReqwestTransport};

fn main() -> ExitCode {
    // RUST_LOG wins; otherwise only warnings reach stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.client_config();
    config.validate()?;
    let transport = ReqwestTransport::new(&cli.api_key, &config)?;

    let format = OutputFormat::new(cli.format);
    let mut sink = format.sink(io::stdout().lock());

    let report = LogSearch::new(&transport, &config)
        .run(&cli.search_request(), sink.as_mut())
        .await?;

    if let Completion::UnexpectedStatus(status) = report.completion {
        warn!(
            status,
            events = report.events,
            "Service stopped the query without signalling completion; results may be incomplete"
        );
        if cli.strict {
            return Err(CliError::Incomplete { status });
        }
    }

    Ok(())
}
