use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use taskboard::cli::{self, Cli};
use taskboard::render;
use taskboard_client::HttpTaskGateway;
use taskboard_engine::TaskBoard;
use taskboard_telemetry::{init_telemetry, TelemetryConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = cli::resolve_settings(&cli)?;
    init_telemetry(&TelemetryConfig::from_settings(&settings.logging)?)?;
    tracing::debug!(url = %settings.api.resource_url(), "starting taskboard");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let gateway = HttpTaskGateway::new(&settings.api).context("failed to build HTTP client")?;
    let board = TaskBoard::from_settings(Arc::new(gateway), &settings);

    let code = runtime.block_on(async {
        let outcome = cli::run(&board, cli.command).await;
        if let Ok(output) = &outcome {
            print!("{output}");
        }
        print!("{}", render::notifications(&board.notifications()));

        match outcome {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    });
    Ok(code)
}
