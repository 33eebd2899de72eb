//! meeting-actions CLI entrypoint

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use meeting_actions::cli::Cli;
use meeting_actions::config::Settings;

// Documents and messages are processed one at a time; a single thread is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::load()?;
    cli.execute(settings).await
}
