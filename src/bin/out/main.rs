#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! `out` step: sends a build notification email

use std::{
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{anyhow, Result};
use clap::Parser;
use email_resource::{
    domain::notification::{DeliveryRequest, NotificationService},
    infrastructure::{
        email::smtp::select_mailer, environment::BuildEnvironment, filesystem::SourceRoot,
    },
};
use tracing::{debug, Level};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
#[command(name = "out", about = "Sends a build notification email")]
pub struct Args {
    /// Path to the build sources
    pub source_root: PathBuf,

    /// The build metadata available to templates
    #[clap(flatten)]
    pub build: BuildEnvironment,

    /// Maximum level of log output written to standard error
    #[arg(long, env = "EMAIL_RESOURCE_LOG_LEVEL", default_value = "warn")]
    pub log_level: Level,
}

#[mutants::skip]
fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(args.log_level)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);

            ExitCode::FAILURE
        }
    }
}

#[mutants::skip]
fn run(args: Args) -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| anyhow!("failed to read request from stdin: {}", e))?;

    let request = DeliveryRequest::from_json(&input)?;

    let service = NotificationService::new(SourceRoot::new(args.source_root), args.build.into());
    let mailer = select_mailer(&request.smtp);

    let record = service.notify(&request, mailer.as_ref(), &mut io::stderr())?;

    debug!("reporting outcome");

    let mut stdout = io::stdout().lock();
    record
        .write_to(&mut stdout)
        .map_err(|e| anyhow!("failed to write outcome: {}", e))?;
    stdout.flush()?;

    Ok(())
}
