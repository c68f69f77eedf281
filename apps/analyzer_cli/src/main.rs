mod console;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    config::load_settings, AnalyzerSession, FileCandidate, HttpScoreTransport, SelectionSource,
    SubmissionState,
};

use crate::console::{AlertRecorder, ConsoleSurface};

#[derive(Parser, Debug)]
#[command(about = "Submit an audio file for stress analysis")]
struct Args {
    /// Audio file to analyze.
    file: PathBuf,
    #[arg(long)]
    endpoint_url: Option<String>,
    #[arg(long)]
    csrf_token: Option<String>,
    /// Print the raw result as JSON instead of the rendered view.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint_url) = args.endpoint_url {
        settings.endpoint_url = endpoint_url;
    }
    if let Some(csrf_token) = args.csrf_token {
        settings.csrf_token = csrf_token;
    }
    let transport = HttpScoreTransport::new(settings.endpoint()?);

    let candidate = FileCandidate::load(&args.file)
        .await
        .with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut session = AnalyzerSession::new(
        settings.csrf_token,
        ConsoleSurface::new(std::io::stdout(), args.json),
        AlertRecorder::default(),
    );
    if let Err(err) = session.select_file(candidate, SelectionSource::Picker) {
        bail!("{}", session.notifier().reason_or(|| err.to_string()));
    }

    match session.submit(&transport).await {
        SubmissionState::Succeeded => {
            if args.json {
                if let Some(result) = session.last_result() {
                    println!("{}", serde_json::to_string_pretty(result)?);
                }
            }
            Ok(())
        }
        state => {
            let reason = session
                .notifier()
                .reason_or(|| format!("submission ended in {state:?}"));
            bail!("analysis failed: {reason}")
        }
    }
}
