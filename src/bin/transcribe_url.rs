use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use tracing::info;

use investigator_backend::api::handlers;
use investigator_backend::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("investigator_backend=info")
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("transcribe-url")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Print the transcript of one YouTube video as JSON")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("YouTube video URL")
                .required(true)
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("SIZE")
                .help("Whisper model size used when the video has no captions")
        )
        .get_matches();

    let mut config = Config::load()?;
    if let Some(model) = matches.get_one::<String>("model") {
        config.transcription.model = model.clone();
    }
    config.validate()?;

    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("URL is required"))?;

    let state = AppState::from_config(config);
    let response = handlers::transcribe_video(&state, url)
        .await
        .map_err(|e| anyhow!("{} ({})", e.detail, e.status))?;

    info!(
        "🎉 {} segments from {} for \"{}\"",
        response.segments.len(),
        response.source,
        response.title
    );
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
