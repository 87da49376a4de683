use anyhow::Result;
use clap::{Arg, Command};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use investigator_backend::{ApiServer, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Investigator Backend")
        .version(env!("CARGO_PKG_VERSION"))
        .about("YouTube transcript extraction API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Interface to bind")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("SIZE")
                .help("Whisper model size used when a video has no captions")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    // Initialize logging
    let default_filter = if matches.get_flag("verbose") {
        "investigator_backend=debug,tower_http=debug,info"
    } else {
        "investigator_backend=info,tower_http=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env();
            config
        }
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.transcription.model = model.clone();
    }

    config.validate()?;

    info!("🚀 Investigator backend starting...");
    info!("{}", config.summary());

    ApiServer::new(AppState::from_config(config)).start().await
}
