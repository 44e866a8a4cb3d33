use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use folio::StartTab;
use folio::api::GraphqlClient;
use folio::core::config::{self, CliOverrides, FolioConfig};
use folio::core::credentials::{self, FileCredentialStore};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "folio", about = "Terminal client for your reading library")]
struct Args {
    /// GraphQL endpoint (overrides FOLIO_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Tab to open after sign-in
    #[arg(short, long, value_enum)]
    tab: Option<StartTab>,

    /// Forget the stored token and exit
    #[arg(long)]
    logout: bool,
}

fn level_filter(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Debug,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (FolioConfig::default(), Some(e)),
    };
    let cli = CliOverrides {
        api_url: args.api_url,
        tab: args.tab.map(|t| t.name().to_string()),
    };
    let resolved = config::resolve(&file_config, &cli);

    // Initialize file logger - writes to folio.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("folio.log") {
        let _ = WriteLogger::init(level_filter(&resolved.log_level), log_config, log_file);
    }

    if let Some(e) = config_error {
        log::warn!("Ignoring config file: {}", e);
        eprintln!("folio: {e}; using defaults");
    }
    log::info!("Folio starting up against {}", resolved.api_url);

    if args.logout {
        return match credentials::forget_saved(FileCredentialStore::default_path().as_deref()) {
            Ok(true) => {
                println!("Stored token removed.");
                Ok(())
            }
            Ok(false) => {
                println!("No home directory; nothing stored to remove.");
                Ok(())
            }
            Err(e) => {
                eprintln!("folio: could not remove stored token: {e}");
                Err(std::io::Error::other(e.to_string()))
            }
        };
    }

    let store = credentials::session_store(
        resolved.env_token.as_deref(),
        FileCredentialStore::default_path(),
    );
    let source = Arc::new(GraphqlClient::new(
        resolved.api_url.clone(),
        resolved.timeouts.primary,
    ));
    folio::tui::run(source, store, resolved)
}
