//! Simulation harness for the Biohacking Studio service worker.
//!
//! Drives a real worker (reqwest fetcher) from the command line:
//!
//! ```bash
//! # Seed the precache against a running deployment and list the store
//! sw-sim --scope http://localhost:8000/ install
//!
//! # Classify and route one request
//! sw-sim --scope http://localhost:8000/ fetch /static/css/landing.css
//! sw-sim --scope http://localhost:8000/ fetch /totem --accept text/html
//!
//! # Inspect the notification a push payload would produce
//! sw-sim push '{"type":"xp_earned","title":"XP!","body":"+50 XP"}'
//! ```

use biostudio_common::{init_logging, LogConfig, Result, StudioError};
use biostudio_sw::{
    classify, FetchOutcome, LoaderConfig, NetworkClient, PushPayload, Request, ServiceWorker,
    WorkerConfig,
};
use clap::{Parser, Subcommand};
use http::HeaderValue;
use url::Url;

#[derive(Parser)]
#[command(name = "sw-sim")]
#[command(about = "Simulation harness for the Biohacking Studio service worker")]
struct Cli {
    /// Origin the worker controls.
    #[arg(long, default_value = "http://localhost:8000/")]
    scope: String,

    /// Enable debug logging.
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the precache manifest and list the resulting store
    Install,

    /// Install, activate, then route a single request
    Fetch {
        /// Path or absolute URL to request
        url: String,

        /// Accept header to send
        #[arg(long)]
        accept: Option<String>,
    },

    /// Parse a push payload and print the notification it produces
    Push {
        /// Raw payload (JSON or plain text)
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = if cli.verbose {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    if cli.json {
        log_config = log_config.json();
    }
    init_logging(log_config);

    let scope = Url::parse(&cli.scope)
        .map_err(|e| StudioError::config(format!("invalid scope {}: {e}", cli.scope)))?;
    let config = WorkerConfig::for_scope(scope);

    match cli.command {
        Commands::Install => install(config).await,
        Commands::Fetch { url, accept } => fetch(config, &url, accept.as_deref()).await,
        Commands::Push { payload } => push(config, &payload),
    }
}

async fn running_worker(config: WorkerConfig) -> Result<ServiceWorker<NetworkClient>> {
    let client = NetworkClient::new(LoaderConfig::default())?;
    let mut worker = ServiceWorker::new(config, client);
    worker.install().await?;
    worker.activate().await?;
    Ok(worker)
}

async fn install(config: WorkerConfig) -> Result<()> {
    let worker = running_worker(config).await?;

    let caches = worker.caches();
    let caches = caches.read().await;
    for name in caches.keys() {
        println!("store {name}:");
        if let Some(cache) = caches.get(name) {
            let mut keys: Vec<&str> = cache.keys();
            keys.sort_unstable();
            for key in keys {
                println!("  {key}");
            }
        }
    }
    Ok(())
}

async fn fetch(config: WorkerConfig, url: &str, accept: Option<&str>) -> Result<()> {
    let target = config
        .resolve(url)
        .ok_or_else(|| StudioError::InvalidArgument(format!("unresolvable URL: {url}")))?;

    let mut request = Request::get(target);
    if let Some(accept) = accept {
        let value = HeaderValue::try_from(accept)
            .map_err(|e| StudioError::InvalidArgument(format!("bad accept header: {e}")))?;
        request = request.header(http::header::ACCEPT, value);
    }

    let worker = running_worker(config).await?;
    println!("strategy: {:?}", classify(worker.config(), &request));

    match worker.handle_fetch(&request).await {
        FetchOutcome::PassThrough => println!("outcome: pass-through (not intercepted)"),
        FetchOutcome::Respond(response) => {
            println!(
                "outcome: {} ({} bytes, from_cache={}, content_type={:?})",
                response.status,
                response.body.len(),
                response.from_cache,
                response.content_type().map(|m| m.to_string()),
            );
        }
        FetchOutcome::Failed => println!("outcome: failed (no response available)"),
    }
    Ok(())
}

fn push(config: WorkerConfig, payload: &str) -> Result<()> {
    let payload = PushPayload::parse(payload.as_bytes());
    let notification = biostudio_sw::Notification::from_payload(&config, payload);

    let rendered = serde_json::to_string_pretty(&notification)
        .map_err(|e| StudioError::push(format!("failed to render notification: {e}")))?;
    println!("{rendered}");
    Ok(())
}
