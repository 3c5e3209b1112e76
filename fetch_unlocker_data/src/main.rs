//! Unlocker Data Fetcher
//!
//! Fetches a single URL through the Bright Data Web Unlocker API and stores
//! the JSON response in a local output directory under a timestamped filename.
//! The output directory is emptied of previous results before each write, so
//! exactly one file is present after a successful run.
//!
//! Configuration comes from environment variables (or flags) with defaults:
//! - BRIGHT_DATA_API_TOKEN: API credential; the placeholder blocks requests
//! - BRIGHT_DATA_ZONE: Unlocker zone to route the request through
//!
//! Exit codes:
//! - 0: Fetch and write completed
//! - 1: Configuration, network, or filesystem error

use chrono::{DateTime, Local};
use clap::Parser;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

type Result<T> = std::result::Result<T, FetchError>;

const API_TOKEN_PLACEHOLDER: &str = "YOUR_API_KEY";
const REQUEST_FORMAT: &str = "json";

#[derive(Parser, Debug)]
#[command(name = "fetch_unlocker_data")]
#[command(about = "Fetch a URL through the Bright Data Web Unlocker and store the response")]
struct Args {
    /// Bright Data API token sent as the bearer credential
    #[arg(
        long,
        env = "BRIGHT_DATA_API_TOKEN",
        default_value = API_TOKEN_PLACEHOLDER,
        hide_env_values = true
    )]
    api_token: String,

    /// Unlocker zone the request is routed through
    #[arg(long, env = "BRIGHT_DATA_ZONE", default_value = "web_unlocker1")]
    zone: String,

    /// URL to fetch through the Unlocker
    #[arg(long, default_value = "https://geo.brdtest.com/welcome.txt")]
    target_url: String,

    /// Bright Data request API endpoint
    #[arg(long, default_value = "https://api.brightdata.com/request")]
    api_url: String,

    /// Output directory, resolved relative to the executable's location
    #[arg(long, default_value = "scraping-output")]
    output_dir: String,
}

#[derive(Error, Debug)]
enum FetchError {
    #[error("API token not configured: set BRIGHT_DATA_API_TOKEN before making requests")]
    TokenNotConfigured,
    #[error("API request failed with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize, Debug)]
struct UnlockerRequest<'a> {
    zone: &'a str,
    url: &'a str,
    format: &'a str,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    println!("=== Bright Data Unlocker fetch ===");
    println!("Target: {}", args.target_url);
    println!("Zone: {}", args.zone);

    let client = Client::new();
    let data = fetch_with_unlocker(&client, &args).await?;
    println!("✓ Request successful");

    let output_dir = resolve_output_dir(&args.output_dir)?;
    let output_path = save_output(&output_dir, &data)?;
    println!("✓ Output saved to {}", output_path.display());

    // The reported size is the minified re-serialization of the payload, not
    // the byte length of the pretty-printed file on disk.
    let data_size = serde_json::to_string(&data)?.chars().count();

    println!();
    println!("=== Summary ===");
    println!("Target URL: {}", args.target_url);
    println!("Output file: {}", output_path.display());
    println!("Data size: {} characters", data_size);
    println!();
    println!("✓ Process completed successfully");

    Ok(())
}

/// Issues one POST to the Unlocker request API and decodes the JSON body.
///
/// Refuses to make any network call while the token still holds the
/// placeholder value. A non-success HTTP status is surfaced with its code;
/// transport failures and undecodable bodies propagate as their own kinds.
async fn fetch_with_unlocker(client: &Client, args: &Args) -> Result<Value> {
    if args.api_token == API_TOKEN_PLACEHOLDER {
        eprintln!("Warning: set your actual API token before making requests");
        return Err(FetchError::TokenNotConfigured);
    }

    println!("Fetching {} through zone {}...", args.target_url, args.zone);

    let request = UnlockerRequest {
        zone: &args.zone,
        url: &args.target_url,
        format: REQUEST_FORMAT,
    };

    let response = client
        .post(&args.api_url)
        .bearer_auth(&args.api_token)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Resolves the configured output directory relative to the executable's own
/// directory rather than the working directory.
fn resolve_output_dir(dir: &str) -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let base = exe
        .parent()
        .ok_or_else(|| std::io::Error::other("executable path has no parent directory"))?;
    Ok(base.join(dir))
}

fn timestamped_filename(now: DateTime<Local>) -> String {
    format!("output-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Empties the output directory and writes the payload as one timestamped
/// pretty-printed JSON file.
///
/// The deletion pass is not transactional: a failure partway through leaves
/// the directory partially cleared and aborts the run. Two writes within the
/// same second collide on the filename and the later one wins.
fn save_output(output_dir: &Path, data: &Value) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    // Remove stale results from previous runs before writing the new one.
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        fs::remove_file(entry.path())?;
    }

    let output_path = output_dir.join(timestamped_filename(Local::now()));
    fs::write(&output_path, serde_json::to_string_pretty(data)?)?;

    Ok(output_path)
}
