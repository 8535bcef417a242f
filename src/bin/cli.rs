//! Chronolog CLI
//!
//! Command-line client for a running Chronolog server:
//! - Publish records
//! - Read the latest record
//! - Query a time window
//! - Check status

use chrono::NaiveDateTime;
use chronolog::config::generate_default_config;
use chronolog::storage::Record;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chronolog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Chronolog record store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish a record with the given content
    Publish {
        /// Record content
        content: String,
    },

    /// Show the most recent record
    Last,

    /// List records created within an inclusive window
    Range {
        /// Start, ISO 8601 local date-time (e.g. 2024-01-15T12:00:00)
        #[arg(short, long)]
        start: String,
        /// End, ISO 8601 local date-time
        #[arg(short, long)]
        end: String,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Publish { content } => {
            let body = serde_json::json!({ "content": content });

            let response = client
                .post(format!("{}/publish", cli.api_url))
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Publish failed ({}): {}", status, text);
                std::process::exit(1);
            }

            let record: Record = response.json().await?;
            print_records(&cli.format, &[record])?;
        }

        Commands::Last => {
            let response = client
                .get(format!("{}/getLast", cli.api_url))
                .send()
                .await?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                println!("No records stored yet.");
                return Ok(());
            }

            if !response.status().is_success() {
                eprintln!("Failed to fetch last record: {}", response.status());
                std::process::exit(1);
            }

            let record: Record = response.json().await?;
            print_records(&cli.format, &[record])?;
        }

        Commands::Range { start, end } => {
            let start = parse_date_time(&start)?;
            let end = parse_date_time(&end)?;
            if start > end {
                eprintln!("Start must not be after end");
                std::process::exit(1);
            }

            let response = client
                .get(format!("{}/getByTime", cli.api_url))
                .query(&[
                    ("start", format_date_time(&start)),
                    ("end", format_date_time(&end)),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Query failed ({}): {}", status, text);
                std::process::exit(1);
            }

            let records: Vec<Record> = response.json().await?;
            print_records(&cli.format, &records)?;
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Chronolog v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Backend: {}",
                        health["backend"].as_str().unwrap_or("unknown")
                    );
                    if let Some(records) = health["records"].as_u64() {
                        println!("Records: {}", records);
                    }
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Chronolog API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Chronolog server is running:");
                    eprintln!("  cargo run --bin chronolog");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn parse_date_time(value: &str) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    value
        .parse::<NaiveDateTime>()
        .map_err(|e| format!("Invalid date-time '{}': {}", value, e).into())
}

fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Print records in the requested output format
fn print_records(format: &str, records: &[Record]) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        _ => {
            if records.is_empty() {
                println!("No records in range.");
                return Ok(());
            }

            println!("{:<36}  {:<23}  {}", "ID", "Created", "Content");
            println!("{}", "-".repeat(80));
            for record in records {
                println!(
                    "{:<36}  {:<23}  {}",
                    record.id,
                    format_date_time(&record.created),
                    record.content
                );
            }
        }
    }

    Ok(())
}

/// Format seconds as a compact human-readable duration
fn format_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs % 60)
    }
}
