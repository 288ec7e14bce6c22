use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "report-cli")]
#[command(about = "Command-line client for the weekly report service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Validate a report data file without generating
    Validate {
        /// JSON file holding `shopInfo`, `operationData` and optional sections
        file: PathBuf,
    },
    /// Generate a report from a report data file
    Generate {
        file: PathBuf,
        /// Write the report HTML here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Proceed despite data warnings
        #[arg(long)]
        ack: bool,
    },
    /// Inspect stored drafts
    Drafts {
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// List draft keys
    List {
        #[arg(short, long, default_value = "reportForm_")]
        prefix: String,
    },
    /// Print one draft
    Get { key: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Validate { file } => {
            let data = read_json(&file)?;
            let res = client
                .post(format!("{}/api/validate", cli.url))
                .json(&data)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Generate { file, out, ack } => {
            let data = read_json(&file)?;
            let res = client
                .post(format!("{}/api/generate-report", cli.url))
                .json(&json!({ "reportData": data, "acknowledgeWarnings": ack }))
                .send()
                .await?;

            let status = res.status();
            let body: Value = res.json().await?;
            match body.get("data").and_then(Value::as_str) {
                Some(html) if status.is_success() => match out {
                    Some(path) => {
                        std::fs::write(&path, html)?;
                        println!("Report written to {}", path.display());
                    }
                    None => println!("{}", html),
                },
                _ => {
                    eprintln!("Error: report generation failed (status {})", status);
                    eprintln!("{}", serde_json::to_string_pretty(&body)?);
                    std::process::exit(1);
                }
            }
        }
        Commands::Drafts { command } => match command {
            DraftCommands::List { prefix } => {
                let res = client
                    .get(format!("{}/api/drafts", cli.url))
                    .query(&[("prefix", prefix)])
                    .send()
                    .await?;
                print_response(res).await?;
            }
            DraftCommands::Get { key } => {
                let res = client.get(draft_url(&cli.url, &key)?).send().await?;
                print_response(res).await?;
            }
        },
    }

    Ok(())
}

/// `{base}/api/drafts/{key}` with `key` encoded as a single path segment.
fn draft_url(base: &str, key: &str) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("cannot use '{}' as a base URL", base))?
        .pop_if_empty()
        .extend(["api", "drafts", key]);
    Ok(url)
}

fn read_json(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_url_encodes_key() {
        let url = draft_url("http://localhost:3000", "a/b?c%d e").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/drafts/a%2Fb%3Fc%25d%20e"
        );

        let url = draft_url("http://localhost:3000/", "reportForm_shopInfo").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/drafts/reportForm_shopInfo");
    }
}
