use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use proxy_selector::config::load_snapshot;
use proxy_selector::routing::{resolve_decision, DecisionEngine};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Inspect proxy decisions", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8085")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Health,
    /// Preview the decision for a request
    Decide {
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        tab: i64,
        /// Tab group id; negative means no group
        #[arg(long, allow_negative_numbers = true)]
        group: Option<i64>,
        #[arg(long = "target")]
        target: String,
    },
    /// List profiles, including the built-in direct profile
    Profiles,
    /// Summarize the loaded snapshot
    Snapshot,
    /// Evaluate against a snapshot file without a running service
    Eval {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        tab: i64,
        /// Tab group id; negative means no group
        #[arg(long, allow_negative_numbers = true)]
        group: Option<i64>,
        #[arg(long = "target")]
        target: String,
    },
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
        Commands::Decide { tab, group, target } => {
            let mut query = vec![("tabId", tab.to_string()), ("url", target)];
            if let Some(group) = group {
                query.push(("groupId", group.to_string()));
            }
            let res = client
                .get(format!("{}/decision", cli.url))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Profiles => {
            let res = client.get(format!("{}/profiles", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Snapshot => {
            let res = client.get(format!("{}/snapshot", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Eval {
            snapshot,
            tab,
            group,
            target,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let engine = DecisionEngine::new();
            let evaluation = engine.explain(&snapshot, tab, group, &target);
            let proxy = resolve_decision(&snapshot, &evaluation.decision);
            let json = serde_json::json!({
                "decision": evaluation.decision,
                "source": evaluation.source,
                "proxy": proxy,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
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
    fn test_negative_ids_parse() {
        let cli = Cli::try_parse_from([
            "proxy-cli", "decide", "--tab", "-1", "--group", "-1", "--target", "https://a.test/",
        ])
        .unwrap();
        match cli.command {
            Commands::Decide { tab, group, .. } => {
                assert_eq!(tab, -1);
                assert_eq!(group, Some(-1));
            }
            _ => panic!("expected decide"),
        }
    }
}
