use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "mirror-cli")]
#[command(about = "Inspect a running mirror proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured mirror sites
    Sites,
    /// Probe one site by index, or every site
    Health {
        index: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Sites => {
            let res = client.get(format!("{base}/__api__/sites")).send().await?;
            print_response(res).await?;
        }
        Commands::Health { index: Some(index) } => {
            let res = client
                .get(format!("{base}/__api__/health/{index}"))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health { index: None } => {
            let sites: Vec<Value> = client
                .get(format!("{base}/__api__/sites"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            for index in 0..sites.len() {
                let res = client
                    .get(format!("{base}/__api__/health/{index}"))
                    .send()
                    .await?;
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
