use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fabric-cli")]
#[command(about = "Invoke and query contracts through the gateway service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    /// Identity label in the organization's wallet.
    #[arg(long, default_value = "user1")]
    user: String,

    /// Organization to act for.
    #[arg(long, default_value = "Org1")]
    org: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a state-mutating transaction
    Invoke {
        #[arg(long, default_value = "mychannel")]
        channel: String,
        #[arg(long, default_value = "carcc")]
        chaincode: String,
        /// Function name, e.g. ManufactureCar
        fcn: String,
        /// Positional arguments
        args: Vec<String>,
    },
    /// Evaluate a read-only transaction
    Query {
        #[arg(long, default_value = "mychannel")]
        channel: String,
        #[arg(long, default_value = "carcc")]
        chaincode: String,
        /// Function name, e.g. QueryCar
        fcn: String,
        /// Positional arguments
        args: Vec<String>,
    },
    /// Check service status
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert("x-fabric-user", HeaderValue::from_str(&cli.user)?);
    headers.insert("x-fabric-org", HeaderValue::from_str(&cli.org)?);

    match cli.command {
        Commands::Invoke { channel, chaincode, fcn, args } => {
            let res = client
                .post(format!("{}/channels/{}/chaincodes/{}", cli.url, channel, chaincode))
                .headers(headers)
                .json(&json!({ "fcn": fcn, "args": args }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Query { channel, chaincode, fcn, args } => {
            let res = client
                .get(format!("{}/channels/{}/chaincodes/{}", cli.url, channel, chaincode))
                .headers(headers)
                .query(&[("fcn", fcn), ("args", serde_json::to_string(&args)?)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = match res.json().await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: gateway returned status {} with unreadable body: {}", status, e);
            return Ok(());
        }
    };

    if !status.is_success() || body.get("error").and_then(Value::as_bool) == Some(true) {
        eprintln!("Request failed (status {})", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
