//! gridkv CLI Client
//!
//! Command-line interface for reading and writing grid maps.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use gridkv::{Config, GridConnector, KeyFilter, PackerKind, SetOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// gridkv CLI
#[derive(Parser, Debug)]
#[command(name = "gridkv-cli")]
#[command(about = "CLI for grid key-value maps")]
#[command(version)]
struct Args {
    /// Grid REST URL, e.g. https://host:9444/wxsdata/v1/grids/Grid1
    #[arg(short, long, env = "GRIDKV_URL")]
    url: Option<String>,

    /// TOML config file (overridden by other flags)
    #[arg(short, long)]
    config: Option<String>,

    /// Value packer: json or binary
    #[arg(short, long)]
    packer: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        collection: String,
        key: String,
    },

    /// Set a key-value pair
    Set {
        collection: String,
        key: String,

        /// The value; parsed as JSON with the json packer, stored as a
        /// string with the binary packer
        value: String,

        /// Time to live in milliseconds
        #[arg(long)]
        ttl_ms: Option<u64>,
    },

    /// Delete a key
    Del {
        collection: String,
        key: String,
    },

    /// List keys (first server page only)
    Keys {
        collection: String,

        /// Glob filter, e.g. "user.*"
        #[arg(short, long)]
        r#match: Option<String>,
    },

    /// Delete every key of a collection
    ClearAll {
        collection: String,
    },

    /// Print the grid map used for a collection
    Mapname {
        collection: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,gridkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.status_code() {
                Some(status) => tracing::error!(status, "{}", e),
                None => tracing::error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> gridkv::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(packer) = &args.packer {
        config.packer = packer.parse()?;
    }
    if args.insecure {
        config.strict_ssl = false;
    }
    Ok(config)
}

async fn run(args: Args) -> gridkv::Result<()> {
    let connector = GridConnector::new(build_config(&args)?)?;
    let binary = connector.packer().kind() == PackerKind::Binary;

    match args.command {
        Commands::Get { collection, key } => {
            let printed = if binary {
                connector.get::<String>(&collection, &key).await?
            } else {
                connector
                    .get::<serde_json::Value>(&collection, &key)
                    .await?
                    .map(|v| v.to_string())
            };
            match printed {
                Some(value) => println!("{}", value),
                None => println!("(nil)"),
            }
        }
        Commands::Set {
            collection,
            key,
            value,
            ttl_ms,
        } => {
            let options = SetOptions {
                ttl: ttl_ms.map(Duration::from_millis),
            };
            if binary {
                connector.set(&collection, &key, &value, options).await?;
            } else {
                // Plain words are stored as JSON strings
                let json = serde_json::from_str::<serde_json::Value>(&value)
                    .unwrap_or(serde_json::Value::String(value));
                connector.set(&collection, &key, &json, options).await?;
            }
            println!("OK");
        }
        Commands::Del { collection, key } => {
            connector.clear(&collection, &key).await?;
            println!("OK");
        }
        Commands::Keys { collection, r#match } => {
            let filter = KeyFilter { match_glob: r#match };
            let mut keys = Box::pin(connector.iterate_keys(&collection, filter).into_stream());
            while let Some(key) = keys.next().await {
                println!("{}", key?);
            }
        }
        Commands::ClearAll { collection } => {
            connector.delete_all(&collection).await?;
            println!("OK");
        }
        Commands::Mapname { collection } => {
            println!("{}", connector.mapname(&collection));
        }
    }

    Ok(())
}
