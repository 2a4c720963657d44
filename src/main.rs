//! Customer DB - Main entry point.
//!
//! Command-line access to the customer table: ping, create, get, update,
//! set-status and delete. Results go to stdout as JSON; logs go to stderr.

use clap::Parser;
use customer_db::config::{Command, Config};
use customer_db::{CustomerFields, CustomerStore, DbError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn parse_fields(json: &str) -> Result<CustomerFields, DbError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| DbError::invalid_input(format!("Invalid JSON: {e}")))?;
    CustomerFields::from_json(&value)
}

async fn run(store: &CustomerStore, command: Command) -> Result<(), DbError> {
    match command {
        Command::Ping => {
            let version = store.server_version().await?;
            println!("{version}");
        }
        Command::Create { json } => {
            let fields = parse_fields(&json)?;
            let id = store.create(&fields).await?;
            println!("{id}");
        }
        Command::Get { id, email } => {
            let record = match (id, email) {
                (Some(id), _) => store.get_by_id(id).await?,
                (None, Some(email)) => store.get_by_email(&email).await?,
                (None, None) => return Err(DbError::invalid_input("Specify --id or --email")),
            };
            let output = serde_json::to_string_pretty(&record)
                .map_err(|e| DbError::internal(format!("Failed to serialize record: {e}")))?;
            println!("{output}");
        }
        Command::Update { id, json } => {
            let fields = parse_fields(&json)?;
            println!("{}", store.update(id, &fields).await?);
        }
        Command::SetStatus { id, status } => {
            println!("{}", store.update_status(id, status).await?);
        }
        Command::Delete { id } => {
            println!("{}", store.delete(id).await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!(
        target_db = %config.connection.masked_url(),
        table = %config.connection.table,
        "Starting customer-db v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = CustomerStore::connect(&config.connection, &config.pool).await?;
    let result = run(&store, config.command).await;
    store.close().await;

    if let Err(e) = result {
        match e.suggestion() {
            Some(suggestion) => error!(error = %e, suggestion = %suggestion, "Command failed"),
            None => error!(error = %e, "Command failed"),
        }
        return Err(e.into());
    }

    Ok(())
}
