use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use leasealloc::{Allocator, ClientId, Config, FileStorage, Result, Storage};

#[derive(Parser)]
#[command(name = "leasealloc")]
#[command(author, version, about = "Hand out addresses from a network range", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate an address for a client identifier (e.g. aa:bb:cc:dd:ee:ff)
    Allocate { client: ClientId },
    /// Release a previously allocated address
    Release { address: IpAddr },
    ListLeases,
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = Config::load_or_create(&cli.config)?;

    match cli.command {
        Commands::Allocate { client } => {
            let allocator = open_allocator(&config)?;
            let ip = allocator.allocate(&client).await?;
            println!("{}", ip);
        }
        Commands::Release { address } => {
            let allocator = open_allocator(&config)?;
            allocator.release(address).await?;
            println!("Released {}.", address);
        }
        Commands::ListLeases => {
            let allocator = open_allocator(&config)?;
            let leases = allocator.inspect(|storage| storage.leases()).await?;

            if leases.is_empty() {
                println!("No leases.");
            } else {
                println!("{:<24} {:<40} {:<8}", "Client ID", "IP Address", "State");
                println!("{}", "-".repeat(72));

                for lease in leases {
                    let state = if lease.in_use { "in use" } else { "released" };
                    println!(
                        "{:<24} {:<40} {:<8}",
                        lease.client_id.to_string(),
                        lease.ip_address.to_string(),
                        state
                    );
                }
            }
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn open_allocator(config: &Config) -> Result<Allocator<FileStorage>> {
    info!(
        "Network {} ({} assignable addresses), leases in {}",
        config.network,
        config.capacity(),
        config.leases_file
    );
    let storage = FileStorage::open(&config.leases_file, config.network)?;
    Ok(Allocator::new(config.network, storage))
}
