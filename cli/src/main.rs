//! morpheus CLI — talk to a MorpheusVM node and its faucet from the terminal.
//!
//! Usage:
//! ```bash
//! # Network identity
//! morpheus network
//!
//! # Balance of an address
//! morpheus balance --address morpheus1...
//!
//! # Top up an address and wait for the funds to land
//! morpheus faucet --address morpheus1... --min-balance 1
//!
//! # Submit signed transaction bytes
//! morpheus submit --tx-file signed.bin
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

use hyperrpc_core::Balance;
use hyperrpc_morpheus::{ClientConfig, FaucetPoller, SessionStatus, VmClient};

mod logging;

#[derive(Parser)]
#[command(
    name = "morpheus",
    about = "MorpheusVM JSON-RPC and faucet client",
    long_about = "
MorpheusVM JSON-RPC and faucet client.

ENVIRONMENT VARIABLES:
  MORPHEUS_API_HOST            Node API host     (default http://localhost:9650)
  MORPHEUS_FAUCET_HOST         Faucet host       (default http://localhost:8765)
  MORPHEUS_VM_NAME             VM name           (default morpheusvm)
  MORPHEUS_VM_RPC_PREFIX       VM RPC route      (default morpheusapi)
  MORPHEUS_REQUEST_TIMEOUT_MS  RPC timeout in ms (default 3000)
  RUST_LOG                     Log filter
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Override the node API host
    #[arg(long, global = true)]
    api_host: Option<String>,

    /// Override the faucet host
    #[arg(long, global = true)]
    faucet_host: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print network, subnet and chain IDs
    Network,

    /// Print the VM ABI descriptor
    Abi,

    /// Print the balance of an address
    Balance {
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        address: String,
        /// Print the raw integer amount instead of a formatted one
        #[arg(long)]
        raw: bool,
    },

    /// Submit a signed transaction
    Submit {
        /// File containing the signed transaction bytes
        #[arg(long, conflicts_with = "tx_hex")]
        tx_file: Option<PathBuf>,
        /// Signed transaction as hex
        #[arg(long)]
        tx_hex: Option<String>,
    },

    /// Request faucet funds and wait until the balance changes
    Faucet {
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        address: String,
        /// Skip the drip when the balance already exceeds this (in whole coins)
        #[arg(long, default_value = "0")]
        min_balance: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("loading configuration")?;
    if let Some(host) = cli.api_host {
        config.api_host = host;
    }
    if let Some(host) = cli.faucet_host {
        config.faucet_host = host;
    }
    tracing::debug!(api_host = %config.api_host, faucet_host = %config.faucet_host, "resolved configuration");
    let client = VmClient::from_config(&config)?;

    match cli.command {
        Commands::Network => {
            let info = client.get_network().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Abi => {
            println!("{}", client.get_abi().await?);
        }
        Commands::Balance { address, raw } => {
            let balance = client.get_balance(&address).await?;
            if raw {
                println!("{balance}");
            } else {
                println!("{}", config.display_balance(&balance));
            }
        }
        Commands::Submit { tx_file, tx_hex } => {
            let bytes = match (tx_file, tx_hex) {
                (Some(path), None) => {
                    std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
                }
                (None, Some(h)) => hex::decode(h.trim_start_matches("0x")).context("decoding --tx-hex")?,
                _ => bail!("one of --tx-file or --tx-hex is required"),
            };
            client.send_tx(&bytes).await?;
            println!("Submitted {} bytes", bytes.len());
        }
        Commands::Faucet { address, min_balance } => {
            let min = Balance::parse_units(&min_balance, config.decimals).context("parsing --min-balance")?;
            let mut poller = FaucetPoller::new(Arc::new(client), config.poll.policy());
            poller.set_inputs(address.clone(), min);
            let state = poller.wait_settled().await;
            match state.status {
                SessionStatus::Settled { balance, dripped } => {
                    let verb = if dripped { "funded" } else { "already funded" };
                    println!("{address} {verb}: {}", config.display_balance(&balance));
                }
                SessionStatus::Failed(failure) => bail!("{}", failure.message),
                other => bail!("faucet session ended in unexpected state: {other}"),
            }
        }
    }
    Ok(())
}
