use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use cryptodevs_chain::{
    ContractBinding, HttpConnector, MintController, MintError, Network, RpcConfigStore,
};
use cryptodevs_core::AppConfig;
use cryptodevs_core::logging;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "cryptodevs", version, about = "Mint from the Crypto Devs collection")]
struct Cli {
    /// Config file (defaults to ~/.cryptodevs/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wallet JSON-RPC endpoint, overriding the config.
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Contract address, overriding the config.
    #[arg(long, global = true)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Connect, refresh once, and print the status as JSON.
    Status,
    /// Connect and keep refreshing on the configured poll interval.
    Watch,
    /// Mint one token during the presale.
    PresaleMint,
    /// Mint one token after the presale.
    Mint,
    /// Start the presale (contract owner only).
    StartPresale,
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(address) = &cli.contract {
        config.contract_address = Some(address.clone());
    }
    Ok(config)
}

/// Pick the wallet endpoint: a custom URL when configured, otherwise the
/// expected network's public endpoint.
fn build_connector(config: &AppConfig) -> Result<HttpConnector> {
    let chain_id = config.expected_chain_id;
    match (Network::from_chain_id(chain_id), config.rpc_url.as_deref()) {
        (Some(network), custom) => {
            let mut store = RpcConfigStore::with_defaults();
            if let Some(url) = custom {
                store.set_custom_rpc(network, url.to_string())?;
            }
            store.set_timeout(network, config.request_timeout_secs);
            let rpc = store
                .get_rpc(network)
                .with_context(|| format!("No RPC endpoint for {network}"))?;
            info!(network = %network, url = %rpc.url, custom = rpc.is_custom, "using RPC endpoint");
            Ok(HttpConnector::from_rpc_config(rpc))
        }
        (None, Some(url)) => Ok(HttpConnector::new(
            url,
            Duration::from_secs(config.request_timeout_secs),
        )),
        (None, None) => bail!("No RPC endpoint known for chain {chain_id}; set rpc_url"),
    }
}

fn build_controller(config: &AppConfig) -> Result<MintController> {
    let address = config
        .contract_address
        .as_deref()
        .context("contract_address is not set; add it to config.json or pass --contract")?;
    let binding = ContractBinding::new(address, config.expected_chain_id, &config.mint_price_eth)?
        .with_confirmation_poll(Duration::from_millis(config.confirmation_poll_ms));
    let connector = build_connector(config)?;
    Ok(MintController::new(Arc::new(connector), binding))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Print the front-end message for a failed operation and hand the error on.
fn report(err: MintError) -> anyhow::Error {
    eprintln!("{}", err.user_message());
    anyhow::Error::new(err)
}

fn print_status(controller: &MintController) -> Result<()> {
    let view = serde_json::json!({
        "status": controller.status(),
        "next_action": controller.next_action(),
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn watch(controller: &mut MintController, interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for err in controller.refresh().await {
                    warn!(operation = %err.operation, "refresh step failed: {}", err.user_message());
                }
                let status = controller.status();
                println!(
                    "presale_started={} presale_ended={} minted={} next={:?}",
                    status.presale_started,
                    status.presale_ended,
                    status.token_ids_minted,
                    controller.next_action(),
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let mut controller = build_controller(&config)?;
    controller.connect().await.map_err(report)?;

    match cli.command {
        Command::Status => {
            for err in controller.refresh().await {
                warn!(operation = %err.operation, "refresh step failed: {}", err.user_message());
            }
            print_status(&controller)?;
        }
        Command::Watch => {
            let interval = Duration::from_secs(config.poll_interval_secs.max(1));
            watch(&mut controller, interval).await?;
        }
        Command::PresaleMint => {
            let receipt = controller.presale_mint().await.map_err(report)?;
            println!("You successfully minted a Crypto Dev! ({})", receipt.transaction_hash);
            let _ = controller.refresh_minted_count().await;
            print_status(&controller)?;
        }
        Command::Mint => {
            let receipt = controller.public_mint().await.map_err(report)?;
            println!("You successfully minted a Crypto Dev! ({})", receipt.transaction_hash);
            let _ = controller.refresh_minted_count().await;
            print_status(&controller)?;
        }
        Command::StartPresale => {
            let receipt = controller.start_presale().await.map_err(report)?;
            println!("Presale started ({})", receipt.transaction_hash);
            print_status(&controller)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let _log_guard = logging::init_logging(&config.log_level)?;
    info!("Starting cryptodevs v{VERSION} ({:?})", cli.command);

    run(cli, config).await.inspect_err(|e| error!("{e:#}"))
}
