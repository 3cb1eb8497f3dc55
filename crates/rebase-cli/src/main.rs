//! Rebase CLI — operate an interest-accruing ledger persisted on disk.
//!
//! Subcommands: init, status, balance, deposit, redeem, fund, transfer,
//! approve, transfer-from, set-rate, grant, revoke.

mod commands;
mod session;
mod storage;

use clap::{Parser, Subcommand};
use rebase_core::config::LoggingConfig;
use rebase_core::RebaseConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rebase: balances that earn at the rate you locked in.
#[derive(Parser, Debug)]
#[command(name = "rebase", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "rebase.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration and create an empty ledger.
    Init(commands::init::InitArgs),
    /// Show global ledger and vault state.
    Status(commands::status::StatusArgs),
    /// Show a holder's accrued balance, principal and locked rate.
    Balance(commands::balance::BalanceArgs),
    /// Deposit value into the vault and mint at the global rate.
    Deposit(commands::vault::DepositArgs),
    /// Burn balance and withdraw the same value from the vault.
    Redeem(commands::vault::RedeemArgs),
    /// Add reward value to vault reserves.
    Fund(commands::vault::FundArgs),
    /// Transfer balance between holders.
    Transfer(commands::transfer::TransferArgs),
    /// Set a spender's allowance.
    Approve(commands::transfer::ApproveArgs),
    /// Transfer on behalf of an owner using an allowance.
    TransferFrom(commands::transfer::TransferFromArgs),
    /// Lower the global interest rate.
    SetRate(commands::admin::SetRateArgs),
    /// Grant the mint/burn capability.
    Grant(commands::admin::GrantArgs),
    /// Revoke the mint/burn capability.
    Revoke(commands::admin::RevokeArgs),
}

fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so command output on stdout stays machine-readable.
    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = RebaseConfig::load(&cli.config)?;
    init_tracing(&config.logging, cli.log_level.as_deref());

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config, config),
        Commands::Status(args) => commands::status::run(args, &config),
        Commands::Balance(args) => commands::balance::run(args, &config),
        Commands::Deposit(args) => commands::vault::deposit(args, &config),
        Commands::Redeem(args) => commands::vault::redeem(args, &config),
        Commands::Fund(args) => commands::vault::fund(args, &config),
        Commands::Transfer(args) => commands::transfer::transfer(args, &config),
        Commands::Approve(args) => commands::transfer::approve(args, &config),
        Commands::TransferFrom(args) => commands::transfer::transfer_from(args, &config),
        Commands::SetRate(args) => commands::admin::set_rate(args, &config),
        Commands::Grant(args) => commands::admin::grant(args, &config),
        Commands::Revoke(args) => commands::admin::revoke(args, &config),
    }
}
