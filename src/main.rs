use anyhow::Result;
use clap::{Parser, Subcommand};

use cpswap::app::{self, AppCfg};
use cpswap::domain::math;

#[derive(Parser, Debug)]
#[command(name = "cpswap")]
#[command(version, about = "Constant-product exchange ledger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quote a constant-product swap against explicit reserves
    Quote {
        /// Exact input amount
        #[arg(long)]
        amount_in: u128,

        /// Reserve on the input side
        #[arg(long)]
        reserve_in: u128,

        /// Reserve on the output side
        #[arg(long)]
        reserve_out: u128,
    },

    /// Replay a scenario file against a fresh in-memory ledger
    Run {
        /// Path to the scenario TOML file
        #[arg(long, default_value = "Scenario.toml")]
        config: String,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Quote {
            amount_in,
            reserve_in,
            reserve_out,
        } => {
            let amount_out = math::quote_amount_out(amount_in, reserve_in, reserve_out)?;
            println!("{amount_out}");
            Ok(())
        }
        Commands::Run { config, pretty } => {
            app::run(AppCfg {
                config_path: config,
                pretty,
            })
            .await
        }
    }
}
