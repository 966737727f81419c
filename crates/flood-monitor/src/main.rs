//! Flood monitoring CLI.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flood_monitor::config::{Config, Hyp3Settings};
use flood_monitor::{ops, pipeline};
use hyp3::Hyp3Client;

/// Keep HyP3 water-map subscriptions converged with active PDC flood
/// hazards.
#[derive(Parser)]
#[command(name = "flood-monitor")]
#[command(about = "PDC flood hazard monitoring for HyP3 subscriptions")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass over the active hazards
    Run {
        /// Validate creates server-side without persisting, skip updates
        #[arg(long)]
        dry_run: bool,
    },

    /// Report how many subscriptions the most recent pass refreshed
    Check,

    /// Disable every enabled subscription
    DisableAll {
        /// Confirm; without this flag the command refuses to run
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("flood_monitor=debug,hyp3=debug,info")
    } else {
        EnvFilter::new("flood_monitor=info,hyp3=info,warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { dry_run } => {
            let config = Config::from_env()?;
            pipeline::run_once(&config, dry_run).await?;
            Ok(())
        }

        Commands::Check => {
            let hyp3 = connect(&Hyp3Settings::from_env()?).await?;
            match ops::check_subscriptions(&hyp3).await? {
                None => println!("No monitored subscriptions found"),
                Some(summary) => {
                    println!("Monitored subscriptions:  {}", summary.monitored);
                    println!("Most recent window end:   {}", summary.latest_end);
                    println!("Up-to-date subscriptions: {}", summary.up_to_date);
                    println!();
                    println!(
                        "The up-to-date count should equal the active-hazard count \
                         logged by the most recent reconciliation pass."
                    );
                }
            }
            Ok(())
        }

        Commands::DisableAll { yes } => {
            if !yes {
                bail!("refusing to disable subscriptions without --yes");
            }
            let hyp3 = connect(&Hyp3Settings::from_env()?).await?;
            let disabled = ops::disable_all_subscriptions(&hyp3).await?;
            println!("Disabled {disabled} subscriptions");
            Ok(())
        }
    }
}

async fn connect(settings: &Hyp3Settings) -> Result<Hyp3Client> {
    let hyp3 = Hyp3Client::new(&settings.api_url)?;
    hyp3.login(&settings.earthdata_username, &settings.earthdata_password)
        .await?;
    Ok(hyp3)
}
