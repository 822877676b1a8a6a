use clap::Parser;
use quakewatch::cli::{Cli, Commands};
use quakewatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = quakewatch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting alert daemon");
            args.execute(&config).await?;
        }
        Commands::Watch(args) => {
            tracing::info!("Starting live event watch");
            args.execute(&config).await?;
        }
        Commands::Cycle(args) => {
            tracing::info!("Running one alert cycle");
            args.execute(&config).await?;
        }
        Commands::Status => {
            println!("quakewatch status");
            println!("  Mode: Standalone");
            println!("  Status: Not running");
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.base_url);
            println!(
                "  Watch: every {}s, lookback {}d, limit {}",
                config.watch.interval_secs, config.watch.lookback_days, config.watch.limit
            );
            println!(
                "  Alert: every {}s, lookback {}m, limit {}",
                config.alert.cycle_interval_secs,
                config.alert.lookback_minutes,
                config.alert.limit
            );
            println!("  Push: {}", config.push.endpoint);
        }
    }

    Ok(())
}
