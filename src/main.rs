use anyhow::Context;
use clap::Parser;
use mybeerlog::config::Command;
use mybeerlog::domain::model::Coordinate;
use mybeerlog::utils::{logger, validation::Validate};
use mybeerlog::{
    distance_meters, ApiHandler, AppConfig, CliConfig, InMemoryBreweryStore, InMemoryVisitStore,
    SystemClock,
};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

type LocalHandler = ApiHandler<InMemoryBreweryStore, InMemoryVisitStore, SystemClock>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.command {
        Command::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            logger::init_cli_logger(cli.verbose, None, false);
            let from = Coordinate::new(from_lat, from_lng)?;
            let to = Coordinate::new(to_lat, to_lng)?;
            let meters = distance_meters(from, to);
            tracing::debug!("Distance {:?} -> {:?}: {}", from, to, meters);
            println!("{:.1}", meters);
        }
        Command::CheckIn {
            config,
            user,
            brewery,
            lat,
            lng,
        } => {
            let config = load_config(&config)?;
            logger::init_cli_logger(cli.verbose, config.log_level(), config.log_json());
            let handler = build_handler(&config).await?;

            let reply = handler
                .handle(mybeerlog::ApiEvent::CheckIn {
                    user_profile_id: user,
                    brewery_id: brewery,
                    latitude: lat,
                    longitude: lng,
                })
                .await;

            println!("{}", serde_json::to_string_pretty(&reply.body)?);
            if reply.status_code >= 400 {
                eprintln!("❌ Check-in failed with status {}", reply.status_code);
                std::process::exit(1);
            }
        }
        Command::Replay { config, events } => {
            let config = load_config(&config)?;
            logger::init_cli_logger(cli.verbose, config.log_level(), config.log_json());
            let handler = build_handler(&config).await?;

            let reader: Box<dyn BufRead> = match events {
                Some(path) => Box::new(BufReader::new(
                    std::fs::File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?,
                )),
                None => Box::new(BufReader::new(std::io::stdin())),
            };

            let mut processed = 0usize;
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let reply = handler.handle_json(&line).await;
                println!("{}", serde_json::to_string(&reply)?);
                processed += 1;
            }
            tracing::info!("📁 Replayed {} events", processed);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let config = AppConfig::from_file(path)
        .with_context(|| format!("Failed to load config file '{}'", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;
    Ok(config)
}

async fn build_handler(config: &AppConfig) -> anyhow::Result<LocalHandler> {
    let breweries = InMemoryBreweryStore::with_breweries(config.seed_breweries()?);
    tracing::info!(
        "🍺 Loaded {} breweries, check-in radius {}m",
        breweries.len().await,
        config.checkin_radius_meters()
    );

    let visits = InMemoryVisitStore::new(Arc::new(SystemClock));
    Ok(ApiHandler::new(
        breweries,
        visits,
        SystemClock,
        config.checkin_radius_meters(),
    )
    .with_run_mode(config.app.run_mode.clone()))
}
