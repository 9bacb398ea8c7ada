#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for NOX Crime area briefs.
//!
//! `nox_crime brief` resolves a location (coordinates or a typed address),
//! fetches the reporting week's incidents from the selected feed, and
//! prints the rendered brief or its JSON form.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use nox_crime_brief::{BriefConfig, BriefGenerator, RenderOptions, generate_report, render_brief};
use nox_crime_feed::feed_def::FeedDefinition;
use nox_crime_feed::registry::{DEFAULT_FEED_ID, all_feeds, feed_by_id};
use nox_crime_feed::socrata::SocrataFetcher;
use nox_crime_feed::{FeedQuery, FilterStrategy};
use nox_crime_geocoder::{GeocoderConfig, NominatimGeocoder};
use nox_crime_incident_models::{GeoPoint, TimeWindow};

#[derive(Parser)]
#[command(name = "nox_crime", about = "Neighborhood crime briefs from open incident feeds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the weekly brief for a location
    Brief {
        /// Latitude of the location (requires `--lon`)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude of the location (requires `--lat`)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Street address to geocode; the best match is used
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,
        /// Label shown on the brief (defaults to the resolved address)
        #[arg(long)]
        label: Option<String>,
        /// Search radius in kilometers (defaults to the feed's radius)
        #[arg(long)]
        radius: Option<f64>,
        /// Filtering strategy: `bounding_box` or `exact_radius`
        #[arg(long)]
        strategy: Option<String>,
        /// Feed identifier (e.g., "chicago")
        #[arg(long, env = "NOX_CRIME_FEED", default_value = DEFAULT_FEED_ID)]
        feed: String,
        /// Path to a brief config TOML overriding the built-in advisories
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the brief as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the configured incident feeds
    Feeds,
    /// Look up address candidates
    Geocode {
        /// Address text to search for
        query: String,
        /// Feed whose city scopes the search
        #[arg(long, env = "NOX_CRIME_FEED", default_value = DEFAULT_FEED_ID)]
        feed: String,
    },
}

struct BriefArgs {
    lat: Option<f64>,
    lon: Option<f64>,
    address: Option<String>,
    label: Option<String>,
    radius: Option<f64>,
    strategy: Option<String>,
    feed: String,
    config: Option<PathBuf>,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Feeds => {
            let feeds = all_feeds();
            println!("{:<16} {:<20} CITY", "ID", "NAME");
            println!("{}", "-".repeat(50));
            for feed in &feeds {
                println!("{:<16} {:<20} {}", feed.id, feed.name, feed.city);
            }
        }
        Commands::Geocode { query, feed } => {
            let feed = lookup_feed(&feed)?;
            let geocoder = NominatimGeocoder::new(GeocoderConfig::for_city(&feed.city))?;
            let candidates = geocoder.search(&query).await?;
            if candidates.is_empty() {
                println!("No matches for '{query}' in {}", feed.city);
            }
            for (i, candidate) in candidates.iter().enumerate() {
                println!("{}. {} ({})", i + 1, candidate.address, candidate.location);
            }
        }
        Commands::Brief {
            lat,
            lon,
            address,
            label,
            radius,
            strategy,
            feed,
            config,
            json,
        } => {
            return run_brief(&BriefArgs {
                lat,
                lon,
                address,
                label,
                radius,
                strategy,
                feed,
                config,
                json,
            })
            .await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_brief(args: &BriefArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let feed = lookup_feed(&args.feed)?;
    let strategy = match &args.strategy {
        Some(s) => s
            .parse::<FilterStrategy>()
            .map_err(|_| format!("Unknown strategy: {s}"))?,
        None => feed.strategy,
    };

    let (point, resolved_label) = resolve_location(args, &feed).await?;
    let label = args.label.clone().unwrap_or(resolved_label);

    let config = match &args.config {
        Some(path) => BriefConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => BriefConfig::embedded(),
    };
    let generator = BriefGenerator::new(config);

    let window = TimeWindow::trailing(
        Local::now().naive_local(),
        feed.reporting_lag_days,
        feed.reporting_span_days,
    )?;
    let radius_km = args.radius.unwrap_or(feed.default_radius_km);
    let query = FeedQuery::new(point, radius_km, window)?;

    log::info!(
        "Fetching {} incidents within {radius_km} km of {point} ({strategy}) for {} to {}",
        feed.id,
        window.start(),
        window.end()
    );

    let source_name = feed.name.clone();
    let fetcher = SocrataFetcher::new(feed)?.with_strategy(strategy);

    let brief = match generate_report(&fetcher, &generator, &query, &label).await {
        Ok(brief) => brief,
        Err(e) => {
            eprintln!("Incident data unavailable: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&brief)?);
    } else {
        print!(
            "{}",
            render_brief(
                &brief,
                &RenderOptions {
                    radius_km,
                    source_name,
                }
            )
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn lookup_feed(id: &str) -> Result<FeedDefinition, String> {
    feed_by_id(id).ok_or_else(|| format!("Unknown feed: {id}"))
}

/// Resolves the brief's center point and a default label for it.
async fn resolve_location(
    args: &BriefArgs,
    feed: &FeedDefinition,
) -> Result<(GeoPoint, String), Box<dyn std::error::Error>> {
    let geocoder = NominatimGeocoder::new(GeocoderConfig::for_city(&feed.city))?;

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let point = GeoPoint::new(lat, lon)?;
        let label = if args.label.is_some() {
            point.to_string()
        } else {
            geocoder.label_for(point).await
        };
        return Ok((point, label));
    }

    let Some(address) = &args.address else {
        return Err("Pass either --lat/--lon or --address".into());
    };

    let candidates = geocoder.search(address).await?;
    let Some(best) = candidates.into_iter().next() else {
        return Err(format!("No matches for '{address}' in {}", feed.city).into());
    };
    log::info!("Resolved '{address}' to {} ({})", best.address, best.location);

    Ok((best.location, best.address))
}
