//! residential-cli - Batch driver for residential area inference
//!
//! Usage:
//!   residential-cli areas <input> [--interval 180] [--min-stay 3600] [--output <dir>]
//!   residential-cli speed <input> [--threshold 0.0125] [--upscale 1.1] [--min-dwell 600] [--output <dir>]
//!   residential-cli cell <input> <tag> [--interval 180]
//!
//! Any fatal condition (unreadable input, bad timestamp, unknown cell,
//! unsorted log) stops the run and exits with status 1.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use residential_finder::{
    discover_residential_areas, read_event_log, segment_by_speed, speed_profile,
    output::{
        write_area_geojson, write_area_timeline, write_geo_files, write_midpoint_analysis,
        write_speed_profile, write_speed_segments_geojson, MidpointConfig, MidpointMethod,
    },
    DiscoveryConfig, Result, SpeedConfig,
};

#[derive(Parser)]
#[command(name = "residential-cli")]
#[command(about = "Infer residential areas from cell-tower connection logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover residential areas from the most active cells
    Areas {
        /// Connection log (tab or comma separated)
        input: PathBuf,

        /// Gap threshold in seconds
        #[arg(short, long, default_value = "180")]
        interval: i64,

        /// Minimum stay time in seconds for a residential cell
        #[arg(long, default_value = "3600")]
        min_stay: i64,

        /// Number of radius steps in the midpoint CDF files
        #[arg(long, default_value = "50")]
        cdf_samples: u32,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Split the log into stationary segments by implied travel speed
    Speed {
        /// Connection log (tab or comma separated)
        input: PathBuf,

        /// Moving speed threshold in km/s
        #[arg(long, default_value = "0.0125")]
        threshold: f64,

        /// Distance upscaling factor
        #[arg(long, default_value = "1.1")]
        upscale: f64,

        /// Minimum dwell duration in seconds
        #[arg(long, default_value = "600")]
        min_dwell: i64,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show connection count and dwell intervals of one cell
    Cell {
        /// Connection log (tab or comma separated)
        input: PathBuf,

        /// Cell tag
        tag: String,

        /// Gap threshold in seconds
        #[arg(short, long, default_value = "180")]
        interval: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = match cli.command {
        Commands::Areas {
            input,
            interval,
            min_stay,
            cdf_samples,
            output,
        } => {
            let config = DiscoveryConfig {
                gap_threshold_secs: interval,
                min_stay_secs: min_stay,
            };
            run_areas(&input, &config, &MidpointConfig { cdf_samples }, &output)
        }
        Commands::Speed {
            input,
            threshold,
            upscale,
            min_dwell,
            output,
        } => {
            let config = SpeedConfig {
                speed_threshold_km_s: threshold,
                distance_upscale_factor: upscale,
                min_dwell_secs: min_dwell,
            };
            run_speed(&input, &config, &output)
        }
        Commands::Cell {
            input,
            tag,
            interval,
        } => run_cell(&input, &tag, interval),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_areas(
    input: &Path,
    config: &DiscoveryConfig,
    midpoint: &MidpointConfig,
    output: &Path,
) -> Result<()> {
    fs::create_dir_all(output)?;
    let mut log = read_event_log(input)?;

    let result = discover_residential_areas(&log, log.ranker(), config)?;
    log.apply_assignments(&result.assignments)?;

    for area in &result.areas {
        info!(
            "Area {}: cells [{}], {} intervals, {}s dwell",
            area.id,
            area.cell_tags.join(", "),
            area.intervals.len(),
            area.total_dwell_secs()
        );
    }

    let area_count = result.area_count();
    let timeline = write_area_timeline(output, &log)?;
    info!("Wrote {}", timeline.display());

    write_midpoint_analysis(output, &log, area_count, MidpointMethod::Gravity, midpoint)?;
    write_midpoint_analysis(output, &log, area_count, MidpointMethod::Average, midpoint)?;
    write_area_geojson(output, &log, area_count)?;
    write_geo_files(output, &log, area_count)?;

    let speeds = write_speed_profile(output, &speed_profile(log.events())?)?;
    info!("Wrote {}", speeds.display());
    Ok(())
}

fn run_speed(input: &Path, config: &SpeedConfig, output: &Path) -> Result<()> {
    fs::create_dir_all(output)?;
    let log = read_event_log(input)?;

    let segments = segment_by_speed(log.events(), config)?;
    let paths = write_speed_segments_geojson(output, log.events(), &segments)?;
    for (segment, path) in segments.iter().zip(&paths) {
        info!(
            "{} events, {}s -> {}",
            segment.event_count(),
            segment.duration_secs(),
            path.display()
        );
    }
    Ok(())
}

fn run_cell(input: &Path, tag: &str, interval: i64) -> Result<()> {
    let log = read_event_log(input)?;

    println!("{}: {} connections", tag, log.num_connections(tag)?);
    for segment in log.time_segments(tag, interval)? {
        println!(
            "  {} -to- {}",
            segment.start.format("%Y-%m-%d %H:%M:%S"),
            segment.end.format("%H:%M:%S")
        );
    }
    Ok(())
}
