use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use formats::{FeatureCollection, FeatureDomain};
use foundation::math::UtmZone;

#[derive(Debug, Parser)]
#[command(name = "strata", about = "Prepare city GeoJSON for the elevation viewer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reproject a UTM FeatureCollection to WGS84.
    UtmToWgs84 {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        zone: u8,
        #[arg(long)]
        south: bool,
    },
    /// Print `[minLng, minLat, maxLng, maxLat]`.
    Bounds { input: PathBuf },
    /// Douglas-Peucker every line and ring.
    Simplify {
        input: PathBuf,
        output: PathBuf,
        /// Tolerance in degrees.
        #[arg(long)]
        tolerance: f64,
    },
    /// Count features per elevation band.
    Classify {
        input: PathBuf,
        #[arg(long, value_enum)]
        kind: Kind,
    },
    /// Geometry types, position count and bounds.
    Summarize { input: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Building,
    Zoning,
    Subsurface,
}

impl From<Kind> for FeatureDomain {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Building => FeatureDomain::Building,
            Kind::Zoning => FeatureDomain::Zoning,
            Kind::Subsurface => FeatureDomain::Subsurface,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::UtmToWgs84 {
            input,
            output,
            zone,
            south,
        } => {
            let Some(zone) = UtmZone::new(zone, south) else {
                bail!("UTM zone must be in 1..=60, got {zone}");
            };
            let fc = read_collection(&input)?;
            let out = tools::utm_collection_to_wgs84(&fc, zone);
            write_collection(&output, &out)?;
            info!(features = out.len(), zone = zone.number, south, "reprojected");
        }
        Command::Bounds { input } => {
            let fc = read_collection(&input)?;
            match fc.bounds() {
                Some(b) => println!("{}", serde_json::to_string(&b.to_array())?),
                None => bail!("{} has no positions", input.display()),
            }
        }
        Command::Simplify {
            input,
            output,
            tolerance,
        } => {
            check_tolerance(tolerance)?;
            let fc = read_collection(&input)?;
            let out = tools::simplify_collection(&fc, tolerance);
            write_collection(&output, &out)?;
            info!(
                before = tools::count_positions(&fc),
                after = tools::count_positions(&out),
                "simplified"
            );
        }
        Command::Classify { input, kind } => {
            let fc = read_collection(&input)?;
            let c = tools::classify(&fc, kind.into());
            println!("{}", serde_json::to_string_pretty(&c)?);
        }
        Command::Summarize { input } => {
            let fc = read_collection(&input)?;
            println!("{}", serde_json::to_string_pretty(&tools::summarize(&fc))?);
        }
    }
    Ok(())
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_nan() || tolerance < 0.0 {
        bail!("tolerance must be a non-negative number, got {tolerance}");
    }
    Ok(())
}

fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    FeatureCollection::from_geojson_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn write_collection(path: &Path, fc: &FeatureCollection) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = fc.to_geojson_string_pretty()?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}
