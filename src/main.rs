use anyhow::{Context, Result};
use clap::Parser;
use irveprep::{
    clean::Gratuity,
    config::{delimiter_byte, AppConfig},
    load_and_clean,
    view::{self, Kpis, PowerRange, StationFilter, ValueCount},
};
use serde::Serialize;
use std::{path::PathBuf, process::exit};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean the IRVE charging-point registry and summarise the selection"
)]
struct Args {
    /// Consolidated IRVE CSV export (overrides the config file)
    #[arg(short, long)]
    source: Option<PathBuf>,
    /// YAML config file
    #[arg(short, long, env = "IRVE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    delimiter: Option<char>,
    /// Keep only these operators (repeatable, case-insensitive)
    #[arg(long = "operator")]
    operators: Vec<String>,
    #[arg(long)]
    min_power: Option<f64>,
    #[arg(long)]
    max_power: Option<f64>,
    /// Yes, No or Unknown
    #[arg(long, value_parser = parse_gratuit)]
    gratuit: Option<Gratuity>,
    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

fn parse_gratuit(s: &str) -> Result<Gratuity, String> {
    Gratuity::from_label(s).ok_or_else(|| format!("expected Yes, No or Unknown, got `{}`", s))
}

#[derive(Serialize)]
struct Report {
    source: String,
    total_stations: usize,
    operators: usize,
    power_range: Option<PowerRange>,
    gratuit_options: Vec<Gratuity>,
    filter: StationFilter,
    kpis: Kpis,
    top_operators: Vec<ValueCount<String>>,
    power_distribution: Vec<ValueCount<f64>>,
    power_histogram: Vec<view::HistogramBin>,
    map_points: usize,
    map_centre: Option<(f64, f64)>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(source) = &args.source {
        cfg.source = source.clone();
    }
    if let Some(d) = args.delimiter {
        cfg.delimiter = d;
    }
    let delimiter = delimiter_byte(cfg.delimiter)?;
    info!(source = %cfg.source.display(), "startup");

    // ─── 3) load + clean, stop on no data ────────────────────────────
    let Some(snapshot) = load_and_clean(&cfg.source, delimiter)
        .with_context(|| format!("cleaning {}", cfg.source.display()))?
    else {
        eprintln!("no data loaded from {}; nothing to show", cfg.source.display());
        exit(1);
    };

    // ─── 4) build the selection ──────────────────────────────────────
    let range = view::power_range(&snapshot)?;
    let mut filter = StationFilter::dashboard_default(&snapshot)?;
    if !args.operators.is_empty() {
        filter = filter.with_operators(&args.operators);
    }
    let (lo, hi) = filter.power_range.unwrap_or_default();
    filter = filter.with_power_range(
        args.min_power.unwrap_or(lo),
        args.max_power.unwrap_or(hi),
    );
    if let Some(g) = args.gratuit {
        filter = filter.with_gratuit(g);
    }
    let selected = filter.apply(&snapshot)?;
    if selected.num_rows() == 0 {
        warn!("selection is empty");
    }

    // ─── 5) aggregate ────────────────────────────────────────────────
    let map = view::map_view(&selected, Some(&cfg.map_bounds))?;
    let report = Report {
        source: cfg.source.display().to_string(),
        total_stations: snapshot.num_rows(),
        operators: view::operator_options(&snapshot)?.len(),
        power_range: range,
        gratuit_options: view::gratuit_options(&snapshot)?,
        filter,
        kpis: view::kpis(&selected)?,
        top_operators: view::operator_counts(&selected, Some(cfg.top_operators))?,
        power_distribution: view::power_counts(&selected)?,
        power_histogram: view::power_histogram(&selected, cfg.histogram_bins)?,
        map_points: map.points.len(),
        map_centre: map.centre,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    if selected.num_rows() > 0 {
        println!("\n--- Preview ---");
        println!("{}", view::preview(&selected, cfg.preview_rows)?);
    }

    info!("all done");
    Ok(())
}

fn print_report(r: &Report) {
    println!("=== IRVE: {} ===", r.source);
    println!(
        "{} stations after cleaning, {} operators, gratuit labels: {}",
        r.total_stations,
        r.operators,
        r.gratuit_options
            .iter()
            .map(Gratuity::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(range) = r.power_range {
        println!("power range: {} – {} kW", range.min_kw, range.max_kw);
    }

    println!("\n--- Selection ---");
    println!("{: <28} {:>12}", "Stations", r.kpis.stations);
    println!("{: <28} {:>12}", "Charge points (PDC)", r.kpis.charge_points);
    match r.kpis.mean_power_kw {
        Some(mean) => println!("{: <28} {:>9.1} kW", "Mean power", mean),
        None => println!("{: <28} {:>12}", "Mean power", "n/a"),
    }

    if r.kpis.stations == 0 {
        println!("\nno stations match the selection");
        return;
    }

    println!("\n--- Top operators ---");
    for vc in &r.top_operators {
        println!("{: <40} {:>8}", vc.value, vc.count);
    }

    println!("\n--- Power distribution (kW) ---");
    for vc in &r.power_distribution {
        println!("{:>10} {:>8}", vc.value, vc.count);
    }

    println!("\n--- Power histogram ---");
    for bin in &r.power_histogram {
        println!(
            "[{:>8.1}, {:>8.1}] {:>8}",
            bin.lower_kw, bin.upper_kw, bin.count
        );
    }

    println!("\n--- Map ---");
    match r.map_centre {
        Some((lat, lon)) => println!(
            "{} points in bounds, centred on {:.5}, {:.5}",
            r.map_points, lat, lon
        ),
        None => println!("no geolocated station within the map bounds"),
    }
}
