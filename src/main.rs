// Entry point and high-level CLI flow.
//
// - Climate data starts loading in the background as soon as the program
//   starts; handlers that need it wait on a readiness signal instead of
//   polling.
// - Option [1] reloads every resource and prints diagnostics.
// - Option [4] writes the annotated boundaries, site points and summaries.
// - `--once` runs the load and export without the menu.
use anyhow::{bail, Context, Result};
use clap::Parser;
use climate_overlay::boundaries::BoundaryCollection;
use climate_overlay::calendar::{self, DateBinding};
use climate_overlay::loader::{self, LoadReport};
use climate_overlay::sites::{self, SiteFilter};
use climate_overlay::state::{AppState, Readiness, Update};
use climate_overlay::types::{ClimateRecord, Percentile, Period};
use climate_overlay::{output, reports, util};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "climate_overlay")]
#[command(about = "Climate choropleth and heritage-site data pipeline")]
struct Args {
    /// Climate projection table (path or http(s) URL)
    #[arg(long, default_value = "data/climate_impact_data.csv")]
    climate_csv: String,

    /// Boundary polygons as GeoJSON (path or http(s) URL)
    #[arg(long, default_value = "data/world-administrative-boundaries.geojson")]
    boundaries: String,

    /// UNESCO WHC001 site export (path or http(s) URL)
    #[arg(long, default_value = "data/whc001.csv")]
    sites: String,

    /// Directory receiving generated files
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Initial time period (e.g. 2040-2059)
    #[arg(long, default_value = "1986-2005")]
    period: Period,

    /// Initial percentile (5, 50 or 95)
    #[arg(long, default_value = "50")]
    percentile: Percentile,

    /// Load and export once, then exit
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone)]
struct Config {
    climate_csv: String,
    boundaries: String,
    sites: String,
    out_dir: PathBuf,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            climate_csv: args.climate_csv.clone(),
            boundaries: args.boundaries.clone(),
            sites: args.sites.clone(),
            out_dir: args.out_dir.clone(),
        }
    }
}

type ClimateLoad = std::result::Result<(Vec<ClimateRecord>, BoundaryCollection, LoadReport), String>;

fn spawn_climate_load(config: &Config) -> Arc<Readiness<ClimateLoad>> {
    let ready = Arc::new(Readiness::new());
    let resolver = Arc::clone(&ready);
    let (csv, geo) = (config.climate_csv.clone(), config.boundaries.clone());
    thread::spawn(move || {
        let outcome = loader::load_climate(&csv, &geo).map_err(|e| e.to_string());
        if resolver.resolve(outcome).is_err() {
            warn!("climate load resolved twice");
        }
    });
    ready
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing climate data... ({} rows read, {} kept for tas_annual, {} boundary features)",
        util::format_int(report.total_rows),
        util::format_int(report.kept_rows),
        util::format_int(report.features)
    );
    if report.dropped_rows + report.invalid_values > 0 {
        println!(
            "Note: {} rows skipped for column-count mismatch, {} for unreadable values.",
            util::format_int(report.dropped_rows),
            util::format_int(report.invalid_values)
        );
    }
}

/// Wait for the startup load if the state has no climate data yet.
fn ensure_climate(state: &mut AppState, pending: &Readiness<ClimateLoad>) -> Result<()> {
    if state.is_climate_loaded() {
        return Ok(());
    }
    if !pending.is_ready() {
        println!("Waiting for climate data...");
    }
    match pending.wait() {
        Ok((records, boundaries, report)) => {
            print_load_report(report);
            state.apply(Update::ClimateLoaded {
                records: records.clone(),
                boundaries: boundaries.clone(),
            });
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "climate data unavailable; choropleth disabled");
            bail!("climate data is unavailable ({e}); try option 1 after fixing the inputs")
        }
    }
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: fetch everything again and rebuild wholesale.
///
/// On failure the previously loaded state is left intact.
fn handle_load(state: &mut AppState, config: &Config) {
    match loader::load_climate(&config.climate_csv, &config.boundaries) {
        Ok((records, boundaries, report)) => {
            print_load_report(&report);
            state.apply(Update::ClimateLoaded { records, boundaries });
        }
        Err(e) => {
            error!(error = %e, "failed to load climate data");
            eprintln!("Failed to load climate data: {}\n", e);
        }
    }
    handle_load_sites(state, config);
    println!();
}

fn handle_load_sites(state: &mut AppState, config: &Config) {
    match loader::load_sites(&config.sites) {
        Ok((sites, report)) => {
            println!(
                "Loaded {} heritage sites ({} with invalid coordinates).",
                util::format_int(report.loaded),
                util::format_int(report.invalid_coordinates)
            );
            state.apply(Update::SitesLoaded(sites));
        }
        Err(e) => {
            warn!(error = %e, "heritage sites unavailable");
            eprintln!("Failed to load heritage sites: {}", e);
        }
    }
}

/// Handle option [2]: choose period, percentile and slider year.
fn handle_selection(state: &mut AppState) {
    let keys: Vec<&str> = Period::ALL.iter().map(|p| p.key()).collect();
    let input = read_line(&format!("Period [{}] (blank keeps {}): ", keys.join(", "), state.period()));
    if !input.is_empty() {
        match input.parse::<Period>() {
            Ok(p) => {
                state.apply(Update::SelectPeriod(p));
            }
            Err(e) => println!("{}", e),
        }
    }
    let input = read_line(&format!("Percentile [5, 50, 95] (blank keeps {}): ", state.percentile().number()));
    if !input.is_empty() {
        match input.parse::<Percentile>() {
            Ok(p) => {
                state.apply(Update::SelectPercentile(p));
            }
            Err(e) => println!("{}", e),
        }
    }
    let range = state.period().year_range();
    let input = read_line(&format!(
        "Year {}-{} (blank keeps {}): ",
        range.start(),
        range.end(),
        state.timeline().year()
    ));
    if let Ok(year) = input.parse::<i32>() {
        state.apply(Update::SetYear(year));
    }
    println!(
        "Selection: {} ({}), percentile {}, year {}\n",
        state.period().label(),
        state.period(),
        state.percentile().number(),
        state.timeline().year()
    );
}

/// Handle option [3]: filter heritage sites by name, category and danger.
fn handle_search(state: &mut AppState) {
    let query = read_line("Name contains (blank for all): ");
    let category = read_line("Category [cultural/natural/mixed] (blank for all): ");
    let danger = read_line("In danger? [y/n] (blank for all): ");
    let filter = SiteFilter {
        query,
        category: Some(category).filter(|c| !c.is_empty()),
        danger: match danger.to_lowercase().as_str() {
            "y" | "yes" | "true" => Some(true),
            "n" | "no" | "false" => Some(false),
            _ => None,
        },
    };
    state.apply(Update::Filter(filter));
    let rows = reports::site_rows(state.filtered_sites());
    println!("{} matching sites\n", util::format_int(rows.len()));
    output::preview_table_rows(&rows, 10);
}

/// Handle option [5]: type the data tab date range.
fn handle_dates(state: &mut AppState) {
    let picker = state.picker_mut(DateBinding::DataTab);
    let label = picker.config().start_label;
    if let Err(e) = picker.set_start_text(&read_line(&format!("{} (dd/mm/yyyy): ", label))) {
        println!("{}", e);
    }
    let label = picker.config().end_label;
    if let Err(e) = picker.set_end_text(&read_line(&format!("{} (dd/mm/yyyy): ", label))) {
        println!("{}", e);
    }
    match picker.range() {
        Some((start, end)) if start <= end => println!(
            "Date range selected: {} to {}\n",
            calendar::format_date(start),
            calendar::format_date(end)
        ),
        Some(_) => println!("End date is before start date.\n"),
        None => println!("Date range incomplete.\n"),
    }
}

/// Handle option [4]: write every output file and print previews.
fn handle_generate(state: &mut AppState, config: &Config, pending: &Readiness<ClimateLoad>) -> Result<()> {
    ensure_climate(state, pending)?;
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("create {}", config.out_dir.display()))?;

    let view = state.refresh()?;
    let lookup = state.lookup().context("climate lookup missing after load")?;
    let boundaries = state.boundaries().context("boundaries missing after load")?;

    let geo_path = config.out_dir.join("climate_choropleth.geojson");
    output::write_json(&geo_path, &view.annotation.collection.to_value())?;
    println!(
        "Choropleth: {} features ({} regional, {} national, {} without data)",
        util::format_int(view.annotation.stats.total()),
        util::format_int(view.annotation.stats.regional),
        util::format_int(view.annotation.stats.national),
        util::format_int(view.annotation.stats.unmatched)
    );
    match view.legend {
        Some(l) => println!(
            "Legend: {} - {}",
            util::format_celsius(l.min),
            util::format_celsius(l.max)
        ),
        None => println!("Legend: no data for {} / p{}", view.period, view.percentile.number()),
    }
    println!("(Full collection exported to {})\n", geo_path.display());

    let tiers = reports::tier_summary(lookup, boundaries);
    let tiers_path = config.out_dir.join("match_tiers.csv");
    output::write_csv(&tiers_path, &tiers)?;
    println!("Match tiers by period and percentile\n");
    output::preview_table_rows(&tiers, 12);

    if !state.sites().is_empty() {
        let sites_path = config.out_dir.join("heritage_sites.geojson");
        output::write_json(&sites_path, &sites::sites_to_geojson(state.filtered_sites())?)?;
        println!("(Heritage sites exported to {})\n", sites_path.display());
    }

    let summary = reports::generate_summary(lookup, &view);
    output::write_json(&config.out_dir.join("summary.json"), &summary)?;
    info!(out_dir = %config.out_dir.display(), "outputs written");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;
    let config = Config::from(&args);
    info!(?config, "starting climate overlay");

    // Single owner of all mutable state; handlers borrow it.
    let mut state = AppState::new(chrono::Local::now().date_naive());
    state.apply(Update::SelectPeriod(args.period));
    state.apply(Update::SelectPercentile(args.percentile));
    let pending = spawn_climate_load(&config);

    if args.once {
        handle_load_sites(&mut state, &config);
        return handle_generate(&mut state, &config, &pending);
    }

    loop {
        println!("Select an action:");
        println!("[1] Reload data files");
        println!("[2] Choose period and percentile");
        println!("[3] Search heritage sites");
        println!("[4] Generate outputs");
        println!("[5] Set data date range");
        println!("[0] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(&mut state, &config),
            "2" => handle_selection(&mut state),
            "3" => {
                if state.sites().is_empty() {
                    handle_load_sites(&mut state, &config);
                }
                handle_search(&mut state);
            }
            "4" => {
                println!();
                if let Err(e) = handle_generate(&mut state, &config, &pending) {
                    error!(error = %e, "output generation failed");
                    eprintln!("Error: {:#}\n", e);
                }
            }
            "5" => handle_dates(&mut state),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
    Ok(())
}
