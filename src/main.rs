mod authored;
mod config;
mod date;
mod deep;
mod error;
mod fixer;
mod ladder;
mod location;
mod refine;
mod scanner;
mod table;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use chronicle_types::InteractionRecord;
use config::Config;
use scanner::ChronicleScanner;
use table::MasterTable;

const OUTPUT_DIR: &str = "output";
const LOG_DIR: &str = "logs";

const INTERACTIONS_CSV: &str = "social_interactions.csv";
const FIX_LOG: &str = "fix_master_chronology.json";
const LOCATIONS_JSON: &str = "location_history.json";
const RIBBONS_JSON: &str = "relationship_ribbons.json";
const DEEP_JSON: &str = "deep_timeline.json";

#[derive(Parser)]
#[command(
    name = "chronicle_extract",
    about = "黃賓虹 chronology pipeline: scan, repair, compress, refine"
)]
struct Cli {
    /// TOML configuration; built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a raw chronicle for tracked-name mentions → CSV
    Scan {
        /// Chronicle text file, or a directory of .txt volumes
        path: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Repair Exact_Date years against Event_ID, in place
    Fix {
        /// Master chronology CSV
        master: PathBuf,
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Compress the subject's residence into change points
    Locations {
        master: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// One relationship ribbon per tracked person
    Ribbons {
        master: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Topic-annotated ribbon for the [deep] counterpart
    Deep {
        master: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// fix, then locations, ribbons and deep on the corrected table
    All {
        master: PathBuf,
        #[arg(long, default_value = OUTPUT_DIR)]
        out_dir: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let default_out = |out: Option<PathBuf>, name: &str| out.unwrap_or_else(|| output_path(name));

    match cli.command {
        Command::Scan { path, out } => run_scan(&config, &path, &default_out(out, INTERACTIONS_CSV)),
        Command::Fix { master, log } => {
            let log = log.unwrap_or_else(|| Path::new(LOG_DIR).join(FIX_LOG));
            run_fix(&master, &log)
        }
        Command::Locations { master, out } => {
            run_locations(&config, &master, &default_out(out, LOCATIONS_JSON))
        }
        Command::Ribbons { master, out } => {
            run_ribbons(&config, &master, &default_out(out, RIBBONS_JSON))
        }
        Command::Deep { master, out } => run_deep(&config, &master, &default_out(out, DEEP_JSON)),
        Command::All { master, out_dir } => {
            run_fix(&master, &Path::new(LOG_DIR).join(FIX_LOG))?;
            run_locations(&config, &master, &out_dir.join(LOCATIONS_JSON))?;
            run_ribbons(&config, &master, &out_dir.join(RIBBONS_JSON))?;
            run_deep(&config, &master, &out_dir.join(DEEP_JSON))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn output_path(name: &str) -> PathBuf {
    Path::new(OUTPUT_DIR).join(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

/// Serialize `rows` under `header`. The header is written even with no rows.
fn write_csv<T: serde::Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    if rows.is_empty() {
        wtr.write_record(header)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    eprintln!("  {} ({} rows)", path.display(), rows.len());
    Ok(())
}

/// The master table, or `None` (with a warning) when it has not been produced yet.
fn load_master(path: &Path) -> Result<Option<MasterTable>> {
    let table = MasterTable::read_optional(path)?;
    match &table {
        None => warn!("{} not found; nothing to do", path.display()),
        Some(t) if t.is_empty() => warn!("{} has no rows", path.display()),
        Some(t) => info!("Loaded {} rows from {}", t.len(), path.display()),
    }
    Ok(table)
}

// ═══════════════════════════════════════════════════════════════════════
//  PIPELINE STAGES
// ═══════════════════════════════════════════════════════════════════════

fn run_scan(config: &Config, path: &Path, out: &Path) -> Result<()> {
    eprintln!("Scanning chronicle at: {}", path.display());
    let lines = scanner::read_chronicle(path)?;
    let records = ChronicleScanner::new(&config.scan).scan_lines(&lines[..]);

    eprintln!("Found {} interactions", records.len());
    for (kind, count) in scanner::type_counts(&records) {
        eprintln!("  {}: {count}", kind.as_chinese());
    }
    if records.is_empty() {
        warn!("No tracked names found in {}", path.display());
    }
    write_csv(out, &InteractionRecord::HEADER, &records)
}

fn run_fix(master: &Path, log: &Path) -> Result<()> {
    let report = fixer::fix_file(master)
        .with_context(|| format!("cannot repair {}", master.display()))?;
    eprintln!(
        "Repaired {} of {} rows",
        report.total_fixed, report.total_processed
    );
    write_json(log, &report)
}

fn run_locations(config: &Config, master: &Path, out: &Path) -> Result<()> {
    let Some(table) = load_master(master)? else {
        return Ok(());
    };
    let points = location::compress(&table, &config.window, &config.subject);
    write_json(out, &points)
}

fn run_ribbons(config: &Config, master: &Path, out: &Path) -> Result<()> {
    let Some(table) = load_master(master)? else {
        return Ok(());
    };
    let ribbons = refine::ribbons(&table, &config.relations);
    write_json(out, &ribbons)
}

fn run_deep(config: &Config, master: &Path, out: &Path) -> Result<()> {
    let Some(table) = load_master(master)? else {
        return Ok(());
    };
    let events = deep::deep_timeline(&table, config);
    write_json(out, &events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_types::InteractionType;

    const HEADER_LINE: &str = "Date,Subject_Loc,Target_Name,Interaction_Type,Third_Party,Context_Snippet";

    #[test]
    fn test_empty_scan_csv_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("interactions.csv");
        write_csv(&path, &InteractionRecord::HEADER, &Vec::<InteractionRecord>::new()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), HEADER_LINE);
    }

    #[test]
    fn test_scan_csv_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.csv");
        let record = InteractionRecord {
            date: "1935.11.19".into(),
            location_hint: "上海".into(),
            target_name: "傅雷".into(),
            interaction_type: InteractionType::Meeting,
            third_parties: vec!["张大千".into(), "徐悲鸿".into()],
            context_snippet: "傅雷来访".into(),
        };
        write_csv(&path, &InteractionRecord::HEADER, &[record]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![HEADER_LINE, "1935.11.19,上海,傅雷,见面,张大千 / 徐悲鸿,傅雷来访"]);
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("points.json");
        write_json(&path, &vec!["上海", "北平"]).unwrap();
        let back: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec!["上海", "北平"]);
    }
}
