use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rcheck_common::{load_settings, Settings};
use rcheck_core::{equal, sort_notices, trail_cmp, Dump, DumpConfig, Notice, Options};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "rcheck")]
#[command(author = "RCheck Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Deep comparison and pretty dumps of JSON documents", long_about = None)]
struct Cli {
    /// Settings file (defaults to rcheck.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two JSON documents; exits 1 when they differ
    Diff {
        /// Expected document
        left: PathBuf,

        /// Actual document
        right: PathBuf,

        /// Trail prefix for reported mismatches
        #[arg(long)]
        trail: Option<String>,

        /// Trails to leave out of the comparison (can be specified multiple times)
        #[arg(long = "skip-trail")]
        skip_trails: Vec<String>,

        /// Skip private struct fields
        #[arg(long)]
        skip_unexported: bool,

        /// Compare named types by their underlying primitive type
        #[arg(long)]
        cmp_base_types: bool,

        /// Report mismatches ordered by trail
        #[arg(long)]
        sort: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pretty print a JSON document
    Dump {
        file: PathBuf,

        /// Render on a single line
        #[arg(long)]
        flat: bool,

        /// Drop inner whitespace (implies --flat)
        #[arg(long)]
        compact: bool,

        /// Deepest nesting level rendered
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

#[derive(Serialize)]
struct JsonReport {
    left: String,
    right: String,
    equal: bool,
    notices: Vec<JsonNotice>,
}

#[derive(Serialize)]
struct JsonNotice {
    header: String,
    trail: String,
    rows: Vec<JsonRow>,
}

#[derive(Serialize)]
struct JsonRow {
    name: String,
    value: String,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the notice or the dump.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let loaded = load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    debug!(path = %loaded.path.display(), exists = loaded.exists, "settings");
    let settings = loaded.settings;

    match cli.command {
        Commands::Diff {
            left,
            right,
            trail,
            skip_trails,
            skip_unexported,
            cmp_base_types,
            sort,
            json,
        } => {
            let mut opts = Options::from_settings(&settings).with_skip_trails(skip_trails);
            if let Some(trail) = trail {
                opts = opts.with_trail(trail);
            }
            if skip_unexported {
                opts = opts.with_skip_unexported(true);
            }
            if cmp_base_types {
                opts = opts.with_cmp_base_types(true);
            }

            let same = run_diff(&left, &right, &opts, sort, json)?;
            Ok(if same {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_MISMATCH)
            })
        }
        Commands::Dump {
            file,
            flat,
            compact,
            max_depth,
        } => {
            run_dump(&file, &settings, flat, compact, max_depth)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn run_diff(left: &Path, right: &Path, opts: &Options, sort: bool, json: bool) -> Result<bool> {
    info!("Comparing {} with {}", left.display(), right.display());
    let want = read_json(left)?;
    let have = read_json(right)?;

    let notice = match equal(&want, &have, opts) {
        Ok(()) => None,
        Err(notice) if sort => Some(sort_notices(notice, trail_cmp)),
        Err(notice) => Some(notice),
    };
    let same = notice.is_none();
    if let Some(notice) = &notice {
        info!("Found {} mismatches", notice.chain_len());
    }

    if json {
        let report = JsonReport {
            left: left.display().to_string(),
            right: right.display().to_string(),
            equal: same,
            notices: notice.as_ref().map(json_notices).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(notice) = &notice {
        println!("{}", notice);
    }

    Ok(same)
}

fn json_notices(notice: &Notice) -> Vec<JsonNotice> {
    notice.iter()
        .map(|n| JsonNotice {
            header: n.header().to_string(),
            trail: n.trail().to_string(),
            rows: n
                .rows()
                .iter()
                .map(|row| JsonRow {
                    name: row.name().to_string(),
                    value: row.value().to_string(),
                })
                .collect(),
        })
        .collect()
}

fn run_dump(
    file: &Path,
    settings: &Settings,
    flat: bool,
    compact: bool,
    max_depth: Option<usize>,
) -> Result<()> {
    let doc = read_json(file)?;

    let mut cfg = DumpConfig::from_settings(&settings.dump);
    if flat {
        cfg = cfg.with_flat(true);
    }
    if compact {
        cfg = cfg.with_compact(true);
    }
    if let Some(depth) = max_depth {
        cfg = cfg.with_max_depth(depth);
    }

    println!("{}", Dump::new(cfg).any(&doc));
    Ok(())
}
