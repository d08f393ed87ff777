//! Batch playout CLI.
//!
//! Plays a level many times with a random agent and outputs one JSON record
//! per run as JSONL.
//!
//! Usage:
//!   cargo run --release --bin playout -- [OPTIONS]
//!
//! Options:
//!   --level FILE     Level layout JSON (default: a generated level)
//!   --rows N         Rows of the generated level (default: 6)
//!   --cols N         Columns of the generated level (default: 6)
//!   --runs N         Number of runs (default: 100)
//!   --decisions N    Agent decisions per run (default: 64)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --output FILE    Output file path (default: stdout)

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use log::{error, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use congaline::levelgen::{generate_layout, GenParams};
use congaline::playout::{self, PlayoutConfig};
use congaline::protocol::layout::{parse_layout, LevelLayout};

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            error!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn load_layout(path: Option<&str>, params: &GenParams, seed: u64) -> LevelLayout {
    let result = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| parse_layout(&json).map_err(|e| e.to_string())),
        None => {
            let mut rng = if seed != 0 {
                SmallRng::seed_from_u64(seed)
            } else {
                SmallRng::from_entropy()
            };
            generate_layout(params, &mut rng).map_err(|e| e.to_string())
        }
    };
    match result {
        Ok(layout) => layout,
        Err(e) => {
            error!("cannot load level: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut config = PlayoutConfig::default();
    let mut params = GenParams::default();
    let mut level_path: Option<String> = None;
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--level" => {
                i += 1;
                level_path = args.get(i).cloned();
            }
            "--rows" => {
                i += 1;
                params.rows = value(&args, i, "--rows");
            }
            "--cols" => {
                i += 1;
                params.cols = value(&args, i, "--cols");
            }
            "--runs" => {
                i += 1;
                config.runs = value(&args, i, "--runs");
            }
            "--decisions" => {
                i += 1;
                config.max_decisions = value(&args, i, "--decisions");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = args.get(i).cloned();
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                error!("unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let layout = load_layout(level_path.as_deref(), &params, config.seed);
    info!(
        "Playout: {:?} {}x{}, {} runs, {} decisions/run, {} threads",
        layout.name,
        layout.rows(),
        layout.cols(),
        config.runs,
        config.max_decisions,
        config.threads
    );

    let start = Instant::now();
    let records = match playout::run_playouts(&layout, &config) {
        Ok(records) => records,
        Err(e) => {
            error!("playout failed: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Completed {} runs in {:.1}s",
        records.len(),
        start.elapsed().as_secs_f64()
    );
    playout::log_summary(&records);

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            playout::write_jsonl(&records, &mut writer)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            playout::write_jsonl(&records, &mut writer)
        }
    };
    match (written, output_path) {
        (Err(e), _) => {
            error!("failed to write output: {}", e);
            process::exit(1);
        }
        (Ok(()), Some(path)) => info!("Wrote {} runs to {}", records.len(), path),
        (Ok(()), None) => {}
    }
}

fn print_usage() {
    eprintln!("Usage: playout [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --level FILE     Level layout JSON (default: a generated level)");
    eprintln!("  --rows N         Rows of the generated level (default: 6)");
    eprintln!("  --cols N         Columns of the generated level (default: 6)");
    eprintln!("  --runs N         Number of runs (default: 100)");
    eprintln!("  --decisions N    Agent decisions per run (default: 64)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --help           Show this help");
}
