//! `mousetrap` – command line front end for the cat-and-mouse simulation.
//!
//! 1. Loads `~/.mousetrap/config.toml` (or `--config PATH`), falling back to
//!    defaults, and applies `MOUSETRAP_*` environment overrides.
//! 2. Installs structured logging (see `mousetrap_runtime::telemetry`).
//! 3. Runs the simulation headless at a fixed frame length, or in real time
//!    with **Ctrl-C** stopping both trees and printing the report so far.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use mousetrap_runtime::init_tracing;
use mousetrap_sim::{Outcome, RunReport, Simulation};
use mousetrap_types::ConfigError;

/// Cat-and-mouse behavior-tree simulation
#[derive(Parser)]
#[command(name = "mousetrap")]
#[command(about = "Cat-and-mouse behavior-tree simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.mousetrap/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation and print a report
    Run(RunArgs),

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(Args)]
struct RunArgs {
    /// Stop after this many frames even if the chase is still on
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace frames in wall-clock time instead of stepping as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config::config_path);

    let result = match cli.command {
        Command::Run(args) => run(&path, args),
        Command::Init { force } => init(&path, force),
        Command::ShowConfig => show_config(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn run(path: &Path, args: RunArgs) -> Result<(), ConfigError> {
    let mut cfg = config::load(path)?;
    if let Some(seed) = args.seed {
        cfg.simulation.seed = seed;
    }

    let _telemetry = init_tracing(&cfg.telemetry);
    let mut sim = Simulation::new(cfg.simulation)?;

    if !args.json {
        print_banner();
    }

    let report = if args.realtime {
        run_realtime(&mut sim, args.frames)
    } else {
        sim.run_headless(args.frames)
    };
    info!(outcome = ?report.outcome, frames = report.frames, "run complete");

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Drive the simulation from the wall clock until it ends, `max_frames` pass
/// or Ctrl-C is pressed.
fn run_realtime(sim: &mut Simulation, max_frames: u64) -> RunReport {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run can only end on its own");
    }

    let frame_length = Duration::from_secs_f64(sim.frame_delta());
    let mut last = Instant::now();
    while sim.frames() < max_frames {
        if shutdown.load(Ordering::SeqCst) {
            println!();
            println!("{}", "⚠  Ctrl-C received – stopping the simulation …".yellow().bold());
            sim.stop();
            break;
        }
        std::thread::sleep(frame_length);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;
        if sim.frame(dt) != Outcome::Ongoing {
            break;
        }
    }
    sim.report()
}

fn init(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        println!(
            "  Config already exists at {} (use {} to overwrite)",
            path.display().to_string().bold(),
            "--force".bold()
        );
        return Ok(());
    }
    config::save_to(&config::Config::default(), path)?;
    println!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn show_config(path: &Path) -> Result<(), ConfigError> {
    let cfg = config::load(path)?;
    cfg.simulation.validate()?;
    let raw = toml::to_string_pretty(&cfg).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    println!("# {}", path.display());
    print!("{raw}");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   /\_/\     mousetrap"#.bold().cyan());
    println!("{}", r#"  ( o.o )    cat vs. mouse"#.bold().cyan());
    println!("{}", r#"   > ^ <     "#.bold().cyan());
    println!();
    println!("  {}", format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!();
}

fn print_report(report: &RunReport) {
    let outcome = match report.outcome {
        Outcome::MouseCaught => "the cat caught the mouse".red().bold(),
        Outcome::AllCheeseCollected => "the mouse got all the cheese".green().bold(),
        Outcome::Ongoing => "still running".yellow().bold(),
    };
    println!("  Outcome:   {outcome}");
    println!(
        "  Frames:    {} ({:.2} s simulated)",
        report.frames, report.simulated_seconds
    );
    println!(
        "  Ticks:     cat {} / mouse {}",
        report.cat_ticks, report.mouse_ticks
    );
    println!(
        "  Cheese:    {} collected, {} left",
        report.cheese_collected, report.cheese_remaining
    );
    println!(
        "  Cat:       {} {}",
        report.cat_position,
        format!("({:?})", report.cat_mode).dimmed()
    );
    println!(
        "  Mouse:     {} {}",
        report.mouse_position,
        format!("({:?})", report.mouse_mode).dimmed()
    );
    println!();
}
