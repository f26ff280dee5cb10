//! GPGPU cycle-level simulator CLI.
//!
//! This binary provides a single entry point for simulation runs. It performs:
//! 1. **Config load:** JSON config file or built-in defaults.
//! 2. **Workload selection:** A built-in synthetic trace generator per core.
//! 3. **Run and report:** Drives the device to completion (or the cycle
//!    budget) and prints the sectioned statistics report.

mod workload;

use clap::{Parser, Subcommand};
use std::{fs, process};

use gpgpu_core::common::SimError;
use gpgpu_core::config::Config;
use gpgpu_core::device::Device;
use workload::{DemoWorkload, WorkloadKind};

#[derive(Parser, Debug)]
#[command(
    name = "gsim",
    author,
    version,
    about = "GPGPU cycle-level simulator",
    long_about = "Run a synthetic workload through the cycle-level GPGPU core model.\n\nConfiguration is JSON (see Config); the CLI uses built-in defaults when no file is given.\n\nExamples:\n  gsim run --workload memcpy\n  gsim run --config configs/quad_core.json --workload mixed --trace\n  gsim run --workload compute --cycles 100000 --stats summary --stats core"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workload to completion and print statistics.
    Run {
        /// JSON configuration file (defaults when omitted).
        #[arg(short, long)]
        config: Option<String>,

        /// Workload shape: memcpy, compute, or mixed.
        #[arg(short, long, default_value = "mixed")]
        workload: WorkloadKind,

        /// Iterations per warp program.
        #[arg(short, long, default_value_t = 16)]
        iters: usize,

        /// Cycle budget override (0 = unlimited).
        #[arg(long)]
        cycles: Option<u64>,

        /// Stats sections to print (repeatable); all when omitted.
        #[arg(long)]
        stats: Vec<String>,

        /// Emit per-cycle trace lines to stderr.
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            workload,
            iters,
            cycles,
            stats,
            trace,
        } => cmd_run(config, workload, iters, cycles, stats, trace),
    }
}

/// Runs the simulator: builds the device, installs workloads, loops to
/// completion. On a fatal error, dumps what ran and exits with code 1.
fn cmd_run(
    config_path: Option<String>,
    workload: WorkloadKind,
    iters: usize,
    cycles: Option<u64>,
    stats: Vec<String>,
    trace: bool,
) {
    let mut config = match &config_path {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config {}: {}", path, e);
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Error in config {}: {}", path, e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if let Some(budget) = cycles {
        config.general.cycle_budget = budget;
    }
    if trace {
        config.general.trace = true;
    }

    println!(
        "Configuration: {} ({} cores x {} warps x {} threads, issue width {})",
        config_path.as_deref().unwrap_or("default"),
        config.core.num_cores,
        config.core.num_warps,
        config.core.num_threads,
        config.core.issue_width
    );
    println!("[*] Workload: {:?} ({} iterations per warp)", workload, iters);
    println!();

    let mut device = Device::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    for cid in 0..device.num_cores() {
        let source = DemoWorkload::new(workload, cid, iters, device.config());
        device.set_source(cid, Box::new(source));
    }

    match device.run() {
        Ok(sim_stats) => {
            println!("[*] Completed in {} cycles", sim_stats.cycles);
            sim_stats.print_sections(&stats);
        }
        Err(e @ SimError::CycleBudgetExceeded { .. }) => {
            eprintln!("\n[!] {}", e);
            device.stats().print_sections(&stats);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            device.stats().print_sections(&stats);
            process::exit(1);
        }
    }
}
