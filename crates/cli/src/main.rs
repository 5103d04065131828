//! Process scheduling simulator CLI.
//!
//! This binary loads a set of processes and either poses the scheduling problem or solves it:
//! 1. **Listing (default):** Print each process's instructions and the active policies.
//! 2. **Answers (`-c`):** Run the simulation and print the per-tick trace table.
//! 3. **Statistics (`-p`, with `-c`):** Append total time and CPU/I/O utilization.
//!
//! Processes come from explicit programs (`-P c3,i:c2`) or random descriptions
//! (`-l 5:50,3:100`, seeded by `-s`). `--format json` switches every output to JSON.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use procsim_core::common::SimError;
use procsim_core::config::{IoDonePolicy, SwitchPolicy};
use procsim_core::sim::{SeededSource, loader};
use procsim_core::{Config, ProcessTable, Simulator};

mod report;

use report::{JsonReport, Listing, TraceTable};

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned text, as printed by the classic tool.
    Text,
    /// A single JSON document on stdout.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "procsim",
    version,
    about = "Tick-by-tick single-CPU process scheduling simulator",
    long_about = "Simulates processes that alternate between CPU work and I/O on one CPU.\n\n\
                  Without -c, prints the problem: each process's instructions and the policies in effect.\n\
                  With -c, prints the trace of what happens on every tick.\n\n\
                  Examples:\n  procsim -l 5:100,5:100 -c\n  procsim -P c1,i,c1:c3 -L 2 -S SWITCH_ON_END -c -p\n  procsim --config run.json -P i:c4 -c --format json"
)]
struct Cli {
    /// The random seed.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Explicit programs: `c<N>` for N CPU instructions, `i` for one I/O; `,` between
    /// instructions and `:` between processes (e.g. `c5,i,c3:c2`).
    #[arg(short = 'P', long)]
    program: Option<String>,

    /// Comma-separated random processes `X:Y`: X instructions, each CPU-bound with Y percent
    /// chance and otherwise an I/O. Ignored when `--program` is given.
    #[arg(short = 'l', long = "processlist", value_name = "X:Y,...")]
    process_list: Option<String>,

    /// How long an I/O takes.
    #[arg(short = 'L', long = "iolength")]
    io_length: Option<u64>,

    /// When to switch between processes: SWITCH_ON_IO, SWITCH_ON_END.
    #[arg(short = 'S', long)]
    switch: Option<SwitchPolicy>,

    /// Behavior when an I/O ends: IO_RUN_LATER, IO_RUN_IMMEDIATE.
    #[arg(short = 'I', long = "iodone")]
    io_done: Option<IoDonePolicy>,

    /// Compute answers: run the simulation and print the trace.
    #[arg(short = 'c')]
    solve: bool,

    /// Print statistics at the end; only useful with -c.
    #[arg(short = 'p', long = "printstats")]
    print_stats: bool,

    /// JSON configuration file; flags override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log scheduling decisions to stderr (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

/// Failures surfaced to the user.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("could not encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolves configuration: defaults, then the config file, then individual flags.
fn resolve_config(cli: &Cli) -> Result<Config, SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(io_length) = cli.io_length {
        config.io_length = io_length;
    }
    if let Some(switch) = cli.switch {
        config.switch = switch;
    }
    if let Some(io_done) = cli.io_done {
        config.io_done = io_done;
    }
    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Loads processes from `--program`, or failing that from `--processlist`.
fn load_table(cli: &Cli, config: &Config) -> Result<ProcessTable, SimError> {
    let mut table = ProcessTable::new();
    if let Some(program) = cli.program.as_deref().filter(|p| !p.is_empty()) {
        let _ = loader::load_programs(&mut table, program)?;
    } else {
        let mut source = SeededSource::new(config.seed);
        let descriptions = cli.process_list.as_deref().unwrap_or_default();
        let _ = loader::load_descriptions(&mut table, descriptions, &mut source)?;
    }
    Ok(table)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli)?;
    let table = load_table(cli, &config)?;

    if !cli.solve {
        match cli.format {
            Format::Text => println!("{}\n", Listing { table: &table, config: &config }),
            Format::Json => {
                let report = JsonReport::new(&config, &table);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        return Ok(());
    }

    let processes = table.len();
    let mut sim = Simulator::new(table.clone(), &config);
    let (trace, stats) = sim.run_traced().map_err(SimError::from)?;

    match cli.format {
        Format::Text => {
            println!("{}", TraceTable { trace: &trace, processes });
            if cli.print_stats {
                println!();
                stats.print();
                println!();
            }
        }
        Format::Json => {
            let report = JsonReport::new(&config, &table).with_run(&trace, stats);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
