//! mlfqsim - Run MLFQ scheduler simulations from process description files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use mlfq_simulator::{load_path, simulate, Overrides, SimFormat, Tick};

mod report;

/// Simulate a three-level multi-level feedback queue scheduler.
///
/// The input is either a JSON document carrying the quanta and the process
/// list, or a text/CSV table with one process per line
/// (`name cpu_burst io_time total_cpu_time priority`).
#[derive(Parser)]
#[command(name = "mlfqsim")]
struct Cli {
    /// Path to a `.json` scenario or a text/CSV process table.
    input: PathBuf,

    /// Level 0 quantum in ticks (1..=10). Overrides the input file.
    #[arg(long, value_name = "TICKS")]
    q0: Option<Tick>,

    /// Level 1 quantum in ticks (11..=20). Overrides the input file.
    #[arg(long, value_name = "TICKS")]
    q1: Option<Tick>,

    /// Safety limit on simulated ticks.
    ///
    /// A run that reaches it reports the partial results and exits
    /// non-zero.
    #[arg(long, value_name = "TICKS", env = "MLFQSIM_MAX_TICKS")]
    max_ticks: Option<Tick>,

    /// Print the per-tick timeline.
    #[arg(long)]
    timeline: bool,

    /// Print the content of every queue after each tick.
    #[arg(long)]
    queues: bool,

    /// Print trace events to stderr.
    #[arg(long)]
    dump_trace: bool,

    /// Print the result as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every process finished.
fn run(cli: &Cli) -> Result<bool> {
    let overrides = Overrides {
        quantum_q0: cli.q0,
        quantum_q1: cli.q1,
        max_ticks: cli.max_ticks,
        record_queues: cli.queues,
    };
    let scenario = load_path(&cli.input, &overrides)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let result = simulate(&scenario).context("simulation rejected the scenario")?;

    if cli.dump_trace {
        result.trace.dump();
    }

    if cli.json {
        let json =
            serde_json::to_string_pretty(&result).context("failed to serialize the result")?;
        println!("{json}");
    } else {
        println!("completed: {}", result.completed);
        if cli.timeline {
            println!();
            print!("{}", report::timeline(&result));
        }
        if cli.queues {
            println!();
            print!("{}", report::queues(&result));
        }
        println!();
        print!("{}", report::metrics_table(&result));
        println!();
        println!("context switches: {}", result.context_switches);
        println!("gantt: {}", result.trace.gantt());
        println!();
        println!("{}", result.summary());
    }

    if !result.completed {
        eprintln!(
            "warning: stopped after {} ticks with unfinished processes",
            result.makespan()
        );
    }
    Ok(result.completed)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
