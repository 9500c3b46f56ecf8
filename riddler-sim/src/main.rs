mod render;

use clap::{Parser, Subcommand};
use rand::Rng;
use riddler_core::chart::{render_foraging_three, render_foraging_two, render_rendezvous};
use riddler_core::{
    foraging, rendezvous, ChartSink, ForagingThreeTable, ForagingTwoTable, GridFilter,
    LatitudeSampling, RatioResult, RendezvousTable, SimConfig, SimError, ThresholdPairResult,
    ThresholdResult, TrialPlan,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

use render::{JsonChart, TextChart};

#[derive(Parser, Debug)]
#[command(name = "riddler", version)]
#[command(about = "Monte Carlo runs for the alien rendezvous and grizzly salmon puzzles")]
struct Args {
    /// JSON configuration; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trials per parameter value
    #[arg(long, global = true)]
    trials: Option<u64>,

    #[arg(long, global = true)]
    batch_size: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Print tables and chart data as JSON
    #[arg(long, global = true)]
    json: bool,

    /// No per-step trace
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Patrol vs. aliens on a sphere, swept over speed ratios
    Rendezvous(RendezvousArgs),
    /// Bear and salmon threshold rules, two and three hours
    Foraging(ForagingArgs),
    /// Both puzzles
    All {
        #[command(flatten)]
        rendezvous: RendezvousArgs,
        #[command(flatten)]
        foraging: ForagingArgs,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
struct RendezvousArgs {
    #[arg(long)]
    min_ratio: Option<f64>,

    #[arg(long)]
    max_ratio: Option<f64>,

    #[arg(long)]
    ratio_step: Option<f64>,

    /// Sample latitudes uniformly by area instead of by angle
    #[arg(long)]
    area_preserving: bool,
}

#[derive(clap::Args, Debug, Default, Clone)]
struct ForagingArgs {
    /// Skip grid cells where the second threshold is below the first
    #[arg(long)]
    ordered_grid: bool,

    /// Only run the two-hour sweep
    #[arg(long)]
    skip_three: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput {
    plan: Option<TrialPlan>,
    config: Option<SimConfig>,
    rendezvous: Option<RendezvousTable>,
    foraging_two: Option<ForagingTwoTable>,
    foraging_three: Option<ForagingThreeTable>,
    charts: Vec<render::ChartPayload>,
}

fn main() -> Result<(), SimError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            SimConfig::load(path)?
        }
        None => SimConfig::default(),
    };
    apply_overrides(&mut cfg, &args);
    cfg.validate()?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| SimError::invalid_config(format!("threads: {}", e)))?;
    }

    let seed = match cfg.seed {
        Some(seed) => seed,
        None => rand::thread_rng().gen(),
    };
    log::info!("seed {} (pass --seed {} to reproduce)", seed, seed);
    let plan = cfg.plan(seed);
    let trace = !args.quiet && !args.json;

    let (run_rendezvous, run_foraging, skip_three) = match &args.command {
        Command::Rendezvous(_) => (true, false, false),
        Command::Foraging(f) => (false, true, f.skip_three),
        Command::All { foraging, .. } => (true, true, foraging.skip_three),
    };

    let mut output = RunOutput {
        plan: Some(plan),
        ..RunOutput::default()
    };

    // Simulate: every table is complete before anything is drawn.
    if run_rendezvous {
        output.rendezvous = Some(rendezvous::sweep(&cfg.rendezvous, &plan, |row| {
            if trace {
                print_ratio_step(row);
            }
        })?);
    }
    if run_foraging {
        output.foraging_two = Some(foraging::sweep_two(&cfg.foraging, &plan, |row| {
            if trace {
                print_two_step(row);
            }
        })?);
        if !skip_three {
            output.foraging_three = Some(foraging::sweep_three(&cfg.foraging, &plan, |row| {
                if trace {
                    print_three_step(row);
                }
            })?);
        }
    }

    if args.json {
        let mut sink = JsonChart::default();
        render_tables(&output, &mut sink)?;
        output.charts = sink.charts;
        output.config = Some(cfg);
        let text = serde_json::to_string_pretty(&output)
            .unwrap_or_else(|_| "{\"error\":\"failed to serialize\"}".to_string());
        println!("{text}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut sink = TextChart::new(stdout.lock());
    render_tables(&output, &mut sink)?;
    drop(sink);
    print_summary(&output);
    Ok(())
}

fn apply_overrides(cfg: &mut SimConfig, args: &Args) {
    if let Some(trials) = args.trials {
        cfg.trials = trials;
    }
    if let Some(batch_size) = args.batch_size {
        cfg.batch_size = batch_size;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }

    let (rv, fg) = match &args.command {
        Command::Rendezvous(r) => (Some(r), None),
        Command::Foraging(f) => (None, Some(f)),
        Command::All {
            rendezvous,
            foraging,
        } => (Some(rendezvous), Some(foraging)),
    };
    if let Some(r) = rv {
        if let Some(v) = r.min_ratio {
            cfg.rendezvous.min_ratio = v;
        }
        if let Some(v) = r.max_ratio {
            cfg.rendezvous.max_ratio = v;
        }
        if let Some(v) = r.ratio_step {
            cfg.rendezvous.ratio_step = v;
        }
        if r.area_preserving {
            cfg.rendezvous.latitude_sampling = LatitudeSampling::AreaPreserving;
        }
    }
    if let Some(f) = fg {
        if f.ordered_grid {
            cfg.foraging.grid_filter = GridFilter::Ordered;
        }
    }
}

fn render_tables<S: ChartSink>(output: &RunOutput, sink: &mut S) -> Result<(), SimError> {
    if let Some(table) = &output.rendezvous {
        render_rendezvous(table, sink)?;
    }
    if let Some(table) = &output.foraging_two {
        render_foraging_two(table, sink)?;
    }
    if let Some(table) = &output.foraging_three {
        render_foraging_three(table, sink)?;
    }
    Ok(())
}

fn print_ratio_step(row: &RatioResult) {
    println!("ratio {:.2}, patrol wins: {:.3}%", row.ratio, row.percentage());
}

fn print_two_step(row: &ThresholdResult) {
    println!("max kg {:.2}, mean eaten: {:.3}kg", row.max_kg, row.mean);
}

fn print_three_step(row: &ThresholdPairResult) {
    println!(
        "first {:.2}, second {:.2}. mean: {:.2}",
        row.first_max_kg, row.second_max_kg, row.mean
    );
}

fn print_summary(output: &RunOutput) {
    if let Some(plan) = &output.plan {
        println!("\n{} trials per value, seed {}", plan.trials, plan.seed);
    }
    if let Some(last) = output.rendezvous.as_ref().and_then(|t| t.rows.last()) {
        println!(
            "- patrol {:.0}x faster wins {:.3}% of landings",
            last.ratio,
            last.percentage()
        );
    }
    if let Some(best) = output.foraging_two.as_ref().and_then(|t| t.best()) {
        println!(
            "- two hours: eat the first fish if <= {:.2} kg, mean {:.3} kg (sd {:.3})",
            best.max_kg, best.mean, best.stdev
        );
    }
    if let Some(best) = output.foraging_three.as_ref().and_then(|t| t.best()) {
        println!(
            "- three hours: first <= {:.2} kg, second <= {:.2} kg, mean {:.3} kg (sd {:.3})",
            best.first_max_kg, best.second_max_kg, best.mean, best.stdev
        );
    }
}
