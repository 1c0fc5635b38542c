use cancel_this::Cancellable;
use clap::Parser;
use env_logger::Builder;
use kaprekar_dynamics::{KaprekarResult, split_cancelled};
use kaprekar_dynamics::analysis::{AnalysisConfig, AnalysisReport, run_analysis};
use kaprekar_dynamics::digits::Width;
use kaprekar_dynamics::seeds::SeedSpec;
use kaprekar_dynamics::statistics::{PrefixCoverage, prefix_coverage, reachable_classes};
use kaprekar_dynamics::transform::NodeKind;
use log::LevelFilter;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kaprekar")]
#[command(about = "Find cycles and feeders of the Kaprekar map for a fixed number of digits")]
struct Args {
    /// Number of digits of every value
    #[arg(long, short = 'w', require_equals = true)]
    width: usize,

    /// Comma separated list of seeds
    #[arg(long, value_delimiter = ',', require_equals = true, conflicts_with_all = ["range", "random", "canonical"])]
    seeds: Option<Vec<u64>>,

    /// Half-open range of seeds, e.g. `0..1000`
    #[arg(long, value_parser = parse_range, require_equals = true, conflicts_with_all = ["random", "canonical"])]
    range: Option<(u64, u64)>,

    /// Number of uniformly random seeds
    #[arg(long, require_equals = true, conflicts_with = "canonical")]
    random: Option<usize>,

    /// Seed of the random generator used by `--random`
    #[arg(long, default_value_t = 0, require_equals = true)]
    rng_seed: u64,

    /// Start from the canonical signature of every class (default if no seeds are given)
    #[arg(long)]
    canonical: bool,

    /// Build trajectories and the graph over raw values or class signatures
    #[arg(long, default_value = "signature", require_equals = true)]
    nodes: Nodes,

    /// Drop graph edges traversed fewer times than this
    #[arg(long, default_value_t = 1, require_equals = true)]
    min_weight: u64,

    /// Step limit of every trajectory (default: the size of the node space)
    #[arg(long, require_equals = true)]
    max_steps: Option<usize>,

    /// Capacity of the successor cache (0 = no cache)
    #[arg(long, default_value_t = kaprekar_dynamics::analysis::DEFAULT_CACHE_CAPACITY, require_equals = true)]
    cache_capacity: usize,

    /// Also count the classes reached after 1..=K steps from the seeds
    #[arg(long, value_name = "K", require_equals = true)]
    reachable: Option<usize>,

    /// Also count the classes covered by the given fractions of the value range
    #[arg(long, value_delimiter = ',', require_equals = true)]
    coverage: Option<Vec<f64>>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS", require_equals = true)]
    timeout: Option<u64>,

    /// Print the complete report as JSON
    #[arg(long)]
    json: bool,

    /// Logging verbosity (use -v for info, or -v=LEVEL for a specific level)
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Clone, clap::ValueEnum)]
enum Nodes {
    Value,
    Signature,
}

impl From<Nodes> for NodeKind {
    fn from(value: Nodes) -> Self {
        match value {
            Nodes::Value => NodeKind::Value,
            Nodes::Signature => NodeKind::Signature,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

fn parse_range(value: &str) -> Result<(u64, u64), String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected `start..end`, got `{}`", value))?;
    let start = start.trim().parse::<u64>().map_err(|e| e.to_string())?;
    let end = end.trim().parse::<u64>().map_err(|e| e.to_string())?;
    Ok((start, end))
}

#[derive(serde::Serialize)]
struct Output {
    report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    reachable_classes: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix_coverage: Option<Vec<PrefixCoverage>>,
}

fn main() {
    let args = Args::parse();

    // None = no flag, Some(None) = `-v` without a level, Some(Some(level)) = `-v=level`.
    let log_level = match args.verbose {
        None => LevelFilter::Off,
        Some(None) => LevelFilter::Info,
        Some(Some(level)) => level.into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    let width = Width::new(args.width).unwrap_or_else(|e| {
        eprintln!("Invalid width: {}", e);
        std::process::exit(1);
    });

    let seeds = if let Some(seeds) = args.seeds {
        SeedSpec::List(seeds)
    } else if let Some((start, end)) = args.range {
        SeedSpec::Range { start, end }
    } else if let Some(count) = args.random {
        SeedSpec::Random {
            count,
            seed: args.rng_seed,
        }
    } else {
        SeedSpec::Canonical
    };

    let config = AnalysisConfig {
        width,
        seeds,
        node_kind: args.nodes.into(),
        min_edge_weight: args.min_weight,
        max_steps: args.max_steps,
        cache_capacity: args.cache_capacity,
    };
    let reachable_steps = args.reachable;
    let fractions = args.coverage;

    let analysis = || -> Cancellable<KaprekarResult<Output>> {
        split_cancelled(compute(&config, reachable_steps, fractions.as_deref()))
    };
    let result = match args.timeout {
        None => analysis(),
        Some(seconds) => cancel_this::on_timeout(Duration::from_secs(seconds), analysis),
    };
    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            eprintln!("Analysis failed: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Analysis cancelled: {}", e);
            std::process::exit(2);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Cannot serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&output);
    }
}

fn compute(
    config: &AnalysisConfig,
    reachable_steps: Option<usize>,
    fractions: Option<&[f64]>,
) -> KaprekarResult<Output> {
    let report = run_analysis(config)?;
    let reachable_classes = match reachable_steps {
        Some(steps) => {
            let seeds = config.seeds.resolve(config.width)?;
            Some(reachable_classes(&config.transformer(), seeds, steps)?)
        }
        None => None,
    };
    let prefix_coverage = match fractions {
        Some(fractions) => Some(prefix_coverage(config.width, fractions)?),
        None => None,
    };
    Ok(Output {
        report,
        reachable_classes,
        prefix_coverage,
    })
}

fn print_summary(output: &Output) {
    let report = &output.report;
    let stats = &report.statistics;
    let width = report.config.width;
    println!(
        "Width {}: {} values in {} classes (reduction factor {:.2}).",
        width, stats.width.total_values, stats.width.class_count, stats.width.reduction_factor
    );
    println!(
        "Traced {} of {} seeds over {} nodes; {} classes reached ({:.1}%).",
        stats.traced, stats.seeds, report.config.node_kind, stats.classes_reached, stats.coverage
    );
    for failure in &report.failures {
        println!("Seed {} failed: {}", failure.seed, failure.message);
    }
    println!(
        "Graph: {} nodes, {} edges; longest trajectory {} (tail {}).",
        report.graph.node_count(),
        report.graph.edge_count(),
        stats.longest_trajectory,
        stats.longest_tail
    );
    for (index, (cycle, basin)) in report.cycles.iter().zip(&report.basin_sizes).enumerate() {
        let nodes: Vec<String> = cycle.nodes().iter().map(|it| width.pad(*it)).collect();
        println!(
            "Cycle #{} (length {}, basin {}): {}",
            index + 1,
            cycle.len(),
            basin,
            nodes.join(" -> ")
        );
    }
    println!("Feeders: {}", report.feeders.len());
    if let Some(reachable) = &output.reachable_classes {
        for (step, classes) in reachable.iter().enumerate() {
            println!("Classes reached after {} steps: {}", step + 1, classes);
        }
    }
    if let Some(coverage) = &output.prefix_coverage {
        for row in coverage {
            println!(
                "First {:.1}% ({} values) cover {} classes ({:.1}%).",
                row.fraction * 100.0,
                row.values_checked,
                row.classes_found,
                row.coverage
            );
        }
    }
}
