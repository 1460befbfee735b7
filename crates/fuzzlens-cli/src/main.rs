use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "fuzzlens")]
#[command(about = "Fuzzing campaign telemetry tools", long_about = None)]
struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot calibration consistency ratios from a fuzzer log
    Consistency(ConsistencyArgs),
    /// Plot agreement between the coverage and state observers
    Observers {
        #[arg(value_name = "LOG")]
        log: PathBuf,
    },
    /// Plot the GLOBAL status lines of a multi-monitor log
    Monitor {
        #[arg(value_name = "LOG")]
        log: PathBuf,
    },
    /// Plot JSON monitor records. The output is named after the first file
    Metrics {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Add panels for the last hour (or last three quarters) of each run
        #[arg(long)]
        include_recent: bool,
    },
    /// Plot one metric across several runs
    Compare(CompareArgs),
    /// Average a series of `top` snapshots
    SystemLoad {
        /// Reads stdin when omitted
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Resolve unstable coverage offsets to source locations
    Stability {
        /// Path to the fuzzed executable
        executable: PathBuf,
        /// `offset: addr` map written by the sanitizer coverage pass
        sanitizer_cov: PathBuf,
        /// One unstable offset per line
        unstable_coverage: PathBuf,
    },
    /// Decode the `pcap` of every flat metadata file in a directory
    ExtractPcap {
        input: PathBuf,
        output: PathBuf,
        /// Worker threads, 0 for one per CPU
        #[arg(long, default_value_t = 0)]
        jobs: usize,
    },
    /// Deduplicate a corpus and export its packet captures
    Dedup(DedupArgs),
    /// Parse a fuzzer log and emit JSON IR
    Parse {
        #[arg(value_name = "LOG")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct ConsistencyArgs {
    #[arg(value_name = "LOG")]
    log: PathBuf,
    /// Generate only the ratio plots
    #[arg(long, conflicts_with = "distributions_only")]
    ratios_only: bool,
    /// Generate only the distribution plots
    #[arg(long)]
    distributions_only: bool,
    /// Print list length counts
    #[arg(long)]
    print_counts: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum XAxisArg {
    #[value(name = "run_time")]
    RunTime,
    Executions,
}

#[derive(Args)]
struct CompareArgs {
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
    #[arg(long, value_enum, default_value = "run_time")]
    x_axis: XAxisArg,
    /// Metric profile to plot
    #[arg(long, default_value = "coverage-observer")]
    key: String,
    /// Limit the x axis to the shortest run
    #[arg(long)]
    limit_range: bool,
    /// Metric profiles, defaults to the user config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupBy {
    Hash,
    Packets,
}

#[derive(Args)]
struct DedupArgs {
    input: PathBuf,
    output: PathBuf,
    /// Remove an existing output directory
    #[arg(long)]
    force: bool,
    /// Only extract PCAP files
    #[arg(long)]
    pcap_only: bool,
    /// Preserve original filenames instead of using incrementing numbers
    #[arg(long)]
    no_rename: bool,
    #[arg(long, value_enum, default_value = "hash")]
    by: DedupBy,
    /// Worker threads, 0 for one per CPU
    #[arg(long, default_value_t = 0)]
    jobs: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Consistency(args) => commands::consistency(
            &args.log,
            commands::ConsistencyPlots {
                ratios: !args.distributions_only,
                distributions: !args.ratios_only,
                print_counts: args.print_counts,
            },
            &mut out,
        ),
        Commands::Observers { log } => commands::observers(log, &mut out),
        Commands::Monitor { log } => commands::monitor(log, &mut out),
        Commands::Metrics {
            files,
            include_recent,
        } => commands::metrics(files, *include_recent, &mut out),
        Commands::Compare(args) => {
            let x_axis = match args.x_axis {
                XAxisArg::RunTime => fuzzlens_analysis::compare::XAxis::RunTime,
                XAxisArg::Executions => fuzzlens_analysis::compare::XAxis::Executions,
            };
            commands::compare(
                &args.files,
                commands::CompareOptions {
                    x_axis,
                    key: &args.key,
                    limit_range: args.limit_range,
                    config: args.config.as_deref(),
                    output_dir: args.output_dir.as_deref(),
                },
                &mut out,
            )
        }
        Commands::SystemLoad { path } => commands::system_load(path.as_deref(), &mut out),
        Commands::Stability {
            executable,
            sanitizer_cov,
            unstable_coverage,
        } => commands::stability(
            executable,
            sanitizer_cov,
            unstable_coverage,
            &fuzzlens_artifacts::Addr2Line::default(),
            &mut out,
        ),
        Commands::ExtractPcap {
            input,
            output,
            jobs,
        } => commands::extract_pcap(input, output, *jobs, &mut out),
        Commands::Dedup(args) => {
            let options = fuzzlens_artifacts::DedupOptions {
                key: match args.by {
                    DedupBy::Hash => fuzzlens_artifacts::DedupKey::Hash,
                    DedupBy::Packets => fuzzlens_artifacts::DedupKey::Packets,
                },
                force: args.force,
                pcap_only: args.pcap_only,
                no_rename: args.no_rename,
                jobs: args.jobs,
            };
            commands::dedup(&args.input, &args.output, &options, &mut out)
        }
        Commands::Parse { path } => commands::parse(path, &mut out),
    }
}
